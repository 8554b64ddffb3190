// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service invocation.

use crate::builder;
use crate::error::{Result, ServiceError};
use crate::registry::MasterApi;
use crate::resolver::TypeResolver;
use crate::schema::{SchemaSource, ServiceSchema};
use crate::value::{FieldValue, MessageInstance};
use std::fmt;
use std::io;
use thiserror::Error;

/// Separator printed between request and response in verbose output.
const REQUEST_RESPONSE_SEPARATOR: &str = "---";

/// Errors reported by a [`CallTransport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// A request value does not fit its declared field type.
    #[error("{0}")]
    Serialization(String),

    /// Socket-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The service handler reported an error.
    #[error("{0}")]
    Remote(String),
}

impl TransportError {
    /// Convert into a caller-facing error; `srv_text` is attached to
    /// serialization failures.
    pub fn into_service_error(self, srv_text: &str) -> ServiceError {
        match self {
            Self::Serialization(detail) => ServiceError::SerializationMismatch {
                detail,
                srv_text: srv_text.to_string(),
            },
            Self::Io(e) => ServiceError::NetworkFailure(e),
            Self::Remote(msg) => ServiceError::CallFailed(msg),
        }
    }
}

/// Performs the actual service call once the request is built.
pub trait CallTransport {
    fn call(
        &mut self,
        service: &str,
        schema: &ServiceSchema,
        request: &MessageInstance,
    ) -> std::result::Result<MessageInstance, TransportError>;
}

impl<T: CallTransport + ?Sized> CallTransport for &mut T {
    fn call(
        &mut self,
        service: &str,
        schema: &ServiceSchema,
        request: &MessageInstance,
    ) -> std::result::Result<MessageInstance, TransportError> {
        (**self).call(service, schema, request)
    }
}

/// A completed call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub request: MessageInstance,
    pub response: MessageInstance,
}

impl Invocation {
    /// Text printed for a call: the response, preceded by the request and a
    /// separator line when `verbose`.
    pub fn render(&self, verbose: bool) -> String {
        if verbose {
            format!(
                "{}\n{}\n{}",
                self.request, REQUEST_RESPONSE_SEPARATOR, self.response
            )
        } else {
            self.response.to_string()
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(false))
    }
}

/// Resolves, fills and calls services.
pub struct Invoker<M, S, T> {
    resolver: TypeResolver<M, S>,
    transport: T,
}

impl<M: MasterApi, S: SchemaSource, T: CallTransport> Invoker<M, S, T> {
    pub fn new(resolver: TypeResolver<M, S>, transport: T) -> Self {
        Self {
            resolver,
            transport,
        }
    }

    pub fn resolver(&self) -> &TypeResolver<M, S> {
        &self.resolver
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Call `service` with `args`.
    ///
    /// Extra arguments are ignored. Too few arguments fail with
    /// `ArgumentCountMismatch` before anything is sent.
    pub fn call(&mut self, service: &str, args: Vec<FieldValue>) -> Result<Invocation> {
        let schema = self.resolver.resolve_service_schema(service)?;
        let filled = builder::fill(&schema.request, args)?;
        if !filled.leftover.is_empty() {
            log::debug!(
                "[invoker] ignoring {} extra argument(s) for {}",
                filled.leftover.len(),
                service
            );
        }

        let request = filled.instance;
        let response = self
            .transport
            .call(service, &schema, &request)
            .map_err(|e| e.into_service_error(&schema.text))?;

        log::debug!("[invoker] {} ({}) returned", service, schema.type_name);
        Ok(Invocation { request, response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let call = Invocation {
            request: MessageInstance::new("demo/AddRequest")
                .with_field("a", 1)
                .with_field("b", 2),
            response: MessageInstance::new("demo/AddResponse").with_field("sum", 3),
        };
        assert_eq!(call.render(false), "sum: 3");
        assert_eq!(call.render(true), "a: 1\nb: 2\n---\nsum: 3");
        assert_eq!(call.to_string(), "sum: 3");
    }

    #[test]
    fn test_transport_error_mapping() {
        let srv = "int64 a\n---\nint64 sum\n";

        let err = TransportError::Serialization("a: expected int64, got string".into())
            .into_service_error(srv);
        match err {
            ServiceError::SerializationMismatch { detail, srv_text } => {
                assert_eq!(detail, "a: expected int64, got string");
                assert_eq!(srv_text, srv);
            }
            other => panic!("unexpected {:?}", other),
        }

        let err = TransportError::from(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .into_service_error(srv);
        assert_eq!(err.exit_code(), crate::error::EXIT_NETWORK_FAILURE);

        let err = TransportError::Remote("handler raised".into()).into_service_error(srv);
        assert!(matches!(err, ServiceError::CallFailed(_)));
    }
}
