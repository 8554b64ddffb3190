// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Naming registry (master) client.
//!
//! The master transport itself is supplied by the embedding application
//! through [`MasterApi`]; this module interprets its status-coded replies.

use crate::error::{Result, ServiceError};
use crate::uri::EndpointUri;
use std::collections::BTreeSet;
use std::fmt;
use std::io;

/// Status code carried by every master reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// Request rejected (e.g. unknown service).
    Failure,
    /// Master-side error.
    Error,
    /// Request succeeded.
    Success,
}

impl StatusCode {
    /// Map a raw code; anything unrecognised counts as a master error.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Success,
            -1 => Self::Failure,
            _ => Self::Error,
        }
    }
}

/// `(code, message, value)` triple returned by master calls.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterReply<T> {
    pub code: i32,
    pub message: String,
    pub value: T,
}

impl<T> MasterReply<T> {
    pub fn new(code: i32, message: impl Into<String>, value: T) -> Self {
        Self {
            code,
            message: message.into(),
            value,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_code(self.code)
    }

    /// The value on success, `RegistryUnavailable` otherwise.
    pub fn into_value(self) -> Result<T> {
        match self.status() {
            StatusCode::Success => Ok(self.value),
            _ => Err(ServiceError::RegistryUnavailable {
                code: self.code,
                message: self.message,
            }),
        }
    }
}

/// Service name with the nodes providing it, as listed by the master.
pub type ServiceProviders = (String, Vec<String>);

/// Master calls needed by the service tooling.
pub trait MasterApi {
    /// Look up the URI of a service.
    fn lookup_service(&self, caller_id: &str, service: &str) -> io::Result<MasterReply<String>>;

    /// Services section of the master's system state.
    fn system_services(&self, caller_id: &str) -> io::Result<MasterReply<Vec<ServiceProviders>>>;
}

impl<M: MasterApi + ?Sized> MasterApi for &M {
    fn lookup_service(&self, caller_id: &str, service: &str) -> io::Result<MasterReply<String>> {
        (**self).lookup_service(caller_id, service)
    }

    fn system_services(&self, caller_id: &str) -> io::Result<MasterReply<Vec<ServiceProviders>>> {
        (**self).system_services(caller_id)
    }
}

/// Outcome of a service lookup that reached the master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(EndpointUri),
    Unknown,
}

/// A registered service and its provider nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub name: String,
    pub provider_nodes: BTreeSet<String>,
}

impl ServiceRecord {
    pub fn new<I, S>(name: impl Into<String>, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            provider_nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }

    /// True if `node` provides this service.
    pub fn provided_by(&self, node: &str) -> bool {
        self.provider_nodes.contains(node)
    }
}

impl fmt::Display for ServiceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes: Vec<&str> = self.provider_nodes.iter().map(String::as_str).collect();
        write!(f, "{} {}", self.name, nodes.join(","))
    }
}

/// Client handle for the naming registry. Every call re-queries the master.
pub struct RegistryClient<M> {
    master: M,
    master_uri: String,
    caller_id: String,
}

impl<M: MasterApi> RegistryClient<M> {
    /// Create a client over a master transport.
    pub fn new(master: M, master_uri: impl Into<String>, caller_id: impl Into<String>) -> Self {
        Self {
            master,
            master_uri: master_uri.into(),
            caller_id: caller_id.into(),
        }
    }

    /// Address of the master this client talks to.
    pub fn master_uri(&self) -> &str {
        &self.master_uri
    }

    /// Caller id sent with each request.
    pub fn caller_id(&self) -> &str {
        &self.caller_id
    }

    /// Look up the endpoint of `service`.
    ///
    /// A failure status is a normal `Lookup::Unknown`; a master error is
    /// `RegistryUnavailable`; socket problems are `NetworkFailure`.
    pub fn lookup_service(&self, service: &str) -> Result<Lookup> {
        let reply = self.master.lookup_service(&self.caller_id, service)?;
        match reply.status() {
            StatusCode::Success => {
                log::debug!("[registry] {} -> {}", service, reply.value);
                Ok(Lookup::Found(EndpointUri::parse(&reply.value)?))
            }
            StatusCode::Failure => Ok(Lookup::Unknown),
            StatusCode::Error => Err(ServiceError::RegistryUnavailable {
                code: reply.code,
                message: reply.message,
            }),
        }
    }

    /// Endpoint of `service`, or `None` for any non-success reply.
    pub fn service_uri(&self, service: &str) -> Result<Option<EndpointUri>> {
        let reply = self.master.lookup_service(&self.caller_id, service)?;
        match reply.status() {
            StatusCode::Success => Ok(Some(EndpointUri::parse(&reply.value)?)),
            _ => Ok(None),
        }
    }

    /// All registered services, optionally only those provided by `node`.
    pub fn list_services(&self, node: Option<&str>) -> Result<Vec<ServiceRecord>> {
        let services = self.master.system_services(&self.caller_id)?.into_value()?;
        Ok(services
            .into_iter()
            .map(|(name, nodes)| ServiceRecord::new(name, nodes))
            .filter(|record| node.map_or(true, |n| record.provided_by(n)))
            .collect())
    }

    /// Names of registered services, optionally filtered by provider node.
    pub fn service_names(&self, node: Option<&str>) -> Result<Vec<String>> {
        Ok(self
            .list_services(node)?
            .into_iter()
            .map(|record| record.name)
            .collect())
    }
}
