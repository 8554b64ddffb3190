// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for service introspection and invocation.

use crate::config::ConfigError;
use crate::schema::SchemaError;
use thiserror::Error;

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Exit code for failures at the socket layer.
pub const EXIT_NETWORK_FAILURE: i32 = 1;

/// Exit code for every domain-level service error.
pub const EXIT_SERVICE_ERROR: i32 = 2;

/// Errors surfaced to the caller of the service tooling.
///
/// A failed header probe is not part of this enum: the prober recovers it
/// into an empty header map (see [`crate::header::FrameError`]).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The master answered with an error or failure status code.
    #[error("Master is malfunctioning: {message}")]
    RegistryUnavailable { code: i32, message: String },

    /// The service is not present in the master's listing.
    #[error("Service [{0}] is not available.")]
    ServiceNotFound(String),

    /// The service is registered but its type could not be determined.
    #[error("Unable to determine type of service [{0}].")]
    TypeUnresolvable(String),

    /// The type was resolved but no local definition matches it.
    #[error("Unable to load type [{type_name}].\nHave you built the definitions of package [{package}]?")]
    SchemaNotLoadable { type_name: String, package: String },

    /// Too few arguments for the request fields.
    #[error("Not enough arguments to call service.\nArgs are: [{}]", .expected.join(" "))]
    ArgumentCountMismatch { expected: Vec<String> },

    /// A request value did not fit its declared field type.
    #[error("Unable to send request. One of the fields has an incorrect type:\n  {detail}\n\nsrv file:\n{srv_text}")]
    SerializationMismatch { detail: String, srv_text: String },

    /// The call transport reported a failure other than serialization.
    #[error("Service call failed: {0}")]
    CallFailed(String),

    /// Address of a service endpoint is not a valid rosrpc URI.
    #[error("Invalid service URI: {0}")]
    InvalidUri(String),

    /// Socket-level failure, including connect and receive timeouts.
    #[error("Network communication failed: {0}")]
    NetworkFailure(#[from] std::io::Error),

    /// Definition loading error.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ServiceError {
    /// Process exit code a dispatch shell should use for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NetworkFailure(_) => EXIT_NETWORK_FAILURE,
            _ => EXIT_SERVICE_ERROR,
        }
    }

    /// True for failures at the socket layer.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::NetworkFailure(_))
    }
}
