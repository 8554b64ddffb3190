// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service endpoint addresses (`rosrpc://host:port`).

use crate::error::ServiceError;
use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;

/// URI scheme used by service endpoints.
pub const ROSRPC_SCHEME: &str = "rosrpc://";

/// Address of a service endpoint as advertised by the master.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointUri {
    host: String,
    port: u16,
}

impl EndpointUri {
    /// Create from host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a `rosrpc://host:port` URI.
    pub fn parse(uri: &str) -> Result<Self, ServiceError> {
        let invalid = || ServiceError::InvalidUri(uri.to_string());

        let rest = uri.strip_prefix(ROSRPC_SCHEME).ok_or_else(invalid)?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        let (host, port) = rest.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() || host.contains('/') {
            return Err(invalid());
        }
        let port = port.parse::<u16>().map_err(|_| invalid())?;

        Ok(Self::new(host, port))
    }

    /// Host part.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port part.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolve the host to socket addresses.
    pub fn socket_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        Ok((self.host.as_str(), self.port).to_socket_addrs()?.collect())
    }
}

impl FromStr for EndpointUri {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EndpointUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:{}", ROSRPC_SCHEME, self.host, self.port)
    }
}

impl From<SocketAddr> for EndpointUri {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}
