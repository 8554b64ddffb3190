// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service header probe.
//!
//! Opens a short-lived connection to a service endpoint, sends a probe
//! header and reads the header the service answers with. No call is made.
//!
//! Some service implementations close the connection right after their
//! header, others keep it open; the read loop stops on whichever comes
//! first: end of stream or a complete declared header.

use crate::config::ProbeConfig;
use crate::error::Result;
use crate::header::{self, FrameAccumulator, HeaderMap};
use crate::uri::EndpointUri;
use std::io::{self, Read, Write};
use std::net::TcpStream;

/// Diagnostic emitted when the handshake yields no usable header.
pub const INCOMPLETE_HEADER_MSG: &str =
    "Did not receive full header back from service, cannot interrogate";

/// Probes service endpoints for their connection header.
#[derive(Debug, Clone)]
pub struct ServiceProber {
    config: ProbeConfig,
    caller_id: String,
}

impl ServiceProber {
    /// Create a prober announcing itself as `caller_id`.
    pub fn new(config: ProbeConfig, caller_id: impl Into<String>) -> Self {
        Self {
            config,
            caller_id: caller_id.into(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe `service` at `uri`.
    ///
    /// A short or malformed answer is reported as a diagnostic and yields an
    /// empty map. Socket errors, timeouts included, are `NetworkFailure`.
    pub fn probe(&self, service: &str, uri: &EndpointUri) -> Result<HeaderMap> {
        let stream = self.connect(uri)?;
        let request = header::probe_request(&self.caller_id, service);

        // The stream is moved in and dropped (closed) on every return path.
        let acc = exchange(stream, &request, &self.config)?;

        let received = acc.received();
        match acc.finish() {
            Ok(payload) => {
                let headers = header::parse_fields(&payload);
                log::debug!(
                    "[probe] {} answered with {} header fields ({} bytes)",
                    service,
                    headers.len(),
                    received
                );
                if let Some(err) = headers.error() {
                    log::warn!("Service [{}] rejected probe: {}", service, err);
                }
                Ok(headers)
            }
            Err(e) => {
                log::warn!("{}", INCOMPLETE_HEADER_MSG);
                log::debug!("[probe] {}: {}", service, e);
                Ok(HeaderMap::empty())
            }
        }
    }

    fn connect(&self, uri: &EndpointUri) -> io::Result<TcpStream> {
        let mut last_err = None;
        for addr in uri.socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.config.connect_timeout()) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.config.read_timeout()))?;
                    stream.set_write_timeout(Some(self.config.read_timeout()))?;
                    stream.set_nodelay(true).ok();
                    log::debug!("[probe] connected to {}", addr);
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address for {}", uri),
            )
        }))
    }
}

fn exchange(mut stream: TcpStream, request: &[u8], config: &ProbeConfig) -> io::Result<FrameAccumulator> {
    stream.write_all(request)?;
    stream.flush()?;
    read_frame(&mut stream, config)
}

/// Receive one header block from `reader`.
///
/// Stops at end of stream or once the declared header has fully arrived.
/// Interrupted reads are retried; any other I/O error is returned.
pub fn read_frame<R: Read>(reader: &mut R, config: &ProbeConfig) -> io::Result<FrameAccumulator> {
    let mut acc = FrameAccumulator::with_max_size(config.max_header_size);
    let mut chunk = vec![0u8; config.recv_chunk_size.max(1)];

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        acc.extend(&chunk[..n]);
        if acc.is_complete() {
            break;
        }
    }

    Ok(acc)
}
