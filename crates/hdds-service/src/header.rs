// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connection header wire format.
//!
//! A header block is a 4-byte little-endian length followed by that many
//! bytes of `key=value\n` lines:
//!
//! ```text
//! +----------------+------------------------------------------+
//! | u32 LE length  | probe=1\nmd5sum=*\ncallerid=..\n...      |
//! +----------------+------------------------------------------+
//! ```

use std::collections::HashMap;
use std::fmt;

/// Size of the length prefix preceding every header block.
pub const LENGTH_PREFIX_SIZE: usize = 4;

pub const KEY_PROBE: &str = "probe";
pub const KEY_MD5SUM: &str = "md5sum";
pub const KEY_CALLERID: &str = "callerid";
pub const KEY_SERVICE: &str = "service";
pub const KEY_TYPE: &str = "type";
pub const KEY_ERROR: &str = "error";

/// md5sum wildcard accepted by any service.
pub const MD5SUM_ANY: &str = "*";

/// Reasons a received header block is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer than 4 bytes arrived, so no length is known.
    TooShort { received: usize },
    /// The declared payload did not fully arrive.
    Truncated { declared: usize, received: usize },
    /// The declared payload exceeds the configured maximum.
    Oversized { declared: usize, max: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { received } => {
                write!(f, "received {} bytes, length prefix incomplete", received)
            }
            Self::Truncated { declared, received } => write!(
                f,
                "header declares {} bytes, only {} received",
                declared, received
            ),
            Self::Oversized { declared, max } => {
                write!(f, "header declares {} bytes, limit is {}", declared, max)
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// Encode header fields as a length-prefixed block, preserving order.
///
/// The prefix is a `u32`, so a block is limited to `u32::MAX` bytes. Longer
/// input is a caller bug: it asserts in debug builds and the prefix
/// saturates otherwise.
pub fn encode_frame<'a, I>(fields: I) -> Vec<u8>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut body = String::new();
    for (key, value) in fields {
        body.push_str(key);
        body.push('=');
        body.push_str(value);
        body.push('\n');
    }

    debug_assert!(body.len() <= u32::MAX as usize, "header block exceeds u32::MAX bytes");
    let len = u32::try_from(body.len()).unwrap_or(u32::MAX);
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + body.len());
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(body.as_bytes());
    buf
}

/// Build the probe request sent to a service endpoint.
pub fn probe_request(caller_id: &str, service: &str) -> Vec<u8> {
    encode_frame([
        (KEY_PROBE, "1"),
        (KEY_MD5SUM, MD5SUM_ANY),
        (KEY_CALLERID, caller_id),
        (KEY_SERVICE, service),
    ])
}

/// Read the declared payload length from the start of `buf`.
pub fn declared_len(buf: &[u8]) -> Option<usize> {
    let prefix: [u8; LENGTH_PREFIX_SIZE] = buf.get(..LENGTH_PREFIX_SIZE)?.try_into().ok()?;
    Some(u32::from_le_bytes(prefix) as usize)
}

/// Split a complete frame into its payload. Trailing bytes are ignored.
pub fn decode_frame(frame: &[u8]) -> Result<&[u8], FrameError> {
    let len = declared_len(frame).ok_or(FrameError::TooShort {
        received: frame.len(),
    })?;
    let end = LENGTH_PREFIX_SIZE + len;
    if frame.len() < end {
        return Err(FrameError::Truncated {
            declared: len,
            received: frame.len() - LENGTH_PREFIX_SIZE,
        });
    }
    Ok(&frame[LENGTH_PREFIX_SIZE..end])
}

/// Parse `key=value` lines. Lines without `=` past position 0 are skipped.
pub fn parse_fields(payload: &[u8]) -> HeaderMap {
    let text = String::from_utf8_lossy(payload);
    let mut fields = HashMap::new();
    for line in text.split('\n') {
        match line.find('=') {
            Some(idx) if idx > 0 => {
                fields.insert(line[..idx].to_string(), line[idx + 1..].to_string());
            }
            _ => {}
        }
    }
    HeaderMap { fields }
}

/// Incremental receive buffer for one header block.
///
/// Reading may stop either when the peer closes the stream or as soon as
/// [`FrameAccumulator::is_complete`] reports the declared payload present.
#[derive(Debug, Default)]
pub struct FrameAccumulator {
    buf: Vec<u8>,
    max_size: Option<usize>,
}

impl FrameAccumulator {
    /// Create an accumulator without a size limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an accumulator rejecting declared lengths above `max_size`.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_size: Some(max_size),
        }
    }

    /// Append received bytes.
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Total bytes received so far.
    pub fn received(&self) -> usize {
        self.buf.len()
    }

    /// Declared payload length, once the prefix has arrived.
    pub fn declared_len(&self) -> Option<usize> {
        declared_len(&self.buf)
    }

    /// True when no more bytes are needed to decide the outcome.
    pub fn is_complete(&self) -> bool {
        match self.declared_len() {
            Some(len) if self.exceeds_max(len) => true,
            Some(len) => self.buf.len() >= len + LENGTH_PREFIX_SIZE,
            None => false,
        }
    }

    fn exceeds_max(&self, len: usize) -> bool {
        self.max_size.is_some_and(|max| len > max)
    }

    /// Validate the buffer and return the payload bytes.
    pub fn finish(self) -> Result<Vec<u8>, FrameError> {
        if let (Some(len), Some(max)) = (self.declared_len(), self.max_size) {
            if len > max {
                return Err(FrameError::Oversized { declared: len, max });
            }
        }
        decode_frame(&self.buf).map(<[u8]>::to_vec)
    }
}

/// Header fields declared by a peer. Keys are unique; order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    fields: HashMap<String, String>,
}

impl HeaderMap {
    /// An empty map (failed or short handshake).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get a field value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Interface type declared by the service.
    pub fn service_type(&self) -> Option<&str> {
        self.get(KEY_TYPE)
    }

    /// Definition checksum declared by the service.
    pub fn md5sum(&self) -> Option<&str> {
        self.get(KEY_MD5SUM)
    }

    /// Rejection message sent instead of a normal header.
    pub fn error(&self) -> Option<&str> {
        self.get(KEY_ERROR)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<HashMap<String, String>> for HeaderMap {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}
