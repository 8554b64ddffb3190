// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tool configuration.
//!
//! Supports both programmatic and file-based configuration.
//!
//! ```toml
//! caller_id = "/rosservice"
//! master_uri = "http://localhost:11311/"
//! schema_paths = ["/opt/ros/share"]
//!
//! [probe]
//! connect_timeout_ms = 5000
//! read_timeout_ms = 5000
//! ```

use crate::names;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding [`ToolConfig::master_uri`].
pub const ENV_MASTER_URI: &str = "ROS_MASTER_URI";

/// Environment variable overriding [`ToolConfig::namespace`].
pub const ENV_NAMESPACE: &str = "ROS_NAMESPACE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration shared by every component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Caller id announced to the master and to probed services.
    #[serde(default = "default_caller_id")]
    pub caller_id: String,

    /// Address of the naming registry (master).
    #[serde(default = "default_master_uri")]
    pub master_uri: String,

    /// Namespace used to resolve relative service names.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Directories scanned for `<pkg>/msg` and `<pkg>/srv` definitions.
    #[serde(default)]
    pub schema_paths: Vec<PathBuf>,

    /// Header probe settings.
    #[serde(default)]
    pub probe: ProbeConfig,
}

fn default_caller_id() -> String {
    "/rosservice".to_string()
}

fn default_master_uri() -> String {
    "http://localhost:11311/".to_string()
}

fn default_namespace() -> String {
    "/".to_string()
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            caller_id: default_caller_id(),
            master_uri: default_master_uri(),
            namespace: default_namespace(),
            schema_paths: Vec::new(),
            probe: ProbeConfig::default(),
        }
    }
}

impl ToolConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `ROS_MASTER_URI` / `ROS_NAMESPACE` overrides from the environment.
    pub fn apply_env(self) -> Self {
        self.apply_overrides(
            std::env::var(ENV_MASTER_URI).ok(),
            std::env::var(ENV_NAMESPACE).ok(),
        )
    }

    fn apply_overrides(mut self, master_uri: Option<String>, namespace: Option<String>) -> Self {
        if let Some(uri) = master_uri.filter(|u| !u.is_empty()) {
            self.master_uri = uri;
        }
        if let Some(ns) = namespace.filter(|n| !n.is_empty()) {
            self.namespace = ns;
        }
        self
    }

    /// Resolve a user-supplied service name against `namespace` and
    /// `caller_id`.
    pub fn resolve_name(&self, name: &str) -> String {
        names::resolve_name(name, &self.namespace, &self.caller_id)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.caller_id.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "caller_id must be a global name: {}",
                self.caller_id
            )));
        }
        if self.master_uri.is_empty() {
            return Err(ConfigError::Invalid("master_uri must not be empty".into()));
        }
        self.probe.validate()
    }
}

/// Settings for the header probe connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Connect timeout (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Timeout applied to each receive (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Bytes requested per receive call.
    #[serde(default = "default_recv_chunk_size")]
    pub recv_chunk_size: usize,

    /// Largest header length a peer may declare.
    #[serde(default = "default_max_header_size")]
    pub max_header_size: usize,
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_recv_chunk_size() -> usize {
    512
}

fn default_max_header_size() -> usize {
    1024 * 1024
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_timeout_ms(),
            read_timeout_ms: default_timeout_ms(),
            recv_chunk_size: default_recv_chunk_size(),
            max_header_size: default_max_header_size(),
        }
    }
}

impl ProbeConfig {
    /// Connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Per-receive timeout.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Builder: set connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Builder: set receive timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Builder: set receive chunk size.
    pub fn with_recv_chunk_size(mut self, size: usize) -> Self {
        self.recv_chunk_size = size;
        self
    }

    /// Builder: set maximum declared header length.
    pub fn with_max_header_size(mut self, size: usize) -> Self {
        self.max_header_size = size;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid("connect_timeout_ms must be > 0".into()));
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid("read_timeout_ms must be > 0".into()));
        }
        if self.recv_chunk_size == 0 {
            return Err(ConfigError::Invalid("recv_chunk_size must be > 0".into()));
        }
        if self.max_header_size == 0 {
            return Err(ConfigError::Invalid("max_header_size must be > 0".into()));
        }
        Ok(())
    }
}
