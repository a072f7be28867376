//! AMI connection configuration.

use crate::error::{AmiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Connection parameters for an AMI session.
#[derive(Clone, Serialize, Deserialize)]
pub struct AmiConfig {
    /// Asterisk host to connect to
    pub host: String,
    /// AMI port
    pub port: u16,
    /// Manager username
    pub username: String,
    /// Manager secret
    pub secret: String,
    /// Per-read socket timeout in milliseconds
    pub read_timeout_ms: u64,
    /// TCP connect timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for AmiConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: crate::DEFAULT_AMI_PORT,
            username: String::new(),
            secret: String::new(),
            read_timeout_ms: crate::DEFAULT_READ_TIMEOUT_MS,
            connect_timeout_ms: crate::DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

// Keeps the secret out of logs.
impl fmt::Debug for AmiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .field("read_timeout_ms", &self.read_timeout_ms)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

impl AmiConfig {
    /// Create a new configuration for the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the manager credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, secret: impl Into<String>) -> Self {
        self.username = username.into();
        self.secret = secret.into();
        self
    }

    /// Set the per-read timeout in milliseconds.
    pub fn with_read_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.read_timeout_ms = timeout_ms;
        self
    }

    /// Set the connect timeout in milliseconds.
    pub fn with_connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = timeout_ms;
        self
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Get the `host:port` address string.
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check that the parameters can be used to open a connection.
    ///
    /// Zero timeouts are rejected because the socket layer treats them as
    /// invalid rather than as "no timeout".
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AmiError::config_error("host must not be empty"));
        }
        if self.port == 0 {
            return Err(AmiError::config_error("port must not be zero"));
        }
        if self.read_timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(AmiError::config_error("timeouts must be greater than zero"));
        }
        Ok(())
    }
}
