//! Error handling for the Asterisk AMI client.

/// A specialized `Result` type for AMI operations.
pub type Result<T> = std::result::Result<T, AmiError>;

/// The main error type for AMI client operations.
///
/// Only connection-level faults are represented here. Protocol-shape
/// irregularities (malformed lines, missing counters) are recovered locally
/// by the decoders and never surface as errors.
#[derive(Debug, thiserror::Error)]
pub enum AmiError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TCP connection could not be established
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The server stopped sending data before a response was complete
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// The server closed the socket before a response was complete
    #[error("Connection closed while waiting for {0}")]
    ConnectionClosed(String),

    /// Response parsing failed
    #[error("Failed to parse AMI response: {0}")]
    ParseError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A blocking collection task failed to complete
    #[error("Collection task failed: {0}")]
    Task(String),
}

impl AmiError {
    /// Create a new connect error
    pub fn connect_error(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Connect {
            addr: addr.into(),
            source,
        }
    }

    /// Create a new timeout error
    pub fn timeout(waiting_for: impl Into<String>) -> Self {
        Self::Timeout(waiting_for.into())
    }

    /// Create a new connection-closed error
    pub fn connection_closed(waiting_for: impl Into<String>) -> Self {
        Self::ConnectionClosed(waiting_for.into())
    }

    /// Create a new parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new task error
    pub fn task_error(msg: impl Into<String>) -> Self {
        Self::Task(msg.into())
    }

    /// Whether this error is a read timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
