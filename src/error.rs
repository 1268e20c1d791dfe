//! Error types for raksha-sia

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// raksha-sia error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file parse error
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file encode error
    #[error("Configuration encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    /// The panel rejected or failed to acknowledge a command
    #[error("Command failed or was rejected by the panel")]
    CommandFailed,

    /// The panel rejected the remote login block
    #[error("Remote login rejected by the panel")]
    LoginRejected,

    /// The panel never answered the remote login block
    #[error("Remote login timed out, panel is offline")]
    LoginTimeout,

    /// A reply from the panel was too short or malformed
    #[error("Malformed panel reply: {0}")]
    MalformedReply(&'static str),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
