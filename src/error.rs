//! Error types for gati-calib

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Calibration error types
///
/// Every variant is recoverable: acquisition failures degrade to an
/// engine without calibration, and persistence failures are logged by
/// the engine rather than propagated to calibration consumers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (store reads/writes, dump output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Calibration blob could not be parsed
    #[error("Malformed calibration blob: {0}")]
    Malformed(String),

    /// Calibration could not be fetched from the device
    #[error("Calibration unavailable: {0}")]
    Unavailable(String),

    /// No valid calibration held, or unsupported input arity
    #[error("Calibration not supported")]
    Unsupported,

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
