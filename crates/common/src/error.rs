//! Error types for transcheck

use thiserror::Error;

/// Result type alias using the transcheck Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading or validating shared configuration
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
