//! Error types for the HDMI2USB console.

use std::io;

/// Errors produced by the console and its hardware collaborators.
#[derive(Debug, thiserror::Error)]
pub enum H2uError {
    #[error("hardware error: {0}")]
    Hardware(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, H2uError>;
