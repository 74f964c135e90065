// Configuration loading

pub mod settings;

pub use settings::{ApiSettings, NettingSettings, Settings};

use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// Settings file could not be read or written.
    Io(String),
    /// TOML parse / deserialization error.
    Parse(String),
    /// Values parsed but are not usable.
    Validation(String),
    /// An environment override could not be parsed.
    InvalidEnv { key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "settings IO error: {msg}"),
            Self::Parse(msg) => write!(f, "settings parse error: {msg}"),
            Self::Validation(msg) => write!(f, "settings validation error: {msg}"),
            Self::InvalidEnv { key, value } => write!(f, "invalid value for {key}: '{value}'"),
        }
    }
}

impl std::error::Error for ConfigError {}
