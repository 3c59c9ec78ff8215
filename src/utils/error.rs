//! Error types for heatsub.
//!
//! Only startup can fail the process; everything at runtime is logged and
//! dropped, so this enum covers configuration and binding problems.

use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Configuration sources could not be read or deserialized
    Config(config::ConfigError),
    /// No broker address was configured
    MissingBrokerUrl,
    /// The broker address is not a usable MQTT URL
    InvalidBrokerUrl { url: String, reason: String },
    /// Network I/O error (listener bind, accept)
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "configuration error: {e}"),
            Error::MissingBrokerUrl => {
                write!(f, "MQTT_BROKER_URL is not defined (mqtt.broker.url)")
            }
            Error::InvalidBrokerUrl { url, reason } => {
                write!(f, "invalid broker url '{url}': {reason}")
            }
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
