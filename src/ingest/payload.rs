use std::fmt;

/// Why a payload could not be turned into a reading.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadError {
    NotUtf8,
    NotANumber(String),
    NotFinite(f64),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::NotUtf8 => write!(f, "payload is not valid UTF-8"),
            PayloadError::NotANumber(text) => write!(f, "'{text}' is not a number"),
            PayloadError::NotFinite(v) => write!(f, "{v} is not a finite value"),
        }
    }
}

impl std::error::Error for PayloadError {}

/// Why an inbound MQTT message was discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestError {
    /// Topic does not belong to any configured point
    UnknownTopic(String),
    /// Topic is known but the payload is not a usable number
    InvalidPayload { topic: String, source: PayloadError },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::UnknownTopic(topic) => {
                write!(f, "received message from unknown topic {topic}")
            }
            IngestError::InvalidPayload { topic, source } => {
                write!(f, "invalid payload on {topic}: {source}")
            }
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::InvalidPayload { source, .. } => Some(source),
            IngestError::UnknownTopic(_) => None,
        }
    }
}

/// Parses a plain-text decimal payload such as `"23.5"`.
///
/// Surrounding whitespace is ignored and `.` is the only decimal separator.
/// `NaN` and infinities are rejected.
pub fn parse_value(payload: &[u8]) -> Result<f64, PayloadError> {
    let text = std::str::from_utf8(payload).map_err(|_| PayloadError::NotUtf8)?;
    let text = text.trim();
    let value: f64 = text
        .parse()
        .map_err(|_| PayloadError::NotANumber(text.chars().take(32).collect()))?;
    if !value.is_finite() {
        return Err(PayloadError::NotFinite(value));
    }
    Ok(value)
}
