use serde::{Deserialize, Serialize};

use crate::points::ReadingKind;

/// Frames a client may send.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Client is ready; the server replays the full point table to it.
    #[serde(rename = "hello")]
    Hello,
}

/// Frames the server pushes to clients. `data: null` means the reading is absent.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "temperatureUpdate")]
    TemperatureUpdate { index: usize, data: Option<f64> },
    #[serde(rename = "humidityUpdate")]
    HumidityUpdate { index: usize, data: Option<f64> },
}

impl ServerMessage {
    pub fn update(index: usize, kind: ReadingKind, data: Option<f64>) -> Self {
        match kind {
            ReadingKind::Temperature => ServerMessage::TemperatureUpdate { index, data },
            ReadingKind::Humidity => ServerMessage::HumidityUpdate { index, data },
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ServerMessage::TemperatureUpdate { index, .. }
            | ServerMessage::HumidityUpdate { index, .. } => *index,
        }
    }

    pub fn data(&self) -> Option<f64> {
        match self {
            ServerMessage::TemperatureUpdate { data, .. }
            | ServerMessage::HumidityUpdate { data, .. } => *data,
        }
    }
}
