use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::points::{TopicLayout, TopicRegistry};

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    pub server: ServerSettings,
    pub mqtt: MqttSettings,
    pub points: PointsSettings,
}

/// Where the HTTP server binds and which directory it serves. The snapshot
/// API and the `/ws` feed share this listener.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

/// Broker connection settings.
#[derive(Debug, Deserialize, Clone)]
pub struct MqttSettings {
    pub broker_url: String,
    pub client_id: String,
    pub reconnect_secs: u64,
    pub keep_alive_secs: u64,
    pub layout: TopicLayout,
}

/// Point table shape, expiry window and per-point topics.
///
/// `topics[i]` feeds point index `i`; `None` keeps the slot but the point
/// never receives data.
#[derive(Debug, Deserialize, Clone)]
pub struct PointsSettings {
    pub count: usize,
    pub expiry_secs: u64,
    pub topics: Vec<Option<String>>,
}

impl PointsSettings {
    pub fn registry(&self) -> TopicRegistry {
        TopicRegistry::new(self.topics.clone())
    }

    /// Logs one warning per point slot without a topic and returns the
    /// 1-based point numbers, as used in `POINT_<n>_TOPIC`.
    pub fn warn_missing_topics(&self) -> Vec<usize> {
        let missing: Vec<usize> = self.registry().missing().map(|i| i + 1).collect();
        for n in &missing {
            warn!("POINT_{n}_TOPIC is not defined");
        }
        missing
    }
}

/// Partial configuration settings loaded from files or environment.
///
/// Besides the nested sections this also accepts the flat names the
/// deployment's `.env` files use: `PORT` lands in `port`, `MQTT_BROKER_URL`
/// in `mqtt.broker.url` and `POINT_<n>_TOPIC` in `point.<n>.topic`.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub mqtt: Option<PartialMqttSettings>,
    pub points: Option<PartialPointsSettings>,
    pub point: Option<HashMap<String, PartialPointSettings>>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialMqttSettings {
    pub broker: Option<PartialBrokerEndpoint>,
    pub client_id: Option<String>,
    pub reconnect_secs: Option<u64>,
    pub keep_alive_secs: Option<u64>,
    pub layout: Option<TopicLayout>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerEndpoint {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialPointsSettings {
    pub count: Option<usize>,
    pub expiry_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialPointSettings {
    pub topic: Option<String>,
}

/// Number of heatmap points when nothing else is configured.
pub const DEFAULT_POINT_COUNT: usize = 10;

/// Inactivity window after which a point is cleared: 31 minutes.
pub const DEFAULT_EXPIRY_SECS: u64 = 31 * 60;

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: "public".to_string(),
        }
    }
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            broker_url: String::new(),
            client_id: format!("heatsub-{}", uuid::Uuid::new_v4().simple()),
            reconnect_secs: 10,
            keep_alive_secs: 30,
            layout: TopicLayout::Split,
        }
    }
}

impl Default for PointsSettings {
    fn default() -> Self {
        Self {
            count: DEFAULT_POINT_COUNT,
            expiry_secs: DEFAULT_EXPIRY_SECS,
            topics: vec![None; DEFAULT_POINT_COUNT],
        }
    }
}
