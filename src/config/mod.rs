mod settings;

use config::{Config, ConfigError, Environment, File};
use tracing::warn;

use crate::config::settings::PartialSettings;
use crate::utils::error::{Error, Result};

pub use settings::{
    DEFAULT_EXPIRY_SECS, DEFAULT_POINT_COUNT, MqttSettings, PointsSettings, ServerSettings,
    Settings,
};

/// Loads the configuration from `config/default` and the process environment,
/// merged over `Settings::default()`.
///
/// Fails if no broker URL is configured. Missing point topics are not an
/// error; those slots stay empty.
pub fn load_config() -> Result<Settings> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    merge(partial)
}

fn merge(partial: PartialSettings) -> Result<Settings> {
    let default = Settings::default();

    let server = partial.server.as_ref();
    let mqtt = partial.mqtt.as_ref();
    let points = partial.points.as_ref();

    let broker_url = mqtt
        .and_then(|m| m.broker.as_ref())
        .and_then(|b| b.url.clone())
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(Error::MissingBrokerUrl)?;

    let reconnect_secs = mqtt
        .and_then(|m| m.reconnect_secs)
        .unwrap_or(default.mqtt.reconnect_secs);
    if reconnect_secs == 0 {
        return Err(Error::Config(ConfigError::Message(
            "mqtt.reconnect_secs must be at least 1".to_string(),
        )));
    }

    let count = points
        .and_then(|p| p.count)
        .unwrap_or(default.points.count);
    let mut topics = vec![None; count];
    for (key, point) in partial.point.unwrap_or_default() {
        match key.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => topics[n - 1] = point.topic,
            _ => warn!("point.{key} is outside 1..={count}, ignored"),
        }
    }

    Ok(Settings {
        server: ServerSettings {
            host: server
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .port
                .or_else(|| server.and_then(|s| s.port))
                .unwrap_or(default.server.port),
            static_dir: server
                .and_then(|s| s.static_dir.clone())
                .unwrap_or(default.server.static_dir),
        },
        mqtt: MqttSettings {
            broker_url,
            client_id: mqtt
                .and_then(|m| m.client_id.clone())
                .unwrap_or(default.mqtt.client_id),
            reconnect_secs,
            keep_alive_secs: mqtt
                .and_then(|m| m.keep_alive_secs)
                .unwrap_or(default.mqtt.keep_alive_secs),
            layout: mqtt.and_then(|m| m.layout).unwrap_or(default.mqtt.layout),
        },
        points: PointsSettings {
            count,
            expiry_secs: points
                .and_then(|p| p.expiry_secs)
                .unwrap_or(default.points.expiry_secs),
            topics,
        },
    })
}
