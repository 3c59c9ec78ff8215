//! MQTT subscriber
//!
//! Drives the `rumqttc` event loop: subscribes to every point topic each time
//! the broker acknowledges a connection, feeds publishes into the hub, and
//! keeps polling after failures so the client reconnects on a fixed interval.

use std::time::Duration;

use rumqttc::{
    AsyncClient, Event, MqttOptions, Packet, Publish, QoS, SubscribeFilter, SubscribeReasonCode,
    Transport,
};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::MqttSettings;
use crate::hub::{SharedHub, lock};
use crate::ingest::payload::IngestError;
use crate::points::Reading;
use crate::utils::Error;

const REQUEST_CAPACITY: usize = 10;

/// Builds client options from a broker URL such as `mqtt://user:pw@host:1883`.
pub fn broker_options(settings: &MqttSettings) -> Result<MqttOptions, Error> {
    let raw = settings.broker_url.as_str();
    let invalid = |reason: String| Error::InvalidBrokerUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    let (tls, default_port) = match url.scheme() {
        "mqtt" | "tcp" => (false, 1883),
        "mqtts" | "ssl" => (true, 8883),
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    };
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid("missing host".to_string()))?;
    let port = url.port().unwrap_or(default_port);

    let mut options = MqttOptions::new(settings.client_id.clone(), host, port);
    options.set_keep_alive(Duration::from_secs(settings.keep_alive_secs.max(1)));
    if !url.username().is_empty() {
        options.set_credentials(url.username(), url.password().unwrap_or_default());
    }
    if tls {
        options.set_transport(Transport::tls_with_default_config());
    }
    Ok(options)
}

/// Connects to the broker and feeds the hub forever.
///
/// Only returns early if the broker URL cannot be turned into options.
pub async fn run_ingest_loop(hub: SharedHub, settings: MqttSettings) -> Result<(), Error> {
    let options = broker_options(&settings)?;
    let reconnect = Duration::from_secs(settings.reconnect_secs);
    let filters = {
        let hub = lock(&hub);
        hub.registry().subscriptions(hub.layout())
    };

    info!(
        "Attempting to connect to MQTT broker at: {}",
        settings.broker_url
    );
    let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("MQTT connection successful.");
                subscribe_all(&client, &filters);
            }
            Ok(Event::Incoming(Packet::SubAck(ack))) => {
                for topic in failed_subscriptions(&filters, &ack.return_codes) {
                    error!("Failed to subscribe to topic {topic}");
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let _ = on_publish(&hub, &publish);
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                warn!("MQTT broker closed the session.");
            }
            Ok(_) => {}
            Err(e) => {
                error!("MQTT connection error: {e}");
                warn!(
                    "MQTT client went offline, retrying in {}s.",
                    reconnect.as_secs()
                );
                tokio::time::sleep(reconnect).await;
                info!("Attempting to reconnect to the MQTT broker...");
            }
        }
    }
}

fn subscribe_all(client: &AsyncClient, filters: &[String]) {
    if filters.is_empty() {
        warn!("No point topics configured, nothing to subscribe to.");
        return;
    }

    let request = filters
        .iter()
        .map(|topic| SubscribeFilter::new(topic.clone(), QoS::AtMostOnce));
    match client.try_subscribe_many(request) {
        Ok(()) => debug!("Subscribing to {} topics", filters.len()),
        Err(e) => error!("Failed to queue subscription request: {e}"),
    }
}

/// Pairs SUBACK return codes with the filters of the request they answer and
/// returns the ones the broker refused. Success is logged per topic.
pub fn failed_subscriptions<'a>(
    filters: &'a [String],
    codes: &[SubscribeReasonCode],
) -> Vec<&'a str> {
    let mut failed = Vec::new();
    for (topic, code) in filters.iter().zip(codes) {
        match code {
            SubscribeReasonCode::Success(_) => {
                info!("Successfully subscribed to topic {topic}.");
            }
            SubscribeReasonCode::Failure => failed.push(topic.as_str()),
        }
    }
    failed
}

/// Routes one PUBLISH into the hub.
pub fn on_publish(hub: &SharedHub, publish: &Publish) -> Result<Reading, IngestError> {
    let result = lock(hub).ingest(&publish.topic, &publish.payload);
    if let Err(e) = &result {
        warn!("{e}");
    }
    result
}
