use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

use crate::client::Client;
use crate::hub::{Hub, SharedHub, lock};
use crate::points::{ReadingKind, TopicLayout, TopicRegistry};
use crate::transport::message::{ClientMessage, ServerMessage};
use crate::transport::websocket::handle_text;

fn hub_with(layout: TopicLayout) -> SharedHub {
    let registry = TopicRegistry::new(vec![
        Some("a".to_string()),
        None,
        Some("c".to_string()),
    ]);
    Hub::spawn(registry, layout, Duration::from_secs(60))
}

fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(serde_json::from_str(&msg).unwrap());
    }
    out
}

#[test]
fn test_server_message_schema() {
    let update = ServerMessage::update(0, ReadingKind::Temperature, Some(10.0));
    assert_eq!(
        serde_json::to_value(&update).unwrap(),
        json!({ "type": "temperatureUpdate", "index": 0, "data": 10.0 })
    );

    let cleared = ServerMessage::update(3, ReadingKind::Humidity, None);
    assert_eq!(
        serde_json::to_value(&cleared).unwrap(),
        json!({ "type": "humidityUpdate", "index": 3, "data": null })
    );
}

#[test]
fn test_client_hello_parses() {
    let msg: ClientMessage = serde_json::from_value(json!({ "type": "hello" })).unwrap();
    assert_eq!(msg, ClientMessage::Hello);
    assert!(serde_json::from_value::<ClientMessage>(json!({ "type": "subscribe" })).is_err());
}

#[tokio::test]
async fn test_hello_replays_split_table_to_sender_only() {
    let hub = hub_with(TopicLayout::Split);
    let (tx, mut rx) = mpsc::channel(64);
    let (other_tx, mut other_rx) = mpsc::channel(64);
    let client = Client::new(tx);
    let client_id = client.id.clone();
    {
        let mut hub = lock(&hub);
        hub.register_client(client);
        hub.register_client(Client::new(other_tx));
    }

    lock(&hub).ingest("c/temperature", b"19.5").unwrap();
    drain(&mut rx);
    drain(&mut other_rx);

    let hello = json!({ "type": "hello" }).to_string();
    assert_eq!(handle_text(&hub, &client_id, &hello), Some(6));

    let replay = drain(&mut rx);
    assert_eq!(replay.len(), 6);
    assert_eq!(
        replay[0],
        ServerMessage::TemperatureUpdate {
            index: 0,
            data: None
        }
    );
    assert_eq!(
        replay[1],
        ServerMessage::HumidityUpdate {
            index: 0,
            data: None
        }
    );
    assert_eq!(
        replay[4],
        ServerMessage::TemperatureUpdate {
            index: 2,
            data: Some(19.5)
        }
    );
    assert!(drain(&mut other_rx).is_empty());
}

#[tokio::test]
async fn test_hello_replays_direct_table() {
    let hub = hub_with(TopicLayout::Direct);
    let (tx, mut rx) = mpsc::channel(64);
    let client = Client::new(tx);
    let client_id = client.id.clone();
    lock(&hub).register_client(client);

    let hello = json!({ "type": "hello" }).to_string();
    assert_eq!(handle_text(&hub, &client_id, &hello), Some(3));
    let replay = drain(&mut rx);
    assert!(replay
        .iter()
        .all(|m| matches!(m, ServerMessage::TemperatureUpdate { data: None, .. })));
    assert_eq!(
        replay.iter().map(ServerMessage::index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[tokio::test]
async fn test_invalid_frame_is_ignored() {
    let hub = hub_with(TopicLayout::Split);
    let (tx, mut rx) = mpsc::channel(64);
    let client = Client::new(tx);
    let client_id = client.id.clone();
    lock(&hub).register_client(client);

    assert_eq!(handle_text(&hub, &client_id, "not json"), None);
    assert_eq!(handle_text(&hub, &client_id, r#"{"type":"publish"}"#), None);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_hello_drops_client_whose_queue_cannot_hold_replay() {
    let hub = hub_with(TopicLayout::Split);
    let (tx, mut rx) = mpsc::channel(2);
    let client = Client::new(tx);
    let client_id = client.id.clone();
    lock(&hub).register_client(client);

    let hello = json!({ "type": "hello" }).to_string();
    assert_eq!(handle_text(&hub, &client_id, &hello), Some(2));
    assert!(lock(&hub).clients.is_empty());
    assert_eq!(drain(&mut rx).len(), 2);
}
