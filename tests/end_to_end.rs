use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use heatsub::hub::{Hub, SharedHub, lock};
use heatsub::points::{TopicLayout, TopicRegistry};
use heatsub::http::serve_http;
use heatsub::transport::ServerMessage;
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start() -> (SharedHub, String) {
    let registry = TopicRegistry::new(vec![
        Some("a".to_string()),
        Some("b".to_string()),
        Some("c".to_string()),
    ]);
    let hub = Hub::spawn(registry, TopicLayout::Split, Duration::from_secs(60));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let url = format!("ws://{}/ws", listener.local_addr().expect("local_addr"));
    let served = hub.clone();
    tokio::spawn(async move { serve_http(listener, served, "public").await });
    (hub, url)
}

async fn next_update(ws: &mut Ws) -> ServerMessage {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for update")
        .expect("stream ended")
        .expect("read error");
    serde_json::from_str(msg.to_text().unwrap()).unwrap()
}

async fn hello(ws: &mut Ws) -> Vec<ServerMessage> {
    ws.send(WsMessage::Text(json!({ "type": "hello" }).to_string().into()))
        .await
        .expect("send hello");
    let mut replay = Vec::new();
    for _ in 0..6 {
        replay.push(next_update(ws).await);
    }
    replay
}

#[tokio::test]
async fn relay_end_to_end() {
    let (hub, url) = start().await;

    let (mut ws_a, _) = connect_async(url.as_str()).await.expect("client A connect");
    let replay = hello(&mut ws_a).await;
    assert!(replay.iter().all(|m| m.data().is_none()));

    lock(&hub).ingest("a/temperature", b"10").unwrap();
    assert_eq!(
        next_update(&mut ws_a).await,
        ServerMessage::TemperatureUpdate {
            index: 0,
            data: Some(10.0)
        }
    );

    // a late client converges through replay
    let (mut ws_b, _) = connect_async(url.as_str()).await.expect("client B connect");
    let replay = hello(&mut ws_b).await;
    assert_eq!(
        replay[0],
        ServerMessage::TemperatureUpdate {
            index: 0,
            data: Some(10.0)
        }
    );

    // unknown topics reach nobody
    assert!(lock(&hub).ingest("d/temperature", b"10").is_err());

    lock(&hub).ingest("c/humidity", b"61.5").unwrap();
    let expected = ServerMessage::HumidityUpdate {
        index: 2,
        data: Some(61.5),
    };
    assert_eq!(next_update(&mut ws_a).await, expected);
    assert_eq!(next_update(&mut ws_b).await, expected);
    assert_eq!(lock(&hub).clients.len(), 2);

    ws_b.close(None).await.expect("close");
    let mut remaining = usize::MAX;
    for _ in 0..50 {
        remaining = lock(&hub).clients.len();
        if remaining == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(remaining, 1);
}
