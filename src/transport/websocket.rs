//! WebSocket transport
//!
//! Bridges upgraded WebSocket connections to the hub:
//! - every connection becomes a `Client` registered with the hub, so it
//!   receives all point updates from then on
//! - a `{"type":"hello"}` frame triggers a replay of the whole point table
//!   to that client only
//! - on disconnect the client is removed; nothing else happens
//!
//! Each client gets a bounded outbound queue. The hub drops a client whose
//! queue is full instead of buffering for it.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::spawn;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::{Client, ClientId};
use crate::hub::{SharedHub, lock};
use crate::transport::message::ClientMessage;

/// Serves one upgraded connection until the peer goes away.
pub async fn handle_socket(socket: WebSocket, hub: SharedHub) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let capacity = lock(&hub).client_queue_capacity();
    let (tx, mut rx) = mpsc::channel::<String>(capacity);
    let client = Client::new(tx);
    let client_id = client.id.clone();
    lock(&hub).register_client(client);

    {
        let client_id = client_id.clone();
        // ends once the hub drops the client's sender
        spawn(async move {
            while let Some(text) = rx.recv().await {
                if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
                    debug!("Failed to send message to {client_id}: {e}");
                    break;
                }
            }
            let _ = ws_sender.close().await;
            debug!("Send loop closed for {client_id}");
        });
    }

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_text(&hub, &client_id, text.as_str());
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Read error from {client_id}: {e}");
                break;
            }
        }
    }

    lock(&hub).remove_client(&client_id);
    debug!("{client_id} disconnected");
}

/// Handles one text frame from a client. Returns the number of replayed
/// events for a `hello`, `None` for frames that were not understood.
pub fn handle_text(hub: &SharedHub, client_id: &ClientId, text: &str) -> Option<usize> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Hello) => {
            info!("New client connected: {client_id}");
            Some(lock(hub).replay(client_id))
        }
        Err(err) => {
            warn!(
                "Invalid client message from {client_id}: {err} | {}",
                &text.chars().take(100).collect::<String>()
            );
            None
        }
    }
}
