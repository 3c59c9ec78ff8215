use tokio::sync::mpsc::Sender;
use uuid::Uuid;

pub type ClientId = String;

/// A connected WebSocket client.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for the session.
    pub id: ClientId,

    /// Bounded queue of text frames the transport writes to the socket.
    pub sender: Sender<String>,
}

impl Client {
    /// Create a new client with a fresh UUID.
    pub fn new(sender: Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
        }
    }

    /// Queues a text frame without waiting. Returns `false` when the queue is
    /// full or the connection is gone; either way the client is unusable.
    pub fn send_text(&self, text: &str) -> bool {
        self.sender.try_send(text.to_string()).is_ok()
    }
}
