//! The `transport` module is responsible for the real-time side of the
//! service: the JSON frames exchanged with browsers and the per-connection
//! WebSocket handler that carries them.

pub mod message;
pub mod websocket;

pub use message::{ClientMessage, ServerMessage};
pub use websocket::{handle_socket, handle_text};

#[cfg(test)]
mod tests;
