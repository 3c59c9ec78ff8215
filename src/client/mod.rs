//! The `client` module defines a connected real-time client.
//!
//! A `Client` is just an identifier plus the sending half of the channel the
//! transport drains into the WebSocket. There is no per-client filtering:
//! every client receives every update.

pub mod pubsub_client;
pub use pubsub_client::{Client, ClientId};

#[cfg(test)]
mod tests;
