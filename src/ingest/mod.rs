//! The `ingest` module turns MQTT traffic into hub updates.
//!
//! - `payload`: parsing of plain-text numeric payloads and the ingest error type
//! - `mqtt`: broker connection, subscriptions and the event loop

pub mod mqtt;
pub mod payload;

pub use mqtt::{broker_options, run_ingest_loop};
pub use payload::{IngestError, PayloadError, parse_value};
