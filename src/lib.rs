//! # heatsub
//!
//! `heatsub` relays temperature and humidity readings from MQTT to browsers.
//! It keeps the latest reading for a fixed set of heatmap points, clears a
//! point that has gone quiet for longer than the expiry window, and pushes
//! every change to connected WebSocket clients.
//!
//! ## Core Modules
//!
//! - `points`: topic registry and the table of latest readings.
//! - `hub`: the owned state object tying points, expiry timers and clients together.
//! - `ingest`: MQTT subscription and payload parsing.
//! - `client`: a connected WebSocket client.
//! - `transport`: the per-connection WebSocket handler and its JSON frames.
//! - `http`: the one listener: static files, JSON snapshot and the `/ws` upgrade.
//! - `config`: loading settings from files and the environment.
//! - `utils`: error type and logging setup.

pub mod client;
pub mod config;
pub mod http;
pub mod hub;
pub mod ingest;
pub mod points;
pub mod transport;
pub mod utils;
