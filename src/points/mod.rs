//! The `points` module holds the per-point model: which MQTT topic feeds
//! each point (`registry`) and the latest readings stored for it (`table`).
//!
//! Points are addressed by a fixed index `0..N`. The index set is decided
//! at startup and never resized; a slot without a topic simply never
//! receives data.

pub mod registry;
pub mod table;

pub use registry::{TopicLayout, TopicRegistry};
pub use table::{PointSnapshot, PointState, PointTable, Reading, ReadingKind};

#[cfg(test)]
mod tests;
