pub mod engine;
pub mod expiry;

pub use engine::{Hub, SharedHub, lock, run_expiry_loop};
pub use expiry::Expired;
