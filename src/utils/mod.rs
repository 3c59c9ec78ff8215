//! The `utils` module provides the pieces shared across `heatsub`:
//! the crate error type and the logging bootstrap.

pub mod error;
pub mod logging;

pub use error::Error;
