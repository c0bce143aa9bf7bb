//! Shared utilities for the registration desk.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
