//! HTTP/JSON server for the registration desk.
//!
//! Provides endpoints for:
//! - Opening and reconfiguring events
//! - Registration, waitlist and cancellation
//! - Payment proof submission and admin review
//! - Audit log and pending-payment listings
//! - Reminder dispatch
//! - Health and Prometheus metrics

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, AppState, RpcServer};
