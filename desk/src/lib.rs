//! The registration desk: the service that owns every event's admission
//! book, payment ledger and the shared audit log.
//!
//! All operations are synchronous. Admission, promotion, cancellation and
//! reconfiguration of one event serialize on that event's admission lock;
//! payment transitions serialize per registration; audit appends serialize
//! in the audit store. Lock order is always
//! admission → ledger map → registration → audit store.

pub mod config;
pub mod desk;
pub mod error;
pub mod metrics;
pub mod reminder;
pub mod shutdown;
pub mod tracing_spans;

pub use config::DeskConfig;
pub use desk::{Cancellation, EventDesk};
pub use error::DeskError;
pub use metrics::DeskMetrics;
pub use reminder::{LogMailer, ReminderReport};
pub use shutdown::{ShutdownController, ShutdownSignal};
