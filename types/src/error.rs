//! Errors raised while constructing shared types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("event id must not be empty")]
    InvalidEventId,

    #[error("invalid event configuration: {0}")]
    InvalidConfig(String),
}
