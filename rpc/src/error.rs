//! RPC error types and their HTTP mapping.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use regdesk_admission::AdmissionError;
use regdesk_desk::DeskError;
use regdesk_verification::PaymentError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Desk(#[from] DeskError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("server error: {0}")]
    Server(String),
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl RpcError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RpcError::Desk(e) => desk_status(e),
        }
    }
}

fn desk_status(error: &DeskError) -> StatusCode {
    match error {
        DeskError::EventNotFound(_) => StatusCode::NOT_FOUND,
        DeskError::AlreadyCancelled(_) => StatusCode::CONFLICT,
        DeskError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        DeskError::Admission(e) => match e {
            AdmissionError::WindowClosed | AdmissionError::CapacityExceeded => {
                StatusCode::CONFLICT
            }
            AdmissionError::Validation(_)
            | AdmissionError::EventMismatch { .. }
            | AdmissionError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
        },
        DeskError::Payment(e) => match e {
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::Validation(_) => StatusCode::BAD_REQUEST,
            PaymentError::InvalidStateTransition { .. }
            | PaymentError::AlreadyVerified
            | PaymentError::NoPaymentExpected
            | PaymentError::Cancelled(_) => StatusCode::CONFLICT,
            PaymentError::Audit(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        DeskError::IndexCollision(_)
        | DeskError::Audit(_)
        | DeskError::Config(_)
        | DeskError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request refused");
        }
        (
            status,
            Json(ErrorBody {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for RpcError {
    fn from(rejection: JsonRejection) -> Self {
        RpcError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for RpcError {
    fn from(rejection: PathRejection) -> Self {
        RpcError::InvalidRequest(rejection.body_text())
    }
}
