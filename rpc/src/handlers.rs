//! RPC request handlers and their wire types.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use regdesk_admission::{Admission, AdmissionSummary};
use regdesk_desk::{tracing_spans::rpc_span, DeskError, EventDesk, ReminderReport};
use regdesk_types::{
    AuditLogEntry, EventConfig, EventId, FeeQuote, PaymentDecision, PaymentProof, PaymentStatus,
    Registration, RegistrationIndex, Submission, WaitlistEntry,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::RpcError;
use crate::server::AppState;

// ── Registration ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum RegisterResponse {
    Confirmed {
        registration_index: RegistrationIndex,
        fee: FeeQuote,
        payment_status: PaymentStatus,
    },
    Waitlisted {
        rank: usize,
    },
}

impl From<Admission> for RegisterResponse {
    fn from(admission: Admission) -> Self {
        match admission {
            Admission::Confirmed(reg) => RegisterResponse::Confirmed {
                registration_index: reg.registration_index,
                fee: reg.fee,
                payment_status: reg.payment_status,
            },
            Admission::Waitlisted { rank } => RegisterResponse::Waitlisted { rank },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub cancelled: Registration,
    pub promoted: Option<Registration>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteResponse {
    pub promoted: Option<Registration>,
}

// ── Events ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub config: EventConfig,
    pub summary: AdmissionSummary,
}

// ── Payment ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProofRequest {
    #[serde(flatten)]
    pub proof: PaymentProof,
    #[serde(default)]
    pub performed_by: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyAction {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub action: VerifyAction,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub performed_by: Option<String>,
}

impl VerifyPaymentRequest {
    pub fn decision(&self) -> PaymentDecision {
        match self.action {
            VerifyAction::Approve => PaymentDecision::Approve,
            VerifyAction::Reject => PaymentDecision::Reject {
                reason: self.rejection_reason.clone(),
            },
        }
    }
}

/// Registration after a payment transition, with the audit entry recording it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTransitionResponse {
    pub registration: Registration,
    pub log_entry: AuditLogEntry,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPaymentsResponse {
    pub pending_payments: Vec<Registration>,
}

// ── Reminders ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RemindRequest {
    pub subject: String,
    pub message: String,
}

// ── Health ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub events: usize,
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn event_id(raw: String) -> Result<EventId, RpcError> {
    EventId::new(raw).map_err(|e| RpcError::InvalidRequest(e.to_string()))
}

/// Run a desk operation on the blocking pool inside an `rpc` span. Desk
/// operations take locks and may fsync the audit journal.
async fn desk_call<T, F>(action: &'static str, desk: &Arc<EventDesk>, f: F) -> Result<T, RpcError>
where
    T: Send + 'static,
    F: FnOnce(&EventDesk) -> Result<T, DeskError> + Send + 'static,
{
    let desk = Arc::clone(desk);
    let span = rpc_span(action);
    tokio::task::spawn_blocking(move || span.in_scope(|| f(desk.as_ref())))
        .await
        .map_err(|e| RpcError::Server(format!("{action} task failed: {e}")))?
        .map_err(RpcError::from)
}

// ── Handlers ─────────────────────────────────────────────────────────────

pub async fn open_event(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<EventConfig>, JsonRejection>,
) -> Result<Json<EventResponse>, RpcError> {
    let Path(raw) = path?;
    let id = event_id(raw)?;
    let Json(config) = body?;
    if config.id != id {
        return Err(RpcError::InvalidRequest(format!(
            "body is for event {}, path names {id}",
            config.id
        )));
    }
    let response = desk_call("open_event", &state.desk, move |desk| {
        let summary = desk.open_event(config)?;
        let config = desk.event_config(&id)?;
        Ok(EventResponse { config, summary })
    })
    .await?;
    Ok(Json(response))
}

pub async fn get_event(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<EventResponse>, RpcError> {
    let Path(raw) = path?;
    let id = event_id(raw)?;
    let response = desk_call("get_event", &state.desk, move |desk| {
        Ok(EventResponse {
            config: desk.event_config(&id)?,
            summary: desk.summary(&id)?,
        })
    })
    .await?;
    Ok(Json(response))
}

pub async fn register(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Submission>, JsonRejection>,
) -> Result<Json<RegisterResponse>, RpcError> {
    let Path(raw) = path?;
    let id = event_id(raw)?;
    let Json(submission) = body?;
    let admission = desk_call("register", &state.desk, move |desk| {
        desk.attempt_register(&id, submission)
    })
    .await?;
    Ok(Json(admission.into()))
}

pub async fn list_registrations(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Registration>>, RpcError> {
    let Path(raw) = path?;
    let id = event_id(raw)?;
    let regs = desk_call("registrations", &state.desk, move |desk| desk.registrations(&id)).await?;
    Ok(Json(regs))
}

pub async fn list_waitlist(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<WaitlistEntry>>, RpcError> {
    let Path(raw) = path?;
    let id = event_id(raw)?;
    let entries = desk_call("waitlist", &state.desk, move |desk| desk.waitlist(&id)).await?;
    Ok(Json(entries))
}

pub async fn submit_payment_proof(
    State(state): State<AppState>,
    path: Result<Path<(String, u64)>, PathRejection>,
    body: Result<Json<SubmitProofRequest>, JsonRejection>,
) -> Result<Json<PaymentTransitionResponse>, RpcError> {
    let Path((raw, index)) = path?;
    let id = event_id(raw)?;
    let Json(request) = body?;
    let transition = desk_call("submit_proof", &state.desk, move |desk| {
        desk.submit_proof(
            &id,
            RegistrationIndex::new(index),
            request.proof,
            request.performed_by.as_deref(),
        )
    })
    .await?;
    Ok(Json(PaymentTransitionResponse {
        registration: transition.registration,
        log_entry: transition.entry,
    }))
}

pub async fn cancel_registration(
    State(state): State<AppState>,
    path: Result<Path<(String, u64)>, PathRejection>,
) -> Result<Json<CancelResponse>, RpcError> {
    let Path((raw, index)) = path?;
    let id = event_id(raw)?;
    let cancellation = desk_call("cancel", &state.desk, move |desk| {
        desk.cancel_registration(&id, RegistrationIndex::new(index))
    })
    .await?;
    Ok(Json(CancelResponse {
        cancelled: cancellation.cancelled,
        promoted: cancellation.promoted,
    }))
}

pub async fn promote(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<PromoteResponse>, RpcError> {
    let Path(raw) = path?;
    let id = event_id(raw)?;
    let promoted =
        desk_call("promote", &state.desk, move |desk| desk.promote_from_waitlist(&id)).await?;
    Ok(Json(PromoteResponse { promoted }))
}

pub async fn pending_payments(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<PendingPaymentsResponse>, RpcError> {
    let Path(raw) = path?;
    let id = event_id(raw)?;
    let pending =
        desk_call("pending_payments", &state.desk, move |desk| desk.pending_payments(&id)).await?;
    Ok(Json(PendingPaymentsResponse {
        pending_payments: pending,
    }))
}

pub async fn payment_logs(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<AuditLogEntry>>, RpcError> {
    let Path(raw) = path?;
    let id = event_id(raw)?;
    let logs = desk_call("payment_logs", &state.desk, move |desk| desk.payment_logs(&id)).await?;
    Ok(Json(logs))
}

pub async fn verify_payment(
    State(state): State<AppState>,
    path: Result<Path<(String, u64)>, PathRejection>,
    body: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<Json<PaymentTransitionResponse>, RpcError> {
    let Path((raw, index)) = path?;
    let id = event_id(raw)?;
    let Json(request) = body?;
    let actor = request
        .performed_by
        .clone()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| state.default_performed_by.to_string());
    let decision = request.decision();
    let transition = desk_call("verify_payment", &state.desk, move |desk| {
        desk.verify_payment(&id, RegistrationIndex::new(index), decision, &actor)
    })
    .await?;
    Ok(Json(PaymentTransitionResponse {
        registration: transition.registration,
        log_entry: transition.entry,
    }))
}

pub async fn remind(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<RemindRequest>, JsonRejection>,
) -> Result<Json<ReminderReport>, RpcError> {
    let Path(raw) = path?;
    let id = event_id(raw)?;
    let Json(request) = body?;
    let report = desk_call("remind", &state.desk, move |desk| {
        desk.send_reminders(&id, &request.subject, &request.message)
    })
    .await?;
    Ok(Json(report))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        events: state.desk.event_ids().len(),
    })
}

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, RpcError> {
    let text = state
        .desk
        .metrics()
        .encode()
        .map_err(|e| RpcError::Server(format!("metrics encoding failed: {e}")))?;
    Ok(([(CONTENT_TYPE, "text/plain; version=0.0.4")], text))
}
