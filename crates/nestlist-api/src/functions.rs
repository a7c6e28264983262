//! Stand-alone notification endpoints.
//!
//! Each one takes a JSON payload, sends one email and answers with the uniform
//! `{ ok: true }` / `{ ok: false, error }` shape, whatever went wrong.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{info, warn};

use nestlist_notify::NotifyError;
use nestlist_notify::messages::{
    ContributionEmailPayload, FreeDonationEmailPayload, ReservationEmailPayload,
};

use crate::state::AppState;

fn reply(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}

fn missing_configuration() -> Response {
    reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "ok": false, "error": "Missing email configuration" }),
    )
}

fn invalid_payload() -> Response {
    reply(
        StatusCode::BAD_REQUEST,
        json!({ "ok": false, "error": "Invalid payload" }),
    )
}

/// Parse leniently: malformed JSON and missing fields both end up as `Invalid payload`.
fn parse<T: DeserializeOwned>(body: &Bytes) -> Option<T> {
    serde_json::from_slice(body).ok()
}

fn outcome(kind: &str, result: Result<(), NotifyError>) -> Response {
    match result {
        Ok(()) => {
            info!(kind, "Notification sent");
            reply(StatusCode::OK, json!({ "ok": true }))
        }
        Err(NotifyError::NotConfigured) => missing_configuration(),
        Err(NotifyError::Rejected { status, body }) => {
            warn!(kind, status, "Email API rejected notification");
            reply(
                StatusCode::BAD_GATEWAY,
                json!({ "ok": false, "resendStatus": status, "error": body }),
            )
        }
        Err(e) => {
            warn!(kind, "Notification failed: {}", e);
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "ok": false, "error": e.to_string() }),
            )
        }
    }
}

/// POST /functions/send-contribution-email
pub async fn send_contribution_email(State(state): State<AppState>, body: Bytes) -> Response {
    if !state.notifier.contributions_configured() {
        return missing_configuration();
    }
    let Some(email) = parse::<ContributionEmailPayload>(&body).and_then(|p| p.validate()) else {
        return invalid_payload();
    };
    outcome("contribution", state.notifier.contribution(&email).await)
}

/// POST /functions/send-reservation-email
pub async fn send_reservation_email(State(state): State<AppState>, body: Bytes) -> Response {
    if !state.notifier.is_configured() {
        return missing_configuration();
    }
    let Some(email) = parse::<ReservationEmailPayload>(&body).and_then(|p| p.validate()) else {
        return invalid_payload();
    };
    outcome("reservation", state.notifier.reservation(&email).await)
}

/// POST /functions/send-free-donation-email
pub async fn send_free_donation_email(State(state): State<AppState>, body: Bytes) -> Response {
    if !state.notifier.is_configured() {
        return missing_configuration();
    }
    let Some(email) = parse::<FreeDonationEmailPayload>(&body).and_then(|p| p.validate()) else {
        return invalid_payload();
    };
    outcome("free-donation", state.notifier.free_donation(&email).await)
}

/// Any other method on a notification endpoint.
pub async fn method_not_allowed() -> Response {
    reply(
        StatusCode::METHOD_NOT_ALLOWED,
        json!({ "ok": false, "error": "Method not allowed" }),
    )
}
