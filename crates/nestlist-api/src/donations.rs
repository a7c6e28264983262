use axum::{extract::State, response::IntoResponse};
use tracing::{info, warn};

use nestlist_notify::messages::FreeDonationEmail;
use nestlist_types::api::{
    CheckoutRequest, CheckoutResponse, ConfirmResponse, DonationReceipt, DonationRequest, EmailStatus,
};

use crate::error::ApiError;
use crate::extract::Json;
use crate::state::AppState;
use crate::validation;

/// POST /donations/checkout: validate a free donation and return the payment link.
pub async fn checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::name(&req.name)?;
    let amount = validation::donation(req.amount, state.payments.donation_min)?;

    Ok(Json(CheckoutResponse {
        amount,
        payment_url: state.payments.payment_link(amount),
    }))
}

/// POST /donations: free donations are not stored, the parents are only told by email.
pub async fn confirm(
    State(state): State<AppState>,
    Json(req): Json<DonationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validation::name(&req.name)?;
    let amount = validation::donation(req.amount, state.payments.donation_min)?;
    let donor_email = validation::optional_text(req.email.as_deref())?;
    let message = validation::optional_text(req.message.as_deref())?;

    info!(donor = %name, amount, "Free donation announced");

    let notification = FreeDonationEmail {
        donor_name: name.clone(),
        amount,
        donor_email,
        message,
    };
    let email = match state.notifier.free_donation(&notification).await {
        Ok(()) => EmailStatus::sent(),
        Err(e) => {
            warn!("Free donation email failed: {}", e);
            EmailStatus::failed(e.to_string())
        }
    };

    Ok(Json(ConfirmResponse {
        record: DonationReceipt { name, amount },
        email,
    }))
}
