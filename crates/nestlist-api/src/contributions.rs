use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};
use uuid::Uuid;

use nestlist_db::models::NewContribution;
use nestlist_notify::messages::ContributionEmail;
use nestlist_types::api::{CheckoutRequest, CheckoutResponse, ConfirmResponse, ContributeRequest, EmailStatus};
use nestlist_types::events::{ChangeAction, GatewayEvent};

use crate::error::{ApiError, blocking};
use crate::extract::{Json, Path};
use crate::payment::PROVIDER_LABEL;
use crate::state::AppState;
use crate::validation;

/// POST /gifts/{gift_id}/contributions/checkout
///
/// First step of a contribution: check the amount against the cagnotte and hand
/// back the payment link. Nothing is stored yet.
pub async fn checkout(
    State(state): State<AppState>,
    Path(gift_id): Path<Uuid>,
    Json(req): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::name(&req.name)?;

    let db = state.clone();
    let current = blocking(move || db.db.get_gift(gift_id)).await?;
    validation::contribution(current.as_ref(), req.amount)?;

    Ok(Json(CheckoutResponse {
        amount: req.amount,
        payment_url: state.payments.payment_link(req.amount),
    }))
}

/// POST /gifts/{gift_id}/contributions
///
/// The visitor says they paid. Bounds are checked again against the live total
/// and the record is stored before the email goes out.
pub async fn confirm(
    State(state): State<AppState>,
    Path(gift_id): Path<Uuid>,
    Json(req): Json<ContributeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validation::name(&req.name)?;
    let payer_email = validation::optional_text(req.email.as_deref())?;
    let message = validation::optional_text(req.message.as_deref())?;
    let amount = req.amount;

    let new = NewContribution {
        gift_id,
        name: name.clone(),
        amount,
        payment_provider: Some(PROVIDER_LABEL.to_string()),
        payment_id: None,
        show_amount: req.show_amount,
    };

    let db = state.clone();
    let (contribution, gift_title) = blocking(move || {
        db.db
            .insert_contribution_checked(&new, |current| validation::contribution(current, amount))
    })
    .await??;

    info!(%gift_id, contribution_id = %contribution.id, amount, "Contribution recorded");
    state
        .dispatcher
        .broadcast(GatewayEvent::contribution(ChangeAction::Insert, contribution.id));

    let notification = ContributionEmail {
        gift_title,
        contributor_name: name,
        amount,
        show_amount: contribution.show_amount,
        payer_email,
        message,
    };
    let email = match state.notifier.contribution(&notification).await {
        Ok(()) => EmailStatus::sent(),
        Err(e) => {
            warn!(%gift_id, "Contribution email failed: {}", e);
            EmailStatus::failed(e.to_string())
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(ConfirmResponse {
            record: contribution,
            email,
        }),
    ))
}

/// DELETE /admin/contributions/{contribution_id}
pub async fn delete_contribution(
    State(state): State<AppState>,
    Path(contribution_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let removed = blocking(move || db.db.delete_contribution(contribution_id))
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(%contribution_id, gift_id = %removed.gift_id, "Contribution removed");
    state
        .dispatcher
        .broadcast(GatewayEvent::contribution(ChangeAction::Delete, contribution_id));

    Ok(StatusCode::NO_CONTENT)
}
