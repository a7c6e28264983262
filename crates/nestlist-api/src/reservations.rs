use axum::{extract::State, response::IntoResponse};
use tracing::{info, warn};
use uuid::Uuid;

use nestlist_db::ReserveOutcome;
use nestlist_notify::messages::ReservationEmail;
use nestlist_types::api::{ConfirmResponse, EmailStatus, ReserveRequest};
use nestlist_types::events::{ChangeAction, GatewayEvent};

use crate::error::{ApiError, blocking};
use crate::extract::{Json, Path};
use crate::state::AppState;
use crate::validation;

/// POST /gifts/{gift_id}/reserve
///
/// Claims the gift for one person, then tries to tell the parents by email.
/// A failed email does not undo the reservation.
pub async fn reserve(
    State(state): State<AppState>,
    Path(gift_id): Path<Uuid>,
    Json(req): Json<ReserveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validation::name(&req.name)?;
    let email = validation::optional_text(req.email.as_deref())?;
    let message = validation::optional_text(req.message.as_deref())?;

    let db = state.clone();
    let who = name.clone();
    let outcome = blocking(move || db.db.reserve_gift(gift_id, &who)).await?;

    let gift = match outcome {
        ReserveOutcome::Reserved(gift) => gift,
        ReserveOutcome::NotFound => return Err(ApiError::NotFound),
        ReserveOutcome::Unavailable(gift) if gift.is_shared => {
            return Err(ApiError::validation(
                "Ce cadeau se finance en cagnotte, il ne peut pas être réservé",
            ));
        }
        ReserveOutcome::Unavailable(_) => {
            return Err(ApiError::Conflict("Ce cadeau est déjà réservé".into()));
        }
    };

    info!(%gift_id, reserved_by = %name, "Gift reserved");
    state.dispatcher.broadcast(GatewayEvent::gift(ChangeAction::Update, gift_id));

    let notification = ReservationEmail {
        gift_title: gift.title.clone(),
        reserved_by: name,
        amount: gift.price.unwrap_or(0.0),
        payer_email: email,
        message,
    };
    let email = match state.notifier.reservation(&notification).await {
        Ok(()) => EmailStatus::sent(),
        Err(e) => {
            warn!(%gift_id, "Reservation email failed: {}", e);
            EmailStatus::failed(e.to_string())
        }
    };

    Ok(Json(ConfirmResponse { record: gift, email }))
}

/// POST /gifts/{gift_id}/unreserve. Anyone holding the link may release a gift.
pub async fn unreserve(
    State(state): State<AppState>,
    Path(gift_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let (gift, changed) = blocking(move || db.db.unreserve_gift(gift_id))
        .await?
        .ok_or(ApiError::NotFound)?;

    if changed {
        info!(%gift_id, "Gift released");
        state.dispatcher.broadcast(GatewayEvent::gift(ChangeAction::Update, gift_id));
    }

    Ok(Json(gift))
}
