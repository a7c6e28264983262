use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;
use uuid::Uuid;

use nestlist_types::api::{GiftInput, GiftListQuery, GiftResponse};
use nestlist_types::events::{ChangeAction, GatewayEvent};
use nestlist_types::filter::title_matches;

use crate::error::{ApiError, blocking};
use crate::extract::{Json, Path, Query};
use crate::state::AppState;
use crate::validation;

/// GET /gifts: public list, hidden contribution amounts withheld.
pub async fn list_gifts(
    State(state): State<AppState>,
    Query(query): Query<GiftListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    list(state, query, false).await
}

/// GET /admin/gifts: same list with everything visible.
pub async fn admin_list_gifts(
    State(state): State<AppState>,
    Query(query): Query<GiftListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    list(state, query, true).await
}

async fn list(
    state: AppState,
    query: GiftListQuery,
    reveal_hidden: bool,
) -> Result<Json<Vec<GiftResponse>>, ApiError> {
    let db = state.clone();
    let gifts = blocking(move || db.db.list_gifts()).await?;

    let search = query.q.unwrap_or_default();
    let gifts = gifts
        .iter()
        .filter(|g| query.filter.matches(&g.gift) && title_matches(&g.gift, search.trim()))
        .map(|g| GiftResponse::new(g, reveal_hidden))
        .collect();

    Ok(Json(gifts))
}

/// GET /gifts/{gift_id}
pub async fn get_gift(
    State(state): State<AppState>,
    Path(gift_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let gift = blocking(move || db.db.get_gift(gift_id))
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(GiftResponse::new(&gift, false)))
}

/// POST /admin/gifts
pub async fn create_gift(
    State(state): State<AppState>,
    Json(input): Json<GiftInput>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = validation::gift_input(input)?;

    let db = state.clone();
    let gift = blocking(move || db.db.insert_gift(&draft)).await?;

    info!(gift_id = %gift.id, title = %gift.title, "Gift created");
    state.dispatcher.broadcast(GatewayEvent::gift(ChangeAction::Insert, gift.id));

    Ok((StatusCode::CREATED, Json(gift)))
}

/// PUT /admin/gifts/{gift_id}
pub async fn update_gift(
    State(state): State<AppState>,
    Path(gift_id): Path<Uuid>,
    Json(input): Json<GiftInput>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = validation::gift_input(input)?;

    let db = state.clone();
    let gift = blocking(move || db.db.update_gift(gift_id, &draft))
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(gift_id = %gift.id, "Gift updated");
    state.dispatcher.broadcast(GatewayEvent::gift(ChangeAction::Update, gift.id));

    Ok(Json(gift))
}

/// DELETE /admin/gifts/{gift_id}
pub async fn delete_gift(
    State(state): State<AppState>,
    Path(gift_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let deleted = blocking(move || db.db.delete_gift(gift_id)).await?;
    if !deleted {
        return Err(ApiError::NotFound);
    }

    info!(%gift_id, "Gift deleted");
    state.dispatcher.broadcast(GatewayEvent::gift(ChangeAction::Delete, gift_id));

    Ok(StatusCode::NO_CONTENT)
}
