use axum::{
    Json, Router,
    extract::{State, WebSocketUpgrade},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use nestlist_gateway::connection;

use crate::middleware::require_admin;
use crate::state::AppState;
use crate::{auth, contributions, donations, functions, gifts, reservations};

/// Every HTTP route of the registry.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/gifts", get(gifts::list_gifts))
        .route("/gifts/{gift_id}", get(gifts::get_gift))
        .route("/gifts/{gift_id}/reserve", post(reservations::reserve))
        .route("/gifts/{gift_id}/unreserve", post(reservations::unreserve))
        .route("/gifts/{gift_id}/contributions/checkout", post(contributions::checkout))
        .route("/gifts/{gift_id}/contributions", post(contributions::confirm))
        .route("/donations/checkout", post(donations::checkout))
        .route("/donations", post(donations::confirm))
        .route("/admin/login", post(auth::login))
        .route("/gateway", get(ws_upgrade));

    let function_routes = Router::new()
        .route(
            "/functions/send-contribution-email",
            post(functions::send_contribution_email).fallback(functions::method_not_allowed),
        )
        .route(
            "/functions/send-reservation-email",
            post(functions::send_reservation_email).fallback(functions::method_not_allowed),
        )
        .route(
            "/functions/send-free-donation-email",
            post(functions::send_free_donation_email).fallback(functions::method_not_allowed),
        );

    let admin_routes = Router::new()
        .route("/admin/gifts", get(gifts::admin_list_gifts))
        .route("/admin/gifts", post(gifts::create_gift))
        .route("/admin/gifts/{gift_id}", put(gifts::update_gift))
        .route("/admin/gifts/{gift_id}", delete(gifts::delete_gift))
        .route(
            "/admin/contributions/{contribution_id}",
            delete(contributions::delete_contribution),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public_routes)
        .merge(function_routes)
        .merge(admin_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "watchers": state.dispatcher.watcher_count(),
        "email_configured": state.notifier.is_configured(),
    }))
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let dispatcher = state.dispatcher.clone();
    ws.on_upgrade(move |socket| connection::handle_connection(socket, dispatcher))
}
