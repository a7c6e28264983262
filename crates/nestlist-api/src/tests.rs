use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use nestlist_db::Database;
use nestlist_gateway::dispatcher::Dispatcher;
use nestlist_notify::{EmailSettings, Notifier, Outbox};
use nestlist_types::events::{ChangeAction, GatewayEvent, Table};
use tokio::sync::broadcast::error::TryRecvError;

use crate::auth::AdminAuth;
use crate::payment::PaymentSettings;
use crate::router;
use crate::state::{AppState, AppStateInner};

const PASSWORD: &str = "berceuse-2025";

fn email_settings() -> EmailSettings {
    EmailSettings {
        reservation_to: Some("parents@example.com".into()),
        ..Default::default()
    }
}

fn state_with(notifier: Notifier) -> AppState {
    Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        dispatcher: Dispatcher::new(),
        notifier,
        auth: AdminAuth::from_password(PASSWORD, "test-secret").unwrap(),
        payments: PaymentSettings::default(),
    })
}

fn setup() -> (Router, AppState, Arc<Outbox>) {
    let outbox = Arc::new(Outbox::new());
    let state = state_with(Notifier::new(outbox.clone(), email_settings()));
    (router(state.clone()), state, outbox)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let (status, bytes) = send(app, request).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn post_raw(app: &Router, uri: &str, body: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn login(app: &Router) -> String {
    let (status, body) = call(app, "POST", "/admin/login", None, Some(json!({ "password": PASSWORD }))).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn create_gift(app: &Router, token: &str, gift: Value) -> String {
    let (status, body) = call(app, "POST", "/admin/gifts", Some(token), Some(gift)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_email_configuration() {
    let (app, _, _) = setup();
    let (status, body) = call(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["email_configured"], true);
}

#[tokio::test]
async fn admin_routes_need_a_valid_token() {
    let (app, _, _) = setup();

    let (status, body) = call(&app, "POST", "/admin/gifts", None, Some(json!({ "title": "Mobile" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], false);

    let (status, _) = call(&app, "GET", "/admin/gifts", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, "POST", "/admin/login", None, Some(json!({ "password": "admin123" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app).await;
    let (status, body) = call(&app, "GET", "/admin/gifts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn catalog_management_and_filters() {
    let (app, state, _) = setup();
    let mut events = state.dispatcher.subscribe();
    let token = login(&app).await;

    let mobile = create_gift(&app, &token, json!({ "title": "Mobile", "category": "dodo", "price": 39.9 })).await;
    create_gift(
        &app,
        &token,
        json!({ "title": "Poussette Yoyo", "is_shared": true, "target_amount": 400.0 }),
    )
    .await;

    match events.recv().await.unwrap() {
        GatewayEvent::RowChanged { table, action, .. } => {
            assert_eq!(table, Table::Gifts);
            assert_eq!(action, ChangeAction::Insert);
        }
        other => panic!("unexpected event {:?}", other),
    }

    let (_, all) = call(&app, "GET", "/gifts", None, None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(all[0]["title"], "Mobile");
    assert_eq!(all[0]["category"], "dodo");

    let (_, shared) = call(&app, "GET", "/gifts?filter=shared", None, None).await;
    assert_eq!(shared.as_array().unwrap().len(), 1);
    assert_eq!(shared[0]["remaining"], 400.0);

    let (_, search) = call(&app, "GET", "/gifts?q=yoyo", None, None).await;
    assert_eq!(search[0]["title"], "Poussette Yoyo");

    let (status, body) = call(&app, "POST", "/admin/gifts", Some(&token), Some(json!({ "title": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Le titre est obligatoire");

    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/admin/gifts/{}", mobile),
        Some(&token),
        Some(json!({ "title": "Mobile musical", "category": "jeux" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Mobile musical");
    assert_eq!(updated["price"], Value::Null);

    let (status, _) = call(&app, "DELETE", &format!("/admin/gifts/{}", mobile), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, "GET", &format!("/gifts/{}", mobile), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reservation_flow() {
    let (app, _, outbox) = setup();
    let token = login(&app).await;
    let id = create_gift(&app, &token, json!({ "title": "Baignoire", "price": 25.0 })).await;

    let (status, _) = call(&app, "POST", &format!("/gifts/{}/reserve", id), None, Some(json!({ "name": " " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/gifts/{}/reserve", id),
        None,
        Some(json!({ "name": "Claire", "message": "Avec plaisir" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["reserved"], true);
    assert_eq!(body["record"]["reserved_by"], "Claire");
    assert_eq!(body["email"]["sent"], true);

    let sent = outbox.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "🎁 Cadeau réservé : Baignoire");
    assert!(sent[0].text.contains("Montant : 25.00 €"));

    let (status, body) = call(&app, "POST", &format!("/gifts/{}/reserve", id), None, Some(json!({ "name": "Paul" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Ce cadeau est déjà réservé");

    let (_, reserved) = call(&app, "GET", "/gifts?filter=reserved", None, None).await;
    assert_eq!(reserved.as_array().unwrap().len(), 1);

    let (status, body) = call(&app, "POST", &format!("/gifts/{}/unreserve", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reserved"], false);
    assert_eq!(body["reserved_by"], Value::Null);

    let (_, available) = call(&app, "GET", "/gifts?filter=available", None, None).await;
    assert_eq!(available.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn contribution_flow_hides_amounts_on_request() {
    let (app, _, outbox) = setup();
    let token = login(&app).await;
    let id = create_gift(
        &app,
        &token,
        json!({ "title": "Poussette", "is_shared": true, "target_amount": 100.0, "min_contribution": 10.0 }),
    )
    .await;

    let checkout = format!("/gifts/{}/contributions/checkout", id);
    let (status, body) = call(&app, "POST", &checkout, None, Some(json!({ "name": "Marie", "amount": 150.0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Le montant maximum est de 100.00 €");

    let (status, body) = call(&app, "POST", &checkout, None, Some(json!({ "name": "Marie", "amount": 5.0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Le montant minimum est de 10.00 €");

    let (status, body) = call(&app, "POST", &checkout, None, Some(json!({ "name": "Marie", "amount": 20.0 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment_url"], "https://paypal.me/listenaissancemenguy/20.00");

    let (status, body) = call(
        &app,
        "POST",
        &format!("/gifts/{}/contributions", id),
        None,
        Some(json!({ "name": "Marie", "amount": 20.0, "show_amount": false })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["record"]["payment_provider"], "PayPal.Me");
    assert_eq!(body["email"]["sent"], true);
    assert!(outbox.sent()[0].text.contains("Afficher le montant : Non"));

    let (_, public) = call(&app, "GET", &format!("/gifts/{}", id), None, None).await;
    assert_eq!(public["total_contributed"], 20.0);
    assert_eq!(public["remaining"], 80.0);
    assert_eq!(public["contributions"][0]["name"], "Marie");
    assert_eq!(public["contributions"][0]["amount"], Value::Null);

    let (_, admin) = call(&app, "GET", "/admin/gifts", Some(&token), None).await;
    assert_eq!(admin[0]["contributions"][0]["amount"], 20.0);

    let contribution_id = admin[0]["contributions"][0]["id"].as_str().unwrap().to_string();
    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/admin/contributions/{}", contribution_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, public) = call(&app, "GET", &format!("/gifts/{}", id), None, None).await;
    assert_eq!(public["total_contributed"], 0.0);
}

#[tokio::test]
async fn contribution_survives_email_failure() {
    let outbox = Arc::new(Outbox::rejecting(403, "domain not verified"));
    let state = state_with(Notifier::new(outbox, email_settings()));
    let app = router(state);
    let token = login(&app).await;
    let id = create_gift(&app, &token, json!({ "title": "Siège auto", "is_shared": true })).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/gifts/{}/contributions", id),
        None,
        Some(json!({ "name": "Paul", "amount": 30.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"]["sent"], false);

    let (_, gift) = call(&app, "GET", &format!("/gifts/{}", id), None, None).await;
    assert_eq!(gift["total_contributed"], 30.0);
    assert_eq!(gift["contributions"][0]["amount"], 30.0);
}

#[tokio::test]
async fn single_gifts_take_no_contributions() {
    let (app, _, _) = setup();
    let token = login(&app).await;
    let id = create_gift(&app, &token, json!({ "title": "Body" })).await;

    let (status, _) = call(
        &app,
        "POST",
        &format!("/gifts/{}/contributions", id),
        None,
        Some(json!({ "name": "Paul", "amount": 30.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn free_donation_flow() {
    let (app, _, outbox) = setup();

    let (status, body) = call(&app, "POST", "/donations/checkout", None, Some(json!({ "name": "Léa", "amount": 0.5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Le montant minimum est de 1.00 €");

    let (status, body) = call(&app, "POST", "/donations/checkout", None, Some(json!({ "name": "Léa", "amount": 15.0 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment_url"], "https://paypal.me/listenaissancemenguy/15.00");

    let (status, body) = call(&app, "POST", "/donations", None, Some(json!({ "name": "Léa", "amount": 15.0 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["name"], "Léa");
    assert_eq!(body["email"]["sent"], true);
    assert_eq!(outbox.sent()[0].subject, "💛 Don libre reçu : Léa (15.00 €)");
}

#[tokio::test]
async fn notification_endpoints_answer_uniformly() {
    let (app, _, outbox) = setup();

    let (status, body) = call(
        &app,
        "POST",
        "/functions/send-free-donation-email",
        None,
        Some(json!({ "donorName": "Paul", "amount": 20 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
    assert_eq!(outbox.sent().len(), 1);

    let (status, body) = call(
        &app,
        "POST",
        "/functions/send-contribution-email",
        None,
        Some(json!({ "giftTitle": "Poussette" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "ok": false, "error": "Invalid payload" }));

    let (status, body) = call(&app, "GET", "/functions/send-reservation-email", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn notification_endpoint_failures() {
    let unconfigured = router(state_with(Notifier::disabled()));
    let payload = json!({ "giftTitle": "Mobile", "reservedBy": "Claire", "amount": 0 });

    let (status, body) = call(
        &unconfigured,
        "POST",
        "/functions/send-reservation-email",
        None,
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Missing email configuration");

    let rejecting = router(state_with(Notifier::new(
        Arc::new(Outbox::rejecting(422, "invalid to")),
        email_settings(),
    )));
    let (status, body) = call(
        &rejecting,
        "POST",
        "/functions/send-reservation-email",
        None,
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({ "ok": false, "resendStatus": 422, "error": "invalid to" }));
}

#[tokio::test]
async fn malformed_requests_get_the_error_body() {
    let (app, _, _) = setup();
    let token = login(&app).await;
    let id = create_gift(&app, &token, json!({ "title": "Baignoire" })).await;

    let (status, body) = call(&app, "POST", &format!("/gifts/{}/reserve", id), None, Some(json!({ "nom": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Requête invalide"));

    let (status, body) = post_raw(&app, &format!("/gifts/{}/reserve", id), "{\"name\": ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);

    let (status, body) = call(&app, "GET", "/gifts/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Adresse invalide"));

    let (status, body) = call(&app, "GET", "/gifts?filter=bientot", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Paramètres invalides"));
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let (app, _, _) = setup();
    let token = login(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        "/admin/gifts",
        Some(&token),
        Some(json!({ "title": "Hochet", "category": "toys" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);

    let (_, admin) = call(&app, "GET", "/admin/gifts", Some(&token), None).await;
    assert_eq!(admin, json!([]));
}

#[tokio::test]
async fn zero_target_cagnotte_stays_open() {
    let (app, _, _) = setup();
    let token = login(&app).await;
    let id = create_gift(
        &app,
        &token,
        json!({ "title": "Lit parapluie", "is_shared": true, "target_amount": 0.0 }),
    )
    .await;

    let (_, gift) = call(&app, "GET", &format!("/gifts/{}", id), None, None).await;
    assert_eq!(gift["fully_funded"], false);
    assert_eq!(gift["remaining"], Value::Null);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/gifts/{}/contributions", id),
        None,
        Some(json!({ "name": "Paul", "amount": 30.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, gift) = call(&app, "GET", &format!("/gifts/{}", id), None, None).await;
    assert_eq!(gift["total_contributed"], 30.0);
    assert_eq!(gift["fully_funded"], false);
}

#[tokio::test]
async fn releasing_a_free_gift_changes_nothing() {
    let (app, state, _) = setup();
    let token = login(&app).await;
    let id = create_gift(&app, &token, json!({ "title": "Gigoteuse" })).await;

    let mut events = state.dispatcher.subscribe();
    let (status, body) = call(&app, "POST", &format!("/gifts/{}/unreserve", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reserved"], false);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn notification_endpoints_check_configuration_first() {
    let unconfigured = router(state_with(Notifier::disabled()));
    let (status, body) = call(
        &unconfigured,
        "POST",
        "/functions/send-contribution-email",
        None,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "ok": false, "error": "Missing email configuration" }));

    let outbox = Arc::new(Outbox::new());
    let contributions_only = router(state_with(Notifier::new(
        outbox.clone(),
        EmailSettings {
            contribution_to: Some("cagnotte@example.com".into()),
            ..Default::default()
        },
    )));
    let (status, _) = call(
        &contributions_only,
        "POST",
        "/functions/send-reservation-email",
        None,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = call(
        &contributions_only,
        "POST",
        "/functions/send-contribution-email",
        None,
        Some(json!({ "giftTitle": "Poussette", "contributorName": "Marie", "amount": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outbox.sent()[0].to, vec!["cagnotte@example.com".to_string()]);
}

#[tokio::test]
async fn options_on_notification_endpoints_succeed() {
    let (app, _, _) = setup();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/functions/send-free-donation-email")
        .header(header::ORIGIN, "https://liste.example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let bare = Request::builder()
        .method("OPTIONS")
        .uri("/functions/send-reservation-email")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, bare).await;
    assert_eq!(status, StatusCode::OK);
}
