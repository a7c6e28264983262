mod config;

use std::sync::Arc;

use tracing::{info, warn};

use nestlist_api::auth::AdminAuth;
use nestlist_api::{AppState, AppStateInner};
use nestlist_gateway::dispatcher::Dispatcher;
use nestlist_notify::{Notifier, ResendMailer};

use crate::config::{AdminPassword, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nestlist=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = nestlist_db::Database::open(&config.db_path)?;
    info!(path = %config.db_path.display(), "Database ready");

    let auth = match &config.admin_password {
        AdminPassword::Hash(hash) => AdminAuth::from_hash(hash.clone(), config.jwt_secret.clone())?,
        AdminPassword::Plain(password) => AdminAuth::from_password(password, config.jwt_secret.clone())?,
    };

    let notifier = match &config.resend_api_key {
        Some(key) => Notifier::new(Arc::new(ResendMailer::new(key)?), config.email.clone()),
        None => {
            warn!("RESEND_API_KEY not set, notification emails are disabled");
            Notifier::disabled()
        }
    };
    if config.resend_api_key.is_some() && !notifier.is_configured() {
        warn!("RESERVATION_TO_EMAIL not set, notification emails will fail");
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        dispatcher: Dispatcher::new(),
        notifier,
        auth,
        payments: config.payments.clone(),
    });

    let app = nestlist_api::router(state);

    info!("Nestlist server listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
