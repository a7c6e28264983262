use anyhow::anyhow;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{extract::State, response::IntoResponse};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use tracing::{info, warn};

use nestlist_types::api::{Claims, LoginRequest, LoginResponse};

use crate::error::ApiError;
use crate::extract::Json;
use crate::state::AppState;

const ADMIN_ROLE: &str = "admin";
const ADMIN_SUBJECT: &str = "admin";
const SESSION_HOURS: i64 = 12;

/// Single shared admin password plus the key used to sign admin sessions.
pub struct AdminAuth {
    password_hash: String,
    jwt_secret: String,
}

impl AdminAuth {
    /// Hash a plain password with Argon2id at startup.
    pub fn from_password(password: &str, jwt_secret: impl Into<String>) -> anyhow::Result<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Password hashing failed: {}", e))?
            .to_string();

        Ok(Self {
            password_hash,
            jwt_secret: jwt_secret.into(),
        })
    }

    /// Use a pre-computed Argon2 PHC string.
    pub fn from_hash(password_hash: impl Into<String>, jwt_secret: impl Into<String>) -> anyhow::Result<Self> {
        let password_hash = password_hash.into();
        PasswordHash::new(&password_hash).map_err(|e| anyhow!("Invalid admin password hash: {}", e))?;

        Ok(Self {
            password_hash,
            jwt_secret: jwt_secret.into(),
        })
    }

    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    pub fn issue_token(&self) -> anyhow::Result<(String, DateTime<Utc>)> {
        let expires_at = Utc::now() + Duration::hours(SESSION_HOURS);
        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            role: ADMIN_ROLE.to_string(),
            exp: expires_at.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok((token, expires_at))
    }

    /// Decode and check a session token. `None` for anything that is not a live admin token.
    pub fn verify_token(&self, token: &str) -> Option<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .ok()?;

        (data.claims.role == ADMIN_ROLE).then_some(data.claims)
    }
}

/// POST /admin/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Argon2 verification runs off the async workers
    let st = state.clone();
    let valid = tokio::task::spawn_blocking(move || st.auth.verify_password(&req.password))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    if !valid {
        warn!("Rejected admin login attempt");
        return Err(ApiError::Unauthorized);
    }

    let (token, expires_at) = state.auth.issue_token()?;
    info!("Admin logged in");

    Ok(Json(LoginResponse { token, expires_at }))
}
