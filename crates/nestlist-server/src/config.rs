use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};

use nestlist_api::payment::{DEFAULT_PAYPAL_ME_URL, PaymentSettings};
use nestlist_notify::EmailSettings;

const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Clone, PartialEq)]
pub enum AdminPassword {
    Plain(String),
    Hash(String),
}

impl fmt::Debug for AdminPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminPassword::Plain(_) => f.write_str("Plain(<redacted>)"),
            AdminPassword::Hash(_) => f.write_str("Hash(<redacted>)"),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub admin_password: AdminPassword,
    pub payments: PaymentSettings,
    pub resend_api_key: Option<String>,
    pub email: EmailSettings,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("db_path", &self.db_path)
            .field("jwt_secret", &"<redacted>")
            .field("admin_password", &self.admin_password)
            .field("payments", &self.payments)
            .field("resend_api_key", &self.resend_api_key.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = var("NESTLIST_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("NESTLIST_JWT_SECRET is unset or still a placeholder");
        }

        let admin_password = match (var("NESTLIST_ADMIN_PASSWORD_HASH"), var("NESTLIST_ADMIN_PASSWORD")) {
            (Some(hash), _) => AdminPassword::Hash(hash),
            (None, Some(plain)) => AdminPassword::Plain(plain),
            (None, None) => bail!("set NESTLIST_ADMIN_PASSWORD or NESTLIST_ADMIN_PASSWORD_HASH"),
        };

        let host = var("NESTLIST_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("NESTLIST_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("NESTLIST_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let donation_min = match var("NESTLIST_DONATION_MIN") {
            Some(v) => {
                let min: f64 = v.parse().context("NESTLIST_DONATION_MIN must be a number")?;
                if !min.is_finite() || min < 0.0 {
                    bail!("NESTLIST_DONATION_MIN must be a positive amount");
                }
                min
            }
            None => PaymentSettings::default().donation_min,
        };

        Ok(Self {
            addr,
            db_path: var("NESTLIST_DB_PATH").unwrap_or_else(|| "nestlist.db".into()).into(),
            jwt_secret,
            admin_password,
            payments: PaymentSettings {
                paypal_me_url: var("NESTLIST_PAYPAL_ME_URL")
                    .unwrap_or_else(|| DEFAULT_PAYPAL_ME_URL.into()),
                donation_min,
            },
            resend_api_key: var("RESEND_API_KEY"),
            email: EmailSettings {
                reservation_to: var("RESERVATION_TO_EMAIL"),
                reservation_from: var("RESERVATION_FROM_EMAIL"),
                contribution_to: var("CONTRIBUTION_TO_EMAIL"),
                contribution_from: var("CONTRIBUTION_FROM_EMAIL"),
            },
        })
    }
}
