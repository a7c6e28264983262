use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filter::GiftFilter;
use crate::models::{Category, Contribution, Gift, GiftWithContributions};

// -- JWT Claims --

/// Claims carried by admin session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

// -- Admin auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

// -- Gifts --

#[derive(Debug, Default, Deserialize)]
pub struct GiftListQuery {
    #[serde(default)]
    pub filter: GiftFilter,
    #[serde(default)]
    pub q: Option<String>,
}

/// Admin gift form. Used for both create and full update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GiftInput {
    pub title: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default)]
    pub target_amount: Option<f64>,
    #[serde(default)]
    pub min_contribution: Option<f64>,
    #[serde(default)]
    pub category: Category,
}

/// A contribution as listed under its gift. `amount` is withheld from
/// public listings when the contributor asked to hide it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionSummary {
    pub id: Uuid,
    pub name: String,
    pub amount: Option<f64>,
    pub show_amount: bool,
    pub payment_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ContributionSummary {
    pub fn new(c: &Contribution, reveal_hidden: bool) -> Self {
        let amount = (c.show_amount || reveal_hidden).then_some(c.amount);
        Self {
            id: c.id,
            name: c.name.clone(),
            amount,
            show_amount: c.show_amount,
            payment_provider: c.payment_provider.clone(),
            payment_id: if reveal_hidden { c.payment_id.clone() } else { None },
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GiftResponse {
    #[serde(flatten)]
    pub gift: Gift,
    pub contributions: Vec<ContributionSummary>,
    pub total_contributed: f64,
    pub remaining: Option<f64>,
    pub progress_percent: f64,
    pub fully_funded: bool,
}

impl GiftResponse {
    pub fn new(full: &GiftWithContributions, reveal_hidden: bool) -> Self {
        Self {
            gift: full.gift.clone(),
            contributions: full
                .contributions
                .iter()
                .map(|c| ContributionSummary::new(c, reveal_hidden))
                .collect(),
            total_contributed: full.total_contributed,
            remaining: full.remaining(),
            progress_percent: full.progress_percent(),
            fully_funded: full.is_fully_funded(),
        }
    }
}

// -- Reservations --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReserveRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// -- Contributions and donations --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckoutRequest {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub amount: f64,
    pub payment_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContributeRequest {
    pub name: String,
    pub amount: f64,
    #[serde(default = "default_show_amount")]
    pub show_amount: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_show_amount() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DonationRequest {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DonationReceipt {
    pub name: String,
    pub amount: f64,
}

/// Outcome of the best-effort email that follows a persisted write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailStatus {
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmailStatus {
    pub fn sent() -> Self {
        Self {
            sent: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            sent: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse<T> {
    pub record: T,
    pub email: EmailStatus,
}
