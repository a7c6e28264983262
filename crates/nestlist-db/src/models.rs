//! Database row types. These map directly to SQLite rows.
//! Conversion into the shared models happens here so handlers never see raw text columns.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use nestlist_types::models::{Category, Contribution, Gift};

pub struct GiftRow {
    pub id: String,
    pub title: String,
    pub price: Option<f64>,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub images: String,
    pub is_shared: bool,
    pub target_amount: Option<f64>,
    pub min_contribution: Option<f64>,
    pub reserved: bool,
    pub reserved_by: Option<String>,
    pub category: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct ContributionRow {
    pub id: String,
    pub gift_id: String,
    pub name: String,
    pub amount: f64,
    pub payment_provider: Option<String>,
    pub payment_id: Option<String>,
    pub show_amount: bool,
    pub created_at: String,
}

/// Editable gift fields, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct GiftDraft {
    pub title: String,
    pub price: Option<f64>,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub images: Vec<String>,
    pub is_shared: bool,
    pub target_amount: Option<f64>,
    pub min_contribution: Option<f64>,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContribution {
    pub gift_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub payment_provider: Option<String>,
    pub payment_id: Option<String>,
    pub show_amount: bool,
}

impl From<GiftRow> for Gift {
    fn from(row: GiftRow) -> Self {
        let images = serde_json::from_str(&row.images).unwrap_or_else(|e| {
            warn!("Corrupt images '{}' on gift '{}': {}", row.images, row.id, e);
            Vec::new()
        });
        let category = row.category.parse().unwrap_or_else(|e| {
            warn!("{} on gift '{}'", e, row.id);
            Category::default()
        });

        Gift {
            id: parse_id(&row.id),
            title: row.title,
            price: row.price,
            link: row.link,
            notes: row.notes,
            images,
            is_shared: row.is_shared,
            target_amount: row.target_amount,
            min_contribution: row.min_contribution,
            reserved: row.reserved,
            reserved_by: row.reserved_by,
            category,
            created_at: parse_timestamp(&row.created_at),
            updated_at: parse_timestamp(&row.updated_at),
        }
    }
}

impl From<ContributionRow> for Contribution {
    fn from(row: ContributionRow) -> Self {
        Contribution {
            id: parse_id(&row.id),
            gift_id: parse_id(&row.gift_id),
            name: row.name,
            amount: row.amount,
            payment_provider: row.payment_provider,
            payment_id: row.payment_id,
            show_amount: row.show_amount,
            created_at: parse_timestamp(&row.created_at),
        }
    }
}

fn parse_id(raw: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt id '{}': {}", raw, e);
        Uuid::default()
    })
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS.SSS" without timezone.
/// Parse as naive UTC.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}
