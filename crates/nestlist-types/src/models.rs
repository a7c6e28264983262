use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Smallest contribution accepted when a gift has no explicit minimum.
pub const DEFAULT_MIN_CONTRIBUTION: f64 = 1.0;

/// Gift categories. The wire names are the French labels shown on the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "décoration")]
    Decor,
    #[serde(rename = "déplacements")]
    Travel,
    #[serde(rename = "dodo")]
    Sleep,
    #[serde(rename = "jeux")]
    Games,
    #[serde(rename = "repas")]
    Meals,
    #[default]
    #[serde(rename = "autres")]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Decor,
        Category::Travel,
        Category::Sleep,
        Category::Games,
        Category::Meals,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Decor => "décoration",
            Category::Travel => "déplacements",
            Category::Sleep => "dodo",
            Category::Games => "jeux",
            Category::Meals => "repas",
            Category::Other => "autres",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gift {
    pub id: Uuid,
    pub title: String,
    pub price: Option<f64>,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub images: Vec<String>,
    pub is_shared: bool,
    pub target_amount: Option<f64>,
    pub min_contribution: Option<f64>,
    pub reserved: bool,
    pub reserved_by: Option<String>,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gift {
    /// Only single-buyer gifts that nobody has claimed yet can be reserved.
    pub fn is_reservable(&self) -> bool {
        !self.is_shared && !self.reserved
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: Uuid,
    pub gift_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub payment_provider: Option<String>,
    pub payment_id: Option<String>,
    pub show_amount: bool,
    pub created_at: DateTime<Utc>,
}

/// A gift together with everything contributed to its cagnotte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftWithContributions {
    #[serde(flatten)]
    pub gift: Gift,
    pub contributions: Vec<Contribution>,
    pub total_contributed: f64,
}

impl GiftWithContributions {
    pub fn assemble(gift: Gift, contributions: Vec<Contribution>) -> Self {
        let total_contributed = contributions.iter().map(|c| c.amount).sum();
        Self {
            gift,
            contributions,
            total_contributed,
        }
    }

    /// The funding goal of a cagnotte. A zero or missing target means open-ended.
    pub fn target(&self) -> Option<f64> {
        self.gift
            .target_amount
            .filter(|target| self.gift.is_shared && *target > 0.0)
    }

    /// Amount still missing from the target, floored at zero.
    /// `None` when the gift has no target to fill.
    pub fn remaining(&self) -> Option<f64> {
        self.target()
            .map(|target| (target - self.total_contributed).max(0.0))
    }

    pub fn progress_percent(&self) -> f64 {
        self.target()
            .map(|target| (self.total_contributed / target * 100.0).min(100.0))
            .unwrap_or(0.0)
    }

    pub fn is_fully_funded(&self) -> bool {
        self.target()
            .is_some_and(|target| self.total_contributed >= target)
    }

    pub fn min_amount(&self) -> f64 {
        match self.gift.min_contribution {
            Some(min) if min > 0.0 => min,
            _ => DEFAULT_MIN_CONTRIBUTION,
        }
    }
}
