use serde::{Deserialize, Serialize};

use crate::models::Gift;

/// List filter offered on the gift list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftFilter {
    #[default]
    All,
    /// Single-buyer gifts nobody has reserved yet.
    Available,
    Shared,
    Reserved,
}

impl GiftFilter {
    pub fn matches(&self, gift: &Gift) -> bool {
        match self {
            GiftFilter::All => true,
            GiftFilter::Available => !gift.reserved && !gift.is_shared,
            GiftFilter::Shared => gift.is_shared,
            GiftFilter::Reserved => gift.reserved,
        }
    }
}

/// Case-insensitive substring match on the title. An empty query matches everything.
pub fn title_matches(gift: &Gift, query: &str) -> bool {
    gift.title.to_lowercase().contains(&query.to_lowercase())
}
