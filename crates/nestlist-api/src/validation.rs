//! Input checks shared by the registry handlers. Messages are shown to visitors as-is.

use nestlist_db::models::GiftDraft;
use nestlist_types::api::GiftInput;
use nestlist_types::models::GiftWithContributions;

use crate::error::ApiError;

const MAX_NAME_CHARS: usize = 120;
const MAX_TEXT_CHARS: usize = 2000;

/// Slack for comparisons against remaining amounts computed from float sums.
const AMOUNT_EPSILON: f64 = 1e-9;

pub fn name(raw: &str) -> Result<String, ApiError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Veuillez entrer votre nom"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ApiError::validation("Le nom est trop long"));
    }
    Ok(name.to_string())
}

/// Trim free text; blank becomes `None`.
pub fn optional_text(raw: Option<&str>) -> Result<Option<String>, ApiError> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(ApiError::validation("Le texte est trop long"));
    }
    Ok(Some(text.to_string()))
}

fn optional_amount(value: Option<f64>, field: &str) -> Result<Option<f64>, ApiError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            Err(ApiError::validation(format!("Montant invalide : {}", field)))
        }
        other => Ok(other),
    }
}

/// Check the admin gift form and normalise it for storage.
///
/// Target and minimum only make sense on a cagnotte and are dropped otherwise.
pub fn gift_input(input: GiftInput) -> Result<GiftDraft, ApiError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Le titre est obligatoire"));
    }

    let price = optional_amount(input.price, "prix")?;
    let (target_amount, min_contribution) = if input.is_shared {
        (
            optional_amount(input.target_amount, "objectif")?,
            optional_amount(input.min_contribution, "contribution minimum")?,
        )
    } else {
        (None, None)
    };

    let images = input
        .images
        .iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect();

    Ok(GiftDraft {
        title: title.to_string(),
        price,
        link: optional_text(input.link.as_deref())?,
        notes: optional_text(input.notes.as_deref())?,
        images,
        is_shared: input.is_shared,
        target_amount,
        min_contribution,
        category: input.category,
    })
}

/// Check a contribution amount against the gift's current funding.
/// Returns the gift title for the notification email.
pub fn contribution(current: Option<&GiftWithContributions>, amount: f64) -> Result<String, ApiError> {
    let current = current.ok_or(ApiError::NotFound)?;

    if !current.gift.is_shared {
        return Err(ApiError::validation("Ce cadeau ne se finance pas en cagnotte"));
    }
    if current.is_fully_funded() {
        return Err(ApiError::Conflict("Cette cagnotte est déjà complète".into()));
    }

    let min = current.min_amount();
    if !amount.is_finite() || amount < min {
        return Err(ApiError::validation(format!(
            "Le montant minimum est de {:.2} €",
            min
        )));
    }
    if let Some(remaining) = current.remaining() {
        if amount > remaining + AMOUNT_EPSILON {
            return Err(ApiError::validation(format!(
                "Le montant maximum est de {:.2} €",
                remaining
            )));
        }
    }

    Ok(current.gift.title.clone())
}

pub fn donation(amount: f64, min: f64) -> Result<f64, ApiError> {
    if !amount.is_finite() || amount < min {
        return Err(ApiError::validation(format!(
            "Le montant minimum est de {:.2} €",
            min
        )));
    }
    Ok(amount)
}
