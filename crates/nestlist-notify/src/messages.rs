//! The three notification emails and their JSON payloads.
//!
//! Payload types mirror what the registry front end posts to the notification
//! endpoints: every field optional, camelCase. `validate` turns a payload into a
//! message that can be rendered, or `None` when required fields are missing.

use serde::Deserialize;

fn optional_line(label: &str, value: Option<&str>) -> String {
    match value {
        Some(v) => format!("{} : {}", label, v),
        None => format!("{} : (non fourni)", label),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// -- Contribution to a cagnotte --

#[derive(Debug, Clone, PartialEq)]
pub struct ContributionEmail {
    pub gift_title: String,
    pub contributor_name: String,
    pub amount: f64,
    pub show_amount: bool,
    pub payer_email: Option<String>,
    pub message: Option<String>,
}

impl ContributionEmail {
    pub fn subject(&self) -> String {
        format!("💛 Contribution : {}", self.gift_title)
    }

    pub fn text(&self) -> String {
        let mut lines = vec![
            format!("Cagnotte : {}", self.gift_title),
            format!("Contributeur : {}", self.contributor_name),
            format!("Montant : {:.2} €", self.amount),
            format!(
                "Afficher le montant : {}",
                if self.show_amount { "Oui" } else { "Non" }
            ),
        ];
        if let Some(email) = &self.payer_email {
            lines.push(format!("Email : {}", email));
        }
        if let Some(message) = &self.message {
            lines.push(String::new());
            lines.push("Message :".into());
            lines.push(message.clone());
        }
        lines.join("\n")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionEmailPayload {
    pub gift_title: Option<String>,
    pub contributor_name: Option<String>,
    pub amount: Option<f64>,
    pub show_amount: Option<bool>,
    pub payer_email: Option<String>,
    pub message: Option<String>,
}

impl ContributionEmailPayload {
    pub fn validate(self) -> Option<ContributionEmail> {
        let amount = self.amount.filter(|a| a.is_finite())?;
        Some(ContributionEmail {
            gift_title: non_empty(self.gift_title)?,
            contributor_name: non_empty(self.contributor_name)?,
            amount,
            show_amount: self.show_amount.unwrap_or(false),
            payer_email: non_empty(self.payer_email),
            message: non_empty(self.message),
        })
    }
}

// -- Reservation of a single gift --

#[derive(Debug, Clone, PartialEq)]
pub struct ReservationEmail {
    pub gift_title: String,
    pub reserved_by: String,
    pub amount: f64,
    pub payer_email: Option<String>,
    pub message: Option<String>,
}

impl ReservationEmail {
    pub fn subject(&self) -> String {
        format!("🎁 Cadeau réservé : {}", self.gift_title)
    }

    pub fn text(&self) -> String {
        [
            format!("Cadeau : {}", self.gift_title),
            format!("Réservé par : {}", self.reserved_by),
            format!("Montant : {:.2} €", self.amount),
            optional_line("Email", self.payer_email.as_deref()),
            String::new(),
            "Message :".into(),
            self.message.clone().unwrap_or_else(|| "(aucun message)".into()),
        ]
        .join("\n")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationEmailPayload {
    pub gift_title: Option<String>,
    pub reserved_by: Option<String>,
    pub amount: Option<f64>,
    pub payer_email: Option<String>,
    pub message: Option<String>,
}

impl ReservationEmailPayload {
    pub fn validate(self) -> Option<ReservationEmail> {
        Some(ReservationEmail {
            gift_title: non_empty(self.gift_title)?,
            reserved_by: non_empty(self.reserved_by)?,
            amount: self.amount?,
            payer_email: non_empty(self.payer_email),
            message: non_empty(self.message),
        })
    }
}

// -- Free donation --

#[derive(Debug, Clone, PartialEq)]
pub struct FreeDonationEmail {
    pub donor_name: String,
    pub amount: f64,
    pub donor_email: Option<String>,
    pub message: Option<String>,
}

impl FreeDonationEmail {
    pub fn subject(&self) -> String {
        format!("💛 Don libre reçu : {} ({:.2} €)", self.donor_name, self.amount)
    }

    pub fn text(&self) -> String {
        [
            format!("Donateur : {}", self.donor_name),
            format!("Montant : {:.2} €", self.amount),
            optional_line("Email", self.donor_email.as_deref()),
            String::new(),
            "Message :".into(),
            self.message.clone().unwrap_or_else(|| "(aucun message)".into()),
        ]
        .join("\n")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeDonationEmailPayload {
    pub donor_name: Option<String>,
    pub amount: Option<f64>,
    pub donor_email: Option<String>,
    pub message: Option<String>,
}

impl FreeDonationEmailPayload {
    pub fn validate(self) -> Option<FreeDonationEmail> {
        let amount = self.amount.filter(|a| a.is_finite() && *a > 0.0)?;
        Some(FreeDonationEmail {
            donor_name: non_empty(self.donor_name)?,
            amount,
            donor_email: non_empty(self.donor_email),
            message: non_empty(self.message),
        })
    }
}
