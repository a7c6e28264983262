pub mod messages;
pub mod outbox;
pub mod resend;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::messages::{ContributionEmail, FreeDonationEmail, ReservationEmail};

pub use outbox::Outbox;
pub use resend::ResendMailer;

pub const DEFAULT_FROM: &str = "Liste de naissance <onboarding@resend.dev>";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Missing email configuration")]
    NotConfigured,

    #[error("email API answered {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("email API unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A fully addressed plain-text email.
#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), NotifyError>;
}

/// Addresses used for outgoing notifications.
///
/// Contribution emails use their own addresses when set and fall back to the
/// reservation ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailSettings {
    pub reservation_to: Option<String>,
    pub reservation_from: Option<String>,
    pub contribution_to: Option<String>,
    pub contribution_from: Option<String>,
}

impl EmailSettings {
    fn reservation_route(&self) -> Option<(String, String)> {
        let to = self.reservation_to.clone()?;
        let from = self.reservation_from.clone().unwrap_or_else(|| DEFAULT_FROM.into());
        Some((from, to))
    }

    fn contribution_route(&self) -> Option<(String, String)> {
        let to = self.contribution_to.clone().or_else(|| self.reservation_to.clone())?;
        let from = self
            .contribution_from
            .clone()
            .or_else(|| self.reservation_from.clone())
            .unwrap_or_else(|| DEFAULT_FROM.into());
        Some((from, to))
    }
}

/// Sends the registry's notification emails.
#[derive(Clone)]
pub struct Notifier {
    mailer: Option<Arc<dyn Mailer>>,
    settings: EmailSettings,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, settings: EmailSettings) -> Self {
        Self {
            mailer: Some(mailer),
            settings,
        }
    }

    /// A notifier that refuses every send with `NotConfigured`.
    pub fn disabled() -> Self {
        Self {
            mailer: None,
            settings: EmailSettings::default(),
        }
    }

    /// Reservation and free donation emails can go out.
    pub fn is_configured(&self) -> bool {
        self.mailer.is_some() && self.settings.reservation_route().is_some()
    }

    /// Contribution emails can go out, through their own recipient or the reservation one.
    pub fn contributions_configured(&self) -> bool {
        self.mailer.is_some() && self.settings.contribution_route().is_some()
    }

    pub async fn contribution(&self, email: &ContributionEmail) -> Result<(), NotifyError> {
        let route = self.settings.contribution_route();
        self.deliver(route, email.subject(), email.text()).await
    }

    pub async fn reservation(&self, email: &ReservationEmail) -> Result<(), NotifyError> {
        let route = self.settings.reservation_route();
        self.deliver(route, email.subject(), email.text()).await
    }

    pub async fn free_donation(&self, email: &FreeDonationEmail) -> Result<(), NotifyError> {
        let route = self.settings.reservation_route();
        self.deliver(route, email.subject(), email.text()).await
    }

    async fn deliver(
        &self,
        route: Option<(String, String)>,
        subject: String,
        text: String,
    ) -> Result<(), NotifyError> {
        let (Some(mailer), Some((from, to))) = (&self.mailer, route) else {
            warn!(
                has_mailer = self.mailer.is_some(),
                "Email not sent, configuration incomplete"
            );
            return Err(NotifyError::NotConfigured);
        };

        let email = Email {
            from,
            to: vec![to],
            subject,
            text,
        };
        mailer.send(&email).await?;

        info!(subject = %email.subject, "Notification email sent");
        Ok(())
    }
}
