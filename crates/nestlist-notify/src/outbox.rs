use std::sync::Mutex;

use async_trait::async_trait;

use crate::{Email, Mailer, NotifyError};

/// In-process mailer that keeps every message instead of delivering it.
///
/// Handy for local runs without an email API key and for tests. Can be told to
/// reject everything to exercise failure paths.
#[derive(Debug, Default)]
pub struct Outbox {
    sent: Mutex<Vec<Email>>,
    reject: Option<(u16, String)>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(status: u16, body: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject: Some((status, body.to_string())),
        }
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for Outbox {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        if let Some((status, body)) = &self.reject {
            return Err(NotifyError::Rejected {
                status: *status,
                body: body.clone(),
            });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email.clone());
        }
        Ok(())
    }
}
