//! External payment links. The registry never talks to the payment provider:
//! it hands out a PayPal.Me link and trusts the visitor to say when they paid.

pub const DEFAULT_PAYPAL_ME_URL: &str = "https://paypal.me/listenaissancemenguy";

/// Provider label stored on contributions.
pub const PROVIDER_LABEL: &str = "PayPal.Me";

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSettings {
    pub paypal_me_url: String,
    /// Smallest free donation accepted.
    pub donation_min: f64,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            paypal_me_url: DEFAULT_PAYPAL_ME_URL.to_string(),
            donation_min: 1.0,
        }
    }
}

impl PaymentSettings {
    /// `<base>/<amount with two decimals>`, e.g. `https://paypal.me/foo/25.00`.
    pub fn payment_link(&self, amount: f64) -> String {
        format!("{}/{:.2}", self.paypal_me_url.trim_end_matches('/'), amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_has_two_decimals() {
        let settings = PaymentSettings::default();
        assert_eq!(
            settings.payment_link(25.0),
            "https://paypal.me/listenaissancemenguy/25.00"
        );
        assert_eq!(
            settings.payment_link(7.999),
            "https://paypal.me/listenaissancemenguy/8.00"
        );
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let settings = PaymentSettings {
            paypal_me_url: "https://paypal.me/famille/".into(),
            donation_min: 1.0,
        };
        assert_eq!(settings.payment_link(5.0), "https://paypal.me/famille/5.00");
    }
}
