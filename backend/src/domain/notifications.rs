//! Outgoing email templates.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EmailAddress, PasswordResetToken, VerificationCode};

/// Default sender used when configuration does not provide one.
pub const DEFAULT_SENDER: &str = "no-reply@edunexus.local";

/// A rendered plain-text email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Renders the emails the marketplace sends, stamped with one sender.
///
/// # Examples
/// ```
/// use edunexus::domain::{EmailAddress, Notifications};
///
/// let notifications = Notifications::new("team@edunexus.io");
/// let to = EmailAddress::new("ada@example.com").expect("valid email");
/// let message = notifications.order_confirmation(&to, "Rust 101");
/// assert_eq!(message.subject, "Order Confirmation");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notifications {
    sender: String,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_SENDER)
    }
}

impl Notifications {
    /// Build templates that send from `sender`.
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }

    fn message(&self, to: &EmailAddress, subject: &str, body: String) -> EmailMessage {
        EmailMessage {
            from: self.sender.clone(),
            to: to.to_string(),
            subject: subject.to_owned(),
            body,
        }
    }

    /// Six-digit code sent after registration.
    #[must_use]
    pub fn verification_code(
        &self,
        to: &EmailAddress,
        code: &VerificationCode,
        ttl: Duration,
    ) -> EmailMessage {
        let minutes = ttl.as_secs() / 60;
        self.message(
            to,
            "Your Verification Code",
            format!("Your verification code is {code}. It will expire in {minutes} minutes."),
        )
    }

    /// Confirmation that the address was verified.
    #[must_use]
    pub fn verification_success(&self, to: &EmailAddress) -> EmailMessage {
        self.message(
            to,
            "Your Email is Verified!",
            "Thank you for verifying your email. You can now access your account.".to_owned(),
        )
    }

    /// Reset token delivery.
    #[must_use]
    pub fn password_reset(&self, to: &EmailAddress, token: &PasswordResetToken) -> EmailMessage {
        self.message(
            to,
            "Password Reset Request",
            format!(
                "Hi,\n\nWe received a request to reset your password. Use the following token \
                 to reset your password:\n\n{}\n\nIf you didn't request a password reset, please \
                 ignore this email.\n\nThanks,\nEduNexus",
                token.expose()
            ),
        )
    }

    /// Confirmation that the password changed.
    #[must_use]
    pub fn password_reset_success(&self, to: &EmailAddress) -> EmailMessage {
        self.message(
            to,
            "Your Password Has Been Successfully Reset",
            "Hello,\n\nYour password has been successfully reset. If you did not request this \
             change, please contact support immediately.\n\nThank you,\nEduNexus"
                .to_owned(),
        )
    }

    /// Receipt for a placed order.
    #[must_use]
    pub fn order_confirmation(&self, to: &EmailAddress, course_title: &str) -> EmailMessage {
        self.message(
            to,
            "Order Confirmation",
            format!("Your order \"{course_title}\" was placed successfully!"),
        )
    }

    /// Warning to a coupon's creator that it will expire soon.
    #[must_use]
    pub fn coupon_expiry(
        &self,
        to: &EmailAddress,
        username: &str,
        code: &str,
        valid_until: DateTime<Utc>,
    ) -> EmailMessage {
        self.message(
            to,
            "Your Coupon is About to Expire!",
            format!(
                "Hi {username},\n\nYour coupon '{code}' will expire on {}. Make sure your users \
                 take advantage of it before time runs out!",
                valid_until.format("%Y-%m-%d %H:%M:%S")
            ),
        )
    }
}
