//! Driving port for account lifecycle operations.
//!
//! Inbound adapters call [`AccountCommand`] to register users, confirm their
//! email, reset passwords, edit profiles, and top up balances without
//! touching persistence, caching, or mail delivery directly.

use async_trait::async_trait;

use crate::domain::{AccountBalance, Error, Money, ProfileUpdate, Role, User, UserId};

/// Raw sign-up payload; validated by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Requested login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Confirmation of `password`.
    pub confirm_password: String,
    /// Requested role.
    pub role: Role,
}

/// Raw password reset confirmation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPasswordResetRequest {
    /// Account address.
    pub email: String,
    /// Token from the reset email.
    pub token: String,
    /// Replacement password.
    pub new_password: String,
}

/// Domain use-case port for account mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an unverified account, credit the signup bonus, and email a
    /// verification code. Returns the new user's id.
    async fn register(&self, request: RegisterRequest) -> Result<UserId, Error>;

    /// Check a verification code and mark the email verified.
    async fn verify_email(&self, user_id: &UserId, code: &str) -> Result<(), Error>;

    /// Email a password reset token to the account registered with `email`.
    async fn request_password_reset(&self, email: &str) -> Result<(), Error>;

    /// Replace the password when the reset token matches.
    async fn confirm_password_reset(&self, request: ConfirmPasswordResetRequest)
    -> Result<(), Error>;

    /// Change bio and profile picture.
    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate) -> Result<User, Error>;

    /// Credit `amount` to the user's balance.
    async fn top_up_balance(&self, user_id: &UserId, amount: Money)
    -> Result<AccountBalance, Error>;
}
