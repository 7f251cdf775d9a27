//! Port for generating one-time secrets.

use crate::domain::{PasswordResetToken, VerificationCode};

/// Source of verification codes and reset tokens.
#[cfg_attr(test, mockall::automock)]
pub trait SecretGenerator: Send + Sync {
    /// A fresh six-digit verification code.
    fn verification_code(&self) -> VerificationCode;

    /// A fresh URL-safe password reset token.
    fn reset_token(&self) -> PasswordResetToken;
}
