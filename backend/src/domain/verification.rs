//! Email verification codes and password reset tokens.
//!
//! Both secrets live in the key-value cache under per-user keys and expire on
//! their own. Reset tokens are only ever stored as a SHA-256 fingerprint.

use std::fmt;
use std::time::Duration;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::UserId;

/// Default lifetime of a verification code.
pub const VERIFICATION_CODE_TTL: Duration = Duration::from_secs(600);
/// Default lifetime of a password reset token.
pub const PASSWORD_RESET_TTL: Duration = Duration::from_secs(259_200);

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

/// Cache key holding the pending verification code for a user.
#[must_use]
pub fn verification_code_key(user_id: &UserId) -> String {
    format!("verification_code_{user_id}")
}

/// Cache key holding the pending reset token fingerprint for a user.
#[must_use]
pub fn password_reset_key(user_id: &UserId) -> String {
    format!("password_reset_{user_id}")
}

/// Submitted or generated code is not six digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("verification code must be exactly 6 digits")]
pub struct InvalidVerificationCode;

/// Six-digit email verification code.
///
/// # Examples
/// ```
/// use edunexus::domain::VerificationCode;
///
/// let code = VerificationCode::parse("123456").expect("six digits");
/// assert_eq!(code.as_ref(), "123456");
/// assert!(VerificationCode::parse("012345").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Build a code from a number in `100000..=999999`.
    pub fn from_number(value: u32) -> Result<Self, InvalidVerificationCode> {
        if !(CODE_MIN..=CODE_MAX).contains(&value) {
            return Err(InvalidVerificationCode);
        }
        Ok(Self(value.to_string()))
    }

    /// Parse a submitted code.
    pub fn parse(raw: &str) -> Result<Self, InvalidVerificationCode> {
        let trimmed = raw.trim();
        if trimmed.len() != 6 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidVerificationCode);
        }
        let value: u32 = trimmed.parse().map_err(|_| InvalidVerificationCode)?;
        Self::from_number(value)
    }

    /// Inclusive range codes are drawn from.
    #[must_use]
    pub const fn range() -> std::ops::RangeInclusive<u32> {
        CODE_MIN..=CODE_MAX
    }
}

impl AsRef<str> for VerificationCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Random URL-safe password reset token, as mailed to the user.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordResetToken(Zeroizing<String>);

impl PasswordResetToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Cleartext token for the outgoing email.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Hex-encoded SHA-256 of the token, the only form that is persisted.
    ///
    /// # Examples
    /// ```
    /// use edunexus::domain::PasswordResetToken;
    ///
    /// let token = PasswordResetToken::new("abc");
    /// assert_eq!(
    ///     token.fingerprint(),
    ///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    /// );
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Debug for PasswordResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordResetToken(***)")
    }
}
