//! Authentication primitives: login credentials, passwords, and registration.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::{EmailAddress, Role, UserValidationError, Username};

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use edunexus::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("admin", "password").unwrap();
/// assert_eq!(creds.username(), "admin");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Password failed the strength policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("password must be at least {min} characters")]
pub struct PasswordTooShort {
    /// Minimum accepted length.
    pub min: usize,
}

/// A cleartext password that satisfies the length policy.
///
/// The buffer is zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    /// Validate a cleartext password.
    pub fn new(password: &str) -> Result<Self, PasswordTooShort> {
        if password.chars().count() < PASSWORD_MIN {
            return Err(PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(Zeroizing::new(password.to_owned())))
    }

    /// Expose the cleartext for hashing.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(***)")
    }
}

/// Reasons a registration payload is rejected before touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// Username or email failed validation.
    User(UserValidationError),
    /// Password failed the length policy.
    Password(PasswordTooShort),
    /// `password` and `confirm_password` differ.
    PasswordMismatch,
}

impl RegistrationValidationError {
    /// Payload field the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::User(UserValidationError::EmailTooLong { .. } | UserValidationError::EmptyEmail | UserValidationError::InvalidEmail) => {
                "email"
            }
            Self::User(UserValidationError::UnknownRole(_)) => "role",
            Self::User(_) => "username",
            Self::Password(_) | Self::PasswordMismatch => "password",
        }
    }
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(err) => write!(f, "{err}"),
            Self::Password(err) => write!(f, "{err}"),
            Self::PasswordMismatch => write!(f, "Passwords must match"),
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

/// Validated sign-up request.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Requested login name.
    pub username: Username,
    /// Contact address.
    pub email: EmailAddress,
    /// Password to hash.
    pub password: PlainPassword,
    /// Account role.
    pub role: Role,
}

impl Registration {
    /// Validate raw registration inputs.
    ///
    /// # Examples
    /// ```
    /// use edunexus::domain::{Registration, Role};
    ///
    /// let registration =
    ///     Registration::try_from_parts("ada", "ada@example.com", "s3cretpass", "s3cretpass", Role::Student)
    ///         .expect("valid registration");
    /// assert_eq!(registration.username.as_ref(), "ada");
    /// ```
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
        role: Role,
    ) -> Result<Self, RegistrationValidationError> {
        if password != confirm_password {
            return Err(RegistrationValidationError::PasswordMismatch);
        }
        let username = Username::new(username).map_err(RegistrationValidationError::User)?;
        let email = EmailAddress::new(email).map_err(RegistrationValidationError::User)?;
        let password = PlainPassword::new(password).map_err(RegistrationValidationError::Password)?;
        Ok(Self {
            username,
            email,
            password,
            role,
        })
    }
}
