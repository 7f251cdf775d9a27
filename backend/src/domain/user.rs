//! User data model.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The id was blank.
    EmptyId,
    /// The id was not a UUID.
    InvalidId,
    /// The username was blank.
    EmptyUsername,
    /// The username exceeded `max` characters.
    UsernameTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The username used characters outside the allowed set.
    UsernameInvalidCharacters,
    /// The email was blank.
    EmptyEmail,
    /// The email exceeded `max` characters.
    EmailTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The email was malformed.
    InvalidEmail,
    /// The role was neither student nor instructor.
    UnknownRole(String),
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, numbers, and @/./+/-/_ characters",
            ),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "enter a valid email address"),
            Self::UnknownRole(role) => write!(f, "\"{role}\" is not a valid role"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an already parsed UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 150;
/// Maximum allowed length for an email address.
pub const EMAIL_MAX: usize = 254;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        Regex::new(r"^[\w.@+-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Unique login name.
///
/// ## Invariants
/// - 1 to [`USERNAME_MAX`] characters.
/// - Letters, digits, and `@ . + - _` only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(username.into())
    }

    fn from_owned(username: String) -> Result<Self, UserValidationError> {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(trimmed) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Email address with a lowercased domain part.
///
/// # Examples
/// ```
/// use edunexus::domain::EmailAddress;
///
/// let email = EmailAddress::new("Ada@Example.COM").expect("valid email");
/// assert_eq!(email.as_ref(), "Ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(email.into())
    }

    fn from_owned(email: String) -> Result<Self, UserValidationError> {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        let Some((local, domain)) = trimmed.rsplit_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        Ok(Self(format!("{local}@{}", domain.to_lowercase())))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Marketplace role chosen at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Buys and reviews courses.
    #[default]
    Student,
    /// Publishes courses and issues coupons.
    Instructor,
}

impl Role {
    /// Persisted and serialised representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "student" => Ok(Self::Student),
            "instructor" => Ok(Self::Instructor),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Application user.
///
/// `password_hash` holds a PHC-formatted Argon2 hash and never leaves the
/// domain; inbound DTOs project the public fields only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Account id.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// Unique contact address.
    pub email: EmailAddress,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Student or instructor.
    pub role: Role,
    /// Set once the email code is confirmed.
    pub is_verified: bool,
    /// Grants category management.
    pub is_admin: bool,
    /// Free-form biography.
    pub bio: Option<String>,
    /// Avatar path or URL.
    pub profile_picture: Option<String>,
    /// Sign-up time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the user may publish courses and coupons.
    #[must_use]
    pub fn is_instructor(&self) -> bool {
        self.role == Role::Instructor
    }
}

/// Mutable profile fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New biography.
    pub bio: Option<String>,
    /// New avatar path or URL.
    pub profile_picture: Option<String>,
}

#[cfg(test)]
mod tests;
