//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, Error, Money, ProfileUpdate, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique column (`username` or `email`) already holds the value.
        Duplicate { field: String } => "user with this {field} already exists",
    }
}

impl From<UserPersistenceError> for Error {
    fn from(err: UserPersistenceError) -> Self {
        match err {
            UserPersistenceError::Connection { message } => {
                tracing::warn!(%message, "user repository unavailable");
                Self::service_unavailable("user repository unavailable")
            }
            UserPersistenceError::Query { message } => {
                Self::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::Duplicate { field } => {
                Self::conflict(format!("A user with that {field} already exists."))
            }
        }
    }
}

/// Storage for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user together with their opening account balance.
    ///
    /// Both rows are written atomically.
    async fn create(&self, user: &User, opening_balance: Money) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Flag the user's email as verified. Returns `false` when no row matched.
    async fn mark_verified(&self, id: &UserId) -> Result<bool, UserPersistenceError>;

    /// Replace the stored password hash. Returns `false` when no row matched.
    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, UserPersistenceError>;

    /// Apply profile changes and return the updated user.
    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError>;
}
