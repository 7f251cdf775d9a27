//! Port for one-way password hashing.

use crate::domain::{Error, PlainPassword};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

impl From<PasswordHashError> for Error {
    fn from(err: PasswordHashError) -> Self {
        Self::internal(err.to_string())
    }
}

/// Produces and checks password hashes.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a validated password into a self-describing string.
    fn hash(&self, password: &PlainPassword) -> Result<String, PasswordHashError>;

    /// Check a cleartext candidate against a stored hash.
    fn verify(&self, candidate: &str, stored_hash: &str) -> Result<bool, PasswordHashError>;
}
