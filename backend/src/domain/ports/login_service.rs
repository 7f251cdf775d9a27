//! Driving port behind `POST /users/login`.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Checks a username and password pair.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Return the account id when `credentials` match a verified account.
    ///
    /// Unknown usernames and wrong passwords both yield `unauthorized`, so
    /// callers cannot probe for accounts. A correct password on an account
    /// whose email is still unverified yields `invalid_request`.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
