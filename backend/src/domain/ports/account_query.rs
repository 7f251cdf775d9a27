//! Driving port for account reads.

use async_trait::async_trait;

use crate::domain::{AccountBalance, Error, User, UserId};

/// Domain use-case port for reading account state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Fetch the user's profile.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error>;

    /// Fetch the user's balance.
    async fn fetch_balance(&self, user_id: &UserId) -> Result<AccountBalance, Error>;
}
