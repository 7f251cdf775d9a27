//! Port for per-user stored-value balances.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AccountBalance, Error, Money, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by balance repository adapters.
    pub enum BalanceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "balance repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "balance repository query failed: {message}",
        /// The credited balance would exceed the storable range.
        LimitExceeded => "balance would exceed the maximum storable amount",
    }
}

impl From<BalanceRepositoryError> for Error {
    fn from(err: BalanceRepositoryError) -> Self {
        match err {
            BalanceRepositoryError::Connection { message } => {
                tracing::warn!(%message, "balance repository unavailable");
                Self::service_unavailable("balance repository unavailable")
            }
            BalanceRepositoryError::Query { message } => {
                Self::internal(format!("balance repository error: {message}"))
            }
            BalanceRepositoryError::LimitExceeded => {
                Self::invalid_request("Ensure that there are no more than 10 digits in total.")
            }
        }
    }
}

/// Storage for account balances.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountBalanceRepository: Send + Sync {
    /// Fetch the balance of a user.
    async fn find(&self, user_id: &UserId) -> Result<Option<AccountBalance>, BalanceRepositoryError>;

    /// Add `amount` to the balance and return the new state.
    ///
    /// Returns `None` when the user has no balance row.
    async fn credit(
        &self,
        user_id: &UserId,
        amount: Money,
        at: DateTime<Utc>,
    ) -> Result<Option<AccountBalance>, BalanceRepositoryError>;
}
