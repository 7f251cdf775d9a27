//! Port for orders and the atomic purchase transaction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Order, OrderPlacement, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
        /// The user already ordered the course.
        AlreadyOrdered => "course already ordered",
        /// The buyer has no balance row.
        BalanceMissing => "account balance not found",
        /// The balance no longer covers the total.
        InsufficientBalance => "insufficient balance",
    }
}

impl From<OrderRepositoryError> for Error {
    fn from(err: OrderRepositoryError) -> Self {
        match err {
            OrderRepositoryError::Connection { message } => {
                tracing::warn!(%message, "order repository unavailable");
                Self::service_unavailable("order repository unavailable")
            }
            OrderRepositoryError::Query { message } => {
                Self::internal(format!("order repository error: {message}"))
            }
            OrderRepositoryError::AlreadyOrdered => {
                Self::invalid_request("You have already ordered this course.")
            }
            OrderRepositoryError::BalanceMissing => Self::not_found("Account balance not found."),
            OrderRepositoryError::InsufficientBalance => {
                Self::invalid_request("Insufficient balance to place this order.")
            }
        }
    }
}

/// Storage for orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Commit a purchase in one transaction.
    ///
    /// Debits `placement.total` from the buyer's balance (never below zero),
    /// inserts the order, and creates the enrollment when absent. Nothing is
    /// written when any step fails.
    async fn place(&self, placement: &OrderPlacement) -> Result<Order, OrderRepositoryError>;

    /// Whether the user already ordered the course.
    async fn exists(&self, user_id: &UserId, course_id: Uuid) -> Result<bool, OrderRepositoryError>;

    /// Orders of a user, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderRepositoryError>;

    /// One order, only when it belongs to `user_id`.
    async fn find_for_user(
        &self,
        user_id: &UserId,
        order_id: Uuid,
    ) -> Result<Option<Order>, OrderRepositoryError>;
}
