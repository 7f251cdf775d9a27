//! Driving port for order history.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Order, UserId};

/// Domain use-case port for reading the caller's orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// Orders placed by the caller.
    async fn list_orders(&self, actor: &UserId) -> Result<Vec<Order>, Error>;

    /// One of the caller's orders.
    async fn get_order(&self, actor: &UserId, id: Uuid) -> Result<Order, Error>;
}
