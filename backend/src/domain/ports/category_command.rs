//! Driving port for category administration.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Error, UserId};

/// Raw category payload; validated by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRequest {
    /// Category name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Parent category id.
    pub parent_id: Option<Uuid>,
}

/// Domain use-case port for category mutations. Admins only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryCommand: Send + Sync {
    /// Create a category.
    async fn create_category(&self, actor: &UserId, request: CategoryRequest)
    -> Result<Category, Error>;

    /// Replace a category.
    async fn update_category(
        &self,
        actor: &UserId,
        id: Uuid,
        request: CategoryRequest,
    ) -> Result<Category, Error>;

    /// Delete a category.
    async fn delete_category(&self, actor: &UserId, id: Uuid) -> Result<(), Error>;
}
