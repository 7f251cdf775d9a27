//! Driving port for category reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, CategoryFilter, Error};

/// Domain use-case port for browsing categories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryQuery: Send + Sync {
    /// Categories matching `filter`, ordered by name.
    async fn list_categories(&self, filter: CategoryFilter) -> Result<Vec<Category>, Error>;

    /// One category.
    async fn get_category(&self, id: Uuid) -> Result<Category, Error>;
}
