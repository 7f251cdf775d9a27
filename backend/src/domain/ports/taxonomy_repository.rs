//! Port for categories and tags.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Error, Tag};

use super::define_port_error;

define_port_error! {
    /// Errors raised by taxonomy repository adapters.
    pub enum TaxonomyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "taxonomy repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "taxonomy repository query failed: {message}",
        /// A category with the same name exists.
        DuplicateName { name: String } => "category \"{name}\" already exists",
    }
}

impl From<TaxonomyRepositoryError> for Error {
    fn from(err: TaxonomyRepositoryError) -> Self {
        match err {
            TaxonomyRepositoryError::Connection { message } => {
                tracing::warn!(%message, "taxonomy repository unavailable");
                Self::service_unavailable("taxonomy repository unavailable")
            }
            TaxonomyRepositoryError::Query { message } => {
                Self::internal(format!("taxonomy repository error: {message}"))
            }
            TaxonomyRepositoryError::DuplicateName { .. } => {
                Self::conflict("category with this name already exists.")
            }
        }
    }
}

/// Storage for the course taxonomy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// All categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, TaxonomyRepositoryError>;

    /// Fetch a category by id.
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, TaxonomyRepositoryError>;

    /// Insert a category.
    async fn create_category(&self, category: &Category) -> Result<(), TaxonomyRepositoryError>;

    /// Replace name, description, and parent. Returns `false` when missing.
    async fn update_category(&self, category: &Category) -> Result<bool, TaxonomyRepositoryError>;

    /// Delete a category; courses keep existing without one.
    async fn delete_category(&self, id: Uuid) -> Result<bool, TaxonomyRepositoryError>;

    /// Fetch the category called `name`, creating it when absent.
    async fn ensure_category(
        &self,
        name: &str,
        at: DateTime<Utc>,
    ) -> Result<Category, TaxonomyRepositoryError>;

    /// Fetch the tags called `names`, creating missing ones. Order follows `names`.
    async fn ensure_tags(
        &self,
        names: &[String],
        at: DateTime<Utc>,
    ) -> Result<Vec<Tag>, TaxonomyRepositoryError>;
}
