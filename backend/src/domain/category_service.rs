//! Category management. Reads are public; writes need the admin flag.
//!
//! Courses embed their category, so renaming or deleting one drops the cached
//! course listing.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::access::require_admin;
use crate::domain::course_service::{COURSE_LIST_CACHE_KEY, forget};
use crate::domain::ports::{
    CategoryCommand, CategoryQuery, CategoryRequest, KeyValueCache, TaxonomyRepository,
    UserRepository,
};
use crate::domain::{Category, CategoryDraft, CategoryFilter, Error, UserId};

/// Category service implementing [`CategoryCommand`] and [`CategoryQuery`].
#[derive(Clone)]
pub struct CategoryService {
    taxonomy: Arc<dyn TaxonomyRepository>,
    users: Arc<dyn UserRepository>,
    cache: Arc<dyn KeyValueCache>,
    clock: Arc<dyn Clock>,
}

impl CategoryService {
    /// Create a service over the taxonomy and user repositories.
    pub fn new(
        taxonomy: Arc<dyn TaxonomyRepository>,
        users: Arc<dyn UserRepository>,
        cache: Arc<dyn KeyValueCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            taxonomy,
            users,
            cache,
            clock,
        }
    }

    async fn require_category(&self, id: Uuid) -> Result<Category, Error> {
        self.taxonomy
            .find_category(id)
            .await?
            .ok_or_else(|| Error::not_found("Category not found."))
    }

    async fn check_parent(&self, parent_id: Option<Uuid>, own_id: Option<Uuid>) -> Result<(), Error> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        if own_id == Some(parent_id) {
            return Err(Error::invalid_request("A category cannot be its own parent."));
        }
        if self.taxonomy.find_category(parent_id).await?.is_none() {
            return Err(Error::invalid_request("Parent category does not exist."));
        }
        Ok(())
    }
}

fn draft_from(request: &CategoryRequest) -> Result<CategoryDraft, Error> {
    Ok(CategoryDraft::new(
        &request.name,
        request.description.as_deref(),
        request.parent_id,
    )?)
}

#[async_trait]
impl CategoryCommand for CategoryService {
    async fn create_category(
        &self,
        actor: &UserId,
        request: CategoryRequest,
    ) -> Result<Category, Error> {
        require_admin(self.users.as_ref(), actor).await?;
        let draft = draft_from(&request)?;
        self.check_parent(draft.parent_id, None).await?;

        let category = Category {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            parent_id: draft.parent_id,
            created_at: self.clock.utc(),
        };
        self.taxonomy.create_category(&category).await?;
        info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    async fn update_category(
        &self,
        actor: &UserId,
        id: Uuid,
        request: CategoryRequest,
    ) -> Result<Category, Error> {
        require_admin(self.users.as_ref(), actor).await?;
        let existing = self.require_category(id).await?;
        let draft = draft_from(&request)?;
        self.check_parent(draft.parent_id, Some(id)).await?;

        let category = Category {
            name: draft.name,
            description: draft.description,
            parent_id: draft.parent_id,
            ..existing
        };
        if !self.taxonomy.update_category(&category).await? {
            return Err(Error::not_found("Category not found."));
        }
        forget(self.cache.as_ref(), COURSE_LIST_CACHE_KEY).await;
        Ok(category)
    }

    async fn delete_category(&self, actor: &UserId, id: Uuid) -> Result<(), Error> {
        require_admin(self.users.as_ref(), actor).await?;
        if !self.taxonomy.delete_category(id).await? {
            return Err(Error::not_found("Category not found."));
        }
        forget(self.cache.as_ref(), COURSE_LIST_CACHE_KEY).await;
        info!(category_id = %id, "category deleted");
        Ok(())
    }
}

#[async_trait]
impl CategoryQuery for CategoryService {
    async fn list_categories(&self, filter: CategoryFilter) -> Result<Vec<Category>, Error> {
        let mut categories = self.taxonomy.list_categories().await?;
        categories.retain(|category| filter.matches(category));
        Ok(categories)
    }

    async fn get_category(&self, id: Uuid) -> Result<Category, Error> {
        self.require_category(id).await
    }
}
