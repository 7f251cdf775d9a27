//! PostgreSQL-backed categories and tags.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::ports::{TaxonomyRepository, TaxonomyRepositoryError};
use crate::domain::{Category, Tag};

use super::diesel_helpers::{
    map_basic_diesel_error, map_basic_pool_error, touched, unique_violation,
};
use super::models::{CategoryRow, TagRow};
use super::pool::{DbPool, PoolError};
use super::schema::{categories, tags};

/// Diesel-backed [`TaxonomyRepository`].
#[derive(Clone)]
pub struct DieselTaxonomyRepository {
    pool: DbPool,
}

impl DieselTaxonomyRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TaxonomyRepositoryError {
    map_basic_pool_error(error, TaxonomyRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> TaxonomyRepositoryError {
    map_basic_diesel_error(
        error,
        TaxonomyRepositoryError::query,
        TaxonomyRepositoryError::connection,
    )
}

/// Like [`map_diesel_error`], reporting the category name on a name clash.
fn map_write_error(error: DieselError, name: &str) -> TaxonomyRepositoryError {
    match unique_violation(&error) {
        Some("categories_name_key") => TaxonomyRepositoryError::duplicate_name(name),
        _ => map_diesel_error(error),
    }
}

#[async_trait]
impl TaxonomyRepository for DieselTaxonomyRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CategoryRow> = categories::table
            .order((categories::name, categories::id))
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        categories::table
            .find(id)
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Category::from))
            .map_err(map_diesel_error)
    }

    async fn create_category(&self, category: &Category) -> Result<(), TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(categories::table)
            .values(&CategoryRow::from(category))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, &category.name))
    }

    async fn update_category(&self, category: &Category) -> Result<bool, TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(categories::table.find(category.id))
            .set((
                categories::name.eq(&category.name),
                categories::description.eq(category.description.as_deref()),
                categories::parent_id.eq(category.parent_id),
            ))
            .execute(&mut conn)
            .await
            .map(touched)
            .map_err(|err| map_write_error(err, &category.name))
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Courses and child categories are detached by `ON DELETE SET NULL`.
        diesel::delete(categories::table.find(id))
            .execute(&mut conn)
            .await
            .map(touched)
            .map_err(map_diesel_error)
    }

    async fn ensure_category(
        &self,
        name: &str,
        at: DateTime<Utc>,
    ) -> Result<Category, TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let candidate = CategoryRow {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: None,
            parent_id: None,
            created_at: at,
        };

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(categories::table)
                    .values(&candidate)
                    .on_conflict(categories::name)
                    .do_nothing()
                    .execute(conn)
                    .await?;
                categories::table
                    .filter(categories::name.eq(&candidate.name))
                    .select(CategoryRow::as_select())
                    .first(conn)
                    .await
            }
            .scope_boxed()
        })
        .await
        .map(Category::from)
        .map_err(map_diesel_error)
    }

    async fn ensure_tags(
        &self,
        names: &[String],
        at: DateTime<Utc>,
    ) -> Result<Vec<Tag>, TaxonomyRepositoryError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let candidates: Vec<TagRow> = names
            .iter()
            .map(|name| TagRow {
                id: Uuid::new_v4(),
                name: name.clone(),
                created_at: at,
            })
            .collect();

        let stored: Vec<TagRow> = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(tags::table)
                        .values(&candidates)
                        .on_conflict(tags::name)
                        .do_nothing()
                        .execute(conn)
                        .await?;
                    tags::table
                        .filter(tags::name.eq_any(names))
                        .select(TagRow::as_select())
                        .load(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let by_name: HashMap<String, Tag> = stored
            .into_iter()
            .map(|row| (row.name.clone(), Tag::from(row)))
            .collect();
        names
            .iter()
            .map(|name| {
                by_name.get(name).cloned().ok_or_else(|| {
                    TaxonomyRepositoryError::query(format!("tag \"{name}\" vanished after insert"))
                })
            })
            .collect()
    }
}
