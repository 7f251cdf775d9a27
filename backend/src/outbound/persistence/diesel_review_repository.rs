//! PostgreSQL-backed reviews, joined with their author's username.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::Review;
use crate::domain::ports::{ReviewRepository, ReviewRepositoryError};

use super::diesel_helpers::{
    collect_rows, map_basic_diesel_error, map_basic_pool_error, touched,
};
use super::models::{ReviewRow, review_from_row};
use super::pool::{DbPool, PoolError};
use super::schema::{reviews, users};

/// Diesel-backed [`ReviewRepository`].
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewRepositoryError {
    map_basic_pool_error(error, ReviewRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> ReviewRepositoryError {
    map_basic_diesel_error(
        error,
        ReviewRepositoryError::query,
        ReviewRepositoryError::connection,
    )
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn list(&self, course_id: Uuid) -> Result<Vec<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(ReviewRow, String)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::course_id.eq(course_id))
            .order((reviews::created_at.desc(), reviews::id.desc()))
            .select((ReviewRow::as_select(), users::username))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(
            rows.into_iter()
                .map(|(row, username)| review_from_row(row, username)),
            ReviewRepositoryError::query,
        )
    }

    async fn find(
        &self,
        course_id: Uuid,
        review_id: Uuid,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(ReviewRow, String)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::id.eq(review_id))
            .filter(reviews::course_id.eq(course_id))
            .select((ReviewRow::as_select(), users::username))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|(row, username)| review_from_row(row, username))
            .transpose()
            .map_err(ReviewRepositoryError::query)
    }

    async fn create(&self, review: &Review) -> Result<(), ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(reviews::table)
            .values(&ReviewRow::from(review))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, review: &Review) -> Result<bool, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            reviews::table
                .filter(reviews::id.eq(review.id))
                .filter(reviews::course_id.eq(review.course_id)),
        )
        .set((
            reviews::rating.eq(i16::from(review.rating.value())),
            reviews::comment.eq(&review.comment),
        ))
        .execute(&mut conn)
        .await
        .map(touched)
        .map_err(map_diesel_error)
    }

    async fn delete(&self, course_id: Uuid, review_id: Uuid) -> Result<bool, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(
            reviews::table
                .filter(reviews::id.eq(review_id))
                .filter(reviews::course_id.eq(course_id)),
        )
        .execute(&mut conn)
        .await
        .map(touched)
        .map_err(map_diesel_error)
    }
}
