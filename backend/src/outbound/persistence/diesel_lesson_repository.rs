//! PostgreSQL-backed lessons.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::Lesson;
use crate::domain::ports::{LessonRepository, LessonRepositoryError};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error, touched};
use super::models::LessonRow;
use super::pool::{DbPool, PoolError};
use super::schema::lessons;

/// Diesel-backed [`LessonRepository`].
#[derive(Clone)]
pub struct DieselLessonRepository {
    pool: DbPool,
}

impl DieselLessonRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LessonRepositoryError {
    map_basic_pool_error(error, LessonRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> LessonRepositoryError {
    map_basic_diesel_error(
        error,
        LessonRepositoryError::query,
        LessonRepositoryError::connection,
    )
}

#[async_trait]
impl LessonRepository for DieselLessonRepository {
    async fn list(&self, course_id: Uuid) -> Result<Vec<Lesson>, LessonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<LessonRow> = lessons::table
            .filter(lessons::course_id.eq(course_id))
            .order((lessons::created_at, lessons::id))
            .select(LessonRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Lesson::from).collect())
    }

    async fn find(
        &self,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Option<Lesson>, LessonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        lessons::table
            .filter(lessons::id.eq(lesson_id))
            .filter(lessons::course_id.eq(course_id))
            .select(LessonRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Lesson::from))
            .map_err(map_diesel_error)
    }

    async fn create(&self, lesson: &Lesson) -> Result<(), LessonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(lessons::table)
            .values(&LessonRow::from(lesson))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, lesson: &Lesson) -> Result<bool, LessonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            lessons::table
                .filter(lessons::id.eq(lesson.id))
                .filter(lessons::course_id.eq(lesson.course_id)),
        )
        .set((
            lessons::title.eq(&lesson.title),
            lessons::video.eq(lesson.video.as_deref()),
            lessons::content.eq(&lesson.content),
        ))
        .execute(&mut conn)
        .await
        .map(touched)
        .map_err(map_diesel_error)
    }

    async fn delete(&self, course_id: Uuid, lesson_id: Uuid) -> Result<bool, LessonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(
            lessons::table
                .filter(lessons::id.eq(lesson_id))
                .filter(lessons::course_id.eq(course_id)),
        )
        .execute(&mut conn)
        .await
        .map(touched)
        .map_err(map_diesel_error)
    }
}
