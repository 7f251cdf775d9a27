//! Port for course lessons.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Lesson};

use super::define_port_error;

define_port_error! {
    /// Errors raised by lesson repository adapters.
    pub enum LessonRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "lesson repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "lesson repository query failed: {message}",
    }
}

impl From<LessonRepositoryError> for Error {
    fn from(err: LessonRepositoryError) -> Self {
        match err {
            LessonRepositoryError::Connection { message } => {
                tracing::warn!(%message, "lesson repository unavailable");
                Self::service_unavailable("lesson repository unavailable")
            }
            LessonRepositoryError::Query { message } => {
                Self::internal(format!("lesson repository error: {message}"))
            }
        }
    }
}

/// Storage for lessons, always addressed within their course.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Lessons of a course in creation order.
    async fn list(&self, course_id: Uuid) -> Result<Vec<Lesson>, LessonRepositoryError>;

    /// Fetch one lesson of a course.
    async fn find(
        &self,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Option<Lesson>, LessonRepositoryError>;

    /// Insert a lesson.
    async fn create(&self, lesson: &Lesson) -> Result<(), LessonRepositoryError>;

    /// Replace title, video, and content. Returns `false` when missing.
    async fn update(&self, lesson: &Lesson) -> Result<bool, LessonRepositoryError>;

    /// Delete a lesson. Returns `false` when missing.
    async fn delete(&self, course_id: Uuid, lesson_id: Uuid) -> Result<bool, LessonRepositoryError>;
}
