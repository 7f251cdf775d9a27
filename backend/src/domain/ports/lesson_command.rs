//! Driving port for lesson authoring.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Lesson, UserId};

/// Raw lesson payload; validated by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRequest {
    /// Lesson title.
    pub title: String,
    /// Media path or URL.
    pub video: Option<String>,
    /// Lesson text.
    pub content: String,
}

/// Domain use-case port for lesson mutations. Course owner only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonCommand: Send + Sync {
    /// Add a lesson to a course.
    async fn create_lesson(
        &self,
        actor: &UserId,
        course_id: Uuid,
        request: LessonRequest,
    ) -> Result<Lesson, Error>;

    /// Replace a lesson.
    async fn update_lesson(
        &self,
        actor: &UserId,
        course_id: Uuid,
        lesson_id: Uuid,
        request: LessonRequest,
    ) -> Result<Lesson, Error>;

    /// Remove a lesson.
    async fn delete_lesson(&self, actor: &UserId, course_id: Uuid, lesson_id: Uuid)
    -> Result<(), Error>;
}
