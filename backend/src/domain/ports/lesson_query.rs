//! Driving port for lesson reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Lesson};

/// Domain use-case port for reading lessons.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonQuery: Send + Sync {
    /// Lessons of a course.
    async fn list_lessons(&self, course_id: Uuid) -> Result<Vec<Lesson>, Error>;

    /// One lesson of a course.
    async fn get_lesson(&self, course_id: Uuid, lesson_id: Uuid) -> Result<Lesson, Error>;
}
