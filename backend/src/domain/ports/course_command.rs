//! Driving port for publishing and editing courses.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Course, Error, Money, UserId};

/// Raw course payload; validated by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRequest {
    /// Course title.
    pub title: String,
    /// Course description.
    pub description: String,
    /// List price.
    pub price: Money,
    /// Category name, created when missing.
    pub category: Option<String>,
    /// Tag names, created when missing.
    pub tags: Vec<String>,
}

/// Domain use-case port for course mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseCommand: Send + Sync {
    /// Publish a course. Instructors only.
    async fn create_course(&self, actor: &UserId, request: CourseRequest) -> Result<Course, Error>;

    /// Replace a course. Owning instructor only.
    async fn update_course(
        &self,
        actor: &UserId,
        id: Uuid,
        request: CourseRequest,
    ) -> Result<Course, Error>;

    /// Delete a course. Owning instructor only.
    async fn delete_course(&self, actor: &UserId, id: Uuid) -> Result<(), Error>;
}
