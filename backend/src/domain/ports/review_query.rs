//! Driving port for review reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Review};

/// Domain use-case port for reading reviews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewQuery: Send + Sync {
    /// Reviews of a course.
    async fn list_reviews(&self, course_id: Uuid) -> Result<Vec<Review>, Error>;

    /// One review of a course.
    async fn get_review(&self, course_id: Uuid, review_id: Uuid) -> Result<Review, Error>;
}
