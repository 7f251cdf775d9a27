//! Driving port for writing reviews.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Review, UserId};

/// Raw review payload; validated by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    /// Raw score; must be 1 to 5.
    pub rating: i64,
    /// Review text.
    pub comment: String,
}

/// Domain use-case port for review mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewCommand: Send + Sync {
    /// Review a course. The course's instructor may not.
    async fn create_review(
        &self,
        actor: &UserId,
        course_id: Uuid,
        request: ReviewRequest,
    ) -> Result<Review, Error>;

    /// Edit one's own review.
    async fn update_review(
        &self,
        actor: &UserId,
        course_id: Uuid,
        review_id: Uuid,
        request: ReviewRequest,
    ) -> Result<Review, Error>;

    /// Delete one's own review.
    async fn delete_review(&self, actor: &UserId, course_id: Uuid, review_id: Uuid)
    -> Result<(), Error>;
}
