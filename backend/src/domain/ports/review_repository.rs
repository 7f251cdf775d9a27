//! Port for course reviews.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Review};

use super::define_port_error;

define_port_error! {
    /// Errors raised by review repository adapters.
    pub enum ReviewRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "review repository query failed: {message}",
    }
}

impl From<ReviewRepositoryError> for Error {
    fn from(err: ReviewRepositoryError) -> Self {
        match err {
            ReviewRepositoryError::Connection { message } => {
                tracing::warn!(%message, "review repository unavailable");
                Self::service_unavailable("review repository unavailable")
            }
            ReviewRepositoryError::Query { message } => {
                Self::internal(format!("review repository error: {message}"))
            }
        }
    }
}

/// Storage for reviews, always addressed within their course.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Reviews of a course, newest first.
    async fn list(&self, course_id: Uuid) -> Result<Vec<Review>, ReviewRepositoryError>;

    /// Fetch one review of a course.
    async fn find(
        &self,
        course_id: Uuid,
        review_id: Uuid,
    ) -> Result<Option<Review>, ReviewRepositoryError>;

    /// Insert a review.
    async fn create(&self, review: &Review) -> Result<(), ReviewRepositoryError>;

    /// Replace rating and comment. Returns `false` when missing.
    async fn update(&self, review: &Review) -> Result<bool, ReviewRepositoryError>;

    /// Delete a review. Returns `false` when missing.
    async fn delete(&self, course_id: Uuid, review_id: Uuid) -> Result<bool, ReviewRepositoryError>;
}
