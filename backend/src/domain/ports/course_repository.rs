//! Port for courses, their enrollments, and rating aggregates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Course, Enrollment, Error, Money, PopularCourse, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by course repository adapters.
    pub enum CourseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "course repository query failed: {message}",
    }
}

impl From<CourseRepositoryError> for Error {
    fn from(err: CourseRepositoryError) -> Self {
        match err {
            CourseRepositoryError::Connection { message } => {
                tracing::warn!(%message, "course repository unavailable");
                Self::service_unavailable("course repository unavailable")
            }
            CourseRepositoryError::Query { message } => {
                Self::internal(format!("course repository error: {message}"))
            }
        }
    }
}

/// Column values written when creating or replacing a course.
///
/// Category and tags are already resolved to ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseWrite {
    /// Course id.
    pub id: Uuid,
    /// Course title.
    pub title: String,
    /// Course description.
    pub description: String,
    /// List price.
    pub price: Money,
    /// Owning instructor.
    pub instructor_id: UserId,
    /// Resolved category.
    pub category_id: Option<Uuid>,
    /// Resolved tags, in display order.
    pub tag_ids: Vec<Uuid>,
    /// Creation time; kept on replace.
    pub created_at: DateTime<Utc>,
}

/// Storage for courses and enrollments.
///
/// Returned [`Course`] values carry their category, tags, instructor
/// username, and rating summary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// All courses, newest first.
    async fn list_courses(&self) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Fetch a course by id.
    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, CourseRepositoryError>;

    /// Fetch the oldest course with exactly `title`.
    async fn find_course_by_title(&self, title: &str)
    -> Result<Option<Course>, CourseRepositoryError>;

    /// Insert a course and its tag links.
    async fn create_course(&self, course: &CourseWrite) -> Result<(), CourseRepositoryError>;

    /// Replace a course's fields and tag links. Returns `false` when missing.
    async fn update_course(&self, course: &CourseWrite) -> Result<bool, CourseRepositoryError>;

    /// Delete a course with its lessons, reviews, enrollments, and orders.
    ///
    /// Coupons scoped to this course alone are deactivated, since an empty
    /// scope would otherwise read as "every course". Returns the users who
    /// were enrolled, or `None` when the course is missing.
    async fn delete_course(&self, id: Uuid) -> Result<Option<Vec<UserId>>, CourseRepositoryError>;

    /// Every course with its enrollment count, unordered.
    async fn popular_courses(&self) -> Result<Vec<PopularCourse>, CourseRepositoryError>;

    /// Enrollments held by a user, newest first.
    async fn list_enrollments(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Enrollment>, CourseRepositoryError>;

    /// The user's enrollment in one course.
    async fn find_enrollment(
        &self,
        user_id: &UserId,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, CourseRepositoryError>;
}
