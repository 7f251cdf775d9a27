//! Driving port for catalogue and enrollment reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Course, CourseFilter, Enrollment, Error, PopularCourse, UserId};

/// Domain use-case port for browsing courses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseQuery: Send + Sync {
    /// Courses matching `filter`.
    async fn list_courses(&self, filter: CourseFilter) -> Result<Vec<Course>, Error>;

    /// One course.
    async fn get_course(&self, id: Uuid) -> Result<Course, Error>;

    /// Courses ranked by enrollment count.
    async fn popular_courses(&self) -> Result<Vec<PopularCourse>, Error>;

    /// Enrollments of the caller.
    async fn list_enrollments(&self, user_id: &UserId) -> Result<Vec<Enrollment>, Error>;

    /// The caller's enrollment in one course.
    async fn get_enrollment(&self, user_id: &UserId, course_id: Uuid) -> Result<Enrollment, Error>;
}
