//! Courses, enrollments, and catalogue filters.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{require_text, FieldViolation};
use super::{Category, Money, Tag, UserId};

/// Maximum length of a course title.
pub const COURSE_TITLE_MAX: usize = 255;

/// Aggregated review ratings for a course.
///
/// Kept as integer totals so averages compare exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Sum of all ratings.
    pub total: i64,
    /// Number of ratings.
    pub count: i64,
}

impl RatingSummary {
    /// Average rating in hundredths, rounded half to even.
    ///
    /// # Examples
    /// ```
    /// use edunexus::domain::RatingSummary;
    ///
    /// let summary = RatingSummary { total: 14, count: 3 };
    /// assert_eq!(summary.average_hundredths(), Some(467));
    /// assert_eq!(RatingSummary::default().average_hundredths(), None);
    /// ```
    #[must_use]
    pub fn average_hundredths(self) -> Option<i64> {
        if self.count <= 0 {
            return None;
        }
        let scaled = self.total.checked_mul(100)?;
        let quotient = scaled / self.count;
        let twice_remainder = (scaled % self.count) * 2;
        let round_up = twice_remainder > self.count
            || (twice_remainder == self.count && quotient % 2 != 0);
        Some(if round_up { quotient + 1 } else { quotient })
    }

    /// Whether the exact average is at least `threshold`.
    #[must_use]
    pub fn meets(self, threshold: MinRating) -> bool {
        if self.count <= 0 {
            return false;
        }
        // total / count >= hundredths / 100  <=>  total * 100 >= hundredths * count
        i128::from(self.total) * 100 >= i128::from(threshold.0) * i128::from(self.count)
    }
}

/// Minimum average rating, held in hundredths (`4.5` is `450`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinRating(i64);

impl MinRating {
    /// Parse a decimal threshold such as `"4"` or `"3.75"`.
    pub fn parse(raw: &str) -> Result<Self, FieldViolation> {
        raw.parse::<Money>()
            .map(|value| Self(value.cents()))
            .map_err(|_| {
                FieldViolation::new("min_rating", "invalid_number", "min_rating must be a number")
            })
    }

    /// Threshold in hundredths.
    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }
}

/// A course in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
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
    /// Owning instructor's username.
    pub instructor_username: String,
    /// Category, if any.
    pub category: Option<Category>,
    /// Tags in their given order.
    pub tags: Vec<Tag>,
    /// Review aggregate.
    pub rating: RatingSummary,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Whether `user_id` published this course.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.instructor_id == user_id
    }
}

/// Validated input for creating or replacing a course.
///
/// Category and tags are referenced by name; missing ones are created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Non-empty description.
    pub description: String,
    /// Non-negative list price.
    pub price: Money,
    /// Category name.
    pub category: Option<String>,
    /// Tag names, deduplicated.
    pub tags: Vec<String>,
}

impl CourseDraft {
    /// Validate raw course fields.
    pub fn new(
        title: &str,
        description: &str,
        price: Money,
        category: Option<&str>,
        tags: &[String],
    ) -> Result<Self, FieldViolation> {
        let title = require_text("title", title, COURSE_TITLE_MAX)?;
        let description = require_text("description", description, usize::MAX)?;
        if price.is_negative() || !price.fits_storage() {
            return Err(FieldViolation::new(
                "price",
                "out_of_range",
                "price must be between 0.00 and 99999999.99",
            ));
        }
        let category = category
            .map(|name| require_text("category", name, super::TAXONOMY_NAME_MAX))
            .transpose()?;
        let mut names: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let name = require_text("tags", tag, super::TAXONOMY_NAME_MAX)?;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(Self {
            title,
            description,
            price,
            category,
            tags: names,
        })
    }
}

/// Catalogue listing filters; every populated field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Case-insensitive substring of the category name.
    pub category: Option<String>,
    /// Case-insensitive substring of the instructor's username.
    pub instructor: Option<String>,
    /// Any-of tag names.
    pub tags: Vec<String>,
    /// Minimum average review rating.
    pub min_rating: Option<MinRating>,
}

impl CourseFilter {
    /// Split a comma-separated tag list, dropping blanks.
    #[must_use]
    pub fn parse_tags(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }

    /// Whether no filter is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.instructor.is_none()
            && self.tags.is_empty()
            && self.min_rating.is_none()
    }

    /// Whether `course` satisfies every populated filter.
    #[must_use]
    pub fn matches(&self, course: &Course) -> bool {
        contains_ci(self.title.as_deref(), Some(&course.title))
            && contains_ci(
                self.category.as_deref(),
                course.category.as_ref().map(|category| category.name.as_str()),
            )
            && contains_ci(self.instructor.as_deref(), Some(&course.instructor_username))
            && (self.tags.is_empty()
                || course
                    .tags
                    .iter()
                    .any(|tag| self.tags.iter().any(|wanted| wanted == &tag.name)))
            && self
                .min_rating
                .is_none_or(|threshold| course.rating.meets(threshold))
    }
}

fn contains_ci(needle: Option<&str>, haystack: Option<&str>) -> bool {
    match (needle, haystack) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(needle), Some(haystack)) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}

/// A course together with its enrollment count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopularCourse {
    /// The course.
    pub course: Course,
    /// Number of enrolled students.
    pub enrollment_count: i64,
}

/// Order popular courses by enrollment count descending, ties by title.
pub fn rank_popular(courses: &mut [PopularCourse]) {
    courses.sort_by(|a, b| {
        b.enrollment_count
            .cmp(&a.enrollment_count)
            .then_with(|| a.course.title.cmp(&b.course.title))
    });
}

/// Access granted to a user for a purchased course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Enrolled student.
    pub user_id: UserId,
    /// Purchased course.
    pub course: Course,
    /// Time of purchase.
    pub enrolled_at: DateTime<Utc>,
    /// Completion percentage.
    pub progress: f64,
    /// Whether the course is finished.
    pub completed: bool,
}

/// How an order names the course being bought.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseSelector {
    /// By id.
    Id(Uuid),
    /// By exact title; the oldest match wins.
    Title(String),
}

impl fmt::Display for CourseSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Title(title) => f.write_str(title),
        }
    }
}
