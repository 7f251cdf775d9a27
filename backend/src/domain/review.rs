//! Course reviews.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::validation::FieldViolation;
use super::UserId;

/// A star rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    /// Validate a rating.
    pub fn new(value: i64) -> Result<Self, FieldViolation> {
        match u8::try_from(value) {
            Ok(rating @ 1..=5) => Ok(Self(rating)),
            _ => Err(FieldViolation::new(
                "rating",
                "out_of_range",
                "Rating must be between 1 and 5.",
            )),
        }
    }

    /// Raw value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// A user's review of a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Review id.
    pub id: Uuid,
    /// Reviewed course.
    pub course_id: Uuid,
    /// Author.
    pub user_id: UserId,
    /// Author username.
    pub username: String,
    /// Score.
    pub rating: Rating,
    /// Review text.
    pub comment: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Validated review content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    /// Score.
    pub rating: Rating,
    /// Review text.
    pub comment: String,
}

impl ReviewDraft {
    /// Validate raw review fields. Comments may be empty.
    pub fn new(rating: i64, comment: &str) -> Result<Self, FieldViolation> {
        Ok(Self {
            rating: Rating::new(rating)?,
            comment: comment.trim().to_owned(),
        })
    }
}
