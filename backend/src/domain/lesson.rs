//! Lessons belonging to a course.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::validation::{require_text, FieldViolation};

/// Maximum length of a lesson title.
pub const LESSON_TITLE_MAX: usize = 255;

/// A lesson within a course.
///
/// `video` stores a path or URL to previously uploaded media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    /// Lesson id.
    pub id: Uuid,
    /// Owning course.
    pub course_id: Uuid,
    /// Lesson title.
    pub title: String,
    /// Media path or URL.
    pub video: Option<String>,
    /// Lesson text.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating or replacing a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDraft {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Media path or URL.
    pub video: Option<String>,
    /// Non-empty lesson text.
    pub content: String,
}

impl LessonDraft {
    /// Validate raw lesson fields.
    pub fn new(title: &str, video: Option<&str>, content: &str) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: require_text("title", title, LESSON_TITLE_MAX)?,
            video: video
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned),
            content: require_text("content", content, usize::MAX)?,
        })
    }
}
