//! Course categories and tags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{require_text, FieldViolation};

/// Maximum length of category and tag names.
pub const TAXONOMY_NAME_MAX: usize = 100;

/// A course category, optionally nested under a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id.
    pub id: Uuid,
    /// Unique name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Parent category, if nested.
    pub parent_id: Option<Uuid>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Free-form label attached to courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag id.
    pub id: Uuid,
    /// Unique name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating or replacing a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    /// Trimmed, non-empty name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Parent category id.
    pub parent_id: Option<Uuid>,
}

impl CategoryDraft {
    /// Validate raw category fields.
    ///
    /// Blank descriptions collapse to `None`.
    pub fn new(
        name: &str,
        description: Option<&str>,
        parent_id: Option<Uuid>,
    ) -> Result<Self, FieldViolation> {
        let name = require_text("name", name, TAXONOMY_NAME_MAX)?;
        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(ToOwned::to_owned);
        Ok(Self {
            name,
            description,
            parent_id,
        })
    }
}

/// Filters for listing categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    /// Exact name.
    pub name: Option<String>,
}

impl CategoryFilter {
    /// Whether a category satisfies the filter.
    #[must_use]
    pub fn matches(&self, category: &Category) -> bool {
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            category
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let name_ok = self
            .name
            .as_deref()
            .is_none_or(|name| category.name == name);
        search_ok && name_ok
    }
}
