//! Field-level validation failures shared by domain constructors.

use serde_json::json;

use super::Error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Offending field, as named in the request.
    pub field: &'static str,
    /// Machine-readable reason.
    pub code: &'static str,
    /// Message returned to the client.
    pub message: String,
}

impl FieldViolation {
    /// Build a violation for `field`.
    pub fn new(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
        }
    }
}

impl From<FieldViolation> for Error {
    fn from(value: FieldViolation) -> Self {
        Self::invalid_request(value.message).with_details(json!({
            "field": value.field,
            "code": value.code,
        }))
    }
}

/// Trim `value` and require it to be non-empty and at most `max` characters.
pub fn require_text(field: &'static str, value: &str, max: usize) -> Result<String, FieldViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldViolation::new(
            field,
            "blank",
            format!("{field} must not be blank"),
        ));
    }
    if trimmed.chars().count() > max {
        return Err(FieldViolation::new(
            field,
            "too_long",
            format!("{field} must be at most {max} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[test]
    fn converts_to_invalid_request_with_details() {
        let error = Error::from(FieldViolation::new("title", "blank", "title must not be blank"));
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "title must not be blank");
        assert_eq!(
            error.details(),
            Some(&json!({"field": "title", "code": "blank"}))
        );
    }

    #[test]
    fn require_text_enforces_bounds() {
        assert_eq!(require_text("name", "  ok ", 5), Ok("ok".to_owned()));
        assert_eq!(require_text("name", "   ", 5).map_err(|v| v.code), Err("blank"));
        assert_eq!(require_text("name", "toolong", 5).map_err(|v| v.code), Err("too_long"));
    }
}
