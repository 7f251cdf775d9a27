//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request DTOs keep loosely typed fields (strings, optional values) so a bad
//! value produces a field-specific `invalid_request` payload instead of a
//! generic body parsing failure.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, Money, MoneyParseError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidAmount,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidAmount => "invalid_amount",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_value_error(
    field: FieldName,
    code: ErrorCode,
    message: impl Into<String>,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {name}"),
    )
}

/// Unwrap an optional body field or report it missing.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    let name = field.as_str();
    Uuid::parse_str(value.trim()).map_err(|_| {
        field_value_error(
            field,
            ErrorCode::InvalidUuid,
            format!("{name} must be a valid UUID"),
            value,
        )
    })
}

pub(crate) fn parse_uuid_list(values: &[String], field: FieldName) -> Result<Vec<Uuid>, Error> {
    let name = field.as_str();
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Uuid::parse_str(value.trim()).map_err(|_| {
                Error::invalid_request(format!("{name} must contain valid UUIDs")).with_details(
                    json!({
                        "field": name,
                        "index": index,
                        "value": value,
                        "code": ErrorCode::InvalidUuid.as_str(),
                    }),
                )
            })
        })
        .collect()
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    let name = field.as_str();
    DateTime::parse_from_rfc3339(value.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            field_value_error(
                field,
                ErrorCode::InvalidTimestamp,
                format!("{name} must be an RFC 3339 timestamp"),
                value,
            )
        })
}

/// A decimal amount accepted either as a JSON string (`"49.99"`) or a JSON
/// number (`49.99`).
///
/// DTO fields holding one declare `#[schema(value_type = Option<String>)]`,
/// so the document advertises the string form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DecimalInput {
    /// Quoted decimal.
    Text(String),
    /// Bare JSON number.
    Number(serde_json::Number),
}

impl DecimalInput {
    fn raw(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
        }
    }
}

pub(crate) fn parse_amount(input: &DecimalInput, field: FieldName) -> Result<Money, Error> {
    let raw = input.raw();
    raw.parse::<Money>().map_err(|err| {
        let message = match err {
            MoneyParseError::Empty | MoneyParseError::Invalid => "A valid number is required.",
            MoneyParseError::TooManyFractionDigits => {
                "Ensure that there are no more than 2 decimal places."
            }
            MoneyParseError::OutOfRange => {
                "Ensure that there are no more than 10 digits in total."
            }
        };
        field_value_error(field, ErrorCode::InvalidAmount, message, &raw)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PRICE: FieldName = FieldName::new("price");

    #[rstest]
    #[case(DecimalInput::Text("49.99".to_owned()), 4_999)]
    #[case(DecimalInput::Text(" 10 ".to_owned()), 1_000)]
    #[case(DecimalInput::Number(serde_json::Number::from(25)), 2_500)]
    fn parses_amounts(#[case] input: DecimalInput, #[case] cents: i64) {
        assert_eq!(parse_amount(&input, PRICE), Ok(Money::from_cents(cents)));
    }

    #[rstest]
    #[case("12.345", "Ensure that there are no more than 2 decimal places.")]
    #[case("123456789012", "Ensure that there are no more than 10 digits in total.")]
    #[case("ten", "A valid number is required.")]
    fn rejects_bad_amounts(#[case] raw: &str, #[case] message: &str) {
        let err = parse_amount(&DecimalInput::Text(raw.to_owned()), PRICE).expect_err("invalid");
        assert_eq!(err.message(), message);
        assert_eq!(
            err.details(),
            Some(&json!({"field": "price", "value": raw, "code": "invalid_amount"}))
        );
    }

    #[test]
    fn decimal_input_accepts_strings_and_numbers() {
        let text: DecimalInput = serde_json::from_str("\"1.50\"").expect("text");
        let number: DecimalInput = serde_json::from_str("1.5").expect("number");
        assert_eq!(parse_amount(&text, PRICE), parse_amount(&number, PRICE));
    }

    #[test]
    fn uuid_list_reports_offending_index() {
        let values = vec![Uuid::nil().to_string(), "nope".to_owned()];
        let err = parse_uuid_list(&values, FieldName::new("courses")).expect_err("bad uuid");
        assert_eq!(err.details().and_then(|d| d.get("index")), Some(&json!(1)));
    }

    #[test]
    fn timestamps_must_be_rfc3339() {
        let field = FieldName::new("validUntil");
        assert!(parse_rfc3339_timestamp("2024-10-03T12:00:00Z", field).is_ok());
        let err = parse_rfc3339_timestamp("tomorrow", field).expect_err("bad timestamp");
        assert_eq!(err.message(), "validUntil must be an RFC 3339 timestamp");
    }

    #[test]
    fn missing_fields_name_the_field() {
        let err = require::<String>(None, FieldName::new("email")).expect_err("missing");
        assert_eq!(err.message(), "missing required field: email");
    }
}
