//! Tests for the domain user model.

use super::*;
use rstest::rstest;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
fn user_id_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw), Err(expected));
}

#[rstest]
fn user_id_round_trips_through_serde() {
    let id = UserId::new(VALID_ID).expect("valid id");
    let json = serde_json::to_string(&id).expect("serialise");
    let back: UserId = serde_json::from_str(&json).expect("deserialise");
    assert_eq!(back, id);
    assert_eq!(back.as_uuid().to_string(), VALID_ID);
}

#[rstest]
#[case("ada")]
#[case("ada.lovelace+courses@edu")]
#[case("under_score-dash")]
fn username_accepts_allowed_characters(#[case] raw: &str) {
    let username = Username::new(raw).expect("valid username");
    assert_eq!(username.as_ref(), raw);
}

#[rstest]
#[case("   ", UserValidationError::EmptyUsername)]
#[case("has space", UserValidationError::UsernameInvalidCharacters)]
#[case("semi;colon", UserValidationError::UsernameInvalidCharacters)]
fn username_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Username::new(raw), Err(expected));
}

#[rstest]
fn username_rejects_overlong_values() {
    let raw = "a".repeat(USERNAME_MAX + 1);
    assert_eq!(
        Username::new(raw),
        Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX })
    );
}

#[rstest]
#[case("Ada@Example.COM", "Ada@example.com")]
#[case("  bob@mail.org ", "bob@mail.org")]
fn email_normalises_domain(#[case] raw: &str, #[case] expected: &str) {
    let email = EmailAddress::new(raw).expect("valid email");
    assert_eq!(email.as_ref(), expected);
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::InvalidEmail)]
#[case("two@@example.com", UserValidationError::InvalidEmail)]
#[case("missing@tld", UserValidationError::InvalidEmail)]
fn email_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(EmailAddress::new(raw), Err(expected));
}

#[rstest]
#[case("student", Role::Student)]
#[case("instructor", Role::Instructor)]
fn role_parses_known_values(#[case] raw: &str, #[case] expected: Role) {
    assert_eq!(raw.parse::<Role>(), Ok(expected));
    assert_eq!(expected.as_str(), raw);
}

#[rstest]
fn role_rejects_unknown_values() {
    assert_eq!(
        "admin".parse::<Role>(),
        Err(UserValidationError::UnknownRole("admin".to_owned()))
    );
}

#[rstest]
fn role_defaults_to_student() {
    assert_eq!(Role::default(), Role::Student);
}
