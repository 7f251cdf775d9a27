//! Environment parsing helpers for session configuration.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

use super::{BuildMode, SAMESITE_ENV, SessionConfigError};

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// A boolean variable and the value debug builds fall back to.
pub(super) struct BoolEnvConfig {
    name: &'static str,
    default_value: bool,
}

impl BoolEnvConfig {
    pub(super) const fn new(name: &'static str, default_value: bool) -> Self {
        Self {
            name,
            default_value,
        }
    }
}

/// Read a boolean toggle, then pass it through `check`.
pub(super) fn parse_bool_env<E, F>(
    env: &E,
    mode: BuildMode,
    config: BoolEnvConfig,
    check: F,
) -> Result<bool, SessionConfigError>
where
    E: Env,
    F: FnOnce(bool, BuildMode) -> Result<bool, SessionConfigError>,
{
    let BoolEnvConfig {
        name,
        default_value,
    } = config;
    let Some(value) = env.string(name) else {
        return fallback_or_error(
            mode,
            default_value,
            SessionConfigError::MissingEnv { name },
            || warn!(variable = name, default = default_value, "session toggle not set"),
        );
    };
    if let Some(flag) = parse_bool(&value) {
        return check(flag, mode);
    }
    let logged = value.clone();
    fallback_or_error(
        mode,
        default_value,
        SessionConfigError::InvalidEnv {
            name,
            value,
            expected: BOOL_EXPECTED,
        },
        || {
            warn!(
                variable = name,
                value = %logged,
                default = default_value,
                "invalid session toggle"
            );
        },
    )
}

/// Debug builds log and use `fallback`; release builds fail with `error`.
pub(super) fn fallback_or_error<T, F>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
    log: F,
) -> Result<T, SessionConfigError>
where
    F: FnOnce(),
{
    if mode.is_debug() {
        log();
        Ok(fallback)
    } else {
        Err(error)
    }
}

pub(super) fn parse_same_site_value(
    value: String,
    mode: BuildMode,
    cookie_secure: bool,
    default_same_site: SameSite,
) -> Result<SameSite, SessionConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => fallback_or_error(
            mode,
            SameSite::None,
            SessionConfigError::InsecureSameSiteNone,
            || warn!("SESSION_SAMESITE=None without a secure cookie; browsers may drop it"),
        ),
        _ => {
            let logged = value.clone();
            fallback_or_error(
                mode,
                default_same_site,
                SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value,
                    expected: SAMESITE_EXPECTED,
                },
                || warn!(value = %logged, "invalid SESSION_SAMESITE; using default"),
            )
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Some(true))]
    #[case(" Yes ", Some(true))]
    #[case("n", Some(false))]
    #[case("FALSE", Some(false))]
    #[case("maybe", None)]
    #[case("", None)]
    fn parses_boolean_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(raw), expected);
    }

    #[rstest]
    #[case("strict", SameSite::Strict)]
    #[case("LAX", SameSite::Lax)]
    fn parses_same_site(#[case] raw: &str, #[case] expected: SameSite) {
        let parsed = parse_same_site_value(raw.to_owned(), BuildMode::Release, false, SameSite::Strict)
            .expect("valid");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn insecure_none_is_tolerated_only_in_debug() {
        let debug = parse_same_site_value("None".to_owned(), BuildMode::Debug, false, SameSite::Lax);
        assert_eq!(debug.expect("debug fallback"), SameSite::None);
        let release =
            parse_same_site_value("None".to_owned(), BuildMode::Release, false, SameSite::Strict);
        assert!(matches!(release, Err(SessionConfigError::InsecureSameSiteNone)));
    }
}
