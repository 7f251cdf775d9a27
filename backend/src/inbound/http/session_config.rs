//! Session cookie settings read from `SESSION_*` environment variables.
//!
//! Debug builds fall back to permissive defaults with a warning; release
//! builds refuse to start on missing or malformed values.
//!
//! | Variable                  | Meaning                              |
//! |---------------------------|--------------------------------------|
//! | `SESSION_KEY_FILE`        | path to >= 64 bytes of key material  |
//! | `SESSION_COOKIE_NAME`     | cookie name (`edunexus_session`)     |
//! | `SESSION_COOKIE_SECURE`   | mark the cookie `Secure`             |
//! | `SESSION_SAMESITE`        | `Strict`, `Lax` or `None`            |
//! | `SESSION_ALLOW_EPHEMERAL` | allow a generated key when unreadable |

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

pub mod fingerprint;
mod parsing;

use parsing::{BoolEnvConfig, fallback_or_error, parse_bool_env, parse_same_site_value};

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/edunexus/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const DEFAULT_COOKIE_NAME: &str = "edunexus_session";
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_NAME_ENV: &str = "SESSION_COOKIE_NAME";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Defaults with warnings.
    Debug,
    /// Every toggle explicit and valid.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use edunexus::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated session cookie settings.
#[derive(Clone)]
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Log-safe fingerprint of [`Self::key`].
    #[must_use]
    pub fn key_fingerprint(&self) -> String {
        fingerprint::key_fingerprint(&self.key)
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Value that was supplied.
        value: String,
        /// Description of the expected value.
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        /// Key file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The key file holds fewer than 64 bytes.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Key file path.
        path: PathBuf,
        /// Actual key length in bytes.
        length: usize,
        /// Minimum required length in bytes.
        min_len: usize,
    },
    /// `SameSite=None` without a secure cookie.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not allow ephemeral session keys.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build session settings from the environment.
///
/// # Examples
///
/// ```rust
/// use edunexus::inbound::http::session_config::{BuildMode, session_settings_from_env};
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "SESSION_ALLOW_EPHEMERAL" => Some("1".to_owned()),
///     "SESSION_KEY_FILE" => Some("/nonexistent/edunexus-key".to_owned()),
///     _ => None,
/// });
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug)?;
/// assert!(settings.cookie_secure);
/// assert_eq!(settings.cookie_name, "edunexus_session");
/// # Ok(())
/// # }
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = parse_bool_env(
        env,
        mode,
        BoolEnvConfig::new(COOKIE_SECURE_ENV, true),
        |flag, _| Ok(flag),
    )?;
    let same_site = same_site_from_env(env, mode, cookie_secure)?;
    let allow_ephemeral = parse_bool_env(
        env,
        mode,
        BoolEnvConfig::new(ALLOW_EPHEMERAL_ENV, false),
        |flag, mode| {
            if flag && !mode.is_debug() {
                Err(SessionConfigError::EphemeralNotAllowed)
            } else {
                Ok(flag)
            }
        },
    )?;
    let key = session_key_from_env(env, mode, allow_ephemeral)?;
    let cookie_name = env
        .string(COOKIE_NAME_ENV)
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_owned());

    Ok(SessionSettings {
        key,
        cookie_name,
        cookie_secure,
        same_site,
    })
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    match env.string(SAMESITE_ENV) {
        Some(value) => parse_same_site_value(value, mode, cookie_secure, default_same_site),
        None => fallback_or_error(
            mode,
            default_same_site,
            SessionConfigError::MissingEnv { name: SAMESITE_ENV },
            || warn!("SESSION_SAMESITE not set; using default"),
        ),
    }
}

fn session_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(source) if allow_ephemeral || mode.is_debug() => {
            warn!(
                path = %path.display(),
                error = %source,
                "session key unreadable; using a generated key, sessions end on restart"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}
