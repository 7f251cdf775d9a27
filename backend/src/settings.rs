//! Application settings loaded via OrthoConfig.
//!
//! Every field can come from the command line, an `EDUNEXUS_*` environment
//! variable, or a configuration file. Unset fields fall back to the domain
//! defaults through the accessor methods.

use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    AccountSettings, CouponExpiryConfig, DEFAULT_TAX_PERCENTAGE, Money, Notifications,
    OrderSettings, Percentage,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised when a configured value is out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A value failed validation.
    #[error("invalid {name}: {message}")]
    Invalid {
        /// Setting name.
        name: &'static str,
        /// Error detail.
        message: String,
    },
}

impl SettingsError {
    fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            message: message.into(),
        }
    }
}

/// Runtime configuration for the server binary.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EDUNEXUS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory storage is used when unset.
    pub database_url: Option<String>,
    /// Maximum database connections.
    pub db_pool_size: Option<u32>,
    /// Redis URL; an in-process cache is used when unset.
    pub redis_url: Option<String>,
    /// `From` address on outgoing mail.
    pub mail_sender: Option<String>,
    /// Tax percentage applied to orders.
    pub tax_percentage: Option<u8>,
    /// Opening balance for new accounts, as a decimal amount.
    pub signup_bonus: Option<String>,
    /// Lifetime of email verification codes in seconds.
    pub verification_code_ttl_secs: Option<u64>,
    /// Lifetime of password reset tokens in seconds.
    pub password_reset_ttl_secs: Option<u64>,
    /// Pause between coupon expiry scans in seconds.
    pub coupon_scan_interval_secs: Option<u64>,
    /// How far ahead of expiry coupon reminders go out, in hours.
    pub coupon_expiry_window_hours: Option<u32>,
}

impl AppSettings {
    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_deref())
    }

    /// Redis URL, ignoring blank values.
    pub fn redis_url(&self) -> Option<&str> {
        non_blank(self.redis_url.as_deref())
    }

    /// Database pool size.
    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size
            .filter(|size| *size > 0)
            .unwrap_or(crate::outbound::persistence::DEFAULT_MAX_SIZE)
    }

    fn notifications(&self) -> Notifications {
        non_blank(self.mail_sender.as_deref()).map_or_else(Notifications::default, Notifications::new)
    }

    /// Settings for the account service.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the signup bonus is not a valid amount.
    pub fn account_settings(&self) -> Result<AccountSettings, SettingsError> {
        let defaults = AccountSettings::default();
        let signup_bonus = match non_blank(self.signup_bonus.as_deref()) {
            Some(raw) => Money::from_str(raw)
                .map_err(|err| SettingsError::invalid("signup_bonus", err.to_string()))?,
            None => defaults.signup_bonus,
        };
        Ok(AccountSettings {
            signup_bonus,
            verification_code_ttl: self
                .verification_code_ttl_secs
                .map_or(defaults.verification_code_ttl, Duration::from_secs),
            password_reset_ttl: self
                .password_reset_ttl_secs
                .map_or(defaults.password_reset_ttl, Duration::from_secs),
            notifications: self.notifications(),
        })
    }

    /// Settings for the order service.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the tax percentage exceeds 100.
    pub fn order_settings(&self) -> Result<OrderSettings, SettingsError> {
        let tax = Percentage::new(self.tax_percentage.unwrap_or(DEFAULT_TAX_PERCENTAGE))
            .map_err(|err| SettingsError::invalid("tax_percentage", err.to_string()))?;
        Ok(OrderSettings {
            tax,
            notifications: self.notifications(),
        })
    }

    /// Scheduling for the coupon expiry worker.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for a zero scan interval.
    pub fn coupon_expiry(&self) -> Result<CouponExpiryConfig, SettingsError> {
        let defaults = CouponExpiryConfig::default();
        let interval = match self.coupon_scan_interval_secs {
            Some(0) => {
                return Err(SettingsError::invalid(
                    "coupon_scan_interval_secs",
                    "must be at least one second",
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.interval,
        };
        let window = self
            .coupon_expiry_window_hours
            .map_or(defaults.window, |hours| TimeDelta::hours(i64::from(hours)));
        Ok(CouponExpiryConfig { window, interval })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
