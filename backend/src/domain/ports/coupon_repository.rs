//! Port for instructor coupons.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Coupon, Error, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by coupon repository adapters.
    pub enum CouponRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "coupon repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "coupon repository query failed: {message}",
        /// Another coupon already uses the code.
        DuplicateCode { code: String } => "coupon code \"{code}\" already exists",
    }
}

impl From<CouponRepositoryError> for Error {
    fn from(err: CouponRepositoryError) -> Self {
        match err {
            CouponRepositoryError::Connection { message } => {
                tracing::warn!(%message, "coupon repository unavailable");
                Self::service_unavailable("coupon repository unavailable")
            }
            CouponRepositoryError::Query { message } => {
                Self::internal(format!("coupon repository error: {message}"))
            }
            CouponRepositoryError::DuplicateCode { .. } => {
                Self::conflict("coupon with this code already exists.")
            }
        }
    }
}

/// Storage for coupons and their course scoping.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Coupons created by `creator_id`, newest first.
    async fn list_by_creator(&self, creator_id: &UserId) -> Result<Vec<Coupon>, CouponRepositoryError>;

    /// Fetch a coupon by id.
    async fn find(&self, id: Uuid) -> Result<Option<Coupon>, CouponRepositoryError>;

    /// Fetch the active coupon with exactly `code`.
    async fn find_active_by_code(&self, code: &str) -> Result<Option<Coupon>, CouponRepositoryError>;

    /// Insert a coupon with its course links.
    async fn create(&self, coupon: &Coupon) -> Result<(), CouponRepositoryError>;

    /// Replace a coupon's fields and course links. Returns `false` when missing.
    async fn update(&self, coupon: &Coupon) -> Result<bool, CouponRepositoryError>;

    /// Delete a coupon. Returns `false` when missing.
    async fn delete(&self, id: Uuid) -> Result<bool, CouponRepositoryError>;

    /// Active, un-notified coupons with `from <= valid_until <= until`.
    async fn list_expiring(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, CouponRepositoryError>;

    /// Record that the expiry notice went out.
    async fn mark_notified(&self, id: Uuid) -> Result<bool, CouponRepositoryError>;
}
