//! Driving port for coupon reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Coupon, Error, UserId};

/// Domain use-case port for reading the caller's coupons.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponQuery: Send + Sync {
    /// Coupons created by the caller.
    async fn list_coupons(&self, actor: &UserId) -> Result<Vec<Coupon>, Error>;

    /// One of the caller's coupons.
    async fn get_coupon(&self, actor: &UserId, id: Uuid) -> Result<Coupon, Error>;
}
