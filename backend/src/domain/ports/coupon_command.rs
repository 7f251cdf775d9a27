//! Driving port for coupon management.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Coupon, Error, Money, UserId};

/// Raw coupon payload; validated by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponRequest {
    /// Coupon code.
    pub code: String,
    /// Raw discount; must be 1 to 100.
    pub discount_percentage: i64,
    /// Expiry.
    pub valid_until: DateTime<Utc>,
    /// Whether the coupon may be used.
    pub is_active: bool,
    /// Smallest course price accepted.
    pub min_order_value: Option<Money>,
    /// Empty makes the coupon global.
    pub course_ids: Vec<Uuid>,
}

/// Domain use-case port for coupon mutations. Instructors manage their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponCommand: Send + Sync {
    /// Issue a coupon.
    async fn create_coupon(&self, actor: &UserId, request: CouponRequest) -> Result<Coupon, Error>;

    /// Replace one of the caller's coupons.
    async fn update_coupon(
        &self,
        actor: &UserId,
        id: Uuid,
        request: CouponRequest,
    ) -> Result<Coupon, Error>;

    /// Delete one of the caller's coupons.
    async fn delete_coupon(&self, actor: &UserId, id: Uuid) -> Result<(), Error>;
}
