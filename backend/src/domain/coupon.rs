//! Discount coupons issued by instructors.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::validation::{require_text, FieldViolation};
use super::{DiscountPercentage, Money, UserId};

/// Maximum length of a coupon code.
pub const COUPON_CODE_MAX: usize = 50;

/// A time-bounded percentage discount, optionally scoped to courses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    /// Coupon id.
    pub id: Uuid,
    /// Unique code entered at checkout.
    pub code: String,
    /// Percentage taken off the course price.
    pub discount: DiscountPercentage,
    /// Last moment the coupon may be used.
    pub valid_until: DateTime<Utc>,
    /// Switched off by the creator, or when its scope is emptied.
    pub is_active: bool,
    /// Smallest course price accepted.
    pub min_order_value: Option<Money>,
    /// Empty means the coupon applies to every course.
    pub course_ids: Vec<Uuid>,
    /// Issuing instructor.
    pub creator_id: UserId,
    /// Set once the expiry reminder has been sent.
    pub notified: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// Active and not past `valid_until`.
    ///
    /// # Examples
    /// ```
    /// # use chrono::{Duration, Utc};
    /// # use edunexus::domain::{Coupon, DiscountPercentage, UserId};
    /// # use uuid::Uuid;
    /// let now = Utc::now();
    /// let coupon = Coupon {
    ///     id: Uuid::new_v4(),
    ///     code: "SPRING".into(),
    ///     discount: DiscountPercentage::new(10).expect("valid"),
    ///     valid_until: now + Duration::hours(1),
    ///     is_active: true,
    ///     min_order_value: None,
    ///     course_ids: Vec::new(),
    ///     creator_id: UserId::random(),
    ///     notified: false,
    ///     created_at: now,
    /// };
    /// assert!(coupon.is_valid(now));
    /// assert!(!coupon.is_valid(now + Duration::hours(2)));
    /// ```
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.is_active && now <= self.valid_until
    }

    /// Whether the coupon may be used for `course_id`.
    #[must_use]
    pub fn applies_to(&self, course_id: Uuid) -> bool {
        self.course_ids.is_empty() || self.course_ids.contains(&course_id)
    }

    /// Active, not yet notified, and expiring inside `[now, now + window]`.
    #[must_use]
    pub fn needs_expiry_notice(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.is_active && !self.notified && now <= self.valid_until && self.valid_until <= now + window
    }
}

/// Validated input for creating or replacing a coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponDraft {
    /// Trimmed, non-empty code.
    pub code: String,
    /// Percentage off.
    pub discount: DiscountPercentage,
    /// Expiry.
    pub valid_until: DateTime<Utc>,
    /// Whether the coupon may be used.
    pub is_active: bool,
    /// Smallest course price accepted.
    pub min_order_value: Option<Money>,
    /// Courses in scope, deduplicated.
    pub course_ids: Vec<Uuid>,
}

impl CouponDraft {
    /// Validate raw coupon fields. Course ownership is checked by the service.
    pub fn new(
        code: &str,
        discount_percentage: i64,
        valid_until: DateTime<Utc>,
        is_active: bool,
        min_order_value: Option<Money>,
        course_ids: Vec<Uuid>,
    ) -> Result<Self, FieldViolation> {
        let code = require_text("code", code, COUPON_CODE_MAX)?;
        let discount = u8::try_from(discount_percentage)
            .ok()
            .and_then(|value| DiscountPercentage::new(value).ok())
            .ok_or_else(|| {
                FieldViolation::new(
                    "discount_percentage",
                    "out_of_range",
                    "Discount percentage must be between 1 and 100.",
                )
            })?;
        if min_order_value.is_some_and(|value| value.is_negative() || !value.fits_storage()) {
            return Err(FieldViolation::new(
                "min_order_value",
                "out_of_range",
                "min_order_value must be between 0.00 and 99999999.99",
            ));
        }
        let mut unique = Vec::with_capacity(course_ids.len());
        for id in course_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Ok(Self {
            code,
            discount,
            valid_until,
            is_active,
            min_order_value,
            course_ids: unique,
        })
    }
}
