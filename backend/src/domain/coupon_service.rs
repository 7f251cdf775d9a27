//! Coupons issued by instructors.
//!
//! Coupons are private to their creator: another user's coupon id reads as
//! missing rather than forbidden.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::access::require_instructor;
use crate::domain::ports::{
    CouponCommand, CouponQuery, CouponRepository, CouponRequest, CourseRepository, UserRepository,
};
use crate::domain::validation::FieldViolation;
use crate::domain::{Coupon, CouponDraft, Error, UserId};

/// Coupon service implementing [`CouponCommand`] and [`CouponQuery`].
#[derive(Clone)]
pub struct CouponService {
    coupons: Arc<dyn CouponRepository>,
    courses: Arc<dyn CourseRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl CouponService {
    /// Create a service over the coupon, course, and user repositories.
    pub fn new(
        coupons: Arc<dyn CouponRepository>,
        courses: Arc<dyn CourseRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            coupons,
            courses,
            users,
            clock,
        }
    }

    async fn require_own(&self, actor: &UserId, id: Uuid) -> Result<Coupon, Error> {
        self.coupons
            .find(id)
            .await?
            .filter(|coupon| &coupon.creator_id == actor)
            .ok_or_else(|| Error::not_found("Coupon not found."))
    }

    async fn validate(&self, actor: &UserId, request: &CouponRequest) -> Result<CouponDraft, Error> {
        let draft = CouponDraft::new(
            &request.code,
            request.discount_percentage,
            request.valid_until,
            request.is_active,
            request.min_order_value,
            request.course_ids.clone(),
        )?;
        for course_id in &draft.course_ids {
            let Some(course) = self.courses.find_course(*course_id).await? else {
                return Err(FieldViolation::new(
                    "courses",
                    "does_not_exist",
                    format!("Invalid pk \"{course_id}\" - object does not exist."),
                )
                .into());
            };
            if !course.is_owned_by(actor) {
                return Err(FieldViolation::new(
                    "courses",
                    "not_owner",
                    format!("You do not own the course: {}.", course.title),
                )
                .into());
            }
        }
        Ok(draft)
    }
}

#[async_trait]
impl CouponCommand for CouponService {
    async fn create_coupon(&self, actor: &UserId, request: CouponRequest) -> Result<Coupon, Error> {
        require_instructor(self.users.as_ref(), actor).await?;
        let draft = self.validate(actor, &request).await?;
        let coupon = Coupon {
            id: Uuid::new_v4(),
            code: draft.code,
            discount: draft.discount,
            valid_until: draft.valid_until,
            is_active: draft.is_active,
            min_order_value: draft.min_order_value,
            course_ids: draft.course_ids,
            creator_id: actor.clone(),
            notified: false,
            created_at: self.clock.utc(),
        };
        self.coupons.create(&coupon).await?;
        info!(coupon_id = %coupon.id, code = %coupon.code, creator_id = %actor, "coupon created");
        Ok(coupon)
    }

    async fn update_coupon(
        &self,
        actor: &UserId,
        id: Uuid,
        request: CouponRequest,
    ) -> Result<Coupon, Error> {
        let existing = self.require_own(actor, id).await?;
        let draft = self.validate(actor, &request).await?;
        // A new expiry earns a new reminder.
        let notified = existing.notified && existing.valid_until == draft.valid_until;
        let coupon = Coupon {
            code: draft.code,
            discount: draft.discount,
            valid_until: draft.valid_until,
            is_active: draft.is_active,
            min_order_value: draft.min_order_value,
            course_ids: draft.course_ids,
            notified,
            ..existing
        };
        if !self.coupons.update(&coupon).await? {
            return Err(Error::not_found("Coupon not found."));
        }
        Ok(coupon)
    }

    async fn delete_coupon(&self, actor: &UserId, id: Uuid) -> Result<(), Error> {
        self.require_own(actor, id).await?;
        if !self.coupons.delete(id).await? {
            return Err(Error::not_found("Coupon not found."));
        }
        info!(coupon_id = %id, "coupon deleted");
        Ok(())
    }
}

#[async_trait]
impl CouponQuery for CouponService {
    async fn list_coupons(&self, actor: &UserId) -> Result<Vec<Coupon>, Error> {
        Ok(self.coupons.list_by_creator(actor).await?)
    }

    async fn get_coupon(&self, actor: &UserId, id: Uuid) -> Result<Coupon, Error> {
        self.require_own(actor, id).await
    }
}
