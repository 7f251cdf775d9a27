//! Course purchases paid from the account balance.
//!
//! Checks run in a fixed order so callers see the same error for the same
//! request: course lookup, coupon lookup, self-purchase, duplicate order,
//! coupon rules, then balance. The debit, order row, and enrollment are
//! committed together by [`OrderRepository::place`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::access::load_actor;
use crate::domain::course_service::{enrollments_cache_key, forget};
use crate::domain::ports::{
    AccountBalanceRepository, CouponRepository, CourseRepository, KeyValueCache, Mailer,
    OrderCommand, OrderQuery, OrderRepository, PlaceOrderRequest, UserRepository,
};
use crate::domain::{
    Coupon, Course, CourseSelector, DEFAULT_TAX_PERCENTAGE, Error, Notifications, Order,
    OrderPlacement, Percentage, UserId, calculate_final_price,
};

/// Tunables for [`OrderService`].
#[derive(Debug, Clone)]
pub struct OrderSettings {
    /// Tax added after any discount.
    pub tax: Percentage,
    /// Sender address for confirmations.
    pub notifications: Notifications,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            tax: Percentage::clamped(DEFAULT_TAX_PERCENTAGE),
            notifications: Notifications::default(),
        }
    }
}

/// Port bundle required by [`OrderService`].
#[derive(Clone)]
pub struct OrderPorts {
    /// Orders, placed atomically.
    pub orders: Arc<dyn OrderRepository>,
    /// Course lookup.
    pub courses: Arc<dyn CourseRepository>,
    /// Coupon lookup by code.
    pub coupons: Arc<dyn CouponRepository>,
    /// Balance pre-check.
    pub balances: Arc<dyn AccountBalanceRepository>,
    /// Buyer lookup.
    pub users: Arc<dyn UserRepository>,
    /// Enrollment snapshots to drop.
    pub cache: Arc<dyn KeyValueCache>,
    /// Confirmation email.
    pub mailer: Arc<dyn Mailer>,
    /// Order timestamps.
    pub clock: Arc<dyn Clock>,
}

/// Order service implementing [`OrderCommand`] and [`OrderQuery`].
#[derive(Clone)]
pub struct OrderService {
    ports: OrderPorts,
    settings: OrderSettings,
}

impl OrderService {
    /// Create a service over the given ports.
    pub fn new(ports: OrderPorts, settings: OrderSettings) -> Self {
        Self { ports, settings }
    }

    async fn resolve_course(&self, selector: &CourseSelector) -> Result<Course, Error> {
        let course = match selector {
            CourseSelector::Id(id) => self.ports.courses.find_course(*id).await?,
            CourseSelector::Title(title) => {
                self.ports.courses.find_course_by_title(title.trim()).await?
            }
        };
        course.ok_or_else(|| Error::not_found("Course not found."))
    }

    async fn resolve_coupon(&self, code: Option<&str>) -> Result<Option<Coupon>, Error> {
        let Some(code) = code.map(str::trim).filter(|code| !code.is_empty()) else {
            return Ok(None);
        };
        self.ports
            .coupons
            .find_active_by_code(code)
            .await?
            .map(Some)
            .ok_or_else(|| Error::invalid_request("Invalid or expired coupon code."))
    }
}

fn check_coupon(coupon: &Coupon, course: &Course, now: DateTime<Utc>) -> Result<(), Error> {
    if !coupon.is_valid(now) {
        return Err(Error::invalid_request(
            "The coupon is either expired or inactive.",
        ));
    }
    if !coupon.applies_to(course.id) {
        return Err(Error::invalid_request(
            "The coupon does not apply to this course.",
        ));
    }
    let unmet_minimum = coupon
        .min_order_value
        .filter(|minimum| minimum.is_positive() && course.price < *minimum);
    if let Some(minimum) = unmet_minimum {
        return Err(Error::invalid_request(format!(
            "The course price must exceed {minimum} to use this coupon."
        )));
    }
    Ok(())
}

#[async_trait]
impl OrderCommand for OrderService {
    async fn place_order(&self, actor: &UserId, request: PlaceOrderRequest) -> Result<Order, Error> {
        let buyer = load_actor(self.ports.users.as_ref(), actor).await?;
        let course = self.resolve_course(&request.course).await?;
        let coupon = self.resolve_coupon(request.coupon_code.as_deref()).await?;

        if course.is_owned_by(&buyer.id) {
            return Err(Error::invalid_request("You cannot order your own course."));
        }
        if self.ports.orders.exists(&buyer.id, course.id).await? {
            return Err(Error::invalid_request("You have already ordered this course."));
        }
        let now = self.ports.clock.utc();
        if let Some(coupon) = &coupon {
            check_coupon(coupon, &course, now)?;
        }

        let discount = coupon
            .as_ref()
            .map_or_else(Percentage::zero, |coupon| coupon.discount.as_percentage());
        let price = calculate_final_price(course.price, discount, self.settings.tax)
            .map_err(|_| Error::internal("order total overflowed"))?;

        let balance = self
            .ports
            .balances
            .find(&buyer.id)
            .await?
            .ok_or_else(|| Error::not_found("Account balance not found."))?;
        if !balance.covers(price.total_amount) {
            return Err(Error::invalid_request(
                "Insufficient balance to place this order.",
            ));
        }

        let placement = OrderPlacement::new(
            buyer.id.clone(),
            course.id,
            course.title.clone(),
            coupon.map(|coupon| coupon.code),
            price,
            now,
        );
        let order = self.ports.orders.place(&placement).await?;
        info!(
            order_id = %order.id,
            user_id = %buyer.id,
            course_id = %course.id,
            total = %placement.total,
            "order placed"
        );

        forget(self.ports.cache.as_ref(), &enrollments_cache_key(&buyer.id)).await;
        let message = self
            .settings
            .notifications
            .order_confirmation(&buyer.email, &course.title);
        if let Err(err) = self.ports.mailer.send(&message).await {
            warn!(order_id = %order.id, error = %err, "order confirmation not queued");
        }
        Ok(order)
    }
}

#[async_trait]
impl OrderQuery for OrderService {
    async fn list_orders(&self, actor: &UserId) -> Result<Vec<Order>, Error> {
        Ok(self.ports.orders.list_for_user(actor).await?)
    }

    async fn get_order(&self, actor: &UserId, id: Uuid) -> Result<Order, Error> {
        self.ports
            .orders
            .find_for_user(actor, id)
            .await?
            .ok_or_else(|| Error::not_found("Order not found."))
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
