//! Driving port for purchasing courses.

use async_trait::async_trait;

use crate::domain::{CourseSelector, Error, Order, UserId};

/// Purchase request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrderRequest {
    /// Course being bought.
    pub course: CourseSelector,
    /// Blank codes are ignored.
    pub coupon_code: Option<String>,
}

/// Domain use-case port for placing orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderCommand: Send + Sync {
    /// Price, pay for, and enroll in a course.
    async fn place_order(&self, actor: &UserId, request: PlaceOrderRequest) -> Result<Order, Error>;
}
