//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AccountQuery, CategoryCommand, CategoryQuery, CouponCommand, CouponQuery,
    CourseCommand, CourseQuery, LessonCommand, LessonQuery, LoginService, OrderCommand,
    OrderQuery, ReviewCommand, ReviewQuery,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// use actix_web::web;
/// use edunexus::inbound::http::state::HttpState;
///
/// fn register(state: HttpState) -> web::Data<HttpState> {
///     web::Data::new(state)
/// }
/// ```
#[derive(Clone)]
pub struct HttpState {
    /// Credential check behind login.
    pub login: Arc<dyn LoginService>,
    /// Account writes.
    pub accounts: Arc<dyn AccountCommand>,
    /// Account reads.
    pub accounts_query: Arc<dyn AccountQuery>,
    /// Category writes.
    pub categories: Arc<dyn CategoryCommand>,
    /// Category reads.
    pub categories_query: Arc<dyn CategoryQuery>,
    /// Course writes.
    pub courses: Arc<dyn CourseCommand>,
    /// Catalogue and enrollment reads.
    pub courses_query: Arc<dyn CourseQuery>,
    /// Lesson writes.
    pub lessons: Arc<dyn LessonCommand>,
    /// Lesson reads.
    pub lessons_query: Arc<dyn LessonQuery>,
    /// Review writes.
    pub reviews: Arc<dyn ReviewCommand>,
    /// Review reads.
    pub reviews_query: Arc<dyn ReviewQuery>,
    /// Coupon writes.
    pub coupons: Arc<dyn CouponCommand>,
    /// Coupon reads.
    pub coupons_query: Arc<dyn CouponQuery>,
    /// Order placement.
    pub orders: Arc<dyn OrderCommand>,
    /// Order history.
    pub orders_query: Arc<dyn OrderQuery>,
}
