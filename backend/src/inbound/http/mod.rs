//! HTTP inbound adapter exposing REST endpoints.
//!
//! [`configure_api`] registers every `/api/v1` handler along with the
//! extractor error handlers, so the server and handler tests share one
//! route table.

pub mod categories;
pub mod coupons;
pub mod courses;
pub mod error;
pub mod health;
pub mod lessons;
pub mod orders;
pub mod reviews;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register the API handlers on `cfg`.
///
/// Literal course sub-paths (`popular-courses`, `enrollments`) are
/// registered ahead of `/courses/{id}` so they are never parsed as ids.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(users::register)
        .service(users::verify)
        .service(users::login)
        .service(users::logout)
        .service(users::get_profile)
        .service(users::update_profile)
        .service(users::get_balance)
        .service(users::add_balance)
        .service(users::request_password_reset)
        .service(users::confirm_password_reset)
        .service(categories::list_categories)
        .service(categories::create_category)
        .service(categories::get_category)
        .service(categories::update_category)
        .service(categories::delete_category)
        .service(courses::list_courses)
        .service(courses::create_course)
        .service(courses::popular_courses)
        .service(courses::list_enrollments)
        .service(courses::get_course)
        .service(courses::update_course)
        .service(courses::delete_course)
        .service(courses::get_enrollment)
        .service(lessons::list_lessons)
        .service(lessons::create_lesson)
        .service(lessons::get_lesson)
        .service(lessons::update_lesson)
        .service(lessons::delete_lesson)
        .service(reviews::list_reviews)
        .service(reviews::create_review)
        .service(reviews::get_review)
        .service(reviews::update_review)
        .service(reviews::delete_review)
        .service(orders::place_order)
        .service(orders::list_orders)
        .service(orders::get_order)
        .service(coupons::list_coupons)
        .service(coupons::create_coupon)
        .service(coupons::get_coupon)
        .service(coupons::update_coupon)
        .service(coupons::delete_coupon);
}
