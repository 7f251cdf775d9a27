//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each repository port has one `Diesel*Repository` here, sharing a [`DbPool`].
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types. No business rules live here beyond what constraints enforce.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Typed errors**: pool and Diesel failures map into each port's error
//!   enum; unique-constraint names map to the port's duplicate variants.
//!
//! # Example
//!
//! ```ignore
//! use edunexus::outbound::persistence::{DbPool, DieselCourseRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/edunexus")).await?;
//! let courses = DieselCourseRepository::new(pool.clone());
//! ```

mod diesel_coupon_repository;
mod diesel_course_repository;
pub(crate) mod diesel_helpers;
mod diesel_lesson_repository;
mod diesel_order_repository;
mod diesel_review_repository;
mod diesel_taxonomy_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_coupon_repository::DieselCouponRepository;
pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_lesson_repository::DieselLessonRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_taxonomy_repository::DieselTaxonomyRepository;
pub use diesel_user_repository::{DieselBalanceRepository, DieselUserRepository};
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DEFAULT_MAX_SIZE, DbPool, PoolConfig, PoolError};
