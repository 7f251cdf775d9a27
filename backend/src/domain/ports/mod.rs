//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, [`LoginService`]) are called by
//! inbound adapters. Driven ports (repositories, cache, mailer, hasher,
//! secret generator) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_balance_repository;
mod account_command;
mod account_query;
mod category_command;
mod category_query;
mod coupon_command;
mod coupon_query;
mod coupon_repository;
mod course_command;
mod course_query;
mod course_repository;
mod key_value_cache;
mod lesson_command;
mod lesson_query;
mod lesson_repository;
mod login_service;
mod mailer;
mod order_command;
mod order_query;
mod order_repository;
mod password_hasher;
mod review_command;
mod review_query;
mod review_repository;
mod secret_generator;
mod taxonomy_repository;
mod user_repository;

#[cfg(test)]
pub use account_balance_repository::MockAccountBalanceRepository;
pub use account_balance_repository::{AccountBalanceRepository, BalanceRepositoryError};
#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, ConfirmPasswordResetRequest, RegisterRequest};
#[cfg(test)]
pub use account_query::MockAccountQuery;
pub use account_query::AccountQuery;
#[cfg(test)]
pub use category_command::MockCategoryCommand;
pub use category_command::{CategoryCommand, CategoryRequest};
#[cfg(test)]
pub use category_query::MockCategoryQuery;
pub use category_query::CategoryQuery;
#[cfg(test)]
pub use coupon_command::MockCouponCommand;
pub use coupon_command::{CouponCommand, CouponRequest};
#[cfg(test)]
pub use coupon_query::MockCouponQuery;
pub use coupon_query::CouponQuery;
#[cfg(test)]
pub use coupon_repository::MockCouponRepository;
pub use coupon_repository::{CouponRepository, CouponRepositoryError};
#[cfg(test)]
pub use course_command::MockCourseCommand;
pub use course_command::{CourseCommand, CourseRequest};
#[cfg(test)]
pub use course_query::MockCourseQuery;
pub use course_query::CourseQuery;
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CourseRepository, CourseRepositoryError, CourseWrite};
#[cfg(test)]
pub use key_value_cache::MockKeyValueCache;
pub use key_value_cache::{CacheError, KeyValueCache, get_json, set_json};
#[cfg(test)]
pub use lesson_command::MockLessonCommand;
pub use lesson_command::{LessonCommand, LessonRequest};
#[cfg(test)]
pub use lesson_query::MockLessonQuery;
pub use lesson_query::LessonQuery;
#[cfg(test)]
pub use lesson_repository::MockLessonRepository;
pub use lesson_repository::{LessonRepository, LessonRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{Mailer, MailerError};
#[cfg(test)]
pub use order_command::MockOrderCommand;
pub use order_command::{OrderCommand, PlaceOrderRequest};
#[cfg(test)]
pub use order_query::MockOrderQuery;
pub use order_query::OrderQuery;
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderRepository, OrderRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use review_command::MockReviewCommand;
pub use review_command::{ReviewCommand, ReviewRequest};
#[cfg(test)]
pub use review_query::MockReviewQuery;
pub use review_query::ReviewQuery;
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{ReviewRepository, ReviewRepositoryError};
#[cfg(test)]
pub use secret_generator::MockSecretGenerator;
pub use secret_generator::SecretGenerator;
#[cfg(test)]
pub use taxonomy_repository::MockTaxonomyRepository;
pub use taxonomy_repository::{TaxonomyRepository, TaxonomyRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
