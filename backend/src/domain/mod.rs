//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the marketplace's strongly typed entities and the services
//! that implement the driving ports. Nothing here knows about HTTP or SQL;
//! services talk to storage, cache, and mail through the driven ports in
//! [`ports`].
//!
//! Public surface:
//! - `Error` / `ErrorCode`: API error payload and stable identifier.
//! - `Money` / `Percentage`: integer-cent amounts and whole percentages.
//! - `calculate_final_price`: discount and tax arithmetic for orders.
//! - entity types (`User`, `Course`, `Coupon`, `Order`, ...) and their drafts.
//! - `*Service`: implementations of the driving ports.

pub(crate) mod access;
pub mod account_service;
pub mod auth;
pub mod category;
pub mod category_service;
pub mod coupon;
pub mod coupon_expiry;
pub mod coupon_service;
pub mod course;
pub mod course_service;
pub mod error;
pub mod lesson;
pub mod lesson_service;
pub mod money;
pub mod notifications;
pub mod order;
pub mod order_service;
pub mod ports;
pub mod pricing;
pub mod review;
pub mod review_service;
pub mod trace_id;
pub mod user;
pub mod validation;
pub mod verification;

pub use self::access::PERMISSION_DENIED;
pub use self::account_service::{
    AccountPorts, AccountService, AccountSettings, DEFAULT_SIGNUP_BONUS,
};
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN, PasswordTooShort, PlainPassword,
    Registration, RegistrationValidationError,
};
pub use self::category::{Category, CategoryDraft, CategoryFilter, TAXONOMY_NAME_MAX, Tag};
pub use self::category_service::CategoryService;
pub use self::coupon::{COUPON_CODE_MAX, Coupon, CouponDraft};
pub use self::coupon_expiry::{CouponExpiryConfig, CouponExpiryNotifier};
pub use self::coupon_service::CouponService;
pub use self::course::{
    COURSE_TITLE_MAX, Course, CourseDraft, CourseFilter, CourseSelector, Enrollment, MinRating,
    PopularCourse, RatingSummary, rank_popular,
};
pub use self::course_service::{
    CATALOGUE_CACHE_TTL, COURSE_LIST_CACHE_KEY, CoursePorts, CourseService,
    enrollments_cache_key,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::lesson::{LESSON_TITLE_MAX, Lesson, LessonDraft};
pub use self::lesson_service::LessonService;
pub use self::money::{
    DiscountPercentage, MAX_AMOUNT_CENTS, Money, MoneyParseError, Percentage,
    PercentageRangeError,
};
pub use self::notifications::{DEFAULT_SENDER, EmailMessage, Notifications};
pub use self::order::{AccountBalance, Order, OrderPlacement};
pub use self::order_service::{OrderPorts, OrderService, OrderSettings};
pub use self::pricing::{
    DEFAULT_TAX_PERCENTAGE, PriceBreakdown, PricingOverflow, calculate_final_price,
};
pub use self::review::{Rating, Review, ReviewDraft};
pub use self::review_service::{ReviewPorts, ReviewService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, EmailAddress, ProfileUpdate, Role, USERNAME_MAX, User, UserId,
    UserValidationError, Username,
};
pub use self::validation::FieldViolation;
pub use self::verification::{
    InvalidVerificationCode, PASSWORD_RESET_TTL, PasswordResetToken, VERIFICATION_CODE_TTL,
    VerificationCode, password_reset_key, verification_code_key,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use edunexus::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
