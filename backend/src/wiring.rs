//! Composition of adapters into domain services.
//!
//! The server binary picks concrete adapters (Diesel or in-memory storage,
//! Redis or in-process cache) and hands them to [`build_services`], which
//! assembles the driving ports behind [`HttpState`] and the coupon expiry
//! worker. Integration tests use the same entry point over a
//! [`MemoryStore`].

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    AccountBalanceRepository, CouponRepository, CourseRepository, KeyValueCache,
    LessonRepository, Mailer, OrderRepository, PasswordHasher, ReviewRepository,
    SecretGenerator, TaxonomyRepository, UserRepository,
};
use crate::domain::{
    AccountPorts, AccountService, CategoryService, CouponExpiryNotifier, CouponService,
    CoursePorts, CourseService, LessonService, OrderPorts, OrderService, ReviewPorts,
    ReviewService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::MemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselBalanceRepository, DieselCouponRepository, DieselCourseRepository,
    DieselLessonRepository, DieselOrderRepository, DieselReviewRepository,
    DieselTaxonomyRepository, DieselUserRepository,
};
use crate::outbound::security::{Argon2PasswordHasher, RandomSecretGenerator};
use crate::settings::{AppSettings, SettingsError};

/// One adapter per repository port.
#[derive(Clone)]
pub struct Repositories {
    /// User accounts.
    pub users: Arc<dyn UserRepository>,
    /// Stored-value balances.
    pub balances: Arc<dyn AccountBalanceRepository>,
    /// Categories and tags.
    pub taxonomy: Arc<dyn TaxonomyRepository>,
    /// Courses and enrollments.
    pub courses: Arc<dyn CourseRepository>,
    /// Lessons.
    pub lessons: Arc<dyn LessonRepository>,
    /// Reviews.
    pub reviews: Arc<dyn ReviewRepository>,
    /// Coupons and their course scope.
    pub coupons: Arc<dyn CouponRepository>,
    /// Orders, placed atomically with the debit and enrollment.
    pub orders: Arc<dyn OrderRepository>,
}

impl Repositories {
    /// Every port served by one shared in-memory store.
    pub fn in_memory(store: &MemoryStore) -> Self {
        let store = Arc::new(store.clone());
        Self {
            users: store.clone(),
            balances: store.clone(),
            taxonomy: store.clone(),
            courses: store.clone(),
            lessons: store.clone(),
            reviews: store.clone(),
            coupons: store.clone(),
            orders: store,
        }
    }

    /// PostgreSQL repositories sharing `pool`.
    pub fn diesel(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            balances: Arc::new(DieselBalanceRepository::new(pool.clone())),
            taxonomy: Arc::new(DieselTaxonomyRepository::new(pool.clone())),
            courses: Arc::new(DieselCourseRepository::new(pool.clone())),
            lessons: Arc::new(DieselLessonRepository::new(pool.clone())),
            reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
            coupons: Arc::new(DieselCouponRepository::new(pool.clone())),
            orders: Arc::new(DieselOrderRepository::new(pool.clone())),
        }
    }
}

/// Non-storage collaborators shared by the services.
#[derive(Clone)]
pub struct Infrastructure {
    /// Snapshot and token cache.
    pub cache: Arc<dyn KeyValueCache>,
    /// Outgoing mail.
    pub mailer: Arc<dyn Mailer>,
    /// Password hashing.
    pub hasher: Arc<dyn PasswordHasher>,
    /// Verification codes and reset tokens.
    pub secrets: Arc<dyn SecretGenerator>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl Infrastructure {
    /// Argon2 hashing, OS randomness, and the system clock around the given
    /// cache and mailer.
    pub fn new(cache: Arc<dyn KeyValueCache>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            cache,
            mailer,
            hasher: Arc::new(Argon2PasswordHasher::new()),
            secrets: Arc::new(RandomSecretGenerator),
            clock: Arc::new(DefaultClock),
        }
    }
}

/// Everything the server runs.
pub struct Services {
    /// Driving ports for the HTTP handlers.
    pub http: HttpState,
    /// Background coupon reminder worker.
    pub coupon_expiry: CouponExpiryNotifier,
}

/// Assemble the domain services over `repos` and `infra`.
///
/// # Errors
///
/// Returns [`SettingsError`] when a configured value is out of range.
pub fn build_services(
    repos: &Repositories,
    infra: &Infrastructure,
    settings: &AppSettings,
) -> Result<Services, SettingsError> {
    let account_settings = settings.account_settings()?;
    let order_settings = settings.order_settings()?;
    let expiry = settings.coupon_expiry()?;
    let notifications = account_settings.notifications.clone();

    let accounts = Arc::new(AccountService::new(
        AccountPorts {
            users: repos.users.clone(),
            balances: repos.balances.clone(),
            cache: infra.cache.clone(),
            mailer: infra.mailer.clone(),
            hasher: infra.hasher.clone(),
            secrets: infra.secrets.clone(),
            clock: infra.clock.clone(),
        },
        account_settings,
    ));
    let categories = Arc::new(CategoryService::new(
        repos.taxonomy.clone(),
        repos.users.clone(),
        infra.cache.clone(),
        infra.clock.clone(),
    ));
    let courses = Arc::new(CourseService::new(CoursePorts {
        courses: repos.courses.clone(),
        taxonomy: repos.taxonomy.clone(),
        users: repos.users.clone(),
        cache: infra.cache.clone(),
        clock: infra.clock.clone(),
    }));
    let lessons = Arc::new(LessonService::new(
        repos.lessons.clone(),
        repos.courses.clone(),
        infra.clock.clone(),
    ));
    let reviews = Arc::new(ReviewService::new(ReviewPorts {
        reviews: repos.reviews.clone(),
        courses: repos.courses.clone(),
        users: repos.users.clone(),
        cache: infra.cache.clone(),
        clock: infra.clock.clone(),
    }));
    let coupons = Arc::new(CouponService::new(
        repos.coupons.clone(),
        repos.courses.clone(),
        repos.users.clone(),
        infra.clock.clone(),
    ));
    let orders = Arc::new(OrderService::new(
        OrderPorts {
            orders: repos.orders.clone(),
            courses: repos.courses.clone(),
            coupons: repos.coupons.clone(),
            balances: repos.balances.clone(),
            users: repos.users.clone(),
            cache: infra.cache.clone(),
            mailer: infra.mailer.clone(),
            clock: infra.clock.clone(),
        },
        order_settings,
    ));

    let http = HttpState {
        login: accounts.clone(),
        accounts: accounts.clone(),
        accounts_query: accounts,
        categories: categories.clone(),
        categories_query: categories,
        courses: courses.clone(),
        courses_query: courses,
        lessons: lessons.clone(),
        lessons_query: lessons,
        reviews: reviews.clone(),
        reviews_query: reviews,
        coupons: coupons.clone(),
        coupons_query: coupons,
        orders: orders.clone(),
        orders_query: orders,
    };
    let coupon_expiry = CouponExpiryNotifier::new(
        repos.coupons.clone(),
        repos.users.clone(),
        infra.mailer.clone(),
        infra.clock.clone(),
        notifications,
        expiry,
    );

    Ok(Services {
        http,
        coupon_expiry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockKeyValueCache, MockMailer};
    use rstest::rstest;

    fn infrastructure() -> Infrastructure {
        Infrastructure::new(
            Arc::new(MockKeyValueCache::new()),
            Arc::new(MockMailer::new()),
        )
    }

    #[rstest]
    fn default_settings_build_every_service() {
        let repos = Repositories::in_memory(&MemoryStore::new());
        let services = build_services(&repos, &infrastructure(), &AppSettings::default());
        assert!(services.is_ok());
    }

    #[rstest]
    fn out_of_range_settings_are_reported() {
        let repos = Repositories::in_memory(&MemoryStore::new());
        let settings = AppSettings {
            tax_percentage: Some(150),
            ..AppSettings::default()
        };
        let err = build_services(&repos, &infrastructure(), &settings)
            .err()
            .expect("tax above 100 is rejected");
        assert!(err.to_string().contains("tax_percentage"));
    }
}
