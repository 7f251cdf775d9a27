//! Tests for the order service.

use std::sync::Arc;

use chrono::Duration;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    CacheError, MailerError, MockAccountBalanceRepository, MockCouponRepository, MockCourseRepository,
    MockKeyValueCache, MockMailer, MockOrderRepository, MockUserRepository,
    OrderRepositoryError,
};
use crate::domain::{AccountBalance, DiscountPercentage, ErrorCode, Money, User};
use crate::test_support::{MutableClock, fixed_now, sample_course, sample_instructor, sample_user};

struct World {
    buyer: User,
    course: Course,
    orders: MockOrderRepository,
    courses: MockCourseRepository,
    coupons: MockCouponRepository,
    balances: MockAccountBalanceRepository,
    users: MockUserRepository,
    cache: MockKeyValueCache,
    mailer: MockMailer,
}

#[fixture]
fn world() -> World {
    let buyer = sample_user("sam");
    let instructor = sample_instructor("ida");
    let course = sample_course(&instructor, "Rust for Humans", 10_000);

    let mut users = MockUserRepository::new();
    let actor = buyer.clone();
    users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(actor.clone())));
    let mut courses = MockCourseRepository::new();
    let found = course.clone();
    courses
        .expect_find_course()
        .returning(move |_| Ok(Some(found.clone())));
    let by_title = course.clone();
    courses
        .expect_find_course_by_title()
        .returning(move |title| Ok((title == by_title.title).then(|| by_title.clone())));

    World {
        buyer,
        course,
        orders: MockOrderRepository::new(),
        courses,
        coupons: MockCouponRepository::new(),
        balances: MockAccountBalanceRepository::new(),
        users,
        cache: MockKeyValueCache::new(),
        mailer: MockMailer::new(),
    }
}

impl World {
    fn with_balance(mut self, cents: i64) -> Self {
        let user_id = self.buyer.id.clone();
        self.balances.expect_find().returning(move |_| {
            Ok(Some(AccountBalance {
                user_id: user_id.clone(),
                balance: Money::from_cents(cents),
                updated_at: fixed_now(),
            }))
        });
        self
    }

    fn without_prior_order(mut self) -> Self {
        self.orders.expect_exists().returning(|_, _| Ok(false));
        self
    }

    fn with_coupon(mut self, coupon: Coupon) -> Self {
        self.coupons
            .expect_find_active_by_code()
            .returning(move |code| Ok((code == coupon.code).then(|| coupon.clone())));
        self
    }

    fn coupon(&self, discount: u8) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: "SAVE10".to_owned(),
            discount: DiscountPercentage::new(discount).expect("discount"),
            valid_until: fixed_now() + Duration::days(1),
            is_active: true,
            min_order_value: None,
            course_ids: Vec::new(),
            creator_id: self.course.instructor_id.clone(),
            notified: false,
            created_at: fixed_now(),
        }
    }

    fn request(&self, coupon_code: Option<&str>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            course: CourseSelector::Id(self.course.id),
            coupon_code: coupon_code.map(ToOwned::to_owned),
        }
    }

    async fn place(self, request: PlaceOrderRequest) -> Result<Order, Error> {
        let buyer = self.buyer.id.clone();
        let service = OrderService::new(
            OrderPorts {
                orders: Arc::new(self.orders),
                courses: Arc::new(self.courses),
                coupons: Arc::new(self.coupons),
                balances: Arc::new(self.balances),
                users: Arc::new(self.users),
                cache: Arc::new(self.cache),
                mailer: Arc::new(self.mailer),
                clock: Arc::new(MutableClock::default()),
            },
            OrderSettings::default(),
        );
        service.place_order(&buyer, request).await
    }
}

fn expect_success(world: &mut World) {
    world
        .orders
        .expect_place()
        .times(1)
        .returning(|placement| Ok(placement.to_order()));
    let key = enrollments_cache_key(&world.buyer.id);
    world
        .cache
        .expect_delete()
        .withf(move |candidate| candidate == key)
        .times(1)
        .returning(|_| Ok(()));
}

#[rstest]
#[tokio::test]
async fn places_order_with_coupon_discount_and_tax(world: World) {
    let coupon = world.coupon(10);
    let mut world = world.with_balance(10_000).without_prior_order().with_coupon(coupon);
    world.orders.expect_place().times(1).returning(|placement| {
        assert_eq!(placement.amount, Money::from_cents(9_000));
        assert_eq!(placement.tax_amount, Money::from_cents(450));
        assert_eq!(placement.total, Money::from_cents(9_450));
        Ok(placement.to_order())
    });
    world.cache.expect_delete().returning(|_| Ok(()));
    world
        .mailer
        .expect_send()
        .withf(|message| {
            message.subject == "Order Confirmation" && message.body.contains("Rust for Humans")
        })
        .times(1)
        .returning(|_| Ok(()));

    let request = world.request(Some(" SAVE10 "));
    let order = world.place(request).await.expect("order placed");
    assert_eq!(order.coupon_code.as_deref(), Some("SAVE10"));
    assert_eq!(order.amount, Money::from_cents(9_000));
}

#[rstest]
#[tokio::test]
async fn resolves_course_by_title(world: World) {
    let mut world = world.with_balance(20_000).without_prior_order();
    expect_success(&mut world);
    world.mailer.expect_send().returning(|_| Ok(()));

    let request = PlaceOrderRequest {
        course: CourseSelector::Title("Rust for Humans".to_owned()),
        coupon_code: Some("   ".to_owned()),
    };
    let order = world.place(request).await.expect("order placed");
    assert_eq!(order.amount, Money::from_cents(10_000));
    assert_eq!(order.tax_amount, Money::from_cents(500));
    assert!(order.coupon_code.is_none());
}

#[rstest]
#[tokio::test]
async fn unknown_title_is_not_found(world: World) {
    let request = PlaceOrderRequest {
        course: CourseSelector::Title("Haskell".to_owned()),
        coupon_code: None,
    };
    let err = world.place(request).await.expect_err("missing course");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn unknown_coupon_code_is_rejected(world: World) {
    let coupon = world.coupon(10);
    let world = world.with_coupon(coupon);
    let request = world.request(Some("NOPE"));
    let err = world.place(request).await.expect_err("bad coupon");
    assert_eq!(err.message(), "Invalid or expired coupon code.");
}

#[rstest]
#[tokio::test]
async fn instructors_cannot_buy_their_own_course(world: World) {
    let mut world = world;
    let owner = sample_instructor("ida");
    world.course.instructor_id = owner.id.clone();
    world.buyer = owner.clone();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(owner.clone())));
    world.users = users;
    let mut courses = MockCourseRepository::new();
    let course = world.course.clone();
    courses
        .expect_find_course()
        .returning(move |_| Ok(Some(course.clone())));
    world.courses = courses;

    let request = world.request(None);
    let err = world.place(request).await.expect_err("own course");
    assert_eq!(err.message(), "You cannot order your own course.");
}

#[rstest]
#[tokio::test]
async fn duplicate_orders_are_rejected(world: World) {
    let mut world = world;
    world.orders.expect_exists().returning(|_, _| Ok(true));
    let request = world.request(None);
    let err = world.place(request).await.expect_err("duplicate");
    assert_eq!(err.message(), "You have already ordered this course.");
}

#[rstest]
#[case::expired(|coupon: &mut Coupon| coupon.valid_until = fixed_now() - Duration::seconds(1),
    "The coupon is either expired or inactive.")]
#[case::inactive(|coupon: &mut Coupon| coupon.is_active = false,
    "The coupon is either expired or inactive.")]
#[case::scoped(|coupon: &mut Coupon| coupon.course_ids = vec![Uuid::new_v4()],
    "The coupon does not apply to this course.")]
#[case::minimum(|coupon: &mut Coupon| coupon.min_order_value = Some(Money::from_cents(15_000)),
    "The course price must exceed 150.00 to use this coupon.")]
#[tokio::test]
async fn coupon_rules_are_enforced(
    world: World,
    #[case] tweak: fn(&mut Coupon),
    #[case] expected: &'static str,
) {
    let mut coupon = world.coupon(10);
    tweak(&mut coupon);
    let world = world.without_prior_order().with_coupon(coupon);
    let request = world.request(Some("SAVE10"));
    let err = world.place(request).await.expect_err("coupon rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), expected);
}

#[rstest]
#[tokio::test]
async fn zero_minimum_counts_as_unset(world: World) {
    let mut coupon = world.coupon(50);
    coupon.min_order_value = Some(Money::zero());
    let mut world = world.with_balance(10_000).without_prior_order().with_coupon(coupon);
    expect_success(&mut world);
    world.mailer.expect_send().returning(|_| Ok(()));

    let request = world.request(Some("SAVE10"));
    let order = world.place(request).await.expect("order placed");
    assert_eq!(order.amount, Money::from_cents(5_000));
}

#[rstest]
#[tokio::test]
async fn insufficient_balance_is_rejected_before_writing(world: World) {
    let mut world = world.with_balance(10_499).without_prior_order();
    world.orders.expect_place().never();
    let request = world.request(None);
    let err = world.place(request).await.expect_err("too poor");
    assert_eq!(err.message(), "Insufficient balance to place this order.");
}

#[rstest]
#[tokio::test]
async fn exact_balance_is_enough(world: World) {
    let mut world = world.with_balance(10_500).without_prior_order();
    expect_success(&mut world);
    world.mailer.expect_send().returning(|_| Ok(()));
    let request = world.request(None);
    world.place(request).await.expect("exact balance");
}

#[rstest]
#[tokio::test]
async fn missing_balance_is_not_found(world: World) {
    let mut world = world.without_prior_order();
    world.balances.expect_find().returning(|_| Ok(None));
    let request = world.request(None);
    let err = world.place(request).await.expect_err("no balance");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn concurrent_debit_surfaces_repository_refusal(world: World) {
    let mut world = world.with_balance(20_000).without_prior_order();
    world
        .orders
        .expect_place()
        .returning(|_| Err(OrderRepositoryError::insufficient_balance()));
    let request = world.request(None);
    let err = world.place(request).await.expect_err("lost race");
    assert_eq!(err.message(), "Insufficient balance to place this order.");
}

#[rstest]
#[tokio::test]
async fn enrollment_cache_outage_does_not_undo_order(world: World) {
    let mut world = world.with_balance(20_000).without_prior_order();
    world
        .orders
        .expect_place()
        .times(1)
        .returning(|placement| Ok(placement.to_order()));
    let key = enrollments_cache_key(&world.buyer.id);
    world
        .cache
        .expect_delete()
        .withf(move |candidate| candidate == key)
        .times(1)
        .returning(|_| Err(CacheError::backend("connection refused")));
    world.mailer.expect_send().times(1).returning(|_| Ok(()));

    let request = world.request(None);
    let order = world.place(request).await.expect("order kept");
    assert_eq!(order.amount, Money::from_cents(10_000));
    assert_eq!(order.tax_amount, Money::from_cents(500));
}

#[rstest]
#[tokio::test]
async fn mail_queue_failure_does_not_undo_order(world: World) {
    let mut world = world.with_balance(20_000).without_prior_order();
    expect_success(&mut world);
    world
        .mailer
        .expect_send()
        .returning(|_| Err(MailerError::queue_closed()));
    let request = world.request(None);
    world.place(request).await.expect("order survives mail failure");
}

#[tokio::test]
async fn orders_of_other_users_are_not_found() {
    let mut orders = MockOrderRepository::new();
    orders.expect_find_for_user().returning(|_, _| Ok(None));
    let service = OrderService::new(
        OrderPorts {
            orders: Arc::new(orders),
            courses: Arc::new(MockCourseRepository::new()),
            coupons: Arc::new(MockCouponRepository::new()),
            balances: Arc::new(MockAccountBalanceRepository::new()),
            users: Arc::new(MockUserRepository::new()),
            cache: Arc::new(MockKeyValueCache::new()),
            mailer: Arc::new(MockMailer::new()),
            clock: Arc::new(MutableClock::default()),
        },
        OrderSettings::default(),
    );

    let err = service
        .get_order(&UserId::random(), Uuid::new_v4())
        .await
        .expect_err("not mine");
    assert_eq!(err.message(), "Order not found.");
}
