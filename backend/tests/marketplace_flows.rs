//! End-to-end marketplace flows over the in-memory store.
//!
//! Each test drives the real services through the HTTP handlers: accounts
//! are registered and verified, instructors publish courses and coupons, and
//! students pay for courses from their balance.

#[path = "flows/support.rs"]
mod support;

use actix_web::cookie::Cookie;
use actix_web::test;
use chrono::{Duration, SecondsFormat, Utc};
use rstest::rstest;
use serde_json::{Value, json};

use support::{PASSWORD, RESET_TOKEN, call, login, marketplace, signed_up};

fn authed(req: test::TestRequest, cookie: &Cookie<'static>) -> test::TestRequest {
    req.cookie(cookie.clone())
}

async fn publish_course<S, B>(app: &S, cookie: &Cookie<'static>, title: &str, price: &str) -> Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let (status, body, _) = call(
        app,
        authed(test::TestRequest::post().uri("/api/v1/courses"), cookie).set_json(json!({
            "title": title,
            "description": "Ownership, borrowing, and fearless concurrency.",
            "price": price,
            "category": "Programming",
            "tags": ["rust", "systems"],
        })),
    )
    .await;
    assert_eq!(status, 201, "create course: {body}");
    body
}

#[rstest]
#[actix_web::test]
async fn student_buys_course_from_signup_bonus() {
    let market = marketplace();
    let app = test::init_service(support::app(market.state.clone())).await;

    let (_, instructor) = signed_up(&app, "ada", "instructor").await;
    let course = publish_course(&app, &instructor, "Rust 101", "20.00").await;
    let course_id = course["id"].as_str().expect("course id").to_owned();
    assert_eq!(course["tags"].as_array().map(Vec::len), Some(2));

    let (_, student) = signed_up(&app, "bob", "student").await;
    let (status, balance, _) = call(
        &app,
        authed(test::TestRequest::get().uri("/api/v1/users/balance"), &student),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(balance["balance"], "50.00");

    let (status, order, _) = call(
        &app,
        authed(test::TestRequest::post().uri("/api/v1/orders"), &student)
            .set_json(json!({ "courseId": course_id })),
    )
    .await;
    assert_eq!(status, 201, "place order: {order}");
    assert_eq!(order["amount"], "20.00");
    assert_eq!(order["taxAmount"], "1.00");

    let (_, balance, _) = call(
        &app,
        authed(test::TestRequest::get().uri("/api/v1/users/balance"), &student),
    )
    .await;
    assert_eq!(balance["balance"], "29.00");

    let (status, enrollments, _) = call(
        &app,
        authed(test::TestRequest::get().uri("/api/v1/courses/enrollments"), &student),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(enrollments.as_array().map(Vec::len), Some(1));

    let (status, _, _) = call(
        &app,
        authed(test::TestRequest::post().uri("/api/v1/orders"), &student)
            .set_json(json!({ "courseTitle": "Rust 101" })),
    )
    .await;
    assert_eq!(status, 400, "a course can only be bought once");

    let subjects: Vec<String> = market
        .mail
        .sent()
        .into_iter()
        .filter(|message| message.to == "bob@example.com")
        .map(|message| message.subject)
        .collect();
    assert!(subjects.iter().any(|subject| subject == "Order Confirmation"));
}

#[rstest]
#[actix_web::test]
async fn coupon_discounts_order_before_tax() {
    let market = marketplace();
    let app = test::init_service(support::app(market.state.clone())).await;

    let (_, instructor) = signed_up(&app, "grace", "instructor").await;
    let course = publish_course(&app, &instructor, "Compilers", "10.00").await;
    let valid_until = (Utc::now() + Duration::days(30)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let (status, coupon, _) = call(
        &app,
        authed(test::TestRequest::post().uri("/api/v1/coupons"), &instructor).set_json(json!({
            "code": "HALF",
            "discountPercentage": 50,
            "validUntil": valid_until,
            "courses": [course["id"]],
        })),
    )
    .await;
    assert_eq!(status, 201, "create coupon: {coupon}");

    let (_, student) = signed_up(&app, "linus", "student").await;
    let (status, order, _) = call(
        &app,
        authed(test::TestRequest::post().uri("/api/v1/orders"), &student)
            .set_json(json!({ "courseId": course["id"], "couponCode": "HALF" })),
    )
    .await;
    assert_eq!(status, 201, "place order: {order}");
    assert_eq!(order["coupon"], "HALF");
    assert_eq!(order["amount"], "5.00");
    assert_eq!(order["taxAmount"], "0.25");
}

#[rstest]
#[actix_web::test]
async fn scoped_coupon_stays_scoped_after_its_course_is_deleted() {
    let market = marketplace();
    let app = test::init_service(support::app(market.state.clone())).await;

    let (_, owner) = signed_up(&app, "edsger", "instructor").await;
    let scoped = publish_course(&app, &owner, "Structured Programming", "10.00").await;
    let (_, rival) = signed_up(&app, "niklaus", "instructor").await;
    let foreign = publish_course(&app, &rival, "Foreign", "10.00").await;
    let valid_until = (Utc::now() + Duration::days(30)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let (status, coupon, _) = call(
        &app,
        authed(test::TestRequest::post().uri("/api/v1/coupons"), &owner).set_json(json!({
            "code": "ONLYSCOPED",
            "discountPercentage": 100,
            "validUntil": valid_until,
            "courses": [scoped["id"]],
        })),
    )
    .await;
    assert_eq!(status, 201, "create coupon: {coupon}");

    let (_, student) = signed_up(&app, "tony", "student").await;
    let order_foreign = || {
        authed(test::TestRequest::post().uri("/api/v1/orders"), &student)
            .set_json(json!({ "courseId": foreign["id"], "couponCode": "ONLYSCOPED" }))
    };
    let (status, body, _) = call(&app, order_foreign()).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "The coupon does not apply to this course.");

    let uri = format!("/api/v1/courses/{}", scoped["id"].as_str().expect("course id"));
    let (status, _, _) = call(&app, authed(test::TestRequest::delete().uri(&uri), &owner)).await;
    assert_eq!(status, 204);

    let (status, body, _) = call(&app, order_foreign()).await;
    assert_eq!(status, 400, "coupon must not turn global: {body}");
    assert_eq!(body["message"], "Invalid or expired coupon code.");
}

#[rstest]
#[actix_web::test]
async fn deleting_a_course_clears_cached_enrollments_and_listing() {
    let market = marketplace();
    let app = test::init_service(support::app(market.state.clone())).await;

    let (_, instructor) = signed_up(&app, "barbara", "instructor").await;
    let course = publish_course(&app, &instructor, "Abstract Data Types", "5.00").await;
    let (_, student) = signed_up(&app, "alan", "student").await;
    let (status, order, _) = call(
        &app,
        authed(test::TestRequest::post().uri("/api/v1/orders"), &student)
            .set_json(json!({ "courseId": course["id"] })),
    )
    .await;
    assert_eq!(status, 201, "place order: {order}");

    let enrollments = || authed(test::TestRequest::get().uri("/api/v1/courses/enrollments"), &student);
    let listing = || test::TestRequest::get().uri("/api/v1/courses");
    let (_, cached, _) = call(&app, enrollments()).await;
    assert_eq!(cached.as_array().map(Vec::len), Some(1));
    let (_, cached, _) = call(&app, listing()).await;
    assert_eq!(cached.as_array().map(Vec::len), Some(1));

    let uri = format!("/api/v1/courses/{}", course["id"].as_str().expect("course id"));
    let (status, _, _) = call(&app, authed(test::TestRequest::delete().uri(&uri), &instructor)).await;
    assert_eq!(status, 204);

    let (_, after, _) = call(&app, enrollments()).await;
    assert_eq!(after.as_array().map(Vec::len), Some(0));
    let (_, after, _) = call(&app, listing()).await;
    assert_eq!(after.as_array().map(Vec::len), Some(0));
}

#[rstest]
#[actix_web::test]
async fn enrolled_student_review_updates_rating() {
    let market = marketplace();
    let app = test::init_service(support::app(market.state.clone())).await;

    let (_, instructor) = signed_up(&app, "barbara", "instructor").await;
    let course = publish_course(&app, &instructor, "Distributed Systems", "5.00").await;
    let course_id = course["id"].as_str().expect("course id").to_owned();

    let (_, student) = signed_up(&app, "ken", "student").await;
    let (status, _, _) = call(
        &app,
        authed(test::TestRequest::post().uri("/api/v1/orders"), &student)
            .set_json(json!({ "courseId": course_id })),
    )
    .await;
    assert_eq!(status, 201);

    let (status, review, _) = call(
        &app,
        authed(
            test::TestRequest::post().uri(&format!("/api/v1/courses/{course_id}/reviews")),
            &student,
        )
        .set_json(json!({ "rating": 4, "comment": "Dense but rewarding." })),
    )
    .await;
    assert_eq!(status, 201, "create review: {review}");
    assert_eq!(review["username"], "ken");

    let (status, detail, _) =
        call(&app, test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}"))).await;
    assert_eq!(status, 200);
    assert_eq!(detail["averageRating"], "4.00");
    assert_eq!(detail["reviewCount"], 1);
}

#[rstest]
#[actix_web::test]
async fn password_reset_replaces_credentials() {
    let market = marketplace();
    let app = test::init_service(support::app(market.state.clone())).await;
    signed_up(&app, "edsger", "student").await;

    let (status, _, _) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users/password_reset")
            .set_json(json!({ "email": "edsger@example.com" })),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body, _) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users/password_reset/confirm")
            .set_json(json!({
                "email": "edsger@example.com",
                "token": RESET_TOKEN,
                "password": "a-brand-new-secret",
            })),
    )
    .await;
    assert_eq!(status, 200, "confirm reset: {body}");

    assert!(login(&app, "edsger", PASSWORD).await.is_none());
    assert!(login(&app, "edsger", "a-brand-new-secret").await.is_some());
}

#[rstest]
#[case("/api/v1/users/profile")]
#[case("/api/v1/users/balance")]
#[case("/api/v1/orders")]
#[case("/api/v1/coupons")]
#[actix_web::test]
async fn session_required_endpoints_reject_anonymous_callers(#[case] uri: &str) {
    let market = marketplace();
    let app = test::init_service(support::app(market.state)).await;

    let (status, body, _) = call(&app, test::TestRequest::get().uri(uri)).await;
    assert_eq!(status, 401);
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn unverified_account_cannot_log_in() {
    let market = marketplace();
    let app = test::init_service(support::app(market.state)).await;

    let (status, _, _) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(json!({
                "username": "alan",
                "email": "alan@example.com",
                "password": PASSWORD,
                "confirmPassword": PASSWORD,
            })),
    )
    .await;
    assert_eq!(status, 201);
    assert!(login(&app, "alan", PASSWORD).await.is_none());
}
