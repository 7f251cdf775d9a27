//! Tests for the course handlers.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::{Enrollment, Error, PopularCourse, RatingSummary, Tag, UserId};
use crate::inbound::http::test_utils::{MockPorts, signed_in, test_app};
use crate::test_support::{fixed_now, sample_category, sample_course, sample_instructor};

#[actix_web::test]
async fn list_parses_filters() {
    let ida = sample_instructor("ida");
    let mut course = sample_course(&ida, "Async Rust", 4_999);
    course.rating = RatingSummary { total: 14, count: 3 };
    course.category = Some(sample_category("Programming"));
    course.tags = vec![Tag {
        id: Uuid::new_v4(),
        name: "async".to_owned(),
        created_at: fixed_now(),
    }];
    let mut ports = MockPorts::default();
    ports
        .courses_query
        .expect_list_courses()
        .withf(|filter| {
            filter.title.as_deref() == Some("rust")
                && filter.category.is_none()
                && filter.tags == ["async", "web"]
                && filter.min_rating.map(|rating| rating.hundredths()) == Some(450)
        })
        .return_once(move |_| Ok(vec![course]));
    let app = test::init_service(test_app(ports)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/courses?title=rust&category=&tags=async,%20web,&min_rating=4.5")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let first = &body[0];
    assert_eq!(first["price"], "49.99");
    assert_eq!(first["averageRating"], "4.67");
    assert_eq!(first["reviewCount"], 3);
    assert_eq!(first["instructor"], "ida");
    assert_eq!(first["category"]["name"], "Programming");
    assert_eq!(first["tags"][0]["name"], "async");
}

#[actix_web::test]
async fn unrated_course_has_null_average() {
    let ida = sample_instructor("ida");
    let course = sample_course(&ida, "Fresh", 1_000);
    let id = course.id;
    let mut ports = MockPorts::default();
    ports
        .courses_query
        .expect_get_course()
        .withf(move |candidate| *candidate == id)
        .return_once(move |_| Ok(course));
    let app = test::init_service(test_app(ports)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/courses/{id}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["averageRating"].is_null());
    assert_eq!(body["reviewCount"], 0);
}

#[actix_web::test]
async fn invalid_min_rating_is_rejected() {
    let mut ports = MockPorts::default();
    ports.courses_query.expect_list_courses().never();
    let app = test::init_service(test_app(ports)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/courses?min_rating=high")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "min_rating");
}

#[actix_web::test]
async fn popular_route_is_not_treated_as_an_id() {
    let ida = sample_instructor("ida");
    let ranked = vec![PopularCourse {
        course: sample_course(&ida, "Rust", 1_000),
        enrollment_count: 12,
    }];
    let mut ports = MockPorts::default();
    ports.courses_query.expect_get_course().never();
    ports
        .courses_query
        .expect_popular_courses()
        .return_once(move || Ok(ranked));
    let app = test::init_service(test_app(ports)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/courses/popular-courses")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body[0]["title"], "Rust");
    assert_eq!(body[0]["enrollmentCount"], 12);
}

#[actix_web::test]
async fn enrollments_are_scoped_to_the_session() {
    let sam = UserId::random();
    let ida = sample_instructor("ida");
    let enrollment = Enrollment {
        user_id: sam.clone(),
        course: sample_course(&ida, "Rust", 1_000),
        enrolled_at: fixed_now(),
        progress: 0.0,
        completed: false,
    };
    let expected = sam.clone();
    let mut ports = MockPorts::default();
    ports
        .courses_query
        .expect_list_enrollments()
        .withf(move |user_id| *user_id == expected)
        .return_once(move |_| Ok(vec![enrollment]));
    let app = test::init_service(test_app(ports)).await;
    let cookie = signed_in(&app, &sam).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/courses/enrollments")
        .cookie(cookie)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body[0]["course"]["title"], "Rust");
    assert_eq!(body[0]["completed"], false);
}

#[actix_web::test]
async fn missing_enrollment_is_not_found() {
    let sam = UserId::random();
    let mut ports = MockPorts::default();
    ports
        .courses_query
        .expect_get_enrollment()
        .return_once(|_, _| Err(Error::not_found("Enrollment not found.")));
    let app = test::init_service(test_app(ports)).await;
    let cookie = signed_in(&app, &sam).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/courses/{}/enrollment", Uuid::new_v4()))
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn create_forwards_parsed_body() {
    let ida = sample_instructor("ida");
    let course = sample_course(&ida, "Rust", 4_999);
    let actor = ida.id.clone();
    let mut ports = MockPorts::default();
    ports
        .courses
        .expect_create_course()
        .withf(move |candidate, request| {
            *candidate == actor
                && request.price.cents() == 4_999
                && request.category.as_deref() == Some("Programming")
                && request.tags == ["rust"]
        })
        .return_once(move |_, _| Ok(course));
    let app = test::init_service(test_app(ports)).await;
    let cookie = signed_in(&app, &ida.id).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/courses")
        .cookie(cookie)
        .set_json(json!({
            "title": "Rust",
            "description": "Ownership",
            "price": "49.99",
            "category": "Programming",
            "tags": ["rust"]
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[rstest]
#[case(json!({"description": "d", "price": "1.00"}), "title")]
#[case(json!({"title": "t", "price": "1.00"}), "description")]
#[case(json!({"title": "t", "description": "d"}), "price")]
#[case(json!({"title": "t", "description": "d", "price": "1.001"}), "price")]
#[actix_web::test]
async fn create_reports_the_offending_field(#[case] payload: Value, #[case] field: &str) {
    let ida = UserId::random();
    let mut ports = MockPorts::default();
    ports.courses.expect_create_course().never();
    let app = test::init_service(test_app(ports)).await;
    let cookie = signed_in(&app, &ida).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/courses")
        .cookie(cookie)
        .set_json(payload)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn update_by_non_owner_is_forbidden() {
    let sam = UserId::random();
    let mut ports = MockPorts::default();
    ports
        .courses
        .expect_update_course()
        .return_once(|_, _, _| Err(Error::forbidden(crate::domain::PERMISSION_DENIED)));
    let app = test::init_service(test_app(ports)).await;
    let cookie = signed_in(&app, &sam).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/courses/{}", Uuid::new_v4()))
        .cookie(cookie)
        .set_json(json!({"title": "t", "description": "d", "price": 10}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn delete_returns_no_content() {
    let ida = UserId::random();
    let id = Uuid::new_v4();
    let mut ports = MockPorts::default();
    ports
        .courses
        .expect_delete_course()
        .withf(move |_, candidate| *candidate == id)
        .return_once(|_, _| Ok(()));
    let app = test::init_service(test_app(ports)).await;
    let cookie = signed_in(&app, &ida).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/courses/{id}"))
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}
