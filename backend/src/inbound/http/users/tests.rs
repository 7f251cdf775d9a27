//! Handler tests for account endpoints.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::UserId;
use crate::inbound::http::test_utils::{MockPorts, session_cookie, signed_in, test_app};
use crate::test_support::{fixed_now, sample_user};

#[actix_web::test]
async fn register_returns_created_with_user_id() {
    let user_id = UserId::random();
    let expected = user_id.clone();
    let mut ports = MockPorts::default();
    ports
        .accounts
        .expect_register()
        .withf(|request| request.username == "ada" && request.role == Role::Instructor)
        .times(1)
        .return_once(move |_| Ok(user_id));
    let app = test::init_service(test_app(ports)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(json!({
            "username": "ada",
            "email": "ada@example.com",
            "password": "correct horse",
            "confirmPassword": "correct horse",
            "role": "instructor"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["userId"], expected.to_string());
}

#[rstest]
#[case(json!({"email": "a@example.com", "password": "x", "confirmPassword": "x"}), "username")]
#[case(json!({"username": "a", "email": "a@example.com", "password": "x"}), "confirmPassword")]
#[case(json!({"username": "a", "email": "a@example.com", "password": "x", "confirmPassword": "x", "role": "admin"}), "role")]
#[actix_web::test]
async fn register_rejects_incomplete_bodies(#[case] body: Value, #[case] field: &str) {
    let app = test::init_service(test_app(MockPorts::default())).await;
    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(body)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn verify_passes_code_to_service() {
    let user_id = UserId::random();
    let expected = user_id.clone();
    let mut ports = MockPorts::default();
    ports
        .accounts
        .expect_verify_email()
        .withf(move |id, code| *id == expected && code == "123456")
        .times(1)
        .return_once(|_, _| Ok(()));
    let app = test::init_service(test_app(ports)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/verify")
        .set_json(json!({"userId": user_id.to_string(), "code": "123456"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body["message"],
        "Verification successful! Your email has been verified."
    );
}

#[actix_web::test]
async fn login_sets_session_used_by_profile() {
    let ada = sample_user("ada");
    let id = ada.id.clone();
    let mut ports = MockPorts::default();
    ports
        .login
        .expect_authenticate()
        .withf(|credentials| credentials.username() == "ada")
        .return_once(move |_| Ok(id));
    ports
        .accounts_query
        .expect_fetch_profile()
        .return_once(move |_| Ok(ada));
    let app = test::init_service(test_app(ports)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"username": " ada ", "password": "secret-pass"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/profile")
        .cookie(cookie)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["username"], "ada");
    assert_eq!(body["isVerified"], true);
    assert!(body.get("passwordHash").is_none());
}

#[actix_web::test]
async fn login_rejects_blank_username_before_calling_service() {
    let mut ports = MockPorts::default();
    ports.login.expect_authenticate().never();
    let app = test::init_service(test_app(ports)).await;
    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"username": "  ", "password": "secret-pass"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "empty_username");
}

#[actix_web::test]
async fn profile_requires_session() {
    let app = test::init_service(test_app(MockPorts::default())).await;
    let req = test::TestRequest::get().uri("/api/v1/users/profile").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn balance_is_rendered_with_two_decimals() {
    let sam = UserId::random();
    let owner = sam.clone();
    let mut ports = MockPorts::default();
    ports.accounts_query.expect_fetch_balance().return_once(move |_| {
        Ok(AccountBalance {
            user_id: owner,
            balance: Money::from_cents(5_000),
            updated_at: fixed_now(),
        })
    });
    let app = test::init_service(test_app(ports)).await;
    let cookie = signed_in(&app, &sam).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users/balance")
        .cookie(cookie)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["balance"], "50.00");
}

#[actix_web::test]
async fn top_up_parses_numeric_amounts() {
    let sam = UserId::random();
    let owner = sam.clone();
    let mut ports = MockPorts::default();
    ports
        .accounts
        .expect_top_up_balance()
        .withf(|_, amount| *amount == Money::from_cents(2_550))
        .return_once(move |_, amount| {
            Ok(AccountBalance {
                user_id: owner,
                balance: amount,
                updated_at: fixed_now(),
            })
        });
    let app = test::init_service(test_app(ports)).await;
    let cookie = signed_in(&app, &sam).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/balance/add")
        .cookie(cookie)
        .set_json(json!({"amount": 25.5}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["balance"], "25.50");
}

#[actix_web::test]
async fn top_up_rejects_three_decimal_places() {
    let sam = UserId::random();
    let mut ports = MockPorts::default();
    ports.accounts.expect_top_up_balance().never();
    let app = test::init_service(test_app(ports)).await;
    let cookie = signed_in(&app, &sam).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/balance/add")
        .cookie(cookie)
        .set_json(json!({"amount": "1.005"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn password_reset_confirm_maps_body() {
    let mut ports = MockPorts::default();
    ports
        .accounts
        .expect_confirm_password_reset()
        .withf(|request| {
            request.email == "ada@example.com"
                && request.token == "tok"
                && request.new_password == "new-password"
        })
        .times(1)
        .return_once(|_| Ok(()));
    let app = test::init_service(test_app(ports)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/password_reset/confirm")
        .set_json(json!({"email": "ada@example.com", "token": "tok", "password": "new-password"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn service_errors_keep_their_status() {
    let mut ports = MockPorts::default();
    ports
        .accounts
        .expect_request_password_reset()
        .return_once(|_| {
            Err(Error::invalid_request(
                "There is no user registered with this email.",
            ))
        });
    let app = test::init_service(test_app(ports)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/password_reset")
        .set_json(json!({"email": "nobody@example.com"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "There is no user registered with this email.");
}
