//! Tests for the account service.

use std::sync::{Arc, Mutex};

use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockAccountBalanceRepository, MockKeyValueCache, MockMailer, MockPasswordHasher,
    MockSecretGenerator, MockUserRepository, UserPersistenceError,
};
use crate::domain::{ErrorCode, Role};
use crate::test_support::{MutableClock, fixed_now, sample_user};

struct Mocks {
    users: MockUserRepository,
    balances: MockAccountBalanceRepository,
    cache: MockKeyValueCache,
    mailer: MockMailer,
    hasher: MockPasswordHasher,
    secrets: MockSecretGenerator,
}

impl Mocks {
    fn new() -> Self {
        Self {
            users: MockUserRepository::new(),
            balances: MockAccountBalanceRepository::new(),
            cache: MockKeyValueCache::new(),
            mailer: MockMailer::new(),
            hasher: MockPasswordHasher::new(),
            secrets: MockSecretGenerator::new(),
        }
    }

    fn into_service(self) -> AccountService {
        AccountService::new(
            AccountPorts {
                users: Arc::new(self.users),
                balances: Arc::new(self.balances),
                cache: Arc::new(self.cache),
                mailer: Arc::new(self.mailer),
                hasher: Arc::new(self.hasher),
                secrets: Arc::new(self.secrets),
                clock: Arc::new(MutableClock::default()),
            },
            AccountSettings::default(),
        )
    }
}

fn register_request(password: &str, confirm: &str) -> RegisterRequest {
    RegisterRequest {
        username: "ada".to_owned(),
        email: "ada@example.com".to_owned(),
        password: password.to_owned(),
        confirm_password: confirm.to_owned(),
        role: Role::Student,
    }
}

fn code(value: u32) -> VerificationCode {
    VerificationCode::from_number(value).expect("fixture code")
}

#[tokio::test]
async fn register_creates_unverified_user_with_bonus_and_mails_code() {
    let mut mocks = Mocks::new();
    mocks.users.expect_find_by_username().return_once(|_| Ok(None));
    mocks.users.expect_find_by_email().return_once(|_| Ok(None));
    mocks
        .hasher
        .expect_hash()
        .return_once(|_| Ok("$argon2id$hash".to_owned()));
    mocks
        .users
        .expect_create()
        .withf(|user, bonus| {
            !user.is_verified
                && user.password_hash == "$argon2id$hash"
                && user.created_at == fixed_now()
                && *bonus == DEFAULT_SIGNUP_BONUS
        })
        .times(1)
        .return_once(|_, _| Ok(()));
    mocks
        .secrets
        .expect_verification_code()
        .return_once(|| code(482_913));
    mocks
        .cache
        .expect_set()
        .withf(|key, value, ttl| {
            key.starts_with("verification_code_") && value == "482913" && *ttl == VERIFICATION_CODE_TTL
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));
    let sent = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&sent);
    mocks.mailer.expect_send().returning(move |message| {
        sink.lock().expect("sent lock").push(message.clone());
        Ok(())
    });

    let service = mocks.into_service();
    service
        .register(register_request("s3cretpass", "s3cretpass"))
        .await
        .expect("registration succeeds");

    let sent = sent.lock().expect("sent lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ada@example.com");
    assert!(sent[0].body.contains("482913"));
    assert!(sent[0].body.contains("10 minutes"));
}

#[tokio::test]
async fn register_rejects_mismatched_passwords_before_storage() {
    let service = Mocks::new().into_service();
    let err = service
        .register(register_request("s3cretpass", "different1"))
        .await
        .expect_err("mismatch rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "Passwords must match");
    let details = err.details().expect("field details");
    assert_eq!(details["field"], "password");
}

#[tokio::test]
async fn register_rejects_taken_username() {
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_find_by_username()
        .return_once(|_| Ok(Some(sample_user("ada"))));
    let service = mocks.into_service();

    let err = service
        .register(register_request("s3cretpass", "s3cretpass"))
        .await
        .expect_err("duplicate rejected");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn register_survives_mailer_failure() {
    let mut mocks = Mocks::new();
    mocks.users.expect_find_by_username().return_once(|_| Ok(None));
    mocks.users.expect_find_by_email().return_once(|_| Ok(None));
    mocks.hasher.expect_hash().return_once(|_| Ok("h".to_owned()));
    mocks.users.expect_create().return_once(|_, _| Ok(()));
    mocks
        .secrets
        .expect_verification_code()
        .return_once(|| code(100_000));
    mocks.cache.expect_set().return_once(|_, _, _| Ok(()));
    mocks
        .mailer
        .expect_send()
        .return_once(|_| Err(crate::domain::ports::MailerError::queue_closed()));

    let service = mocks.into_service();
    service
        .register(register_request("s3cretpass", "s3cretpass"))
        .await
        .expect("mail failure is not fatal");
}

#[rstest]
#[case(None, "999999", "The verification code has expired or is invalid.")]
#[case(Some("123456"), "654321", "Incorrect verification code.")]
#[case(Some("123456"), "12345", "Incorrect verification code.")]
#[tokio::test]
async fn verify_email_rejects_bad_codes(
    #[case] cached: Option<&'static str>,
    #[case] submitted: &'static str,
    #[case] expected: &'static str,
) {
    let mut mocks = Mocks::new();
    mocks
        .cache
        .expect_get()
        .return_once(move |_| Ok(cached.map(ToOwned::to_owned)));
    let service = mocks.into_service();

    let err = service
        .verify_email(&UserId::random(), submitted)
        .await
        .expect_err("code rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), expected);
}

#[tokio::test]
async fn verify_email_marks_verified_and_clears_code() {
    let user = sample_user("ada");
    let user_id = user.id.clone();
    let mut mocks = Mocks::new();
    mocks
        .cache
        .expect_get()
        .return_once(|_| Ok(Some("123456".to_owned())));
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));
    mocks.users.expect_mark_verified().times(1).return_once(|_| Ok(true));
    mocks
        .mailer
        .expect_send()
        .withf(|message| message.subject == "Your Email is Verified!")
        .times(1)
        .return_once(|_| Ok(()));
    let expected_key = verification_code_key(&user_id);
    mocks
        .cache
        .expect_delete()
        .withf(move |key| key == expected_key)
        .times(1)
        .return_once(|_| Ok(()));

    let service = mocks.into_service();
    service
        .verify_email(&user_id, " 123456 ")
        .await
        .expect("verification succeeds");
}

#[tokio::test]
async fn verify_email_reports_missing_user() {
    let mut mocks = Mocks::new();
    mocks
        .cache
        .expect_get()
        .return_once(|_| Ok(Some("123456".to_owned())));
    mocks.users.expect_find_by_id().return_once(|_| Ok(None));
    let service = mocks.into_service();

    let err = service
        .verify_email(&UserId::random(), "123456")
        .await
        .expect_err("missing user");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "User not found.");
}

#[tokio::test]
async fn authenticate_rejects_unknown_user_and_wrong_password_alike() {
    let mut mocks = Mocks::new();
    mocks.users.expect_find_by_username().return_once(|_| Ok(None));
    let service = mocks.into_service();
    let creds = LoginCredentials::try_from_parts("ghost", "whatever1").expect("creds");
    let unknown = service.authenticate(&creds).await.expect_err("unknown user");

    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_find_by_username()
        .return_once(|_| Ok(Some(sample_user("ada"))));
    mocks.hasher.expect_verify().return_once(|_, _| Ok(false));
    let service = mocks.into_service();
    let creds = LoginCredentials::try_from_parts("ada", "wrongpass").expect("creds");
    let wrong = service.authenticate(&creds).await.expect_err("wrong password");

    assert_eq!(unknown.code(), ErrorCode::Unauthorized);
    assert_eq!(unknown.message(), wrong.message());
    assert_eq!(wrong.message(), "invalid credentials");
}

#[tokio::test]
async fn authenticate_refuses_unverified_users() {
    let mut user = sample_user("ada");
    user.is_verified = false;
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_find_by_username()
        .return_once(move |_| Ok(Some(user)));
    mocks.hasher.expect_verify().return_once(|_, _| Ok(true));
    let service = mocks.into_service();

    let creds = LoginCredentials::try_from_parts("ada", "s3cretpass").expect("creds");
    let err = service.authenticate(&creds).await.expect_err("unverified");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "Your email is not verified.");
}

#[tokio::test]
async fn authenticate_returns_user_id() {
    let user = sample_user("ada");
    let expected = user.id.clone();
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_find_by_username()
        .withf(|username| username == "ada")
        .return_once(move |_| Ok(Some(user)));
    mocks.hasher.expect_verify().return_once(|_, _| Ok(true));
    let service = mocks.into_service();

    let creds = LoginCredentials::try_from_parts(" ada ", "s3cretpass").expect("creds");
    assert_eq!(service.authenticate(&creds).await.expect("login"), expected);
}

#[tokio::test]
async fn password_reset_request_rejects_unknown_email() {
    let mut mocks = Mocks::new();
    mocks.users.expect_find_by_email().return_once(|_| Ok(None));
    let service = mocks.into_service();

    let err = service
        .request_password_reset("nobody@example.com")
        .await
        .expect_err("unknown email");
    assert_eq!(err.message(), "There is no user registered with this email.");
}

#[tokio::test]
async fn password_reset_request_caches_token_fingerprint() {
    let user = sample_user("ada");
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(user)));
    mocks
        .secrets
        .expect_reset_token()
        .return_once(|| PasswordResetToken::new("tok-123"));
    let fingerprint = PasswordResetToken::new("tok-123").fingerprint();
    mocks
        .cache
        .expect_set()
        .withf(move |key, value, ttl| {
            key.starts_with("password_reset_") && value == fingerprint && *ttl == PASSWORD_RESET_TTL
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));
    mocks
        .mailer
        .expect_send()
        .withf(|message| message.body.contains("tok-123"))
        .times(1)
        .return_once(|_| Ok(()));

    let service = mocks.into_service();
    service
        .request_password_reset("ada@example.com")
        .await
        .expect("reset requested");
}

fn confirm_request(token: &str, password: &str) -> ConfirmPasswordResetRequest {
    ConfirmPasswordResetRequest {
        email: "ada@example.com".to_owned(),
        token: token.to_owned(),
        new_password: password.to_owned(),
    }
}

#[tokio::test]
async fn password_reset_confirm_rejects_unknown_email() {
    let mut mocks = Mocks::new();
    mocks.users.expect_find_by_email().return_once(|_| Ok(None));
    let service = mocks.into_service();

    let err = service
        .confirm_password_reset(confirm_request("tok", "newpassword"))
        .await
        .expect_err("unknown email");
    assert_eq!(err.message(), "Invalid email.");
}

#[tokio::test]
async fn password_reset_confirm_rejects_wrong_token() {
    let user = sample_user("ada");
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(user)));
    let stored = PasswordResetToken::new("right").fingerprint();
    mocks
        .cache
        .expect_get()
        .return_once(move |_| Ok(Some(stored)));
    let service = mocks.into_service();

    let err = service
        .confirm_password_reset(confirm_request("wrong", "newpassword"))
        .await
        .expect_err("token mismatch");
    assert_eq!(err.message(), "Invalid or expired token.");
}

#[tokio::test]
async fn password_reset_confirm_stores_new_hash() {
    let user = sample_user("ada");
    let user_id = user.id.clone();
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(user)));
    let stored = PasswordResetToken::new("right").fingerprint();
    mocks
        .cache
        .expect_get()
        .return_once(move |_| Ok(Some(stored)));
    mocks
        .hasher
        .expect_hash()
        .withf(|password| password.expose() == "newpassword")
        .return_once(|_| Ok("new-hash".to_owned()));
    mocks
        .users
        .expect_update_password()
        .withf(move |id, hash| *id == user_id && hash == "new-hash")
        .times(1)
        .return_once(|_, _| Ok(true));
    mocks.cache.expect_delete().times(1).return_once(|_| Ok(()));
    mocks
        .mailer
        .expect_send()
        .withf(|message| message.subject == "Your Password Has Been Successfully Reset")
        .times(1)
        .return_once(|_| Ok(()));

    let service = mocks.into_service();
    service
        .confirm_password_reset(confirm_request("right", "newpassword"))
        .await
        .expect("reset confirmed");
}

#[rstest]
#[case(0, "Amount must be greater than zero.")]
#[case(-100, "Amount must be greater than zero.")]
#[case(10_000_000_000, "Ensure that there are no more than 10 digits in total.")]
#[tokio::test]
async fn top_up_validates_amount(#[case] cents: i64, #[case] expected: &'static str) {
    let service = Mocks::new().into_service();
    let err = service
        .top_up_balance(&UserId::random(), Money::from_cents(cents))
        .await
        .expect_err("invalid amount");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), expected);
}

#[tokio::test]
async fn top_up_credits_balance() {
    let user_id = UserId::random();
    let owner = user_id.clone();
    let mut mocks = Mocks::new();
    mocks
        .balances
        .expect_credit()
        .withf(|_, amount, at| *amount == Money::from_cents(2_500) && *at == fixed_now())
        .return_once(move |_, _, at| {
            Ok(Some(AccountBalance {
                user_id: owner,
                balance: Money::from_cents(7_500),
                updated_at: at,
            }))
        });
    let service = mocks.into_service();

    let balance = service
        .top_up_balance(&user_id, Money::from_cents(2_500))
        .await
        .expect("top-up succeeds");
    assert_eq!(balance.balance, Money::from_cents(7_500));
}

#[tokio::test]
async fn fetch_profile_maps_repository_outage() {
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_find_by_id()
        .return_once(|_| Err(UserPersistenceError::connection("refused")));
    let service = mocks.into_service();

    let err = service
        .fetch_profile(&UserId::random())
        .await
        .expect_err("outage");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
