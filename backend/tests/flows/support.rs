//! In-process marketplace harness for the end-to-end flow tests.
//!
//! Services are assembled through [`build_services`] over a fresh
//! [`MemoryStore`], with a recording mailer and fixed one-time secrets so
//! tests can complete verification and reset flows without reading logs.

use std::sync::{Arc, Mutex};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use async_trait::async_trait;
use mockable::DefaultClock;
use serde_json::{Value, json};

use edunexus::Trace;
use edunexus::domain::ports::{Mailer, MailerError, SecretGenerator};
use edunexus::domain::{EmailMessage, PasswordResetToken, VerificationCode};
use edunexus::inbound::http::configure_api;
use edunexus::inbound::http::state::HttpState;
use edunexus::outbound::cache::InMemoryCache;
use edunexus::outbound::memory::MemoryStore;
use edunexus::settings::AppSettings;
use edunexus::wiring::{Infrastructure, Repositories, build_services};

pub const CODE: u32 = 424_242;
pub const RESET_TOKEN: &str = "reset-token-for-tests";
pub const PASSWORD: &str = "correct-horse";
const COOKIE: &str = "session";

/// Mailer that keeps every message it is handed.
#[derive(Default)]
pub struct RecordingMailer(Mutex<Vec<EmailMessage>>);

impl RecordingMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.0.lock().expect("mailer lock").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        self.0.lock().expect("mailer lock").push(message.clone());
        Ok(())
    }
}

struct FixedSecrets;

impl SecretGenerator for FixedSecrets {
    fn verification_code(&self) -> VerificationCode {
        VerificationCode::from_number(CODE).expect("code in range")
    }

    fn reset_token(&self) -> PasswordResetToken {
        PasswordResetToken::new(RESET_TOKEN)
    }
}

/// Handler state plus the mail it produced.
pub struct Marketplace {
    pub state: HttpState,
    pub mail: Arc<RecordingMailer>,
}

pub fn marketplace() -> Marketplace {
    let mail = Arc::new(RecordingMailer::default());
    let clock = Arc::new(DefaultClock);
    let infra = Infrastructure {
        secrets: Arc::new(FixedSecrets),
        clock: clock.clone(),
        ..Infrastructure::new(Arc::new(InMemoryCache::new(clock)), mail.clone())
    };
    let repos = Repositories::in_memory(&MemoryStore::new());
    let services =
        build_services(&repos, &infra, &AppSettings::default()).expect("default settings");
    Marketplace {
        state: services.http,
        mail,
    }
}

pub fn app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(COOKIE.to_owned())
        .cookie_secure(false)
        .build();
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(web::scope("/api/v1").wrap(session).configure(configure_api))
}

/// Send a JSON request, returning the status and parsed body (`Null` when
/// empty) plus the session cookie if one was set.
pub async fn call<S, B>(
    app: &S,
    req: test::TestRequest,
) -> (u16, Value, Option<Cookie<'static>>)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status().as_u16();
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == COOKIE)
        .map(Cookie::into_owned);
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body, cookie)
}

/// Register, verify, and sign in a user, returning its id and cookie.
pub async fn signed_up<S, B>(app: &S, username: &str, role: &str) -> (String, Cookie<'static>)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body, _) = call(
        app,
        test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": PASSWORD,
                "confirmPassword": PASSWORD,
                "role": role,
            })),
    )
    .await;
    assert_eq!(status, 201, "register {username}: {body}");
    let user_id = body["userId"].as_str().expect("userId").to_owned();

    let (status, body, _) = call(
        app,
        test::TestRequest::post()
            .uri("/api/v1/users/verify")
            .set_json(json!({ "userId": user_id, "code": CODE.to_string() })),
    )
    .await;
    assert_eq!(status, 200, "verify {username}: {body}");

    let cookie = login(app, username, PASSWORD).await.expect("login succeeds");
    (user_id, cookie)
}

/// Log in, returning the session cookie on success.
pub async fn login<S, B>(app: &S, username: &str, password: &str) -> Option<Cookie<'static>>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, _, cookie) = call(
        app,
        test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(json!({ "username": username, "password": password })),
    )
    .await;
    (status == 200).then_some(cookie).flatten()
}
