//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};

use crate::domain::ports::{
    MockAccountCommand, MockAccountQuery, MockCategoryCommand, MockCategoryQuery,
    MockCouponCommand, MockCouponQuery, MockCourseCommand, MockCourseQuery, MockLessonCommand,
    MockLessonQuery, MockLoginService, MockOrderCommand, MockOrderQuery, MockReviewCommand,
    MockReviewQuery,
};
use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the `session` cookie set by a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Mock driving ports; unset expectations panic when called.
#[derive(Default)]
pub struct MockPorts {
    /// Mock for the `login` port.
    pub login: MockLoginService,
    /// Mock for the `accounts` port.
    pub accounts: MockAccountCommand,
    /// Mock for the `accounts_query` port.
    pub accounts_query: MockAccountQuery,
    /// Mock for the `categories` port.
    pub categories: MockCategoryCommand,
    /// Mock for the `categories_query` port.
    pub categories_query: MockCategoryQuery,
    /// Mock for the `courses` port.
    pub courses: MockCourseCommand,
    /// Mock for the `courses_query` port.
    pub courses_query: MockCourseQuery,
    /// Mock for the `lessons` port.
    pub lessons: MockLessonCommand,
    /// Mock for the `lessons_query` port.
    pub lessons_query: MockLessonQuery,
    /// Mock for the `reviews` port.
    pub reviews: MockReviewCommand,
    /// Mock for the `reviews_query` port.
    pub reviews_query: MockReviewQuery,
    /// Mock for the `coupons` port.
    pub coupons: MockCouponCommand,
    /// Mock for the `coupons_query` port.
    pub coupons_query: MockCouponQuery,
    /// Mock for the `orders` port.
    pub orders: MockOrderCommand,
    /// Mock for the `orders_query` port.
    pub orders_query: MockOrderQuery,
}

impl MockPorts {
    /// Freeze the mocks into handler state.
    pub fn into_state(self) -> HttpState {
        HttpState {
            login: Arc::new(self.login),
            accounts: Arc::new(self.accounts),
            accounts_query: Arc::new(self.accounts_query),
            categories: Arc::new(self.categories),
            categories_query: Arc::new(self.categories_query),
            courses: Arc::new(self.courses),
            courses_query: Arc::new(self.courses_query),
            lessons: Arc::new(self.lessons),
            lessons_query: Arc::new(self.lessons_query),
            reviews: Arc::new(self.reviews),
            reviews_query: Arc::new(self.reviews_query),
            coupons: Arc::new(self.coupons),
            coupons_query: Arc::new(self.coupons_query),
            orders: Arc::new(self.orders),
            orders_query: Arc::new(self.orders_query),
        }
    }
}

async fn sign_in(session: SessionContext, id: web::Path<String>) -> Result<HttpResponse, Error> {
    let user_id = UserId::new(id.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Build a test application serving the full API over `ports`.
///
/// `POST /test/sign-in/{user_id}` establishes a session without going
/// through the login port.
pub fn test_app(
    ports: MockPorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .wrap(test_session_middleware())
        .route("/test/sign-in/{user_id}", web::post().to(sign_in))
        .service(web::scope("/api/v1").configure(super::configure_api))
}

/// Establish a session for `user_id` and return its cookie.
pub async fn signed_in<S, B>(app: &S, user_id: &UserId) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri(&format!("/test/sign-in/{user_id}"))
        .to_request();
    let res = test::call_service(app, req).await;
    assert!(res.status().is_success(), "sign-in failed");
    session_cookie(&res)
}
