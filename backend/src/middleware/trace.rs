//! Request correlation middleware.
//!
//! A caller may send its own `trace-id` header so a purchase can be followed
//! from a frontend log into ours; any other request gets a fresh
//! [`TraceId`]. The identifier stays in task-local storage while the handler
//! runs and is echoed on the response.

use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, error};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware that scopes each request to a [`TraceId`] and returns it in
/// the `trace-id` response header.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use edunexus::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
///
/// Applications should not use this type directly.
pub struct TraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let supplied = req
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(TraceId::from_header);
        let trace_id = supplied.unwrap_or_else(TraceId::generate);
        debug!(
            trace_id = %trace_id,
            supplied = supplied.is_some(),
            method = %req.method(),
            path = %req.path(),
            "request received"
        );
        let header_value = trace_id.to_string();
        let fut = self.service.call(req);
        Box::pin(TraceId::scope(trace_id, async move {
            let mut res = fut.await?;
            debug!(trace_id = %trace_id, status = res.status().as_u16(), "request completed");
            match HeaderValue::from_str(&header_value) {
                Ok(value) => {
                    res.response_mut()
                        .headers_mut()
                        .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                }
                Err(error) => {
                    error!(
                        %error,
                        trace_id = %trace_id,
                        "failed to encode trace identifier header"
                    );
                }
            }
            Ok(res)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiResult, Error as ApiError};
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    async fn call_with<F, Fut, Res>(
        handler: F,
        incoming: Option<&str>,
    ) -> (
        actix_web::dev::ServiceResponse<actix_web::body::BoxBody>,
        String,
    )
    where
        F: Fn() -> Fut + Clone + 'static,
        Fut: std::future::Future<Output = Res> + 'static,
        Res: actix_web::Responder + 'static,
    {
        let app =
            test::init_service(App::new().wrap(Trace).route("/", web::get().to(handler))).await;
        let mut req = test::TestRequest::get().uri("/");
        if let Some(value) = incoming {
            req = req.insert_header((TRACE_ID_HEADER, value));
        }
        let req = req.to_request();
        let res = test::call_service(&app, req).await;
        let trace_id = res
            .headers()
            .get(TRACE_ID_HEADER)
            .expect("trace id header")
            .to_str()
            .expect("header is ascii")
            .to_owned();
        (res, trace_id)
    }

    #[rstest]
    #[actix_web::test]
    async fn adds_parseable_trace_id_header() {
        let (_, trace_id) = call_with(|| async { HttpResponse::Ok().finish() }, None).await;
        trace_id.parse::<TraceId>().expect("uuid header");
    }

    #[rstest]
    #[case("6f1c2c1e-9a55-4c4b-8a59-3d2b0d7f1e42", true)]
    #[case("frontend-request-17", false)]
    #[actix_web::test]
    async fn reuses_valid_caller_identifier(#[case] incoming: &str, #[case] reused: bool) {
        let (_, trace_id) =
            call_with(|| async { HttpResponse::Ok().finish() }, Some(incoming)).await;
        assert_eq!(trace_id == incoming, reused);
    }

    #[rstest]
    #[actix_web::test]
    async fn exposes_trace_id_in_handler() {
        let (res, trace_id) = call_with(|| async move {
            let id = TraceId::current().expect("trace id in scope");
            HttpResponse::Ok().body(id.to_string())
        }, None)
        .await;
        let body = test::read_body(res).await;
        let body = std::str::from_utf8(&body).expect("utf8 body");
        assert_eq!(trace_id, body);
    }

    #[rstest]
    #[actix_web::test]
    async fn propagates_trace_id_in_error() {
        let (res, trace_id) = call_with(|| async move {
            ApiResult::<HttpResponse>::Err(ApiError::not_found("Course not found."))
        }, None)
        .await;
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["traceId"].as_str(), Some(trace_id.as_str()));
    }
}
