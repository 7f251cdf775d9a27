//! Coupon HTTP handlers. Each instructor sees only the coupons they issued.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::CouponRequest;
use crate::domain::{Coupon, Error, Money};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    DecimalInput, FieldName, parse_amount, parse_rfc3339_timestamp, parse_uuid_list, require,
};

/// Coupon as returned to its creator.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponResponse {
    /// Coupon id.
    pub id: Uuid,
    /// Code students enter at checkout.
    pub code: String,
    /// Discount from 1 to 100 percent.
    #[schema(minimum = 1, maximum = 100)]
    pub discount_percentage: u8,
    /// Last moment the coupon may be used.
    pub valid_until: DateTime<Utc>,
    /// Whether the coupon may be used.
    pub is_active: bool,
    /// Smallest course price the coupon accepts.
    #[schema(value_type = Option<String>, example = "100.00")]
    pub min_order_value: Option<Money>,
    /// Courses the coupon is limited to; empty applies everywhere.
    pub courses: Vec<Uuid>,
    /// Issuing instructor.
    pub creator_id: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<Coupon> for CouponResponse {
    fn from(value: Coupon) -> Self {
        Self {
            id: value.id,
            code: value.code,
            discount_percentage: value.discount.value(),
            valid_until: value.valid_until,
            is_active: value.is_active,
            min_order_value: value.min_order_value,
            courses: value.course_ids,
            creator_id: value.creator_id.to_string(),
            created_at: value.created_at,
        }
    }
}

const fn active_by_default() -> bool {
    true
}

/// Coupon create/replace body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponBody {
    /// Code students enter at checkout.
    pub code: Option<String>,
    /// Discount from 1 to 100 percent.
    pub discount_percentage: Option<i64>,
    /// RFC 3339 timestamp.
    #[schema(example = "2026-12-31T23:59:59Z")]
    pub valid_until: Option<String>,
    /// Defaults to `true`.
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    /// Smallest course price the coupon accepts.
    #[schema(value_type = Option<String>, example = "49.99")]
    pub min_order_value: Option<DecimalInput>,
    /// Course ids the coupon is limited to; empty for all courses.
    #[serde(default)]
    pub courses: Vec<String>,
}

impl TryFrom<CouponBody> for CouponRequest {
    type Error = Error;

    fn try_from(body: CouponBody) -> Result<Self, Self::Error> {
        let valid_until = FieldName::new("validUntil");
        let min_order_value = FieldName::new("minOrderValue");
        Ok(Self {
            code: require(body.code, FieldName::new("code"))?,
            discount_percentage: require(
                body.discount_percentage,
                FieldName::new("discountPercentage"),
            )?,
            valid_until: parse_rfc3339_timestamp(
                &require(body.valid_until, valid_until)?,
                valid_until,
            )?,
            is_active: body.is_active,
            min_order_value: body
                .min_order_value
                .map(|raw| parse_amount(&raw, min_order_value))
                .transpose()?,
            course_ids: parse_uuid_list(&body.courses, FieldName::new("courses"))?,
        })
    }
}

/// The caller's coupons.
#[utoipa::path(
    get,
    path = "/api/v1/coupons",
    responses(
        (status = 200, description = "Coupons", body = [CouponResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "listCoupons"
)]
#[get("/coupons")]
pub async fn list_coupons(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CouponResponse>>> {
    let actor = session.require_user_id()?;
    let coupons = state.coupons_query.list_coupons(&actor).await?;
    Ok(web::Json(coupons.into_iter().map(Into::into).collect()))
}

/// One of the caller's coupons.
#[utoipa::path(
    get,
    path = "/api/v1/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon id")),
    responses(
        (status = 200, description = "Coupon", body = CouponResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "getCoupon"
)]
#[get("/coupons/{id}")]
pub async fn get_coupon(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<CouponResponse>> {
    let actor = session.require_user_id()?;
    let coupon = state
        .coupons_query
        .get_coupon(&actor, path.into_inner())
        .await?;
    Ok(web::Json(coupon.into()))
}

/// Issue a coupon. Instructors only.
#[utoipa::path(
    post,
    path = "/api/v1/coupons",
    request_body = CouponBody,
    responses(
        (status = 201, description = "Created", body = CouponResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not an instructor", body = Error),
        (status = 409, description = "Code already exists", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "createCoupon"
)]
#[post("/coupons")]
pub async fn create_coupon(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CouponBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let request = CouponRequest::try_from(payload.into_inner())?;
    let coupon = state.coupons.create_coupon(&actor, request).await?;
    Ok(HttpResponse::Created().json(CouponResponse::from(coupon)))
}

/// Replace one of the caller's coupons.
#[utoipa::path(
    put,
    path = "/api/v1/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon id")),
    request_body = CouponBody,
    responses(
        (status = 200, description = "Updated", body = CouponResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Code already exists", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "updateCoupon"
)]
#[put("/coupons/{id}")]
pub async fn update_coupon(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<CouponBody>,
) -> ApiResult<web::Json<CouponResponse>> {
    let actor = session.require_user_id()?;
    let request = CouponRequest::try_from(payload.into_inner())?;
    let coupon = state
        .coupons
        .update_coupon(&actor, path.into_inner(), request)
        .await?;
    Ok(web::Json(coupon.into()))
}

/// Delete one of the caller's coupons.
#[utoipa::path(
    delete,
    path = "/api/v1/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "deleteCoupon"
)]
#[delete("/coupons/{id}")]
pub async fn delete_coupon(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    state
        .coupons
        .delete_coupon(&actor, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
