//! Order HTTP handlers.
//!
//! ```text
//! POST /api/v1/orders {"courseTitle":"Rust for Humans","couponCode":"SAVE10"}
//! GET  /api/v1/orders
//! GET  /api/v1/orders/{id}
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::PlaceOrderRequest;
use crate::domain::{CourseSelector, Error, Money, Order};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid, require};

/// Order as returned to its buyer.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    /// Order id.
    pub id: Uuid,
    /// Buyer account id.
    pub user_id: String,
    /// Purchased course.
    pub course_id: Uuid,
    /// Course title at the time of purchase.
    pub course: String,
    /// Applied coupon code, if any.
    pub coupon: Option<String>,
    /// Price after discount, before tax.
    #[schema(value_type = String, example = "90.00")]
    pub amount: Money,
    /// Tax charged on top of `amount`.
    #[schema(value_type = String, example = "4.50")]
    pub tax_amount: Money,
    /// Time of purchase.
    pub created_at: DateTime<Utc>,
    /// Time of the last change.
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(value: Order) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id.to_string(),
            course_id: value.course_id,
            course: value.course_title,
            coupon: value.coupon_code,
            amount: value.amount,
            tax_amount: value.tax_amount,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Purchase body. The course is named by id or, failing that, by title.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderBody {
    /// Course id; takes precedence over `courseTitle`.
    pub course_id: Option<String>,
    /// Exact course title.
    pub course_title: Option<String>,
    /// Optional coupon code.
    pub coupon_code: Option<String>,
}

impl TryFrom<OrderBody> for PlaceOrderRequest {
    type Error = Error;

    fn try_from(body: OrderBody) -> Result<Self, Self::Error> {
        let course = match body.course_id {
            Some(raw) => CourseSelector::Id(parse_uuid(&raw, FieldName::new("courseId"))?),
            None => CourseSelector::Title(require(
                body.course_title,
                FieldName::new("courseTitle"),
            )?),
        };
        Ok(Self {
            course,
            coupon_code: body.coupon_code,
        })
    }
}

/// Buy a course from the account balance.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = OrderBody,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Order rejected", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Course or balance not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "placeOrder"
)]
#[post("/orders")]
pub async fn place_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OrderBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let request = PlaceOrderRequest::try_from(payload.into_inner())?;
    let order = state.orders.place_order(&actor, request).await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// The caller's orders.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Orders", body = [OrderResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<OrderResponse>>> {
    let actor = session.require_user_id()?;
    let orders = state.orders_query.list_orders(&actor).await?;
    Ok(web::Json(orders.into_iter().map(Into::into).collect()))
}

/// One of the caller's orders.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<OrderResponse>> {
    let actor = session.require_user_id()?;
    let order = state
        .orders_query
        .get_order(&actor, path.into_inner())
        .await?;
    Ok(web::Json(order.into()))
}
