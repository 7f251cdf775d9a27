//! Course review HTTP handlers.
//!
//! Reviews are public to read. Writing one needs a session; ownership and the
//! instructor self-review rule are enforced by the review service.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::ReviewRequest;
use crate::domain::{Error, Review};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require};

/// Review as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    /// Review id.
    pub id: Uuid,
    /// Reviewed course.
    pub course_id: Uuid,
    /// Author account id.
    pub user_id: String,
    /// Author username.
    pub username: String,
    /// Score from 1 to 5.
    #[schema(minimum = 1, maximum = 5)]
    pub rating: u8,
    /// Review text.
    pub comment: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(value: Review) -> Self {
        Self {
            id: value.id,
            course_id: value.course_id,
            user_id: value.user_id.to_string(),
            username: value.username,
            rating: value.rating.value(),
            comment: value.comment,
            created_at: value.created_at,
        }
    }
}

/// Review create/replace body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    /// Score from 1 to 5.
    pub rating: Option<i64>,
    /// Review text; may be empty.
    #[serde(default)]
    pub comment: String,
}

impl TryFrom<ReviewBody> for ReviewRequest {
    type Error = Error;

    fn try_from(body: ReviewBody) -> Result<Self, Self::Error> {
        Ok(Self {
            rating: require(body.rating, FieldName::new("rating"))?,
            comment: body.comment,
        })
    }
}

/// List the reviews of a course.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/reviews",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Reviews", body = [ReviewResponse]),
        (status = 404, description = "Course not found", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "listReviews",
    security([])
)]
#[get("/courses/{id}/reviews")]
pub async fn list_reviews(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<ReviewResponse>>> {
    let reviews = state.reviews_query.list_reviews(path.into_inner()).await?;
    Ok(web::Json(reviews.into_iter().map(Into::into).collect()))
}

/// Fetch one review.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/reviews/{review_id}",
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("review_id" = Uuid, Path, description = "Review id")
    ),
    responses(
        (status = 200, description = "Review", body = ReviewResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "getReview",
    security([])
)]
#[get("/courses/{id}/reviews/{review_id}")]
pub async fn get_review(
    state: web::Data<HttpState>,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<web::Json<ReviewResponse>> {
    let (course_id, review_id) = path.into_inner();
    let review = state.reviews_query.get_review(course_id, review_id).await?;
    Ok(web::Json(review.into()))
}

/// Review a course.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/reviews",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = ReviewBody,
    responses(
        (status = 201, description = "Created", body = ReviewResponse),
        (status = 400, description = "Invalid rating or own course", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Course not found", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/courses/{id}/reviews")]
pub async fn create_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<ReviewBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let request = ReviewRequest::try_from(payload.into_inner())?;
    let review = state
        .reviews
        .create_review(&actor, path.into_inner(), request)
        .await?;
    Ok(HttpResponse::Created().json(ReviewResponse::from(review)))
}

/// Edit one's own review.
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}/reviews/{review_id}",
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("review_id" = Uuid, Path, description = "Review id")
    ),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Updated", body = ReviewResponse),
        (status = 400, description = "Invalid rating", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "updateReview"
)]
#[put("/courses/{id}/reviews/{review_id}")]
pub async fn update_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(Uuid, Uuid)>,
    payload: web::Json<ReviewBody>,
) -> ApiResult<web::Json<ReviewResponse>> {
    let actor = session.require_user_id()?;
    let (course_id, review_id) = path.into_inner();
    let request = ReviewRequest::try_from(payload.into_inner())?;
    let review = state
        .reviews
        .update_review(&actor, course_id, review_id, request)
        .await?;
    Ok(web::Json(review.into()))
}

/// Delete one's own review.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}/reviews/{review_id}",
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("review_id" = Uuid, Path, description = "Review id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
#[delete("/courses/{id}/reviews/{review_id}")]
pub async fn delete_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let (course_id, review_id) = path.into_inner();
    state
        .reviews
        .delete_review(&actor, course_id, review_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
