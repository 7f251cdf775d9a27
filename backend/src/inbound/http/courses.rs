//! Course catalogue and enrollment HTTP handlers.
//!
//! ```text
//! GET    /api/v1/courses?title=rust&category=prog&instructor=ada&tags=async,web&min_rating=4
//! POST   /api/v1/courses
//! GET    /api/v1/courses/popular-courses
//! GET    /api/v1/courses/enrollments
//! GET    /api/v1/courses/{id}
//! PUT    /api/v1/courses/{id}
//! DELETE /api/v1/courses/{id}
//! GET    /api/v1/courses/{id}/enrollment
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::CourseRequest;
use crate::domain::{
    Course, CourseFilter, Enrollment, Error, MinRating, Money, PopularCourse,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::categories::{CategoryResponse, TagResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{DecimalInput, FieldName, parse_amount, require};

/// Course as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    /// Course id.
    pub id: Uuid,
    /// Course title.
    pub title: String,
    /// Course description.
    pub description: String,
    /// Price before discount and tax.
    #[schema(value_type = String, example = "49.99")]
    pub price: Money,
    /// Instructor account id.
    pub instructor_id: String,
    /// Instructor username.
    pub instructor: String,
    /// Category, if any.
    pub category: Option<CategoryResponse>,
    /// Tags in the order given at creation.
    pub tags: Vec<TagResponse>,
    /// Average review rating with two decimals; absent without reviews.
    #[schema(example = "4.50")]
    pub average_rating: Option<String>,
    /// Number of reviews.
    pub review_count: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            price: course.price,
            instructor_id: course.instructor_id.to_string(),
            instructor: course.instructor_username,
            category: course.category.map(Into::into),
            tags: course.tags.into_iter().map(Into::into).collect(),
            average_rating: course
                .rating
                .average_hundredths()
                .map(|hundredths| Money::from_cents(hundredths).to_string()),
            review_count: course.rating.count,
            created_at: course.created_at,
        }
    }
}

/// Course ranked by enrollment count.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PopularCourseResponse {
    /// The ranked course.
    #[serde(flatten)]
    pub course: CourseResponse,
    /// Number of enrolled students.
    pub enrollment_count: i64,
}

impl From<PopularCourse> for PopularCourseResponse {
    fn from(value: PopularCourse) -> Self {
        Self {
            course: value.course.into(),
            enrollment_count: value.enrollment_count,
        }
    }
}

/// The caller's access to a purchased course.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    /// The purchased course.
    pub course: CourseResponse,
    /// Time of purchase.
    pub enrolled_at: DateTime<Utc>,
    /// Completion percentage.
    pub progress: f64,
    /// Whether the course is finished.
    pub completed: bool,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(value: Enrollment) -> Self {
        Self {
            course: value.course.into(),
            enrolled_at: value.enrolled_at,
            progress: value.progress,
            completed: value.completed,
        }
    }
}

/// Catalogue filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseListQuery {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Case-insensitive substring of the category name.
    pub category: Option<String>,
    /// Case-insensitive substring of the instructor's username.
    pub instructor: Option<String>,
    /// Comma-separated tag names; any match qualifies.
    pub tags: Option<String>,
    /// Minimum average rating.
    pub min_rating: Option<String>,
}

impl TryFrom<CourseListQuery> for CourseFilter {
    type Error = Error;

    fn try_from(query: CourseListQuery) -> Result<Self, Self::Error> {
        let blank_to_none =
            |value: Option<String>| value.filter(|raw| !raw.trim().is_empty());
        Ok(Self {
            title: blank_to_none(query.title),
            category: blank_to_none(query.category),
            instructor: blank_to_none(query.instructor),
            tags: query
                .tags
                .as_deref()
                .map(Self::parse_tags)
                .unwrap_or_default(),
            min_rating: blank_to_none(query.min_rating)
                .map(|raw| MinRating::parse(&raw))
                .transpose()?,
        })
    }
}

/// Course create/replace body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseBody {
    /// Course title.
    pub title: Option<String>,
    /// Course description.
    pub description: Option<String>,
    /// Course price, at most two decimal places.
    #[schema(value_type = Option<String>, example = "49.99")]
    pub price: Option<DecimalInput>,
    /// Category name; created when missing.
    pub category: Option<String>,
    /// Tag names; created when missing.
    #[serde(default)]
    pub tags: Vec<String>,
}

fn parse_course_body(body: CourseBody) -> Result<CourseRequest, Error> {
    let price_field = FieldName::new("price");
    Ok(CourseRequest {
        title: require(body.title, FieldName::new("title"))?,
        description: require(body.description, FieldName::new("description"))?,
        price: parse_amount(&require(body.price, price_field)?, price_field)?,
        category: body.category,
        tags: body.tags,
    })
}

fn into_responses<T, R: From<T>>(items: Vec<T>) -> web::Json<Vec<R>> {
    web::Json(items.into_iter().map(R::from).collect())
}

/// List courses, optionally filtered.
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    params(CourseListQuery),
    responses(
        (status = 200, description = "Courses", body = [CourseResponse]),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["courses"],
    operation_id = "listCourses",
    security([])
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    query: web::Query<CourseListQuery>,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    let filter = CourseFilter::try_from(query.into_inner())?;
    let courses = state.courses_query.list_courses(filter).await?;
    Ok(into_responses(courses))
}

/// Courses ranked by enrollment count.
#[utoipa::path(
    get,
    path = "/api/v1/courses/popular-courses",
    responses((status = 200, description = "Ranked courses", body = [PopularCourseResponse])),
    tags = ["courses"],
    operation_id = "popularCourses",
    security([])
)]
#[get("/courses/popular-courses")]
pub async fn popular_courses(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<PopularCourseResponse>>> {
    let ranked = state.courses_query.popular_courses().await?;
    Ok(into_responses(ranked))
}

/// The caller's enrollments.
#[utoipa::path(
    get,
    path = "/api/v1/courses/enrollments",
    responses(
        (status = 200, description = "Enrollments", body = [EnrollmentResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["courses"],
    operation_id = "listEnrollments"
)]
#[get("/courses/enrollments")]
pub async fn list_enrollments(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<EnrollmentResponse>>> {
    let user_id = session.require_user_id()?;
    let enrollments = state.courses_query.list_enrollments(&user_id).await?;
    Ok(into_responses(enrollments))
}

/// Fetch one course.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course", body = CourseResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["courses"],
    operation_id = "getCourse",
    security([])
)]
#[get("/courses/{id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<CourseResponse>> {
    let course = state.courses_query.get_course(path.into_inner()).await?;
    Ok(web::Json(course.into()))
}

/// The caller's enrollment in one course.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/enrollment",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Enrollment", body = EnrollmentResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not enrolled", body = Error)
    ),
    tags = ["courses"],
    operation_id = "getEnrollment"
)]
#[get("/courses/{id}/enrollment")]
pub async fn get_enrollment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<EnrollmentResponse>> {
    let user_id = session.require_user_id()?;
    let enrollment = state
        .courses_query
        .get_enrollment(&user_id, path.into_inner())
        .await?;
    Ok(web::Json(enrollment.into()))
}

/// Publish a course. Instructors only.
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CourseBody,
    responses(
        (status = 201, description = "Created", body = CourseResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an instructor", body = Error)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CourseBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let request = parse_course_body(payload.into_inner())?;
    let course = state.courses.create_course(&actor, request).await?;
    Ok(HttpResponse::Created().json(CourseResponse::from(course)))
}

/// Replace a course. Owning instructor only.
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = CourseBody,
    responses(
        (status = 200, description = "Updated", body = CourseResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["courses"],
    operation_id = "updateCourse"
)]
#[put("/courses/{id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<CourseBody>,
) -> ApiResult<web::Json<CourseResponse>> {
    let actor = session.require_user_id()?;
    let request = parse_course_body(payload.into_inner())?;
    let course = state
        .courses
        .update_course(&actor, path.into_inner(), request)
        .await?;
    Ok(web::Json(course.into()))
}

/// Delete a course. Owning instructor only.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["courses"],
    operation_id = "deleteCourse"
)]
#[delete("/courses/{id}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    state.courses.delete_course(&actor, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "courses_tests.rs"]
mod tests;
