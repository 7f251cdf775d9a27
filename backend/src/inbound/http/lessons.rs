//! Lesson HTTP handlers, nested under their course.
//!
//! Reading lessons requires a session; writing them requires owning the
//! course, which the lesson service enforces.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::LessonRequest;
use crate::domain::{Error, Lesson};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require};

/// Lesson as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonResponse {
    /// Lesson id.
    pub id: Uuid,
    /// Owning course.
    pub course_id: Uuid,
    /// Lesson title.
    pub title: String,
    /// Stored path or URL of the lesson video.
    pub video: Option<String>,
    /// Lesson text.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<Lesson> for LessonResponse {
    fn from(value: Lesson) -> Self {
        Self {
            id: value.id,
            course_id: value.course_id,
            title: value.title,
            video: value.video,
            content: value.content,
            created_at: value.created_at,
        }
    }
}

/// Lesson create/replace body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonBody {
    /// Lesson title.
    pub title: Option<String>,
    /// Path or URL of uploaded media. Blank clears it.
    pub video: Option<String>,
    /// Lesson text.
    pub content: Option<String>,
}

impl TryFrom<LessonBody> for LessonRequest {
    type Error = Error;

    fn try_from(body: LessonBody) -> Result<Self, Self::Error> {
        Ok(Self {
            title: require(body.title, FieldName::new("title"))?,
            video: body.video.filter(|video| !video.trim().is_empty()),
            content: require(body.content, FieldName::new("content"))?,
        })
    }
}

/// List the lessons of a course.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/lessons",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Lessons", body = [LessonResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Course not found", body = Error)
    ),
    tags = ["lessons"],
    operation_id = "listLessons"
)]
#[get("/courses/{id}/lessons")]
pub async fn list_lessons(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<LessonResponse>>> {
    session.require_user_id()?;
    let lessons = state.lessons_query.list_lessons(path.into_inner()).await?;
    Ok(web::Json(lessons.into_iter().map(Into::into).collect()))
}

/// Fetch one lesson.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/lessons/{lesson_id}",
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("lesson_id" = Uuid, Path, description = "Lesson id")
    ),
    responses(
        (status = 200, description = "Lesson", body = LessonResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["lessons"],
    operation_id = "getLesson"
)]
#[get("/courses/{id}/lessons/{lesson_id}")]
pub async fn get_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<web::Json<LessonResponse>> {
    session.require_user_id()?;
    let (course_id, lesson_id) = path.into_inner();
    let lesson = state.lessons_query.get_lesson(course_id, lesson_id).await?;
    Ok(web::Json(lesson.into()))
}

/// Add a lesson to a course.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/lessons",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = LessonBody,
    responses(
        (status = 201, description = "Created", body = LessonResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not the course owner", body = Error),
        (status = 404, description = "Course not found", body = Error)
    ),
    tags = ["lessons"],
    operation_id = "createLesson"
)]
#[post("/courses/{id}/lessons")]
pub async fn create_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<LessonBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let request = LessonRequest::try_from(payload.into_inner())?;
    let lesson = state
        .lessons
        .create_lesson(&actor, path.into_inner(), request)
        .await?;
    Ok(HttpResponse::Created().json(LessonResponse::from(lesson)))
}

/// Replace a lesson.
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}/lessons/{lesson_id}",
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("lesson_id" = Uuid, Path, description = "Lesson id")
    ),
    request_body = LessonBody,
    responses(
        (status = 200, description = "Updated", body = LessonResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not the course owner", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["lessons"],
    operation_id = "updateLesson"
)]
#[put("/courses/{id}/lessons/{lesson_id}")]
pub async fn update_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(Uuid, Uuid)>,
    payload: web::Json<LessonBody>,
) -> ApiResult<web::Json<LessonResponse>> {
    let actor = session.require_user_id()?;
    let (course_id, lesson_id) = path.into_inner();
    let request = LessonRequest::try_from(payload.into_inner())?;
    let lesson = state
        .lessons
        .update_lesson(&actor, course_id, lesson_id, request)
        .await?;
    Ok(web::Json(lesson.into()))
}

/// Remove a lesson.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}/lessons/{lesson_id}",
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("lesson_id" = Uuid, Path, description = "Lesson id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the course owner", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["lessons"],
    operation_id = "deleteLesson"
)]
#[delete("/courses/{id}/lessons/{lesson_id}")]
pub async fn delete_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let (course_id, lesson_id) = path.into_inner();
    state
        .lessons
        .delete_lesson(&actor, course_id, lesson_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
