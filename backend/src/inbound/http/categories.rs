//! Category HTTP handlers.
//!
//! ```text
//! GET    /api/v1/categories?search=prog&name=Programming
//! POST   /api/v1/categories      {"name":"Programming","parentId":null}
//! GET    /api/v1/categories/{id}
//! PUT    /api/v1/categories/{id}
//! DELETE /api/v1/categories/{id}
//! ```
//!
//! Reads are public; writes require an administrator session.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::CategoryRequest;
use crate::domain::{Category, CategoryFilter, Error, Tag};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid, require};

/// Category as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    /// Category id.
    pub id: Uuid,
    /// Unique name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Parent category, if nested.
    pub parent_id: Option<Uuid>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(value: Category) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            parent_id: value.parent_id,
            created_at: value.created_at,
        }
    }
}

/// Tag as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    /// Tag id.
    pub id: Uuid,
    /// Tag name.
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(value: Tag) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

/// Category list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryListQuery {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    /// Exact name.
    pub name: Option<String>,
}

/// Category create/replace body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBody {
    /// Unique name.
    pub name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Parent category id.
    pub parent_id: Option<String>,
}

fn parse_category_body(body: CategoryBody) -> Result<CategoryRequest, Error> {
    let field = FieldName::new("parentId");
    Ok(CategoryRequest {
        name: require(body.name, FieldName::new("name"))?,
        description: body.description,
        parent_id: body
            .parent_id
            .map(|raw| parse_uuid(&raw, field))
            .transpose()?,
    })
}

/// List categories.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(CategoryListQuery),
    responses((status = 200, description = "Categories", body = [CategoryResponse])),
    tags = ["categories"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    query: web::Query<CategoryListQuery>,
) -> ApiResult<web::Json<Vec<CategoryResponse>>> {
    let CategoryListQuery { search, name } = query.into_inner();
    let categories = state
        .categories_query
        .list_categories(CategoryFilter { search, name })
        .await?;
    Ok(web::Json(categories.into_iter().map(Into::into).collect()))
}

/// Fetch one category.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = CategoryResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["categories"],
    operation_id = "getCategory",
    security([])
)]
#[get("/categories/{id}")]
pub async fn get_category(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<CategoryResponse>> {
    let category = state.categories_query.get_category(path.into_inner()).await?;
    Ok(web::Json(category.into()))
}

/// Create a category. Admins only.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CategoryBody,
    responses(
        (status = 201, description = "Created", body = CategoryResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an administrator", body = Error),
        (status = 409, description = "Name taken", body = Error)
    ),
    tags = ["categories"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CategoryBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let request = parse_category_body(payload.into_inner())?;
    let category = state.categories.create_category(&actor, request).await?;
    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

/// Replace a category. Admins only.
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CategoryBody,
    responses(
        (status = 200, description = "Updated", body = CategoryResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not an administrator", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["categories"],
    operation_id = "updateCategory"
)]
#[put("/categories/{id}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<CategoryBody>,
) -> ApiResult<web::Json<CategoryResponse>> {
    let actor = session.require_user_id()?;
    let request = parse_category_body(payload.into_inner())?;
    let category = state
        .categories
        .update_category(&actor, path.into_inner(), request)
        .await?;
    Ok(web::Json(category.into()))
}

/// Delete a category. Admins only.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not an administrator", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["categories"],
    operation_id = "deleteCategory"
)]
#[delete("/categories/{id}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    state
        .categories
        .delete_category(&actor, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
