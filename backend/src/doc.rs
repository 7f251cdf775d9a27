//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler plus the health probes.
//! Request and response bodies are collected from the handler annotations;
//! only the shared error payload is listed explicitly. The document is
//! served by Swagger UI in debug builds and exported by `openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::{
    categories, coupons, courses, health, lessons, orders, reviews, users,
};

/// Cookie name documented for the session scheme.
const DOCUMENTED_SESSION_COOKIE: &str = "edunexus_session";

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                DOCUMENTED_SESSION_COOKIE,
                "Session cookie issued by POST /api/v1/users/login.",
            ))),
        );
    }
}

/// OpenAPI document for the marketplace API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "EduNexus API",
        description = "Course marketplace: accounts and balances, catalogue, lessons, reviews, coupons, and orders."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        users::register,
        users::verify,
        users::login,
        users::logout,
        users::get_profile,
        users::update_profile,
        users::get_balance,
        users::add_balance,
        users::request_password_reset,
        users::confirm_password_reset,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        courses::list_courses,
        courses::popular_courses,
        courses::list_enrollments,
        courses::get_course,
        courses::get_enrollment,
        courses::create_course,
        courses::update_course,
        courses::delete_course,
        lessons::list_lessons,
        lessons::get_lesson,
        lessons::create_lesson,
        lessons::update_lesson,
        lessons::delete_lesson,
        reviews::list_reviews,
        reviews::get_review,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        orders::place_order,
        orders::list_orders,
        orders::get_order,
        coupons::list_coupons,
        coupons::get_coupon,
        coupons::create_coupon,
        coupons::update_coupon,
        coupons::delete_coupon,
        health::ready,
        health::live,
    ),
    components(schemas(Error, ErrorCode)),
    tags(
        (name = "users", description = "Accounts, sessions, and balances"),
        (name = "categories", description = "Course categories"),
        (name = "courses", description = "Catalogue, popularity, and enrollments"),
        (name = "lessons", description = "Lessons within a course"),
        (name = "reviews", description = "Course reviews"),
        (name = "orders", description = "Purchases paid from the account balance"),
        (name = "coupons", description = "Instructor discount coupons"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    #[rstest]
    #[case("/api/v1/users/register")]
    #[case("/api/v1/courses/popular-courses")]
    #[case("/api/v1/courses/{id}/reviews/{review_id}")]
    #[case("/api/v1/orders/{id}")]
    #[case("/api/v1/coupons")]
    #[case("/health/ready")]
    fn document_lists_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn error_schema_exposes_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let Some(RefOr::T(Schema::Object(error))) = schemas.get("Error") else {
            panic!("Error schema should be an inline object");
        };
        assert!(error.properties.contains_key("code"));
        assert!(error.properties.contains_key("message"));
    }

    fn field_type(schema: RefOr<Schema>, field: &str) -> serde_json::Value {
        let json = serde_json::to_value(schema).expect("schema serialises");
        json["properties"][field]["type"].clone()
    }

    #[rstest]
    #[case(courses::CourseBody::schema(), "price")]
    #[case(coupons::CouponBody::schema(), "minOrderValue")]
    #[case(users::TopUpBody::schema(), "amount")]
    fn decimal_fields_are_documented_as_strings(
        #[case] schema: RefOr<Schema>,
        #[case] field: &str,
    ) {
        let ty = field_type(schema, field);
        let is_string = ty == "string"
            || ty
                .as_array()
                .is_some_and(|types| types.contains(&serde_json::json!("string")));
        assert!(is_string, "{field} documented as {ty}");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
