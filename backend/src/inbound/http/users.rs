//! Account HTTP handlers.
//!
//! ```text
//! POST /api/v1/users/register                {"username":"ada","email":"ada@example.com",...}
//! POST /api/v1/users/verify                  {"userId":"...","code":"123456"}
//! POST /api/v1/users/login                   {"username":"ada","password":"..."}
//! POST /api/v1/users/logout
//! GET  /api/v1/users/profile
//! PUT  /api/v1/users/profile                 {"bio":"..."}
//! GET  /api/v1/users/balance
//! POST /api/v1/users/balance/add             {"amount":"25.00"}
//! POST /api/v1/users/password_reset          {"email":"ada@example.com"}
//! POST /api/v1/users/password_reset/confirm  {"email":"...","token":"...","password":"..."}
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{ConfirmPasswordResetRequest, RegisterRequest};
use crate::domain::{
    AccountBalance, Error, LoginCredentials, LoginValidationError, Money, ProfileUpdate, Role,
    User, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    DecimalInput, FieldName, parse_amount, parse_uuid, require,
};

/// Sign-up request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    /// Unique login name.
    pub username: Option<String>,
    /// Address receiving the verification code.
    pub email: Option<String>,
    /// Plain-text password.
    pub password: Option<String>,
    /// Must equal `password`.
    pub confirm_password: Option<String>,
    /// `student` (default) or `instructor`.
    pub role: Option<String>,
}

/// Acknowledgement returned by account operations.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

/// Sign-up response.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Id of the new account.
    pub user_id: String,
}

/// Email verification body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyBody {
    /// Account being verified.
    pub user_id: Option<String>,
    /// Six-digit code from the verification email.
    pub code: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

/// Public projection of a user account.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// Account id.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Student or instructor.
    pub role: Role,
    /// Whether the email has been confirmed.
    pub is_verified: bool,
    /// Free-form biography.
    pub bio: Option<String>,
    /// Path or URL of the avatar.
    pub profile_picture: Option<String>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.into(),
            email: user.email.into(),
            role: user.role,
            is_verified: user.is_verified,
            bio: user.bio,
            profile_picture: user.profile_picture,
        }
    }
}

/// Profile update body. Absent fields are left untouched.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    /// Replacement biography.
    pub bio: Option<String>,
    /// Replacement avatar path or URL.
    pub profile_picture: Option<String>,
}

/// Current balance.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// Available funds.
    #[schema(value_type = String, example = "50.00")]
    pub balance: Money,
    /// Time of the last change.
    pub updated_at: DateTime<Utc>,
}

impl From<AccountBalance> for BalanceResponse {
    fn from(value: AccountBalance) -> Self {
        Self {
            balance: value.balance,
            updated_at: value.updated_at,
        }
    }
}

/// Balance top-up body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopUpBody {
    /// Amount to credit, at most two decimal places.
    #[schema(value_type = Option<String>, example = "49.99")]
    pub amount: Option<DecimalInput>,
}

/// Password reset request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetBody {
    /// Address of the account to reset.
    pub email: Option<String>,
}

/// Password reset confirmation body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirmBody {
    /// Address of the account to reset.
    pub email: Option<String>,
    /// Token from the reset email.
    pub token: Option<String>,
    /// New password.
    pub password: Option<String>,
}

fn parse_role(raw: Option<String>) -> Result<Role, Error> {
    let Some(raw) = raw else {
        return Ok(Role::default());
    };
    Role::from_str(raw.trim()).map_err(|_| {
        Error::invalid_request(format!("\"{raw}\" is not a valid choice."))
            .with_details(json!({ "field": "role", "code": "invalid_choice" }))
    })
}

fn parse_register_body(body: RegisterBody) -> Result<RegisterRequest, Error> {
    Ok(RegisterRequest {
        username: require(body.username, FieldName::new("username"))?,
        email: require(body.email, FieldName::new("email"))?,
        password: require(body.password, FieldName::new("password"))?,
        confirm_password: require(body.confirm_password, FieldName::new("confirmPassword"))?,
        role: parse_role(body.role)?,
    })
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Create an account and email a verification code.
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterBody,
    responses(
        (status = 201, description = "Account created", body = RegisteredResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or email taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_register_body(payload.into_inner())?;
    let user_id = state.accounts.register(request).await?;
    Ok(HttpResponse::Created().json(RegisteredResponse {
        message: "User registered successfully. A verification code has been sent to your email."
            .to_owned(),
        user_id: user_id.to_string(),
    }))
}

/// Confirm an email address with the emailed code.
#[utoipa::path(
    post,
    path = "/api/v1/users/verify",
    request_body = VerifyBody,
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 400, description = "Missing, expired, or wrong code", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "verifyEmail",
    security([])
)]
#[post("/users/verify")]
pub async fn verify(
    state: web::Data<HttpState>,
    payload: web::Json<VerifyBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    let VerifyBody { user_id, code } = payload.into_inner();
    let raw_id = require(user_id, FieldName::new("userId"))?;
    let user_id = UserId::from_uuid(parse_uuid(&raw_id, FieldName::new("userId"))?);
    let code = require(code, FieldName::new("code"))?;
    state.accounts.verify_email(&user_id, &code).await?;
    Ok(web::Json(MessageResponse::new(
        "Verification successful! Your email has been verified.",
    )))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request or unverified email", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginBody>,
) -> ApiResult<HttpResponse> {
    let LoginBody { username, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&username, &password)
        .map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    responses((status = 204, description = "Session ended")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/users/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.end();
    HttpResponse::NoContent().finish()
}

/// Fetch the caller's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "getProfile"
)]
#[get("/users/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let user = state.accounts_query.fetch_profile(&user_id).await?;
    Ok(web::Json(user.into()))
}

/// Edit bio and profile picture. Username and email are read-only.
#[utoipa::path(
    put,
    path = "/api/v1/users/profile",
    request_body = ProfileBody,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/users/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileBody>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let ProfileBody {
        bio,
        profile_picture,
    } = payload.into_inner();
    let user = state
        .accounts
        .update_profile(
            &user_id,
            ProfileUpdate {
                bio,
                profile_picture,
            },
        )
        .await?;
    Ok(web::Json(user.into()))
}

/// Fetch the caller's balance.
#[utoipa::path(
    get,
    path = "/api/v1/users/balance",
    responses(
        (status = 200, description = "Balance", body = BalanceResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No balance", body = Error)
    ),
    tags = ["users"],
    operation_id = "getBalance"
)]
#[get("/users/balance")]
pub async fn get_balance(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<BalanceResponse>> {
    let user_id = session.require_user_id()?;
    let balance = state.accounts_query.fetch_balance(&user_id).await?;
    Ok(web::Json(balance.into()))
}

/// Add funds to the caller's balance.
#[utoipa::path(
    post,
    path = "/api/v1/users/balance/add",
    request_body = TopUpBody,
    responses(
        (status = 200, description = "New balance", body = BalanceResponse),
        (status = 400, description = "Invalid amount", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "addBalance"
)]
#[post("/users/balance/add")]
pub async fn add_balance(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TopUpBody>,
) -> ApiResult<web::Json<BalanceResponse>> {
    let user_id = session.require_user_id()?;
    let field = FieldName::new("amount");
    let amount = parse_amount(&require(payload.into_inner().amount, field)?, field)?;
    let balance = state.accounts.top_up_balance(&user_id, amount).await?;
    Ok(web::Json(balance.into()))
}

/// Email a password reset token.
#[utoipa::path(
    post,
    path = "/api/v1/users/password_reset",
    request_body = PasswordResetBody,
    responses(
        (status = 200, description = "Token sent", body = MessageResponse),
        (status = 400, description = "Unknown email", body = Error)
    ),
    tags = ["users"],
    operation_id = "requestPasswordReset",
    security([])
)]
#[post("/users/password_reset")]
pub async fn request_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<PasswordResetBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    let email = require(payload.into_inner().email, FieldName::new("email"))?;
    state.accounts.request_password_reset(&email).await?;
    Ok(web::Json(MessageResponse::new(
        "Password reset token sent to your email.",
    )))
}

/// Set a new password using an emailed token.
#[utoipa::path(
    post,
    path = "/api/v1/users/password_reset/confirm",
    request_body = PasswordResetConfirmBody,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid email, token, or password", body = Error)
    ),
    tags = ["users"],
    operation_id = "confirmPasswordReset",
    security([])
)]
#[post("/users/password_reset/confirm")]
pub async fn confirm_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<PasswordResetConfirmBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    let PasswordResetConfirmBody {
        email,
        token,
        password,
    } = payload.into_inner();
    let request = ConfirmPasswordResetRequest {
        email: require(email, FieldName::new("email"))?,
        token: require(token, FieldName::new("token"))?,
        new_password: require(password, FieldName::new("password"))?,
    };
    state.accounts.confirm_password_reset(request).await?;
    Ok(web::Json(MessageResponse::new(
        "Password has been reset successfully.",
    )))
}

#[cfg(test)]
mod tests;
