use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Map, Value};

use crate::auth;
use crate::database::models::user::{
    CreateUser, ForgotPassword, LoginRequest, ResetPassword, UpdatePassword, UpdateUser,
};
use crate::database::models::{User, UserProfile};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::mailer;
use crate::middleware::auth::{cleared_cookie, token_cookie};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::CurrentUser;
use crate::services::UserService;
use crate::state::AppState;

/// `{success, token}` plus the session cookie.
fn token_response(state: &AppState, user: &User, status: StatusCode) -> Result<Response, ApiError> {
    let token = auth::generate_jwt(user.id, user.role(), &state.config.security)?;
    let jar = CookieJar::new().add(token_cookie(token.clone(), &state.config.security));
    Ok((
        status,
        jar,
        Json(json!({ "success": true, "token": token })),
    )
        .into_response())
}

/// POST /api/v1/auth/register
pub async fn register(State(state): State<AppState>, ApiJson(body): ApiJson<CreateUser>) -> Result<Response, ApiError> {
    let new = body.validate_registration()?;
    let user = UserService::new(&state.pool).create(new).await?;
    token_response(&state, &user, StatusCode::OK)
}

/// POST /api/v1/auth/login
pub async fn login(State(state): State<AppState>, ApiJson(body): ApiJson<LoginRequest>) -> Result<Response, ApiError> {
    let (email, password) = match (body.email, body.password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => (email, password),
        _ => return Err(ApiError::bad_request("Please provide an email and password")),
    };

    let user = UserService::new(&state.pool)
        .find_by_email(email.trim())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !auth::verify_password(password, user.password_hash.clone()).await? {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    token_response(&state, &user, StatusCode::OK)
}

/// GET /api/v1/auth/logout
pub async fn logout(jar: CookieJar) -> Response {
    (
        jar.add(cleared_cookie()),
        Json(json!({ "success": true, "data": Map::new() })),
    )
        .into_response()
}

/// GET /api/v1/auth/me
pub async fn me(user: CurrentUser) -> ApiResult<UserProfile> {
    Ok(ApiResponse::success(user.0.profile()))
}

/// PUT /api/v1/auth/updatedetails
pub async fn update_details(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(body): ApiJson<UpdateUser>,
) -> ApiResult<UserProfile> {
    let changes = body.validate_details()?;
    let updated = UserService::new(&state.pool).update(user.0.id, changes).await?;
    Ok(ApiResponse::success(updated.profile()))
}

/// PUT /api/v1/auth/updatepassword
pub async fn update_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(body): ApiJson<UpdatePassword>,
) -> Result<Response, ApiError> {
    let (current, new) = body.validate()?;
    if !auth::verify_password(current, user.0.password_hash.clone()).await? {
        return Err(ApiError::unauthorized("Password is incorrect"));
    }

    let updated = UserService::new(&state.pool).set_password(user.0.id, new).await?;
    token_response(&state, &updated, StatusCode::OK)
}

/// POST /api/v1/auth/forgotpassword
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ForgotPassword>,
) -> ApiResult<Value> {
    let email = body
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Please provide an email"))?;

    let users = UserService::new(&state.pool);
    let user = users
        .find_by_email(email.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("There is no user with that email"))?;

    let reset = auth::issue_reset_token();
    users
        .set_reset_token(user.id, Some(&reset.hashed), Some(reset.expires_at))
        .await?;

    let reset_url = format!(
        "{}/api/v1/auth/resetpassword/{}",
        state.config.server.public_url.trim_end_matches('/'),
        reset.token
    );
    if let Err(e) = state.mailer.send(mailer::reset_password_message(&user.email, &reset_url)).await {
        tracing::error!(user = %user.id, "Reset email failed: {}", e);
        users.set_reset_token(user.id, None, None).await?;
        return Err(ApiError::internal_server_error("Email could not be sent"));
    }

    Ok(ApiResponse::success(Value::String("Email sent".to_string())))
}

/// PUT /api/v1/auth/resetpassword/:resettoken
pub async fn reset_password(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
    ApiJson(body): ApiJson<ResetPassword>,
) -> Result<Response, ApiError> {
    let users = UserService::new(&state.pool);
    let user = users
        .find_by_reset_token(&auth::hash_reset_token(&token))
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid token"))?;

    let password = body.validate()?;
    let updated = users.set_password(user.id, password).await?;
    token_response(&state, &updated, StatusCode::OK)
}
