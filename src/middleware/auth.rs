use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};

use crate::access::{self, Actor};
use crate::auth;
use crate::config::SecurityConfig;
use crate::database::models::{Role, User};
use crate::error::ApiError;
use crate::services::UserService;
use crate::state::AppState;

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// The logged in user, loaded fresh from the database for each request.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }

    pub fn require_role(&self, allowed: &[Role]) -> Result<Actor, ApiError> {
        let actor = self.actor();
        access::require_role(&actor, allowed)?;
        Ok(actor)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Already resolved by a router-level gate
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = extract_token(&parts.headers).ok_or_else(ApiError::not_authorized)?;
        let claims = auth::validate_jwt(&token, &state.config.security)?;
        let user = UserService::new(&state.pool)
            .find(claims.sub)
            .await?
            .ok_or_else(ApiError::not_authorized)?;

        Ok(CurrentUser(user))
    }
}

/// Router-level gate for admin-only route groups.
pub async fn require_admin(user: CurrentUser, mut request: Request, next: Next) -> Result<Response, ApiError> {
    user.require_role(&[Role::Admin])?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Bearer token from `Authorization`, falling back to the `token` cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some((scheme, token)) = value.trim().split_once(' ') {
            if scheme.eq_ignore_ascii_case("bearer") {
                let token = token.trim();
                return (!token.is_empty()).then(|| token.to_string());
            }
        }
    }

    CookieJar::from_headers(headers)
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Session cookie carrying a freshly issued token.
pub fn token_cookie(token: String, security: &SecurityConfig) -> Cookie<'static> {
    let lifetime = Duration::days(security.cookie_expiry_days);
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(security.secure_cookies)
        .max_age(lifetime)
        .expires(OffsetDateTime::now_utc() + lifetime)
        .build()
}

/// Removal cookie for the session; emitted whether or not the request carried one.
pub fn cleared_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie
}
