//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use permissions::Principal;
use serde_json::json;
use time::Duration;
use tracing::{error, info, warn};

use crate::{
    error::{AuthError, AuthResult},
    middleware::session_middleware,
    models::{CreatedUser, LoginRequest, NewUser, UserResponse},
    repositories::{CreateOutcome, user::verify_password},
    state::AppState,
    validation::validate_new_user,
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/user", get(current_user))
        .route("/auth/permissions", get(current_permissions))
        .route("/auth/users", post(create_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse> {
    info!("Login attempt for user: {}", payload.username);

    if !state.rate_limiter.is_allowed(&payload.username).await {
        warn!("Login for {} rejected by rate limiter", payload.username);
        return Err(AuthError::TooManyAttempts);
    }

    let credentials = state
        .user_repository
        .find_credentials(&payload.username)
        .await
        .map_err(|e| {
            error!("Failed to load user: {}", e);
            AuthError::InternalServerError
        })?;

    let user = match credentials {
        Some(c) if verify_password(&payload.password, &c.password_hash) => c.user,
        _ => {
            return Err(AuthError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }
    };

    state.rate_limiter.reset(&payload.username).await;

    let token = state
        .principals
        .sessions()
        .create(user.id)
        .await
        .map_err(|e| {
            error!("Failed to store session: {}", e);
            AuthError::InternalServerError
        })?;

    let cookie = session_cookie(
        &state.cookie_name,
        token,
        state.principals.sessions().ttl_seconds(),
    );

    info!("User {} logged in", user.username);
    Ok((jar.add(cookie), Json(UserResponse::from(user))))
}

/// Session cookie living as long as the stored session
fn session_cookie(name: &str, token: String, ttl_seconds: u64) -> Cookie<'static> {
    let max_age = Duration::seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX));

    Cookie::build((name.to_string(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Logout endpoint. Succeeds whether or not a session existed.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> AuthResult<impl IntoResponse> {
    if let Some(cookie) = jar.get(&state.cookie_name) {
        state
            .principals
            .sessions()
            .delete(cookie.value())
            .await
            .map_err(|e| {
                error!("Failed to delete session: {}", e);
                AuthError::InternalServerError
            })?;
    }

    let removal = Cookie::build((state.cookie_name.clone(), "")).path("/");

    Ok((
        jar.remove(removal),
        Json(json!({"message": "Logged out successfully"})),
    ))
}

/// Current session user, or 401 for anonymous callers
pub async fn current_user(Extension(principal): Extension<Principal>) -> AuthResult<impl IntoResponse> {
    match principal {
        Principal::Authenticated(user) => Ok(Json(UserResponse::from(user))),
        Principal::Anonymous => Err(AuthError::unauthorized()),
    }
}

/// Capability flags of the current caller
pub async fn current_permissions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> impl IntoResponse {
    Json(state.permissions.resolve(&principal))
}

/// Create an account. Managers only.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<NewUser>,
) -> AuthResult<impl IntoResponse> {
    if !principal.is_authenticated() {
        return Err(AuthError::unauthorized());
    }
    if !state.permissions.resolve(&principal).is_manager {
        return Err(AuthError::Forbidden(
            "Only managers can create users".to_string(),
        ));
    }

    validate_new_user(&payload).map_err(AuthError::BadRequest)?;

    let outcome = state.user_repository.create(&payload).await.map_err(|e| {
        error!("Failed to create user: {}", e);
        AuthError::InternalServerError
    })?;

    match outcome {
        CreateOutcome::Created(user, created_at) => Ok((
            StatusCode::CREATED,
            Json(CreatedUser {
                user: UserResponse::from(user),
                created_at,
            }),
        )),
        CreateOutcome::UsernameTaken => Err(AuthError::BadRequest(format!(
            "A user with username {} already exists",
            payload.username
        ))),
    }
}
