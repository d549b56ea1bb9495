//! Session middleware resolving the caller of each request

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;

use crate::{caller::Caller, error::ApiError, state::AppState};

/// Attach the [`Caller`] to the request extensions.
///
/// Requests without a valid session continue as anonymous; handlers decide
/// whether that is enough.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());
    let token = jar.get(&state.cookie_name).map(|c| c.value().to_string());

    let principal = state
        .principals
        .resolve(token.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to resolve session: {}", e);
            ApiError::InternalServerError
        })?;

    req.extensions_mut()
        .insert(Caller::new(principal, &state.permissions));

    Ok(next.run(req).await)
}
