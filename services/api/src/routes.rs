//! API service routes

use axum::{Json, Router, middleware, response::IntoResponse, routing::get};
use serde_json::json;

use crate::{
    caller::Caller,
    error::{ApiError, ApiResult},
    middleware::session_middleware,
    state::AppState,
};

mod complaints;
mod directories;
mod machines;
mod maintenance;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(machines::router())
        .merge(maintenance::router())
        .merge(complaints::router())
        .merge(directories::router())
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
        "service": "api-service"
    }))
}

/// Reject records for machines the caller neither owns nor services
async fn ensure_machine_in_scope(
    state: &AppState,
    caller: &Caller,
    machine_id: i64,
) -> ApiResult<()> {
    let owners = state
        .machine_repository
        .owners(machine_id)
        .await
        .map_err(|e| ApiError::from_repository(e, "load machine owners"))?
        .ok_or_else(|| ApiError::BadRequest("Machine does not exist".to_string()))?;

    if caller
        .record_scope()
        .permits(owners.client_id, owners.service_organization_id)
    {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "Records can only be added for machines you own or service".to_string(),
        ))
    }
}
