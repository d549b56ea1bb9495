//! Complaint endpoints

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use permissions::Capability;
use tracing::info;

use super::ensure_machine_in_scope;
use crate::{
    caller::Caller,
    error::{ApiError, ApiResult},
    models::{
        Page,
        complaint::{ComplaintPayload, ComplaintQuery},
    },
    query::Pagination,
    scope::Scope,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/complaints", get(list_complaints).post(create_complaint))
        .route("/complaints/statistics", get(complaint_statistics))
        .route(
            "/complaints/:id",
            get(get_complaint)
                .put(update_complaint)
                .delete(delete_complaint),
        )
}

/// List complaints about the machines in the caller's scope
pub async fn list_complaints(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ComplaintQuery>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::ViewComplaints)?;

    let pagination = Pagination::new(query.page, query.limit);
    let (complaints, total) = state
        .complaint_repository
        .list(&query, caller.record_scope(), pagination)
        .await
        .map_err(|e| ApiError::from_repository(e, "list complaints"))?;

    Ok(Json(Page::new(complaints, pagination, total)))
}

/// Totals over the complaints the caller can see, honouring list filters
pub async fn complaint_statistics(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ComplaintQuery>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::ViewComplaints)?;

    let statistics = state
        .complaint_repository
        .statistics(&query, caller.record_scope())
        .await
        .map_err(|e| ApiError::from_repository(e, "compute complaint statistics"))?;

    Ok(Json(statistics))
}

pub async fn get_complaint(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::ViewComplaints)?;

    let complaint = state
        .complaint_repository
        .get_by_id(id, caller.record_scope())
        .await
        .map_err(|e| ApiError::from_repository(e, "load complaint"))?
        .ok_or_else(not_found)?;

    Ok(Json(complaint))
}

pub async fn create_complaint(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<ComplaintPayload>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::CreateComplaint)?;
    let payload = payload.validated().map_err(ApiError::BadRequest)?;
    let user_id = caller.user_id().ok_or(ApiError::Unauthorized)?;

    ensure_machine_in_scope(&state, &caller, payload.machine_id).await?;

    let id = state
        .complaint_repository
        .create(&payload, user_id)
        .await
        .map_err(|e| ApiError::from_repository(e, "create complaint"))?;

    info!("Complaint {} filed for machine {}", id, payload.machine_id);

    let complaint = state
        .complaint_repository
        .get_by_id(id, Scope::All)
        .await
        .map_err(|e| ApiError::from_repository(e, "load complaint"))?
        .ok_or(ApiError::InternalServerError)?;

    Ok((StatusCode::CREATED, Json(complaint)))
}

pub async fn update_complaint(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
    Json(payload): Json<ComplaintPayload>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::EditComplaint)?;
    let payload = payload.validated().map_err(ApiError::BadRequest)?;

    state
        .complaint_repository
        .get_by_id(id, caller.record_scope())
        .await
        .map_err(|e| ApiError::from_repository(e, "load complaint"))?
        .ok_or_else(not_found)?;

    ensure_machine_in_scope(&state, &caller, payload.machine_id).await?;

    let updated = state
        .complaint_repository
        .update(id, &payload)
        .await
        .map_err(|e| ApiError::from_repository(e, "update complaint"))?;
    if !updated {
        return Err(not_found());
    }

    let complaint = state
        .complaint_repository
        .get_by_id(id, Scope::All)
        .await
        .map_err(|e| ApiError::from_repository(e, "load complaint"))?
        .ok_or(ApiError::InternalServerError)?;

    Ok(Json(complaint))
}

pub async fn delete_complaint(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::EditComplaint)?;

    state
        .complaint_repository
        .get_by_id(id, caller.record_scope())
        .await
        .map_err(|e| ApiError::from_repository(e, "load complaint"))?
        .ok_or_else(not_found)?;

    let deleted = state
        .complaint_repository
        .delete(id)
        .await
        .map_err(|e| ApiError::from_repository(e, "delete complaint"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Complaint not found".to_string())
}
