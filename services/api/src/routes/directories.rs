//! Directory endpoints

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use permissions::Capability;
use tracing::info;

use crate::{
    caller::Caller,
    error::{ApiError, ApiResult},
    models::{
        Page,
        directory::{DirectoryInfo, DirectoryKind, DirectoryPayload, DirectoryQuery},
    },
    query::{Pagination, search_term},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/directories", get(list_directories))
        .route(
            "/directories/:kind",
            get(list_entries).post(create_entry),
        )
        .route(
            "/directories/:kind/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

fn parse_kind(raw: &str) -> ApiResult<DirectoryKind> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("Unknown directory: {}", raw)))
}

fn not_found(kind: DirectoryKind) -> ApiError {
    ApiError::NotFound(format!("Entry not found in {}", kind))
}

/// The directory kinds with their labels
pub async fn list_directories() -> impl IntoResponse {
    let kinds: Vec<DirectoryInfo> = DirectoryKind::ALL.into_iter().map(Into::into).collect();
    Json(kinds)
}

/// Entries of one directory. Public, the filters on the machine page need it.
pub async fn list_entries(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<DirectoryQuery>,
) -> ApiResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;

    let pagination = Pagination::new(query.page, query.limit);
    let (entries, total) = state
        .directory_repository
        .list(kind, search_term(&query.search), pagination)
        .await
        .map_err(|e| ApiError::from_repository(e, "list directory entries"))?;

    Ok(Json(Page::new(entries, pagination, total)))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
) -> ApiResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;

    let entry = state
        .directory_repository
        .get_by_id(kind, id)
        .await
        .map_err(|e| ApiError::from_repository(e, "load directory entry"))?
        .ok_or_else(|| not_found(kind))?;

    Ok(Json(entry))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(kind): Path<String>,
    Json(payload): Json<DirectoryPayload>,
) -> ApiResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;
    caller.require(Capability::ManageDirectories)?;
    let payload = payload.validated().map_err(ApiError::BadRequest)?;

    let entry = state
        .directory_repository
        .create(kind, &payload)
        .await
        .map_err(|e| ApiError::from_repository(e, "create directory entry"))?;

    info!("Added {} entry {}", kind, entry.id);

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((kind, id)): Path<(String, i64)>,
    Json(payload): Json<DirectoryPayload>,
) -> ApiResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;
    caller.require(Capability::ManageDirectories)?;
    let payload = payload.validated().map_err(ApiError::BadRequest)?;

    let entry = state
        .directory_repository
        .update(kind, id, &payload)
        .await
        .map_err(|e| ApiError::from_repository(e, "update directory entry"))?
        .ok_or_else(|| not_found(kind))?;

    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((kind, id)): Path<(String, i64)>,
) -> ApiResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;
    caller.require(Capability::ManageDirectories)?;

    let deleted = state
        .directory_repository
        .delete(kind, id)
        .await
        .map_err(|e| ApiError::from_repository(e, "delete directory entry"))?;

    if deleted {
        info!("Removed {} entry {}", kind, id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(kind))
    }
}
