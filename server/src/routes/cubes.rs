//! Cube endpoint routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use cubelog_engine::{CubeSnapshot, Reconciliation, Version};

use crate::error::Result;
use crate::handlers::{
    handle_changelog, handle_commit, handle_create_cube, handle_get_cube, handle_get_version,
    handle_merged, handle_reconcile, ChangelogQuery, ChangelogResponse, CommitRequest,
    CommitResponse, CreateCubeRequest, MergedQuery, MergedResponse, ReconcileRequest,
};
use crate::AppState;

/// Create cube routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cubes/{id}", get(get_cube_handler).put(create_cube_handler))
        .route("/cubes/{id}/commit", post(commit_handler))
        .route("/cubes/{id}/reconcile", post(reconcile_handler))
        .route("/cubes/{id}/changelog", get(changelog_handler))
        .route("/cubes/{id}/changelog/merged", get(merged_handler))
        .route("/cubes/{id}/versions/{version}", get(version_handler))
}

/// PUT /cubes/{id} - Create a cube.
async fn create_cube_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CreateCubeRequest>,
) -> Result<(StatusCode, Json<CubeSnapshot>)> {
    let snapshot = handle_create_cube(&state.pool, &id, request).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /cubes/{id} - Current version of a cube.
async fn get_cube_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CubeSnapshot>> {
    let snapshot = handle_get_cube(&state.pool, &id).await?;
    Ok(Json(snapshot))
}

/// POST /cubes/{id}/commit - Commit a change set.
async fn commit_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CommitRequest>,
) -> Result<Json<CommitResponse>> {
    let response = handle_commit(&state.pool, &id, request).await?;
    Ok(Json(response))
}

/// POST /cubes/{id}/reconcile - Reconcile a pending change set.
async fn reconcile_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ReconcileRequest>,
) -> Result<Json<Reconciliation>> {
    let outcome = handle_reconcile(&state.pool, &id, request).await?;
    Ok(Json(outcome))
}

/// GET /cubes/{id}/changelog - Page through the change log.
async fn changelog_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChangelogQuery>,
) -> Result<Json<ChangelogResponse>> {
    let response = handle_changelog(&state.pool, &id, query, state.config.page_size).await?;
    Ok(Json(response))
}

/// GET /cubes/{id}/changelog/merged - Net change since a version.
async fn merged_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MergedQuery>,
) -> Result<Json<MergedResponse>> {
    let response = handle_merged(&state.pool, &id, query).await?;
    Ok(Json(response))
}

/// GET /cubes/{id}/versions/{version} - A past version of a cube.
async fn version_handler(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, Version)>,
) -> Result<Json<CubeSnapshot>> {
    let snapshot = handle_get_version(&state.pool, &id, version).await?;
    Ok(Json(snapshot))
}
