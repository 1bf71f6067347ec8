//! Cube handlers - create and fetch cubes.

use crate::db;
use crate::error::{AppError, Result};
use cubelog_engine::{Collection, CubeSnapshot};
use serde::Deserialize;
use sqlx::PgPool;

/// Request body for creating a cube.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCubeRequest {
    /// Initial cards of every board
    #[serde(default)]
    pub cards: Collection,
}

/// Create a cube at version 0.
pub async fn handle_create_cube(
    pool: &PgPool,
    cube_id: &str,
    request: CreateCubeRequest,
) -> Result<CubeSnapshot> {
    if cube_id.trim().is_empty() {
        return Err(AppError::BadRequest("cube id must not be empty".to_string()));
    }

    let snapshot = CubeSnapshot::new(cube_id, request.cards);
    if !db::insert_cube(pool, &snapshot).await? {
        return Err(AppError::AlreadyExists(format!("cube {}", cube_id)));
    }

    tracing::info!(cube_id, cards = snapshot.card_count(), "Created cube");
    Ok(snapshot)
}

/// Get the current version of a cube.
pub async fn handle_get_cube(pool: &PgPool, cube_id: &str) -> Result<CubeSnapshot> {
    load_snapshot(pool, cube_id).await
}

/// Load the current snapshot of a cube.
pub(crate) async fn load_snapshot(pool: &PgPool, cube_id: &str) -> Result<CubeSnapshot> {
    let stored = db::get_cube(pool, cube_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("cube {}", cube_id)))?;

    stored.to_snapshot().map_err(AppError::Internal)
}
