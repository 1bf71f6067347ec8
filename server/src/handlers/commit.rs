//! Commit handler - applies a change set to the authoritative cube.

use crate::db;
use crate::error::{AppError, Result};
use cubelog_engine::{ChangeSet, CubeSnapshot, SnapshotMetadata, Version};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Request body for a commit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    /// Version the client believes is current
    pub expected_version: Version,
    /// Changes addressed against `expected_version`
    pub changes: ChangeSet,
}

/// Response for a successful commit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    /// Id of the new change log entry
    pub changelog_id: Uuid,
    /// The cube after the commit
    pub cube: SnapshotMetadata,
}

/// Check a commit against the current snapshot and compute the next one.
pub fn prepare_commit(
    current: &CubeSnapshot,
    expected_version: Version,
    changes: &ChangeSet,
) -> Result<CubeSnapshot> {
    if changes.is_empty() {
        return Err(AppError::BadRequest("change set is empty".to_string()));
    }
    if expected_version != current.version {
        return Err(AppError::CommitRejected {
            expected: expected_version,
            current: current.version,
        });
    }
    if changes.version != expected_version {
        return Err(AppError::BadRequest(format!(
            "change set is addressed against version {}, expected {}",
            changes.version, expected_version
        )));
    }

    Ok(current.commit(changes)?)
}

/// Process a commit.
///
/// The cube row stays locked from the version check until the new cards and
/// the change log entry are written.
pub async fn handle_commit(
    pool: &PgPool,
    cube_id: &str,
    request: CommitRequest,
) -> Result<CommitResponse> {
    let mut tx = pool.begin().await?;

    let stored = db::lock_cube(&mut *tx, cube_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("cube {}", cube_id)))?;
    let current = stored.to_snapshot().map_err(AppError::Internal)?;

    let next = match prepare_commit(&current, request.expected_version, &request.changes) {
        Ok(next) => next,
        Err(e) => {
            tracing::warn!(
                cube_id,
                expected = request.expected_version,
                current = current.version,
                "Commit rejected: {}",
                e
            );
            return Err(e);
        }
    };

    db::update_cube(&mut *tx, &next).await?;
    let entry = current.log_entry(&request.changes);
    let changelog_id = db::insert_changelog(&mut *tx, cube_id, &entry).await?;
    tx.commit().await?;

    tracing::info!(
        cube_id,
        version = next.version,
        operations = request.changes.len(),
        "Committed change set"
    );

    Ok(CommitResponse {
        changelog_id,
        cube: SnapshotMetadata::from(&next),
    })
}
