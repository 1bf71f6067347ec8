//! History handler - reconstructs past versions of a cube.

use crate::error::{AppError, Result};
use super::changelog::load_changes_since;
use super::cubes::load_snapshot;
use cubelog_engine::{apply_reversed, CubeSnapshot, Version};
use sqlx::PgPool;

/// Get a cube as it was at `version`.
///
/// The current cards are walked back through every change set committed at
/// `version` or later.
pub async fn handle_get_version(
    pool: &PgPool,
    cube_id: &str,
    version: Version,
) -> Result<CubeSnapshot> {
    let current = load_snapshot(pool, cube_id).await?;
    if version > current.version {
        return Err(AppError::NotFound(format!(
            "cube {} has no version {} (current is {})",
            cube_id, version, current.version
        )));
    }
    if version == current.version {
        return Ok(current);
    }

    let changesets = load_changes_since(pool, cube_id, version).await?;
    let expected = (current.version - version) as usize;
    if changesets.len() != expected {
        return Err(AppError::Internal(format!(
            "cube {} has {} change log entries since version {}, expected {}",
            cube_id,
            changesets.len(),
            version,
            expected
        )));
    }

    let cards = apply_reversed(&current.cards, &changesets)?;
    tracing::debug!(cube_id, version, undone = changesets.len(), "Reconstructed version");

    Ok(CubeSnapshot::at_version(cube_id, version, cards))
}
