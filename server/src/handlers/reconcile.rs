//! Reconcile handler - checks a pending change set against the current cube.

use crate::error::Result;
use super::cubes::load_snapshot;
use cubelog_engine::{ChangeSet, Reconciler, Reconciliation};
use serde::Deserialize;
use sqlx::PgPool;

/// Request body for reconciliation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    /// The pending change set
    pub changes: ChangeSet,
}

/// Reconcile a pending change set with the current version of a cube.
pub async fn handle_reconcile(
    pool: &PgPool,
    cube_id: &str,
    request: ReconcileRequest,
) -> Result<Reconciliation> {
    let current = load_snapshot(pool, cube_id).await?;
    let outcome = Reconciler::new(&current.cards, current.version).reconcile(&request.changes);

    if let Some(conflict) = outcome.conflict() {
        tracing::info!(
            cube_id,
            pending = request.changes.version,
            version = current.version,
            salvaged = conflict.salvaged.len(),
            "Pending change set conflicts"
        );
    } else {
        tracing::debug!(
            cube_id,
            pending = request.changes.version,
            version = current.version,
            "Pending change set reconciled"
        );
    }

    Ok(outcome)
}
