//! Change log handlers - serve committed change sets.

use crate::db;
use crate::error::{AppError, Result};
use super::cubes::load_snapshot;
use cubelog_engine::{try_merge_changes, ChangeSet, Version};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Maximum limit for change log pages.
const MAX_LIMIT: i64 = 1000;

/// Query parameters for listing the change log.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogQuery {
    /// Only entries addressed at this version or later
    pub since: Option<Version>,
    /// Only entries addressed below this version, for paging backwards
    pub before: Option<Version>,
    /// Maximum number of entries to return
    pub limit: Option<i64>,
}

/// A committed change set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogEntry {
    pub id: Uuid,
    /// Version the change set was addressed against
    pub version: Version,
    pub changes: ChangeSet,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Response for a change log page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogResponse {
    /// Entries, newest first
    pub entries: Vec<ChangelogEntry>,
    /// Cursor for the next page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_before: Option<Version>,
    /// Whether older entries remain
    pub has_more: bool,
}

/// Query parameters for the merged change log.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedQuery {
    /// Merge entries addressed at this version or later
    pub since: Option<Version>,
}

/// The net change between two versions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedResponse {
    /// Version the merged change set applies to
    pub since: Version,
    /// Version reached by applying it
    pub version: Version,
    pub changes: ChangeSet,
}

/// List a page of a cube's change log.
pub async fn handle_changelog(
    pool: &PgPool,
    cube_id: &str,
    query: ChangelogQuery,
    default_limit: i64,
) -> Result<ChangelogResponse> {
    // 404 for unknown cubes rather than an empty page
    load_snapshot(pool, cube_id).await?;

    let limit = query
        .limit
        .map(|l| l.clamp(1, MAX_LIMIT))
        .unwrap_or_else(|| default_limit.clamp(1, MAX_LIMIT));

    // Fetch one more than requested to check if there are more
    let stored = db::get_changelogs(
        pool,
        cube_id,
        query.since.unwrap_or(0),
        query.before,
        limit + 1,
    )
    .await?;

    let has_more = stored.len() as i64 > limit;
    let mut entries = Vec::with_capacity(limit as usize);
    for row in stored.into_iter().take(limit as usize) {
        entries.push(ChangelogEntry {
            changes: row.to_changes().map_err(AppError::Internal)?,
            id: row.id,
            version: row.version as Version,
            created_at: row.created_at,
        });
    }

    let next_before = if has_more {
        entries.last().map(|e| e.version)
    } else {
        None
    };

    Ok(ChangelogResponse {
        entries,
        next_before,
        has_more,
    })
}

/// Merge every change set committed since a version into one.
pub async fn handle_merged(
    pool: &PgPool,
    cube_id: &str,
    query: MergedQuery,
) -> Result<MergedResponse> {
    let current = load_snapshot(pool, cube_id).await?;
    let since = query.since.unwrap_or(0);
    if since > current.version {
        return Err(AppError::BadRequest(format!(
            "cube {} is at version {}",
            cube_id, current.version
        )));
    }

    let changesets = load_changes_since(pool, cube_id, since).await?;
    let changes = try_merge_changes(&changesets)?;

    Ok(MergedResponse {
        since,
        version: current.version,
        changes,
    })
}

/// Load the change sets committed from `since` on, oldest first.
pub(crate) async fn load_changes_since(
    pool: &PgPool,
    cube_id: &str,
    since: Version,
) -> Result<Vec<ChangeSet>> {
    db::get_changelogs_since(pool, cube_id, since)
        .await?
        .iter()
        .map(|row| row.to_changes().map_err(AppError::Internal))
        .collect()
}
