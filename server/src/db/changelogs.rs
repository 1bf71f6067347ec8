//! Database operations for the changelogs table.

use cubelog_engine::{ChangeSet, Version};
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

/// A stored change log entry from the database.
#[derive(Debug)]
pub struct StoredChangelog {
    pub id: Uuid,
    #[allow(dead_code)]
    pub cube_id: String,
    pub version: i64,
    pub changes: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredChangelog {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoredChangelog {
            id: row.try_get("id")?,
            cube_id: row.try_get("cube_id")?,
            version: row.try_get("version")?,
            changes: row.try_get("changes")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl StoredChangelog {
    /// Convert database row to an engine change set.
    pub fn to_changes(&self) -> Result<ChangeSet, String> {
        serde_json::from_value(self.changes.clone())
            .map_err(|e| format!("invalid change log entry {}: {}", self.id, e))
    }
}

/// Append a change set to a cube's log. Returns the new entry id.
pub async fn insert_changelog(
    conn: &mut PgConnection,
    cube_id: &str,
    changes: &ChangeSet,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    let payload = serde_json::to_value(changes).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    sqlx::query(
        r#"
        INSERT INTO changelogs (id, cube_id, version, changes)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(cube_id)
    .bind(changes.version as i64)
    .bind(payload)
    .execute(conn)
    .await?;

    Ok(id)
}

/// Get log entries newest first.
///
/// Only entries addressed at `since` or later and, when set, below `before`
/// are returned.
pub async fn get_changelogs(
    pool: &PgPool,
    cube_id: &str,
    since: Version,
    before: Option<Version>,
    limit: i64,
) -> Result<Vec<StoredChangelog>, sqlx::Error> {
    sqlx::query_as::<_, StoredChangelog>(
        r#"
        SELECT id, cube_id, version, changes, created_at
        FROM changelogs
        WHERE cube_id = $1
          AND version >= $2
          AND ($3::BIGINT IS NULL OR version < $3)
        ORDER BY version DESC
        LIMIT $4
        "#,
    )
    .bind(cube_id)
    .bind(since as i64)
    .bind(before.map(|v| v as i64))
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Get every log entry addressed at `since` or later, oldest first.
pub async fn get_changelogs_since(
    pool: &PgPool,
    cube_id: &str,
    since: Version,
) -> Result<Vec<StoredChangelog>, sqlx::Error> {
    sqlx::query_as::<_, StoredChangelog>(
        r#"
        SELECT id, cube_id, version, changes, created_at
        FROM changelogs
        WHERE cube_id = $1 AND version >= $2
        ORDER BY version ASC
        "#,
    )
    .bind(cube_id)
    .bind(since as i64)
    .fetch_all(pool)
    .await
}
