//! Database operations for the cubes table.

use cubelog_engine::{Collection, CubeSnapshot, Version};
use sqlx::{PgConnection, PgPool, Row};

/// A stored cube row from the database.
#[derive(Debug)]
pub struct StoredCube {
    pub id: String,
    pub version: i64,
    pub cards: serde_json::Value,
    #[allow(dead_code)]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[allow(dead_code)]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredCube {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoredCube {
            id: row.try_get("id")?,
            version: row.try_get("version")?,
            cards: row.try_get("cards")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl StoredCube {
    /// Convert database row to an engine snapshot.
    pub fn to_snapshot(&self) -> Result<CubeSnapshot, String> {
        let cards: Collection = serde_json::from_value(self.cards.clone())
            .map_err(|e| format!("invalid cards for cube {}: {}", self.id, e))?;
        Ok(CubeSnapshot::at_version(
            &self.id,
            self.version as Version,
            cards,
        ))
    }
}

/// Cards as persisted: display details are never stored.
fn stored_cards(cards: &Collection) -> Result<serde_json::Value, sqlx::Error> {
    let stripped = Collection {
        mainboard: cards.mainboard.iter().map(|c| c.without_details()).collect(),
        maybeboard: cards.maybeboard.iter().map(|c| c.without_details()).collect(),
    };
    serde_json::to_value(&stripped).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

/// Insert a new cube. Returns false if the id is already taken.
pub async fn insert_cube(pool: &PgPool, snapshot: &CubeSnapshot) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO cubes (id, version, cards)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&snapshot.cube_id)
    .bind(snapshot.version as i64)
    .bind(stored_cards(&snapshot.cards)?)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Get a cube by id.
pub async fn get_cube(pool: &PgPool, cube_id: &str) -> Result<Option<StoredCube>, sqlx::Error> {
    sqlx::query_as::<_, StoredCube>(
        r#"
        SELECT id, version, cards, created_at, updated_at
        FROM cubes
        WHERE id = $1
        "#,
    )
    .bind(cube_id)
    .fetch_optional(pool)
    .await
}

/// Get a cube by id, locking its row until the transaction ends.
pub async fn lock_cube(
    conn: &mut PgConnection,
    cube_id: &str,
) -> Result<Option<StoredCube>, sqlx::Error> {
    sqlx::query_as::<_, StoredCube>(
        r#"
        SELECT id, version, cards, created_at, updated_at
        FROM cubes
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(cube_id)
    .fetch_optional(conn)
    .await
}

/// Store the cards and version of a committed snapshot.
pub async fn update_cube(
    conn: &mut PgConnection,
    snapshot: &CubeSnapshot,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE cubes
        SET version = $2, cards = $3, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(&snapshot.cube_id)
    .bind(snapshot.version as i64)
    .bind(stored_cards(&snapshot.cards)?)
    .execute(conn)
    .await?;

    Ok(())
}
