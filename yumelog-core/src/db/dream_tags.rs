//! Dream-tag association operations
//!
//! Pure join rows; the `(dream_id, tag_id)` pair is the primary key, so
//! linking is naturally idempotent.

use std::collections::HashMap;

use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::db::models::Tag;
use crate::db::tags::tag_from_row;
use crate::error::Result;

/// Associate a tag with a dream. No-op if the association already exists.
pub async fn link(conn: &mut SqliteConnection, dream_id: Uuid, tag_id: Uuid) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO dream_tags (dream_id, tag_id) VALUES (?, ?)",
    )
    .bind(dream_id.to_string())
    .bind(tag_id.to_string())
    .execute(conn)
    .await?;

    Ok(())
}

/// Remove all tag associations from a dream
pub async fn clear(conn: &mut SqliteConnection, dream_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM dream_tags WHERE dream_id = ?")
        .bind(dream_id.to_string())
        .execute(conn)
        .await?;

    Ok(())
}

/// Load the tags associated with one dream, in phonetic order
pub async fn tags_for_dream(pool: &SqlitePool, dream_id: Uuid) -> Result<Vec<Tag>> {
    let rows = sqlx::query(
        r#"
        SELECT t.guid, t.user_id, t.name, t.yomi, t.yomi_index, t.category, t.created_at
        FROM tags t
        JOIN dream_tags dt ON dt.tag_id = t.guid
        WHERE dt.dream_id = ?
        ORDER BY t.yomi, t.name
        "#,
    )
    .bind(dream_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(tag_from_row).collect()
}

/// Load the tags for a set of dreams in one query, grouped by dream
pub async fn tags_for_dreams(
    pool: &SqlitePool,
    dream_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Tag>>> {
    if dream_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; dream_ids.len()].join(", ");
    let sql = format!(
        "SELECT dt.dream_id,
                t.guid, t.user_id, t.name, t.yomi, t.yomi_index, t.category, t.created_at
         FROM tags t
         JOIN dream_tags dt ON dt.tag_id = t.guid
         WHERE dt.dream_id IN ({placeholders})
         ORDER BY t.yomi, t.name"
    );

    let mut query = sqlx::query(&sql);
    for dream_id in dream_ids {
        query = query.bind(dream_id.to_string());
    }

    let rows = query.fetch_all(pool).await?;

    let mut map: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for row in &rows {
        let dream_id: String = row.get("dream_id");
        let dream_id = crate::db::parse_guid(&dream_id)?;
        map.entry(dream_id).or_default().push(tag_from_row(row)?);
    }

    Ok(map)
}
