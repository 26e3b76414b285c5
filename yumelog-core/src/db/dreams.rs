//! Dream database operations
//!
//! All lookups are scoped to the owning user; a dream belonging to another
//! user is indistinguishable from one that does not exist.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::db::models::{Dream, DreamWithTags, EmotionColor};
use crate::db::{dream_tags, parse_guid, parse_timestamp};
use crate::error::{Error, Result};
use crate::pagination::{calculate_pagination, Page, DEFAULT_PER_PAGE};

const DREAM_COLUMNS: &str =
    "guid, user_id, title, content, emotion_color, lucid_dream_flag, dreamed_at, created_at";

/// Insert a dream row. Runs on the caller's transaction connection.
pub async fn insert_dream(conn: &mut SqliteConnection, dream: &Dream) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO dreams
            (guid, user_id, title, content, emotion_color, lucid_dream_flag,
             dreamed_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(dream.guid.to_string())
    .bind(dream.user_id.to_string())
    .bind(&dream.title)
    .bind(&dream.content)
    .bind(dream.emotion_color.as_str())
    .bind(dream.lucid_dream_flag)
    .bind(dream.dreamed_at.to_rfc3339())
    .bind(dream.created_at.to_rfc3339())
    .execute(conn)
    .await?;

    Ok(())
}

/// Overwrite the mutable fields of a dream row
pub async fn update_dream_row(conn: &mut SqliteConnection, dream: &Dream) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE dreams
        SET title = ?, content = ?, emotion_color = ?, lucid_dream_flag = ?,
            dreamed_at = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&dream.title)
    .bind(&dream.content)
    .bind(dream.emotion_color.as_str())
    .bind(dream.lucid_dream_flag)
    .bind(dream.dreamed_at.to_rfc3339())
    .bind(dream.guid.to_string())
    .execute(conn)
    .await?;

    Ok(())
}

/// Load one dream, scoped to its owner
pub async fn load_dream(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    dream_id: Uuid,
) -> Result<Option<Dream>> {
    let sql = format!("SELECT {DREAM_COLUMNS} FROM dreams WHERE guid = ? AND user_id = ?");
    let row = sqlx::query(&sql)
        .bind(dream_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(conn)
        .await?;

    row.map(|r| dream_from_row(&r)).transpose()
}

/// Delete a dream, scoped to its owner. Tag associations cascade away;
/// the tags themselves survive.
pub async fn delete_dream(pool: &SqlitePool, user_id: Uuid, dream_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM dreams WHERE guid = ? AND user_id = ?")
        .bind(dream_id.to_string())
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("Dream"));
    }

    Ok(())
}

/// List a user's dreams, most recently dreamed first, with tag summaries
pub async fn list_dreams(
    pool: &SqlitePool,
    user_id: Uuid,
    page: i64,
    per_page: Option<i64>,
) -> Result<Page<DreamWithTags>> {
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);

    let total_results: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dreams WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_one(pool)
        .await?;

    let p = calculate_pagination(total_results, page, per_page);

    let sql = format!(
        "SELECT {DREAM_COLUMNS} FROM dreams
         WHERE user_id = ?
         ORDER BY dreamed_at DESC, guid
         LIMIT ? OFFSET ?"
    );
    let rows = sqlx::query(&sql)
        .bind(user_id.to_string())
        .bind(p.per_page)
        .bind(p.offset)
        .fetch_all(pool)
        .await?;

    let dreams = rows
        .iter()
        .map(dream_from_row)
        .collect::<Result<Vec<_>>>()?;

    let items = with_tags(pool, dreams).await?;

    Ok(Page {
        items,
        page: p.page,
        per_page: p.per_page,
        total_results,
        total_pages: p.total_pages,
    })
}

/// Pick a random subset of a user's dreams (overflow input)
pub async fn random_dreams(pool: &SqlitePool, user_id: Uuid, limit: i64) -> Result<Vec<Dream>> {
    let sql = format!(
        "SELECT {DREAM_COLUMNS} FROM dreams
         WHERE user_id = ?
         ORDER BY RANDOM()
         LIMIT ?"
    );
    let rows = sqlx::query(&sql)
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(pool)
        .await?;

    rows.iter().map(dream_from_row).collect()
}

/// Attach tag summaries to an ordered list of dreams
pub async fn with_tags(pool: &SqlitePool, dreams: Vec<Dream>) -> Result<Vec<DreamWithTags>> {
    let dream_ids: Vec<Uuid> = dreams.iter().map(|d| d.guid).collect();
    let mut tag_map = dream_tags::tags_for_dreams(pool, &dream_ids).await?;

    Ok(dreams
        .into_iter()
        .map(|dream| {
            let tags = tag_map.remove(&dream.guid).unwrap_or_default();
            DreamWithTags { dream, tags }
        })
        .collect())
}

pub(crate) fn dream_from_row(row: &SqliteRow) -> Result<Dream> {
    let guid: String = row.get("guid");
    let user_id: String = row.get("user_id");
    let emotion: String = row.get("emotion_color");
    let dreamed_at: String = row.get("dreamed_at");
    let created_at: String = row.get("created_at");

    Ok(Dream {
        guid: parse_guid(&guid)?,
        user_id: parse_guid(&user_id)?,
        title: row.get("title"),
        content: row.get("content"),
        emotion_color: EmotionColor::from_label(&emotion)
            .ok_or_else(|| Error::Internal(format!("unknown emotion_color in database: {emotion}")))?,
        lucid_dream_flag: row.get::<i64, _>("lucid_dream_flag") != 0,
        dreamed_at: parse_timestamp(&dreamed_at)?,
        created_at: parse_timestamp(&created_at)?,
    })
}
