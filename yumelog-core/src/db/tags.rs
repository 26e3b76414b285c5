//! Tag database operations (the tag store)
//!
//! Tag names are unique per user. The unique constraint is the single
//! source of truth under concurrent writers: find-or-create attempts the
//! insert and re-fetches on a uniqueness violation.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::db::models::{Tag, TagCategory, TagDescriptor, YomiIndex};
use crate::db::{parse_guid, parse_timestamp};
use crate::error::{Error, Result};
use crate::search::escape_like;

/// Maximum number of suggestions returned by [`suggest_tags`]
pub const SUGGEST_LIMIT: i64 = 10;

const TAG_COLUMNS: &str = "guid, user_id, name, yomi, yomi_index, category, created_at";

/// Find a tag by `(user, name)`, creating it if absent.
///
/// Lookup is by name only: when the tag already exists, its stored yomi,
/// classification, and category are returned unchanged even if the
/// descriptor supplies different ones. Runs on the caller's transaction
/// connection.
pub async fn find_or_create_tag(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    descriptor: &TagDescriptor,
) -> Result<Tag> {
    descriptor.validate()?;

    if let Some(existing) = load_tag_by_name(&mut *conn, user_id, &descriptor.name).await? {
        return Ok(existing);
    }

    let tag = Tag::new(
        user_id,
        descriptor.name.clone(),
        descriptor.yomi.clone(),
        descriptor.category,
    );

    let result = sqlx::query(
        r#"
        INSERT INTO tags
            (guid, user_id, name, yomi, yomi_index, category, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(tag.guid.to_string())
    .bind(tag.user_id.to_string())
    .bind(&tag.name)
    .bind(&tag.yomi)
    .bind(tag.yomi_index.label())
    .bind(tag.category.as_str())
    .bind(tag.created_at.to_rfc3339())
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => {
            debug!("Created tag {} ({})", tag.name, tag.guid);
            Ok(tag)
        }
        // A concurrent writer created the same (user, name) first; their
        // row is authoritative.
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            load_tag_by_name(&mut *conn, user_id, &descriptor.name)
                .await?
                .ok_or_else(|| Error::validation("Name has already been taken"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Load a tag by its per-user unique name
pub async fn load_tag_by_name(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    name: &str,
) -> Result<Option<Tag>> {
    let sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE user_id = ? AND name = ?");
    let row = sqlx::query(&sql)
        .bind(user_id.to_string())
        .bind(name)
        .fetch_optional(conn)
        .await?;

    row.map(|r| tag_from_row(&r)).transpose()
}

/// List a user's tags, optionally filtered by category and/or index bucket,
/// in phonetic order
pub async fn list_tags(
    pool: &SqlitePool,
    user_id: Uuid,
    category: Option<TagCategory>,
    yomi_index: Option<YomiIndex>,
) -> Result<Vec<Tag>> {
    let mut sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE user_id = ?");
    if category.is_some() {
        sql.push_str(" AND category = ?");
    }
    if yomi_index.is_some() {
        sql.push_str(" AND yomi_index = ?");
    }
    sql.push_str(" ORDER BY yomi, name");

    let mut query = sqlx::query(&sql).bind(user_id.to_string());
    if let Some(category) = category {
        query = query.bind(category.as_str());
    }
    if let Some(yomi_index) = yomi_index {
        query = query.bind(yomi_index.label());
    }

    let rows = query.fetch_all(pool).await?;
    rows.iter().map(tag_from_row).collect()
}

/// Suggest up to ten tags whose name or yomi contains `query` as a
/// substring. A blank query matches all. Optionally restricted by category.
pub async fn suggest_tags(
    pool: &SqlitePool,
    user_id: Uuid,
    query: &str,
    category: Option<TagCategory>,
) -> Result<Vec<Tag>> {
    let query = query.trim();

    let mut sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE user_id = ?");
    if !query.is_empty() {
        sql.push_str(r" AND (name LIKE ? ESCAPE '\' OR yomi LIKE ? ESCAPE '\')");
    }
    if category.is_some() {
        sql.push_str(" AND category = ?");
    }
    sql.push_str(" ORDER BY yomi, name LIMIT ?");

    let mut q = sqlx::query(&sql).bind(user_id.to_string());
    if !query.is_empty() {
        let pattern = format!("%{}%", escape_like(query));
        q = q.bind(pattern.clone()).bind(pattern);
    }
    if let Some(category) = category {
        q = q.bind(category.as_str());
    }
    q = q.bind(SUGGEST_LIMIT);

    let rows = q.fetch_all(pool).await?;
    rows.iter().map(tag_from_row).collect()
}

/// Delete a tag, scoped to its owner. Entry associations cascade away;
/// the entries themselves are untouched.
pub async fn delete_tag(pool: &SqlitePool, user_id: Uuid, tag_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM tags WHERE guid = ? AND user_id = ?")
        .bind(tag_id.to_string())
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("Tag"));
    }

    Ok(())
}

pub(crate) fn tag_from_row(row: &SqliteRow) -> Result<Tag> {
    let guid: String = row.get("guid");
    let user_id: String = row.get("user_id");
    let yomi_index: String = row.get("yomi_index");
    let category: String = row.get("category");
    let created_at: String = row.get("created_at");

    Ok(Tag {
        guid: parse_guid(&guid)?,
        user_id: parse_guid(&user_id)?,
        name: row.get("name"),
        yomi: row.get("yomi"),
        yomi_index: YomiIndex::from_label(&yomi_index)
            .ok_or_else(|| Error::Internal(format!("unknown yomi_index in database: {yomi_index}")))?,
        category: TagCategory::from_label(&category)
            .ok_or_else(|| Error::Internal(format!("unknown category in database: {category}")))?,
        created_at: parse_timestamp(&created_at)?,
    })
}
