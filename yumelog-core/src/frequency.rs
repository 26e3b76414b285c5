//! Tag frequency analysis
//!
//! Finds the tags a user keeps reaching for: those used at least twice
//! among their ten most-recently-dreamed entries. Entries outside that
//! window never influence the result.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::parse_guid;
use crate::error::Result;

/// Number of most-recent dreams considered
pub const RECENT_DREAMS_LIMIT: i64 = 10;
/// Minimum usage count for a tag to qualify
pub const FREQUENCY_THRESHOLD: i64 = 2;

/// Return the ids of tags used `FREQUENCY_THRESHOLD` or more times among
/// the user's `RECENT_DREAMS_LIMIT` most recent dreams. Empty when the
/// user has no dreams or no tag reaches the threshold. No ordering is
/// guaranteed beyond "set of qualifying ids".
pub async fn frequent_tags(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Uuid>> {
    let tag_ids: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT tag_id
        FROM dream_tags
        WHERE dream_id IN (
            SELECT guid FROM dreams
            WHERE user_id = ?
            ORDER BY dreamed_at DESC, guid
            LIMIT ?
        )
        GROUP BY tag_id
        HAVING COUNT(*) >= ?
        "#,
    )
    .bind(user_id.to_string())
    .bind(RECENT_DREAMS_LIMIT)
    .bind(FREQUENCY_THRESHOLD)
    .fetch_all(pool)
    .await?;

    tag_ids.iter().map(|id| parse_guid(id)).collect()
}
