//! Dream search
//!
//! Two composable filter predicates over a user's dreams:
//!
//! - keyword filter: the keyword is split on whitespace; every token must
//!   appear as a substring of the title OR the content (checked per token,
//!   so one token may match the title while another matches the content)
//! - tag filter: the dream must be associated with ALL of the requested
//!   tag ids (set intersection, not union)
//!
//! A blank keyword or an empty id set means "no filtering". Results are
//! ordered by `dreamed_at` descending. All user input is value-bound; no
//! token or id is ever concatenated into the query text.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::dreams::{dream_from_row, with_tags};
use crate::db::models::DreamWithTags;
use crate::error::Result;
use crate::pagination::{calculate_pagination, Page, DEFAULT_PER_PAGE};

/// Escape LIKE wildcards in user input (used with `ESCAPE '\'`)
pub(crate) fn escape_like(input: &str) -> String {
    input
        .replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_")
}

/// Search a user's dreams by keyword and/or tag-id intersection.
///
/// Both filters are optional and compose with AND. Pages are 12 dreams.
pub async fn search_dreams(
    pool: &SqlitePool,
    user_id: Uuid,
    keyword: Option<&str>,
    tag_ids: &[Uuid],
    page: i64,
) -> Result<Page<DreamWithTags>> {
    let tokens: Vec<&str> = keyword.map(str::split_whitespace).into_iter().flatten().collect();

    // WHERE clause shared by the count and page queries. String binds are
    // collected in clause order; the tag-intersection count binds last.
    let mut clauses = String::from("user_id = ?");
    let mut binds: Vec<String> = vec![user_id.to_string()];

    for token in &tokens {
        clauses.push_str(r" AND (title LIKE ? ESCAPE '\' OR content LIKE ? ESCAPE '\')");
        let pattern = format!("%{}%", escape_like(token));
        binds.push(pattern.clone());
        binds.push(pattern);
    }

    let mut intersection_size: Option<i64> = None;
    if !tag_ids.is_empty() {
        let placeholders = vec!["?"; tag_ids.len()].join(", ");
        clauses.push_str(&format!(
            " AND guid IN (
                 SELECT dream_id FROM dream_tags
                 WHERE tag_id IN ({placeholders})
                 GROUP BY dream_id
                 HAVING COUNT(DISTINCT tag_id) = ?)"
        ));
        for tag_id in tag_ids {
            binds.push(tag_id.to_string());
        }
        intersection_size = Some(tag_ids.len() as i64);
    }

    let count_sql = format!("SELECT COUNT(*) FROM dreams WHERE {clauses}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_query = count_query.bind(bind);
    }
    if let Some(n) = intersection_size {
        count_query = count_query.bind(n);
    }
    let total_results = count_query.fetch_one(pool).await?;

    let p = calculate_pagination(total_results, page, DEFAULT_PER_PAGE);

    let page_sql = format!(
        "SELECT guid, user_id, title, content, emotion_color, lucid_dream_flag,
                dreamed_at, created_at
         FROM dreams
         WHERE {clauses}
         ORDER BY dreamed_at DESC, guid
         LIMIT ? OFFSET ?"
    );
    let mut page_query = sqlx::query(&page_sql);
    for bind in &binds {
        page_query = page_query.bind(bind);
    }
    if let Some(n) = intersection_size {
        page_query = page_query.bind(n);
    }
    page_query = page_query.bind(p.per_page).bind(p.offset);

    let rows = page_query.fetch_all(pool).await?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), r"100\%");
        assert_eq!(escape_like("a_b"), r"a\_b");
        assert_eq!(escape_like(r"back\slash"), r"back\\slash");
        assert_eq!(escape_like("洋館"), "洋館");
    }
}
