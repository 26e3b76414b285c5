//! High-level diary operations
//!
//! The write paths exposed to the calling layer. Each write runs in one
//! transaction: the dream row and its tag reconciliation commit together
//! or not at all.

use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::models::{DreamDraft, DreamWithTags, TagDescriptor};
use crate::db::{dream_tags, dreams};
use crate::error::{Error, Result};
use crate::overflow;
use crate::reconcile;

/// Number of random dreams fed into overflow sampling
pub const OVERFLOW_DREAM_LIMIT: i64 = 10;

/// Create a dream with optional tags, transactionally.
///
/// The draft is sanitized and validated first; tag descriptors are then
/// resolved and attached on the same transaction, so a failing descriptor
/// leaves nothing behind.
pub async fn create_dream(
    pool: &SqlitePool,
    user_id: Uuid,
    draft: DreamDraft,
    tag_descriptors: &[TagDescriptor],
) -> Result<DreamWithTags> {
    let draft = draft.sanitized()?;
    let dream = crate::db::models::Dream::new(user_id, draft);

    let mut tx = pool.begin().await?;
    dreams::insert_dream(&mut tx, &dream).await?;
    reconcile::attach(&mut tx, dream.guid, user_id, tag_descriptors).await?;
    tx.commit().await?;

    info!("Created dream {} for user {}", dream.guid, user_id);

    let tags = dream_tags::tags_for_dream(pool, dream.guid).await?;
    Ok(DreamWithTags { dream, tags })
}

/// Update a dream in place, transactionally.
///
/// `tag_descriptors` distinguishes "no tag change requested" (`None`) from
/// "replace the tag set" (`Some`, even when empty — an empty list removes
/// every tag). A dream owned by another user reports not-found.
pub async fn update_dream(
    pool: &SqlitePool,
    user_id: Uuid,
    dream_id: Uuid,
    draft: DreamDraft,
    tag_descriptors: Option<&[TagDescriptor]>,
) -> Result<DreamWithTags> {
    let mut tx = pool.begin().await?;

    let mut dream = dreams::load_dream(&mut tx, user_id, dream_id)
        .await?
        .ok_or_else(|| Error::not_found("Dream"))?;

    let draft = draft.sanitized()?;
    dream.apply(draft);
    dreams::update_dream_row(&mut tx, &dream).await?;

    if let Some(descriptors) = tag_descriptors {
        reconcile::replace(&mut tx, dream.guid, user_id, descriptors).await?;
    }

    tx.commit().await?;

    info!("Updated dream {} for user {}", dream.guid, user_id);

    let tags = dream_tags::tags_for_dream(pool, dream.guid).await?;
    Ok(DreamWithTags { dream, tags })
}

/// Delete a dream. Its tag associations cascade away with it.
pub async fn delete_dream(pool: &SqlitePool, user_id: Uuid, dream_id: Uuid) -> Result<()> {
    dreams::delete_dream(pool, user_id, dream_id).await?;
    info!("Deleted dream {} for user {}", dream_id, user_id);
    Ok(())
}

/// Load one dream with its tags, scoped to its owner
pub async fn get_dream(
    pool: &SqlitePool,
    user_id: Uuid,
    dream_id: Uuid,
) -> Result<DreamWithTags> {
    let mut conn = pool.acquire().await?;
    let dream = dreams::load_dream(&mut conn, user_id, dream_id)
        .await?
        .ok_or_else(|| Error::not_found("Dream"))?;
    drop(conn);

    let tags = dream_tags::tags_for_dream(pool, dream.guid).await?;
    Ok(DreamWithTags { dream, tags })
}

/// Sample overflow fragments from a random subset of the user's dreams
pub async fn overflow_fragments(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<String>> {
    let dreams = dreams::random_dreams(pool, user_id, OVERFLOW_DREAM_LIMIT).await?;
    overflow::sample_overflow(&dreams)
}
