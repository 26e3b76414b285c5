//! Tag reconciliation for dream writes
//!
//! Resolves raw tag descriptors into tag rows and keeps a dream's
//! associations in step with them. Both operations run on the caller's
//! transaction connection: any failure here must roll back the whole
//! write, so no partial attachment is ever visible.

use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::models::TagDescriptor;
use crate::db::{dream_tags, tags};
use crate::error::{Error, Result};

/// Attach tags to a dream from a list of descriptors.
///
/// Each descriptor is resolved through find-or-create, then linked if not
/// already present. An empty descriptor list is a successful no-op.
/// Validation failures surface with their field errors; any other failure
/// is wrapped as a reconciliation error.
pub async fn attach(
    conn: &mut SqliteConnection,
    dream_id: Uuid,
    user_id: Uuid,
    descriptors: &[TagDescriptor],
) -> Result<()> {
    if descriptors.is_empty() {
        return Ok(());
    }

    for descriptor in descriptors {
        let tag = tags::find_or_create_tag(&mut *conn, user_id, descriptor)
            .await
            .map_err(wrap_unexpected)?;
        dream_tags::link(&mut *conn, dream_id, tag.guid)
            .await
            .map_err(wrap_unexpected)?;
    }

    Ok(())
}

/// Replace a dream's tags wholesale: clear every existing association,
/// then attach the new descriptor list. Replacing with an empty list
/// leaves the dream untagged.
pub async fn replace(
    conn: &mut SqliteConnection,
    dream_id: Uuid,
    user_id: Uuid,
    descriptors: &[TagDescriptor],
) -> Result<()> {
    dream_tags::clear(&mut *conn, dream_id)
        .await
        .map_err(wrap_unexpected)?;
    attach(conn, dream_id, user_id, descriptors).await
}

/// Validation errors keep their field messages; everything else becomes a
/// reconciliation failure carrying the underlying cause.
fn wrap_unexpected(err: Error) -> Error {
    match err {
        e @ Error::Validation(_) => e,
        other => Error::Reconciliation(other.to_string()),
    }
}
