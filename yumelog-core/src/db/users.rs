//! User database operations
//!
//! Credentials live with the external auth layer; this module only owns the
//! account row that dreams and tags hang off.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::db::models::User;
use crate::error::{Error, Result};

/// Create a new user. Email and username must be present and unique.
pub async fn create_user(pool: &SqlitePool, email: &str, username: &str) -> Result<User> {
    let mut errors = Vec::new();
    if email.trim().is_empty() {
        errors.push("Email can't be blank".to_string());
    }
    if username.trim().is_empty() {
        errors.push("Username can't be blank".to_string());
    }
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let user = User::new(email.to_string(), username.to_string());

    let result = sqlx::query(
        r#"
        INSERT INTO users (guid, email, username, created_at, updated_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(user.guid.to_string())
    .bind(&user.email)
    .bind(&user.username)
    .bind(user.created_at.to_rfc3339())
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            info!("Created user {} ({})", user.username, user.guid);
            Ok(user)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            let message = if db_err.message().contains("users.email") {
                "Email has already been taken"
            } else {
                "Username has already been taken"
            };
            Err(Error::validation(message))
        }
        Err(e) => Err(e.into()),
    }
}

/// Look up a user by login identifier, matching email or username exactly.
/// Case-sensitive by design: no normalization is applied to either side.
pub async fn find_user_by_login(pool: &SqlitePool, login: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT guid, email, username, created_at
        FROM users
        WHERE email = ? OR username = ?
        "#,
    )
    .bind(login)
    .bind(login)
    .fetch_optional(pool)
    .await?;

    row.map(|r| user_from_row(&r)).transpose()
}

/// Load a user by guid
pub async fn load_user(conn: &mut SqliteConnection, user_id: Uuid) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT guid, email, username, created_at
        FROM users
        WHERE guid = ?
        "#,
    )
    .bind(user_id.to_string())
    .fetch_optional(conn)
    .await?;

    row.map(|r| user_from_row(&r)).transpose()
}

/// Delete a user. Their dreams, tags, and associations cascade away.
pub async fn delete_user(pool: &SqlitePool, user_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM users WHERE guid = ?")
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("User"));
    }

    info!("Deleted user {}", user_id);
    Ok(())
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    let guid: String = row.get("guid");
    let created_at: String = row.get("created_at");

    Ok(User {
        guid: crate::db::parse_guid(&guid)?,
        email: row.get("email"),
        username: row.get("username"),
        created_at: crate::db::parse_timestamp(&created_at)?,
    })
}
