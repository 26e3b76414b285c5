//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use yumelog_core::db::{init, users};
use yumelog_core::{DreamDraft, EmotionColor, TagCategory, TagDescriptor, User};

/// In-memory database with the full schema applied.
/// Single connection so every query sees the same memory database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    init::init_schema(&pool).await.unwrap();

    pool
}

pub async fn create_user(pool: &SqlitePool, name: &str) -> User {
    users::create_user(pool, &format!("{name}@example.com"), name)
        .await
        .expect("Failed to create user")
}

pub fn draft(title: &str, content: &str, dreamed_at: DateTime<Utc>) -> DreamDraft {
    DreamDraft {
        title: title.to_string(),
        content: content.to_string(),
        emotion_color: EmotionColor::Peace,
        lucid_dream_flag: false,
        dreamed_at,
    }
}

pub fn descriptor(name: &str, yomi: &str, category: TagCategory) -> TagDescriptor {
    TagDescriptor {
        name: name.to_string(),
        yomi: yomi.to_string(),
        category,
    }
}

/// A fixed timestamp `days` days into January 2026
pub fn day(days: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, days, 12, 0, 0).unwrap()
}
