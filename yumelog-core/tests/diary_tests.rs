//! Diary write-path tests: transactions, ownership scoping, cascades

mod common;

use common::{create_user, day, descriptor, draft, test_pool};
use yumelog_core::db::{dream_tags, tags, users};
use yumelog_core::{diary, Error, TagCategory};

#[tokio::test]
async fn test_create_dream_with_tags() {
    let pool = test_pool().await;
    let user = create_user(&pool, "yume").await;

    let created = diary::create_dream(
        &pool,
        user.guid,
        draft("古びた洋館", "地下室の奥で目が覚めた。", day(1)),
        &[
            descriptor("洋館", "ようかん", TagCategory::Place),
            descriptor("管理人", "かんりにん", TagCategory::Person),
        ],
    )
    .await
    .unwrap();

    assert_eq!(created.dream.title, "古びた洋館");
    assert_eq!(created.tags.len(), 2);
}

#[tokio::test]
async fn test_create_rolls_back_on_bad_descriptor() {
    let pool = test_pool().await;
    let user = create_user(&pool, "yume").await;

    let err = diary::create_dream(
        &pool,
        user.guid,
        draft("夢", "内容", day(1)),
        &[
            descriptor("洋館", "ようかん", TagCategory::Place),
            descriptor("", "", TagCategory::Person),
        ],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // Nothing from the failed write is visible: no dream, no tag from the
    // first (valid) descriptor, no association
    for table in ["dreams", "tags", "dream_tags"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "expected empty {table} after rollback");
    }
}

#[tokio::test]
async fn test_create_rejects_invalid_draft() {
    let pool = test_pool().await;
    let user = create_user(&pool, "yume").await;

    let err = diary::create_dream(
        &pool,
        user.guid,
        draft("この題名は十五文字をこえてしまっている", "内容", day(1)),
        &[],
    )
    .await
    .unwrap_err();

    match err {
        Error::Validation(messages) => {
            assert_eq!(
                messages,
                vec!["Title is too long (maximum is 15 characters)".to_string()]
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_strips_markup_from_content() {
    let pool = test_pool().await;
    let user = create_user(&pool, "yume").await;

    let created = diary::create_dream(
        &pool,
        user.guid,
        draft("夢", "<p>廊下を<b>走った</b></p><script>alert(1)</script>", day(1)),
        &[],
    )
    .await
    .unwrap();

    assert_eq!(created.dream.content, "廊下を走った");

    let stored: String = sqlx::query_scalar("SELECT content FROM dreams WHERE guid = ?")
        .bind(created.dream.guid.to_string())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, "廊下を走った");
}

#[tokio::test]
async fn test_update_without_tag_key_leaves_tags_untouched() {
    let pool = test_pool().await;
    let user = create_user(&pool, "yume").await;
    let created = diary::create_dream(
        &pool,
        user.guid,
        draft("夢", "内容", day(1)),
        &[descriptor("森", "もり", TagCategory::Place)],
    )
    .await
    .unwrap();

    let updated = diary::update_dream(
        &pool,
        user.guid,
        created.dream.guid,
        draft("別の夢", "別の内容", day(2)),
        None,
    )
    .await
    .unwrap();

    assert_eq!(updated.dream.title, "別の夢");
    assert_eq!(updated.tags.len(), 1);
    assert_eq!(updated.tags[0].name, "森");
}

#[tokio::test]
async fn test_update_with_empty_tag_list_removes_all_tags() {
    let pool = test_pool().await;
    let user = create_user(&pool, "yume").await;
    let created = diary::create_dream(
        &pool,
        user.guid,
        draft("夢", "内容", day(1)),
        &[descriptor("森", "もり", TagCategory::Place)],
    )
    .await
    .unwrap();

    let updated = diary::update_dream(
        &pool,
        user.guid,
        created.dream.guid,
        draft("夢", "内容", day(1)),
        Some(&[]),
    )
    .await
    .unwrap();

    assert!(updated.tags.is_empty());
}

#[tokio::test]
async fn test_update_replaces_tag_set() {
    let pool = test_pool().await;
    let user = create_user(&pool, "yume").await;
    let created = diary::create_dream(
        &pool,
        user.guid,
        draft("夢", "内容", day(1)),
        &[descriptor("森", "もり", TagCategory::Place)],
    )
    .await
    .unwrap();

    let updated = diary::update_dream(
        &pool,
        user.guid,
        created.dream.guid,
        draft("夢", "内容", day(1)),
        Some(&[descriptor("海", "うみ", TagCategory::Place)]),
    )
    .await
    .unwrap();

    assert_eq!(updated.tags.len(), 1);
    assert_eq!(updated.tags[0].name, "海");
}

#[tokio::test]
async fn test_other_users_dream_reports_not_found() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let created = diary::create_dream(&pool, alice.guid, draft("夢", "内容", day(1)), &[])
        .await
        .unwrap();

    let get_err = diary::get_dream(&pool, bob.guid, created.dream.guid)
        .await
        .unwrap_err();
    assert!(matches!(get_err, Error::NotFound(_)));

    let update_err = diary::update_dream(
        &pool,
        bob.guid,
        created.dream.guid,
        draft("夢", "内容", day(1)),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(update_err, Error::NotFound(_)));

    let delete_err = diary::delete_dream(&pool, bob.guid, created.dream.guid)
        .await
        .unwrap_err();
    assert!(matches!(delete_err, Error::NotFound(_)));

    // The owner still sees it
    let got = diary::get_dream(&pool, alice.guid, created.dream.guid).await;
    assert!(got.is_ok());
}

#[tokio::test]
async fn test_delete_dream_cascades_associations_keeps_tags() {
    let pool = test_pool().await;
    let user = create_user(&pool, "yume").await;
    let created = diary::create_dream(
        &pool,
        user.guid,
        draft("夢", "内容", day(1)),
        &[descriptor("森", "もり", TagCategory::Place)],
    )
    .await
    .unwrap();

    diary::delete_dream(&pool, user.guid, created.dream.guid)
        .await
        .unwrap();

    let association_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dream_tags")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(association_count, 0);

    let remaining = tags::list_tags(&pool, user.guid, None, None).await.unwrap();
    assert_eq!(remaining.len(), 1);
}

#[tokio::test]
async fn test_delete_tag_cascades_associations_keeps_dreams() {
    let pool = test_pool().await;
    let user = create_user(&pool, "yume").await;
    let created = diary::create_dream(
        &pool,
        user.guid,
        draft("夢", "内容", day(1)),
        &[descriptor("森", "もり", TagCategory::Place)],
    )
    .await
    .unwrap();
    let tag_id = created.tags[0].guid;

    tags::delete_tag(&pool, user.guid, tag_id).await.unwrap();

    let after = dream_tags::tags_for_dream(&pool, created.dream.guid)
        .await
        .unwrap();
    assert!(after.is_empty());

    let dream = diary::get_dream(&pool, user.guid, created.dream.guid).await;
    assert!(dream.is_ok());
}

#[tokio::test]
async fn test_delete_user_cascades_everything() {
    let pool = test_pool().await;
    let user = create_user(&pool, "yume").await;
    diary::create_dream(
        &pool,
        user.guid,
        draft("夢", "内容", day(1)),
        &[descriptor("森", "もり", TagCategory::Place)],
    )
    .await
    .unwrap();

    users::delete_user(&pool, user.guid).await.unwrap();

    for table in ["dreams", "tags", "dream_tags"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "expected empty {table} after user delete");
    }
}

#[tokio::test]
async fn test_user_uniqueness() {
    let pool = test_pool().await;
    users::create_user(&pool, "yume@example.com", "yume")
        .await
        .unwrap();

    let email_err = users::create_user(&pool, "yume@example.com", "other")
        .await
        .unwrap_err();
    match email_err {
        Error::Validation(messages) => {
            assert_eq!(messages, vec!["Email has already been taken".to_string()]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let username_err = users::create_user(&pool, "other@example.com", "yume")
        .await
        .unwrap_err();
    match username_err {
        Error::Validation(messages) => {
            assert_eq!(messages, vec!["Username has already been taken".to_string()]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_lookup_is_exact_match() {
    let pool = test_pool().await;
    let user = users::create_user(&pool, "Yume@Example.com", "Yume")
        .await
        .unwrap();

    // Matches by email or by username
    let by_email = users::find_user_by_login(&pool, "Yume@Example.com")
        .await
        .unwrap();
    assert_eq!(by_email.map(|u| u.guid), Some(user.guid));

    let by_username = users::find_user_by_login(&pool, "Yume").await.unwrap();
    assert_eq!(by_username.map(|u| u.guid), Some(user.guid));

    // No case normalization on either side
    let wrong_case = users::find_user_by_login(&pool, "yume").await.unwrap();
    assert!(wrong_case.is_none());
}

#[tokio::test]
async fn test_overflow_fragments_from_own_dreams() {
    let pool = test_pool().await;
    let user = create_user(&pool, "yume").await;
    diary::create_dream(
        &pool,
        user.guid,
        draft(
            "夢",
            "遠くで鐘が響いた。扉が開いた。月が昇った。森が揺れた。影が伸びた。時計が止まった。",
            day(1),
        ),
        &[],
    )
    .await
    .unwrap();

    let fragments = diary::overflow_fragments(&pool, user.guid).await.unwrap();
    assert!(fragments.len() >= 5 && fragments.len() <= 8);
}
