//! Integration tests for user account updates.

use sqlx::PgPool;
use taskforge_db::models::user::{CreateUser, UpdateProfile};
use taskforge_db::repositories::UserRepo;

async fn new_user(pool: &PgPool, username: &str, name: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            username: username.to_string(),
            email: None,
            password_hash: "old-hash".to_string(),
            role: "developer".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_user_has_empty_profile(pool: PgPool) {
    let id = new_user(&pool, "ana", "Ana").await;
    let user = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(user.bio, "");
    assert!(user.avatar_url.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_orders_by_name_and_pages(pool: PgPool) {
    new_user(&pool, "zed", "Zed").await;
    new_user(&pool, "ana", "Ana").await;
    new_user(&pool, "mo", "Mo").await;

    let first = UserRepo::list(&pool, 2, 0).await.unwrap();
    let names: Vec<&str> = first.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Mo"]);

    let rest = UserRepo::list(&pool, 2, 2).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].name, "Zed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_profile_keeps_omitted_fields(pool: PgPool) {
    let id = new_user(&pool, "ana", "Ana").await;

    let updated = UserRepo::update_profile(
        &pool,
        id,
        &UpdateProfile {
            bio: Some("Backend".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.name, "Ana");
    assert_eq!(updated.bio, "Backend");

    let renamed = UserRepo::update_profile(
        &pool,
        id,
        &UpdateProfile {
            name: Some("Ana Lima".to_string()),
            avatar_url: Some("https://img.example/ana.png".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(renamed.name, "Ana Lima");
    assert_eq!(renamed.bio, "Backend");
    assert_eq!(renamed.avatar_url.as_deref(), Some("https://img.example/ana.png"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_role_and_password(pool: PgPool) {
    let id = new_user(&pool, "ana", "Ana").await;

    let promoted = UserRepo::update_role(&pool, id, "project_manager")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(promoted.role, "project_manager");
    assert!(UserRepo::update_role(&pool, id + 1000, "admin")
        .await
        .unwrap()
        .is_none());

    let err = UserRepo::update_role(&pool, id, "superuser").await.unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("ck_users_role"));

    assert!(UserRepo::update_password(&pool, id, "new-hash").await.unwrap());
    let user = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(user.password_hash, "new-hash");
    assert!(!UserRepo::update_password(&pool, id + 1000, "x").await.unwrap());
}
