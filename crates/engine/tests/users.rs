use chrono::{Duration, Utc};
use sea_orm::Database;

use engine::{CategoryKind, Engine, EngineError};
use migration::MigratorTrait;

async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let engine = engine().await;
    engine
        .register_user("alice@example.com", "hash")
        .await
        .unwrap();

    let err = engine
        .register_user("alice@example.com", "other")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ExistingKey("email already registered".to_string())
    );
}

#[tokio::test]
async fn lookup_by_email_and_id() {
    let engine = engine().await;
    let user = engine
        .register_user("alice@example.com", "hash")
        .await
        .unwrap();

    let found = engine
        .user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.password_hash, "hash");
    assert!(engine.user_by_email("bob@example.com").await.unwrap().is_none());
    assert_eq!(engine.user(user.id).await.unwrap().email, "alice@example.com");
}

#[tokio::test]
async fn registered_user_owns_other_categories() {
    let engine = engine().await;
    let user = engine
        .register_user("alice@example.com", "hash")
        .await
        .unwrap();

    let expense = engine
        .ensure_system_other(user.id, CategoryKind::Expense)
        .await
        .unwrap();
    assert_eq!(expense.user_id, Some(user.id));
}

#[tokio::test]
async fn revoking_is_idempotent() {
    let engine = engine().await;
    let user = engine
        .register_user("alice@example.com", "hash")
        .await
        .unwrap();
    let expires_at = Utc::now() + Duration::hours(1);

    assert!(!engine.is_token_revoked("jti-1").await.unwrap());
    engine.revoke_token(user.id, "jti-1", expires_at).await.unwrap();
    engine.revoke_token(user.id, "jti-1", expires_at).await.unwrap();
    assert!(engine.is_token_revoked("jti-1").await.unwrap());
    assert!(!engine.is_token_revoked("jti-2").await.unwrap());
}

#[tokio::test]
async fn purge_drops_only_expired_revocations() {
    let engine = engine().await;
    let user = engine
        .register_user("alice@example.com", "hash")
        .await
        .unwrap();
    let now = Utc::now();
    engine
        .revoke_token(user.id, "old", now - Duration::hours(2))
        .await
        .unwrap();
    engine
        .revoke_token(user.id, "fresh", now + Duration::hours(2))
        .await
        .unwrap();

    assert_eq!(engine.purge_revoked_tokens(now).await.unwrap(), 1);
    assert!(!engine.is_token_revoked("old").await.unwrap());
    assert!(engine.is_token_revoked("fresh").await.unwrap());
}
