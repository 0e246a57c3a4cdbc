use chrono::{TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AccountKind, Engine, EngineError, MAX_AMOUNT, NewAccountCmd, NewTransactionCmd, TransactionKind,
    TransactionListFilter, User,
};
use migration::MigratorTrait;

async fn engine_with_user() -> (Engine, DatabaseConnection, User) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let user = engine
        .register_user("alice@example.com", "hash")
        .await
        .unwrap();
    (engine, db, user)
}

#[tokio::test]
async fn create_account_defaults() {
    let (engine, _db, user) = engine_with_user().await;

    let account = engine
        .create_account(NewAccountCmd::new(user.id, "  Wallet ").initial_balance(1500))
        .await
        .unwrap();
    assert_eq!(account.name, "Wallet");
    assert_eq!(account.kind, AccountKind::Manual);
    assert_eq!(account.balance, 1500);
    assert_eq!(account.initial_balance, 1500);
    assert_eq!(account.external_id, None);

    let stored = engine.account(user.id, account.id).await.unwrap();
    assert_eq!(stored.balance, 1500);
}

#[tokio::test]
async fn imported_account_keeps_sync_metadata() {
    let (engine, _db, user) = engine_with_user().await;
    let synced = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();

    let account = engine
        .create_account(
            NewAccountCmd::new(user.id, "Bank")
                .kind(AccountKind::Imported)
                .external_id("ext-1")
                .last_synced_at(synced),
        )
        .await
        .unwrap();
    let stored = engine.account(user.id, account.id).await.unwrap();
    assert_eq!(stored.kind, AccountKind::Imported);
    assert_eq!(stored.external_id.as_deref(), Some("ext-1"));
    assert_eq!(stored.last_synced_at, Some(synced));
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let (engine, _db, user) = engine_with_user().await;
    let err = engine
        .create_account(NewAccountCmd::new(user.id, " "))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
}

#[tokio::test]
async fn list_is_scoped_to_owner() {
    let (engine, _db, alice) = engine_with_user().await;
    let bob = engine
        .register_user("bob@example.com", "hash")
        .await
        .unwrap();
    engine
        .create_account(NewAccountCmd::new(alice.id, "A"))
        .await
        .unwrap();
    engine
        .create_account(NewAccountCmd::new(alice.id, "B"))
        .await
        .unwrap();
    let bobs = engine
        .create_account(NewAccountCmd::new(bob.id, "C"))
        .await
        .unwrap();

    assert_eq!(engine.list_accounts(alice.id).await.unwrap().len(), 2);
    assert_eq!(engine.list_accounts(bob.id).await.unwrap().len(), 1);
    assert!(matches!(
        engine.account(alice.id, bobs.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn rename_changes_name_only() {
    let (engine, _db, user) = engine_with_user().await;
    let account = engine
        .create_account(NewAccountCmd::new(user.id, "Old").initial_balance(42))
        .await
        .unwrap();

    let renamed = engine
        .rename_account(user.id, account.id, "New")
        .await
        .unwrap();
    assert_eq!(renamed.name, "New");
    assert_eq!(renamed.balance, 42);
    assert_eq!(renamed.kind, AccountKind::Manual);
}

#[tokio::test]
async fn delete_manual_account_cascades_transactions() {
    let (engine, _db, user) = engine_with_user().await;
    let account = engine
        .create_account(NewAccountCmd::new(user.id, "Cash"))
        .await
        .unwrap();
    for amount in [5, 6] {
        engine
            .create_transaction(NewTransactionCmd::new(
                user.id,
                account.id,
                amount,
                TransactionKind::Expense,
                Utc::now(),
            ))
            .await
            .unwrap();
    }

    engine.delete_account(user.id, account.id).await.unwrap();
    assert!(matches!(
        engine.account(user.id, account.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(
        engine
            .list_transactions(user.id, &TransactionListFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn imported_account_cannot_be_deleted() {
    let (engine, _db, user) = engine_with_user().await;
    let account = engine
        .create_account(NewAccountCmd::new(user.id, "Bank").kind(AccountKind::Imported))
        .await
        .unwrap();

    let err = engine.delete_account(user.id, account.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Immutable(_)));
    assert!(engine.account(user.id, account.id).await.is_ok());
}

#[tokio::test]
async fn reconcile_repairs_drifted_balance() {
    let (engine, db, user) = engine_with_user().await;
    let account = engine
        .create_account(NewAccountCmd::new(user.id, "Cash").initial_balance(100))
        .await
        .unwrap();
    engine
        .create_transaction(NewTransactionCmd::new(
            user.id,
            account.id,
            40,
            TransactionKind::Income,
            Utc::now(),
        ))
        .await
        .unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE accounts SET balance = ? WHERE id = ?",
        vec![9999i64.into(), account.id.to_string().into()],
    ))
    .await
    .unwrap();

    let report = engine.reconcile_account(account.id).await.unwrap();
    assert_eq!(report.stored, 9999);
    assert_eq!(report.expected, 140);
    assert!(!report.is_consistent());

    assert_eq!(engine.account(user.id, account.id).await.unwrap().balance, 140);
    assert!(engine.reconcile_account(account.id).await.unwrap().is_consistent());
}

#[tokio::test]
async fn initial_balance_above_maximum_is_rejected() {
    let (engine, _db, user) = engine_with_user().await;
    for initial_balance in [MAX_AMOUNT + 1, -MAX_AMOUNT - 1, i64::MAX, i64::MIN] {
        let err = engine
            .create_account(NewAccountCmd::new(user.id, "Cash").initial_balance(initial_balance))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
    assert!(engine.list_accounts(user.id).await.unwrap().is_empty());

    let account = engine
        .create_account(NewAccountCmd::new(user.id, "Cash").initial_balance(-MAX_AMOUNT))
        .await
        .unwrap();
    assert_eq!(account.balance, -MAX_AMOUNT);
}

#[tokio::test]
async fn reconcile_reports_ledger_sum_out_of_range() {
    let (engine, db, user) = engine_with_user().await;
    let account = engine
        .create_account(NewAccountCmd::new(user.id, "Cash"))
        .await
        .unwrap();
    let tx = engine
        .create_transaction(NewTransactionCmd::new(
            user.id,
            account.id,
            0,
            TransactionKind::Income,
            Utc::now(),
        ))
        .await
        .unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE accounts SET balance = ?, initial_balance = ? WHERE id = ?",
        vec![
            (i64::MAX - 5).into(),
            (i64::MAX - 5).into(),
            account.id.to_string().into(),
        ],
    ))
    .await
    .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE transactions SET amount = ? WHERE id = ?",
        vec![10i64.into(), tx.id.to_string().into()],
    ))
    .await
    .unwrap();

    let err = engine.reconcile_account(account.id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("account balance out of range".to_string())
    );
    assert_eq!(
        engine.account(user.id, account.id).await.unwrap().balance,
        i64::MAX - 5
    );
}
