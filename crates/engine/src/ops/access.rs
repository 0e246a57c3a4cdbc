//! Ownership lookups shared by the write paths.
//!
//! A row owned by another user is reported exactly like a missing one.

use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, accounts, transactions, users};

use super::Engine;

impl Engine {
    pub(super) async fn require_account<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        account_id: Uuid,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(account_id.to_string())
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not found".to_string()))
    }

    pub(super) async fn require_transaction<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id.to_string())
            .filter(transactions::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not found".to_string()))
    }

    pub(super) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not found".to_string()))
    }
}
