//! Users and revoked bearer tokens.
//!
//! Credentials are hashed by the caller; the engine stores and looks up what
//! it is given.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, TransactionTrait, prelude::*, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{CategoryKind, EngineError, ResultEngine, User, revoked_tokens, users};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a user together with both of their "Other" categories.
    pub async fn register_user(&self, email: &str, password_hash: &str) -> ResultEngine<User> {
        let email = email.trim().to_string();
        with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(
                    "email already registered".to_string(),
                ));
            }

            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                email,
                password_hash: password_hash.to_string(),
                created_at: now,
                updated_at: now,
            };
            users::ActiveModel::from(&user).insert(&db_tx).await?;
            self.system_other(&db_tx, user.id, CategoryKind::Expense)
                .await?;
            self.system_other(&db_tx, user.id, CategoryKind::Income)
                .await?;

            tracing::info!(user_id = %user.id, "user registered");
            Ok(user)
        })
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<Option<User>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.trim()))
            .one(&self.database)
            .await?
            .map(User::try_from)
            .transpose()
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        let model = self.require_user(&self.database, user_id).await?;
        User::try_from(model)
    }

    /// Denies `jti` until `expires_at`. Revoking twice is a no-op.
    pub async fn revoke_token(
        &self,
        user_id: Uuid,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let row = revoked_tokens::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            jti: ActiveValue::Set(jti.to_string()),
            expires_at: ActiveValue::Set(expires_at),
            created_at: ActiveValue::Set(Utc::now()),
        };
        revoked_tokens::Entity::insert(row)
            .on_conflict(
                OnConflict::column(revoked_tokens::Column::Jti)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;
        Ok(())
    }

    pub async fn is_token_revoked(&self, jti: &str) -> ResultEngine<bool> {
        let row = revoked_tokens::Entity::find()
            .filter(revoked_tokens::Column::Jti.eq(jti))
            .one(&self.database)
            .await?;
        Ok(row.is_some())
    }

    /// Drops revocations whose token expired before `now`; such tokens are
    /// rejected on their own. Returns the number of rows removed.
    pub async fn purge_revoked_tokens(&self, now: DateTime<Utc>) -> ResultEngine<u64> {
        let result = revoked_tokens::Entity::delete_many()
            .filter(revoked_tokens::Column::ExpiresAt.lt(now))
            .exec(&self.database)
            .await?;
        if result.rows_affected > 0 {
            tracing::info!(removed = result.rows_affected, "revoked tokens purged");
        }
        Ok(result.rows_affected)
    }
}
