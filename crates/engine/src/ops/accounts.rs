use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, EngineError, NewAccountCmd, ResultEngine, accounts, transactions,
    util::{normalize_optional_text, normalize_required_name, validate_initial_balance},
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn create_account(&self, cmd: NewAccountCmd) -> ResultEngine<Account> {
        let NewAccountCmd {
            user_id,
            name,
            kind,
            initial_balance,
            external_id,
            last_synced_at,
        } = cmd;
        let name = normalize_required_name(&name, "account")?;
        validate_initial_balance(initial_balance)?;

        let mut account = Account::new(user_id, name, kind, initial_balance, Utc::now());
        account.external_id = normalize_optional_text(external_id.as_deref());
        account.last_synced_at = last_synced_at;

        accounts::ActiveModel::from(&account)
            .insert(&self.database)
            .await?;
        tracing::debug!(%user_id, account_id = %account.id, kind = account.kind.as_str(), "account created");
        Ok(account)
    }

    /// Newest accounts first.
    pub async fn list_accounts(&self, user_id: Uuid) -> ResultEngine<Vec<Account>> {
        accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(accounts::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    pub async fn account(&self, user_id: Uuid, account_id: Uuid) -> ResultEngine<Account> {
        let model = self
            .require_account(&self.database, user_id, account_id)
            .await?;
        Account::try_from(model)
    }

    /// The name is the only mutable attribute of an account.
    pub async fn rename_account(
        &self,
        user_id: Uuid,
        account_id: Uuid,
        name: &str,
    ) -> ResultEngine<Account> {
        let name = normalize_required_name(name, "account")?;
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, user_id, account_id).await?;
            let mut active: accounts::ActiveModel = model.into();
            active.name = ActiveValue::Set(name);
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            Account::try_from(model)
        })
    }

    /// Deletes a manual account together with all of its transactions.
    ///
    /// Imported accounts mirror an external source and are refused.
    pub async fn delete_account(&self, user_id: Uuid, account_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let account = Account::try_from(
                self.require_account(&db_tx, user_id, account_id)
                    .await?,
            )?;
            if account.is_imported() {
                return Err(EngineError::Immutable(
                    "imported accounts cannot be deleted".to_string(),
                ));
            }

            let removed = transactions::Entity::delete_many()
                .filter(transactions::Column::AccountId.eq(account_id.to_string()))
                .exec(&db_tx)
                .await?
                .rows_affected;
            accounts::Entity::delete_by_id(account_id.to_string())
                .exec(&db_tx)
                .await?;

            tracing::info!(%user_id, %account_id, removed, "account deleted");
            Ok(())
        })
    }
}
