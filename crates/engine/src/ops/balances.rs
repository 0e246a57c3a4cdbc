use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, accounts, transactions, util::balance_out_of_range,
};

use super::{Engine, with_tx};

/// Outcome of [`Engine::reconcile_account`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountReconciliation {
    pub account_id: Uuid,
    /// Balance found in the account row before reconciling.
    pub stored: i64,
    /// `initial_balance` plus the delta of every transaction on the account.
    pub expected: i64,
}

impl AccountReconciliation {
    pub fn is_consistent(&self) -> bool {
        self.stored == self.expected
    }
}

impl Engine {
    /// Adds `delta` to the cached balance of `account_id`.
    ///
    /// Emits a single `balance = balance + ?` statement so concurrent writers
    /// never lose an update. A zero delta issues no statement. Returns the
    /// number of rows touched; a missing account is not an error here.
    ///
    /// The statement only matches while the result stays inside `i64`; an
    /// existing account it skips yields [`EngineError::InvalidAmount`].
    pub(super) async fn apply_delta(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        delta: i64,
    ) -> ResultEngine<u64> {
        if delta == 0 {
            return Ok(0);
        }
        let headroom = if delta > 0 {
            accounts::Column::Balance.lte(i64::MAX - delta)
        } else {
            accounts::Column::Balance.gte(i64::MIN - delta)
        };
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(delta),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .filter(headroom)
            .exec(db_tx)
            .await?;

        if result.rows_affected == 0
            && accounts::Entity::find_by_id(account_id.to_string())
                .one(db_tx)
                .await?
                .is_some()
        {
            tracing::warn!(%account_id, delta, "balance update out of range");
            return Err(balance_out_of_range());
        }
        Ok(result.rows_affected)
    }

    /// Sums the ledger of an account without touching it.
    async fn ledger_balance<C: ConnectionTrait>(
        &self,
        db: &C,
        account: &accounts::Model,
    ) -> ResultEngine<i64> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account.id.clone()))
            .all(db)
            .await?;
        models.into_iter().try_fold(account.initial_balance, |acc, model| {
            let delta = Transaction::try_from(model)?.delta();
            acc.checked_add(delta).ok_or_else(balance_out_of_range)
        })
    }

    /// Recomputes the balance of an account from its transactions and
    /// overwrites the cached value when they disagree.
    pub async fn reconcile_account(&self, account_id: Uuid) -> ResultEngine<AccountReconciliation> {
        with_tx!(self, |db_tx| {
            let account = accounts::Entity::find_by_id(account_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("account not found".to_string()))?;
            let expected = self.ledger_balance(&db_tx, &account).await?;
            let stored = account.balance;

            if stored != expected {
                tracing::warn!(%account_id, stored, expected, "account balance drifted, repairing");
                accounts::ActiveModel {
                    id: ActiveValue::Set(account.id.clone()),
                    balance: ActiveValue::Set(expected),
                    updated_at: ActiveValue::Set(Utc::now()),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
            }

            Ok(AccountReconciliation {
                account_id,
                stored,
                expected,
            })
        })
    }
}
