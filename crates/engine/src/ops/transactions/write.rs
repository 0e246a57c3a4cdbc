use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, CategoryKind, EngineError, NewTransactionCmd, ResultEngine, Transaction,
    TransactionKind, TransactionPatchCmd, transactions,
    util::{
        apply_optional_text_patch, balance_out_of_range, normalize_optional_text, validate_amount,
    },
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Picks the category for a transaction of `kind`.
    ///
    /// An explicit category must be visible to the user and of the same kind;
    /// without one the user's "Other" category of that kind is used.
    async fn resolve_category(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: Uuid,
        category_id: Option<Uuid>,
        kind: TransactionKind,
    ) -> ResultEngine<Category> {
        match category_id {
            Some(category_id) => {
                let category = self.visible_category(db_tx, user_id, category_id).await?;
                if !category.kind.matches(kind) {
                    return Err(EngineError::CategoryMismatch(
                        "category type mismatch".to_string(),
                    ));
                }
                Ok(category)
            }
            None => {
                self.system_other(db_tx, user_id, CategoryKind::from(kind))
                    .await
            }
        }
    }

    /// Records an income or expense and moves the account balance by its
    /// delta.
    pub async fn create_transaction(&self, cmd: NewTransactionCmd) -> ResultEngine<Transaction> {
        validate_amount(cmd.amount)?;
        let comment = normalize_optional_text(cmd.comment.as_deref());

        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, cmd.user_id, cmd.account_id)
                .await?;
            let category = self
                .resolve_category(&db_tx, cmd.user_id, cmd.category_id, cmd.kind)
                .await?;

            let now = Utc::now();
            let transaction = Transaction {
                id: Uuid::new_v4(),
                user_id: cmd.user_id,
                account_id: cmd.account_id,
                category_id: category.id,
                amount: cmd.amount,
                kind: cmd.kind,
                occurred_at: cmd.occurred_at,
                comment,
                is_imported: cmd.is_imported,
                is_hidden: cmd.is_hidden,
                created_at: now,
                updated_at: now,
            };
            transactions::ActiveModel::from(&transaction)
                .insert(&db_tx)
                .await?;
            self.apply_delta(&db_tx, transaction.account_id, transaction.delta())
                .await?;

            tracing::debug!(
                user_id = %transaction.user_id,
                transaction_id = %transaction.id,
                delta = transaction.delta(),
                "transaction created"
            );
            Ok(transaction)
        })
    }

    /// Applies a partial update.
    ///
    /// Imported transactions accept only `category_id`, `comment` and
    /// `is_hidden`, never touch the balance, and reject a patch carrying none
    /// of those. Manual transactions accept every field; the balance moves by
    /// the difference between the new and the old delta.
    pub async fn patch_transaction(&self, cmd: TransactionPatchCmd) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, cmd.user_id, cmd.transaction_id)
                .await?;
            let current = Transaction::try_from(model)?;
            if current.is_imported {
                self.patch_imported(&db_tx, current, &cmd).await
            } else {
                self.patch_manual(&db_tx, current, &cmd).await
            }
        })
    }

    async fn patch_imported(
        &self,
        db_tx: &DatabaseTransaction,
        current: Transaction,
        cmd: &TransactionPatchCmd,
    ) -> ResultEngine<Transaction> {
        if !cmd.touches_imported_fields() {
            return Err(EngineError::EmptyPatch(
                "imported transactions accept only category_id, comment and is_hidden"
                    .to_string(),
            ));
        }

        let mut updated = current;
        if let Some(category_id) = cmd.category_id {
            let category = self
                .resolve_category(db_tx, cmd.user_id, Some(category_id), updated.kind)
                .await?;
            updated.category_id = category.id;
        }
        updated.comment = apply_optional_text_patch(updated.comment, cmd.comment.as_deref());
        if let Some(is_hidden) = cmd.is_hidden {
            updated.is_hidden = is_hidden;
        }
        updated.updated_at = Utc::now();

        transactions::ActiveModel {
            id: ActiveValue::Unchanged(updated.id.to_string()),
            category_id: ActiveValue::Set(updated.category_id.to_string()),
            comment: ActiveValue::Set(updated.comment.clone()),
            is_hidden: ActiveValue::Set(updated.is_hidden),
            updated_at: ActiveValue::Set(updated.updated_at),
            ..Default::default()
        }
        .update(db_tx)
        .await?;
        Ok(updated)
    }

    async fn patch_manual(
        &self,
        db_tx: &DatabaseTransaction,
        current: Transaction,
        cmd: &TransactionPatchCmd,
    ) -> ResultEngine<Transaction> {
        if cmd.is_empty() {
            return Ok(current);
        }
        if let Some(amount) = cmd.amount {
            validate_amount(amount)?;
        }

        let old_delta = current.delta();
        let mut updated = current;
        if let Some(amount) = cmd.amount {
            updated.amount = amount;
        }
        if let Some(kind) = cmd.kind {
            updated.kind = kind;
        }
        if let Some(occurred_at) = cmd.occurred_at {
            updated.occurred_at = occurred_at;
        }
        match cmd.category_id {
            Some(category_id) => {
                let category = self
                    .resolve_category(db_tx, cmd.user_id, Some(category_id), updated.kind)
                    .await?;
                updated.category_id = category.id;
            }
            None if cmd.kind.is_some() => {
                // The kept category must still fit the new kind.
                let category = self
                    .visible_category(db_tx, cmd.user_id, updated.category_id)
                    .await?;
                if !category.kind.matches(updated.kind) {
                    return Err(EngineError::CategoryMismatch(
                        "category type mismatch".to_string(),
                    ));
                }
            }
            None => {}
        }
        updated.comment = apply_optional_text_patch(updated.comment, cmd.comment.as_deref());
        if let Some(is_hidden) = cmd.is_hidden {
            updated.is_hidden = is_hidden;
        }
        updated.updated_at = Utc::now();
        let diff = updated
            .delta()
            .checked_sub(old_delta)
            .ok_or_else(balance_out_of_range)?;

        transactions::ActiveModel {
            id: ActiveValue::Unchanged(updated.id.to_string()),
            amount: ActiveValue::Set(updated.amount),
            kind: ActiveValue::Set(updated.kind.as_str().to_string()),
            occurred_at: ActiveValue::Set(updated.occurred_at),
            category_id: ActiveValue::Set(updated.category_id.to_string()),
            comment: ActiveValue::Set(updated.comment.clone()),
            is_hidden: ActiveValue::Set(updated.is_hidden),
            updated_at: ActiveValue::Set(updated.updated_at),
            ..Default::default()
        }
        .update(db_tx)
        .await?;

        self.apply_delta(db_tx, updated.account_id, diff).await?;
        tracing::debug!(transaction_id = %updated.id, diff, "transaction patched");
        Ok(updated)
    }

    /// Deletes a manual transaction and takes its delta back out of the
    /// account balance. Imported transactions cannot be deleted.
    pub async fn delete_transaction(&self, user_id: Uuid, transaction_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            let transaction = Transaction::try_from(model)?;
            if transaction.is_imported {
                return Err(EngineError::Immutable(
                    "imported transactions cannot be deleted".to_string(),
                ));
            }

            transactions::Entity::delete_by_id(transaction.id.to_string())
                .exec(&db_tx)
                .await?;
            self.apply_delta(&db_tx, transaction.account_id, -transaction.delta())
                .await?;
            tracing::debug!(%user_id, %transaction_id, "transaction deleted");
            Ok(())
        })
    }
}
