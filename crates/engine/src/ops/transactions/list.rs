use chrono::{DateTime, Utc};
use sea_orm::{Condition, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Transaction, TransactionKind, transactions};

use super::super::Engine;

/// Filters for listing transactions.
///
/// `from` and `to` are both inclusive, in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub is_hidden: Option<bool>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TransactionListFilter {
    fn validate(&self) -> ResultEngine<()> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(EngineError::InvalidFilter(
                "invalid range: start must not be after end".to_string(),
            ));
        }
        Ok(())
    }

    fn condition(&self, user_id: Uuid) -> Condition {
        let mut condition =
            Condition::all().add(transactions::Column::UserId.eq(user_id.to_string()));
        if let Some(account_id) = self.account_id {
            condition = condition.add(transactions::Column::AccountId.eq(account_id.to_string()));
        }
        if let Some(category_id) = self.category_id {
            condition =
                condition.add(transactions::Column::CategoryId.eq(category_id.to_string()));
        }
        if let Some(kind) = self.kind {
            condition = condition.add(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(is_hidden) = self.is_hidden {
            condition = condition.add(transactions::Column::IsHidden.eq(is_hidden));
        }
        if let Some(from) = self.from {
            condition = condition.add(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = self.to {
            condition = condition.add(transactions::Column::OccurredAt.lte(to));
        }
        condition
    }
}

impl Engine {
    pub async fn transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let model = self
            .require_transaction(&self.database, user_id, transaction_id)
            .await?;
        Transaction::try_from(model)
    }

    /// Lists the user's transactions, most recent `occurred_at` first.
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        filter.validate()?;
        transactions::Entity::find()
            .filter(filter.condition(user_id))
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }
}
