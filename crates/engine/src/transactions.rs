//! Transaction primitives.
//!
//! A `Transaction` is a single income or expense against one account. Its
//! contribution to the account balance is its [`delta`](Transaction::delta):
//! `amount` is always non-negative and the kind carries the sign.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Signed balance contribution of `amount` for this kind.
    pub fn signed(self, amount: i64) -> i64 {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidKind(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub category_id: Uuid,
    pub amount: i64,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
    pub comment: Option<String>,
    pub is_imported: bool,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Income yields `+amount`, expense yields `-amount`.
    pub fn delta(&self) -> i64 {
        self.kind.signed(self.amount)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub category_id: String,
    pub amount: i64,
    pub kind: String,
    pub occurred_at: DateTimeUtc,
    pub comment: Option<String>,
    pub is_imported: bool,
    pub is_hidden: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.to_string()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            category_id: ActiveValue::Set(tx.category_id.to_string()),
            amount: ActiveValue::Set(tx.amount),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            comment: ActiveValue::Set(tx.comment.clone()),
            is_imported: ActiveValue::Set(tx.is_imported),
            is_hidden: ActiveValue::Set(tx.is_hidden),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            category_id: parse_uuid(&model.category_id, "category")?,
            amount: model.amount,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            occurred_at: model.occurred_at,
            comment: model.comment,
            is_imported: model.is_imported,
            is_hidden: model.is_hidden,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn transaction(kind: TransactionKind, amount: i64) -> Transaction {
        let at = Utc.timestamp_opt(0, 0).unwrap();
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            amount,
            kind,
            occurred_at: at,
            comment: None,
            is_imported: false,
            is_hidden: false,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn income_delta_is_positive() {
        assert_eq!(transaction(TransactionKind::Income, 1040).delta(), 1040);
    }

    #[test]
    fn expense_delta_is_negative() {
        assert_eq!(transaction(TransactionKind::Expense, 300).delta(), -300);
    }

    #[test]
    fn zero_amount_has_zero_delta() {
        assert_eq!(transaction(TransactionKind::Expense, 0).delta(), 0);
    }

    #[test]
    fn kind_round_trips_through_storage_string() {
        for kind in [TransactionKind::Income, TransactionKind::Expense] {
            assert_eq!(TransactionKind::try_from(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    #[should_panic(expected = "InvalidKind(\"invalid transaction type: transfer\")")]
    fn unknown_kind_is_rejected() {
        TransactionKind::try_from("transfer").unwrap();
    }
}
