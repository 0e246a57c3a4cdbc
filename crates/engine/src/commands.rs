//! Command structs for engine write operations.
//!
//! These types group parameters for account/transaction creation and
//! transaction patches, keeping call sites readable and avoiding long
//! argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{AccountKind, TransactionKind};

/// Create an account.
#[derive(Clone, Debug)]
pub struct NewAccountCmd {
    pub user_id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub initial_balance: i64,
    pub external_id: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl NewAccountCmd {
    #[must_use]
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            kind: AccountKind::Manual,
            initial_balance: 0,
            external_id: None,
            last_synced_at: None,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: AccountKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn initial_balance(mut self, initial_balance: i64) -> Self {
        self.initial_balance = initial_balance;
        self
    }

    #[must_use]
    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    #[must_use]
    pub fn last_synced_at(mut self, last_synced_at: DateTime<Utc>) -> Self {
        self.last_synced_at = Some(last_synced_at);
        self
    }
}

/// Create an income or expense transaction.
///
/// Without a category the transaction lands in the user's "Other" category of
/// the matching kind.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub amount: i64,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    pub comment: Option<String>,
    pub is_imported: bool,
    pub is_hidden: bool,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        account_id: Uuid,
        amount: i64,
        kind: TransactionKind,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            account_id,
            amount,
            kind,
            occurred_at,
            category_id: None,
            comment: None,
            is_imported: false,
            is_hidden: false,
        }
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn imported(mut self, is_imported: bool) -> Self {
        self.is_imported = is_imported;
        self
    }

    #[must_use]
    pub fn hidden(mut self, is_hidden: bool) -> Self {
        self.is_hidden = is_hidden;
        self
    }
}

/// Partially update a transaction.
///
/// Fields left as `None` are untouched. For `comment`, `Some("")` clears the
/// stored value. Imported transactions only honor `category_id`, `comment`
/// and `is_hidden`; the other fields are ignored for them.
#[derive(Clone, Debug)]
pub struct TransactionPatchCmd {
    pub user_id: Uuid,
    pub transaction_id: Uuid,
    pub amount: Option<i64>,
    pub kind: Option<TransactionKind>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
    pub comment: Option<String>,
    pub is_hidden: Option<bool>,
}

impl TransactionPatchCmd {
    #[must_use]
    pub fn new(user_id: Uuid, transaction_id: Uuid) -> Self {
        Self {
            user_id,
            transaction_id,
            amount: None,
            kind: None,
            occurred_at: None,
            category_id: None,
            comment: None,
            is_hidden: None,
        }
    }

    #[must_use]
    pub fn amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn hidden(mut self, is_hidden: bool) -> Self {
        self.is_hidden = Some(is_hidden);
        self
    }

    /// True when at least one field an imported transaction accepts is set.
    pub fn touches_imported_fields(&self) -> bool {
        self.category_id.is_some() || self.comment.is_some() || self.is_hidden.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.touches_imported_fields()
            && self.amount.is_none()
            && self.kind.is_none()
            && self.occurred_at.is_none()
    }
}
