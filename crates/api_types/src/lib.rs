//! JSON bodies exchanged over the HTTP API.
//!
//! Field names follow the wire format; the `type` key maps to `kind` on the
//! Rust side.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `{"status":"ok"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub status: String,
}

impl Status {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

pub mod error {
    use super::*;

    /// Body of every non-2xx response: `{"error":{"code":..,"message":..}}`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: ApiError,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ApiError {
        pub code: String,
        pub message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub details: Option<String>,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Credentials {
        pub email: String,
        pub password: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub email: String,
    }

    /// Returned by register and login.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Session {
        pub user: UserView,
        pub token: String,
        pub expires_at: DateTime<Utc>,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountType {
        #[default]
        Manual,
        Imported,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        #[serde(rename = "type", default)]
        pub kind: Option<AccountType>,
        #[serde(default)]
        pub initial_balance: i64,
        #[serde(default)]
        pub external_id: Option<String>,
        #[serde(default)]
        pub last_synced_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountPatch {
        #[serde(default)]
        pub name: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub user_id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: AccountType,
        pub initial_balance: i64,
        pub balance: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub external_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub last_synced_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountBody {
        pub account: AccountView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountList {
        pub accounts: Vec<AccountView>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryType {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: CategoryType,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryPatch {
        #[serde(default)]
        pub name: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        /// Absent for global categories.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub user_id: Option<Uuid>,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: CategoryType,
        pub is_system: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryBody {
        pub category: CategoryView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryList {
        pub categories: Vec<CategoryView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionType {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: Uuid,
        #[serde(default)]
        pub category_id: Option<Uuid>,
        pub amount: i64,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub occurred_at: DateTime<FixedOffset>,
        #[serde(default)]
        pub comment: Option<String>,
        #[serde(default)]
        pub is_imported: Option<bool>,
        #[serde(default)]
        pub is_hidden: Option<bool>,
    }

    /// Every field is optional; absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionPatch {
        #[serde(default)]
        pub amount: Option<i64>,
        #[serde(rename = "type", default)]
        pub kind: Option<TransactionType>,
        #[serde(default)]
        pub occurred_at: Option<DateTime<FixedOffset>>,
        #[serde(default)]
        pub category_id: Option<Uuid>,
        #[serde(default)]
        pub comment: Option<String>,
        #[serde(default)]
        pub is_hidden: Option<bool>,
    }

    /// Query string of `GET /transactions`. Values stay raw so the handler can
    /// report which one is malformed.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionQuery {
        pub account_id: Option<String>,
        pub category_id: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub is_hidden: Option<String>,
        pub start: Option<String>,
        pub end: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub user_id: Uuid,
        pub account_id: Uuid,
        pub category_id: Uuid,
        pub amount: i64,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub occurred_at: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub comment: Option<String>,
        pub is_imported: bool,
        pub is_hidden: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionBody {
        pub transaction: TransactionView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionList {
        pub transactions: Vec<TransactionView>,
    }
}
