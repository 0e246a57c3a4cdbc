//! Ledger engine.
//!
//! The engine owns every mutation of accounts, categories and transactions.
//! The cached `accounts.balance` column is only ever changed together with
//! the ledger rows that justify it, inside one database transaction:
//!
//! ```text
//! balance == initial_balance + Σ delta(tx) for every live tx of the account
//! ```

pub use accounts::{Account, AccountKind};
pub use categories::{Category, CategoryKind, OTHER_CATEGORY_NAME};
pub use commands::{NewAccountCmd, NewTransactionCmd, TransactionPatchCmd};
pub use error::EngineError;
pub use ops::{
    AccountReconciliation, CategoryDeletion, Engine, EngineBuilder, TransactionListFilter,
};
pub use transactions::{Transaction, TransactionKind};
pub use sea_orm::DbErr;
pub use users::User;
pub use util::MAX_AMOUNT;

mod accounts;
mod categories;
mod commands;
mod error;
mod ops;
mod revoked_tokens;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
