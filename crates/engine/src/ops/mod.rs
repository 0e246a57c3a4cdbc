use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod accounts;
mod balances;
mod categories;
mod transactions;
mod users;

pub use balances::AccountReconciliation;
pub use categories::CategoryDeletion;
pub use transactions::TransactionListFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// Every statement in the block must go through `$tx`: with a single-connection
/// pool, reaching for `self.database` while `$tx` is open never returns.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point for every ledger operation.
///
/// Holds the connection pool only; it is `Send + Sync` and meant to be shared
/// behind an `Arc`.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Starts an [`EngineBuilder`]; the database connection is its only input.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Collects the connection an [`Engine`] runs on.
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// The connection every operation runs on. It must already be migrated.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Finishes the builder. Nothing is checked against the database here.
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
