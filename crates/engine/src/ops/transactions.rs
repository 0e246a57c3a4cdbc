//! Transaction lifecycle: create, read, patch and delete.
//!
//! Every write keeps the account balance in step with the ledger: the row
//! change and the matching [`apply_delta`](Engine::apply_delta) run in the
//! same database transaction.

mod list;
mod write;

pub use list::TransactionListFilter;
