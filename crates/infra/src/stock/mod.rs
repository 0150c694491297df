//! The stock engine: committed balances behind per-key claims, the
//! append-only movement journal, and the transactional unit of work the
//! fulfillment services run inside.

mod ledger;
mod movement_log;
mod transaction;

pub use ledger::{StockFilter, StockLedger};
pub use movement_log::{MovementLog, MovementPage, Pagination};
pub use transaction::LedgerTransaction;
