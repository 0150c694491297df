//! `forgewms-ledger` — stock balance rules and movement facts.
//!
//! Pure domain: the keyed balance (`StockKey`/`StockRecord`) with its
//! no-negative-quantity rules, and the append-only movement vocabulary
//! (`MovementEntry`). Locking and storage live in `forgewms-infra`.

pub mod movement;
pub mod stock;

pub use movement::{MovementDraft, MovementEntry, MovementKind, sum_effects_on};
pub use stock::{StockKey, StockRecord};
