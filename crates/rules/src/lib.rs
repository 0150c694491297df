//! `forgewms-rules` — putaway rule matching.
//!
//! A pure priority evaluator over rule criteria; holds no mutable state.

pub mod putaway;

pub use putaway::{PutawayRule, PutawayRuleId, PutawaySuggestion, suggest_putaway};
