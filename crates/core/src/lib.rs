//! `forgewms-core` — shared domain foundation.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model and the typed identifiers every other crate builds on.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{TenantId, UserId};
