//! `forgewms-inbound` — purchase/receipt orders and their lines.
//!
//! Status is always derived from line totals, never set by a caller.

pub mod order;

pub use order::{InboundLine, InboundLineId, InboundOrder, InboundOrderId, InboundStatus, NewInboundLine, Receipt};
