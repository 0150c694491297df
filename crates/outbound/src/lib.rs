//! `forgewms-outbound` — customer/shipment orders and their lines.
//!
//! Mirrors the inbound side: derived status, picks recorded per line. The
//! availability check against the ledger happens in the shipping service,
//! not here.

pub mod order;

pub use order::{NewOutboundLine, OutboundLine, OutboundLineId, OutboundOrder, OutboundOrderId, OutboundStatus, Pick};
