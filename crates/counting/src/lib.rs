//! `forgewms-counting` — physical count campaigns.
//!
//! Reconciliation is observational: campaigns snapshot system quantities and
//! record variances, they never mutate the ledger.

pub mod campaign;

pub use campaign::{CampaignId, CampaignStatus, CountCampaign, CountLine, NewCountLine};
