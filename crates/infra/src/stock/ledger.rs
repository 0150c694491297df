use std::collections::{HashMap, HashSet};
use std::sync::{Condvar, Mutex, RwLock};

use serde::{Deserialize, Serialize};

use forgewms_catalog::{ItemId, LocationId};
use forgewms_core::TenantId;
use forgewms_ledger::{StockKey, StockRecord};

type LedgerKey = (TenantId, StockKey);

/// Per-key claims: the in-process stand-in for row locks. `claim` parks the
/// caller until the key is free; the holder releases on commit or rollback.
#[derive(Debug, Default)]
struct ClaimTable {
    claimed: Mutex<HashSet<LedgerKey>>,
    released: Condvar,
}

impl ClaimTable {
    fn claim(&self, key: LedgerKey) {
        let mut claimed = self.claimed.lock().unwrap();
        while claimed.contains(&key) {
            claimed = self.released.wait(claimed).unwrap();
        }
        claimed.insert(key);
    }

    fn release(&self, key: &LedgerKey) {
        let mut claimed = self.claimed.lock().unwrap();
        claimed.remove(key);
        self.released.notify_all();
    }
}

/// Filter for stock queries. Warehouse-level filtering is resolved to a
/// location set by the caller before it reaches the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockFilter {
    pub item_id: Option<ItemId>,
    pub location_id: Option<LocationId>,
}

impl StockFilter {
    fn matches(&self, key: &StockKey) -> bool {
        if let Some(item_id) = self.item_id {
            if key.item_id != item_id {
                return false;
            }
        }
        if let Some(location_id) = self.location_id {
            if key.location_id != location_id {
                return false;
            }
        }
        true
    }
}

/// Committed quantity balances plus the claim table that serializes writers
/// of the same key. Balances are never deleted; a drained balance stays at
/// zero. Reads never block writers.
#[derive(Debug, Default)]
pub struct StockLedger {
    records: RwLock<HashMap<LedgerKey, StockRecord>>,
    claims: ClaimTable,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed record for a key, if the balance was ever opened.
    pub fn record(&self, tenant_id: TenantId, key: &StockKey) -> Option<StockRecord> {
        let records = self.records.read().unwrap();
        records.get(&(tenant_id, key.clone())).cloned()
    }

    /// Committed quantity; "no record" reads as zero.
    pub fn quantity_for(&self, tenant_id: TenantId, key: &StockKey) -> i64 {
        self.record(tenant_id, key)
            .map(|r| r.quantity())
            .unwrap_or(0)
    }

    /// Sum of every balance at a location (all items, all batches).
    pub fn aggregate_at_location(&self, tenant_id: TenantId, location_id: LocationId) -> i64 {
        let records = self.records.read().unwrap();
        records
            .iter()
            .filter(|((tenant, key), _)| *tenant == tenant_id && key.location_id == location_id)
            .map(|(_, record)| record.quantity())
            .sum()
    }

    /// Filtered listing of committed records, ordered by key for stable
    /// output.
    pub fn query(&self, tenant_id: TenantId, filter: &StockFilter) -> Vec<StockRecord> {
        let records = self.records.read().unwrap();
        let mut matching: Vec<StockRecord> = records
            .iter()
            .filter(|((tenant, key), _)| *tenant == tenant_id && filter.matches(key))
            .map(|(_, record)| record.clone())
            .collect();
        matching.sort_by(|a, b| a.key().cmp(b.key()));
        matching
    }

    pub(crate) fn claim(&self, tenant_id: TenantId, key: &StockKey) {
        self.claims.claim((tenant_id, key.clone()));
    }

    pub(crate) fn release_claim(&self, tenant_id: TenantId, key: &StockKey) {
        self.claims.release(&(tenant_id, key.clone()));
    }

    /// Publish a transaction's staged records. One write-lock acquisition
    /// covers the whole batch, so readers see all of it or none of it.
    pub(crate) fn commit_records(&self, tenant_id: TenantId, staged: Vec<StockRecord>) {
        let mut records = self.records.write().unwrap();
        for record in staged {
            records.insert((tenant_id, record.key().clone()), record);
        }
    }
}
