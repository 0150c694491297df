use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forgewms_core::{TenantId, UserId};
use forgewms_ledger::{MovementDraft, MovementEntry, StockKey, sum_effects_on};

/// Pagination parameters for movement queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of entries to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 50, // Safe default
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(50).min(1000), // Cap at 1000 for safety
            offset: offset.unwrap_or(0),
        }
    }
}

/// Paginated movement query result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementPage {
    pub entries: Vec<MovementEntry>,
    /// Total number of entries for the tenant (across all pages).
    pub total: u64,
    pub pagination: Pagination,
    pub has_more: bool,
}

/// Per-tenant append-only movement journal. Sequence numbers are dense and
/// assigned at append; entries are never updated or deleted.
#[derive(Debug, Default)]
pub struct MovementLog {
    entries: RwLock<HashMap<TenantId, Vec<MovementEntry>>>,
}

impl MovementLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction's staged drafts in order. One write-lock
    /// acquisition covers the whole batch.
    pub(crate) fn append_batch(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        drafts: Vec<MovementDraft>,
        recorded_at: DateTime<Utc>,
    ) {
        let mut entries = self.entries.write().unwrap();
        let journal = entries.entry(tenant_id).or_default();
        let mut next = journal.len() as u64 + 1;
        for draft in drafts {
            journal.push(MovementEntry::from_draft(
                draft,
                next,
                tenant_id,
                actor,
                recorded_at,
            ));
            next += 1;
        }
    }

    /// Newest-first page of the tenant's journal.
    pub fn recent(&self, tenant_id: TenantId, pagination: Pagination) -> MovementPage {
        let entries = self.entries.read().unwrap();
        let journal = entries.get(&tenant_id).map(Vec::as_slice).unwrap_or(&[]);
        let total = journal.len() as u64;

        let page: Vec<MovementEntry> = journal
            .iter()
            .rev()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .cloned()
            .collect();

        let has_more = (pagination.offset as u64 + page.len() as u64) < total;
        MovementPage {
            entries: page,
            total,
            pagination,
            has_more,
        }
    }

    /// Full journal for a tenant, oldest first.
    pub fn all(&self, tenant_id: TenantId) -> Vec<MovementEntry> {
        let entries = self.entries.read().unwrap();
        entries.get(&tenant_id).cloned().unwrap_or_default()
    }

    /// Signed sum of every journaled effect on one balance key. Must equal
    /// the committed quantity for that key at any quiescent point.
    pub fn sum_for_key(&self, tenant_id: TenantId, key: &StockKey) -> i64 {
        let entries = self.entries.read().unwrap();
        match entries.get(&tenant_id) {
            Some(journal) => sum_effects_on(journal, key),
            None => 0,
        }
    }
}
