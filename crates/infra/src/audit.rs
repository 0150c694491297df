//! Compliance audit trail.
//!
//! Every successful mutating operation emits one structured record: who did
//! it, what they did, and to which record. Failed operations roll back with
//! the rest of their unit of work and leave no trace here.

use chrono::{DateTime, Utc};
use forgewms_core::{TenantId, UserId};
use serde::Serialize;

/// One audited mutation.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub tenant_id: TenantId,
    pub actor: UserId,
    /// Dotted operation name, e.g. `inbound.receive`.
    pub action: String,
    /// Identifier of the mutated record.
    pub target: String,
    pub payload: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(
        tenant_id: TenantId,
        actor: UserId,
        action: impl Into<String>,
        target: impl Into<String>,
        payload: serde_json::Value,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tenant_id,
            actor,
            action: action.into(),
            target: target.into(),
            payload,
            recorded_at,
        }
    }
}

/// Sink for audit records.
///
/// This is intentionally separate from the movement journal: movements state
/// what happened to stock, audit records state who drove which operation.
pub trait AuditSink: Send + Sync + 'static {
    fn record(&self, record: AuditRecord);
}

/// In-memory audit log.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    inner: std::sync::Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<AuditRecord> {
        self.inner.lock().unwrap().clone()
    }

    /// Newest-first slice of one tenant's trail.
    pub fn for_tenant(&self, tenant_id: TenantId, limit: usize) -> Vec<AuditRecord> {
        let inner = self.inner.lock().unwrap();
        inner
            .iter()
            .rev()
            .filter(|record| record.tenant_id == tenant_id)
            .take(limit)
            .cloned()
            .collect()
    }
}

impl AuditSink for InMemoryAuditLog {
    fn record(&self, record: AuditRecord) {
        tracing::debug!(
            action = %record.action,
            target = %record.target,
            "audit record"
        );
        self.inner.lock().unwrap().push(record);
    }
}
