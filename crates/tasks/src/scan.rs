use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forgewms_catalog::{LocationId, WarehouseId};
use forgewms_core::{TenantId, UserId, impl_uuid_newtype};

/// Cycle-count run identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleCountRunId(Uuid);

impl_uuid_newtype!(CycleCountRunId, "CycleCountRunId");

/// How cycle-count locations are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleCountStrategy {
    /// Descending aggregate quantity: count the heaviest locations first.
    Rotation,
    /// Random order: statistically sample for discrepancy detection.
    Anomaly,
    /// Ascending location code: deterministic, for repeatable audits.
    ByLocationCode,
}

impl CycleCountStrategy {
    /// Lenient parse: anything that is not a known strategy falls back to
    /// the deterministic location-code order.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "rotation" => Self::Rotation,
            "anomaly" => Self::Anomaly,
            _ => Self::ByLocationCode,
        }
    }
}

/// One candidate location with its aggregate quantity (all items, all
/// batches summed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationStock {
    pub location_id: LocationId,
    pub code: String,
    pub quantity: i64,
}

/// Order the candidates by strategy and keep at most `limit`.
pub fn select_locations<R: Rng>(
    strategy: CycleCountStrategy,
    mut candidates: Vec<LocationStock>,
    limit: usize,
    rng: &mut R,
) -> Vec<LocationStock> {
    match strategy {
        CycleCountStrategy::Rotation => {
            // Ties broken by code so repeated rotation runs are stable.
            candidates.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.code.cmp(&b.code)));
        }
        CycleCountStrategy::Anomaly => {
            candidates.shuffle(rng);
        }
        CycleCountStrategy::ByLocationCode => {
            candidates.sort_by(|a, b| a.code.cmp(&b.code));
        }
    }
    candidates.truncate(limit);
    candidates
}

/// Traceability record of one cycle-count scan: which strategy ran, over
/// which warehouse, and which locations it selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCountRun {
    pub id: CycleCountRunId,
    pub tenant_id: TenantId,
    pub warehouse_id: Option<WarehouseId>,
    pub strategy: CycleCountStrategy,
    pub selected: Vec<LocationId>,
    pub started_at: DateTime<Utc>,
    pub started_by: UserId,
}

impl CycleCountRun {
    pub fn new(
        tenant_id: TenantId,
        warehouse_id: Option<WarehouseId>,
        strategy: CycleCountStrategy,
        selected: Vec<LocationId>,
        started_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CycleCountRunId::new(),
            tenant_id,
            warehouse_id,
            strategy,
            selected,
            started_at: now,
            started_by,
        }
    }
}
