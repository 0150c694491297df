use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forgewms_catalog::{ItemId, LocationId, WarehouseId};
use forgewms_core::{DomainError, DomainResult, TenantId, UserId, impl_uuid_newtype};

/// Campaign identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(Uuid);

impl_uuid_newtype!(CampaignId, "CampaignId");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Open,
    Closed,
}

/// Line input when recording counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCountLine {
    pub item_id: ItemId,
    pub location_id: LocationId,
    pub counted_quantity: i64,
}

/// One counted position: the physical count, the system quantity at the
/// moment of recording, and their difference. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountLine {
    item_id: ItemId,
    location_id: LocationId,
    counted_quantity: i64,
    system_quantity: i64,
    difference: i64,
    recorded_at: DateTime<Utc>,
    recorded_by: UserId,
}

impl CountLine {
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn location_id(&self) -> LocationId {
        self.location_id
    }

    pub fn counted_quantity(&self) -> i64 {
        self.counted_quantity
    }

    pub fn system_quantity(&self) -> i64 {
        self.system_quantity
    }

    pub fn difference(&self) -> i64 {
        self.difference
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn recorded_by(&self) -> UserId {
        self.recorded_by
    }
}

/// A counting campaign over one warehouse. Once closed, immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountCampaign {
    id: CampaignId,
    tenant_id: TenantId,
    warehouse_id: WarehouseId,
    status: CampaignStatus,
    lines: Vec<CountLine>,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

impl CountCampaign {
    pub fn open(tenant_id: TenantId, warehouse_id: WarehouseId, now: DateTime<Utc>) -> Self {
        Self {
            id: CampaignId::new(),
            tenant_id,
            warehouse_id,
            status: CampaignStatus::Open,
            lines: Vec::new(),
            opened_at: now,
            closed_at: None,
        }
    }

    pub fn id(&self) -> CampaignId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    pub fn status(&self) -> CampaignStatus {
        self.status
    }

    pub fn lines(&self) -> &[CountLine] {
        &self.lines
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    pub fn is_closed(&self) -> bool {
        self.status == CampaignStatus::Closed
    }

    /// Append one counted position. The system quantity is the snapshot the
    /// caller read from the ledger; the difference is computed here so it
    /// can never drift from its inputs.
    pub fn record_line(
        &mut self,
        item_id: ItemId,
        location_id: LocationId,
        counted_quantity: i64,
        system_quantity: i64,
        recorded_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.is_closed() {
            return Err(DomainError::invalid_state(format!(
                "campaign {} is closed",
                self.id
            )));
        }
        if counted_quantity < 0 {
            return Err(DomainError::validation(
                "counted quantity must not be negative",
            ));
        }
        self.lines.push(CountLine {
            item_id,
            location_id,
            counted_quantity,
            system_quantity,
            difference: counted_quantity - system_quantity,
            recorded_at: now,
            recorded_by,
        });
        Ok(())
    }

    /// Irreversible.
    pub fn close(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_closed() {
            return Err(DomainError::invalid_state(format!(
                "campaign {} is already closed",
                self.id
            )));
        }
        self.status = CampaignStatus::Closed;
        self.closed_at = Some(now);
        Ok(())
    }
}
