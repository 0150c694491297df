use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forgewms_catalog::{ItemId, LocationId, WarehouseId};
use forgewms_core::{DomainError, DomainResult, TenantId, impl_uuid_newtype};

/// Inbound order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InboundOrderId(Uuid);

impl_uuid_newtype!(InboundOrderId, "InboundOrderId");

/// Inbound line identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InboundLineId(Uuid);

impl_uuid_newtype!(InboundLineId, "InboundLineId");

/// Derived order lifecycle. `Open` until the first receipt, `Closed` once
/// every line has received at least its expected quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundStatus {
    Open,
    InProgress,
    Closed,
}

/// Line input at order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInboundLine {
    pub item_id: ItemId,
    pub expected_quantity: i64,
}

/// One receipt against one order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub line_id: InboundLineId,
    pub quantity: i64,
    pub to_location_id: LocationId,
    pub batch: Option<String>,
    pub expiry: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundLine {
    id: InboundLineId,
    item_id: ItemId,
    expected_quantity: i64,
    received_quantity: i64,
}

impl InboundLine {
    pub fn id(&self) -> InboundLineId {
        self.id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn expected_quantity(&self) -> i64 {
        self.expected_quantity
    }

    pub fn received_quantity(&self) -> i64 {
        self.received_quantity
    }

    pub fn is_complete(&self) -> bool {
        self.received_quantity >= self.expected_quantity
    }
}

/// Purchase/receipt order: header plus expected lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundOrder {
    id: InboundOrderId,
    tenant_id: TenantId,
    reference: String,
    supplier: Option<String>,
    warehouse_id: WarehouseId,
    expected_date: Option<NaiveDate>,
    status: InboundStatus,
    lines: Vec<InboundLine>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InboundOrder {
    pub fn create(
        tenant_id: TenantId,
        reference: impl Into<String>,
        supplier: Option<String>,
        warehouse_id: WarehouseId,
        expected_date: Option<NaiveDate>,
        lines: Vec<NewInboundLine>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let reference = reference.into().trim().to_string();
        if reference.is_empty() {
            return Err(DomainError::validation(
                "inbound order reference must not be blank",
            ));
        }
        if lines.is_empty() {
            return Err(DomainError::validation(
                "inbound order must have at least one line",
            ));
        }
        for (idx, line) in lines.iter().enumerate() {
            if line.expected_quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "inbound line {} expected quantity must be positive",
                    idx + 1
                )));
            }
        }

        let lines = lines
            .into_iter()
            .map(|line| InboundLine {
                id: InboundLineId::new(),
                item_id: line.item_id,
                expected_quantity: line.expected_quantity,
                received_quantity: 0,
            })
            .collect();

        Ok(Self {
            id: InboundOrderId::new(),
            tenant_id,
            reference,
            supplier: supplier.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            warehouse_id,
            expected_date,
            status: InboundStatus::Open,
            lines,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> InboundOrderId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn supplier(&self) -> Option<&str> {
        self.supplier.as_deref()
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    pub fn expected_date(&self) -> Option<NaiveDate> {
        self.expected_date
    }

    pub fn status(&self) -> InboundStatus {
        self.status
    }

    pub fn lines(&self) -> &[InboundLine] {
        &self.lines
    }

    pub fn line(&self, line_id: InboundLineId) -> Option<&InboundLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Record received quantity against one line and re-derive the order
    /// status. Over-receipt is deliberately not clamped: the clerk records
    /// what physically arrived, and a line counts as complete once
    /// received >= expected.
    pub fn apply_receipt(
        &mut self,
        line_id: InboundLineId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation(
                "received quantity must be positive",
            ));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| {
                DomainError::not_found(format!("inbound line {line_id} does not belong to order"))
            })?;
        line.received_quantity += quantity;
        self.status = derive_status(&self.lines);
        self.updated_at = now;
        Ok(())
    }
}

/// Pure status derivation over line totals.
pub fn derive_status(lines: &[InboundLine]) -> InboundStatus {
    if lines.iter().all(InboundLine::is_complete) {
        InboundStatus::Closed
    } else if lines.iter().all(|l| l.received_quantity == 0) {
        InboundStatus::Open
    } else {
        InboundStatus::InProgress
    }
}
