use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forgewms_catalog::{ItemId, LocationId, WarehouseId};
use forgewms_core::{DomainError, DomainResult, TenantId, impl_uuid_newtype};

/// Outbound order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutboundOrderId(Uuid);

impl_uuid_newtype!(OutboundOrderId, "OutboundOrderId");

/// Outbound line identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutboundLineId(Uuid);

impl_uuid_newtype!(OutboundLineId, "OutboundLineId");

/// Derived order lifecycle. `Picking` while partially picked, `Shipped`
/// once every line has picked at least its ordered quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundStatus {
    Open,
    Picking,
    Shipped,
}

/// Line input at order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOutboundLine {
    pub item_id: ItemId,
    pub ordered_quantity: i64,
}

/// One pick against one order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub line_id: OutboundLineId,
    pub quantity: i64,
    pub from_location_id: LocationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundLine {
    id: OutboundLineId,
    item_id: ItemId,
    ordered_quantity: i64,
    picked_quantity: i64,
}

impl OutboundLine {
    pub fn id(&self) -> OutboundLineId {
        self.id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn ordered_quantity(&self) -> i64 {
        self.ordered_quantity
    }

    pub fn picked_quantity(&self) -> i64 {
        self.picked_quantity
    }

    pub fn is_complete(&self) -> bool {
        self.picked_quantity >= self.ordered_quantity
    }
}

/// Customer/shipment order: header plus ordered lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundOrder {
    id: OutboundOrderId,
    tenant_id: TenantId,
    reference: String,
    customer: Option<String>,
    warehouse_id: WarehouseId,
    expected_date: Option<NaiveDate>,
    status: OutboundStatus,
    lines: Vec<OutboundLine>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OutboundOrder {
    pub fn create(
        tenant_id: TenantId,
        reference: impl Into<String>,
        customer: Option<String>,
        warehouse_id: WarehouseId,
        expected_date: Option<NaiveDate>,
        lines: Vec<NewOutboundLine>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let reference = reference.into().trim().to_string();
        if reference.is_empty() {
            return Err(DomainError::validation(
                "outbound order reference must not be blank",
            ));
        }
        if lines.is_empty() {
            return Err(DomainError::validation(
                "outbound order must have at least one line",
            ));
        }
        for (idx, line) in lines.iter().enumerate() {
            if line.ordered_quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "outbound line {} ordered quantity must be positive",
                    idx + 1
                )));
            }
        }

        let lines = lines
            .into_iter()
            .map(|line| OutboundLine {
                id: OutboundLineId::new(),
                item_id: line.item_id,
                ordered_quantity: line.ordered_quantity,
                picked_quantity: 0,
            })
            .collect();

        Ok(Self {
            id: OutboundOrderId::new(),
            tenant_id,
            reference,
            customer: customer.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            warehouse_id,
            expected_date,
            status: OutboundStatus::Open,
            lines,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> OutboundOrderId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn customer(&self) -> Option<&str> {
        self.customer.as_deref()
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    pub fn expected_date(&self) -> Option<NaiveDate> {
        self.expected_date
    }

    pub fn status(&self) -> OutboundStatus {
        self.status
    }

    pub fn lines(&self) -> &[OutboundLine] {
        &self.lines
    }

    pub fn line(&self, line_id: OutboundLineId) -> Option<&OutboundLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Record picked quantity against one line and re-derive the order
    /// status. The caller has already verified availability against the
    /// source balance under its row claim.
    pub fn apply_pick(
        &mut self,
        line_id: OutboundLineId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("picked quantity must be positive"));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| {
                DomainError::not_found(format!("outbound line {line_id} does not belong to order"))
            })?;
        line.picked_quantity += quantity;
        self.status = derive_status(&self.lines);
        self.updated_at = now;
        Ok(())
    }
}

/// Pure status derivation over line totals.
pub fn derive_status(lines: &[OutboundLine]) -> OutboundStatus {
    if lines.iter().all(OutboundLine::is_complete) {
        OutboundStatus::Shipped
    } else if lines.iter().all(|l| l.picked_quantity == 0) {
        OutboundStatus::Open
    } else {
        OutboundStatus::Picking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tenant_id() -> TenantId {
        TenantId::new()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn order_with_quantities(ordered: &[i64]) -> OutboundOrder {
        let lines = ordered
            .iter()
            .map(|qty| NewOutboundLine {
                item_id: ItemId::new(),
                ordered_quantity: *qty,
            })
            .collect();
        OutboundOrder::create(
            test_tenant_id(),
            "SO-2001",
            Some("Globex".to_string()),
            WarehouseId::new(),
            None,
            lines,
            test_time(),
        )
        .unwrap()
    }

    #[test]
    fn create_rejects_empty_lines() {
        let err = OutboundOrder::create(
            test_tenant_id(),
            "SO-2001",
            None,
            WarehouseId::new(),
            None,
            vec![],
            test_time(),
        )
        .unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("at least one line") => {}
            _ => panic!("Expected Validation error for empty lines"),
        }
    }

    #[test]
    fn status_walks_open_picking_shipped() {
        let mut order = order_with_quantities(&[4, 2]);
        assert_eq!(order.status(), OutboundStatus::Open);

        let first = order.lines()[0].id();
        let second = order.lines()[1].id();

        order.apply_pick(first, 1, test_time()).unwrap();
        assert_eq!(order.status(), OutboundStatus::Picking);

        order.apply_pick(first, 3, test_time()).unwrap();
        order.apply_pick(second, 2, test_time()).unwrap();
        assert_eq!(order.status(), OutboundStatus::Shipped);
    }

    #[test]
    fn pick_against_alien_line_is_not_found() {
        let mut order = order_with_quantities(&[4]);
        let err = order
            .apply_pick(OutboundLineId::new(), 1, test_time())
            .unwrap_err();
        match err {
            DomainError::NotFound(msg) if msg.contains("does not belong") => {}
            _ => panic!("Expected NotFound for alien line"),
        }
        assert_eq!(order.lines()[0].picked_quantity(), 0);
    }
}
