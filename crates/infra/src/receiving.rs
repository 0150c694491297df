//! Inbound fulfillment: purchase expectations and the receipts posted
//! against them.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::json;

use forgewms_catalog::WarehouseId;
use forgewms_core::{DomainError, DomainResult, TenantId, UserId};
use forgewms_inbound::{InboundOrder, InboundOrderId, NewInboundLine, Receipt};
use forgewms_ledger::{MovementDraft, StockKey};

use crate::audit::{AuditRecord, AuditSink};
use crate::catalog::CatalogService;
use crate::read_model::TenantStore;
use crate::stock::{LedgerTransaction, MovementLog, StockLedger};

pub struct ReceivingService<S>
where
    S: TenantStore<InboundOrderId, InboundOrder>,
{
    orders: S,
    catalog: Arc<CatalogService>,
    ledger: Arc<StockLedger>,
    movements: Arc<MovementLog>,
    audit: Arc<dyn AuditSink>,
}

impl<S> ReceivingService<S>
where
    S: TenantStore<InboundOrderId, InboundOrder>,
{
    pub fn new(
        orders: S,
        catalog: Arc<CatalogService>,
        ledger: Arc<StockLedger>,
        movements: Arc<MovementLog>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            orders,
            catalog,
            ledger,
            movements,
            audit,
        }
    }

    pub fn create_order(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        reference: impl Into<String>,
        supplier: Option<String>,
        warehouse_id: WarehouseId,
        expected_date: Option<NaiveDate>,
        lines: Vec<NewInboundLine>,
    ) -> DomainResult<InboundOrder> {
        let now = Utc::now();
        self.catalog.require_warehouse(tenant_id, warehouse_id)?;
        for line in &lines {
            self.catalog.require_active_item(tenant_id, line.item_id)?;
        }

        let order = InboundOrder::create(
            tenant_id,
            reference,
            supplier,
            warehouse_id,
            expected_date,
            lines,
            now,
        )?;
        if self
            .orders
            .list(tenant_id)
            .iter()
            .any(|existing| existing.reference() == order.reference())
        {
            return Err(DomainError::conflict(format!(
                "inbound order reference '{}' already exists",
                order.reference()
            )));
        }
        self.orders.upsert(tenant_id, order.id(), order.clone());

        self.audit.record(AuditRecord::new(
            tenant_id,
            actor,
            "inbound.create",
            order.id().to_string(),
            json!({
                "reference": order.reference(),
                "warehouse_id": warehouse_id,
                "lines": order.lines().len(),
            }),
            now,
        ));
        tracing::info!(
            order_id = %order.id(),
            reference = %order.reference(),
            "inbound order created"
        );
        Ok(order)
    }

    /// Post a batch of receipts. The whole batch is one unit of work: stock
    /// adjustments, journal entries, and line updates land together or not
    /// at all.
    pub fn receive(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        order_id: InboundOrderId,
        receipts: Vec<Receipt>,
    ) -> DomainResult<InboundOrder> {
        let now = Utc::now();
        if receipts.is_empty() {
            return Err(DomainError::validation(
                "receive call must include at least one receipt",
            ));
        }
        let order = self
            .orders
            .get(tenant_id, &order_id)
            .ok_or_else(|| DomainError::not_found(format!("inbound order {order_id} not found")))?;

        // Resolve every receipt to a ledger key before any mutation.
        let mut work = Vec::with_capacity(receipts.len());
        for receipt in &receipts {
            if receipt.quantity <= 0 {
                return Err(DomainError::validation(
                    "received quantity must be positive",
                ));
            }
            let line = order.line(receipt.line_id).ok_or_else(|| {
                DomainError::not_found(format!(
                    "inbound line {} does not belong to order",
                    receipt.line_id
                ))
            })?;
            let location = self
                .catalog
                .require_location(tenant_id, receipt.to_location_id)?;
            if location.warehouse_id() != order.warehouse_id() {
                return Err(DomainError::validation(format!(
                    "location '{}' is not in the order's warehouse",
                    location.code()
                )));
            }
            work.push((
                StockKey::new(
                    line.item_id(),
                    receipt.to_location_id,
                    receipt.batch.clone(),
                    receipt.expiry,
                ),
                receipt,
            ));
        }

        let mut tx = LedgerTransaction::begin(&self.ledger, &self.movements, tenant_id, actor);
        let mut keys: Vec<StockKey> = work.iter().map(|(key, _)| key.clone()).collect();
        keys.sort();
        keys.dedup();
        for key in &keys {
            tx.claim(key);
        }

        for (key, receipt) in &work {
            tx.adjust(key, receipt.quantity, now)?;
            tx.record_movement(MovementDraft::receipt(
                key.item_id,
                key.location_id,
                receipt.quantity,
                key.batch.clone(),
                key.expiry,
            ))?;
        }

        let updated = self
            .orders
            .update_with(tenant_id, &order_id, |order| {
                for receipt in &receipts {
                    order.apply_receipt(receipt.line_id, receipt.quantity, now)?;
                }
                Ok(())
            })?
            .ok_or_else(|| DomainError::not_found(format!("inbound order {order_id} not found")))?;
        tx.commit(now);

        self.audit.record(AuditRecord::new(
            tenant_id,
            actor,
            "inbound.receive",
            order_id.to_string(),
            json!({ "receipts": receipts }),
            now,
        ));
        tracing::info!(
            order_id = %order_id,
            receipts = receipts.len(),
            status = ?updated.status(),
            "receipts posted"
        );
        Ok(updated)
    }

    pub fn get_order(
        &self,
        tenant_id: TenantId,
        order_id: InboundOrderId,
    ) -> DomainResult<InboundOrder> {
        self.orders
            .get(tenant_id, &order_id)
            .ok_or_else(|| DomainError::not_found(format!("inbound order {order_id} not found")))
    }

    pub fn list_orders(&self, tenant_id: TenantId) -> Vec<InboundOrder> {
        let mut orders = self.orders.list(tenant_id);
        orders.sort_by(|a, b| a.reference().cmp(b.reference()));
        orders
    }
}
