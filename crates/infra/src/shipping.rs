//! Outbound fulfillment: customer orders and the picks posted against them.
//!
//! Picks draw from the unbatched balance at the source location. Availability
//! is checked under the same claim that the decrement runs under, so a
//! concurrent pick cannot slip between the check and the adjustment.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::json;

use forgewms_catalog::WarehouseId;
use forgewms_core::{DomainError, DomainResult, TenantId, UserId};
use forgewms_ledger::{MovementDraft, StockKey};
use forgewms_outbound::{NewOutboundLine, OutboundOrder, OutboundOrderId, Pick};

use crate::audit::{AuditRecord, AuditSink};
use crate::catalog::CatalogService;
use crate::read_model::TenantStore;
use crate::stock::{LedgerTransaction, MovementLog, StockLedger};

pub struct ShippingService<S>
where
    S: TenantStore<OutboundOrderId, OutboundOrder>,
{
    orders: S,
    catalog: Arc<CatalogService>,
    ledger: Arc<StockLedger>,
    movements: Arc<MovementLog>,
    audit: Arc<dyn AuditSink>,
}

impl<S> ShippingService<S>
where
    S: TenantStore<OutboundOrderId, OutboundOrder>,
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
        customer: Option<String>,
        warehouse_id: WarehouseId,
        expected_date: Option<NaiveDate>,
        lines: Vec<NewOutboundLine>,
    ) -> DomainResult<OutboundOrder> {
        let now = Utc::now();
        self.catalog.require_warehouse(tenant_id, warehouse_id)?;
        for line in &lines {
            self.catalog.require_active_item(tenant_id, line.item_id)?;
        }

        let order = OutboundOrder::create(
            tenant_id,
            reference,
            customer,
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
                "outbound order reference '{}' already exists",
                order.reference()
            )));
        }
        self.orders.upsert(tenant_id, order.id(), order.clone());

        self.audit.record(AuditRecord::new(
            tenant_id,
            actor,
            "outbound.create",
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
            "outbound order created"
        );
        Ok(order)
    }

    /// Post a batch of picks. Any single pick that fails, including one
    /// asking for more than the source holds, aborts the whole batch.
    pub fn pick(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        order_id: OutboundOrderId,
        picks: Vec<Pick>,
    ) -> DomainResult<OutboundOrder> {
        let now = Utc::now();
        if picks.is_empty() {
            return Err(DomainError::validation(
                "pick call must include at least one pick",
            ));
        }
        let order = self.orders.get(tenant_id, &order_id).ok_or_else(|| {
            DomainError::not_found(format!("outbound order {order_id} not found"))
        })?;

        let mut work = Vec::with_capacity(picks.len());
        for pick in &picks {
            if pick.quantity <= 0 {
                return Err(DomainError::validation("picked quantity must be positive"));
            }
            let line = order.line(pick.line_id).ok_or_else(|| {
                DomainError::not_found(format!(
                    "outbound line {} does not belong to order",
                    pick.line_id
                ))
            })?;
            let location = self
                .catalog
                .require_location(tenant_id, pick.from_location_id)?;
            work.push((
                StockKey::unbatched(line.item_id(), pick.from_location_id),
                location,
                pick,
            ));
        }

        let mut tx = LedgerTransaction::begin(&self.ledger, &self.movements, tenant_id, actor);
        let mut keys: Vec<StockKey> = work.iter().map(|(key, _, _)| key.clone()).collect();
        keys.sort();
        keys.dedup();
        for key in &keys {
            tx.claim(key);
        }

        for (key, location, pick) in &work {
            let available = tx.quantity_for(key);
            if available < pick.quantity {
                return Err(DomainError::insufficient_stock(
                    location.code(),
                    pick.quantity,
                    available,
                ));
            }
            tx.adjust(key, -pick.quantity, now)?;
            tx.record_movement(MovementDraft::pick(
                key.item_id,
                key.location_id,
                pick.quantity,
            ))?;
        }

        let updated = self
            .orders
            .update_with(tenant_id, &order_id, |order| {
                for pick in &picks {
                    order.apply_pick(pick.line_id, pick.quantity, now)?;
                }
                Ok(())
            })?
            .ok_or_else(|| {
                DomainError::not_found(format!("outbound order {order_id} not found"))
            })?;
        tx.commit(now);

        self.audit.record(AuditRecord::new(
            tenant_id,
            actor,
            "outbound.pick",
            order_id.to_string(),
            json!({ "picks": picks }),
            now,
        ));
        tracing::info!(
            order_id = %order_id,
            picks = picks.len(),
            status = ?updated.status(),
            "picks posted"
        );
        Ok(updated)
    }

    pub fn get_order(
        &self,
        tenant_id: TenantId,
        order_id: OutboundOrderId,
    ) -> DomainResult<OutboundOrder> {
        self.orders.get(tenant_id, &order_id).ok_or_else(|| {
            DomainError::not_found(format!("outbound order {order_id} not found"))
        })
    }

    pub fn list_orders(&self, tenant_id: TenantId) -> Vec<OutboundOrder> {
        let mut orders = self.orders.list(tenant_id);
        orders.sort_by(|a, b| a.reference().cmp(b.reference()));
        orders
    }
}
