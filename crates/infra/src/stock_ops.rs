//! Direct stock operations: transfers between locations, manual
//! adjustments, and the stock/movement queries.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use forgewms_catalog::{ItemId, LocationId, WarehouseId};
use forgewms_core::{DomainError, DomainResult, TenantId, UserId};
use forgewms_ledger::{MovementDraft, StockKey, StockRecord};

use crate::audit::{AuditRecord, AuditSink};
use crate::catalog::CatalogService;
use crate::stock::{
    LedgerTransaction, MovementLog, MovementPage, Pagination, StockFilter, StockLedger,
};

/// A requested transfer between two locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMove {
    pub item_id: ItemId,
    pub from_location_id: LocationId,
    pub to_location_id: LocationId,
    pub quantity: i64,
    pub batch: Option<String>,
    pub expiry: Option<NaiveDate>,
}

/// A requested manual correction of one balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub item_id: ItemId,
    pub location_id: LocationId,
    pub delta: i64,
    pub batch: Option<String>,
    pub expiry: Option<NaiveDate>,
    pub reason: Option<String>,
}

pub struct StockOpsService {
    catalog: Arc<CatalogService>,
    ledger: Arc<StockLedger>,
    movements: Arc<MovementLog>,
    audit: Arc<dyn AuditSink>,
}

impl StockOpsService {
    pub fn new(
        catalog: Arc<CatalogService>,
        ledger: Arc<StockLedger>,
        movements: Arc<MovementLog>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            movements,
            audit,
        }
    }

    /// Move quantity between two locations for the same item/batch/expiry.
    /// Both balances change in one unit of work; draining the source below
    /// zero fails and nothing moves.
    pub fn move_stock(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        request: StockMove,
    ) -> DomainResult<()> {
        let now = Utc::now();
        if request.quantity <= 0 {
            return Err(DomainError::validation("move quantity must be positive"));
        }
        if request.from_location_id == request.to_location_id {
            return Err(DomainError::validation(
                "source and destination location must differ",
            ));
        }
        self.catalog.require_item(tenant_id, request.item_id)?;
        self.catalog
            .require_location(tenant_id, request.from_location_id)?;
        self.catalog
            .require_location(tenant_id, request.to_location_id)?;

        let from_key = StockKey::new(
            request.item_id,
            request.from_location_id,
            request.batch.clone(),
            request.expiry,
        );
        let to_key = StockKey::new(
            request.item_id,
            request.to_location_id,
            request.batch.clone(),
            request.expiry,
        );

        let mut tx = LedgerTransaction::begin(&self.ledger, &self.movements, tenant_id, actor);
        let mut keys = [from_key.clone(), to_key.clone()];
        keys.sort();
        for key in &keys {
            tx.claim(key);
        }
        tx.adjust(&from_key, -request.quantity, now)?;
        tx.adjust(&to_key, request.quantity, now)?;
        tx.record_movement(MovementDraft::transfer(
            request.item_id,
            request.from_location_id,
            request.to_location_id,
            request.quantity,
            request.batch.clone(),
            request.expiry,
        ))?;
        tx.commit(now);

        self.audit.record(AuditRecord::new(
            tenant_id,
            actor,
            "stock.move",
            request.item_id.to_string(),
            json!({
                "from_location_id": request.from_location_id,
                "to_location_id": request.to_location_id,
                "quantity": request.quantity,
                "batch": request.batch,
            }),
            now,
        ));
        tracing::info!(
            item_id = %request.item_id,
            from = %request.from_location_id,
            to = %request.to_location_id,
            quantity = request.quantity,
            "stock moved"
        );
        Ok(())
    }

    /// Manual correction of one balance. A zero delta succeeds without
    /// writing anything. Returns the quantity after the adjustment.
    pub fn adjust_stock(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        request: StockAdjustment,
    ) -> DomainResult<i64> {
        let now = Utc::now();
        self.catalog.require_item(tenant_id, request.item_id)?;
        self.catalog
            .require_location(tenant_id, request.location_id)?;

        let key = StockKey::new(
            request.item_id,
            request.location_id,
            request.batch.clone(),
            request.expiry,
        );
        let mut tx = LedgerTransaction::begin(&self.ledger, &self.movements, tenant_id, actor);
        let quantity = tx.adjust(&key, request.delta, now)?;
        if request.delta != 0 {
            tx.record_movement(MovementDraft::adjustment(
                request.item_id,
                request.location_id,
                request.delta,
                request.batch.clone(),
                request.expiry,
            ))?;
        }
        tx.commit(now);

        if request.delta != 0 {
            self.audit.record(AuditRecord::new(
                tenant_id,
                actor,
                "stock.adjust",
                request.item_id.to_string(),
                json!({
                    "location_id": request.location_id,
                    "delta": request.delta,
                    "batch": request.batch,
                    "reason": request.reason,
                }),
                now,
            ));
            tracing::info!(
                item_id = %request.item_id,
                location_id = %request.location_id,
                delta = request.delta,
                quantity,
                "stock adjusted"
            );
        }
        Ok(quantity)
    }

    /// Committed balances matching the filters. A warehouse filter resolves
    /// to that warehouse's location set.
    pub fn query_stock(
        &self,
        tenant_id: TenantId,
        item_id: Option<ItemId>,
        warehouse_id: Option<WarehouseId>,
        location_id: Option<LocationId>,
    ) -> DomainResult<Vec<StockRecord>> {
        let filter = StockFilter {
            item_id,
            location_id,
        };
        let mut records = self.ledger.query(tenant_id, &filter);

        if let Some(warehouse_id) = warehouse_id {
            self.catalog.require_warehouse(tenant_id, warehouse_id)?;
            let members: HashSet<LocationId> = self
                .catalog
                .list_locations(tenant_id, Some(warehouse_id))
                .iter()
                .map(|l| l.id())
                .collect();
            records.retain(|record| members.contains(&record.key().location_id));
        }
        Ok(records)
    }

    /// Newest-first page of the movement journal.
    pub fn recent_movements(&self, tenant_id: TenantId, pagination: Pagination) -> MovementPage {
        self.movements.recent(tenant_id, pagination)
    }
}
