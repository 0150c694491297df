//! The replenishment / cycle-count scanner.
//!
//! A read-only sweep over ledger aggregates and policy thresholds that
//! writes work into the task queue. The scanner decides nothing about when
//! it runs; callers trigger it on demand.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use forgewms_catalog::WarehouseId;
use forgewms_core::{DomainError, DomainResult, TenantId, UserId};
use forgewms_tasks::{
    CycleCountRun, CycleCountRunId, CycleCountStrategy, LocationStock, Task, TaskKind,
    TaskPriority, select_locations,
};

use crate::audit::{AuditRecord, AuditSink};
use crate::catalog::CatalogService;
use crate::read_model::TenantStore;
use crate::stock::StockLedger;
use crate::tasks::TaskStore;

/// What one cycle-count scan produced.
#[derive(Debug, Clone, Serialize)]
pub struct CycleCountScan {
    pub run: CycleCountRun,
    pub tasks: Vec<Task>,
}

pub struct ScannerService<R, T>
where
    R: TenantStore<CycleCountRunId, CycleCountRun>,
    T: TaskStore,
{
    runs: R,
    tasks: T,
    catalog: Arc<CatalogService>,
    ledger: Arc<StockLedger>,
    audit: Arc<dyn AuditSink>,
}

impl<R, T> ScannerService<R, T>
where
    R: TenantStore<CycleCountRunId, CycleCountRun>,
    T: TaskStore,
{
    pub fn new(
        runs: R,
        tasks: T,
        catalog: Arc<CatalogService>,
        ledger: Arc<StockLedger>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            runs,
            tasks,
            catalog,
            ledger,
            audit,
        }
    }

    /// Sweep every location with a policy and raise one replenishment task
    /// per location whose aggregate quantity fell below the minimum. A
    /// location with an open replenishment task is skipped, so an immediate
    /// re-run creates nothing.
    pub fn scan_replenishment(
        &self,
        tenant_id: TenantId,
        actor: UserId,
    ) -> DomainResult<Vec<Task>> {
        let now = Utc::now();
        let mut created = Vec::new();

        for policy in self.catalog.list_policies(tenant_id) {
            let location_id = policy.location_id();
            let aggregate = self.ledger.aggregate_at_location(tenant_id, location_id);
            if !policy.is_below_min(aggregate) {
                continue;
            }

            let kind = TaskKind::replenishment(location_id);
            if self.tasks.has_open(tenant_id, &kind)? {
                tracing::debug!(
                    location_id = %location_id,
                    "replenishment already queued, skipping"
                );
                continue;
            }

            let location = self.catalog.require_location(tenant_id, location_id)?;
            // An empty location cannot serve picks at all; bump it ahead.
            let priority = if aggregate == 0 {
                TaskPriority::High
            } else {
                TaskPriority::Normal
            };
            let task = Task::new(
                tenant_id,
                kind,
                json!({
                    "location_code": location.code(),
                    "current": aggregate,
                    "min": policy.min_quantity(),
                    "max": policy.max_quantity(),
                }),
            )
            .with_priority(priority)
            .auto_generated();

            self.tasks.enqueue(task.clone())?;
            created.push(task);
        }

        if !created.is_empty() {
            self.audit.record(AuditRecord::new(
                tenant_id,
                actor,
                "scanner.replenishment",
                "replenishment",
                json!({ "created": created.len() }),
                now,
            ));
        }
        tracing::info!(created = created.len(), "replenishment scan finished");
        Ok(created)
    }

    /// Select up to `limit` locations by strategy, raise one cycle-count
    /// task per selected location, and record the run itself. Unlike
    /// replenishment there is no dedupe against open cycle-count tasks; the
    /// run record is what makes repeated scans traceable.
    pub fn scan_cycle_count(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        warehouse_id: Option<WarehouseId>,
        strategy: CycleCountStrategy,
        limit: usize,
    ) -> DomainResult<CycleCountScan> {
        let now = Utc::now();
        if limit == 0 {
            return Err(DomainError::validation(
                "cycle count limit must be positive",
            ));
        }
        if let Some(warehouse_id) = warehouse_id {
            self.catalog.require_warehouse(tenant_id, warehouse_id)?;
        }

        let candidates: Vec<LocationStock> = self
            .catalog
            .list_locations(tenant_id, warehouse_id)
            .into_iter()
            .map(|location| LocationStock {
                location_id: location.id(),
                code: location.code().to_string(),
                quantity: self.ledger.aggregate_at_location(tenant_id, location.id()),
            })
            .collect();

        let mut rng = rand::thread_rng();
        let selected = select_locations(strategy, candidates, limit, &mut rng);
        let run = CycleCountRun::new(
            tenant_id,
            warehouse_id,
            strategy,
            selected.iter().map(|s| s.location_id).collect(),
            actor,
            now,
        );

        let mut tasks = Vec::with_capacity(selected.len());
        for choice in &selected {
            let task = Task::new(
                tenant_id,
                TaskKind::cycle_count(choice.location_id),
                json!({
                    "location_code": choice.code,
                    "quantity_at_scan": choice.quantity,
                    "strategy": strategy,
                    "run_id": run.id,
                }),
            )
            .auto_generated();
            self.tasks.enqueue(task.clone())?;
            tasks.push(task);
        }
        self.runs.upsert(tenant_id, run.id, run.clone());

        self.audit.record(AuditRecord::new(
            tenant_id,
            actor,
            "scanner.cycle_count",
            run.id.to_string(),
            json!({
                "strategy": strategy,
                "warehouse_id": warehouse_id,
                "selected": run.selected.len(),
            }),
            now,
        ));
        tracing::info!(
            run_id = %run.id,
            strategy = ?strategy,
            selected = run.selected.len(),
            "cycle count scan finished"
        );
        Ok(CycleCountScan { run, tasks })
    }

    /// Past cycle-count runs, newest first.
    pub fn list_runs(&self, tenant_id: TenantId) -> Vec<CycleCountRun> {
        let mut runs = self.runs.list(tenant_id);
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
        runs
    }
}
