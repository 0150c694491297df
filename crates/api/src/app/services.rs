//! Service graph construction.
//!
//! Every service behind the HTTP boundary hangs off the same catalog, the
//! same stock ledger, the same movement journal, the same task queue, and
//! the same audit sink, so a receipt posted through one route is visible
//! through every other route immediately.

use std::sync::Arc;

use forgewms_counting::{CampaignId, CountCampaign};
use forgewms_inbound::{InboundOrder, InboundOrderId};
use forgewms_outbound::{OutboundOrder, OutboundOrderId};
use forgewms_rules::{PutawayRule, PutawayRuleId};
use forgewms_tasks::{CycleCountRun, CycleCountRunId};

use forgewms_infra::audit::{AuditSink, InMemoryAuditLog};
use forgewms_infra::catalog::CatalogService;
use forgewms_infra::counting::CountingService;
use forgewms_infra::putaway::PutawayService;
use forgewms_infra::read_model::InMemoryTenantStore;
use forgewms_infra::receiving::ReceivingService;
use forgewms_infra::scanner::ScannerService;
use forgewms_infra::shipping::ShippingService;
use forgewms_infra::stock::{MovementLog, StockLedger};
use forgewms_infra::stock_ops::StockOpsService;
use forgewms_infra::tasks::InMemoryTaskStore;

type Store<K, V> = Arc<InMemoryTenantStore<K, V>>;

/// All services reachable from the HTTP handlers.
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub audit: Arc<InMemoryAuditLog>,
    pub tasks: Arc<InMemoryTaskStore>,
    pub receiving: ReceivingService<Store<InboundOrderId, InboundOrder>>,
    pub shipping: ShippingService<Store<OutboundOrderId, OutboundOrder>>,
    pub counting: CountingService<Store<CampaignId, CountCampaign>>,
    pub scanner: ScannerService<Store<CycleCountRunId, CycleCountRun>, Arc<InMemoryTaskStore>>,
    pub putaway: PutawayService<Store<PutawayRuleId, PutawayRule>>,
    pub stock_ops: StockOpsService,
}

/// Build the in-memory service graph.
pub fn build_services() -> AppServices {
    let catalog = Arc::new(CatalogService::new());
    let ledger = Arc::new(StockLedger::new());
    let movements = Arc::new(MovementLog::new());
    let audit = Arc::new(InMemoryAuditLog::new());
    let audit_sink: Arc<dyn AuditSink> = audit.clone();
    let tasks = InMemoryTaskStore::arc();

    let receiving = ReceivingService::new(
        Arc::new(InMemoryTenantStore::new()),
        catalog.clone(),
        ledger.clone(),
        movements.clone(),
        audit_sink.clone(),
    );
    let shipping = ShippingService::new(
        Arc::new(InMemoryTenantStore::new()),
        catalog.clone(),
        ledger.clone(),
        movements.clone(),
        audit_sink.clone(),
    );
    let counting = CountingService::new(
        Arc::new(InMemoryTenantStore::new()),
        catalog.clone(),
        ledger.clone(),
        audit_sink.clone(),
    );
    let scanner = ScannerService::new(
        Arc::new(InMemoryTenantStore::new()),
        tasks.clone(),
        catalog.clone(),
        ledger.clone(),
        audit_sink.clone(),
    );
    let putaway = PutawayService::new(
        Arc::new(InMemoryTenantStore::new()),
        catalog.clone(),
        audit_sink.clone(),
    );
    let stock_ops = StockOpsService::new(catalog.clone(), ledger, movements, audit_sink);

    AppServices {
        catalog,
        audit,
        tasks,
        receiving,
        shipping,
        counting,
        scanner,
        putaway,
        stock_ops,
    }
}
