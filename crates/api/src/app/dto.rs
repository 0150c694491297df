use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use forgewms_catalog::{
    Item, ItemId, Location, LocationId, LocationKind, ReplenishmentPolicy, Warehouse, WarehouseId,
};
use forgewms_core::UserId;
use forgewms_counting::{CountCampaign, CountLine, NewCountLine};
use forgewms_inbound::{InboundLine, InboundOrder, NewInboundLine, Receipt};
use forgewms_infra::audit::AuditRecord;
use forgewms_infra::stock::MovementPage;
use forgewms_ledger::{MovementEntry, StockRecord};
use forgewms_outbound::{NewOutboundLine, OutboundLine, OutboundOrder, Pick};
use forgewms_rules::{PutawayRule, PutawaySuggestion};
use forgewms_tasks::{CycleCountRun, CycleCountStrategy, Task, TaskPriority, TaskStatus};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub sku: String,
    pub name: String,
    pub unit_of_measure: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateWarehouseRequest {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    pub code: String,
    pub kind: LocationKind,
    pub capacity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SetPolicyRequest {
    pub min_quantity: i64,
    pub max_quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInboundOrderRequest {
    pub reference: String,
    pub supplier: Option<String>,
    pub warehouse_id: WarehouseId,
    pub expected_date: Option<NaiveDate>,
    pub lines: Vec<NewInboundLine>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiveRequest {
    pub receipts: Vec<Receipt>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOutboundOrderRequest {
    pub reference: String,
    pub customer: Option<String>,
    pub warehouse_id: WarehouseId,
    pub expected_date: Option<NaiveDate>,
    pub lines: Vec<NewOutboundLine>,
}

#[derive(Debug, Deserialize)]
pub struct PickRequest {
    pub picks: Vec<Pick>,
}

#[derive(Debug, Deserialize)]
pub struct OpenCampaignRequest {
    pub warehouse_id: WarehouseId,
}

#[derive(Debug, Deserialize)]
pub struct RecordCountsRequest {
    pub lines: Vec<NewCountLine>,
}

#[derive(Debug, Deserialize)]
pub struct CycleCountScanRequest {
    pub warehouse_id: Option<WarehouseId>,
    pub strategy: CycleCountStrategy,
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    pub name: String,
    pub priority: i32,
    pub criteria: BTreeMap<String, String>,
    pub target_location_id: LocationId,
}

#[derive(Debug, Deserialize)]
pub struct SuggestPutawayRequest {
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub kind: String,
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct AssignTaskRequest {
    pub assignee: UserId,
}

// -------------------------
// Query parameters
// -------------------------

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub item_id: Option<ItemId>,
    pub warehouse_id: Option<WarehouseId>,
    pub location_id: Option<LocationId>,
}

#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub warehouse_id: Option<WarehouseId>,
}

#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn item_to_json(item: &Item) -> serde_json::Value {
    serde_json::json!({
        "id": item.id().to_string(),
        "sku": item.sku(),
        "name": item.name(),
        "unit_of_measure": item.unit_of_measure(),
        "is_active": item.is_active(),
        "created_at": item.created_at().to_rfc3339(),
    })
}

pub fn warehouse_to_json(warehouse: &Warehouse) -> serde_json::Value {
    serde_json::json!({
        "id": warehouse.id().to_string(),
        "code": warehouse.code(),
        "name": warehouse.name(),
        "created_at": warehouse.created_at().to_rfc3339(),
    })
}

pub fn location_to_json(location: &Location) -> serde_json::Value {
    serde_json::json!({
        "id": location.id().to_string(),
        "warehouse_id": location.warehouse_id().to_string(),
        "code": location.code(),
        "kind": location.kind(),
        "capacity": location.capacity(),
        "created_at": location.created_at().to_rfc3339(),
    })
}

pub fn policy_to_json(policy: &ReplenishmentPolicy) -> serde_json::Value {
    serde_json::json!({
        "location_id": policy.location_id().to_string(),
        "min_quantity": policy.min_quantity(),
        "max_quantity": policy.max_quantity(),
        "updated_at": policy.updated_at().to_rfc3339(),
    })
}

pub fn inbound_order_to_json(order: &InboundOrder) -> serde_json::Value {
    serde_json::json!({
        "id": order.id().to_string(),
        "reference": order.reference(),
        "supplier": order.supplier(),
        "warehouse_id": order.warehouse_id().to_string(),
        "expected_date": order.expected_date(),
        "status": order.status(),
        "lines": order.lines().iter().map(inbound_line_to_json).collect::<Vec<_>>(),
        "created_at": order.created_at().to_rfc3339(),
    })
}

fn inbound_line_to_json(line: &InboundLine) -> serde_json::Value {
    serde_json::json!({
        "id": line.id().to_string(),
        "item_id": line.item_id().to_string(),
        "expected_quantity": line.expected_quantity(),
        "received_quantity": line.received_quantity(),
        "is_complete": line.is_complete(),
    })
}

pub fn outbound_order_to_json(order: &OutboundOrder) -> serde_json::Value {
    serde_json::json!({
        "id": order.id().to_string(),
        "reference": order.reference(),
        "customer": order.customer(),
        "warehouse_id": order.warehouse_id().to_string(),
        "expected_date": order.expected_date(),
        "status": order.status(),
        "lines": order.lines().iter().map(outbound_line_to_json).collect::<Vec<_>>(),
        "created_at": order.created_at().to_rfc3339(),
    })
}

fn outbound_line_to_json(line: &OutboundLine) -> serde_json::Value {
    serde_json::json!({
        "id": line.id().to_string(),
        "item_id": line.item_id().to_string(),
        "ordered_quantity": line.ordered_quantity(),
        "picked_quantity": line.picked_quantity(),
        "is_complete": line.is_complete(),
    })
}

pub fn stock_record_to_json(record: &StockRecord) -> serde_json::Value {
    serde_json::json!({
        "item_id": record.key().item_id.to_string(),
        "location_id": record.key().location_id.to_string(),
        "batch": record.key().batch,
        "expiry": record.key().expiry,
        "quantity": record.quantity(),
        "updated_at": record.updated_at().to_rfc3339(),
    })
}

pub fn movement_to_json(entry: &MovementEntry) -> serde_json::Value {
    serde_json::json!({
        "sequence": entry.sequence(),
        "item_id": entry.item_id().to_string(),
        "from_location_id": entry.from_location_id().map(|l| l.to_string()),
        "to_location_id": entry.to_location_id().map(|l| l.to_string()),
        "quantity": entry.quantity(),
        "kind": entry.kind(),
        "batch": entry.batch(),
        "expiry": entry.expiry(),
        "actor": entry.actor().to_string(),
        "recorded_at": entry.recorded_at().to_rfc3339(),
    })
}

pub fn movement_page_to_json(page: &MovementPage) -> serde_json::Value {
    serde_json::json!({
        "items": page.entries.iter().map(movement_to_json).collect::<Vec<_>>(),
        "total": page.total,
        "limit": page.pagination.limit,
        "offset": page.pagination.offset,
        "has_more": page.has_more,
    })
}

pub fn campaign_to_json(campaign: &CountCampaign) -> serde_json::Value {
    serde_json::json!({
        "id": campaign.id().to_string(),
        "warehouse_id": campaign.warehouse_id().to_string(),
        "status": campaign.status(),
        "lines": campaign.lines().iter().map(count_line_to_json).collect::<Vec<_>>(),
        "opened_at": campaign.opened_at().to_rfc3339(),
        "closed_at": campaign.closed_at().map(|t| t.to_rfc3339()),
    })
}

fn count_line_to_json(line: &CountLine) -> serde_json::Value {
    serde_json::json!({
        "item_id": line.item_id().to_string(),
        "location_id": line.location_id().to_string(),
        "counted_quantity": line.counted_quantity(),
        "system_quantity": line.system_quantity(),
        "difference": line.difference(),
        "recorded_at": line.recorded_at().to_rfc3339(),
        "recorded_by": line.recorded_by().to_string(),
    })
}

pub fn task_to_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id.to_string(),
        "type": task.kind.type_name(),
        "location_id": task.kind.location_id().map(|l| l.to_string()),
        "status": task.status,
        "priority": task.priority,
        "assignee": task.assignee.map(|a| a.to_string()),
        "metadata": task.metadata,
        "auto_generated": task.auto_generated,
        "created_at": task.created_at.to_rfc3339(),
        "updated_at": task.updated_at.to_rfc3339(),
    })
}

pub fn run_to_json(run: &CycleCountRun) -> serde_json::Value {
    serde_json::json!({
        "id": run.id.to_string(),
        "warehouse_id": run.warehouse_id.map(|w| w.to_string()),
        "strategy": run.strategy,
        "selected": run.selected.iter().map(|l| l.to_string()).collect::<Vec<_>>(),
        "started_at": run.started_at.to_rfc3339(),
        "started_by": run.started_by.to_string(),
    })
}

pub fn rule_to_json(rule: &PutawayRule) -> serde_json::Value {
    serde_json::json!({
        "id": rule.id().to_string(),
        "name": rule.name(),
        "priority": rule.priority(),
        "is_active": rule.is_active(),
        "criteria": rule.criteria(),
        "target_location_id": rule.target_location_id().to_string(),
        "created_at": rule.created_at().to_rfc3339(),
    })
}

pub fn suggestion_to_json(suggestion: &PutawaySuggestion) -> serde_json::Value {
    match suggestion {
        PutawaySuggestion::Rule {
            rule_id,
            rule_name,
            location_id,
        } => serde_json::json!({
            "source": "rule",
            "rule_id": rule_id.to_string(),
            "rule_name": rule_name,
            "location_id": location_id.to_string(),
        }),
        PutawaySuggestion::ReceivingZone => serde_json::json!({
            "source": "receiving_zone",
            "location_id": serde_json::Value::Null,
        }),
    }
}

pub fn audit_to_json(record: &AuditRecord) -> serde_json::Value {
    serde_json::json!({
        "actor": record.actor.to_string(),
        "action": record.action,
        "target": record.target,
        "payload": record.payload,
        "recorded_at": record.recorded_at.to_rfc3339(),
    })
}
