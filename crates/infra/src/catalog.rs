//! Catalog administration: items, warehouses, locations, and replenishment
//! policies. Uniqueness is the only invariant here; everything stock-related
//! lives in the stock engine.

use chrono::{DateTime, Utc};

use forgewms_catalog::{
    Item, ItemId, Location, LocationId, LocationKind, ReplenishmentPolicy, Warehouse, WarehouseId,
};
use forgewms_core::{DomainError, DomainResult, TenantId};

use crate::read_model::{InMemoryTenantStore, TenantStore};

pub struct CatalogService {
    items: InMemoryTenantStore<ItemId, Item>,
    warehouses: InMemoryTenantStore<WarehouseId, Warehouse>,
    locations: InMemoryTenantStore<LocationId, Location>,
    policies: InMemoryTenantStore<LocationId, ReplenishmentPolicy>,
}

impl CatalogService {
    pub fn new() -> Self {
        Self {
            items: InMemoryTenantStore::new(),
            warehouses: InMemoryTenantStore::new(),
            locations: InMemoryTenantStore::new(),
            policies: InMemoryTenantStore::new(),
        }
    }

    // --- items ---

    pub fn create_item(
        &self,
        tenant_id: TenantId,
        sku: impl Into<String>,
        name: impl Into<String>,
        unit_of_measure: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Item> {
        let item = Item::create(tenant_id, sku, name, unit_of_measure, now)?;
        if self
            .items
            .list(tenant_id)
            .iter()
            .any(|existing| existing.sku() == item.sku())
        {
            return Err(DomainError::conflict(format!(
                "item sku '{}' already exists",
                item.sku()
            )));
        }
        self.items.upsert(tenant_id, item.id(), item.clone());
        Ok(item)
    }

    pub fn require_item(&self, tenant_id: TenantId, item_id: ItemId) -> DomainResult<Item> {
        self.items
            .get(tenant_id, &item_id)
            .ok_or_else(|| DomainError::not_found(format!("item {item_id} not found")))
    }

    /// Lookup used by order creation: the item must exist and still be
    /// orderable.
    pub fn require_active_item(&self, tenant_id: TenantId, item_id: ItemId) -> DomainResult<Item> {
        let item = self.require_item(tenant_id, item_id)?;
        if !item.is_active() {
            return Err(DomainError::validation(format!(
                "item '{}' is inactive",
                item.sku()
            )));
        }
        Ok(item)
    }

    pub fn list_items(&self, tenant_id: TenantId) -> Vec<Item> {
        let mut items = self.items.list(tenant_id);
        items.sort_by(|a, b| a.sku().cmp(b.sku()));
        items
    }

    pub fn deactivate_item(&self, tenant_id: TenantId, item_id: ItemId) -> DomainResult<Item> {
        self.items
            .update_with(tenant_id, &item_id, |item| {
                item.deactivate();
                Ok(())
            })?
            .ok_or_else(|| DomainError::not_found(format!("item {item_id} not found")))
    }

    // --- warehouses ---

    pub fn create_warehouse(
        &self,
        tenant_id: TenantId,
        code: impl Into<String>,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Warehouse> {
        let warehouse = Warehouse::create(tenant_id, code, name, now)?;
        if self
            .warehouses
            .list(tenant_id)
            .iter()
            .any(|existing| existing.code() == warehouse.code())
        {
            return Err(DomainError::conflict(format!(
                "warehouse code '{}' already exists",
                warehouse.code()
            )));
        }
        self.warehouses
            .upsert(tenant_id, warehouse.id(), warehouse.clone());
        Ok(warehouse)
    }

    pub fn require_warehouse(
        &self,
        tenant_id: TenantId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<Warehouse> {
        self.warehouses
            .get(tenant_id, &warehouse_id)
            .ok_or_else(|| DomainError::not_found(format!("warehouse {warehouse_id} not found")))
    }

    pub fn list_warehouses(&self, tenant_id: TenantId) -> Vec<Warehouse> {
        let mut warehouses = self.warehouses.list(tenant_id);
        warehouses.sort_by(|a, b| a.code().cmp(b.code()));
        warehouses
    }

    // --- locations ---

    pub fn create_location(
        &self,
        tenant_id: TenantId,
        warehouse_id: WarehouseId,
        code: impl Into<String>,
        kind: LocationKind,
        capacity: Option<i64>,
        now: DateTime<Utc>,
    ) -> DomainResult<Location> {
        let warehouse = self.require_warehouse(tenant_id, warehouse_id)?;
        let location = Location::create(tenant_id, warehouse_id, code, kind, capacity, now)?;
        if self
            .locations
            .list(tenant_id)
            .iter()
            .any(|existing| {
                existing.warehouse_id() == warehouse_id && existing.code() == location.code()
            })
        {
            return Err(DomainError::conflict(format!(
                "location code '{}' already exists in warehouse '{}'",
                location.code(),
                warehouse.code()
            )));
        }
        self.locations
            .upsert(tenant_id, location.id(), location.clone());
        Ok(location)
    }

    pub fn require_location(
        &self,
        tenant_id: TenantId,
        location_id: LocationId,
    ) -> DomainResult<Location> {
        self.locations
            .get(tenant_id, &location_id)
            .ok_or_else(|| DomainError::not_found(format!("location {location_id} not found")))
    }

    pub fn list_locations(
        &self,
        tenant_id: TenantId,
        warehouse_id: Option<WarehouseId>,
    ) -> Vec<Location> {
        let mut locations: Vec<Location> = self
            .locations
            .list(tenant_id)
            .into_iter()
            .filter(|location| warehouse_id.map_or(true, |w| location.warehouse_id() == w))
            .collect();
        locations.sort_by(|a, b| a.code().cmp(b.code()));
        locations
    }

    // --- replenishment policies ---

    /// Create or replace the policy for a location.
    pub fn set_policy(
        &self,
        tenant_id: TenantId,
        location_id: LocationId,
        min_quantity: i64,
        max_quantity: Option<i64>,
        now: DateTime<Utc>,
    ) -> DomainResult<ReplenishmentPolicy> {
        self.require_location(tenant_id, location_id)?;
        let policy =
            ReplenishmentPolicy::new(tenant_id, location_id, min_quantity, max_quantity, now)?;
        self.policies.upsert(tenant_id, location_id, policy.clone());
        Ok(policy)
    }

    pub fn policy_for(
        &self,
        tenant_id: TenantId,
        location_id: LocationId,
    ) -> Option<ReplenishmentPolicy> {
        self.policies.get(tenant_id, &location_id)
    }

    pub fn list_policies(&self, tenant_id: TenantId) -> Vec<ReplenishmentPolicy> {
        let mut policies = self.policies.list(tenant_id);
        policies.sort_by_key(|p| p.location_id());
        policies
    }
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new()
    }
}
