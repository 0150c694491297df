use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forgewms_core::{DomainError, DomainResult, TenantId, impl_uuid_newtype};

/// Warehouse identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarehouseId(Uuid);

impl_uuid_newtype!(WarehouseId, "WarehouseId");

/// Location identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(Uuid);

impl_uuid_newtype!(LocationId, "LocationId");

/// What a location is used for inside a warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Storage,
    Picking,
    Receiving,
    Shipping,
    Quarantine,
}

/// A physical warehouse. Code is unique per tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    id: WarehouseId,
    tenant_id: TenantId,
    code: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl Warehouse {
    pub fn create(
        tenant_id: TenantId,
        code: impl Into<String>,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let code = code.into().trim().to_string();
        let name = name.into().trim().to_string();

        if code.is_empty() {
            return Err(DomainError::validation("warehouse code must not be blank"));
        }
        if name.is_empty() {
            return Err(DomainError::validation("warehouse name must not be blank"));
        }

        Ok(Self {
            id: WarehouseId::new(),
            tenant_id,
            code,
            name,
            created_at: now,
        })
    }

    pub fn id(&self) -> WarehouseId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A storage slot inside exactly one warehouse. Never deleted while stock
/// references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    id: LocationId,
    tenant_id: TenantId,
    warehouse_id: WarehouseId,
    code: String,
    kind: LocationKind,
    capacity: Option<i64>,
    created_at: DateTime<Utc>,
}

impl Location {
    pub fn create(
        tenant_id: TenantId,
        warehouse_id: WarehouseId,
        code: impl Into<String>,
        kind: LocationKind,
        capacity: Option<i64>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let code = code.into().trim().to_string();

        if code.is_empty() {
            return Err(DomainError::validation("location code must not be blank"));
        }
        if let Some(cap) = capacity {
            if cap <= 0 {
                return Err(DomainError::validation(
                    "location capacity must be positive when given",
                ));
            }
        }

        Ok(Self {
            id: LocationId::new(),
            tenant_id,
            warehouse_id,
            code,
            kind,
            capacity,
            created_at: now,
        })
    }

    pub fn id(&self) -> LocationId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn kind(&self) -> LocationKind {
        self.kind
    }

    pub fn capacity(&self) -> Option<i64> {
        self.capacity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
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

    #[test]
    fn warehouse_rejects_blank_code() {
        let err = Warehouse::create(test_tenant_id(), "", "Main", test_time()).unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("code") => {}
            _ => panic!("Expected Validation error for blank code"),
        }
    }

    #[test]
    fn location_belongs_to_one_warehouse() {
        let tenant_id = test_tenant_id();
        let warehouse = Warehouse::create(tenant_id, "WH1", "Main", test_time()).unwrap();
        let location = Location::create(
            tenant_id,
            warehouse.id(),
            "A-01-01",
            LocationKind::Storage,
            Some(100),
            test_time(),
        )
        .unwrap();
        assert_eq!(location.warehouse_id(), warehouse.id());
        assert_eq!(location.capacity(), Some(100));
    }

    #[test]
    fn location_rejects_non_positive_capacity() {
        let err = Location::create(
            test_tenant_id(),
            WarehouseId::new(),
            "A-01-01",
            LocationKind::Storage,
            Some(0),
            test_time(),
        )
        .unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("capacity") => {}
            _ => panic!("Expected Validation error for zero capacity"),
        }
    }
}
