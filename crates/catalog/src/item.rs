use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forgewms_core::{DomainError, DomainResult, TenantId, impl_uuid_newtype};

/// Item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl_uuid_newtype!(ItemId, "ItemId");

/// A storable article. Identity is immutable once stock or movements
/// reference it; deactivation is logical, never deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    tenant_id: TenantId,
    sku: String,
    name: String,
    unit_of_measure: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl Item {
    pub fn create(
        tenant_id: TenantId,
        sku: impl Into<String>,
        name: impl Into<String>,
        unit_of_measure: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let sku = sku.into().trim().to_string();
        let name = name.into().trim().to_string();
        let unit_of_measure = unit_of_measure.into().trim().to_string();

        if sku.is_empty() {
            return Err(DomainError::validation("item sku must not be blank"));
        }
        if name.is_empty() {
            return Err(DomainError::validation("item name must not be blank"));
        }
        if unit_of_measure.is_empty() {
            return Err(DomainError::validation(
                "item unit of measure must not be blank",
            ));
        }

        Ok(Self {
            id: ItemId::new(),
            tenant_id,
            sku,
            name,
            unit_of_measure,
            active: true,
            created_at: now,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_of_measure(&self) -> &str {
        &self.unit_of_measure
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Logical removal. The item stays referenceable by stock rows and
    /// movement history.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
