use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forgewms_core::{DomainError, DomainResult, TenantId};

use crate::warehouse::LocationId;

/// Per-location replenishment thresholds. Read-only input to the scanner;
/// one policy per location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishmentPolicy {
    tenant_id: TenantId,
    location_id: LocationId,
    min_quantity: i64,
    max_quantity: Option<i64>,
    updated_at: DateTime<Utc>,
}

impl ReplenishmentPolicy {
    pub fn new(
        tenant_id: TenantId,
        location_id: LocationId,
        min_quantity: i64,
        max_quantity: Option<i64>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if min_quantity <= 0 {
            return Err(DomainError::validation(
                "replenishment minimum must be positive",
            ));
        }
        if let Some(max) = max_quantity {
            if max < min_quantity {
                return Err(DomainError::validation(
                    "replenishment maximum must not be below the minimum",
                ));
            }
        }

        Ok(Self {
            tenant_id,
            location_id,
            min_quantity,
            max_quantity,
            updated_at: now,
        })
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn location_id(&self) -> LocationId {
        self.location_id
    }

    pub fn min_quantity(&self) -> i64 {
        self.min_quantity
    }

    pub fn max_quantity(&self) -> Option<i64> {
        self.max_quantity
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when the observed aggregate quantity calls for replenishment.
    pub fn is_below_min(&self, aggregate_quantity: i64) -> bool {
        aggregate_quantity < self.min_quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_minimum() {
        let err = ReplenishmentPolicy::new(
            TenantId::new(),
            LocationId::new(),
            0,
            None,
            Utc::now(),
        )
        .unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("minimum") => {}
            _ => panic!("Expected Validation error for non-positive minimum"),
        }
    }

    #[test]
    fn rejects_maximum_below_minimum() {
        let err = ReplenishmentPolicy::new(
            TenantId::new(),
            LocationId::new(),
            10,
            Some(5),
            Utc::now(),
        )
        .unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("maximum") => {}
            _ => panic!("Expected Validation error for maximum below minimum"),
        }
    }

    #[test]
    fn below_min_check_is_strict() {
        let policy =
            ReplenishmentPolicy::new(TenantId::new(), LocationId::new(), 10, Some(50), Utc::now())
                .unwrap();
        assert!(policy.is_below_min(9));
        assert!(!policy.is_below_min(10));
    }
}
