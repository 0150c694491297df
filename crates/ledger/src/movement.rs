use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use forgewms_catalog::{ItemId, LocationId};
use forgewms_core::{DomainError, DomainResult, TenantId, UserId};

use crate::stock::StockKey;

/// Cause of a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Receipt,
    Pick,
    Move,
    Adjustment,
}

/// A quantity change waiting to be journaled. Quantities are magnitudes;
/// direction is carried by the from/to locations (`Receipt` fills a
/// to-location, `Pick` drains a from-location, `Move` does both).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementDraft {
    pub item_id: ItemId,
    pub from_location_id: Option<LocationId>,
    pub to_location_id: Option<LocationId>,
    pub quantity: i64,
    pub kind: MovementKind,
    pub batch: Option<String>,
    pub expiry: Option<NaiveDate>,
}

impl MovementDraft {
    pub fn receipt(
        item_id: ItemId,
        to_location_id: LocationId,
        quantity: i64,
        batch: Option<String>,
        expiry: Option<NaiveDate>,
    ) -> Self {
        Self {
            item_id,
            from_location_id: None,
            to_location_id: Some(to_location_id),
            quantity,
            kind: MovementKind::Receipt,
            batch,
            expiry,
        }
    }

    /// Picks always run against the unbatched balance.
    pub fn pick(item_id: ItemId, from_location_id: LocationId, quantity: i64) -> Self {
        Self {
            item_id,
            from_location_id: Some(from_location_id),
            to_location_id: None,
            quantity,
            kind: MovementKind::Pick,
            batch: None,
            expiry: None,
        }
    }

    pub fn transfer(
        item_id: ItemId,
        from_location_id: LocationId,
        to_location_id: LocationId,
        quantity: i64,
        batch: Option<String>,
        expiry: Option<NaiveDate>,
    ) -> Self {
        Self {
            item_id,
            from_location_id: Some(from_location_id),
            to_location_id: Some(to_location_id),
            quantity,
            kind: MovementKind::Move,
            batch,
            expiry,
        }
    }

    /// Manual correction. A positive delta fills the location, a negative
    /// delta drains it.
    pub fn adjustment(
        item_id: ItemId,
        location_id: LocationId,
        delta: i64,
        batch: Option<String>,
        expiry: Option<NaiveDate>,
    ) -> Self {
        let (from, to) = if delta >= 0 {
            (None, Some(location_id))
        } else {
            (Some(location_id), None)
        };
        Self {
            item_id,
            from_location_id: from,
            to_location_id: to,
            quantity: delta.abs(),
            kind: MovementKind::Adjustment,
            batch,
            expiry,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity <= 0 {
            return Err(DomainError::validation(
                "movement quantity must be positive",
            ));
        }
        if self.from_location_id.is_none() && self.to_location_id.is_none() {
            return Err(DomainError::validation(
                "movement must reference at least one location",
            ));
        }
        Ok(())
    }
}

/// One immutable, journaled quantity-change fact. Sequence numbers are
/// per-tenant and assigned at append time; entries are never updated or
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementEntry {
    sequence: u64,
    tenant_id: TenantId,
    item_id: ItemId,
    from_location_id: Option<LocationId>,
    to_location_id: Option<LocationId>,
    quantity: i64,
    kind: MovementKind,
    batch: Option<String>,
    expiry: Option<NaiveDate>,
    actor: UserId,
    recorded_at: DateTime<Utc>,
}

impl MovementEntry {
    pub fn from_draft(
        draft: MovementDraft,
        sequence: u64,
        tenant_id: TenantId,
        actor: UserId,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sequence,
            tenant_id,
            item_id: draft.item_id,
            from_location_id: draft.from_location_id,
            to_location_id: draft.to_location_id,
            quantity: draft.quantity,
            kind: draft.kind,
            batch: draft.batch,
            expiry: draft.expiry,
            actor,
            recorded_at,
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn from_location_id(&self) -> Option<LocationId> {
        self.from_location_id
    }

    pub fn to_location_id(&self) -> Option<LocationId> {
        self.to_location_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn kind(&self) -> MovementKind {
        self.kind
    }

    pub fn batch(&self) -> Option<&str> {
        self.batch.as_deref()
    }

    pub fn expiry(&self) -> Option<NaiveDate> {
        self.expiry
    }

    pub fn actor(&self) -> UserId {
        self.actor
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Signed contribution of this entry to the given balance key: positive
    /// when the key's location is the destination, negative when it is the
    /// source, zero when the entry concerns another key.
    pub fn signed_effect_on(&self, key: &StockKey) -> i64 {
        if self.item_id != key.item_id
            || self.batch.as_deref() != key.batch.as_deref()
            || self.expiry != key.expiry
        {
            return 0;
        }
        let mut effect = 0;
        if self.to_location_id == Some(key.location_id) {
            effect += self.quantity;
        }
        if self.from_location_id == Some(key.location_id) {
            effect -= self.quantity;
        }
        effect
    }
}

/// Sum of all entries' signed contributions to one key. Must reconcile with
/// the key's `StockRecord` quantity.
pub fn sum_effects_on(entries: &[MovementEntry], key: &StockKey) -> i64 {
    entries.iter().map(|e| e.signed_effect_on(key)).sum()
}
