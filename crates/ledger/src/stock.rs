use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use forgewms_catalog::{ItemId, LocationId};
use forgewms_core::{DomainError, DomainResult};

/// The ledger key: one quantity balance exists per (item, location, batch,
/// expiry). Batch and expiry are `None` for unbatched stock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockKey {
    pub item_id: ItemId,
    pub location_id: LocationId,
    pub batch: Option<String>,
    pub expiry: Option<NaiveDate>,
}

impl StockKey {
    pub fn new(
        item_id: ItemId,
        location_id: LocationId,
        batch: Option<String>,
        expiry: Option<NaiveDate>,
    ) -> Self {
        Self {
            item_id,
            location_id,
            batch,
            expiry,
        }
    }

    /// The key picks and count snapshots run against.
    pub fn unbatched(item_id: ItemId, location_id: LocationId) -> Self {
        Self::new(item_id, location_id, None, None)
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "item {} at {}", self.item_id, self.location_id)?;
        if let Some(batch) = &self.batch {
            write!(f, " batch {batch}")?;
        }
        if let Some(expiry) = &self.expiry {
            write!(f, " expiry {expiry}")?;
        }
        Ok(())
    }
}

/// One quantity balance. Quantity is never negative; a balance that reaches
/// zero persists (reads treat "no record" and "zero" the same).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    key: StockKey,
    quantity: i64,
    updated_at: DateTime<Utc>,
}

impl StockRecord {
    /// Open a balance on its first positive adjustment. Decreasing a balance
    /// that does not exist is `OutOfStock`.
    pub fn open(key: StockKey, quantity: i64, now: DateTime<Utc>) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::out_of_stock(format!(
                "no balance for {key} to decrease"
            )));
        }
        Ok(Self {
            key,
            quantity,
            updated_at: now,
        })
    }

    /// Apply a signed delta, refusing any result below zero.
    pub fn adjusted(&self, delta: i64, now: DateTime<Utc>) -> DomainResult<Self> {
        let quantity = self.quantity + delta;
        if quantity < 0 {
            return Err(DomainError::out_of_stock(format!(
                "{} holds {}, adjustment of {} would go negative",
                self.key, self.quantity, delta
            )));
        }
        Ok(Self {
            key: self.key.clone(),
            quantity,
            updated_at: now,
        })
    }

    pub fn key(&self) -> &StockKey {
        &self.key
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_key() -> StockKey {
        StockKey::unbatched(ItemId::new(), LocationId::new())
    }

    #[test]
    fn open_requires_positive_quantity() {
        let err = StockRecord::open(test_key(), 0, Utc::now()).unwrap_err();
        match err {
            DomainError::OutOfStock(_) => {}
            _ => panic!("Expected OutOfStock when opening with zero"),
        }
        let err = StockRecord::open(test_key(), -3, Utc::now()).unwrap_err();
        match err {
            DomainError::OutOfStock(_) => {}
            _ => panic!("Expected OutOfStock when opening with a negative quantity"),
        }
    }

    #[test]
    fn adjusted_refuses_negative_result() {
        let record = StockRecord::open(test_key(), 3, Utc::now()).unwrap();
        let err = record.adjusted(-5, Utc::now()).unwrap_err();
        match err {
            DomainError::OutOfStock(msg) => {
                assert!(msg.contains("would go negative"));
            }
            _ => panic!("Expected OutOfStock for negative result"),
        }
        // The original record is untouched.
        assert_eq!(record.quantity(), 3);
    }

    #[test]
    fn balance_may_rest_at_zero() {
        let record = StockRecord::open(test_key(), 5, Utc::now()).unwrap();
        let drained = record.adjusted(-5, Utc::now()).unwrap();
        assert_eq!(drained.quantity(), 0);
        // A zero balance still accepts new receipts.
        let refilled = drained.adjusted(7, Utc::now()).unwrap();
        assert_eq!(refilled.quantity(), 7);
    }

    proptest! {
        /// For any sequence of deltas, the balance equals the sum of the
        /// deltas that were accepted, and never dips below zero.
        #[test]
        fn quantity_equals_sum_of_applied_deltas(deltas in proptest::collection::vec(-50i64..50, 1..40)) {
            let now = Utc::now();
            let key = test_key();
            let mut record: Option<StockRecord> = None;
            let mut applied_sum = 0i64;

            for delta in deltas {
                if delta == 0 {
                    continue;
                }
                let outcome = match &record {
                    None => StockRecord::open(key.clone(), delta, now),
                    Some(current) => current.adjusted(delta, now),
                };
                if let Ok(next) = outcome {
                    applied_sum += delta;
                    record = Some(next);
                }
            }

            let quantity = record.as_ref().map(StockRecord::quantity).unwrap_or(0);
            prop_assert_eq!(quantity, applied_sum);
            prop_assert!(quantity >= 0);
        }
    }
}
