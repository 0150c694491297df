use std::collections::HashMap;

use chrono::{DateTime, Utc};

use forgewms_core::{DomainResult, TenantId, UserId};
use forgewms_ledger::{MovementDraft, StockKey, StockRecord};

use super::ledger::StockLedger;
use super::movement_log::MovementLog;

/// Unit of work over the stock ledger. Every key it reads or writes is
/// claimed on first touch and held until the transaction ends, so the
/// quantities it sees cannot move underneath it. Nothing is visible to other
/// readers until `commit`; dropping an uncommitted transaction discards all
/// staged state and releases the claims.
///
/// Callers that touch more than one key must touch them in key order, or two
/// transactions over overlapping key sets can deadlock each other.
pub struct LedgerTransaction<'a> {
    ledger: &'a StockLedger,
    log: &'a MovementLog,
    tenant_id: TenantId,
    actor: UserId,
    staged_records: HashMap<StockKey, StockRecord>,
    staged_movements: Vec<MovementDraft>,
    claimed: Vec<StockKey>,
}

impl<'a> LedgerTransaction<'a> {
    pub fn begin(
        ledger: &'a StockLedger,
        log: &'a MovementLog,
        tenant_id: TenantId,
        actor: UserId,
    ) -> Self {
        Self {
            ledger,
            log,
            tenant_id,
            actor,
            staged_records: HashMap::new(),
            staged_movements: Vec::new(),
            claimed: Vec::new(),
        }
    }

    /// Claim a key without reading or writing it. Batch operations claim
    /// their full key set in sorted order first, then apply in request
    /// order.
    pub fn claim(&mut self, key: &StockKey) {
        self.touch(key);
    }

    /// Apply a signed delta to one balance. A zero delta is a no-op that
    /// reads the current quantity without claiming. A positive delta on an
    /// unknown key opens the balance; a negative one fails because there is
    /// nothing to decrease. Returns the staged quantity after the delta.
    pub fn adjust(
        &mut self,
        key: &StockKey,
        delta: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<i64> {
        if delta == 0 {
            return Ok(self.effective_quantity(key));
        }
        self.touch(key);
        let next = match self.effective_record(key) {
            Some(record) => record.adjusted(delta, now)?,
            None => StockRecord::open(key.clone(), delta, now)?,
        };
        let quantity = next.quantity();
        self.staged_records.insert(key.clone(), next);
        Ok(quantity)
    }

    /// Quantity as this transaction sees it: staged if touched, committed
    /// otherwise. Claims the key, so the answer stays valid until commit or
    /// rollback.
    pub fn quantity_for(&mut self, key: &StockKey) -> i64 {
        self.touch(key);
        self.effective_quantity(key)
    }

    /// Stage a journal entry for the batch. It is sequenced and published
    /// together with the balance changes at commit.
    pub fn record_movement(&mut self, draft: MovementDraft) -> DomainResult<()> {
        draft.validate()?;
        self.staged_movements.push(draft);
        Ok(())
    }

    /// Publish every staged balance and journal entry. The balances land in
    /// one batch, so concurrent readers see all of this transaction's
    /// effects or none of them. Claims are released on drop, after the
    /// publish.
    pub fn commit(mut self, recorded_at: DateTime<Utc>) {
        let staged: Vec<StockRecord> = self.staged_records.drain().map(|(_, r)| r).collect();
        self.ledger.commit_records(self.tenant_id, staged);
        let drafts = std::mem::take(&mut self.staged_movements);
        self.log
            .append_batch(self.tenant_id, self.actor, drafts, recorded_at);
    }

    fn touch(&mut self, key: &StockKey) {
        if !self.claimed.iter().any(|claimed| claimed == key) {
            self.ledger.claim(self.tenant_id, key);
            self.claimed.push(key.clone());
        }
    }

    fn effective_record(&self, key: &StockKey) -> Option<StockRecord> {
        match self.staged_records.get(key) {
            Some(record) => Some(record.clone()),
            None => self.ledger.record(self.tenant_id, key),
        }
    }

    fn effective_quantity(&self, key: &StockKey) -> i64 {
        match self.staged_records.get(key) {
            Some(record) => record.quantity(),
            None => self.ledger.quantity_for(self.tenant_id, key),
        }
    }
}

impl Drop for LedgerTransaction<'_> {
    fn drop(&mut self) {
        for key in self.claimed.drain(..) {
            self.ledger.release_claim(self.tenant_id, &key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgewms_catalog::{ItemId, LocationId};
    use forgewms_core::DomainError;
    use proptest::prelude::*;

    fn setup() -> (StockLedger, MovementLog, TenantId, UserId) {
        (
            StockLedger::new(),
            MovementLog::new(),
            TenantId::new(),
            UserId::new(),
        )
    }

    #[test]
    fn staged_changes_are_invisible_until_commit() {
        let (ledger, log, tenant_id, actor) = setup();
        let key = StockKey::unbatched(ItemId::new(), LocationId::new());
        let now = Utc::now();

        let mut tx = LedgerTransaction::begin(&ledger, &log, tenant_id, actor);
        assert_eq!(tx.adjust(&key, 8, now).unwrap(), 8);
        assert_eq!(ledger.quantity_for(tenant_id, &key), 0);

        tx.commit(now);
        assert_eq!(ledger.quantity_for(tenant_id, &key), 8);
    }

    #[test]
    fn dropped_transaction_rolls_back_and_releases_claims() {
        let (ledger, log, tenant_id, actor) = setup();
        let key = StockKey::unbatched(ItemId::new(), LocationId::new());
        let now = Utc::now();

        {
            let mut tx = LedgerTransaction::begin(&ledger, &log, tenant_id, actor);
            tx.adjust(&key, 5, now).unwrap();
        }
        assert_eq!(ledger.quantity_for(tenant_id, &key), 0);

        // A second transaction can claim the same key right away.
        let mut tx = LedgerTransaction::begin(&ledger, &log, tenant_id, actor);
        assert_eq!(tx.adjust(&key, 3, now).unwrap(), 3);
        tx.commit(now);
        assert_eq!(ledger.quantity_for(tenant_id, &key), 3);
    }

    #[test]
    fn negative_delta_on_unknown_key_is_rejected() {
        let (ledger, log, tenant_id, actor) = setup();
        let key = StockKey::unbatched(ItemId::new(), LocationId::new());

        let mut tx = LedgerTransaction::begin(&ledger, &log, tenant_id, actor);
        match tx.adjust(&key, -1, Utc::now()) {
            Err(DomainError::OutOfStock(_)) => {}
            other => panic!("expected OutOfStock, got {other:?}"),
        }
    }

    #[test]
    fn adjust_floors_at_zero_across_staged_state() {
        let (ledger, log, tenant_id, actor) = setup();
        let key = StockKey::unbatched(ItemId::new(), LocationId::new());
        let now = Utc::now();

        let mut tx = LedgerTransaction::begin(&ledger, &log, tenant_id, actor);
        tx.adjust(&key, 4, now).unwrap();
        match tx.adjust(&key, -5, now) {
            Err(DomainError::OutOfStock(_)) => {}
            other => panic!("expected OutOfStock, got {other:?}"),
        }
        // The failed delta left the staged quantity untouched.
        assert_eq!(tx.adjust(&key, -4, now).unwrap(), 0);
    }

    #[test]
    fn zero_delta_reads_without_staging() {
        let (ledger, log, tenant_id, actor) = setup();
        let key = StockKey::unbatched(ItemId::new(), LocationId::new());
        let now = Utc::now();

        let mut tx = LedgerTransaction::begin(&ledger, &log, tenant_id, actor);
        assert_eq!(tx.adjust(&key, 0, now).unwrap(), 0);
        tx.commit(now);
        assert!(ledger.record(tenant_id, &key).is_none());
    }

    #[test]
    fn commit_publishes_movements_with_the_balances() {
        let (ledger, log, tenant_id, actor) = setup();
        let item_id = ItemId::new();
        let location_id = LocationId::new();
        let key = StockKey::unbatched(item_id, location_id);
        let now = Utc::now();

        let mut tx = LedgerTransaction::begin(&ledger, &log, tenant_id, actor);
        tx.adjust(&key, 6, now).unwrap();
        tx.record_movement(MovementDraft::receipt(item_id, location_id, 6, None, None))
            .unwrap();
        tx.commit(now);

        assert_eq!(log.sum_for_key(tenant_id, &key), 6);
        assert_eq!(ledger.quantity_for(tenant_id, &key), 6);
    }

    #[test]
    fn concurrent_writers_to_one_key_serialize() {
        use std::sync::Arc;
        use std::thread;

        let ledger = Arc::new(StockLedger::new());
        let log = Arc::new(MovementLog::new());
        let tenant_id = TenantId::new();
        let key = StockKey::unbatched(ItemId::new(), LocationId::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = Arc::clone(&ledger);
            let log = Arc::clone(&log);
            let key = key.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    let now = Utc::now();
                    let mut tx =
                        LedgerTransaction::begin(&ledger, &log, tenant_id, UserId::new());
                    tx.adjust(&key, 1, now).unwrap();
                    tx.commit(now);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.quantity_for(tenant_id, &key), 400);
    }

    proptest! {
        /// Any interleaving of committed and dropped transactions keeps the
        /// committed balance equal to the journal sum, and only committed
        /// deltas count.
        #[test]
        fn committed_balance_always_matches_the_journal(
            steps in proptest::collection::vec((-20i64..30, proptest::bool::ANY), 1..30)
        ) {
            let (ledger, log, tenant_id, actor) = setup();
            let item_id = ItemId::new();
            let location_id = LocationId::new();
            let key = StockKey::unbatched(item_id, location_id);
            let now = Utc::now();
            let mut committed_sum = 0i64;

            for (delta, commit) in steps {
                if delta == 0 {
                    continue;
                }
                let mut tx = LedgerTransaction::begin(&ledger, &log, tenant_id, actor);
                if tx.adjust(&key, delta, now).is_ok() {
                    tx.record_movement(MovementDraft::adjustment(
                        item_id,
                        location_id,
                        delta,
                        None,
                        None,
                    ))
                    .unwrap();
                    if commit {
                        committed_sum += delta;
                        tx.commit(now);
                    }
                }
            }

            prop_assert_eq!(ledger.quantity_for(tenant_id, &key), committed_sum);
            prop_assert_eq!(log.sum_for_key(tenant_id, &key), committed_sum);
            prop_assert!(committed_sum >= 0);
        }
    }
}
