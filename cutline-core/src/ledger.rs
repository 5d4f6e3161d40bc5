//! The day ledger: running totals plus the ordered history of log
//! entries, with exact undo/delete and write-through persistence.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{DailyAggregate, EntryDraft, FoodLogEntry, MacroType};
use crate::storage::{self, KeyValueStore, StorageError};
use crate::units;

/// The daily-totals store the ledger writes through. Totals are owned
/// by the day-tracking side of the app; the ledger reads and writes
/// them through this seam rather than keeping its own copy on disk.
pub trait DailyTotalsStore: Send + Sync {
    fn load(&self, day: NaiveDate) -> Result<DailyAggregate, StorageError>;
    fn store(&self, day: NaiveDate, totals: &DailyAggregate) -> Result<(), StorageError>;
}

/// Default totals store backed by the same key-value repository as the
/// rest of the ledger, under `daily-totals:<date>`.
pub struct KvDailyTotals {
    kv: Arc<dyn KeyValueStore>,
}

impl KvDailyTotals {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }
}

impl DailyTotalsStore for KvDailyTotals {
    fn load(&self, day: NaiveDate) -> Result<DailyAggregate, StorageError> {
        let key = storage::daily_totals_key(day);
        match self.kv.get(&key)? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| StorageError::Encode(key, e)),
            None => Ok(DailyAggregate::default()),
        }
    }

    fn store(&self, day: NaiveDate, totals: &DailyAggregate) -> Result<(), StorageError> {
        let key = storage::daily_totals_key(day);
        let value = serde_json::to_value(totals)
            .map_err(|e| StorageError::Encode(key.clone(), e))?;
        self.kv.set(&key, value)
    }
}

/// Single source of truth for one day's totals and history.
///
/// All operations are synchronous and run to completion; none of them
/// has an error path beyond "no-op". Arithmetic saturates at zero.
/// A persistence failure flips the store to memory-only for the rest
/// of the session instead of surfacing an error.
pub struct LedgerStore {
    day: NaiveDate,
    totals: DailyAggregate,
    history: Vec<FoodLogEntry>,
    kv: Arc<dyn KeyValueStore>,
    totals_store: Arc<dyn DailyTotalsStore>,
    degraded: bool,
}

impl LedgerStore {
    /// Opens the ledger for a day, loading any persisted totals and
    /// history. Unreadable state degrades to an empty in-memory day.
    pub fn open(
        day: NaiveDate,
        kv: Arc<dyn KeyValueStore>,
        totals_store: Arc<dyn DailyTotalsStore>,
    ) -> Self {
        let mut degraded = false;

        let totals = match totals_store.load(day) {
            Ok(totals) => totals,
            Err(e) => {
                warn!(%day, error = %e, "failed to load daily totals; running memory-only");
                degraded = true;
                DailyAggregate::default()
            }
        };

        let history = match storage::load_list(kv.as_ref(), &storage::history_key(day)) {
            Ok(history) => history,
            Err(e) => {
                warn!(%day, error = %e, "failed to load food history; running memory-only");
                degraded = true;
                Vec::new()
            }
        };

        Self {
            day,
            totals,
            history,
            kv,
            totals_store,
            degraded,
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn aggregate(&self) -> DailyAggregate {
        self.totals
    }

    /// The day's entries, most-recent-last.
    pub fn history(&self) -> &[FoodLogEntry] {
        &self.history
    }

    /// Appends a log entry and updates the totals. The macro's slice
    /// count is recomputed from the new gram total. Zero-gram drafts
    /// contribute nothing and are not recorded.
    pub fn append(&mut self, draft: EntryDraft) -> Option<FoodLogEntry> {
        if draft.amount_grams == 0 {
            debug!(name = %draft.name, "skipping zero-amount draft");
            return None;
        }

        let macro_type = draft.macro_type;
        let new_total = self.totals.macro_grams(macro_type) + draft.amount_grams;
        self.totals.set_macro_grams(macro_type, new_total);
        self.totals
            .set_macro_slices(macro_type, units::slices_for(macro_type, new_total));

        if let Some(ounces) = draft.liquid_ounces {
            self.totals.water_consumed_ounces += ounces;
        }

        let entry = FoodLogEntry::from_draft(draft);
        self.history.push(entry.clone());
        self.persist();
        Some(entry)
    }

    /// Removes the most recent entry and reverses its contribution.
    /// No-op when the history is empty.
    pub fn undo_last(&mut self) {
        let Some(entry) = self.history.pop() else {
            return;
        };
        self.reverse(&entry);
        self.persist();
    }

    /// Removes an arbitrary entry by id and reverses its contribution.
    /// No-op when the id is unknown.
    pub fn delete_entry(&mut self, id: Uuid) {
        let Some(index) = self.history.iter().position(|e| e.id == id) else {
            return;
        };
        let entry = self.history.remove(index);
        self.reverse(&entry);
        self.persist();
    }

    /// Overwrites one macro's gram total directly and recomputes its
    /// slices. Clears the whole day's history: a manual total is not
    /// attributable to individual foods, so entry-level undo against
    /// it would be ambiguous.
    pub fn manual_edit(&mut self, macro_type: MacroType, new_total: u32) {
        self.totals.set_macro_grams(macro_type, new_total);
        self.totals
            .set_macro_slices(macro_type, units::slices_for(macro_type, new_total));
        self.history.clear();
        self.persist();
    }

    /// Zeroes both macro gram totals and both slice totals and clears
    /// the history. Water is left untouched; this reset is scoped to
    /// macros only.
    pub fn reset_day(&mut self) {
        self.totals.carbs_consumed_grams = 0;
        self.totals.protein_consumed_grams = 0;
        self.totals.carb_slices = 0;
        self.totals.protein_slices = 0;
        self.history.clear();
        self.persist();
    }

    fn reverse(&mut self, entry: &FoodLogEntry) {
        let macro_type = entry.macro_type;
        let new_total = self
            .totals
            .macro_grams(macro_type)
            .saturating_sub(entry.amount_grams);
        self.totals.set_macro_grams(macro_type, new_total);
        self.totals
            .set_macro_slices(macro_type, units::slices_for(macro_type, new_total));

        if let Some(ounces) = entry.liquid_ounces {
            self.totals.water_consumed_ounces =
                self.totals.water_consumed_ounces.saturating_sub(ounces);
        }
    }

    /// Write-through after every mutation. The first failure latches
    /// the store into memory-only mode for the rest of the session.
    fn persist(&mut self) {
        if self.degraded {
            return;
        }
        if let Err(e) = self.totals_store.store(self.day, &self.totals) {
            warn!(day = %self.day, error = %e, "persisting totals failed; running memory-only");
            self.degraded = true;
            return;
        }
        if let Err(e) =
            storage::save_list(self.kv.as_ref(), &storage::history_key(self.day), &self.history)
        {
            warn!(day = %self.day, error = %e, "persisting history failed; running memory-only");
            self.degraded = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FoodSource;
    use crate::storage::MemoryStore;
    use serde_json::Value;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn open_ledger() -> (LedgerStore, Arc<MemoryStore>) {
        let kv = Arc::new(MemoryStore::new());
        let totals = Arc::new(KvDailyTotals::new(kv.clone()));
        (LedgerStore::open(day(), kv.clone(), totals), kv)
    }

    fn carb_draft(name: &str, grams: u32) -> EntryDraft {
        EntryDraft::new(name, MacroType::Carbs, grams, FoodSource::PlanFructose)
    }

    #[test]
    fn test_append_updates_totals_and_slices() {
        let (mut ledger, _kv) = open_ledger();
        ledger.append(carb_draft("Banana", 25)).unwrap();

        let agg = ledger.aggregate();
        assert_eq!(agg.carbs_consumed_grams, 25);
        assert_eq!(agg.carb_slices, 1);
        assert_eq!(ledger.history().len(), 1);
    }

    #[test]
    fn test_append_zero_is_noop() {
        let (mut ledger, _kv) = open_ledger();
        assert!(ledger.append(carb_draft("Nothing", 0)).is_none());
        assert_eq!(ledger.aggregate(), DailyAggregate::default());
        assert!(ledger.history().is_empty());
    }

    #[test]
    fn test_undo_is_exact_inverse() {
        let (mut ledger, _kv) = open_ledger();
        ledger.append(carb_draft("Banana", 25)).unwrap();
        let before = ledger.aggregate();
        let history_before = ledger.history().to_vec();

        ledger.append(
            carb_draft("Orange juice", 18).with_liquid_ounces(8),
        );
        ledger.undo_last();

        assert_eq!(ledger.aggregate(), before);
        assert_eq!(ledger.history(), history_before.as_slice());
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let (mut ledger, _kv) = open_ledger();
        ledger.undo_last();
        assert_eq!(ledger.aggregate(), DailyAggregate::default());
    }

    #[test]
    fn test_delete_by_id_is_order_independent() {
        let (mut ledger, _kv) = open_ledger();
        let a = ledger.append(carb_draft("A", 10)).unwrap();
        let b = ledger.append(carb_draft("B", 20)).unwrap();
        let c = ledger.append(carb_draft("C", 30)).unwrap();

        ledger.delete_entry(b.id);

        let agg = ledger.aggregate();
        assert_eq!(agg.carbs_consumed_grams, 40);
        assert_eq!(agg.carb_slices, units::slices_for(MacroType::Carbs, 40));
        let ids: Vec<Uuid> = ledger.history().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let (mut ledger, _kv) = open_ledger();
        ledger.append(carb_draft("A", 10)).unwrap();
        let before = ledger.aggregate();

        ledger.delete_entry(Uuid::new_v4());

        assert_eq!(ledger.aggregate(), before);
        assert_eq!(ledger.history().len(), 1);
    }

    #[test]
    fn test_totals_never_go_negative() {
        let (mut ledger, _kv) = open_ledger();
        let entry = ledger
            .append(carb_draft("Juice", 20).with_liquid_ounces(12))
            .unwrap();

        // Corrupt the balance via a manual edit below the entry's
        // contribution, then re-append history and delete twice over.
        ledger.manual_edit(MacroType::Carbs, 5);
        ledger.delete_entry(entry.id); // history already cleared: no-op
        ledger.undo_last();

        let agg = ledger.aggregate();
        assert_eq!(agg.carbs_consumed_grams, 5);
        assert!(agg.water_consumed_ounces <= 12);
    }

    #[test]
    fn test_undo_clamps_at_zero_after_manual_shrink() {
        let (mut ledger, _kv) = open_ledger();
        ledger.append(carb_draft("Big", 50)).unwrap();
        let survivor = ledger.append(carb_draft("Bigger", 60)).unwrap();

        // Shrink the total below the last entry's amount, then put the
        // entry back into history by hand to force the clamp path.
        ledger.manual_edit(MacroType::Carbs, 10);
        ledger.history.push(survivor);
        ledger.undo_last();

        let agg = ledger.aggregate();
        assert_eq!(agg.carbs_consumed_grams, 0);
        assert_eq!(agg.carb_slices, 0);
    }

    #[test]
    fn test_liquid_cross_sync() {
        let (mut ledger, _kv) = open_ledger();
        ledger.append(
            carb_draft("Orange juice", 18).with_liquid_ounces(12),
        );
        assert_eq!(ledger.aggregate().water_consumed_ounces, 12);

        ledger.undo_last();
        assert_eq!(ledger.aggregate().water_consumed_ounces, 0);
    }

    #[test]
    fn test_manual_edit_sets_total_and_clears_history() {
        let (mut ledger, _kv) = open_ledger();
        ledger.append(carb_draft("A", 30)).unwrap();
        ledger.append(carb_draft("B", 40)).unwrap();

        ledger.manual_edit(MacroType::Carbs, 80);

        let agg = ledger.aggregate();
        assert_eq!(agg.carbs_consumed_grams, 80);
        assert_eq!(agg.carb_slices, units::slices_for(MacroType::Carbs, 80));
        assert!(ledger.history().is_empty());

        // Subsequent undo is a no-op.
        ledger.undo_last();
        assert_eq!(ledger.aggregate().carbs_consumed_grams, 80);
    }

    #[test]
    fn test_reset_day_leaves_water() {
        let (mut ledger, _kv) = open_ledger();
        ledger.append(carb_draft("Juice", 18).with_liquid_ounces(8));
        ledger.append(EntryDraft::new(
            "Chicken",
            MacroType::Protein,
            30,
            FoodSource::PlanProtein,
        ));

        ledger.reset_day();

        let agg = ledger.aggregate();
        assert_eq!(agg.carbs_consumed_grams, 0);
        assert_eq!(agg.protein_consumed_grams, 0);
        assert_eq!(agg.carb_slices, 0);
        assert_eq!(agg.protein_slices, 0);
        assert_eq!(agg.water_consumed_ounces, 8);
        assert!(ledger.history().is_empty());
    }

    #[test]
    fn test_slices_recomputed_from_total_not_per_entry() {
        let (mut ledger, _kv) = open_ledger();
        // Five 1g entries each register "at least one slice" in the
        // displayed conversion, but the total of 5g is still 1 slice.
        for i in 0..5 {
            ledger.append(carb_draft(&format!("Crumb {}", i), 1)).unwrap();
        }
        assert_eq!(ledger.aggregate().carbs_consumed_grams, 5);
        assert_eq!(ledger.aggregate().carb_slices, 1);
    }

    #[test]
    fn test_end_to_end_day() {
        let (mut ledger, _kv) = open_ledger();

        let banana = ledger.append(carb_draft("Banana", 25)).unwrap();
        assert_eq!(ledger.aggregate().carbs_consumed_grams, 25);
        assert_eq!(ledger.aggregate().carb_slices, 1);

        ledger.append(carb_draft("Orange juice", 18).with_liquid_ounces(8));
        let agg = ledger.aggregate();
        assert_eq!(agg.carbs_consumed_grams, 43);
        assert_eq!(agg.carb_slices, 2);
        assert_eq!(agg.water_consumed_ounces, 8);

        ledger.undo_last();
        let agg = ledger.aggregate();
        assert_eq!(agg.carbs_consumed_grams, 25);
        assert_eq!(agg.carb_slices, 1);
        assert_eq!(agg.water_consumed_ounces, 0);

        ledger.delete_entry(banana.id);
        let agg = ledger.aggregate();
        assert_eq!(agg.carbs_consumed_grams, 0);
        assert_eq!(agg.carb_slices, 0);
        assert_eq!(agg.water_consumed_ounces, 0);
        assert!(ledger.history().is_empty());
    }

    #[test]
    fn test_state_survives_reopen() {
        let kv = Arc::new(MemoryStore::new());
        let totals = Arc::new(KvDailyTotals::new(kv.clone()));

        let mut ledger = LedgerStore::open(day(), kv.clone(), totals.clone());
        ledger.append(carb_draft("Banana", 25)).unwrap();
        ledger.append(carb_draft("Juice", 18).with_liquid_ounces(8));
        drop(ledger);

        let reopened = LedgerStore::open(day(), kv, totals);
        assert_eq!(reopened.aggregate().carbs_consumed_grams, 43);
        assert_eq!(reopened.aggregate().water_consumed_ounces, 8);
        assert_eq!(reopened.history().len(), 2);
        assert_eq!(reopened.history()[0].name, "Banana");
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<Value>, StorageError> {
            Ok(None)
        }
        fn set(&self, key: &str, _value: Value) -> Result<(), StorageError> {
            Err(StorageError::Encode(
                key.to_string(),
                serde_json::from_str::<Value>("").unwrap_err(),
            ))
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_degrades_to_memory_only() {
        let kv = Arc::new(FailingStore);
        let totals = Arc::new(KvDailyTotals::new(kv.clone()));
        let mut ledger = LedgerStore::open(day(), kv, totals);

        // Writes fail, but the ledger keeps working in memory.
        ledger.append(carb_draft("Banana", 25)).unwrap();
        ledger.append(carb_draft("Rice", 40)).unwrap();
        ledger.undo_last();

        assert_eq!(ledger.aggregate().carbs_consumed_grams, 25);
        assert_eq!(ledger.history().len(), 1);
    }
}
