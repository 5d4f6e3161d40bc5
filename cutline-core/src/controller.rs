//! The orchestration facade: the only component a front-end calls.
//!
//! Resolves a logging intent (catalog row, scaled remote record,
//! barcode hit, manual edit) into ledger operations and hands back the
//! refreshed aggregate and history. Holds no state beyond the selected
//! day and its open ledger.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::catalog::{CatalogGroup, CatalogSources, DayPhase, FoodCatalogResolver, PlanFood};
use crate::ledger::{DailyTotalsStore, LedgerStore};
use crate::models::{
    CustomFood, CustomMeal, DailyAggregate, EntryDraft, FoodLogEntry, FoodSource, MacroType,
    MealItem, RemoteFoodRecord,
};
use crate::remote::{BarcodeOutcome, RemoteFoodGateway, SearchSnapshot};
use crate::storage::{self, KeyValueStore};
use crate::units;

/// What the front-end renders after any ledger operation.
#[derive(Debug, Clone)]
pub struct LedgerView {
    pub day: NaiveDate,
    pub aggregate: DailyAggregate,
    pub history: Vec<FoodLogEntry>,
}

/// Outcome of a barcode scan, shaped for the UI: a miss suggests
/// searching by name, a failure is an actual error.
#[derive(Debug, Clone)]
pub enum ScanResult {
    Found(RemoteFoodRecord),
    NotFound,
    Failed(String),
}

pub struct NutritionLedgerController {
    kv: Arc<dyn KeyValueStore>,
    totals_store: Arc<dyn DailyTotalsStore>,
    gateway: RemoteFoodGateway,
    ledger: LedgerStore,
    plan: Vec<PlanFood>,
    phase: DayPhase,
    custom_foods: Vec<CustomFood>,
    custom_meals: Vec<CustomMeal>,
}

impl NutritionLedgerController {
    pub fn new(
        day: NaiveDate,
        kv: Arc<dyn KeyValueStore>,
        totals_store: Arc<dyn DailyTotalsStore>,
        gateway: RemoteFoodGateway,
    ) -> Self {
        let ledger = LedgerStore::open(day, kv.clone(), totals_store.clone());
        let custom_foods = Self::load_or_empty(kv.as_ref(), storage::CUSTOM_FOODS_KEY);
        let custom_meals = Self::load_or_empty(kv.as_ref(), storage::CUSTOM_MEALS_KEY);
        Self {
            kv,
            totals_store,
            gateway,
            ledger,
            plan: Vec::new(),
            phase: DayPhase::Baseline,
            custom_foods,
            custom_meals,
        }
    }

    fn load_or_empty<T: serde::de::DeserializeOwned>(
        kv: &dyn KeyValueStore,
        key: &str,
    ) -> Vec<T> {
        match storage::load_list(kv, key) {
            Ok(items) => items,
            Err(e) => {
                warn!(key, error = %e, "failed to load stored list; starting empty");
                Vec::new()
            }
        }
    }

    /// Installs the protocol engine's phase-filtered plan for the day.
    pub fn set_plan(&mut self, plan: Vec<PlanFood>, phase: DayPhase) {
        self.plan = plan;
        self.phase = phase;
    }

    pub fn day(&self) -> NaiveDate {
        self.ledger.day()
    }

    /// Switches the selected day, reopening its ledger.
    pub fn select_day(&mut self, day: NaiveDate) {
        self.ledger = LedgerStore::open(day, self.kv.clone(), self.totals_store.clone());
    }

    pub fn view(&self) -> LedgerView {
        LedgerView {
            day: self.ledger.day(),
            aggregate: self.ledger.aggregate(),
            history: self.ledger.history().to_vec(),
        }
    }

    /// Logs a plan food at a chosen portion; falls back to the plan's
    /// recommended portion when the typed amount sanitizes to zero.
    pub fn log_plan_food(&mut self, food: &PlanFood, grams: Option<u32>) -> LedgerView {
        let grams = grams.unwrap_or(food.default_grams);
        let mut draft = EntryDraft::new(
            format!("{} ({}g)", food.name, grams),
            food.macro_type,
            grams,
            food.source,
        );
        if let Some(ounces) = food.liquid_ounces {
            draft = draft.with_liquid_ounces(ounces);
        }
        self.ledger.append(draft);
        self.view()
    }

    /// Logs a custom food: one entry per non-zero macro.
    pub fn log_custom_food(&mut self, food: &CustomFood) -> LedgerView {
        if food.carbs_grams > 0 {
            self.ledger.append(EntryDraft::new(
                format!("{} ({})", food.name, food.serving_label),
                MacroType::Carbs,
                food.carbs_grams,
                FoodSource::CustomFood,
            ));
        }
        if food.protein_grams > 0 {
            self.ledger.append(EntryDraft::new(
                format!("{} ({})", food.name, food.serving_label),
                MacroType::Protein,
                food.protein_grams,
                FoodSource::CustomFood,
            ));
        }
        self.view()
    }

    /// Logs a custom meal: one entry per non-zero macro per item, so
    /// the meal stays reversible item-by-item. An item's liquid rides
    /// on its first emitted entry so water is counted once.
    pub fn log_custom_meal(&mut self, meal: &CustomMeal) -> LedgerView {
        for item in &meal.items {
            self.log_meal_item(&meal.name, item);
        }
        self.view()
    }

    fn log_meal_item(&mut self, meal_name: &str, item: &MealItem) {
        let mut liquid = item.liquid_ounces;
        if item.carbs_grams > 0 {
            let mut draft = EntryDraft::new(
                format!("{}: {}", meal_name, item.name),
                MacroType::Carbs,
                item.carbs_grams,
                FoodSource::CustomMeal,
            );
            if let Some(ounces) = liquid.take() {
                draft = draft.with_liquid_ounces(ounces);
            }
            self.ledger.append(draft);
        }
        if item.protein_grams > 0 {
            let mut draft = EntryDraft::new(
                format!("{}: {}", meal_name, item.name),
                MacroType::Protein,
                item.protein_grams,
                FoodSource::CustomMeal,
            );
            if let Some(ounces) = liquid.take() {
                draft = draft.with_liquid_ounces(ounces);
            }
            self.ledger.append(draft);
        }
    }

    /// Logs a remote record scaled to a serving size in grams. Both
    /// macros are logged when the scaled record carries both.
    pub fn log_remote_food(&mut self, record: &RemoteFoodRecord, grams: u32) -> LedgerView {
        let scaled = record.scaled(f64::from(grams));
        let name = format!("{} ({}g)", record.name, grams);

        let carbs = scaled.carbs_grams();
        if carbs > 0 {
            self.ledger.append(EntryDraft::new(
                name.clone(),
                MacroType::Carbs,
                carbs,
                record.source,
            ));
        }
        let protein = scaled.protein_grams();
        if protein > 0 {
            self.ledger.append(EntryDraft::new(
                name,
                MacroType::Protein,
                protein,
                record.source,
            ));
        }
        self.view()
    }

    /// Catalog lookup over the installed plan plus the user's custom
    /// foods and meals. Purely local and synchronous.
    pub fn catalog_search(&self, query: &str) -> Vec<CatalogGroup> {
        let sources = CatalogSources {
            plan: self.plan.clone(),
            custom_foods: self.custom_foods.clone(),
            custom_meals: self.custom_meals.clone(),
        };
        FoodCatalogResolver::search(query, self.phase, &sources)
    }

    /// Debounced remote input path (one call per keystroke).
    pub async fn remote_input(&self, query: &str) {
        self.gateway.handle_input(query).await;
    }

    /// Immediate remote search, for surfaces without keystroke events.
    pub async fn remote_search(&self, query: &str) -> SearchSnapshot {
        self.gateway.search_now(query).await
    }

    pub async fn remote_snapshot(&self) -> SearchSnapshot {
        self.gateway.snapshot().await
    }

    /// Scans a barcode against the supporting provider.
    pub async fn scan_barcode(&self, code: &str) -> ScanResult {
        match self.gateway.barcode_lookup(code).await {
            Ok(BarcodeOutcome::Found(record)) => ScanResult::Found(record),
            Ok(BarcodeOutcome::NotFound) => ScanResult::NotFound,
            Err(e) => ScanResult::Failed(e.to_string()),
        }
    }

    /// Overwrites a macro total from raw user input. Malformed input
    /// sanitizes to zero rather than erroring.
    pub fn manual_edit(&mut self, macro_type: MacroType, raw_grams: &str) -> LedgerView {
        let grams = units::parse_grams(raw_grams);
        self.ledger.manual_edit(macro_type, grams);
        self.view()
    }

    pub fn undo(&mut self) -> LedgerView {
        self.ledger.undo_last();
        self.view()
    }

    pub fn delete(&mut self, id: Uuid) -> LedgerView {
        self.ledger.delete_entry(id);
        self.view()
    }

    pub fn reset_day(&mut self) -> LedgerView {
        self.ledger.reset_day();
        self.view()
    }

    // Custom food and meal lifecycle. Lists are cached in memory and
    // written through to the global keys best-effort.

    pub fn custom_foods(&self) -> &[CustomFood] {
        &self.custom_foods
    }

    pub fn custom_meals(&self) -> &[CustomMeal] {
        &self.custom_meals
    }

    pub fn add_custom_food(
        &mut self,
        name: impl Into<String>,
        carbs_grams: u32,
        protein_grams: u32,
        serving_label: impl Into<String>,
    ) -> CustomFood {
        let food = CustomFood::new(name, carbs_grams, protein_grams, serving_label);
        self.custom_foods.push(food.clone());
        self.persist_list(storage::CUSTOM_FOODS_KEY);
        food
    }

    pub fn remove_custom_food(&mut self, id: Uuid) -> bool {
        let before = self.custom_foods.len();
        self.custom_foods.retain(|f| f.id != id);
        let removed = self.custom_foods.len() != before;
        if removed {
            self.persist_list(storage::CUSTOM_FOODS_KEY);
        }
        removed
    }

    pub fn add_custom_meal(&mut self, name: impl Into<String>, items: Vec<MealItem>) -> CustomMeal {
        let meal = CustomMeal::new(name, items);
        self.custom_meals.push(meal.clone());
        self.persist_list(storage::CUSTOM_MEALS_KEY);
        meal
    }

    pub fn remove_custom_meal(&mut self, id: Uuid) -> bool {
        let before = self.custom_meals.len();
        self.custom_meals.retain(|m| m.id != id);
        let removed = self.custom_meals.len() != before;
        if removed {
            self.persist_list(storage::CUSTOM_MEALS_KEY);
        }
        removed
    }

    fn persist_list(&self, key: &str) {
        let result = match key {
            storage::CUSTOM_FOODS_KEY => {
                storage::save_list(self.kv.as_ref(), key, &self.custom_foods)
            }
            storage::CUSTOM_MEALS_KEY => {
                storage::save_list(self.kv.as_ref(), key, &self.custom_meals)
            }
            _ => return,
        };
        if let Err(e) = result {
            warn!(key, error = %e, "failed to persist list; keeping in-memory copy");
        }
    }
}
