//! Cutline Core Library
//!
//! The nutrition ledger for the Cutline weight-cut tracker: day totals
//! and food history with exact undo, gram/slice/water unit sync, local
//! catalog resolution, and best-effort remote food lookup.

pub mod catalog;
pub mod controller;
pub mod ledger;
pub mod models;
pub mod remote;
pub mod storage;
pub mod units;

pub use catalog::{
    CatalogGroup, CatalogItem, CatalogSources, DayPhase, FoodCatalogResolver, PlanFood,
};
pub use controller::{LedgerView, NutritionLedgerController, ScanResult};
pub use ledger::{DailyTotalsStore, KvDailyTotals, LedgerStore};
pub use models::{
    CustomFood, CustomMeal, DailyAggregate, EntryDraft, FoodLogEntry, FoodSource, MacroType,
    MealItem, RemoteFoodRecord,
};
pub use remote::{
    BarcodeOutcome, GatewayConfig, HttpProvider, NutritionProvider, ProviderConfig,
    ProviderError, RemoteFoodGateway, SearchSnapshot,
};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
