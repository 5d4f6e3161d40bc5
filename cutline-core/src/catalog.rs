//! Merges the day's plan foods, custom foods, and custom meals into
//! grouped, filterable results.
//!
//! Phase logic lives in the external protocol engine: the plan list
//! arrives already filtered for the day, and the resolver only uses
//! the day-phase flag to pick which plan groups lead the default view.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{CustomFood, CustomMeal, FoodSource, MacroType};

/// How close the day is to weigh-in, as classified by the protocol
/// engine. Supplied, never computed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayPhase {
    /// More than five days out; ordinary mix.
    Baseline,
    /// Three to five days out; fructose-heavy foods recommended.
    FructoseLoad,
    /// One to two days out; glucose/starch foods recommended.
    GlucoseLoad,
    /// Final one to two days; zero-fiber foods recommended.
    ZeroFiber,
    /// Protocol marks the day protein-free.
    ProteinFree,
}

impl DayPhase {
    /// The plan categories the default (no-query) view should surface.
    fn recommended_sources(&self) -> &'static [FoodSource] {
        match self {
            DayPhase::Baseline => &[FoodSource::PlanFructose, FoodSource::PlanProtein],
            DayPhase::FructoseLoad => &[FoodSource::PlanFructose, FoodSource::PlanProtein],
            DayPhase::GlucoseLoad => &[FoodSource::PlanGlucose, FoodSource::PlanProtein],
            DayPhase::ZeroFiber => &[FoodSource::PlanZeroFiber, FoodSource::PlanGlucose],
            DayPhase::ProteinFree => &[FoodSource::PlanFructose, FoodSource::PlanGlucose],
        }
    }
}

impl fmt::Display for DayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayPhase::Baseline => write!(f, "baseline"),
            DayPhase::FructoseLoad => write!(f, "fructose-load"),
            DayPhase::GlucoseLoad => write!(f, "glucose-load"),
            DayPhase::ZeroFiber => write!(f, "zero-fiber"),
            DayPhase::ProteinFree => write!(f, "protein-free"),
        }
    }
}

impl FromStr for DayPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baseline" => Ok(DayPhase::Baseline),
            "fructose-load" => Ok(DayPhase::FructoseLoad),
            "glucose-load" => Ok(DayPhase::GlucoseLoad),
            "zero-fiber" => Ok(DayPhase::ZeroFiber),
            "protein-free" => Ok(DayPhase::ProteinFree),
            _ => Err(format!(
                "Invalid day phase '{}'. Valid options: baseline, fructose-load, \
                 glucose-load, zero-fiber, protein-free",
                s
            )),
        }
    }
}

/// A plan-supplied food with its recommended portion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanFood {
    pub name: String,
    pub macro_type: MacroType,
    pub default_grams: u32,
    pub source: FoodSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_ounces: Option<u32>,
}

/// The source lists the resolver merges. Plan foods arrive already
/// phase-filtered; custom foods and meals are the user's own.
#[derive(Debug, Clone, Default)]
pub struct CatalogSources {
    pub plan: Vec<PlanFood>,
    pub custom_foods: Vec<CustomFood>,
    pub custom_meals: Vec<CustomMeal>,
}

/// One loggable row in a catalog group.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogItem {
    Plan(PlanFood),
    Food(CustomFood),
    Meal(CustomMeal),
}

impl CatalogItem {
    pub fn name(&self) -> &str {
        match self {
            CatalogItem::Plan(food) => &food.name,
            CatalogItem::Food(food) => &food.name,
            CatalogItem::Meal(meal) => &meal.name,
        }
    }
}

/// A labeled section of results.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogGroup {
    pub label: String,
    pub items: Vec<CatalogItem>,
}

/// Stateless resolver; sources are passed per call.
pub struct FoodCatalogResolver;

impl FoodCatalogResolver {
    /// Resolves the loggable foods to display.
    ///
    /// An empty query returns the phase-recommended plan groups so the
    /// default view stays short; a non-empty query filters every
    /// source by case-insensitive substring, with plan foods first,
    /// then custom foods, then custom meals, as labeled groups.
    pub fn search(query: &str, phase: DayPhase, sources: &CatalogSources) -> Vec<CatalogGroup> {
        let query = query.trim();
        if query.is_empty() {
            return Self::default_groups(phase, sources);
        }

        let needle = query.to_lowercase();
        let mut groups = Vec::new();

        let plan: Vec<CatalogItem> = sources
            .plan
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .cloned()
            .map(CatalogItem::Plan)
            .collect();
        if !plan.is_empty() {
            groups.push(CatalogGroup {
                label: "Plan foods".to_string(),
                items: plan,
            });
        }

        let foods: Vec<CatalogItem> = sources
            .custom_foods
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .cloned()
            .map(CatalogItem::Food)
            .collect();
        if !foods.is_empty() {
            groups.push(CatalogGroup {
                label: "Custom foods".to_string(),
                items: foods,
            });
        }

        let meals: Vec<CatalogItem> = sources
            .custom_meals
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .cloned()
            .map(CatalogItem::Meal)
            .collect();
        if !meals.is_empty() {
            groups.push(CatalogGroup {
                label: "Custom meals".to_string(),
                items: meals,
            });
        }

        groups
    }

    fn default_groups(phase: DayPhase, sources: &CatalogSources) -> Vec<CatalogGroup> {
        phase
            .recommended_sources()
            .iter()
            .filter_map(|source| {
                let items: Vec<CatalogItem> = sources
                    .plan
                    .iter()
                    .filter(|f| f.source == *source)
                    .cloned()
                    .map(CatalogItem::Plan)
                    .collect();
                if items.is_empty() {
                    None
                } else {
                    Some(CatalogGroup {
                        label: source.to_string(),
                        items,
                    })
                }
            })
            .collect()
    }
}
