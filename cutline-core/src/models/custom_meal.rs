use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One component of a custom meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    pub name: String,
    pub carbs_grams: u32,
    pub protein_grams: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_ounces: Option<u32>,
}

impl MealItem {
    pub fn new(name: impl Into<String>, carbs_grams: u32, protein_grams: u32) -> Self {
        Self {
            name: name.into(),
            carbs_grams,
            protein_grams,
            liquid_ounces: None,
        }
    }

    pub fn with_liquid_ounces(mut self, ounces: u32) -> Self {
        self.liquid_ounces = Some(ounces);
        self
    }
}

/// A user-defined multi-item meal.
///
/// Totals are memoized at construction. Logging a meal emits one ledger
/// entry per non-zero macro per item, so its history stays reversible
/// item-by-item rather than as one opaque block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMeal {
    pub id: Uuid,
    pub name: String,
    pub items: Vec<MealItem>,
    pub total_carbs: u32,
    pub total_protein: u32,
    pub total_water: u32,
}

impl CustomMeal {
    pub fn new(name: impl Into<String>, items: Vec<MealItem>) -> Self {
        let total_carbs = items.iter().map(|i| i.carbs_grams).sum();
        let total_protein = items.iter().map(|i| i.protein_grams).sum();
        let total_water = items.iter().filter_map(|i| i.liquid_ounces).sum();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            items,
            total_carbs,
            total_protein,
            total_water,
        }
    }
}

impl fmt::Display for CustomMeal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {}g carbs, {}g protein, {}oz water",
            self.name, self.total_carbs, self.total_protein, self.total_water
        )?;
        for item in &self.items {
            writeln!(
                f,
                "  - {} ({}g carbs, {}g protein)",
                item.name, item.carbs_grams, item.protein_grams
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakfast() -> CustomMeal {
        CustomMeal::new(
            "Cut breakfast",
            vec![
                MealItem::new("Oats", 40, 5),
                MealItem::new("Egg whites", 0, 18),
                MealItem::new("Orange juice", 18, 0).with_liquid_ounces(8),
            ],
        )
    }

    #[test]
    fn test_totals_are_item_sums() {
        let meal = breakfast();
        assert_eq!(meal.total_carbs, 58);
        assert_eq!(meal.total_protein, 23);
        assert_eq!(meal.total_water, 8);
    }

    #[test]
    fn test_empty_meal_totals_zero() {
        let meal = CustomMeal::new("Empty", vec![]);
        assert_eq!(meal.total_carbs, 0);
        assert_eq!(meal.total_protein, 0);
        assert_eq!(meal.total_water, 0);
    }

    #[test]
    fn test_meal_json_roundtrip() {
        let meal = breakfast();
        let json = serde_json::to_string(&meal).unwrap();
        let parsed: CustomMeal = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, meal);
    }

    #[test]
    fn test_meal_display_lists_items() {
        let out = format!("{}", breakfast());
        assert!(out.contains("Cut breakfast"));
        assert!(out.contains("Oats"));
        assert!(out.contains("Egg whites"));
    }
}
