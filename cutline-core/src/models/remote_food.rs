use serde::{Deserialize, Serialize};
use std::fmt;

use super::log_entry::FoodSource;

/// A nutrition record from a remote provider, normalized per 100 g.
///
/// Ephemeral: never persisted. Scaled to a user-chosen serving size at
/// logging time; the scaled carb/protein grams feed the ledger like any
/// other source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFoodRecord {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size_unit: Option<String>,
    pub source: FoodSource,
}

impl RemoteFoodRecord {
    /// Scales every nutrient linearly from per-100g to `grams`.
    pub fn scaled(&self, grams: f64) -> Self {
        let factor = grams / 100.0;
        Self {
            name: self.name.clone(),
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
            fiber: self.fiber * factor,
            sugar: self.sugar * factor,
            sodium: self.sodium * factor,
            serving_size: self.serving_size,
            serving_size_unit: self.serving_size_unit.clone(),
            source: self.source,
        }
    }

    /// Carb grams rounded to the nearest whole gram, floored at zero.
    pub fn carbs_grams(&self) -> u32 {
        round_grams(self.carbs)
    }

    /// Protein grams rounded to the nearest whole gram, floored at zero.
    pub fn protein_grams(&self) -> u32 {
        round_grams(self.protein)
    }
}

fn round_grams(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

impl fmt::Display for RemoteFoodRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (per 100g: {:.0} kcal, {:.1}g carbs, {:.1}g protein)",
            self.name, self.calories, self.carbs, self.protein
        )?;
        if let Some(size) = self.serving_size {
            let unit = self.serving_size_unit.as_deref().unwrap_or("g");
            write!(f, " [serving: {}{}]", size, unit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banana() -> RemoteFoodRecord {
        RemoteFoodRecord {
            name: "Banana, raw".to_string(),
            calories: 89.0,
            protein: 1.1,
            carbs: 22.8,
            fat: 0.3,
            fiber: 2.6,
            sugar: 12.2,
            sodium: 1.0,
            serving_size: Some(118.0),
            serving_size_unit: Some("g".to_string()),
            source: FoodSource::RemoteDbA,
        }
    }

    #[test]
    fn test_scaling_is_linear() {
        let half = banana().scaled(50.0);
        assert!((half.calories - 44.5).abs() < 1e-9);
        assert!((half.carbs - 11.4).abs() < 1e-9);
        assert!((half.protein - 0.55).abs() < 1e-9);

        let double = banana().scaled(200.0);
        assert!((double.carbs - 45.6).abs() < 1e-9);
    }

    #[test]
    fn test_scaled_keeps_identity_fields() {
        let scaled = banana().scaled(120.0);
        assert_eq!(scaled.name, "Banana, raw");
        assert_eq!(scaled.source, FoodSource::RemoteDbA);
        assert_eq!(scaled.serving_size, Some(118.0));
    }

    #[test]
    fn test_gram_rounding() {
        let scaled = banana().scaled(120.0);
        // 22.8 * 1.2 = 27.36 -> 27
        assert_eq!(scaled.carbs_grams(), 27);
        // 1.1 * 1.2 = 1.32 -> 1
        assert_eq!(scaled.protein_grams(), 1);

        let zero = banana().scaled(0.0);
        assert_eq!(zero.carbs_grams(), 0);
        assert_eq!(zero.protein_grams(), 0);
    }
}
