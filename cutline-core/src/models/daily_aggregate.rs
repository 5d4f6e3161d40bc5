use serde::{Deserialize, Serialize};
use std::fmt;

use super::log_entry::MacroType;

/// Running totals for one calendar day.
///
/// Slice counts are derived from the gram totals and are recomputed
/// from the full total on every mutation, never accumulated per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub carbs_consumed_grams: u32,
    pub protein_consumed_grams: u32,
    pub water_consumed_ounces: u32,
    pub carb_slices: u32,
    pub protein_slices: u32,
}

impl DailyAggregate {
    pub fn macro_grams(&self, macro_type: MacroType) -> u32 {
        match macro_type {
            MacroType::Carbs => self.carbs_consumed_grams,
            MacroType::Protein => self.protein_consumed_grams,
        }
    }

    pub fn set_macro_grams(&mut self, macro_type: MacroType, grams: u32) {
        match macro_type {
            MacroType::Carbs => self.carbs_consumed_grams = grams,
            MacroType::Protein => self.protein_consumed_grams = grams,
        }
    }

    pub fn set_macro_slices(&mut self, macro_type: MacroType, slices: u32) {
        match macro_type {
            MacroType::Carbs => self.carb_slices = slices,
            MacroType::Protein => self.protein_slices = slices,
        }
    }
}

impl fmt::Display for DailyAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "carbs: {}g ({} slices), protein: {}g ({} slices), water: {}oz",
            self.carbs_consumed_grams,
            self.carb_slices,
            self.protein_consumed_grams,
            self.protein_slices,
            self.water_consumed_ounces
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zeroed() {
        let agg = DailyAggregate::default();
        assert_eq!(agg.carbs_consumed_grams, 0);
        assert_eq!(agg.protein_consumed_grams, 0);
        assert_eq!(agg.water_consumed_ounces, 0);
        assert_eq!(agg.carb_slices, 0);
        assert_eq!(agg.protein_slices, 0);
    }

    #[test]
    fn test_macro_accessors() {
        let mut agg = DailyAggregate::default();
        agg.set_macro_grams(MacroType::Carbs, 43);
        agg.set_macro_grams(MacroType::Protein, 25);

        assert_eq!(agg.macro_grams(MacroType::Carbs), 43);
        assert_eq!(agg.macro_grams(MacroType::Protein), 25);
    }

    #[test]
    fn test_json_roundtrip() {
        let agg = DailyAggregate {
            carbs_consumed_grams: 43,
            protein_consumed_grams: 25,
            water_consumed_ounces: 8,
            carb_slices: 2,
            protein_slices: 1,
        };
        let json = serde_json::to_string(&agg).unwrap();
        let parsed: DailyAggregate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, agg);
    }
}
