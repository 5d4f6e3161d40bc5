use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A user-defined food. Global (not day-scoped); persists until the
/// user deletes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFood {
    pub id: Uuid,
    pub name: String,
    pub carbs_grams: u32,
    pub protein_grams: u32,
    pub serving_label: String,
}

impl CustomFood {
    pub fn new(
        name: impl Into<String>,
        carbs_grams: u32,
        protein_grams: u32,
        serving_label: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            carbs_grams,
            protein_grams,
            serving_label: serving_label.into(),
        }
    }
}

impl fmt::Display for CustomFood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}g carbs, {}g protein",
            self.name, self.serving_label, self.carbs_grams, self.protein_grams
        )
    }
}
