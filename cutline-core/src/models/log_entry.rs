use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The macro a food contributes toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroType {
    Carbs,
    Protein,
}

impl fmt::Display for MacroType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroType::Carbs => write!(f, "carbs"),
            MacroType::Protein => write!(f, "protein"),
        }
    }
}

impl FromStr for MacroType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "carbs" | "carb" => Ok(MacroType::Carbs),
            "protein" => Ok(MacroType::Protein),
            _ => Err(format!(
                "Invalid macro type '{}'. Valid options: carbs, protein",
                s
            )),
        }
    }
}

/// Where a logged food came from.
///
/// Plan categories are supplied pre-filtered by the external protocol
/// engine; the remote variants identify which provider produced the
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FoodSource {
    PlanFructose,
    PlanGlucose,
    PlanZeroFiber,
    PlanProtein,
    CustomFood,
    CustomMeal,
    RemoteDbA,
    RemoteDbB,
}

impl FoodSource {
    /// True for the plan-supplied categories.
    pub fn is_plan(&self) -> bool {
        matches!(
            self,
            FoodSource::PlanFructose
                | FoodSource::PlanGlucose
                | FoodSource::PlanZeroFiber
                | FoodSource::PlanProtein
        )
    }
}

impl fmt::Display for FoodSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoodSource::PlanFructose => write!(f, "plan-fructose"),
            FoodSource::PlanGlucose => write!(f, "plan-glucose"),
            FoodSource::PlanZeroFiber => write!(f, "plan-zero-fiber"),
            FoodSource::PlanProtein => write!(f, "plan-protein"),
            FoodSource::CustomFood => write!(f, "custom-food"),
            FoodSource::CustomMeal => write!(f, "custom-meal"),
            FoodSource::RemoteDbA => write!(f, "remote-db-a"),
            FoodSource::RemoteDbB => write!(f, "remote-db-b"),
        }
    }
}

/// Input to `LedgerStore::append`: everything an entry needs except the
/// id and timestamp, which the store assigns.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub name: String,
    pub macro_type: MacroType,
    pub amount_grams: u32,
    pub source: FoodSource,
    pub liquid_ounces: Option<u32>,
}

impl EntryDraft {
    pub fn new(
        name: impl Into<String>,
        macro_type: MacroType,
        amount_grams: u32,
        source: FoodSource,
    ) -> Self {
        Self {
            name: name.into(),
            macro_type,
            amount_grams,
            source,
            liquid_ounces: None,
        }
    }

    pub fn with_liquid_ounces(mut self, ounces: u32) -> Self {
        self.liquid_ounces = Some(ounces);
        self
    }
}

/// One row of a day's food history. Never mutated after creation;
/// removal via undo/delete is the only way it leaves the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLogEntry {
    pub id: Uuid,
    pub name: String,
    pub macro_type: MacroType,
    pub amount_grams: u32,
    pub timestamp: DateTime<Utc>,
    pub source: FoodSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_ounces: Option<u32>,
}

impl FoodLogEntry {
    pub fn from_draft(draft: EntryDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            macro_type: draft.macro_type,
            amount_grams: draft.amount_grams,
            timestamp: Utc::now(),
            source: draft.source,
            liquid_ounces: draft.liquid_ounces,
        }
    }
}

impl fmt::Display for FoodLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}g {} [{}]",
            self.name, self.amount_grams, self.macro_type, self.source
        )?;
        if let Some(oz) = self.liquid_ounces {
            write!(f, " +{}oz water", oz)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_type_from_str() {
        assert_eq!(MacroType::from_str("carbs").unwrap(), MacroType::Carbs);
        assert_eq!(MacroType::from_str("CARB").unwrap(), MacroType::Carbs);
        assert_eq!(MacroType::from_str("Protein").unwrap(), MacroType::Protein);
        assert!(MacroType::from_str("fat").is_err());
    }

    #[test]
    fn test_food_source_serializes_kebab_case() {
        let json = serde_json::to_string(&FoodSource::PlanZeroFiber).unwrap();
        assert_eq!(json, "\"plan-zero-fiber\"");
        let parsed: FoodSource = serde_json::from_str("\"remote-db-a\"").unwrap();
        assert_eq!(parsed, FoodSource::RemoteDbA);
    }

    #[test]
    fn test_entry_from_draft() {
        let draft = EntryDraft::new("Banana", MacroType::Carbs, 25, FoodSource::PlanFructose);
        let entry = FoodLogEntry::from_draft(draft);

        assert_eq!(entry.name, "Banana");
        assert_eq!(entry.macro_type, MacroType::Carbs);
        assert_eq!(entry.amount_grams, 25);
        assert_eq!(entry.source, FoodSource::PlanFructose);
        assert!(entry.liquid_ounces.is_none());
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let draft = EntryDraft::new("Rice", MacroType::Carbs, 40, FoodSource::PlanGlucose);
        let a = FoodLogEntry::from_draft(draft.clone());
        let b = FoodLogEntry::from_draft(draft);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_liquid_ounces_omitted_when_absent() {
        let entry = FoodLogEntry::from_draft(EntryDraft::new(
            "Chicken",
            MacroType::Protein,
            30,
            FoodSource::CustomFood,
        ));
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("liquid_ounces"));

        let juice = FoodLogEntry::from_draft(
            EntryDraft::new("Orange juice", MacroType::Carbs, 18, FoodSource::PlanFructose)
                .with_liquid_ounces(8),
        );
        let json = serde_json::to_string(&juice).unwrap();
        assert!(json.contains("\"liquid_ounces\":8"));
    }

    #[test]
    fn test_entry_json_roundtrip() {
        let entry = FoodLogEntry::from_draft(
            EntryDraft::new("Orange juice", MacroType::Carbs, 18, FoodSource::PlanFructose)
                .with_liquid_ounces(8),
        );
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: FoodLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
        assert_eq!(parsed.timestamp, entry.timestamp);
    }
}
