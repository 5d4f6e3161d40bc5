use clap::Args;
use std::str::FromStr;
use uuid::Uuid;

use cutline_core::units::parse_grams;
use cutline_core::{CatalogItem, MacroType, NutritionLedgerController};

use super::print_view;

/// Log a food from the catalog (plan foods, custom foods, custom meals)
#[derive(Args)]
pub struct LogCommand {
    /// Food name (or part of it) to look up in the catalog
    pub query: String,

    /// Portion in grams; plan foods fall back to their recommended
    /// portion when omitted
    #[arg(long, short)]
    pub grams: Option<String>,
}

impl LogCommand {
    pub fn run(
        &self,
        ctl: &mut NutritionLedgerController,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let groups = ctl.catalog_search(&self.query);
        let Some(item) = groups.iter().flat_map(|g| g.items.iter()).next() else {
            println!(
                "No catalog match for '{}'. Try 'cutline search {}' to look it up remotely.",
                self.query, self.query
            );
            return Ok(());
        };

        let grams = self.grams.as_deref().map(parse_grams).filter(|g| *g > 0);
        let view = match item.clone() {
            CatalogItem::Plan(food) => ctl.log_plan_food(&food, grams),
            CatalogItem::Food(food) => ctl.log_custom_food(&food),
            CatalogItem::Meal(meal) => ctl.log_custom_meal(&meal),
        };

        println!("Logged {}.", item.name());
        print_view(&view);
        Ok(())
    }
}

/// Undo the most recent log entry
#[derive(Args)]
pub struct UndoCommand {}

impl UndoCommand {
    pub fn run(
        &self,
        ctl: &mut NutritionLedgerController,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let before = ctl.view().history.len();
        let view = ctl.undo();
        if view.history.len() == before {
            println!("Nothing to undo.");
        } else {
            print_view(&view);
        }
        Ok(())
    }
}

/// Delete a log entry by id
#[derive(Args)]
pub struct DeleteCommand {
    /// Entry id (shown by 'cutline history')
    pub id: String,
}

impl DeleteCommand {
    pub fn run(
        &self,
        ctl: &mut NutritionLedgerController,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|_| format!("Invalid entry id: {}", self.id))?;

        let before = ctl.view().history.len();
        let view = ctl.delete(id);
        if view.history.len() == before {
            println!("No entry with id {}.", id);
        } else {
            print_view(&view);
        }
        Ok(())
    }
}

/// Overwrite a macro total directly (clears the day's history)
#[derive(Args)]
pub struct EditCommand {
    /// Macro to overwrite (carbs, protein)
    #[arg(long, short)]
    pub r#macro: String,

    /// New total in grams
    #[arg(long, short)]
    pub grams: String,
}

impl EditCommand {
    pub fn run(
        &self,
        ctl: &mut NutritionLedgerController,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let macro_type = MacroType::from_str(&self.r#macro)?;
        let view = ctl.manual_edit(macro_type, &self.grams);
        print_view(&view);
        Ok(())
    }
}

/// Zero the day's macro totals and history (water is kept)
#[derive(Args)]
pub struct ResetCommand {}

impl ResetCommand {
    pub fn run(
        &self,
        ctl: &mut NutritionLedgerController,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let view = ctl.reset_day();
        print_view(&view);
        Ok(())
    }
}
