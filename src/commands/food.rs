use clap::{Args, Subcommand};
use uuid::Uuid;

use cutline_core::NutritionLedgerController;

use super::print_view;

/// Manage and log custom foods
#[derive(Args)]
pub struct FoodCommand {
    #[command(subcommand)]
    pub command: FoodSubcommand,
}

#[derive(Subcommand)]
pub enum FoodSubcommand {
    /// Add a custom food
    Add {
        /// Food name
        name: String,

        /// Carb grams per serving
        #[arg(long, default_value_t = 0)]
        carbs: u32,

        /// Protein grams per serving
        #[arg(long, default_value_t = 0)]
        protein: u32,

        /// Serving label (e.g. "1 cake", "100g")
        #[arg(long, default_value = "1 serving")]
        serving: String,
    },

    /// List custom foods
    List,

    /// Remove a custom food by id
    Remove {
        /// Food id (shown by 'cutline food list')
        id: String,
    },

    /// Log a custom food by name or id
    Log {
        /// Food name (exact, case-insensitive) or id
        food: String,
    },
}

impl FoodCommand {
    pub fn run(
        &self,
        ctl: &mut NutritionLedgerController,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            FoodSubcommand::Add {
                name,
                carbs,
                protein,
                serving,
            } => {
                let food = ctl.add_custom_food(name, *carbs, *protein, serving);
                println!("Added custom food:");
                println!("  {}  [{}]", food, food.id);
                Ok(())
            }
            FoodSubcommand::List => {
                if ctl.custom_foods().is_empty() {
                    println!("No custom foods. Add one with 'cutline food add'.");
                    return Ok(());
                }
                for food in ctl.custom_foods() {
                    println!("  {}  [{}]", food, food.id);
                }
                Ok(())
            }
            FoodSubcommand::Remove { id } => {
                let id = Uuid::parse_str(id).map_err(|_| format!("Invalid food id: {}", id))?;
                if ctl.remove_custom_food(id) {
                    println!("Removed custom food {}.", id);
                } else {
                    println!("No custom food with id {}.", id);
                }
                Ok(())
            }
            FoodSubcommand::Log { food } => {
                let found = ctl
                    .custom_foods()
                    .iter()
                    .find(|f| {
                        f.name.eq_ignore_ascii_case(food)
                            || Uuid::parse_str(food).map(|id| f.id == id).unwrap_or(false)
                    })
                    .cloned();

                match found {
                    Some(food) => {
                        let view = ctl.log_custom_food(&food);
                        println!("Logged {}.", food.name);
                        print_view(&view);
                        Ok(())
                    }
                    None => {
                        println!("No custom food named '{}'.", food);
                        Ok(())
                    }
                }
            }
        }
    }
}
