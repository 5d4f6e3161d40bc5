use clap::{Args, Subcommand};
use uuid::Uuid;

use cutline_core::{MealItem, NutritionLedgerController};

use super::print_view;

/// Manage and log custom meals
#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// Add a custom meal from item specs
    Add {
        /// Meal name
        name: String,

        /// Item as "name:carbs:protein" or "name:carbs:protein:ounces"
        /// (can be repeated)
        #[arg(long = "item", value_name = "ITEM", required = true)]
        items: Vec<String>,
    },

    /// List custom meals
    List,

    /// Remove a custom meal by id
    Remove {
        /// Meal id (shown by 'cutline meal list')
        id: String,
    },

    /// Log a custom meal by name or id
    Log {
        /// Meal name (exact, case-insensitive) or id
        meal: String,
    },
}

/// Parses a "name:carbs:protein[:ounces]" item spec.
fn parse_item(spec: &str) -> Result<MealItem, String> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() < 3 || parts.len() > 4 {
        return Err(format!(
            "Invalid item '{}'. Expected name:carbs:protein or name:carbs:protein:ounces",
            spec
        ));
    }

    let name = parts[0].trim();
    if name.is_empty() {
        return Err(format!("Invalid item '{}': empty name", spec));
    }
    let carbs: u32 = parts[1]
        .trim()
        .parse()
        .map_err(|_| format!("Invalid carb grams in '{}'", spec))?;
    let protein: u32 = parts[2]
        .trim()
        .parse()
        .map_err(|_| format!("Invalid protein grams in '{}'", spec))?;

    let mut item = MealItem::new(name, carbs, protein);
    if let Some(ounces) = parts.get(3) {
        let ounces: u32 = ounces
            .trim()
            .parse()
            .map_err(|_| format!("Invalid liquid ounces in '{}'", spec))?;
        item = item.with_liquid_ounces(ounces);
    }
    Ok(item)
}

impl MealCommand {
    pub fn run(
        &self,
        ctl: &mut NutritionLedgerController,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            MealSubcommand::Add { name, items } => {
                let items = items
                    .iter()
                    .map(|s| parse_item(s))
                    .collect::<Result<Vec<_>, _>>()?;
                let meal = ctl.add_custom_meal(name, items);
                println!("Added custom meal:");
                print!("{}", meal);
                println!("  id: {}", meal.id);
                Ok(())
            }
            MealSubcommand::List => {
                if ctl.custom_meals().is_empty() {
                    println!("No custom meals. Add one with 'cutline meal add'.");
                    return Ok(());
                }
                for meal in ctl.custom_meals() {
                    print!("{}", meal);
                    println!("  id: {}", meal.id);
                }
                Ok(())
            }
            MealSubcommand::Remove { id } => {
                let id = Uuid::parse_str(id).map_err(|_| format!("Invalid meal id: {}", id))?;
                if ctl.remove_custom_meal(id) {
                    println!("Removed custom meal {}.", id);
                } else {
                    println!("No custom meal with id {}.", id);
                }
                Ok(())
            }
            MealSubcommand::Log { meal } => {
                let found = ctl
                    .custom_meals()
                    .iter()
                    .find(|m| {
                        m.name.eq_ignore_ascii_case(meal)
                            || Uuid::parse_str(meal).map(|id| m.id == id).unwrap_or(false)
                    })
                    .cloned();

                match found {
                    Some(meal) => {
                        let view = ctl.log_custom_meal(&meal);
                        println!("Logged {} ({} items).", meal.name, meal.items.len());
                        print_view(&view);
                        Ok(())
                    }
                    None => {
                        println!("No custom meal named '{}'.", meal);
                        Ok(())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_basic() {
        let item = parse_item("Oats:40:5").unwrap();
        assert_eq!(item.name, "Oats");
        assert_eq!(item.carbs_grams, 40);
        assert_eq!(item.protein_grams, 5);
        assert!(item.liquid_ounces.is_none());
    }

    #[test]
    fn test_parse_item_with_ounces() {
        let item = parse_item("Orange juice:18:0:8").unwrap();
        assert_eq!(item.liquid_ounces, Some(8));
    }

    #[test]
    fn test_parse_item_invalid() {
        assert!(parse_item("Oats").is_err());
        assert!(parse_item("Oats:forty:5").is_err());
        assert!(parse_item(":40:5").is_err());
        assert!(parse_item("Oats:40:5:8:extra").is_err());
    }
}
