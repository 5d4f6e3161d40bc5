mod custom_food;
mod custom_meal;
mod daily_aggregate;
mod log_entry;
mod remote_food;

pub use custom_food::CustomFood;
pub use custom_meal::{CustomMeal, MealItem};
pub use daily_aggregate::DailyAggregate;
pub use log_entry::{EntryDraft, FoodLogEntry, FoodSource, MacroType};
pub use remote_food::RemoteFoodRecord;
