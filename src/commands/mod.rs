pub mod food;
pub mod history;
pub mod ledger_cmd;
pub mod meal;
pub mod search;

pub use food::FoodCommand;
pub use history::{HistoryCommand, TotalsCommand};
pub use ledger_cmd::{DeleteCommand, EditCommand, LogCommand, ResetCommand, UndoCommand};
pub use meal::MealCommand;
pub use search::{BarcodeCommand, SearchCommand};

use clap::ValueEnum;
use cutline_core::LedgerView;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Prints the refreshed day view after a mutation.
pub fn print_view(view: &LedgerView) {
    println!("{}: {}", view.day, view.aggregate);
}
