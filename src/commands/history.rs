use clap::Args;

use cutline_core::NutritionLedgerController;

use super::OutputFormat;

/// View the day's food history
#[derive(Args)]
pub struct HistoryCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl HistoryCommand {
    pub fn run(
        &self,
        ctl: &NutritionLedgerController,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let view = ctl.view();
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&view.history)?);
            }
            OutputFormat::Text => {
                if view.history.is_empty() {
                    println!("No foods logged on {}.", view.day);
                    return Ok(());
                }
                println!("Food history for {} (newest first):", view.day);
                for entry in view.history.iter().rev() {
                    println!(
                        "  {}  {}  [{}]",
                        entry.timestamp.format("%H:%M"),
                        entry,
                        entry.id
                    );
                }
            }
        }
        Ok(())
    }
}

/// Show the day's running totals
#[derive(Args)]
pub struct TotalsCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl TotalsCommand {
    pub fn run(
        &self,
        ctl: &NutritionLedgerController,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let view = ctl.view();
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&view.aggregate)?);
            }
            OutputFormat::Text => {
                println!("{}: {}", view.day, view.aggregate);
            }
        }
        Ok(())
    }
}
