use clap::Args;

use cutline_core::units::parse_grams;
use cutline_core::{NutritionLedgerController, RemoteFoodRecord, ScanResult, SearchSnapshot};

use super::print_view;

/// Search the catalog and the remote nutrition databases
#[derive(Args)]
pub struct SearchCommand {
    /// Search text (remote lookup needs at least 3 characters)
    pub query: String,

    /// Skip the remote databases and search only the local catalog
    #[arg(long)]
    pub local_only: bool,

    /// Log the Nth remote result (1-based, as numbered in the output)
    #[arg(long, value_name = "N")]
    pub log: Option<usize>,

    /// Serving size in grams for --log
    #[arg(long, short)]
    pub grams: Option<String>,
}

impl SearchCommand {
    pub fn run(
        &self,
        ctl: &mut NutritionLedgerController,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let groups = ctl.catalog_search(&self.query);
        if groups.is_empty() {
            println!("No catalog matches for '{}'.", self.query);
        }
        for group in &groups {
            println!("{}:", group.label);
            for item in &group.items {
                println!("  {}", item.name());
            }
        }

        if self.local_only {
            return Ok(());
        }

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| format!("Failed to create async runtime: {}", e))?;
        let snapshot = rt.block_on(ctl.remote_search(&self.query));

        if snapshot.query.is_empty() {
            println!("(remote search needs at least 3 characters)");
            return Ok(());
        }

        let remote = print_remote(&snapshot);

        if let Some(n) = self.log {
            let Some(record) = remote.get(n.saturating_sub(1)) else {
                println!("No remote result #{} to log.", n);
                return Ok(());
            };
            let grams = self.grams.as_deref().map(parse_grams).unwrap_or(0);
            if grams == 0 {
                println!("Pass a serving size with --grams to log a remote food.");
                return Ok(());
            }
            let view = ctl.log_remote_food(record, grams);
            println!("Logged {} at {}g.", record.name, grams);
            print_view(&view);
        }

        Ok(())
    }
}

/// Prints per-provider remote results and returns them flattened in
/// display order, for --log indexing.
fn print_remote(snapshot: &SearchSnapshot) -> Vec<RemoteFoodRecord> {
    let mut flat = Vec::new();

    if let Some(notice) = &snapshot.error_notice {
        println!("{}", notice);
    }

    for provider in &snapshot.providers {
        if provider.failed {
            println!("{}: unavailable", provider.name);
            continue;
        }
        if !provider.searched {
            continue;
        }
        if provider.results.is_empty() {
            println!("{}: no matches", provider.name);
            continue;
        }
        println!("{}:", provider.name);
        for record in &provider.results {
            flat.push(record.clone());
            println!("  {}. {}", flat.len(), record);
        }
    }

    flat
}

/// Look up a scanned barcode
#[derive(Args)]
pub struct BarcodeCommand {
    /// UPC/EAN code
    pub code: String,

    /// Serving size in grams; when given, a hit is logged immediately
    #[arg(long, short)]
    pub grams: Option<String>,
}

impl BarcodeCommand {
    pub fn run(
        &self,
        ctl: &mut NutritionLedgerController,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| format!("Failed to create async runtime: {}", e))?;

        match rt.block_on(ctl.scan_barcode(&self.code)) {
            ScanResult::Found(record) => {
                println!("Found: {}", record);
                if let Some(grams) = &self.grams {
                    let grams = parse_grams(grams);
                    if grams > 0 {
                        let view = ctl.log_remote_food(&record, grams);
                        println!("Logged {} at {}g.", record.name, grams);
                        print_view(&view);
                    }
                }
            }
            ScanResult::NotFound => {
                println!(
                    "Barcode {} not found. Try searching by name: 'cutline search <food>'.",
                    self.code
                );
            }
            ScanResult::Failed(message) => {
                println!("Barcode lookup failed: {}", message);
            }
        }
        Ok(())
    }
}
