use chrono::Local;
use clap::{Args, ValueEnum};

use crate::ledger::Ledger;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct HistoryCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Show at most this many entries
    #[arg(long, short)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct DeleteCommand {
    /// Entry id to delete
    pub id: i64,
}

impl HistoryCommand {
    pub fn run(&self, ledger: &Ledger) -> Result<(), Box<dyn std::error::Error>> {
        let mut entries = ledger.snapshot();
        if let Some(limit) = self.limit {
            entries.truncate(limit);
        }

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
            OutputFormat::Text => {
                if entries.is_empty() {
                    println!("No entries logged yet.");
                    return Ok(());
                }

                println!(
                    "{:<6} {:<17} {:<32} {:>6} {:>8}",
                    "ID", "LOGGED", "NAME", "KCAL", "PROTEIN"
                );
                for entry in &entries {
                    let logged = entry
                        .logged_at
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string();
                    println!(
                        "{:<6} {:<17} {:<32} {:>6} {:>7}g",
                        entry.id, logged, entry.name, entry.calories, entry.protein
                    );
                }
            }
        }
        Ok(())
    }
}

impl DeleteCommand {
    pub async fn run(&self, ledger: &Ledger) -> Result<(), Box<dyn std::error::Error>> {
        ledger.remove(self.id).await?;
        println!("Removed entry {}", self.id);
        Ok(())
    }
}
