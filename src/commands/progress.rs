use chrono::Local;
use clap::{Args, ValueEnum};

use crate::config::Config;
use crate::ledger::Ledger;
use crate::stats::{daily_totals, weekly_buckets, DayStatus, Goals};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct TodayCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct WeekCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

fn goals(config: &Config) -> Goals {
    Goals {
        calories: config.calorie_goal,
        protein: config.protein_goal,
    }
}

impl TodayCommand {
    pub fn run(&self, ledger: &Ledger, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let snapshot = ledger.snapshot();
        let now = Local::now();
        let totals = daily_totals(&snapshot, &now);

        match self.format {
            OutputFormat::Json => {
                let out = serde_json::json!({
                    "date": now.format("%Y-%m-%d").to_string(),
                    "totals": totals,
                    "calorie_goal": config.calorie_goal,
                    "protein_goal": config.protein_goal,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            OutputFormat::Text => {
                println!("Today ({})", now.format("%Y-%m-%d"));
                println!(
                    "  Calories: {} / {} kcal",
                    totals.calories, config.calorie_goal
                );
                println!(
                    "  Protein:  {} / {} g",
                    totals.protein, config.protein_goal
                );
            }
        }
        Ok(())
    }
}

impl WeekCommand {
    pub fn run(&self, ledger: &Ledger, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let snapshot = ledger.snapshot();
        let buckets = weekly_buckets(&snapshot, &Local::now(), &goals(config));

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&buckets)?);
            }
            OutputFormat::Text => {
                println!("Last 7 days (goals: {} kcal, {}g protein)", config.calorie_goal, config.protein_goal);
                for bucket in &buckets {
                    println!(
                        "  {}  {:>5} kcal  {:>4}g  {}",
                        bucket.date,
                        bucket.totals.calories,
                        bucket.totals.protein,
                        status_label(bucket.status)
                    );
                }
            }
        }
        Ok(())
    }
}

fn status_label(status: DayStatus) -> &'static str {
    match status {
        DayStatus::Empty => "no entries",
        DayStatus::MetNone => "goals missed",
        DayStatus::MetOne => "one goal met",
        DayStatus::MetBoth => "both goals met",
    }
}
