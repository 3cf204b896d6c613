use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Set a configuration value and write it to the config file
    Set {
        /// One of: database_path, calorie_goal, protein_goal, api_key, api_url, model
        key: String,

        /// The new value
        value: String,
    },
}

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        cli_config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(config)?);
                    Ok(())
                }
                OutputFormat::Text => {
                    println!("Configuration");
                    println!("=============\n");

                    println!("database_path: {}", config.database_path.display());
                    println!("calorie_goal:  {} kcal", config.calorie_goal);
                    println!("protein_goal:  {} g", config.protein_goal);
                    println!(
                        "api_key:       {}",
                        if config.api_key.is_empty() {
                            "(not set)"
                        } else {
                            "(set)"
                        }
                    );
                    println!("api_url:       {}", config.api_url);
                    println!("model:         {}", config.model);
                    Ok(())
                }
            },
            ConfigSubcommand::Set { key, value } => {
                let mut updated = config.clone();
                match key.as_str() {
                    "database_path" => updated.database_path = PathBuf::from(value),
                    "calorie_goal" => {
                        updated.calorie_goal = value
                            .parse()
                            .map_err(|_| format!("calorie_goal must be an integer: {}", value))?
                    }
                    "protein_goal" => {
                        updated.protein_goal = value
                            .parse()
                            .map_err(|_| format!("protein_goal must be an integer: {}", value))?
                    }
                    "api_key" => updated.api_key = value.clone(),
                    "api_url" => updated.api_url = value.clone(),
                    "model" => updated.model = value.clone(),
                    other => {
                        return Err(format!(
                            "Unknown config key '{}'. Valid keys: database_path, \
                             calorie_goal, protein_goal, api_key, api_url, model",
                            other
                        )
                        .into())
                    }
                }

                let path = cli_config_path.unwrap_or_else(Config::default_config_path);
                updated.save(&path)?;
                println!("Set {} in {}", key, path.display());
                Ok(())
            }
        }
    }
}
