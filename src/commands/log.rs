use clap::Args;

use crate::config::Config;
use crate::ledger::Ledger;

#[derive(Args)]
pub struct LogCommand {
    /// Free-text meal description, e.g. "two eggs and toast"
    #[arg(required = true)]
    pub description: Vec<String>,
}

impl LogCommand {
    pub async fn run(
        &self,
        ledger: &Ledger,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if config.api_key.is_empty() {
            return Err(
                "No API key configured. Run 'macrolog config set api_key <KEY>' \
                 or set MACROLOG_API_KEY."
                    .into(),
            );
        }

        let description = self.description.join(" ");
        let entry = ledger.add_from_text(&description, &config.api_key).await?;

        println!("Logged #{} {}", entry.id, entry);
        Ok(())
    }
}
