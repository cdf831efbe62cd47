use super::BackendArgs;
use clap::Args;

#[derive(Args, Debug)]
pub struct HistoryCommand {
    #[command(flatten)]
    backend: BackendArgs,

    /// Number of entries to fetch
    #[arg(long, default_value_t = 100)]
    limit: u32,

    /// Entries to skip
    #[arg(long, default_value_t = 0)]
    offset: u32,
}

impl HistoryCommand {
    pub async fn execute(self) -> anyhow::Result<()> {
        let client = self.backend.client()?;
        let entries = client.list_history(self.limit, self.offset).await?;

        if entries.is_empty() {
            println!("No recorded executions.");
            return Ok(());
        }
        for entry in entries {
            println!(
                "{}  {}  {:<16}  {} rows  {}ms",
                entry.started_at.to_rfc3339(),
                entry.statement_hash,
                entry.status,
                entry.row_count,
                entry.duration_ms
            );
        }
        Ok(())
    }
}
