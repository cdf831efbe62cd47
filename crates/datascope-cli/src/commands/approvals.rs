use super::BackendArgs;
use clap::Args;

#[derive(Args, Debug)]
pub struct ApprovalsCommand {
    #[command(flatten)]
    backend: BackendArgs,

    /// Grant this approval instead of listing
    #[arg(long, conflicts_with = "deny")]
    approve: Option<String>,

    /// Refuse this approval instead of listing
    #[arg(long)]
    deny: Option<String>,
}

impl ApprovalsCommand {
    pub async fn execute(self) -> anyhow::Result<()> {
        let client = self.backend.client()?;

        if let Some(approval_id) = &self.approve {
            let status = client.approve(approval_id).await?;
            println!("Approval {}: {}", approval_id, status);
            return Ok(());
        }
        if let Some(approval_id) = &self.deny {
            let status = client.deny(approval_id).await?;
            println!("Approval {}: {}", approval_id, status);
            return Ok(());
        }

        let approvals = client.list_pending_approvals().await?;
        if approvals.is_empty() {
            println!("No pending approvals.");
            return Ok(());
        }
        for approval in approvals {
            println!(
                "{}  {}  [{}]  {}",
                approval.id,
                approval.created_at.to_rfc3339(),
                approval.environment,
                approval.statement
            );
        }
        Ok(())
    }
}
