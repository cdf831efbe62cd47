mod approvals;
mod history;
mod run;

pub use approvals::ApprovalsCommand;
pub use history::HistoryCommand;
pub use run::RunCommand;

use clap::Args;
use datascope_client::{ClientConfig, WorkspaceClient};
use std::sync::Arc;

/// Connection flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct BackendArgs {
    /// Workspace backend base URL
    #[arg(long, env = "DATASCOPE_BASE_URL")]
    pub base_url: String,

    /// Session token attached to outgoing requests
    #[arg(long, env = "DATASCOPE_TOKEN")]
    pub token: Option<String>,
}

impl BackendArgs {
    pub fn client(&self) -> anyhow::Result<Arc<WorkspaceClient>> {
        let mut config = ClientConfig::new(&self.base_url);
        if let Some(token) = &self.token {
            config = config.with_auth_token(token);
        }
        Ok(Arc::new(WorkspaceClient::new(config)?))
    }
}
