//! Datascope CLI - run statements against workspace connections
//!
//! Thin terminal consumer of the query-execution client: submit one
//! statement, follow the result stream to completion, and print the
//! settled outcome. Also lists pending approvals and query history.

mod commands;

use clap::{Parser, Subcommand};
use commands::{ApprovalsCommand, HistoryCommand, RunCommand};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "DATASCOPE_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "DATASCOPE_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a statement and print the settled result
    Run(RunCommand),
    /// List executions awaiting manual approval
    Approvals(ApprovalsCommand),
    /// List recorded query executions
    History(HistoryCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // If RUST_LOG is set, use it directly; otherwise keep our own crates at
    // the requested level and noisy dependencies at warn
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .expect("Invalid RUST_LOG environment variable")
    } else {
        tracing_subscriber::EnvFilter::new(format!(
            "datascope_cli={level},\
             datascope_client={level},\
             datascope_protocol={level},\
             hyper=warn,\
             reqwest=warn,\
             rustls=warn,\
             tungstenite=warn",
            level = cli.log_level
        ))
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");

    match cli.command {
        Commands::Run(run_cmd) => run_cmd.execute().await,
        Commands::Approvals(approvals_cmd) => approvals_cmd.execute().await,
        Commands::History(history_cmd) => history_cmd.execute().await,
    }
}
