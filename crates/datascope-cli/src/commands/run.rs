use super::BackendArgs;
use anyhow::bail;
use clap::Args;
use datascope_protocol::{QueryRunner, QuerySubmission, ResultSet, RunOutcome};

#[derive(Args, Debug)]
pub struct RunCommand {
    #[command(flatten)]
    backend: BackendArgs,

    /// Target connection id
    #[arg(long)]
    connection: String,

    /// Approval token from a previously granted approval
    #[arg(long)]
    approval_id: Option<String>,

    /// Cap the number of returned rows
    #[arg(long)]
    max_rows: Option<u32>,

    /// Cancel the query after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print the outcome as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Statement to execute
    statement: String,
}

impl RunCommand {
    pub async fn execute(self) -> anyhow::Result<()> {
        let client = self.backend.client()?;

        let mut submission = QuerySubmission::new(&self.connection, &self.statement);
        if let Some(approval_id) = &self.approval_id {
            submission = submission.with_approval_id(approval_id);
        }
        if let Some(max_rows) = self.max_rows {
            submission = submission.with_max_rows(max_rows);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            submission = submission.with_timeout_ms(timeout_ms);
        }

        let outcome = QueryRunner::new(client).run(submission).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            return Ok(());
        }

        match outcome {
            RunOutcome::Completed { result } => {
                print_result(&result);
                Ok(())
            }
            RunOutcome::PendingApproval { approval_id } => {
                println!("Execution deferred pending approval: {}", approval_id);
                println!("Re-run with --approval-id {} once granted.", approval_id);
                Ok(())
            }
            RunOutcome::NoConnection => bail!("no connection selected"),
            RunOutcome::Rejected { message } => bail!("query rejected: {message}"),
        }
    }
}

fn print_result(result: &ResultSet) {
    if result.columns.is_empty() {
        println!(
            "{} row(s) affected in {}ms",
            result.affected_rows, result.duration_ms
        );
        return;
    }

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.label.len()).collect();
    let mut rendered: Vec<Vec<String>> = Vec::with_capacity(result.rows.len());
    for row in &result.rows {
        let mut cells = Vec::with_capacity(result.columns.len());
        for (index, column) in result.columns.iter().enumerate() {
            let cell = match row.get(&column.key) {
                None | Some(serde_json::Value::Null) => String::new(),
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(value) => value.to_string(),
            };
            widths[index] = widths[index].max(cell.len());
            cells.push(cell);
        }
        rendered.push(cells);
    }

    let header: Vec<String> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:<width$}", c.label, width = widths[i]))
        .collect();
    println!("{}", header.join(" | "));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for cells in rendered {
        let line: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        println!("{}", line.join(" | "));
    }
    println!(
        "{} row(s) in {}ms",
        result.affected_rows, result.duration_ms
    );
}
