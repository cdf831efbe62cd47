//! Run orchestrator: one submission in, one settled outcome out.
//!
//! Composes the submission gate, the stream decoder, and the aggregator
//! into a single asynchronous operation. Only a granted submission ever
//! opens a result channel, and an opened channel is closed exactly once
//! whatever the stream does. Nothing here retries: re-entry after an
//! approval is a fresh `run` carrying the approval token.

use crate::aggregate::{Aggregator, ResultSet, Settlement};
use crate::error::Result;
use crate::events::EventStream;
use crate::gateway::QueryGateway;
use crate::submit::{QuerySubmission, StartOutcome};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

/// Caller-visible outcome of one `run` invocation.
///
/// Submission-time backend rejection and stream-time failure both settle as
/// [`RunOutcome::Rejected`]; transport faults are surfaced separately as
/// errors and never folded into the outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The stream completed; the full aggregated result is attached
    #[serde(rename = "ok")]
    Completed { result: ResultSet },
    /// Execution deferred to the external approval workflow
    PendingApproval {
        #[serde(rename = "approvalId")]
        approval_id: String,
    },
    /// No data-store connection was addressed
    NoConnection,
    /// The execution was refused, failed mid-stream, or timed out
    Rejected { message: String },
}

/// Public entry point for executing statements through a gateway.
pub struct QueryRunner {
    gateway: Arc<dyn QueryGateway>,
}

impl QueryRunner {
    pub fn new(gateway: Arc<dyn QueryGateway>) -> Self {
        Self { gateway }
    }

    /// Run a bare statement against one connection.
    pub async fn run_statement(
        &self,
        connection_id: impl Into<String>,
        statement: impl Into<String>,
    ) -> Result<RunOutcome> {
        self.run(QuerySubmission::new(connection_id, statement)).await
    }

    /// Submit, and when granted, stream and aggregate to one settled
    /// outcome. Each invocation owns its session, channel, and accumulator;
    /// nothing is shared across in-flight runs.
    pub async fn run(&self, submission: QuerySubmission) -> Result<RunOutcome> {
        if submission.connection_id.trim().is_empty() {
            return Ok(RunOutcome::NoConnection);
        }

        debug!(
            "Submitting statement to connection {}",
            submission.connection_id
        );
        let session_id = match self.gateway.submit(&submission).await? {
            StartOutcome::Ready { session_id } => session_id,
            StartOutcome::PendingApproval { approval_id } => {
                debug!("Execution deferred pending approval {}", approval_id);
                return Ok(RunOutcome::PendingApproval { approval_id });
            }
            StartOutcome::NoConnection => return Ok(RunOutcome::NoConnection),
            StartOutcome::Rejected { message } => {
                debug!("Submission rejected: {}", message);
                return Ok(RunOutcome::Rejected { message });
            }
        };

        debug!("Execution granted, opening result stream for session {}", session_id);
        let channel = self
            .gateway
            .open_stream(&submission.connection_id, &session_id)
            .await?;
        let events = EventStream::new(channel);

        Ok(drain_stream(events, submission.timeout_ms).await)
    }
}

/// Fold the event stream into the final outcome, closing the channel on
/// every exit path: completion, stream failure, and deadline expiry.
async fn drain_stream(mut events: EventStream, timeout_ms: Option<u64>) -> RunOutcome {
    let deadline = timeout_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
    let mut aggregator = Aggregator::new();

    loop {
        let next = match deadline {
            Some(deadline) => match timeout_at(deadline, events.next_event()).await {
                Ok(next) => next,
                Err(_) => {
                    events.close().await;
                    let ms = timeout_ms.unwrap_or_default();
                    return RunOutcome::Rejected {
                        message: format!("query cancelled after {}ms timeout", ms),
                    };
                }
            },
            None => events.next_event().await,
        };

        // The decoder always synthesizes a terminal on disconnect, so an
        // exhausted stream here means a settlement was already produced.
        let Some(event) = next else {
            events.close().await;
            return RunOutcome::Rejected {
                message: "result stream ended unexpectedly".to_string(),
            };
        };

        match aggregator.apply(event) {
            Settlement::Pending => {}
            Settlement::Completed(result) => {
                events.close().await;
                return RunOutcome::Completed { result };
            }
            Settlement::Failed(message) => {
                events.close().await;
                return RunOutcome::Rejected { message };
            }
        }
    }
}

impl RunOutcome {
    /// The completed result set, if this outcome carries one.
    pub fn result(&self) -> Option<&ResultSet> {
        match self {
            RunOutcome::Completed { result } => Some(result),
            _ => None,
        }
    }
}
