//! # datascope-client
//!
//! HTTP/WebSocket transport for the Datascope query protocol, plus typed
//! wrappers for the approval and history endpoints.
//!
//! Submissions go over a one-shot `POST`; granted executions stream their
//! results back over a WebSocket derived from the same base URL. The
//! protocol state machine itself lives in `datascope-protocol`; this crate
//! only supplies the wire.
//!
//! ## Example
//!
//! ```rust,no_run
//! use datascope_client::{ClientConfig, WorkspaceClient};
//! use datascope_protocol::RunOutcome;
//! use std::sync::Arc;
//!
//! # async fn example() -> datascope_protocol::Result<()> {
//! let config = ClientConfig::new("http://localhost:8080").with_auth_token("token");
//! let client = Arc::new(WorkspaceClient::new(config)?);
//!
//! match client.run_query("conn-1", "SELECT id, name FROM users").await? {
//!     RunOutcome::Completed { result } => println!("{} rows", result.rows.len()),
//!     RunOutcome::PendingApproval { approval_id } => println!("pending {approval_id}"),
//!     RunOutcome::NoConnection => println!("select a connection first"),
//!     RunOutcome::Rejected { message } => println!("rejected: {message}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;

// Re-export commonly used items
pub use api::{Approval, HistoryEntry};
pub use client::WorkspaceClient;
pub use config::ClientConfig;
pub use error::ApiError;
