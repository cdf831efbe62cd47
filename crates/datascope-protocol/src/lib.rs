//! # datascope-protocol
//!
//! Transport-independent core of the Datascope query-execution protocol
//! client: submit a statement through a mediating backend, and when
//! execution is granted, fold the incremental result stream into one
//! settled answer.
//!
//! ## Architecture
//!
//! - **Submission gate** ([`submit`]): one request/response exchange,
//!   classified into a closed set of [`StartOutcome`]s — granted, pending
//!   approval, no connection, rejected. Business states are values, never
//!   errors.
//! - **Stream decoder** ([`events`]): turns inbound channel frames into
//!   typed [`StreamEvent`]s, ignoring unrecognized discriminants and
//!   synthesizing a terminal error on disconnect.
//! - **Result aggregator** ([`aggregate`]): event-sourced fold that
//!   normalizes positional and associative rows against the observed
//!   column order and settles exactly once.
//! - **Run orchestrator** ([`run`]): composes the above over an abstract
//!   [`QueryGateway`] into a single `run` operation with a four-way
//!   [`RunOutcome`].
//!
//! Concrete transports implement [`QueryGateway`] and [`ResultChannel`];
//! see the `datascope-client` crate for the HTTP/WebSocket implementation.
//!
//! ## Example
//!
//! ```rust
//! use datascope_protocol::{QuerySubmission, RunOutcome};
//!
//! # async fn example() -> datascope_protocol::Result<()> {
//! let submission = QuerySubmission::new("conn-1", "SELECT id, name FROM users")
//!     .with_max_rows(1000);
//!
//! // Requires a gateway implementation, e.g. from datascope-client:
//! // let runner = QueryRunner::new(gateway);
//! // match runner.run(submission).await? {
//! //     RunOutcome::Completed { result } => println!("{} rows", result.rows.len()),
//! //     RunOutcome::PendingApproval { approval_id } => println!("pending {approval_id}"),
//! //     RunOutcome::NoConnection => println!("select a connection first"),
//! //     RunOutcome::Rejected { message } => println!("rejected: {message}"),
//! // }
//! # let _ = submission;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod error;
pub mod events;
pub mod gateway;
pub mod run;
pub mod submit;

// Re-export commonly used items
pub use aggregate::{Aggregator, ColumnDescriptor, ResultSet, Settlement};
pub use error::{QueryError, Result};
pub use events::{decode_frame, EventStream, RowData, RowMap, StreamEvent};
pub use gateway::{QueryGateway, ResultChannel};
pub use run::{QueryRunner, RunOutcome};
pub use submit::{QuerySubmission, StartOutcome, StartResponse};
