//! Transport seam consumed by the protocol core.
//!
//! The core needs exactly two capabilities from the platform: send one
//! submission and get one classified answer, and open an ordered message
//! channel for a granted session. Everything else (URLs, sockets, auth
//! headers) belongs to the implementing transport crate.

use crate::error::Result;
use crate::submit::{QuerySubmission, StartOutcome};
use async_trait::async_trait;

/// One-shot submission plus result-channel opening, keyed by session id.
#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// Issue the execution request and classify the single synchronous
    /// response. Business-level rejections are `Ok` values; only a broken
    /// exchange is an `Err`.
    async fn submit(&self, submission: &QuerySubmission) -> Result<StartOutcome>;

    /// Open the result channel for a granted session. A session id may be
    /// opened at most once; reopening is a backend error, not a retry hook.
    async fn open_stream(
        &self,
        connection_id: &str,
        session_id: &str,
    ) -> Result<Box<dyn ResultChannel>>;
}

/// An ordered stream of raw frames with an explicit close.
///
/// The consumer closes the channel; the producer only ever stops sending.
#[async_trait]
pub trait ResultChannel: Send {
    /// Receive the next frame. `Ok(None)` means the remote side closed the
    /// channel; `Err` means the transport itself failed mid-stream.
    async fn recv(&mut self) -> Result<Option<String>>;

    /// Close the channel. Must be safe to call on an already-dead channel.
    async fn close(&mut self);
}
