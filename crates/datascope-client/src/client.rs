//! HTTP/WebSocket implementation of the query gateway.
//!
//! Submissions travel over a one-shot HTTP POST; a granted execution is
//! streamed back over a WebSocket addressed by the connection and session
//! identifiers. The session token, when configured, rides along as a
//! bearer header on both.

use crate::config::ClientConfig;
use async_trait::async_trait;
use datascope_protocol::{
    QueryError, QueryGateway, QueryRunner, QuerySubmission, Result, ResultChannel, RunOutcome,
    StartOutcome, StartResponse,
};
use futures_util::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Client for the workspace backend: the query gateway plus the simple
/// request/response calls around it (see [`crate::api`]).
pub struct WorkspaceClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: ClientConfig,
}

impl WorkspaceClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let url = Url::parse(&config.base_url)
            .map_err(|e| QueryError::InvalidConfiguration(format!("invalid base URL: {}", e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(QueryError::InvalidConfiguration(format!(
                "unsupported base URL scheme: {}",
                url.scheme()
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| QueryError::InvalidConfiguration(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Convenience for the common UI call: submit one statement and collect
    /// the streamed result into a single outcome.
    pub async fn run_query(
        self: Arc<Self>,
        connection_id: impl Into<String>,
        statement: impl Into<String>,
    ) -> Result<RunOutcome> {
        QueryRunner::new(self)
            .run_statement(connection_id, statement)
            .await
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn stream_locator(&self, connection_id: &str, session_id: &str) -> String {
        format!(
            "{}/api/v1/connections/{}/query/{}/stream",
            websocket_base(self.config.base_url.trim_end_matches('/')),
            connection_id,
            session_id
        )
    }

    pub(crate) fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl QueryGateway for WorkspaceClient {
    async fn submit(&self, submission: &QuerySubmission) -> Result<StartOutcome> {
        let url = self.endpoint(&format!(
            "api/v1/connections/{}/query",
            submission.connection_id
        ));
        debug!("Submitting statement to {}", url);

        let response = self
            .authorize(self.http.post(url))
            .json(submission)
            .send()
            .await
            .map_err(|e| QueryError::SubmissionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Backend-reported rejections arrive as HTTP errors with a
            // human-readable body; they are outcomes, not faults.
            let body = response
                .text()
                .await
                .map_err(|e| QueryError::SubmissionFailed(e.to_string()))?;
            let message = rejection_message(status, &body);
            debug!("Submission rejected with status {}: {}", status, message);
            return Ok(StartOutcome::Rejected { message });
        }

        let response: StartResponse = response
            .json()
            .await
            .map_err(|e| QueryError::MalformedResponse(e.to_string()))?;
        response.into_outcome()
    }

    async fn open_stream(
        &self,
        connection_id: &str,
        session_id: &str,
    ) -> Result<Box<dyn ResultChannel>> {
        let locator = self.stream_locator(connection_id, session_id);
        debug!("Opening result channel at {}", locator);

        let mut request = locator
            .as_str()
            .into_client_request()
            .map_err(|e| QueryError::ChannelFailed(e.to_string()))?;
        if let Some(token) = &self.config.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| QueryError::ChannelFailed(e.to_string()))?;
            request.headers_mut().insert("Authorization", value);
        }

        let (socket, _) = connect_async(request)
            .await
            .map_err(|e| QueryError::ChannelFailed(e.to_string()))?;

        Ok(Box::new(WsChannel { socket }))
    }
}

/// WebSocket-backed result channel.
struct WsChannel {
    socket: WsStream,
}

#[async_trait]
impl ResultChannel for WsChannel {
    async fn recv(&mut self) -> Result<Option<String>> {
        loop {
            match self.socket.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                // Control and binary frames carry no protocol events
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(QueryError::ChannelFailed(e.to_string())),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.socket.close(None).await {
            // Closing an already-dead socket is fine
            debug!("Result channel close: {}", e);
        } else {
            debug!("Result channel closed");
        }
    }
}

/// Derive the WebSocket base from the HTTP base by scheme swap.
fn websocket_base(base: &str) -> String {
    if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extract a displayable rejection reason from an HTTP error body: a
/// `{message}` JSON object, else the raw body text, else the status line.
fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    warn!("Rejection response with empty body, status {}", status);
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
