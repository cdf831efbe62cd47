//! Typed wrappers for the request/response API around the query protocol:
//! the approval workflow that resolves deferred executions, and the query
//! history listing.

use crate::client::WorkspaceClient;
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// A deferred execution awaiting a manual decision.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: String,
    pub connection_id: String,
    pub user_id: String,
    pub statement: String,
    pub status: String,
    pub environment: String,
    pub created_at: DateTime<Utc>,
}

/// One recorded execution, granted or not.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub connection_id: Option<String>,
    pub statement_hash: String,
    pub status: String,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DecisionResponse {
    status: String,
}

impl WorkspaceClient {
    /// List approvals still awaiting a decision.
    pub async fn list_pending_approvals(&self) -> Result<Vec<Approval>, ApiError> {
        self.get_json("api/v1/approvals/pending").await
    }

    /// Grant one approval; the submitter re-runs with the approval token.
    pub async fn approve(&self, approval_id: &str) -> Result<String, ApiError> {
        self.post_decision(approval_id, "approve").await
    }

    /// Refuse one approval.
    pub async fn deny(&self, approval_id: &str) -> Result<String, ApiError> {
        self.post_decision(approval_id, "deny").await
    }

    /// List recorded executions, most recent first.
    pub async fn list_history(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<HistoryEntry>, ApiError> {
        self.get_json(&format!("api/v1/history?limit={}&offset={}", limit, offset))
            .await
    }

    async fn post_decision(&self, approval_id: &str, decision: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&format!("api/v1/approvals/{}/{}", approval_id, decision));
        debug!("Posting approval decision to {}", url);
        let response = self.authorize(self.http.post(url)).send().await?;
        let response = check_status(response).await?;
        let decision: DecisionResponse = response.json().await?;
        Ok(decision.status)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.authorize(self.http.get(self.endpoint(path))).send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default().trim().to_string();
    Err(ApiError::Backend {
        status: status.as_u16(),
        message: if message.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            message
        },
    })
}
