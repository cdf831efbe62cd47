//! Submission gate: the initial execution request and its classification.
//!
//! Submitting a statement is a single request/response exchange. The backend
//! answers with one of four outcomes: the execution is granted and a session
//! id is issued, the statement is parked pending manual approval, no usable
//! connection was addressed, or the statement was rejected outright (policy
//! violation, permission, guard rule). All four are values the caller must
//! branch on; only a broken exchange is an error.

use crate::error::{QueryError, Result};
use serde::{Deserialize, Serialize};

/// A statement submitted for execution against one data-store connection.
///
/// Immutable once sent. Resubmission after an approval is a fresh submission
/// carrying the approval token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySubmission {
    /// Target connection id, as known to the caller
    #[serde(skip)]
    pub connection_id: String,
    /// Raw statement text; parsing and validation are backend concerns
    pub statement: String,
    /// Approval token from a previously granted approval workflow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_id: Option<String>,
    /// Row cap requested by the caller; the backend may clamp it further
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<u32>,
    /// Execution deadline in milliseconds, forwarded to the backend and
    /// enforced client-side against the result stream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl QuerySubmission {
    pub fn new(connection_id: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
            statement: statement.into(),
            approval_id: None,
            max_rows: None,
            timeout_ms: None,
        }
    }

    pub fn with_approval_id(mut self, approval_id: impl Into<String>) -> Self {
        self.approval_id = Some(approval_id.into());
        self
    }

    pub fn with_max_rows(mut self, max_rows: u32) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// Classified result of the submission exchange. Exactly one status holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Execution granted; the session id addresses the result channel
    Ready { session_id: String },
    /// Execution deferred; the approval id correlates with the external
    /// approval workflow
    PendingApproval { approval_id: String },
    /// No data-store connection was addressed
    NoConnection,
    /// Backend-reported rejection (policy violation, permission, guard rule)
    Rejected { message: String },
}

/// Wire shape of the backend's answer to a submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub status: String,
    #[serde(default)]
    pub query_id: Option<String>,
    #[serde(default)]
    pub approval_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StartResponse {
    /// Classify the response body into a [`StartOutcome`].
    ///
    /// A `ready` answer without a session id is not a business outcome, it is
    /// a malformed response; an unknown status tag likewise.
    pub fn into_outcome(self) -> Result<StartOutcome> {
        match self.status.as_str() {
            "ready" => match self.query_id {
                Some(session_id) if !session_id.is_empty() => {
                    Ok(StartOutcome::Ready { session_id })
                }
                _ => Err(QueryError::MalformedResponse(
                    "ready status without a query id".to_string(),
                )),
            },
            "pending_approval" => Ok(StartOutcome::PendingApproval {
                approval_id: self.approval_id.unwrap_or_default(),
            }),
            "no_connection" => Ok(StartOutcome::NoConnection),
            "error" => Ok(StartOutcome::Rejected {
                message: self
                    .message
                    .unwrap_or_else(|| "query rejected by backend".to_string()),
            }),
            other => Err(QueryError::MalformedResponse(format!(
                "unknown submission status: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> StartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_submission_builder() {
        let submission = QuerySubmission::new("conn-1", "SELECT 1")
            .with_approval_id("appr-9")
            .with_max_rows(500)
            .with_timeout_ms(10_000);

        assert_eq!(submission.connection_id, "conn-1");
        assert_eq!(submission.statement, "SELECT 1");
        assert_eq!(submission.approval_id, Some("appr-9".to_string()));
        assert_eq!(submission.max_rows, Some(500));
        assert_eq!(submission.timeout_ms, Some(10_000));
    }

    #[test]
    fn test_submission_body_skips_unset_options() {
        let body = serde_json::to_value(QuerySubmission::new("conn-1", "SELECT 1")).unwrap();
        assert_eq!(body, serde_json::json!({ "statement": "SELECT 1" }));
    }

    #[test]
    fn test_ready_classification() {
        let outcome = response(r#"{"status":"ready","queryId":"q-42"}"#)
            .into_outcome()
            .unwrap();
        assert_eq!(
            outcome,
            StartOutcome::Ready {
                session_id: "q-42".to_string()
            }
        );
    }

    #[test]
    fn test_pending_approval_classification() {
        let outcome = response(r#"{"status":"pending_approval","approvalId":"abc"}"#)
            .into_outcome()
            .unwrap();
        assert_eq!(
            outcome,
            StartOutcome::PendingApproval {
                approval_id: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_no_connection_classification() {
        let outcome = response(r#"{"status":"no_connection"}"#).into_outcome().unwrap();
        assert_eq!(outcome, StartOutcome::NoConnection);
    }

    #[test]
    fn test_error_status_is_a_value_not_a_fault() {
        let outcome = response(r#"{"status":"error","message":"read only"}"#)
            .into_outcome()
            .unwrap();
        assert_eq!(
            outcome,
            StartOutcome::Rejected {
                message: "read only".to_string()
            }
        );
    }

    #[test]
    fn test_ready_without_query_id_is_malformed() {
        let err = response(r#"{"status":"ready"}"#).into_outcome().unwrap_err();
        assert!(matches!(err, QueryError::MalformedResponse(_)));
    }

    #[test]
    fn test_unknown_status_is_malformed() {
        let err = response(r#"{"status":"maybe"}"#).into_outcome().unwrap_err();
        assert!(matches!(err, QueryError::MalformedResponse(_)));
    }
}
