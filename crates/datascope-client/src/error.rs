use thiserror::Error;

/// Errors from the plain request/response API surface (approvals, history).
///
/// The query protocol itself reports faults through
/// [`datascope_protocol::QueryError`]; this type covers only the simple
/// CRUD-style calls around it.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },
}
