//! Stream decoder: inbound channel frames to typed protocol events.
//!
//! A result stream is a finite sequence of frames: a schema at most once,
//! row batches zero or more times, then exactly one terminal (`end` or
//! `error`). Frames with an unrecognized discriminant are ignored for
//! forward compatibility (the backend also sends a `start` envelope the
//! client has no use for), and malformed payloads are logged and skipped
//! rather than treated as protocol errors.

use crate::gateway::ResultChannel;
use serde::Deserialize;
use tracing::{debug, warn};

/// A row as transported on the channel: positional values or an associative
/// document. Anything else is counted but never accumulated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RowData {
    Tuple(Vec<serde_json::Value>),
    Document(RowMap),
    Other(serde_json::Value),
}

/// An associative row keyed by column name. Key order is arrival order.
pub type RowMap = serde_json::Map<String, serde_json::Value>;

/// Typed protocol event decoded from one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Ordered column names; replaces any previously observed order
    Schema(Vec<String>),
    /// Zero or more rows, in arrival order
    RowBatch(Vec<RowData>),
    /// Terminal success
    End { row_count: u64, duration_ms: u64 },
    /// Terminal failure
    Error { message: String },
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::End { .. } | StreamEvent::Error { .. })
    }
}

#[derive(Debug, Deserialize)]
struct SchemaFrame {
    #[serde(default)]
    columns: Option<Vec<ColumnMeta>>,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ColumnMeta {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RowsFrame {
    #[serde(default)]
    rows: Vec<RowData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndFrame {
    #[serde(default)]
    row_count: u64,
    #[serde(default)]
    duration_ms: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorFrame {
    #[serde(default)]
    message: String,
}

/// Decode one raw frame into a protocol event.
///
/// Returns `None` for frames the consumer must skip: unrecognized
/// discriminants and payloads that do not parse.
pub fn decode_frame(frame: &str) -> Option<StreamEvent> {
    let value: serde_json::Value = match serde_json::from_str(frame) {
        Ok(value) => value,
        Err(e) => {
            warn!("Ignoring malformed stream frame: {}", e);
            return None;
        }
    };

    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or("")
        .to_string();
    match kind.as_str() {
        "schema" => match serde_json::from_value::<SchemaFrame>(value) {
            Ok(frame) => {
                // Column descriptors win over bare field names when both are
                // present; either form normalizes to the same ordered list.
                if let Some(columns) = frame.columns {
                    Some(StreamEvent::Schema(
                        columns.into_iter().map(|c| c.name).collect(),
                    ))
                } else if let Some(fields) = frame.fields {
                    Some(StreamEvent::Schema(fields))
                } else {
                    debug!("Ignoring schema frame without columns or fields");
                    None
                }
            }
            Err(e) => {
                warn!("Ignoring malformed schema frame: {}", e);
                None
            }
        },
        "rows" => match serde_json::from_value::<RowsFrame>(value) {
            Ok(frame) => Some(StreamEvent::RowBatch(frame.rows)),
            Err(e) => {
                warn!("Ignoring malformed rows frame: {}", e);
                None
            }
        },
        "end" => match serde_json::from_value::<EndFrame>(value) {
            Ok(frame) => Some(StreamEvent::End {
                row_count: frame.row_count,
                duration_ms: frame.duration_ms,
            }),
            Err(e) => {
                warn!("Ignoring malformed end frame: {}", e);
                None
            }
        },
        "error" => match serde_json::from_value::<ErrorFrame>(value) {
            Ok(frame) => {
                let message = if frame.message.is_empty() {
                    "error".to_string()
                } else {
                    frame.message
                };
                Some(StreamEvent::Error { message })
            }
            Err(e) => {
                warn!("Ignoring malformed error frame: {}", e);
                None
            }
        },
        other => {
            debug!("Ignoring stream frame with unrecognized type: {:?}", other);
            None
        }
    }
}

/// Lazy event sequence over one result channel.
///
/// Always eventually terminal: a transport disconnect before `end` or
/// `error` is surfaced as a synthesized `Error` event so consumers never
/// wait for a terminal that cannot arrive. After the terminal event the
/// stream yields nothing further.
pub struct EventStream {
    channel: Box<dyn ResultChannel>,
    finished: bool,
}

impl EventStream {
    pub fn new(channel: Box<dyn ResultChannel>) -> Self {
        Self {
            channel,
            finished: false,
        }
    }

    /// Next decoded event, or `None` once the terminal event has been
    /// delivered. Skipped frames are consumed transparently.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        while !self.finished {
            match self.channel.recv().await {
                Ok(Some(frame)) => {
                    if let Some(event) = decode_frame(&frame) {
                        if event.is_terminal() {
                            self.finished = true;
                        }
                        return Some(event);
                    }
                }
                Ok(None) => {
                    self.finished = true;
                    return Some(StreamEvent::Error {
                        message: "result channel closed before query completed".to_string(),
                    });
                }
                Err(e) => {
                    self.finished = true;
                    return Some(StreamEvent::Error {
                        message: e.to_string(),
                    });
                }
            }
        }
        None
    }

    /// Close the underlying channel. Safe after a disconnect.
    pub async fn close(&mut self) {
        self.channel.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_descriptors_and_bare_fields_normalize_identically() {
        let from_descriptors = decode_frame(
            r#"{"type":"schema","columns":[{"name":"id","type":"int8"},{"name":"name","type":"text"}]}"#,
        )
        .unwrap();
        let from_fields = decode_frame(r#"{"type":"schema","fields":["id","name"]}"#).unwrap();

        assert_eq!(from_descriptors, from_fields);
        assert_eq!(
            from_descriptors,
            StreamEvent::Schema(vec!["id".to_string(), "name".to_string()])
        );
    }

    #[test]
    fn test_schema_without_columns_or_fields_is_skipped() {
        assert_eq!(decode_frame(r#"{"type":"schema"}"#), None);
    }

    #[test]
    fn test_rows_decode_positional_and_associative() {
        let event = decode_frame(r#"{"type":"rows","rows":[[1,"a"],{"id":2,"name":"b"},7]}"#)
            .unwrap();
        let StreamEvent::RowBatch(rows) = event else {
            panic!("expected row batch");
        };
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[0], RowData::Tuple(_)));
        assert!(matches!(rows[1], RowData::Document(_)));
        assert!(matches!(rows[2], RowData::Other(_)));
    }

    #[test]
    fn test_rows_frame_without_rows_is_empty_batch() {
        assert_eq!(
            decode_frame(r#"{"type":"rows"}"#),
            Some(StreamEvent::RowBatch(Vec::new()))
        );
    }

    #[test]
    fn test_end_frame_with_defaults() {
        assert_eq!(
            decode_frame(r#"{"type":"end"}"#),
            Some(StreamEvent::End {
                row_count: 0,
                duration_ms: 0
            })
        );
        assert_eq!(
            decode_frame(r#"{"type":"end","rowCount":5,"durationMs":12}"#),
            Some(StreamEvent::End {
                row_count: 5,
                duration_ms: 12
            })
        );
    }

    #[test]
    fn test_error_frame_defaults_message() {
        assert_eq!(
            decode_frame(r#"{"type":"error"}"#),
            Some(StreamEvent::Error {
                message: "error".to_string()
            })
        );
    }

    #[test]
    fn test_unrecognized_discriminants_are_ignored() {
        assert_eq!(
            decode_frame(r#"{"type":"start","queryId":"q-1","startedAt":"now"}"#),
            None
        );
        assert_eq!(decode_frame(r#"{"type":"progress","pct":50}"#), None);
        assert_eq!(decode_frame(r#"{"noType":true}"#), None);
    }

    #[test]
    fn test_malformed_frames_are_ignored() {
        assert_eq!(decode_frame("not json at all"), None);
        assert_eq!(decode_frame(r#"{"type":"rows","rows":42}"#), None);
        assert_eq!(decode_frame(r#"{"type":"end","rowCount":"many"}"#), None);
    }

    #[test]
    fn test_terminal_detection() {
        assert!(StreamEvent::End {
            row_count: 0,
            duration_ms: 0
        }
        .is_terminal());
        assert!(StreamEvent::Error {
            message: "x".to_string()
        }
        .is_terminal());
        assert!(!StreamEvent::Schema(vec![]).is_terminal());
        assert!(!StreamEvent::RowBatch(vec![]).is_terminal());
    }
}
