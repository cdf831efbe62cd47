//! Result aggregator: fold a finite event sequence into one settled result.
//!
//! The aggregator is a pure state machine over [`StreamEvent`]s, which keeps
//! it testable with literal event sequences and independent of any real
//! transport. It maintains the most recently observed column order, zips
//! positional rows against it, adopts associative rows as-is, and settles
//! exactly once on the terminal event.

use crate::events::{RowData, RowMap, StreamEvent};
use serde::Serialize;
use tracing::warn;

/// One column of the aggregated result: stable key plus display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub key: String,
    pub label: String,
}

impl ColumnDescriptor {
    fn from_name(name: &str) -> Self {
        Self {
            key: name.to_string(),
            label: name.to_string(),
        }
    }
}

/// Complete aggregated result of one streamed execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    /// Ordered column descriptors
    pub columns: Vec<ColumnDescriptor>,
    /// All rows in arrival order, normalized to associative maps
    pub rows: Vec<RowMap>,
    /// Execution duration reported by the terminal event, in milliseconds
    pub duration_ms: u64,
    /// Terminal event's row count when positive, else the rows observed
    pub affected_rows: u64,
}

/// What one applied event did to the aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// More events expected
    Pending,
    /// Terminal success; the stream must not be read further
    Completed(ResultSet),
    /// Terminal failure with the carried reason
    Failed(String),
}

/// Event-sourced accumulator for one result stream.
///
/// Owned by a single `run` invocation; never shared or reused across
/// streams. Column metadata is discarded with the accumulator.
#[derive(Debug, Default)]
pub struct Aggregator {
    columns: Vec<String>,
    rows: Vec<RowMap>,
    observed: u64,
    settled: bool,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the next event in arrival order.
    ///
    /// The protocol forbids events after the terminal one; a duplicate
    /// terminal is a programming defect upstream, asserted in debug builds
    /// and ignored otherwise so the first settlement stands.
    pub fn apply(&mut self, event: StreamEvent) -> Settlement {
        if self.settled {
            debug_assert!(
                !event.is_terminal(),
                "terminal event applied after settlement"
            );
            warn!("Ignoring stream event applied after settlement");
            return Settlement::Pending;
        }

        match event {
            StreamEvent::Schema(columns) => {
                self.columns = columns;
                Settlement::Pending
            }
            StreamEvent::RowBatch(rows) => {
                for row in rows {
                    self.push_row(row);
                }
                Settlement::Pending
            }
            StreamEvent::End {
                row_count,
                duration_ms,
            } => {
                self.settled = true;
                let affected_rows = if row_count > 0 {
                    row_count
                } else {
                    self.observed
                };
                Settlement::Completed(ResultSet {
                    columns: self
                        .columns
                        .iter()
                        .map(|name| ColumnDescriptor::from_name(name))
                        .collect(),
                    rows: std::mem::take(&mut self.rows),
                    duration_ms,
                    affected_rows,
                })
            }
            StreamEvent::Error { message } => {
                self.settled = true;
                Settlement::Failed(message)
            }
        }
    }

    fn push_row(&mut self, row: RowData) {
        self.observed += 1;
        match row {
            RowData::Tuple(values) => {
                // Zip by index against the current column order: extra
                // values are dropped, missing columns stay absent.
                let mut mapped = RowMap::new();
                for (index, name) in self.columns.iter().enumerate() {
                    if let Some(value) = values.get(index) {
                        mapped.insert(name.clone(), value.clone());
                    }
                }
                self.rows.push(mapped);
            }
            RowData::Document(document) => {
                if self.columns.is_empty() {
                    // No schema observed yet: the first document's own key
                    // order seeds the column order for everything after it.
                    self.columns = document.keys().cloned().collect();
                }
                self.rows.push(document);
            }
            RowData::Other(value) => {
                warn!("Skipping non-row value in row batch: {}", value);
            }
        }
    }
}
