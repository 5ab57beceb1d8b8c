//! Data source abstraction
//!
//! The transformer does not fetch anything itself: rows come from a
//! collaborator that executes a `DataQuery` against some backend. `RowSource`
//! is that capability, passed explicitly to callers — never a process-wide
//! singleton. `MemorySource` is the in-process implementation used by tests
//! and demos; it serves registered row sets verbatim and performs no
//! aggregation (a real query engine is somebody else's job).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

use crate::spec::{ChartSpec, DataQuery};
use crate::transform::{transform_rows, Row, TransformedData};
use crate::{ChartError, Result};

/// Execution metadata returned alongside rows
///
/// Informational only; the transformer does not consume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMeta {
    pub row_count: usize,
    pub duration_ms: u64,
    pub columns: Vec<String>,
}

/// Result of executing a query against a row source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub meta: QueryMeta,
}

/// Capability to execute a `DataQuery` and return flat rows
pub trait RowSource {
    /// Execute a query and return its rows with execution metadata
    ///
    /// # Errors
    ///
    /// Returns `ChartError::SourceError` if the source is unknown or the
    /// backend fails.
    fn fetch(&self, query: &DataQuery) -> Result<QueryResult>;

    /// Register a named row set as a queryable source (takes ownership)
    ///
    /// Returns an error by default; override for sources that support it.
    fn register(&mut self, name: &str, _rows: Vec<Row>) -> Result<()> {
        Err(ChartError::SourceError(format!(
            "This source does not support row registration for '{}'",
            name
        )))
    }

    /// Whether [`register`](RowSource::register) is implemented
    fn supports_register(&self) -> bool {
        false
    }
}

/// In-memory row source backed by registered tables
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: HashMap<String, Vec<Row>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration for test setup
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }
}

impl RowSource for MemorySource {
    fn fetch(&self, query: &DataQuery) -> Result<QueryResult> {
        let started = Instant::now();
        let mut rows = self
            .tables
            .get(&query.source)
            .cloned()
            .ok_or_else(|| {
                ChartError::SourceError(format!("Unknown source '{}'", query.source))
            })?;

        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }

        let columns = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        let meta = QueryMeta {
            row_count: rows.len(),
            duration_ms: started.elapsed().as_millis() as u64,
            columns,
        };
        debug!(
            source = %query.source,
            rows = meta.row_count,
            duration_ms = meta.duration_ms,
            "fetched rows from memory source"
        );

        Ok(QueryResult { rows, meta })
    }

    fn register(&mut self, name: &str, rows: Vec<Row>) -> Result<()> {
        debug!(table = %name, rows = rows.len(), "registered row set");
        self.tables.insert(name.to_string(), rows);
        Ok(())
    }

    fn supports_register(&self) -> bool {
        true
    }
}

impl ChartSpec {
    /// Fetch this spec's query from a source and reshape the rows for rendering
    ///
    /// The fetch-then-transform composition behind every chart preview.
    pub fn preview(&self, source: &dyn RowSource) -> Result<TransformedData> {
        let result = source.fetch(&self.query)?;
        Ok(transform_rows(self, result.rows))
    }
}
