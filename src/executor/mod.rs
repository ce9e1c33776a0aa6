//! Cypher execution against the graph database
//!
//! Results are materialized eagerly into a [`ResultSet`]. Failures travel as
//! [`GraphError`], never inside the result shape.

pub mod columns;
pub mod neo4j;
pub mod session;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nlq::CypherQuery;

pub use neo4j::{BoltConnector, Neo4jExecutor};
pub use session::{Connection, Connector, Session, SessionStats};

/// Errors raised while running a query
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// The database could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Credentials rejected
    #[error("Authorization error: {0}")]
    Unauthorized(String),

    /// The database rejected or failed the query
    #[error("{code}: {message}")]
    Query { code: String, message: String },

    /// Unexpected response from the database
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl GraphError {
    /// Single-record `{"error": <description>}` view of this failure, for
    /// consumers that expect the record-shaped error convention.
    pub fn as_sentinel_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("error".to_string(), serde_json::Value::String(self.to_string()));
        record
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

static NULL: serde_json::Value = serde_json::Value::Null;

/// One result row: column name → value, in column order
pub type Record = IndexMap<String, serde_json::Value>;

/// All rows returned by one query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names, in projection order
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl ResultSet {
    /// Build a result set from column names and positional rows.
    /// Missing trailing values become null.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<serde_json::Value>>) -> Self {
        let records = rows
            .into_iter()
            .map(|row| {
                let mut values = row.into_iter();
                columns
                    .iter()
                    .map(|col| (col.clone(), values.next().unwrap_or(serde_json::Value::Null)))
                    .collect()
            })
            .collect();
        Self { columns, records }
    }

    /// Number of result records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the result is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of one column, top to bottom
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a serde_json::Value> + 'a {
        self.records
            .iter()
            .map(move |r| r.get(column).unwrap_or(&NULL))
    }
}

/// Runs Cypher text against a graph database
#[async_trait]
pub trait GraphExecutor: Send + Sync {
    async fn execute(&self, query: &CypherQuery) -> GraphResult<ResultSet>;
}
