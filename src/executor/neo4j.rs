//! Neo4j executor over Bolt
//!
//! Every call opens its own [`Session`] on a fresh `neo4rs` graph handle,
//! runs a single auto-committed statement against the configured database
//! and releases the session before returning, whether the query succeeded
//! or not.

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::GraphConfig;
use crate::executor::columns::{order_columns, projected_columns};
use crate::executor::session::{Connection, Connector, Session, SessionStats};
use crate::executor::{GraphError, GraphExecutor, GraphResult, Record, ResultSet};
use crate::nlq::CypherQuery;

/// Connects with the `neo4rs` Bolt driver
pub struct BoltConnector;

#[async_trait]
impl Connector for BoltConnector {
    async fn connect(&self, config: &GraphConfig) -> GraphResult<Box<dyn Connection>> {
        let bolt_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.username.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .max_connections(1)
            .build()
            .map_err(driver_error)?;

        let graph = Graph::connect(bolt_config).await.map_err(driver_error)?;
        Ok(Box::new(BoltConnection { graph }))
    }
}

/// A single-connection graph handle. Dropping it closes the socket.
struct BoltConnection {
    graph: Graph,
}

#[async_trait]
impl Connection for BoltConnection {
    async fn run(&mut self, cypher: &str) -> GraphResult<ResultSet> {
        let mut stream = self.graph.execute(query(cypher)).await.map_err(driver_error)?;

        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.map_err(driver_error)? {
            let fields: HashMap<String, serde_json::Value> = row
                .to()
                .map_err(|e| GraphError::Protocol(format!("cannot decode row: {}", e)))?;
            rows.push(fields);
        }

        Ok(result_set_from_rows(rows, &projected_columns(cypher)))
    }
}

/// Arrange keyed rows into a [`ResultSet`]. Columns follow the query's
/// projection; with no rows the projection alone names them.
fn result_set_from_rows(rows: Vec<HashMap<String, serde_json::Value>>, projection: &[String]) -> ResultSet {
    let columns = match rows.first() {
        Some(first) => order_columns(first.keys().cloned().collect(), projection),
        None => projection.to_vec(),
    };

    let records = rows
        .into_iter()
        .map(|mut fields| {
            columns
                .iter()
                .map(|col| (col.clone(), fields.remove(col).unwrap_or(serde_json::Value::Null)))
                .collect::<Record>()
        })
        .collect();

    ResultSet { columns, records }
}

fn driver_error(err: neo4rs::Error) -> GraphError {
    match err {
        neo4rs::Error::Neo4j(e) => server_error(e.code(), e.message()),
        neo4rs::Error::AuthenticationError(message) => GraphError::Unauthorized(message),
        other => GraphError::Connection(other.to_string()),
    }
}

/// Classify a failure reported by the server by its status code.
fn server_error(code: &str, message: &str) -> GraphError {
    if code.starts_with("Neo.ClientError.Security.") {
        GraphError::Unauthorized(message.to_string())
    } else {
        GraphError::Query {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

/// Executor bound to one Neo4j database
pub struct Neo4jExecutor {
    config: GraphConfig,
    connector: Arc<dyn Connector>,
    sessions: Arc<SessionStats>,
}

impl Neo4jExecutor {
    pub fn new(config: GraphConfig) -> Self {
        Self::with_connector(config, Arc::new(BoltConnector))
    }

    pub fn with_connector(config: GraphConfig, connector: Arc<dyn Connector>) -> Self {
        info!(
            instance = %config.instance_name,
            uri = %config.uri,
            database = %config.database,
            "Configured Neo4j executor"
        );
        Self {
            config,
            connector,
            sessions: Arc::new(SessionStats::default()),
        }
    }

    /// Session open/release counters for this executor
    pub fn sessions(&self) -> &SessionStats {
        &self.sessions
    }
}

#[async_trait]
impl GraphExecutor for Neo4jExecutor {
    async fn execute(&self, query: &CypherQuery) -> GraphResult<ResultSet> {
        let mut session =
            Session::open(self.connector.as_ref(), &self.config, self.sessions.clone()).await?;
        let result = session.run(query.as_str()).await;
        drop(session);

        if let Ok(result_set) = &result {
            debug!(rows = result_set.len(), "Query returned");
        }
        result
    }
}
