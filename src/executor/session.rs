//! Scoped database sessions
//!
//! A [`Session`] is acquired for exactly one query and released when it is
//! dropped. Opens and releases are counted in [`SessionStats`], so a leaked
//! session shows up as `open() > 0` once every call has returned.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::config::GraphConfig;
use crate::executor::{GraphResult, ResultSet};

/// A live connection that can run statements
#[async_trait]
pub trait Connection: Send {
    /// Run one auto-committed statement and materialize every row.
    async fn run(&mut self, cypher: &str) -> GraphResult<ResultSet>;
}

/// Opens connections to the configured database
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &GraphConfig) -> GraphResult<Box<dyn Connection>>;
}

/// Session open/release counters
#[derive(Debug, Default)]
pub struct SessionStats {
    opened: AtomicU64,
    released: AtomicU64,
}

impl SessionStats {
    /// Sessions opened so far
    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }

    /// Sessions released so far
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }

    /// Sessions currently held
    pub fn open(&self) -> u64 {
        self.opened().saturating_sub(self.released())
    }
}

/// One database session, released on drop
pub struct Session {
    connection: Box<dyn Connection>,
    stats: Arc<SessionStats>,
}

impl Session {
    /// Connect and register the session. A failed connect opens nothing.
    pub async fn open(
        connector: &dyn Connector,
        config: &GraphConfig,
        stats: Arc<SessionStats>,
    ) -> GraphResult<Self> {
        let connection = connector.connect(config).await?;
        stats.opened.fetch_add(1, Ordering::SeqCst);
        debug!(database = %config.database, open = stats.open(), "Opened Neo4j session");
        Ok(Self { connection, stats })
    }

    pub async fn run(&mut self, cypher: &str) -> GraphResult<ResultSet> {
        self.connection.run(cypher).await
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // The connection field drops right after this, closing its socket
        self.stats.released.fetch_add(1, Ordering::SeqCst);
        debug!(open = self.stats.open(), "Released Neo4j session");
    }
}
