//! SAP AR Graph Agent
//!
//! Answers natural-language questions about SAP Accounts-Receivable data
//! stored in Neo4j. Each question goes through three stages:
//!
//! - **Translate** ([`nlq`]): the question and a fixed schema description are
//!   sent to a language model, which returns Cypher.
//! - **Execute** ([`executor`]): the Cypher runs against the configured
//!   database in a session opened and closed for that one call.
//! - **Present** ([`present`]): the outcome becomes a [`Report`] holding the
//!   query text, a banner, the table and, when the rows allow it, a bar chart.
//!
//! [`pipeline::Agent`] drives the stages, and [`http`] serves the single
//! question page.
//!
//! ## Example Usage
//!
//! ```no_run
//! use sap_ar_agent::{Agent, AppConfig, Neo4jExecutor, NoopObserver, Translator};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let agent = Agent::new(
//!     Translator::new(&config.nlq)?,
//!     Arc::new(Neo4jExecutor::new(config.graph.clone())),
//! );
//!
//! let report = agent
//!     .ask("Total invoiced amount for company code 1000", &NoopObserver)
//!     .await?;
//! println!("{}", report.banner.message);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod executor;
pub mod http;
pub mod nlq;
pub mod pipeline;
pub mod present;

// Re-export main types for convenience
pub use config::{AppConfig, ConfigError, ConfigResult, GraphConfig, NLQConfig, ServerConfig};

pub use executor::{
    GraphError, GraphExecutor, GraphResult, Neo4jExecutor, Record, ResultSet, SessionStats,
};

pub use nlq::{CypherQuery, NLQError, NLQResult, Translator};

pub use pipeline::{Agent, AgentError, AgentResult, NoopObserver, RequestState, StageObserver};

pub use present::{Banner, BannerLevel, Chart, ChartPoint, ChartSpec, ColumnKind, Report};

pub use http::{AppState, HttpServer};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
