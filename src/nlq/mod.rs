//! Natural Language Querying (NLQ)
//!
//! Translates a question about SAP Accounts-Receivable data into Cypher by
//! sending the fixed schema description and the question to a language model.

pub mod client;
pub mod schema;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::NLQConfig;
use client::{CompletionClient, OpenAIClient};

/// Prefix of the user-facing text of a failed translation
pub const TRANSLATION_ERROR_MARKER: &str = "ERROR";

#[derive(Error, Debug)]
pub enum NLQError {
    #[error("LLM API error: {0}")]
    ApiError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl NLQError {
    /// The error as the marker-prefixed text shown to users, e.g.
    /// `ERROR: Network error: connection refused`.
    pub fn marker_text(&self) -> String {
        format!("{}: {}", TRANSLATION_ERROR_MARKER, self)
    }
}

pub type NLQResult<T> = Result<T, NLQError>;

/// Cypher text produced by the translator. Not validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CypherQuery(String);

impl CypherQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CypherQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Question → Cypher translation through a completion client
pub struct Translator {
    client: Arc<dyn CompletionClient>,
    system_prompt: String,
}

impl Translator {
    /// Create a translator backed by the OpenAI-compatible client
    pub fn new(config: &NLQConfig) -> NLQResult<Self> {
        let client = OpenAIClient::new(config)?;
        info!(model = %client.model(), base_url = %config.api_base_url, "Configured LLM client");
        Ok(Self::with_client(Arc::new(client)))
    }

    /// Create a translator over any completion client
    pub fn with_client(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            system_prompt: schema::system_prompt(),
        }
    }

    /// Translate a question into Cypher.
    ///
    /// The question is expected to be non-empty; callers reject blank input.
    /// The first completion is returned trimmed, with no syntax checking.
    pub async fn translate(&self, question: &str) -> NLQResult<CypherQuery> {
        let text = self.client.complete(&self.system_prompt, question).await?;
        let cypher = text.trim().to_string();
        debug!(%cypher, "Generated Cypher");
        Ok(CypherQuery(cypher))
    }
}
