//! Process configuration
//!
//! All settings are resolved once at startup into an [`AppConfig`] that is
//! handed to each component's constructor. Nothing else in the crate reads
//! the environment.

use reqwest::Url;
use std::fmt;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// A required variable is absent or empty
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    /// A variable is present but cannot be used
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8501;

/// Neo4j connection settings
#[derive(Clone)]
pub struct GraphConfig {
    /// Aura instance name (informational)
    pub instance_name: String,
    /// Bolt URI as given by the environment (e.g. `neo4j+s://xxxx.databases.neo4j.io`)
    pub uri: String,
    pub username: String,
    pub password: String,
    /// Database selected for every session
    pub database: String,
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("instance_name", &self.instance_name)
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Language-model settings for Cypher generation
#[derive(Clone)]
pub struct NLQConfig {
    /// Base URL of an OpenAI-compatible API
    pub api_base_url: String,
    pub api_key: String,
    /// Model name (e.g. "gpt-4o")
    pub model: String,
    /// Sampling temperature. Always 0.
    pub temperature: f32,
}

impl fmt::Debug for NLQConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NLQConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// HTTP surface settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_HTTP_ADDR.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Complete process configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub graph: GraphConfig,
    pub nlq: NLQConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load `.env` (if present) and resolve the configuration from the
    /// process environment.
    pub fn from_env() -> ConfigResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> ConfigResult<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::Missing(key.to_string()))
        };
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let instance_name = required("AURA_INSTANCENAME")?;
        let uri = required("NEO4J_URI")?;
        validate_bolt_uri(&uri)?;
        let username = required("NEO4J_USERNAME")?;
        let password = required("NEO4J_PASSWORD")?;
        let database = required("NEO4J_DATABASE")?;
        let api_key = required("OPENAI_API_KEY")?;

        let port = match optional("SAP_AR_HTTP_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "SAP_AR_HTTP_PORT".to_string(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_HTTP_PORT,
        };

        Ok(Self {
            graph: GraphConfig {
                instance_name,
                uri,
                username,
                password,
                database,
            },
            nlq: NLQConfig {
                api_base_url: optional("OPENAI_BASE_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                api_key,
                model: optional("SAP_AR_LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                temperature: 0.0,
            },
            server: ServerConfig {
                address: optional("SAP_AR_HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string()),
                port,
            },
        })
    }
}

/// Reject URIs the Bolt driver cannot dial.
pub fn validate_bolt_uri(uri: &str) -> ConfigResult<()> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: "NEO4J_URI".to_string(),
        reason,
    };

    let parsed = Url::parse(uri).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "neo4j" | "neo4j+s" | "neo4j+ssc" | "bolt" | "bolt+s" | "bolt+ssc" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}
