use sap_ar_agent::{Agent, AppConfig, AppState, HttpServer, Neo4jExecutor, Translator};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("SAP AR Graph Agent v{}", sap_ar_agent::version());

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    info!(?config, "Loaded configuration");

    let translator = Translator::new(&config.nlq)?;
    let executor = Arc::new(Neo4jExecutor::new(config.graph.clone()));

    let state = Arc::new(AppState {
        agent: Agent::new(translator, executor),
        instance_name: config.graph.instance_name.clone(),
        database: config.graph.database.clone(),
    });

    HttpServer::new(state, config.server.clone())
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server failed: {}", e))?;

    Ok(())
}
