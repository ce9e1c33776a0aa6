//! sap-ar — command-line front end for the SAP AR Graph Agent
//!
//! Loads the same configuration as the web server and answers questions in
//! the terminal.

mod render;

use clap::{Parser, Subcommand};
use sap_ar_agent::nlq::schema::{system_prompt, EXAMPLE_QUESTIONS};
use sap_ar_agent::{Agent, AppConfig, Neo4jExecutor, RequestState, StageObserver, Translator};
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sap-ar", version, about = "Ask SAP Accounts-Receivable questions against Neo4j")]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        /// The question, in plain English
        question: String,
    },
    /// Start an interactive question prompt
    Shell,
    /// Print the schema instruction sent to the language model
    Schema,
}

/// Prints progress lines on stderr while a stage runs
struct ProgressLines;

impl StageObserver for ProgressLines {
    fn on_stage(&self, state: RequestState) {
        match state {
            RequestState::Translating => eprintln!("🔍 Generating Cypher query using GPT..."),
            RequestState::Executing => eprintln!("📡 Querying Neo4j..."),
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Schema => {
            println!("{}", system_prompt());
            Ok(())
        }
        Commands::Ask { question } => match build_agent() {
            Ok(agent) => run_ask(&agent, &question, &cli.format).await,
            Err(e) => Err(e),
        },
        Commands::Shell => match build_agent() {
            Ok(agent) => run_shell(&agent, &cli.format).await,
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build_agent() -> Result<Agent, Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let translator = Translator::new(&config.nlq)?;
    let executor = Arc::new(Neo4jExecutor::new(config.graph));
    Ok(Agent::new(translator, executor))
}

async fn run_ask(
    agent: &Agent,
    question: &str,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = agent.ask(question, &ProgressLines).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print!("{}", render::render_report(&report)),
    }

    Ok(())
}

async fn run_shell(agent: &Agent, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("SAP AR Query Agent");
    println!("Ask a question, or :help for commands. :quit to exit.\n");

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        eprint!("sap-ar> ");
        std::io::stderr().flush()?;

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match trimmed {
            ":quit" | ":exit" | ":q" => break,
            ":help" | ":h" => {
                println!("Commands:");
                println!("  :examples  — Show example questions");
                println!("  :schema    — Show the schema sent to the model");
                println!("  :quit      — Exit shell");
                println!("  <question> — Generate Cypher, run it, show the results");
            }
            ":examples" => {
                for example in EXAMPLE_QUESTIONS {
                    println!("  {}", example);
                }
            }
            ":schema" => println!("{}", system_prompt()),
            question => {
                if let Err(e) = run_ask(agent, question, format).await {
                    eprintln!("Error: {}", e);
                }
            }
        }
        println!();
    }

    println!("Bye!");
    Ok(())
}
