//! Request pipeline: question → Cypher → rows → report
//!
//! ```text
//! Idle → Translating → TranslationFailed
//!                    → Translated → Executing → ExecutionFailed
//!                                             → Executed → Rendered
//! ```
//!
//! A failed stage short-circuits everything after it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::executor::GraphExecutor;
use crate::nlq::Translator;
use crate::present::Report;

/// Per-request state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    Idle,
    Translating,
    TranslationFailed,
    Translated,
    Executing,
    ExecutionFailed,
    Executed,
    Rendered,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestState::TranslationFailed | RequestState::ExecutionFailed | RequestState::Rendered
        )
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum AgentError {
    #[error("Question is empty")]
    EmptyQuestion,
}

pub type AgentResult<T> = Result<T, AgentError>;

/// Receives the long-running stages so a surface can show progress
pub trait StageObserver: Send + Sync {
    fn on_stage(&self, state: RequestState);
}

/// Observer that ignores every stage
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    fn on_stage(&self, _state: RequestState) {}
}

/// Runs the pipeline. One request at a time.
pub struct Agent {
    translator: Translator,
    executor: Arc<dyn GraphExecutor>,
    in_flight: Mutex<()>,
}

impl Agent {
    pub fn new(translator: Translator, executor: Arc<dyn GraphExecutor>) -> Self {
        Self {
            translator,
            executor,
            in_flight: Mutex::new(()),
        }
    }

    /// Answer one question. Blank questions are rejected before any call is
    /// made; translation and execution failures end up in the report.
    pub async fn ask(&self, question: &str, observer: &dyn StageObserver) -> AgentResult<Report> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AgentError::EmptyQuestion);
        }

        let _guard = self.in_flight.lock().await;
        let mut state = RequestState::Idle;

        transition(&mut state, RequestState::Translating, observer);
        let query = match self.translator.translate(question).await {
            Ok(query) => query,
            Err(e) => {
                warn!(error = %e, "Translation failed");
                transition(&mut state, RequestState::TranslationFailed, observer);
                return Ok(Report::translation_failed(question, &e));
            }
        };
        transition(&mut state, RequestState::Translated, observer);

        transition(&mut state, RequestState::Executing, observer);
        let result = match self.executor.execute(&query).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, cypher = %query, "Execution failed");
                transition(&mut state, RequestState::ExecutionFailed, observer);
                return Ok(Report::execution_failed(question, query, &e));
            }
        };
        transition(&mut state, RequestState::Executed, observer);

        info!(rows = result.len(), "Query answered");
        let report = Report::rendered(question, query, result);
        transition(&mut state, RequestState::Rendered, observer);
        Ok(report)
    }
}

fn transition(state: &mut RequestState, next: RequestState, observer: &dyn StageObserver) {
    debug!(from = ?*state, to = ?next, "Request state");
    *state = next;
    observer.on_stage(next);
}
