use async_trait::async_trait;
use sap_ar_agent::executor::{Connection, Connector};
use sap_ar_agent::nlq::client::CompletionClient;
use sap_ar_agent::{
    Agent, AgentError, BannerLevel, CypherQuery, GraphConfig, GraphError, GraphExecutor,
    GraphResult, NLQError, NLQResult, Neo4jExecutor, NoopObserver, RequestState, ResultSet,
    StageObserver, Translator,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

struct MockLlm {
    reply: Result<String, String>,
}

#[async_trait]
impl CompletionClient for MockLlm {
    async fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> NLQResult<String> {
        self.reply.clone().map_err(NLQError::NetworkError)
    }
}

struct MockGraph {
    response: GraphResult<ResultSet>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl MockGraph {
    fn new(response: GraphResult<ResultSet>) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl GraphExecutor for MockGraph {
    async fn execute(&self, query: &CypherQuery) -> GraphResult<ResultSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.as_str().to_string());
        self.response.clone()
    }
}

#[derive(Default)]
struct RecordingObserver {
    stages: Mutex<Vec<RequestState>>,
}

impl StageObserver for RecordingObserver {
    fn on_stage(&self, state: RequestState) {
        self.stages.lock().unwrap().push(state);
    }
}

fn agent(llm_reply: Result<&str, &str>, graph: Arc<MockGraph>) -> Agent {
    let llm = MockLlm {
        reply: llm_reply.map(str::to_string).map_err(str::to_string),
    };
    Agent::new(Translator::with_client(Arc::new(llm)), graph)
}

fn rows(columns: &[&str], rows: Vec<Vec<Value>>) -> ResultSet {
    ResultSet::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows)
}

#[tokio::test]
async fn test_single_total_renders_table_without_chart() {
    let graph = MockGraph::new(Ok(rows(&["total"], vec![vec![json!(54230.75)]])));
    let agent = agent(
        Ok("MATCH (c:Company {company_code: '1000'})<-[:BELONGS_TO]-(:Customer)<-[:ISSUED_TO]-(i:Invoice) RETURN sum(i.invoiced_amount) AS total"),
        graph.clone(),
    );

    let observer = RecordingObserver::default();
    let report = agent
        .ask("Total invoiced amount for company code 1000", &observer)
        .await
        .unwrap();

    assert_eq!(report.state, RequestState::Rendered);
    assert!(report.query.is_some());
    assert_eq!(report.banner.level, BannerLevel::Success);
    let table = report.table.unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.records[0]["total"], json!(54230.75));
    assert!(report.chart.is_none());

    assert_eq!(
        *observer.stages.lock().unwrap(),
        vec![
            RequestState::Translating,
            RequestState::Translated,
            RequestState::Executing,
            RequestState::Executed,
            RequestState::Rendered,
        ]
    );
}

#[tokio::test]
async fn test_translation_failure_never_executes() {
    let graph = MockGraph::new(Ok(ResultSet::default()));
    let agent = agent(Err("request timed out"), graph.clone());

    let report = agent.ask("Show all unpaid invoices", &NoopObserver).await.unwrap();

    assert_eq!(report.state, RequestState::TranslationFailed);
    assert_eq!(report.banner.level, BannerLevel::Error);
    assert!(report.banner.message.starts_with("ERROR: "));
    assert!(report.banner.message.contains("request timed out"));
    assert!(report.query.is_none());
    assert!(report.table.is_none());
    assert_eq!(graph.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_execution_failure_shows_query_and_error() {
    let graph = MockGraph::new(Err(GraphError::Query {
        code: "Neo.ClientError.Statement.SyntaxError".to_string(),
        message: "Invalid input 'RETRN'".to_string(),
    }));
    let agent = agent(Ok("MATCH (n:Invoice) RETRN n"), graph.clone());

    let report = agent.ask("List invoices", &NoopObserver).await.unwrap();

    assert_eq!(report.state, RequestState::ExecutionFailed);
    assert_eq!(report.query, Some(CypherQuery::new("MATCH (n:Invoice) RETRN n")));
    assert_eq!(report.banner.level, BannerLevel::Error);
    assert!(report.banner.message.starts_with("Cypher Error: "));
    assert!(report.banner.message.contains("Invalid input 'RETRN'"));
    assert!(report.table.is_none());
    assert!(report.chart.is_none());
}

#[tokio::test]
async fn test_empty_result_shows_notice() {
    let graph = MockGraph::new(Ok(rows(&["invoice_id"], vec![])));
    let agent = agent(Ok("MATCH (i:Invoice {invoiced_status: 'VOID'}) RETURN i.invoice_id AS invoice_id"), graph);

    let report = agent.ask("Voided invoices", &NoopObserver).await.unwrap();

    assert_eq!(report.state, RequestState::Rendered);
    assert_eq!(report.banner.level, BannerLevel::Info);
    assert_eq!(report.banner.message, "No results found.");
    assert!(report.table.is_none());
    assert!(report.chart.is_none());
}

#[tokio::test]
async fn test_customer_amounts_render_chart() {
    let graph = MockGraph::new(Ok(rows(
        &["customer_name", "invoiced_amount"],
        vec![
            vec![json!("ACME Corp"), json!(12000.0)],
            vec![json!("Globex"), json!(8000.5)],
        ],
    )));
    let agent = agent(
        Ok("MATCH (i:Invoice)-[:ISSUED_TO]->(c:Customer) RETURN c.customer_name AS customer_name, sum(i.invoiced_amount) AS invoiced_amount"),
        graph,
    );

    let report = agent.ask("Invoiced amount by customer", &NoopObserver).await.unwrap();

    let chart = report.chart.expect("chart should render");
    assert_eq!(chart.spec.category, "customer_name");
    assert_eq!(chart.spec.value, "invoiced_amount");
    assert_eq!(chart.points.len(), 2);
    assert_eq!(chart.points[1].label, "Globex");
    assert_eq!(chart.points[1].value, Some(8000.5));
}

#[tokio::test]
async fn test_error_named_column_is_data() {
    let graph = MockGraph::new(Ok(rows(&["error", "count"], vec![vec![json!("late"), json!(4)]])));
    let agent = agent(Ok("MATCH (d:Dunning) RETURN 'late' AS error, count(d) AS count"), graph);

    let report = agent.ask("Dunning count", &NoopObserver).await.unwrap();

    assert_eq!(report.state, RequestState::Rendered);
    assert_eq!(report.banner.level, BannerLevel::Success);
    assert!(report.table.is_some());
}

#[tokio::test]
async fn test_blank_question_rejected_before_translation() {
    let graph = MockGraph::new(Ok(ResultSet::default()));
    let agent = agent(Ok("RETURN 1"), graph.clone());

    let err = agent.ask("   \n\t", &NoopObserver).await.unwrap_err();
    assert_eq!(err, AgentError::EmptyQuestion);
    assert_eq!(graph.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_same_query_same_result() {
    let data = rows(&["customer_id"], vec![vec![json!("C-1")], vec![json!("C-2")]]);
    let graph = MockGraph::new(Ok(data));
    let agent = agent(Ok("MATCH (c:Customer) RETURN c.customer_id AS customer_id"), graph.clone());

    let first = agent.ask("All customers", &NoopObserver).await.unwrap();
    let second = agent.ask("All customers", &NoopObserver).await.unwrap();

    assert_eq!(first.table, second.table);
    let queries = graph.queries.lock().unwrap();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0], queries[1]);
}

/// Records translation order into a shared event log
struct LoggingLlm {
    events: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl CompletionClient for LoggingLlm {
    async fn complete(&self, _system_prompt: &str, user_prompt: &str) -> NLQResult<String> {
        self.events.lock().unwrap().push(format!("translate {}", user_prompt));
        Ok("MATCH (c:Customer) RETURN count(c) AS customers".to_string())
    }
}

/// Holds each query open until released, tracking concurrent entries
struct GatedGraph {
    events: Arc<Mutex<Vec<String>>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    arrived: Notify,
    release: Notify,
}

#[async_trait]
impl GraphExecutor for GatedGraph {
    async fn execute(&self, _query: &CypherQuery) -> GraphResult<ResultSet> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.events.lock().unwrap().push("execute start".to_string());
        self.arrived.notify_one();

        self.release.notified().await;

        self.events.lock().unwrap().push("execute end".to_string());
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(rows(&["customers"], vec![vec![json!(12)]]))
    }
}

#[tokio::test]
async fn test_one_request_in_flight_at_a_time() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let graph = Arc::new(GatedGraph {
        events: events.clone(),
        active: AtomicUsize::new(0),
        max_active: AtomicUsize::new(0),
        arrived: Notify::new(),
        release: Notify::new(),
    });
    let llm = LoggingLlm { events: events.clone() };
    let agent = Arc::new(Agent::new(Translator::with_client(Arc::new(llm)), graph.clone()));

    let first = tokio::spawn({
        let agent = agent.clone();
        async move { agent.ask("first", &NoopObserver).await }
    });
    graph.arrived.notified().await;

    let second = tokio::spawn({
        let agent = agent.clone();
        async move { agent.ask("second", &NoopObserver).await }
    });

    // The second request must wait behind the first, not start translating
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        *events.lock().unwrap(),
        vec!["translate first".to_string(), "execute start".to_string()]
    );

    graph.release.notify_one();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first.state, RequestState::Rendered);

    graph.arrived.notified().await;
    graph.release.notify_one();
    let second = second.await.unwrap().unwrap();
    assert_eq!(second.state, RequestState::Rendered);

    assert_eq!(graph.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "translate first",
            "execute start",
            "execute end",
            "translate second",
            "execute start",
            "execute end",
        ]
    );
}

/// Connections that reject every statement and count their own drops
struct RejectingConnector {
    dropped: Arc<AtomicUsize>,
}

struct RejectingConnection {
    dropped: Arc<AtomicUsize>,
}

#[async_trait]
impl Connector for RejectingConnector {
    async fn connect(&self, _config: &GraphConfig) -> GraphResult<Box<dyn Connection>> {
        Ok(Box::new(RejectingConnection {
            dropped: self.dropped.clone(),
        }))
    }
}

#[async_trait]
impl Connection for RejectingConnection {
    async fn run(&mut self, _cypher: &str) -> GraphResult<ResultSet> {
        Err(GraphError::Query {
            code: "Neo.ClientError.Statement.SyntaxError".to_string(),
            message: "Invalid input 'RETRN'".to_string(),
        })
    }
}

impl Drop for RejectingConnection {
    fn drop(&mut self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_failed_query_releases_session() {
    let dropped = Arc::new(AtomicUsize::new(0));
    let config = GraphConfig {
        instance_name: "sap-ar".to_string(),
        uri: "neo4j+s://abcd1234.databases.neo4j.io".to_string(),
        username: "neo4j".to_string(),
        password: "s3cret".to_string(),
        database: "neo4j".to_string(),
    };
    let executor = Arc::new(Neo4jExecutor::with_connector(
        config,
        Arc::new(RejectingConnector { dropped: dropped.clone() }),
    ));
    let llm = MockLlm {
        reply: Ok("MATCH (n:Invoice) RETRN n".to_string()),
    };
    let agent = Agent::new(Translator::with_client(Arc::new(llm)), executor.clone());

    for _ in 0..2 {
        let report = agent.ask("List invoices", &NoopObserver).await.unwrap();
        assert_eq!(report.state, RequestState::ExecutionFailed);
    }

    assert_eq!(executor.sessions().opened(), 2);
    assert_eq!(executor.sessions().released(), 2);
    assert_eq!(executor.sessions().open(), 0);
    assert_eq!(dropped.load(Ordering::SeqCst), 2);
}
