//! Presentation of a request's outcome
//!
//! Builds the [`Report`] view model shown by both the web page and the
//! terminal: query text, a banner, the result table and an optional bar
//! chart.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::executor::{GraphError, ResultSet};
use crate::nlq::{CypherQuery, NLQError};
use crate::pipeline::RequestState;

pub const SUCCESS_MESSAGE: &str = "Query successful. Here are the results:";
pub const NO_RESULTS_MESSAGE: &str = "No results found.";

/// Column classification used for charting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Every non-null value is a number, and there is at least one
    Numeric,
    Other,
}

/// Classify one column of a result set
pub fn classify_column(result: &ResultSet, column: &str) -> ColumnKind {
    let mut seen_number = false;
    for value in result.column_values(column) {
        match value {
            Value::Number(_) => seen_number = true,
            Value::Null => {}
            _ => return ColumnKind::Other,
        }
    }
    if seen_number {
        ColumnKind::Numeric
    } else {
        ColumnKind::Other
    }
}

/// Columns classified as numeric, in table order
pub fn numeric_columns(result: &ResultSet) -> Vec<&str> {
    result
        .columns
        .iter()
        .filter(|c| classify_column(result, c) == ColumnKind::Numeric)
        .map(String::as_str)
        .collect()
}

/// Axes of the bar chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Category axis: the first column
    pub category: String,
    /// Value axis: the first numeric column
    pub value: String,
}

/// Decide whether a chart is drawn: at least one numeric column and at
/// least two columns overall.
pub fn chart_spec(result: &ResultSet) -> Option<ChartSpec> {
    if result.columns.len() < 2 {
        return None;
    }
    let value = numeric_columns(result).first()?.to_string();
    Some(ChartSpec {
        category: result.columns[0].clone(),
        value,
    })
}

/// A bar of the chart; `value` is `None` where the cell was null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    #[serde(flatten)]
    pub spec: ChartSpec,
    pub points: Vec<ChartPoint>,
}

impl Chart {
    /// Build the chart for a result set, if one should be drawn
    pub fn from_result(result: &ResultSet) -> Option<Self> {
        let spec = chart_spec(result)?;
        let points = result
            .records
            .iter()
            .map(|record| ChartPoint {
                label: record.get(&spec.category).map(display_value).unwrap_or_default(),
                value: record.get(&spec.value).and_then(Value::as_f64),
            })
            .collect();
        Some(Self {
            title: format!("Chart: {} by {}", spec.value, spec.category),
            spec,
            points,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub message: String,
}

impl Banner {
    fn new(level: BannerLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into() }
    }
}

/// Everything rendered for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub question: String,
    /// Generated Cypher, present once translation succeeded
    pub query: Option<CypherQuery>,
    pub banner: Banner,
    pub table: Option<ResultSet>,
    pub chart: Option<Chart>,
    /// Terminal state the request ended in
    pub state: RequestState,
}

impl Report {
    /// Translation failed: only the marker-prefixed error is shown
    pub fn translation_failed(question: &str, error: &NLQError) -> Self {
        Self {
            question: question.to_string(),
            query: None,
            banner: Banner::new(BannerLevel::Error, error.marker_text()),
            table: None,
            chart: None,
            state: RequestState::TranslationFailed,
        }
    }

    /// Execution failed: the query is still shown, no table
    pub fn execution_failed(question: &str, query: CypherQuery, error: &GraphError) -> Self {
        Self {
            question: question.to_string(),
            query: Some(query),
            banner: Banner::new(BannerLevel::Error, format!("Cypher Error: {}", error)),
            table: None,
            chart: None,
            state: RequestState::ExecutionFailed,
        }
    }

    /// Query ran: a notice for empty results, otherwise table and chart
    pub fn rendered(question: &str, query: CypherQuery, result: ResultSet) -> Self {
        let (banner, table, chart) = if result.is_empty() {
            (Banner::new(BannerLevel::Info, NO_RESULTS_MESSAGE), None, None)
        } else {
            let chart = Chart::from_result(&result);
            (Banner::new(BannerLevel::Success, SUCCESS_MESSAGE), Some(result), chart)
        };
        Self {
            question: question.to_string(),
            query: Some(query),
            banner,
            table,
            chart,
            state: RequestState::Rendered,
        }
    }
}

/// Cell text: strings bare, null as `null`, nested values as compact JSON
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(_) | Value::Array(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
