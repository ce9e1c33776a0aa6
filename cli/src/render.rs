//! Terminal rendering of a [`Report`]

use comfy_table::{ContentArrangement, Table};
use sap_ar_agent::present::display_value;
use sap_ar_agent::{BannerLevel, Chart, Report, ResultSet};

/// Widest label kept in the bar chart before truncation
const MAX_LABEL_WIDTH: usize = 24;

pub fn render_table(result: &ResultSet) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(&result.columns);

    for record in &result.records {
        let cells: Vec<String> = result
            .columns
            .iter()
            .map(|col| record.get(col).map(display_value).unwrap_or_else(|| "null".to_string()))
            .collect();
        table.add_row(cells);
    }

    table.to_string()
}

/// Horizontal bars scaled so the largest value spans `width` cells.
/// Null values get no bar; zero and negative values get an empty bar.
pub fn render_bar_chart(chart: &Chart, width: usize) -> String {
    let max = chart
        .points
        .iter()
        .filter_map(|p| p.value)
        .fold(0.0_f64, f64::max);

    let labels: Vec<String> = chart
        .points
        .iter()
        .map(|p| truncate(&p.label, MAX_LABEL_WIDTH))
        .collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut out = format!("{}\n", chart.title);
    for (point, label) in chart.points.iter().zip(&labels) {
        let (bar, value) = match point.value {
            Some(v) => {
                let len = if max > 0.0 && v > 0.0 {
                    ((v / max) * width as f64).round() as usize
                } else {
                    0
                };
                ("█".repeat(len), v.to_string())
            }
            None => (String::new(), "null".to_string()),
        };
        let line = format!("{:<lw$} │{} {}", label, bar, value, lw = label_width);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Query text, banner, table and chart, in that order
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();

    if let Some(query) = &report.query {
        out.push_str(&format!("Cypher:\n  {}\n\n", query.as_str().replace('\n', "\n  ")));
    }

    let prefix = match report.banner.level {
        BannerLevel::Success => "✅",
        BannerLevel::Info => "ℹ️ ",
        BannerLevel::Error => "❌",
    };
    out.push_str(&format!("{} {}\n", prefix, report.banner.message));

    if let Some(table) = &report.table {
        out.push_str(&render_table(table));
        out.push('\n');
        out.push_str(&format!("{} row(s)\n", table.len()));
    }

    if let Some(chart) = &report.chart {
        out.push('\n');
        out.push_str(&render_bar_chart(chart, 40));
    }

    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max - 1).collect();
        cut.push('…');
        cut
    }
}
