//! Chart hand-off: aggregate series → serializable traces (JSON / YAML)

use crate::error::{TallyError, TallyResult};
use crate::types::AggregateResult;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// One line of the chart: a file's totals in date order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trace {
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub totals: Vec<i64>,
}

/// Everything the charting side needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
    pub traces: Vec<Trace>,
}

impl ChartData {
    /// Build traces from an aggregate. Files without any valid rows get no
    /// trace; traces are ordered by their earliest date, then by name.
    pub fn from_aggregate(aggregate: &AggregateResult) -> Self {
        let mut traces: Vec<Trace> = aggregate
            .iter()
            .filter(|(_, series)| !series.is_empty())
            .map(|(name, series)| Trace {
                name: name.clone(),
                dates: series.keys().copied().collect(),
                totals: series.values().copied().collect(),
            })
            .collect();

        traces.sort_by(|a, b| a.dates[0].cmp(&b.dates[0]).then_with(|| a.name.cmp(&b.name)));

        Self {
            title: "Daily totals".to_string(),
            x_axis: "Date".to_string(),
            y_axis: "Total per day".to_string(),
            traces,
        }
    }
}

/// Names of files whose series is empty (nothing to plot)
pub fn empty_series(aggregate: &AggregateResult) -> Vec<&str> {
    aggregate
        .iter()
        .filter(|(_, series)| series.is_empty())
        .map(|(name, _)| name.as_str())
        .collect()
}

/// Write chart data as `.json` or `.yaml`/`.yml`, chosen by extension
pub fn write_chart_data(path: &Path, data: &ChartData) -> TallyResult<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let content = match ext.as_deref() {
        Some("json") => serde_json::to_string_pretty(data)?,
        Some("yaml") | Some("yml") => serde_yaml::to_string(data)?,
        _ => {
            return Err(TallyError::Export(format!(
                "Unsupported output format '{}'. Use .json or .yaml",
                path.display()
            )))
        }
    };

    fs::write(path, content)?;
    Ok(())
}
