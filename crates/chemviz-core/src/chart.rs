//! Chart-ready projections of a summary document.
//!
//! These are pure functions recomputed whenever the displayed summary changes.

use serde::Serialize;

use crate::dataset::Summary;

const TYPE_PALETTE: [&str; 8] = [
    "#8b5cf6", "#a78bfa", "#c4b5fd", "#ddd6fe", "#a8dadc", "#457b9d", "#1d3557", "#e63946",
];
const AVERAGE_PALETTE: [&str; 3] = ["#f87171", "#34d399", "#60a5fa"];

pub const AVERAGE_LABELS: [&str; 3] = ["Flowrate", "Pressure", "Temperature"];

/// One chart's worth of data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub series_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// `values` formatted for display.
    pub display_values: Vec<String>,
    pub colors: Vec<String>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartProjections {
    /// Equipment type distribution (bar chart).
    pub type_chart: ChartSeries,
    /// Parameter averages (doughnut chart).
    pub average_chart: ChartSeries,
}

/// Derives both chart projections from a summary.
///
/// An absent or empty distribution yields an empty type chart. A summary with
/// no `averages` block yields an empty average chart; missing or non-numeric
/// sub-fields of a present block read as `0.00`.
pub fn derive_chart_projections(summary: &Summary) -> ChartProjections {
    ChartProjections {
        type_chart: type_chart(summary),
        average_chart: average_chart(summary),
    }
}

fn type_chart(summary: &Summary) -> ChartSeries {
    let distribution = summary.distribution();

    let mut series = ChartSeries {
        series_label: "Count".to_string(),
        ..Default::default()
    };
    for (index, (label, count)) in distribution.into_iter().enumerate() {
        series.labels.push(label);
        series.values.push(count);
        series.display_values.push(format_count(count));
        series
            .colors
            .push(TYPE_PALETTE[index % TYPE_PALETTE.len()].to_string());
    }
    series
}

fn average_chart(summary: &Summary) -> ChartSeries {
    let mut series = ChartSeries {
        series_label: "Average Value".to_string(),
        ..Default::default()
    };

    let Some(averages) = &summary.averages else {
        return series;
    };

    let values = [averages.flowrate, averages.pressure, averages.temperature];
    for (index, (label, value)) in AVERAGE_LABELS.iter().zip(values).enumerate() {
        let value = value.filter(|v| v.is_finite()).unwrap_or(0.0);
        series.labels.push(label.to_string());
        series.values.push(round_two_decimals(value));
        series.display_values.push(format!("{:.2}", value));
        series.colors.push(AVERAGE_PALETTE[index].to_string());
    }
    series
}

pub fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn format_count(count: f64) -> String {
    if count.fract() == 0.0 {
        format!("{}", count as i64)
    } else {
        format!("{:.2}", count)
    }
}
