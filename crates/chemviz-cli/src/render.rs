//! Text rendering of history, summaries and charts.

use chemviz_core::chart::{ChartProjections, ChartSeries};
use chemviz_core::dataset::{DatasetId, HistoryEntry, PreviewRow, Summary};
use chemviz_core::session::{StatusKind, StatusMessage};
use colored::{ColoredString, Colorize};

const BAR_WIDTH: usize = 30;

pub fn status_line(status: &StatusMessage) -> ColoredString {
    match status.kind {
        StatusKind::Info => status.text.bright_black(),
        StatusKind::Success => status.text.green(),
        StatusKind::Error => status.text.red(),
    }
}

pub fn history_table(entries: &[HistoryEntry], selection: Option<DatasetId>) -> String {
    if entries.is_empty() {
        return "No datasets uploaded yet.".to_string();
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            let marker = if Some(entry.id) == selection { "*" } else { "" };
            vec![
                marker.to_string(),
                entry.id.to_string(),
                entry.name.clone(),
                entry
                    .timestamp
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    table(&["", "ID", "Name", "Uploaded"], &rows)
}

pub fn summary_report(id: DatasetId, summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", format!("Dataset {}", id).bold()));
    out.push_str(&format!(
        "Total records: {}\n",
        summary
            .records
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    if !summary.categories.is_empty() {
        out.push_str(&format!("Categories: {}\n", summary.categories.join(", ")));
    }

    if let Some(averages) = &summary.averages {
        out.push_str(&format!("\n{}\n", "Averages".bold()));
        let rows = vec![vec![
            number(averages.flowrate),
            number(averages.pressure),
            number(averages.temperature),
        ]];
        out.push_str(&table(&["Flowrate", "Pressure", "Temperature"], &rows));
        out.push('\n');
    }

    let distribution = summary.sorted_distribution();
    if !distribution.is_empty() {
        out.push_str(&format!("\n{}\n", "Equipment types".bold()));
        let rows: Vec<Vec<String>> = distribution
            .into_iter()
            .map(|(label, count)| vec![label, count_text(count)])
            .collect();
        out.push_str(&table(&["Type", "Count"], &rows));
        out.push('\n');
    }

    let preview = summary.preview();
    if !preview.is_empty() {
        out.push_str(&format!("\n{}\n", "Data preview".bold()));
        let rows: Vec<Vec<String>> = preview.iter().map(preview_cells).collect();
        out.push_str(&table(
            &["Equipment Name", "Type", "Flowrate", "Pressure", "Temperature"],
            &rows,
        ));
        out.push('\n');
    }

    out.trim_end().to_string()
}

pub fn charts(projections: &ChartProjections) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Equipment type distribution".bold()));
    out.push_str(&bar_chart(&projections.type_chart));
    out.push_str(&format!("\n\n{}\n", "Average parameters".bold()));
    out.push_str(&bar_chart(&projections.average_chart));
    out
}

fn bar_chart(series: &ChartSeries) -> String {
    if series.is_empty() {
        return "  (no data)".to_string();
    }

    let label_width = series.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let max = series.values.iter().cloned().fold(0.0_f64, f64::max);

    series
        .labels
        .iter()
        .zip(&series.values)
        .zip(&series.display_values)
        .zip(&series.colors)
        .map(|(((label, value), shown), color)| {
            let length = if max > 0.0 {
                ((value / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            let bar = "█".repeat(length);
            let bar = match hex_rgb(color) {
                Some((r, g, b)) => bar.truecolor(r, g, b).to_string(),
                None => bar,
            };
            format!("  {:<width$} {} {}", label, bar, shown, width = label_width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn hex_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn preview_cells(row: &PreviewRow) -> Vec<String> {
    vec![
        row.equipment_name.clone().unwrap_or_else(|| "-".to_string()),
        row.equipment_type.clone().unwrap_or_else(|| "-".to_string()),
        number(row.flowrate),
        number(row.pressure),
        number(row.temperature),
    ]
}

fn number(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn count_text(count: f64) -> String {
    if count.fract() == 0.0 {
        format!("{}", count as i64)
    } else {
        format!("{:.2}", count)
    }
}

/// Left-aligned plain text table with a header rule.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim()
            .to_string(),
    );
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemviz_core::chart::derive_chart_projections;
    use chemviz_core::dataset::Averages;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_history_table_marks_selection() {
        plain();
        let entries = vec![
            HistoryEntry {
                id: DatasetId(7),
                name: "batch2.csv".into(),
                timestamp: "2024-01-02T08:30:00Z".parse().ok(),
                username: None,
            },
            HistoryEntry {
                id: DatasetId(1),
                name: "batch1.csv".into(),
                timestamp: None,
                username: None,
            },
        ];

        let text = history_table(&entries, Some(DatasetId(7)));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("ID") && lines[0].contains("Uploaded"));
        assert!(lines[2].starts_with('*'));
        assert!(lines[2].contains("2024-01-02 08:30"));
        assert!(lines[3].ends_with('-'));
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(history_table(&[], None), "No datasets uploaded yet.");
    }

    #[test]
    fn test_summary_report_sections() {
        plain();
        let summary: Summary = serde_json::from_str(
            r#"{
                "total_records": 3,
                "averages": {"flowrate": 110.5, "pressure": "5.25", "temperature": 90},
                "type_distribution": {"Valve": 1, "Pump": 2},
                "data_preview": [
                    {"Equipment Name": "P-101", "Type": "Pump", "Flowrate": 120, "Pressure": 5.2, "Temperature": 110}
                ]
            }"#,
        )
        .unwrap();

        let text = summary_report(DatasetId(3), &summary);

        assert!(text.starts_with("Dataset 3"));
        assert!(text.contains("Total records: 3"));
        assert!(text.contains("110.50"));
        assert!(text.contains("5.25"));
        // Sorted by count
        let pump = text.find("Pump  ").unwrap();
        let valve = text.find("Valve").unwrap();
        assert!(pump < valve);
        assert!(text.contains("P-101"));
    }

    #[test]
    fn test_charts_without_data() {
        plain();
        let text = charts(&derive_chart_projections(&Summary::default()));
        assert_eq!(text.matches("(no data)").count(), 2);
    }

    #[test]
    fn test_bar_lengths_scale_to_largest_value() {
        plain();
        let summary = Summary {
            averages: Some(Averages {
                flowrate: Some(100.0),
                pressure: Some(50.0),
                temperature: None,
            }),
            ..Default::default()
        };
        let text = bar_chart(&derive_chart_projections(&summary).average_chart);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH / 2);
        assert_eq!(lines[2].matches('█').count(), 0);
        assert!(lines[2].ends_with("0.00"));
    }

    #[test]
    fn test_hex_rgb() {
        assert_eq!(hex_rgb("#8b5cf6"), Some((0x8b, 0x5c, 0xf6)));
        assert_eq!(hex_rgb("8b5cf6"), None);
        assert_eq!(hex_rgb("#zzzzzz"), None);
    }
}
