//! Backend-computed digest of one dataset.
//!
//! Two backend variants exist: one reports `records` and a `bar {labels, values}`
//! block, the other `total_records` and a `type_distribution` mapping. Both are
//! accepted here, and numeric fields may arrive as numbers or numeric strings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Maximum number of preview rows the backend sends.
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    #[serde(alias = "total_records", deserialize_with = "lenient_count")]
    pub records: Option<u64>,
    #[serde(deserialize_with = "lenient_string_vec")]
    pub categories: Vec<String>,
    pub averages: Option<Averages>,
    pub bar: Option<BarSeries>,
    /// Label to count, in backend order.
    pub type_distribution: Option<Map<String, Value>>,
    #[serde(deserialize_with = "null_as_default")]
    pub data_preview: Vec<PreviewRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Averages {
    #[serde(deserialize_with = "lenient_f64")]
    pub flowrate: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub pressure: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarSeries {
    #[serde(deserialize_with = "lenient_labels")]
    pub labels: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_f64_vec")]
    pub values: Option<Vec<f64>>,
}

/// One row of the data preview table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewRow {
    #[serde(rename = "Equipment Name", deserialize_with = "lenient_string")]
    pub equipment_name: Option<String>,
    #[serde(rename = "Type", deserialize_with = "lenient_string")]
    pub equipment_type: Option<String>,
    #[serde(rename = "Flowrate", deserialize_with = "lenient_f64")]
    pub flowrate: Option<f64>,
    #[serde(rename = "Pressure", deserialize_with = "lenient_f64")]
    pub pressure: Option<f64>,
    #[serde(rename = "Temperature", deserialize_with = "lenient_f64")]
    pub temperature: Option<f64>,
}

impl Summary {
    /// Label/count pairs for the type chart.
    ///
    /// A `bar` block with both labels and values wins over `type_distribution`.
    /// Returns an empty list when neither is present.
    pub fn distribution(&self) -> Vec<(String, f64)> {
        if let Some(BarSeries {
            labels: Some(labels),
            values: Some(values),
        }) = &self.bar
        {
            return labels
                .iter()
                .cloned()
                .zip(values.iter().copied())
                .collect();
        }

        self.type_distribution
            .as_ref()
            .map(|map| {
                map.iter()
                    .map(|(label, count)| (label.clone(), numeric_value(count).unwrap_or(0.0)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Distribution sorted by count, largest first. Ties keep backend order.
    pub fn sorted_distribution(&self) -> Vec<(String, f64)> {
        let mut entries = self.distribution();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        entries
    }

    /// At most [`PREVIEW_ROWS`] preview rows.
    pub fn preview(&self) -> &[PreviewRow] {
        let end = self.data_preview.len().min(PREVIEW_ROWS);
        &self.data_preview[..end]
    }
}

/// Reads a JSON number or numeric string as `f64`.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Reads a JSON scalar as text. Numbers keep their JSON spelling.
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_value))
}

fn lenient_labels<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(values.map(|values| {
        values
            .iter()
            .map(|v| text_value(v).unwrap_or_default())
            .collect()
    }))
}

fn lenient_string_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_labels(deserializer)?.unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(numeric_value))
}

fn lenient_f64_vec<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(values.map(|values| {
        values
            .iter()
            .map(|v| numeric_value(v).unwrap_or(0.0))
            .collect()
    }))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(numeric_value)
        .filter(|n| *n >= 0.0)
        .map(|n| n as u64))
}
