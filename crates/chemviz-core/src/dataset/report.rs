//! Report download naming and storage.

use async_trait::async_trait;
use std::path::PathBuf;

use super::model::DatasetId;
use crate::error::Result;

/// Destination for downloaded report bytes.
///
/// Implementations must release any transient resource they acquire while
/// saving, whether the save succeeds or not.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Stores `bytes` under `filename` and returns where they ended up.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Derives the report filename.
///
/// Uses the `filename=` parameter of a `Content-Disposition` header when it
/// has one, quoted or not. Otherwise falls back to `report_{id}.pdf`.
pub fn report_filename(content_disposition: Option<&str>, id: DatasetId) -> String {
    content_disposition
        .and_then(filename_from_disposition)
        .unwrap_or_else(|| fallback_report_filename(id))
}

pub fn fallback_report_filename(id: DatasetId) -> String {
    format!("report_{}.pdf", id)
}

fn filename_from_disposition(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| {
            let (key, value) = part.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("filename") {
                Some(value.trim().trim_matches(|c| c == '"' || c == '\''))
            } else {
                None
            }
        })
        .map(sanitize_filename)
        .filter(|name| !name.is_empty())
}

// Only the final path component is kept.
fn sanitize_filename(name: &str) -> String {
    name.rsplit(['/', '\\']).next().unwrap_or_default().to_string()
}
