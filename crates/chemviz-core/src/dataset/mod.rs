//! Dataset domain module.
//!
//! # Module Structure
//!
//! - `model`: History entries, upload files, registration and report payloads
//! - `summary`: The backend summary document and its tolerant parsing
//! - `api`: The `DatasetApi` trait implemented by the HTTP client
//! - `report`: Report filename derivation and the `ReportSink` trait

mod api;
mod model;
mod report;
mod summary;

// Re-export public API
pub use api::DatasetApi;
pub use model::{
    DatasetId, HISTORY_WINDOW, HistoryEntry, Registration, RegistrationResult, ReportPayload,
    UploadFile,
};
pub use report::{ReportSink, fallback_report_filename, report_filename};
pub use summary::{Averages, BarSeries, PREVIEW_ROWS, PreviewRow, Summary, numeric_value};
