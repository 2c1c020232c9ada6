use async_trait::async_trait;

use super::model::{
    DatasetId, HistoryEntry, Registration, RegistrationResult, ReportPayload, UploadFile,
};
use super::summary::Summary;
use crate::credentials::Credentials;
use crate::error::Result;

/// Backend REST API consumed by the client.
///
/// This trait abstracts the HTTP transport so the session controller can be
/// driven by a stub backend in tests. Every protected call receives the raw
/// credentials and re-sends them.
#[async_trait]
pub trait DatasetApi: Send + Sync {
    /// Lists the user's history, newest first.
    ///
    /// Also used to verify credentials: an `Auth` error means the backend
    /// rejected them.
    async fn fetch_history(&self, credentials: &Credentials) -> Result<Vec<HistoryEntry>>;

    /// Creates a new account. Does not authenticate.
    async fn register(&self, registration: &Registration) -> Result<RegistrationResult>;

    /// Uploads a dataset file and returns the created history entry.
    async fn upload(&self, credentials: &Credentials, file: &UploadFile) -> Result<HistoryEntry>;

    /// Fetches the summary document of one dataset.
    async fn fetch_summary(&self, credentials: &Credentials, id: DatasetId) -> Result<Summary>;

    /// Fetches the PDF report of one dataset.
    async fn download_report(&self, credentials: &Credentials, id: DatasetId)
    -> Result<ReportPayload>;

    /// Removes one history entry.
    async fn delete_entry(&self, credentials: &Credentials, id: DatasetId) -> Result<()>;
}
