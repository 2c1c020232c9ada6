//! Session controller implementation.
//!
//! `SessionController` owns the client state and drives every transition of
//! the session state machine: login, history refresh, the upload pipeline,
//! summary selection, report download and deletion.
//!
//! # Concurrency
//!
//! The controller is `Clone`; clones share one `ClientState` behind a tokio
//! `RwLock`. The lock is never held across a call to the dataset API, so
//! other operations can run while a request is in flight. Two guards keep
//! late responses from landing in the wrong place:
//!
//! - A summary is stored only if its id is still the selection.
//! - Every login and logout bumps a session epoch. Results that come back
//!   under an older epoch are dropped.

use chemviz_core::chart::{ChartProjections, derive_chart_projections};
use chemviz_core::config::SessionSettings;
use chemviz_core::dataset::{
    DatasetApi, DatasetId, HistoryEntry, Registration, RegistrationResult, ReportSink, Summary,
    UploadFile, report_filename,
};
use chemviz_core::session::{ClientState, Session, SessionPhase, StatusMessage};
use chemviz_core::{ChemVizError, Credentials, Result};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::messages;

/// Drives the client session against a [`DatasetApi`].
#[derive(Clone)]
pub struct SessionController {
    /// Backend the controller talks to
    api: Arc<dyn DatasetApi>,
    /// Where downloaded reports are written
    report_sink: Arc<dyn ReportSink>,
    settings: SessionSettings,
    state: Arc<RwLock<ClientState>>,
    /// Bumped on every login and logout.
    epoch: Arc<AtomicU64>,
    uploading: Arc<AtomicBool>,
}

/// Clears the single-flight upload flag when the upload ends, however it ends.
struct UploadGuard<'a>(&'a AtomicBool);

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionController {
    /// Creates a controller in the Unauthenticated state.
    pub fn new(
        api: Arc<dyn DatasetApi>,
        report_sink: Arc<dyn ReportSink>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            api,
            report_sink,
            settings,
            state: Arc::new(RwLock::new(ClientState::new())),
            epoch: Arc::new(AtomicU64::new(0)),
            uploading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    // ============================================================================
    // Read access
    // ============================================================================

    /// Returns a copy of the whole client state.
    pub async fn snapshot(&self) -> ClientState {
        self.state.read().await.clone()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.read().await.phase()
    }

    pub async fn status(&self) -> Option<StatusMessage> {
        self.state.read().await.status.clone()
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.state.read().await.history.clone()
    }

    pub async fn selection(&self) -> Option<DatasetId> {
        self.state.read().await.selection
    }

    pub async fn summary(&self) -> Option<Summary> {
        self.state.read().await.summary.clone()
    }

    /// Chart projections of the displayed summary, recomputed on every call.
    pub async fn chart_projections(&self) -> Option<ChartProjections> {
        self.state
            .read()
            .await
            .summary
            .as_ref()
            .map(derive_chart_projections)
    }

    // ============================================================================
    // Authentication
    // ============================================================================

    /// Verifies credentials by reading the protected history endpoint.
    ///
    /// On success the session starts with the fetched history and, when
    /// `auto_select_newest` is set, the newest entry is loaded. On failure the
    /// session state is left as it was and an `Auth` error is returned.
    pub async fn verify(&self, username: &str, password: &str) -> Result<Session> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return self
                .fail(
                    messages::CREDENTIALS_REQUIRED,
                    ChemVizError::validation(messages::CREDENTIALS_REQUIRED),
                )
                .await;
        }

        let credentials = Credentials::new(username, password);
        tracing::info!("[SessionController] Verifying credentials for '{}'", username);

        let history = match self.api.fetch_history(&credentials).await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!("[SessionController] Login failed for '{}': {}", username, e);
                let error = if e.is_auth() {
                    e
                } else {
                    ChemVizError::auth(e.to_string())
                };
                return self.fail(messages::LOGIN_FAILED, error).await;
            }
        };

        let session = Session {
            credentials,
            authenticated_at: Utc::now(),
        };
        let newest = {
            let mut state = self.state.write().await;
            state.begin_session(session.credentials.clone(), session.authenticated_at);
            self.epoch.fetch_add(1, Ordering::SeqCst);
            state.replace_history(history);
            state.set_status(StatusMessage::success(messages::LOGIN_SUCCESS));
            state.history.first().map(|entry| entry.id)
        };
        tracing::info!("[SessionController] Session started for '{}'", username);

        if self.settings.auto_select_newest {
            if let Some(id) = newest {
                // A failed load is reported on the status line; the login stands.
                let _ = self.fetch_summary(id).await;
            }
        }

        Ok(session)
    }

    /// Creates an account. Does not log in.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<RegistrationResult> {
        let username = username.trim();
        if username.is_empty() {
            return self
                .fail(
                    messages::CREDENTIALS_REQUIRED,
                    ChemVizError::validation(messages::CREDENTIALS_REQUIRED),
                )
                .await;
        }

        let min_length = self.settings.min_password_length;
        if password.chars().count() < min_length {
            let text = messages::password_too_short(min_length);
            return self.fail(text.clone(), ChemVizError::validation(text)).await;
        }

        let registration = Registration {
            username: username.to_string(),
            password: password.to_string(),
            email: email
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        };

        match self.api.register(&registration).await {
            Ok(result) => {
                tracing::info!("[SessionController] Registered '{}'", username);
                let text = if result.message.trim().is_empty() {
                    messages::REGISTRATION_SUCCESS.to_string()
                } else {
                    result.message.clone()
                };
                self.set_status(StatusMessage::success(text)).await;
                Ok(result)
            }
            Err(e) => {
                tracing::warn!("[SessionController] Registration failed: {}", e);
                let text = match &e {
                    ChemVizError::Validation(message) => message.clone(),
                    other => other.to_string(),
                };
                self.fail(text, e).await
            }
        }
    }

    /// Drops the session and everything scoped to it.
    pub async fn logout(&self) {
        let mut state = self.state.write().await;
        state.clear();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        tracing::info!("[SessionController] Session cleared");
    }

    // ============================================================================
    // History
    // ============================================================================

    /// Replaces the local history with the backend's. Prior history survives a failure.
    pub async fn refresh_history(&self) -> Result<Vec<HistoryEntry>> {
        let (credentials, epoch) = self.session_credentials().await?;

        match self.api.fetch_history(&credentials).await {
            Ok(entries) => {
                let mut state = self.state.write().await;
                if self.is_current(epoch) {
                    state.replace_history(entries.clone());
                    tracing::debug!(
                        "[SessionController] History refreshed ({} entries)",
                        entries.len()
                    );
                }
                Ok(entries)
            }
            Err(e) => {
                tracing::warn!("[SessionController] History fetch failed: {}", e);
                self.fail_for(epoch, messages::HISTORY_FAILED, e).await
            }
        }
    }

    pub async fn delete_entry(&self, id: DatasetId) -> Result<()> {
        let (credentials, epoch) = self.session_credentials().await?;

        if let Err(e) = self.api.delete_entry(&credentials, id).await {
            tracing::warn!("[SessionController] Delete of dataset {} failed: {}", id, e);
            return self.fail_for(epoch, messages::delete_failed(id), e).await;
        }
        tracing::info!("[SessionController] Deleted dataset {}", id);

        {
            let mut state = self.state.write().await;
            if !self.is_current(epoch) {
                return Ok(());
            }
            if state.selection == Some(id) {
                if self.settings.invalidate_selection_on_delete {
                    state.invalidate_selection();
                } else {
                    tracing::debug!(
                        "[SessionController] Keeping selection of deleted dataset {}",
                        id
                    );
                }
            }
        }

        self.refresh_history().await?;
        self.succeed_for(epoch, messages::entry_deleted(id)).await;
        Ok(())
    }

    // ============================================================================
    // Upload pipeline
    // ============================================================================

    /// Sets the file the next [`upload`](Self::upload) sends.
    pub async fn select_file(&self, file: UploadFile) {
        let mut state = self.state.write().await;
        state.set_status(StatusMessage::info(messages::file_selected(&file.file_name)));
        state.pending_file = Some(file);
    }

    pub async fn clear_file(&self) {
        self.state.write().await.pending_file = None;
    }

    /// Uploads the selected file, then refreshes history and loads the new
    /// entry's summary, in that order.
    ///
    /// A failed upload leaves selection, history and the chosen file as they
    /// were. Once the upload itself succeeds the entry is returned even if the
    /// follow-up loads fail; those failures show on the status line, a failed
    /// history refresh taking precedence over the summary outcome.
    pub async fn upload(&self) -> Result<HistoryEntry> {
        let (credentials, epoch) = self.session_credentials().await?;

        let file = self.state.read().await.pending_file.clone();
        let Some(file) = file.filter(|f| !f.is_empty()) else {
            return self
                .fail(
                    messages::SELECT_FILE_FIRST,
                    ChemVizError::validation(messages::SELECT_FILE_FIRST),
                )
                .await;
        };

        if self.uploading.swap(true, Ordering::SeqCst) {
            return self
                .fail(
                    messages::UPLOAD_IN_PROGRESS,
                    ChemVizError::validation(messages::UPLOAD_IN_PROGRESS),
                )
                .await;
        }
        let _guard = UploadGuard(&self.uploading);

        self.set_status(StatusMessage::info(messages::UPLOADING)).await;
        tracing::info!(
            "[SessionController] Uploading {} ({} bytes)",
            file.file_name,
            file.bytes.len()
        );

        let entry = match self.api.upload(&credentials, &file).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("[SessionController] Upload failed: {}", e);
                let text = e.upload_message().unwrap_or_else(|| e.to_string());
                return self.fail_for(epoch, text, e).await;
            }
        };
        tracing::info!(
            "[SessionController] Uploaded {} as dataset {}",
            entry.name,
            entry.id
        );

        {
            let mut state = self.state.write().await;
            if !self.is_current(epoch) {
                return Ok(entry);
            }
            // A file picked while the upload ran is kept.
            if state.pending_file.as_ref() == Some(&file) {
                state.pending_file = None;
            }
        }

        let history_refreshed = match self.refresh_history().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    "[SessionController] History refresh after upload failed: {}",
                    e
                );
                false
            }
        };

        let summary_loaded = self.fetch_summary(entry.id).await.is_ok();

        // A failed refresh outranks a loaded summary; the history is stale.
        if !history_refreshed {
            self.report_for(
                epoch,
                StatusMessage::error(messages::upload_history_failed(&entry.name)),
            )
            .await;
        } else if summary_loaded {
            self.succeed_for(epoch, messages::upload_success(&entry.name))
                .await;
        }

        Ok(entry)
    }

    // ============================================================================
    // Summary and report
    // ============================================================================

    /// Selects `id` and loads its summary.
    ///
    /// The previous summary is dropped before the request goes out. The
    /// result is stored only if `id` is still selected when it arrives; a
    /// stale result is still returned to the caller.
    pub async fn fetch_summary(&self, id: DatasetId) -> Result<Summary> {
        let (credentials, epoch) = {
            let mut state = self.state.write().await;
            let Some(credentials) = state.credentials().cloned() else {
                state.set_status(StatusMessage::error(messages::NOT_LOGGED_IN));
                return Err(ChemVizError::NotAuthenticated);
            };
            state.begin_summary_fetch(id);
            state.set_status(StatusMessage::info(messages::loading_summary(id)));
            (credentials, self.epoch.load(Ordering::SeqCst))
        };

        tracing::debug!("[SessionController] Fetching summary for dataset {}", id);
        let result = self.api.fetch_summary(&credentials, id).await;

        let mut state = self.state.write().await;
        let current = self.is_current(epoch);
        match result {
            Ok(summary) => {
                if current && state.complete_summary_fetch(id, summary.clone()) {
                    state.set_status(StatusMessage::success(messages::summary_loaded(id)));
                    tracing::info!("[SessionController] Loaded summary for dataset {}", id);
                } else {
                    tracing::debug!(
                        "[SessionController] Dropping stale summary for dataset {}",
                        id
                    );
                }
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!(
                    "[SessionController] Summary fetch for dataset {} failed: {}",
                    id,
                    e
                );
                if current && state.fail_summary_fetch(id) {
                    state.set_status(StatusMessage::error(messages::SUMMARY_FAILED));
                }
                Err(e)
            }
        }
    }

    /// Downloads the PDF report for `id` and hands it to the report sink.
    ///
    /// Only the status line changes.
    pub async fn download_report(&self, id: DatasetId) -> Result<PathBuf> {
        let (credentials, epoch) = self.session_credentials().await?;
        tracing::info!("[SessionController] Downloading report for dataset {}", id);

        let payload = match self.api.download_report(&credentials, id).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("[SessionController] Report download failed: {}", e);
                return self.fail_for(epoch, messages::REPORT_FAILED, e).await;
            }
        };

        let filename = report_filename(payload.content_disposition.as_deref(), id);
        match self.report_sink.save(&filename, &payload.bytes).await {
            Ok(path) => {
                let shown = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or(filename);
                self.succeed_for(epoch, messages::report_saved(&shown)).await;
                Ok(path)
            }
            Err(e) => {
                tracing::warn!("[SessionController] Saving report failed: {}", e);
                self.fail_for(epoch, messages::REPORT_FAILED, e).await
            }
        }
    }

    // ============================================================================
    // Helpers
    // ============================================================================

    /// Credentials of the active session and the epoch they belong to.
    async fn session_credentials(&self) -> Result<(Credentials, u64)> {
        let found = {
            let state = self.state.read().await;
            state
                .credentials()
                .cloned()
                .map(|credentials| (credentials, self.epoch.load(Ordering::SeqCst)))
        };
        match found {
            Some(found) => Ok(found),
            None => {
                self.fail(messages::NOT_LOGGED_IN, ChemVizError::NotAuthenticated)
                    .await
            }
        }
    }

    /// Must be called with the state lock held.
    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    async fn set_status(&self, status: StatusMessage) {
        self.state.write().await.set_status(status);
    }

    async fn fail<T>(&self, text: impl Into<String>, error: ChemVizError) -> Result<T> {
        self.set_status(StatusMessage::error(text)).await;
        Err(error)
    }

    /// Like `fail`, but leaves the status alone if the session has changed.
    async fn fail_for<T>(
        &self,
        epoch: u64,
        text: impl Into<String>,
        error: ChemVizError,
    ) -> Result<T> {
        let mut state = self.state.write().await;
        if self.is_current(epoch) {
            state.set_status(StatusMessage::error(text));
        }
        Err(error)
    }

    async fn succeed_for(&self, epoch: u64, text: impl Into<String>) {
        self.report_for(epoch, StatusMessage::success(text)).await;
    }

    /// Sets the status unless the session has changed since `epoch`.
    async fn report_for(&self, epoch: u64, status: StatusMessage) {
        let mut state = self.state.write().await;
        if self.is_current(epoch) {
            state.set_status(status);
        }
    }
}
