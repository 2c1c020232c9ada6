//! Client-side session state and its transitions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

use super::status::StatusMessage;
use crate::credentials::Credentials;
use crate::dataset::{DatasetId, HistoryEntry, Summary, UploadFile};

/// Record that the user has proven credentials to the backend.
///
/// Lives in memory only; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub credentials: Credentials,
    pub authenticated_at: DateTime<Utc>,
}

/// Coarse state of the client, derived from [`ClientState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum SessionPhase {
    Unauthenticated,
    #[strum(serialize = "Authenticated-NoSelection")]
    NoSelection,
    #[strum(serialize = "Authenticated-Loading")]
    Loading,
    #[strum(serialize = "Authenticated-Viewing")]
    Viewing,
}

/// Everything the client holds for one session.
///
/// `summary`, when present, always belongs to `selection`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    pub session: Option<Session>,
    /// Newest first, replaced wholesale on every fetch.
    pub history: Vec<HistoryEntry>,
    pub selection: Option<DatasetId>,
    pub summary: Option<Summary>,
    /// Id whose summary fetch is in flight and still wanted.
    pub pending_summary: Option<DatasetId>,
    /// File chosen for the next upload.
    pub pending_file: Option<UploadFile>,
    pub status: Option<StatusMessage>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.session.is_none() {
            SessionPhase::Unauthenticated
        } else if self.pending_summary.is_some() {
            SessionPhase::Loading
        } else if self.summary.is_some() {
            SessionPhase::Viewing
        } else {
            SessionPhase::NoSelection
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.session.as_ref().map(|s| &s.credentials)
    }

    /// Starts a fresh session. Any leftover state is dropped.
    pub fn begin_session(&mut self, credentials: Credentials, now: DateTime<Utc>) {
        *self = Self {
            session: Some(Session {
                credentials,
                authenticated_at: now,
            }),
            ..Self::default()
        };
    }

    /// Drops all session-scoped state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn replace_history(&mut self, entries: Vec<HistoryEntry>) {
        self.history = entries;
    }

    pub fn history_entry(&self, id: DatasetId) -> Option<&HistoryEntry> {
        self.history.iter().find(|entry| entry.id == id)
    }

    /// Selects `id` and drops whatever summary was displayed.
    pub fn begin_summary_fetch(&mut self, id: DatasetId) {
        self.selection = Some(id);
        self.summary = None;
        self.pending_summary = Some(id);
    }

    /// Stores a fetched summary if `id` is still selected.
    ///
    /// Returns false when the result is stale and was dropped.
    pub fn complete_summary_fetch(&mut self, id: DatasetId, summary: Summary) -> bool {
        if self.selection != Some(id) {
            return false;
        }
        self.summary = Some(summary);
        self.pending_summary = None;
        true
    }

    /// Records a failed fetch if `id` is still selected. Summary stays empty.
    pub fn fail_summary_fetch(&mut self, id: DatasetId) -> bool {
        if self.selection != Some(id) {
            return false;
        }
        self.summary = None;
        self.pending_summary = None;
        true
    }

    pub fn invalidate_selection(&mut self) {
        self.selection = None;
        self.summary = None;
        self.pending_summary = None;
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }
}
