use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend identifier of an uploaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub i64);

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DatasetId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(DatasetId)
    }
}

impl From<i64> for DatasetId {
    fn from(value: i64) -> Self {
        DatasetId(value)
    }
}

/// Metadata record for one previously uploaded dataset.
///
/// The backend returns these newest first and keeps at most
/// [`HISTORY_WINDOW`] per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: DatasetId,
    pub name: String,
    /// Absent on some upload responses.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub username: Option<String>,
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` read as UTC. Anything else is dropped.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    Ok(NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc()))
}

/// Number of entries the backend keeps in a user's history.
pub const HISTORY_WINDOW: usize = 5;

/// A file picked for upload, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Body of a registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Successful registration reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegistrationResult {
    #[serde(default)]
    pub message: String,
}

/// Raw report bytes plus the header the filename may come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPayload {
    pub bytes: Vec<u8>,
    pub content_disposition: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_entry_from_backend_json() {
        let json = r#"{
            "id": 1,
            "username": "alice",
            "name": "batch1.csv",
            "timestamp": "2024-01-01T00:00:00Z",
            "summary_data": {"total_records": 3},
            "file_path": "/media/1_batch1.csv"
        }"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, DatasetId(1));
        assert_eq!(entry.name, "batch1.csv");
        assert_eq!(entry.username.as_deref(), Some("alice"));
        assert!(entry.timestamp.is_some());
    }

    #[test]
    fn test_history_entry_without_timestamp() {
        let entry: HistoryEntry = serde_json::from_str(r#"{"id": 7, "name": "batch2.csv"}"#).unwrap();
        assert_eq!(entry.id, DatasetId(7));
        assert!(entry.timestamp.is_none());
    }

    #[test]
    fn test_history_entry_with_naive_timestamp() {
        let entry: HistoryEntry = serde_json::from_str(
            r#"{"id": 2, "name": "b.csv", "timestamp": "2024-03-05T10:20:30.123456"}"#,
        )
        .unwrap();
        let timestamp = entry.timestamp.unwrap();
        assert_eq!(timestamp.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-05 10:20:30");

        let odd: HistoryEntry =
            serde_json::from_str(r#"{"id": 3, "name": "c.csv", "timestamp": "yesterday"}"#).unwrap();
        assert!(odd.timestamp.is_none());
    }

    #[test]
    fn test_dataset_id_parse() {
        assert_eq!(" 42 ".parse::<DatasetId>().unwrap(), DatasetId(42));
        assert!("abc".parse::<DatasetId>().is_err());
    }

    #[test]
    fn test_registration_omits_missing_email() {
        let registration = Registration {
            username: "bob".into(),
            password: "hunter22".into(),
            email: None,
        };
        let json = serde_json::to_value(&registration).unwrap();
        assert!(json.get("email").is_none());
    }
}
