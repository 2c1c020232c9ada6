//! Client configuration model.
//!
//! Loaded from `config.toml`; every field has a default so a partial (or
//! missing) file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ChemVizError, Result};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub upload: UploadSettings,
    pub download: DownloadSettings,
    pub logging: LoggingSettings,
}

/// How a dataset id is placed in summary/report URLs.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStyle {
    /// `/summary/{id}/`
    #[default]
    Path,
    /// `/summary/?id={id}`
    Query,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub resource_style: ResourceStyle,
    pub timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub report_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            resource_style: ResourceStyle::Path,
            timeout_secs: 5,
            upload_timeout_secs: 30,
            report_timeout_secs: 10,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    /// After login, load the newest entry when nothing is selected.
    pub auto_select_newest: bool,
    /// Drop Selection/Summary when the selected entry is deleted.
    pub invalidate_selection_on_delete: bool,
    pub min_password_length: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            auto_select_newest: true,
            invalidate_selection_on_delete: true,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UploadSettings {
    /// Lowercase extensions without the dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            allowed_extensions: vec!["csv".into(), "xls".into(), "xlsx".into()],
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DownloadSettings {
    /// Where reports are saved; the working directory when unset.
    pub directory: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// Also write a daily rolling log file under the config directory.
    pub file: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: false,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ChemVizError::config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0
            || self.api.upload_timeout_secs == 0
            || self.api.report_timeout_secs == 0
        {
            return Err(ChemVizError::config("api timeouts must be greater than zero"));
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err(ChemVizError::config(
                "upload.allowed_extensions must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://viz.example.com/api"
            resource_style = "query"

            [session]
            invalidate_selection_on_delete = false
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://viz.example.com/api");
        assert_eq!(config.api.resource_style, ResourceStyle::Query);
        assert_eq!(config.api.timeout_secs, 5);
        assert!(!config.session.invalidate_selection_on_delete);
        assert!(config.session.auto_select_newest);
        assert_eq!(config.session.min_password_length, 6);
        assert_eq!(config.upload.allowed_extensions, vec!["csv", "xls", "xlsx"]);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = ClientConfig::default();
        config.api.base_url = "127.0.0.1:8000/api".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = ClientConfig::default();
        config.api.upload_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
