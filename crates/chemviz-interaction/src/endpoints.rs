//! URL construction for the backend REST API.

use chemviz_core::config::ResourceStyle;
use chemviz_core::dataset::DatasetId;

/// Builds endpoint URLs from a configurable base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
    style: ResourceStyle,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>, style: ResourceStyle) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self { base_url, style }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn history(&self) -> String {
        format!("{}/history/", self.base_url)
    }

    pub fn history_entry(&self, id: DatasetId) -> String {
        format!("{}/history/{}/", self.base_url, id)
    }

    pub fn register(&self) -> String {
        format!("{}/register/", self.base_url)
    }

    pub fn upload(&self) -> String {
        format!("{}/upload/", self.base_url)
    }

    pub fn summary(&self, id: DatasetId) -> String {
        self.resource("summary", id)
    }

    pub fn report(&self, id: DatasetId) -> String {
        self.resource("report", id)
    }

    fn resource(&self, name: &str, id: DatasetId) -> String {
        match self.style {
            ResourceStyle::Path => format!("{}/{}/{}/", self.base_url, name, id),
            ResourceStyle::Query => format!("{}/{}/?id={}", self.base_url, name, id),
        }
    }
}
