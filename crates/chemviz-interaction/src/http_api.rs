//! HttpDatasetApi - `DatasetApi` over the backend's REST endpoints.
//!
//! Every protected call re-sends the HTTP Basic credentials. Transport
//! failures, timeouts included, come back as `ChemVizError::Network` (or
//! `Upload` for the upload call) so they reach the user through the same
//! status path as any other failure.

use async_trait::async_trait;
use chemviz_core::config::ApiSettings;
use chemviz_core::dataset::{
    DatasetApi, DatasetId, HistoryEntry, Registration, RegistrationResult, ReportPayload, Summary,
    UploadFile,
};
use chemviz_core::{ChemVizError, Credentials, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::endpoints::Endpoints;

pub const GENERIC_UPLOAD_ERROR: &str = "An unexpected error occurred during upload.";

/// Error body returned by the backend (`{"error": ...}` or DRF's `{"detail": ...}`).
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ServerError {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub missing: Vec<String>,
}

impl ServerError {
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.detail.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}

/// Parses a backend error body, if it is one.
pub fn parse_server_error(body: &str) -> Option<ServerError> {
    serde_json::from_str::<ServerError>(body)
        .ok()
        .filter(|e| e.message().is_some() || !e.missing.is_empty())
}

/// First message of a DRF field-error body such as `{"username": ["taken"]}`.
pub fn first_field_error(body: &str) -> Option<String> {
    let fields = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(body).ok()?;
    fields.into_iter().find_map(|(field, value)| {
        let message = match value {
            serde_json::Value::String(message) => Some(message),
            serde_json::Value::Array(items) => items
                .into_iter()
                .find_map(|item| item.as_str().map(str::to_string)),
            _ => None,
        }?;
        if field == "non_field_errors" {
            Some(message)
        } else {
            Some(format!("{}: {}", field, message))
        }
    })
}

/// Dataset API client talking HTTP to the backend.
#[derive(Clone)]
pub struct HttpDatasetApi {
    client: Client,
    endpoints: Endpoints,
    timeout: Duration,
    upload_timeout: Duration,
    report_timeout: Duration,
}

impl HttpDatasetApi {
    /// Creates a client from API settings.
    pub fn new(settings: &ApiSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(client: Client, settings: &ApiSettings) -> Self {
        tracing::info!(
            "[HttpDatasetApi] Initialized with base URL: {}",
            settings.base_url
        );
        Self {
            client,
            endpoints: Endpoints::new(settings.base_url.clone(), settings.resource_style),
            timeout: Duration::from_secs(settings.timeout_secs),
            upload_timeout: Duration::from_secs(settings.upload_timeout_secs),
            report_timeout: Duration::from_secs(settings.report_timeout_secs),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Attaches the Basic authorization header.
    fn auth_request(&self, request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
        request.header(AUTHORIZATION, credentials.authorization_header())
    }

    async fn send(&self, context: &str, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(context, &e))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(status_error(context, response).await)
        }
    }
}

fn transport_error(context: &str, err: &reqwest::Error) -> ChemVizError {
    if err.is_timeout() {
        tracing::warn!("[HttpDatasetApi] {} timed out", context);
        ChemVizError::network(format!("{}: request timed out", context))
    } else {
        tracing::warn!("[HttpDatasetApi] {} failed: {}", context, err);
        ChemVizError::network(format!("{}: {}", context, err))
    }
}

async fn status_error(context: &str, response: Response) -> ChemVizError {
    let status = response.status();
    let resource = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let server_message = parse_server_error(&body)
        .and_then(|e| e.message().map(str::to_string))
        .unwrap_or_else(|| status.to_string());

    tracing::warn!(
        "[HttpDatasetApi] {} returned {}: {}",
        context,
        status,
        server_message
    );

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ChemVizError::auth(server_message),
        StatusCode::NOT_FOUND => ChemVizError::not_found("dataset", resource),
        _ => ChemVizError::network(format!("{}: {}", context, server_message)),
    }
}

#[async_trait]
impl DatasetApi for HttpDatasetApi {
    async fn fetch_history(&self, credentials: &Credentials) -> Result<Vec<HistoryEntry>> {
        let request = self.auth_request(
            self.client
                .get(self.endpoints.history())
                .timeout(self.timeout),
            credentials,
        );
        let response = self.send("history", request).await?;
        response
            .json::<Vec<HistoryEntry>>()
            .await
            .map_err(|e| ChemVizError::network(format!("history: invalid response: {}", e)))
    }

    async fn register(&self, registration: &Registration) -> Result<RegistrationResult> {
        let response = self
            .client
            .post(self.endpoints.register())
            .json(registration)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error("register", &e))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            let result = serde_json::from_str::<RegistrationResult>(&body).unwrap_or_default();
            return Ok(result);
        }

        // Uniqueness and validity are judged by the backend.
        let message = parse_server_error(&body)
            .and_then(|e| e.message().map(str::to_string))
            .or_else(|| first_field_error(&body))
            .unwrap_or_else(|| format!("Registration failed ({})", status));
        tracing::warn!("[HttpDatasetApi] register rejected: {}", message);
        Err(ChemVizError::validation(message))
    }

    async fn upload(&self, credentials: &Credentials, file: &UploadFile) -> Result<HistoryEntry> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ChemVizError::validation(format!("Invalid MIME type: {}", e)))?;
        let form = Form::new().part("file", part);

        let request = self.auth_request(
            self.client
                .post(self.endpoints.upload())
                .multipart(form)
                .timeout(self.upload_timeout),
            credentials,
        );

        let response = request.send().await.map_err(|e| {
            tracing::warn!("[HttpDatasetApi] upload failed: {}", e);
            ChemVizError::upload(GENERIC_UPLOAD_ERROR)
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let server_error = parse_server_error(&body).unwrap_or_default();
            let message = server_error
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| GENERIC_UPLOAD_ERROR.to_string());
            tracing::warn!("[HttpDatasetApi] upload returned {}: {}", status, message);
            return Err(ChemVizError::Upload {
                message,
                missing: server_error.missing,
            });
        }

        serde_json::from_str::<HistoryEntry>(&body).map_err(|e| {
            tracing::warn!("[HttpDatasetApi] upload response unreadable: {}", e);
            ChemVizError::upload(GENERIC_UPLOAD_ERROR)
        })
    }

    async fn fetch_summary(&self, credentials: &Credentials, id: DatasetId) -> Result<Summary> {
        let request = self.auth_request(
            self.client
                .get(self.endpoints.summary(id))
                .timeout(self.timeout),
            credentials,
        );
        let response = self.send("summary", request).await?;
        response
            .json::<Summary>()
            .await
            .map_err(|e| ChemVizError::network(format!("summary: invalid response: {}", e)))
    }

    async fn download_report(
        &self,
        credentials: &Credentials,
        id: DatasetId,
    ) -> Result<ReportPayload> {
        let request = self.auth_request(
            self.client
                .get(self.endpoints.report(id))
                .timeout(self.report_timeout),
            credentials,
        );
        let response = self.send("report", request).await?;

        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error("report", &e))?;

        Ok(ReportPayload {
            bytes: bytes.to_vec(),
            content_disposition,
        })
    }

    async fn delete_entry(&self, credentials: &Credentials, id: DatasetId) -> Result<()> {
        let request = self.auth_request(
            self.client
                .delete(self.endpoints.history_entry(id))
                .timeout(self.timeout),
            credentials,
        );
        self.send("delete", request).await?;
        Ok(())
    }
}
