//! HTTP-backed processor client.
//!
//! Talks to the document processing service's `:process` endpoint with
//! a pre-provisioned bearer token. Credential *provisioning* (service
//! accounts, token refresh) happens outside this crate; we only read
//! the token material the deployment dropped on disk.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{ConfigError, ServiceError};
use crate::service::client::ProcessorClient;
use crate::service::types::{BoundingBox, DetectedImage, PageRaster, RawEntity, RawTable, ServiceResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

pub struct HttpProcessorClient {
    http: reqwest::blocking::Client,
    process_url: String,
    token: String,
}

impl HttpProcessorClient {
    pub fn new(endpoint: &str, processor_path: &str, token: String) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        Self {
            http,
            process_url: format!(
                "{}/v1/{}:process",
                endpoint.trim_end_matches('/'),
                processor_path
            ),
            token,
        }
    }

    /// Builds a client from a validated [`Config`], reading the bearer
    /// token from the configured credentials file.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let token = read_token(Path::new(&config.credentials_path))?;
        Ok(Self::new(
            &config.service_endpoint(),
            &config.processor_path(),
            token,
        ))
    }

    pub fn process_url(&self) -> &str {
        &self.process_url
    }

    fn map_status(status: reqwest::StatusCode, body: String) -> ServiceError {
        match status.as_u16() {
            401 | 403 => ServiceError::Auth(body),
            400 | 415 => ServiceError::UnsupportedFormat(body),
            429 => ServiceError::Quota(body),
            _ => ServiceError::Transient(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl ProcessorClient for HttpProcessorClient {
    fn process(&self, file_bytes: &[u8], mime_type: &str) -> Result<ServiceResult, ServiceError> {
        let request = ProcessRequest {
            raw_document: WireRawDocument {
                content: base64::engine::general_purpose::STANDARD.encode(file_bytes),
                mime_type: mime_type.to_string(),
            },
        };

        let response = self
            .http
            .post(&self.process_url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .map_err(|e| ServiceError::Transient(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Self::map_status(status, body));
        }

        let wire: ProcessResponse = response
            .json()
            .map_err(|e| ServiceError::Transient(format!("malformed service response: {}", e)))?;

        wire.document.into_service_result()
    }
}

/// Reads bearer token material from the credentials file: either a JSON
/// object carrying a `token`/`access_token` field, or the raw token.
fn read_token(path: &Path) -> Result<String, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&contents) {
        for key in ["token", "access_token"] {
            if let Some(token) = value.get(key).and_then(|v| v.as_str()) {
                return Ok(token.to_string());
            }
        }
    }

    Ok(contents.trim().to_string())
}

// ─── Wire format ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest {
    raw_document: WireRawDocument,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRawDocument {
    content: String,
    mime_type: String,
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    document: WireDocument,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireDocument {
    text: String,
    entities: Vec<WireEntity>,
    tables: Vec<WireTable>,
    images: Vec<WireImage>,
    pages: Vec<WirePage>,
    processor_version: Option<String>,
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEntity {
    #[serde(rename = "type")]
    type_label: String,
    #[serde(default)]
    mention_text: String,
    #[serde(default)]
    normalized_value: Option<String>,
    #[serde(default)]
    confidence: f64,
    #[serde(default = "default_page")]
    page_number: u32,
    #[serde(default)]
    bounding_box: Option<BoundingBox>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTable {
    #[serde(default = "default_page")]
    page_number: u32,
    bounding_box: BoundingBox,
    #[serde(default)]
    headers: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<String>>,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireImage {
    #[serde(default = "default_page")]
    page_number: u32,
    bounding_box: BoundingBox,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePage {
    page_number: u32,
    width: u32,
    height: u32,
    /// Base64-encoded raster bytes.
    content: String,
}

fn default_page() -> u32 {
    1
}

impl WireDocument {
    fn into_service_result(self) -> Result<ServiceResult, ServiceError> {
        let mut pages = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let data = base64::engine::general_purpose::STANDARD
                .decode(&page.content)
                .map_err(|e| {
                    ServiceError::Transient(format!(
                        "invalid raster encoding on page {}: {}",
                        page.page_number, e
                    ))
                })?;
            pages.push(PageRaster {
                page_number: page.page_number,
                width: page.width,
                height: page.height,
                data,
            });
        }

        Ok(ServiceResult {
            text: self.text,
            entities: self
                .entities
                .into_iter()
                .map(|e| RawEntity {
                    type_label: e.type_label,
                    mention_text: e.mention_text,
                    normalized_value: e.normalized_value,
                    confidence: e.confidence,
                    page_number: e.page_number,
                    bounding_box: e.bounding_box,
                })
                .collect(),
            tables: self
                .tables
                .into_iter()
                .map(|t| RawTable {
                    page_number: t.page_number,
                    bounding_box: t.bounding_box,
                    headers: t.headers,
                    rows: t.rows,
                    confidence: t.confidence,
                })
                .collect(),
            images: self
                .images
                .into_iter()
                .map(|i| DetectedImage {
                    page_number: i.page_number,
                    bounding_box: i.bounding_box,
                    caption: i.caption,
                    confidence: i.confidence,
                })
                .collect(),
            pages,
            processor_version: self.processor_version,
            confidence: self.confidence.unwrap_or(0.0),
        })
    }
}
