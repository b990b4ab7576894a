//! HTTP access to the detection service.
//!
//! [`DetectionApi`] is the seam the orchestrator depends on; [`HttpClient`] is
//! the reqwest implementation. Responses are returned with their HTTP status and
//! a body that is `None` when it could not be parsed, so callers decide what a
//! non-2xx or malformed reply means.

use crate::models::{ApiSettings, FRAME_SKIP, ProcessingResult, RemoteFileId};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::Part;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio_util::io::ReaderStream;

/// Multipart field name the upload endpoint reads the file from.
pub const UPLOAD_FIELD: &str = "file";

pub const HEALTH_PATH: &str = "health";
pub const UPLOAD_PATH: &str = "upload";
pub const PROCESS_PATH: &str = "process/realtime";

/// Transport-level failures.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Status code plus parsed body of a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply<T> {
    pub status: u16,
    /// `None` when the body was empty or not the expected JSON
    pub body: Option<T>,
}

impl<T> ApiReply<T> {
    pub fn new(status: u16, body: Option<T>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Contents of the uploaded file part.
#[derive(Debug)]
pub enum UploadBody {
    /// In-memory bytes, sent without copying
    Memory(Bytes),
    /// Open file streamed in chunks; `len` is its size when opened
    Disk { file: tokio::fs::File, len: u64 },
}

impl UploadBody {
    /// Byte length of the part.
    pub fn len(&self) -> u64 {
        match self {
            UploadBody::Memory(bytes) => bytes.len() as u64,
            UploadBody::Disk { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_part(self) -> Part {
        match self {
            UploadBody::Memory(bytes) => {
                let len = bytes.len() as u64;
                Part::stream_with_length(bytes, len)
            }
            UploadBody::Disk { file, len } => Part::stream_with_length(
                reqwest::Body::wrap_stream(ReaderStream::new(file)),
                len,
            ),
        }
    }
}

/// Multipart upload payload: one file under [`UPLOAD_FIELD`].
#[derive(Debug)]
pub struct UploadForm {
    pub field: &'static str,
    pub file_name: String,
    pub media_type: String,
    pub body: UploadBody,
}

/// Body of `POST /upload`, on success or failure.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// JSON body of `POST /process/realtime`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessRequest {
    pub file_id: RemoteFileId,
    pub frame_skip: u32,
}

impl ProcessRequest {
    /// Request for `file_id` with the fixed frame-skip factor.
    pub fn new(file_id: RemoteFileId) -> Self {
        Self {
            file_id,
            frame_skip: FRAME_SKIP,
        }
    }
}

/// The three remote calls the client makes.
#[async_trait]
pub trait DetectionApi: Send + Sync {
    /// `GET /health`; returns the status code.
    async fn health(&self) -> Result<u16, ClientError>;

    /// `POST /upload` with a multipart body.
    async fn upload(&self, form: UploadForm) -> Result<ApiReply<UploadResponse>, ClientError>;

    /// `POST /process/realtime` with a JSON body.
    async fn process(
        &self,
        request: ProcessRequest,
    ) -> Result<ApiReply<ProcessingResult>, ClientError>;
}

/// reqwest-backed [`DetectionApi`].
///
/// Only connection setup is time-limited; a processing call waits for the
/// service however long detection takes.
#[derive(Debug, Clone)]
pub struct HttpClient {
    settings: ApiSettings,
    http_client: reqwest::Client,
}

impl HttpClient {
    pub fn new(settings: ApiSettings) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            settings,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    async fn read_reply<T>(response: reqwest::Response) -> Result<ApiReply<T>, ClientError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let body = match serde_json::from_str::<T>(&text) {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!("Unparseable response body (HTTP {}): {}", status, e);
                None
            }
        };

        Ok(ApiReply::new(status, body))
    }
}

#[async_trait]
impl DetectionApi for HttpClient {
    async fn health(&self) -> Result<u16, ClientError> {
        let url = self.settings.endpoint(HEALTH_PATH);
        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(response.status().as_u16())
    }

    async fn upload(&self, form: UploadForm) -> Result<ApiReply<UploadResponse>, ClientError> {
        let url = self.settings.endpoint(UPLOAD_PATH);
        tracing::debug!(
            "POST {} ({} bytes, {}, field {:?})",
            url,
            form.body.len(),
            form.media_type,
            form.field
        );

        let part = form
            .body
            .into_part()
            .file_name(form.file_name)
            .mime_str(&form.media_type)
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        let multipart = reqwest::multipart::Form::new().part(form.field, part);

        let response = self
            .http_client
            .post(&url)
            .multipart(multipart)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::read_reply(response).await
    }

    async fn process(
        &self,
        request: ProcessRequest,
    ) -> Result<ApiReply<ProcessingResult>, ClientError> {
        let url = self.settings.endpoint(PROCESS_PATH);
        tracing::debug!("POST {} (file_id={}, frame_skip={})", url, request.file_id, request.frame_skip);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::read_reply(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_request_uses_fixed_frame_skip() {
        let request = ProcessRequest::new(RemoteFileId::new("abc123"));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "file_id": "abc123", "frame_skip": 2 }));
    }

    #[test]
    fn test_reply_success_range() {
        assert!(ApiReply::<()>::new(200, None).is_success());
        assert!(ApiReply::<()>::new(204, None).is_success());
        assert!(!ApiReply::<()>::new(302, None).is_success());
        assert!(!ApiReply::<()>::new(500, None).is_success());
    }

    #[test]
    fn test_upload_response_shapes() {
        let ok: UploadResponse =
            serde_json::from_str(r#"{"success":true,"file_id":"f1","filename":"f1"}"#).unwrap();
        assert_eq!(ok.file_id.as_deref(), Some("f1"));

        let err: UploadResponse = serde_json::from_str(r#"{"error":"disk full"}"#).unwrap();
        assert_eq!(err.error.as_deref(), Some("disk full"));
        assert!(err.file_id.is_none());
    }

    #[test]
    fn test_memory_body_length() {
        let body = UploadBody::Memory(Bytes::from_static(b"abcd"));
        assert_eq!(body.len(), 4);
        assert!(!body.is_empty());
        assert!(UploadBody::Memory(Bytes::new()).is_empty());
    }

    #[test]
    fn test_client_keeps_base_url() {
        let client = HttpClient::new(ApiSettings::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
    }
}
