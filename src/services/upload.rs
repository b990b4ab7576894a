use super::client::{ClientError, DetectionApi, UPLOAD_FIELD, UploadBody, UploadForm};
use crate::models::{Payload, RemoteFileId, SelectedFile};
use std::sync::Arc;
use thiserror::Error;

/// Message used when the server gives no reason of its own.
pub const GENERIC_UPLOAD_FAILURE: &str = "Upload failed";

/// Errors that can occur while uploading
#[derive(Error, Debug)]
pub enum UploadError {
    /// Non-2xx, malformed body, or no file identifier
    #[error("{0}")]
    Rejected(String),

    #[error("Failed to read {file}: {source}")]
    Read {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Transport(#[from] ClientError),
}

/// Turns a validated file into a [`RemoteFileId`].
///
/// One attempt per call; there is no retry.
pub struct UploadCoordinator<A: ?Sized> {
    api: Arc<A>,
}

impl<A: DetectionApi + ?Sized> UploadCoordinator<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub async fn upload(&self, file: &SelectedFile) -> Result<RemoteFileId, UploadError> {
        let body = open_body(file.payload())
            .await
            .map_err(|source| UploadError::Read {
                file: file.name().to_string(),
                source,
            })?;

        let form = UploadForm {
            field: UPLOAD_FIELD,
            file_name: file.name().to_string(),
            media_type: file.media_type().to_string(),
            body,
        };

        tracing::info!("Uploading {} ({} bytes)", file.name(), file.size());
        let reply = self.api.upload(form).await?;

        let server_message = reply.body.as_ref().and_then(|b| b.error.clone());

        if !reply.is_success() {
            tracing::warn!("Upload rejected with HTTP {}", reply.status);
            return Err(UploadError::Rejected(
                server_message.unwrap_or_else(|| GENERIC_UPLOAD_FAILURE.to_string()),
            ));
        }

        match reply.body.and_then(|b| b.file_id).filter(|id| !id.is_empty()) {
            Some(id) => {
                tracing::info!("Upload accepted as {}", id);
                Ok(RemoteFileId::new(id))
            }
            None => {
                tracing::warn!("Upload reply (HTTP {}) carried no file id", reply.status);
                Err(UploadError::Rejected(
                    server_message.unwrap_or_else(|| GENERIC_UPLOAD_FAILURE.to_string()),
                ))
            }
        }
    }
}

/// Open a payload for sending. Disk files are streamed, not read up front.
async fn open_body(payload: &Payload) -> std::io::Result<UploadBody> {
    match payload {
        Payload::Memory(bytes) => Ok(UploadBody::Memory(bytes.clone())),
        Payload::Disk(path) => {
            let file = tokio::fs::File::open(path).await?;
            let len = file.metadata().await?.len();
            Ok(UploadBody::Disk { file, len })
        }
    }
}

impl<A: ?Sized> Clone for UploadCoordinator<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateFile, ProcessingResult};
    use crate::services::client::{ApiReply, ProcessRequest, UploadResponse};
    use crate::services::FileValidator;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with a canned upload response and records the form it saw.
    struct CannedUpload {
        reply: Mutex<Option<Result<ApiReply<UploadResponse>, ClientError>>>,
        seen: Mutex<Option<UploadForm>>,
    }

    impl CannedUpload {
        fn new(reply: Result<ApiReply<UploadResponse>, ClientError>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                seen: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl DetectionApi for CannedUpload {
        async fn health(&self) -> Result<u16, ClientError> {
            Ok(200)
        }

        async fn upload(&self, form: UploadForm) -> Result<ApiReply<UploadResponse>, ClientError> {
            *self.seen.lock().unwrap() = Some(form);
            self.reply.lock().unwrap().take().expect("upload called twice")
        }

        async fn process(
            &self,
            _request: ProcessRequest,
        ) -> Result<ApiReply<ProcessingResult>, ClientError> {
            unreachable!("upload tests never process")
        }
    }

    fn file() -> SelectedFile {
        FileValidator::new()
            .validate(CandidateFile::from_bytes("clip.mp4", "video/mp4", vec![1, 2, 3]))
            .unwrap()
    }

    fn body(file_id: Option<&str>, error: Option<&str>) -> Option<UploadResponse> {
        Some(UploadResponse {
            file_id: file_id.map(str::to_string),
            error: error.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_upload_returns_file_id() {
        let api = CannedUpload::new(Ok(ApiReply::new(200, body(Some("abc123"), None))));
        let coordinator = UploadCoordinator::new(api.clone());

        let id = coordinator.upload(&file()).await.unwrap();

        assert_eq!(id, RemoteFileId::new("abc123"));
        let form = api.seen.lock().unwrap().take().unwrap();
        assert_eq!(form.field, "file");
        assert_eq!(form.file_name, "clip.mp4");
        assert_eq!(form.media_type, "video/mp4");
        assert!(matches!(form.body, UploadBody::Memory(ref b) if b.as_ref() == [1, 2, 3]));
    }

    #[tokio::test]
    async fn test_server_message_is_carried() {
        let api = CannedUpload::new(Ok(ApiReply::new(500, body(None, Some("disk full")))));
        let err = UploadCoordinator::new(api).upload(&file()).await.unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }

    #[tokio::test]
    async fn test_non_2xx_without_message_is_generic() {
        let api = CannedUpload::new(Ok(ApiReply::new(502, None)));
        let err = UploadCoordinator::new(api).upload(&file()).await.unwrap_err();
        assert_eq!(err.to_string(), GENERIC_UPLOAD_FAILURE);
    }

    #[tokio::test]
    async fn test_missing_file_id_is_rejected() {
        let api = CannedUpload::new(Ok(ApiReply::new(200, body(None, None))));
        let err = UploadCoordinator::new(api).upload(&file()).await.unwrap_err();
        assert!(matches!(err, UploadError::Rejected(ref m) if m == GENERIC_UPLOAD_FAILURE));
    }

    #[tokio::test]
    async fn test_empty_file_id_is_rejected() {
        let api = CannedUpload::new(Ok(ApiReply::new(200, body(Some(""), None))));
        let err = UploadCoordinator::new(api).upload(&file()).await.unwrap_err();
        assert!(matches!(err, UploadError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let api = CannedUpload::new(Ok(ApiReply::new(200, None)));
        let err = UploadCoordinator::new(api).upload(&file()).await.unwrap_err();
        assert_eq!(err.to_string(), GENERIC_UPLOAD_FAILURE);
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let api = CannedUpload::new(Err(ClientError::Network("connection refused".into())));
        let err = UploadCoordinator::new(api).upload(&file()).await.unwrap_err();
        assert!(matches!(err, UploadError::Transport(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_missing_disk_file() {
        let candidate = CandidateFile {
            payload: crate::models::Payload::Disk("/nonexistent/clip.mp4".into()),
            ..CandidateFile::from_bytes("clip.mp4", "video/mp4", vec![0; 4])
        };
        let file = FileValidator::new().validate(candidate).unwrap();
        let api = CannedUpload::new(Ok(ApiReply::new(200, body(Some("x"), None))));

        let err = UploadCoordinator::new(api).upload(&file).await.unwrap_err();
        assert!(matches!(err, UploadError::Read { .. }));
    }

    #[tokio::test]
    async fn test_disk_payload_is_opened_not_buffered() {
        use std::io::Write;
        let mut temp = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
        temp.write_all(&[5u8; 300]).unwrap();
        let path = camino::Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();

        let candidate = CandidateFile::from_path(&path, None).await.unwrap();
        let file = FileValidator::new().validate(candidate).unwrap();
        let api = CannedUpload::new(Ok(ApiReply::new(200, body(Some("d1"), None))));

        UploadCoordinator::new(api.clone()).upload(&file).await.unwrap();

        let form = api.seen.lock().unwrap().take().unwrap();
        assert!(matches!(form.body, UploadBody::Disk { len: 300, .. }));
    }
}
