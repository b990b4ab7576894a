use bytes::Bytes;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest accepted upload, inclusive: 500 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Sampling factor sent with every processing request.
///
/// The detection service analyzes every Nth frame. Fixed at 2 (every second
/// frame), trading accuracy for speed.
pub const FRAME_SKIP: u32 = 2;

/// Where the bytes of a file live until they are uploaded.
#[derive(Clone, PartialEq, Eq)]
pub enum Payload {
    /// File on disk, opened and streamed at upload time
    Disk(Utf8PathBuf),
    /// Bytes already in memory; clones share the buffer
    Memory(Bytes),
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Disk(path) => f.debug_tuple("Disk").field(path).finish(),
            Payload::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
        }
    }
}

/// A file offered for selection, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub payload: Payload,
}

impl CandidateFile {
    /// Build a candidate from bytes held in memory.
    pub fn from_bytes(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            payload: Payload::Memory(bytes.into()),
        }
    }

    /// Build a candidate from a file on disk.
    ///
    /// The declared media type is taken from `media_type` when given, otherwise
    /// derived from the file extension with [`media_type_for_path`].
    pub async fn from_path(path: &Utf8Path, media_type: Option<&str>) -> std::io::Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        let media_type = media_type
            .map(str::to_string)
            .unwrap_or_else(|| media_type_for_path(path).to_string());

        Ok(Self {
            name: path.file_name().unwrap_or(path.as_str()).to_string(),
            media_type,
            size: metadata.len(),
            payload: Payload::Disk(path.to_path_buf()),
        })
    }
}

/// Declared media type for a path, by extension.
pub fn media_type_for_path(path: &Utf8Path) -> &'static str {
    match path.extension().map(str::to_ascii_lowercase).as_deref() {
        Some("mp4") => "video/mp4",
        Some("avi") => "video/avi",
        Some("mov") => "video/quicktime",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// A file that passed validation.
///
/// Only [`FileValidator`](crate::services::FileValidator) constructs these, so
/// holding one proves the type and size policy was checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    media_type: String,
    size: u64,
    payload: Payload,
}

impl SelectedFile {
    pub(crate) fn from_candidate(candidate: CandidateFile) -> Self {
        Self {
            name: candidate.name,
            media_type: candidate.media_type,
            size: candidate.size,
            payload: candidate.payload,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Subtype token of the declared media type (the part after the slash).
    pub fn subtype(&self) -> &str {
        subtype_token(&self.media_type)
    }
}

/// Substring after the first slash, or the whole string when there is none.
pub fn subtype_token(media_type: &str) -> &str {
    media_type
        .split_once('/')
        .map(|(_, subtype)| subtype)
        .unwrap_or(media_type)
}

/// Opaque identifier issued by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteFileId(String);

impl RemoteFileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One detection record produced by the detection service.
///
/// `estimated_speed` and `excess_speed` are required: a record without them
/// fails to deserialize and the whole response is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub frame: u64,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub is_violation: bool,
    #[serde(default)]
    pub violation_type: Option<String>,
    #[serde(default)]
    pub plate_text: Option<String>,
    #[serde(default)]
    pub plate_confidence: Option<f64>,
    pub estimated_speed: f64,
    #[serde(default)]
    pub speed_limit: Option<f64>,
    pub excess_speed: f64,
    #[serde(default)]
    pub vehicle_confidence: Option<f64>,
}

/// Body of `POST /process/realtime`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessingResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub total_frames: Option<u64>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub violations_detected: Option<u64>,
    #[serde(default)]
    pub violations: Vec<Violation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_type: Option<String>,
}

impl ProcessingResult {
    /// Violation count reported by the service, 0 when absent.
    pub fn violation_count(&self) -> u64 {
        self.violations_detected.unwrap_or(0)
    }
}
