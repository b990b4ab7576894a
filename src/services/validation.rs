use crate::models::{CandidateFile, MAX_UPLOAD_BYTES, SelectedFile, subtype_token};
use thiserror::Error;

/// Media types the detection service accepts.
///
/// Only the subtype token of each entry takes part in matching.
pub const ACCEPTED_MEDIA_TYPES: [&str; 5] = [
    "video/mp4",
    "video/avi",
    "video/quicktime",
    "image/jpeg",
    "image/png",
];

/// Why a candidate file was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid file type. Please upload a video or image.")]
    UnsupportedType { media_type: String },

    #[error("File size exceeds 500MB limit.")]
    TooLarge { size: u64, limit: u64 },
}

/// Type and size policy for files offered to the orchestrator.
///
/// Type matching is loose: a declared type is accepted when its subtype token
/// *contains* the subtype token of any accepted entry. `video/x-mp4-fragmented`
/// and `video/x-quicktime-legacy` both pass. The size bound is inclusive.
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_size: u64,
}

impl FileValidator {
    pub fn new() -> Self {
        Self {
            max_size: MAX_UPLOAD_BYTES,
        }
    }

    /// Classify a candidate. Side-effect free; callers update state and notify.
    pub fn validate(&self, candidate: CandidateFile) -> Result<SelectedFile, ValidationError> {
        if !Self::is_accepted_type(&candidate.media_type) {
            tracing::debug!(
                "Rejected {}: unsupported media type {:?}",
                candidate.name,
                candidate.media_type
            );
            return Err(ValidationError::UnsupportedType {
                media_type: candidate.media_type,
            });
        }

        if candidate.size > self.max_size {
            tracing::debug!(
                "Rejected {}: {} bytes exceeds {} byte limit",
                candidate.name,
                candidate.size,
                self.max_size
            );
            return Err(ValidationError::TooLarge {
                size: candidate.size,
                limit: self.max_size,
            });
        }

        Ok(SelectedFile::from_candidate(candidate))
    }

    /// Subtype-containment check against [`ACCEPTED_MEDIA_TYPES`].
    pub fn is_accepted_type(media_type: &str) -> bool {
        let declared = subtype_token(media_type);
        !declared.is_empty()
            && ACCEPTED_MEDIA_TYPES
                .iter()
                .any(|accepted| declared.contains(subtype_token(accepted)))
    }
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(media_type: &str, size: u64) -> CandidateFile {
        CandidateFile {
            size,
            ..CandidateFile::from_bytes("upload.bin", media_type, Vec::new())
        }
    }

    #[test]
    fn test_accepts_listed_types() {
        let validator = FileValidator::new();
        for media_type in ACCEPTED_MEDIA_TYPES {
            assert!(validator.validate(candidate(media_type, 1024)).is_ok(), "{media_type}");
        }
    }

    #[test]
    fn test_rejects_unlisted_types() {
        let validator = FileValidator::new();
        for media_type in ["image/gif", "text/plain", "application/pdf", "video/webm", ""] {
            let err = validator.validate(candidate(media_type, 1024)).unwrap_err();
            assert!(matches!(err, ValidationError::UnsupportedType { .. }), "{media_type}");
        }
    }

    #[test]
    fn test_loose_subtype_matching() {
        // Containment, not equality: these pass even though none is listed
        assert!(FileValidator::is_accepted_type("video/x-quicktime-legacy"));
        assert!(FileValidator::is_accepted_type("application/mp4"));
        assert!(FileValidator::is_accepted_type("image/pjpeg"));
        assert!(FileValidator::is_accepted_type("image/apng"));
        // The top-level type is ignored entirely
        assert!(FileValidator::is_accepted_type("text/png"));
    }

    #[test]
    fn test_size_boundary_inclusive() {
        let validator = FileValidator::new();

        assert!(validator.validate(candidate("video/mp4", MAX_UPLOAD_BYTES)).is_ok());

        let err = validator
            .validate(candidate("video/mp4", MAX_UPLOAD_BYTES + 1))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLarge {
                size: MAX_UPLOAD_BYTES + 1,
                limit: MAX_UPLOAD_BYTES
            }
        );
    }

    #[test]
    fn test_type_checked_before_size() {
        let err = FileValidator::new()
            .validate(candidate("text/plain", MAX_UPLOAD_BYTES * 2))
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::UnsupportedType { media_type: "x".into() }.to_string(),
            "Invalid file type. Please upload a video or image."
        );
        assert_eq!(
            ValidationError::TooLarge { size: 1, limit: 0 }.to_string(),
            "File size exceeds 500MB limit."
        );
    }

    #[test]
    fn test_selected_file_keeps_metadata() {
        let file = FileValidator::new()
            .validate(CandidateFile::from_bytes("clip.mp4", "video/mp4", vec![7; 10]))
            .unwrap();
        assert_eq!(file.name(), "clip.mp4");
        assert_eq!(file.media_type(), "video/mp4");
        assert_eq!(file.size(), 10);
        assert_eq!(file.subtype(), "mp4");
    }
}
