//! Property tests for file validation and running statistics.

use proptest::prelude::*;
use tvd_client::ProcessingResult;
use tvd_client::models::{CandidateFile, MAX_UPLOAD_BYTES, StatsAggregator, round2};
use tvd_client::services::{FileValidator, ValidationError};

fn candidate(media_type: &str, size: u64) -> CandidateFile {
    CandidateFile {
        size,
        ..CandidateFile::from_bytes("upload.bin", media_type, Vec::new())
    }
}

const ACCEPTED_TOKENS: [&str; 5] = ["mp4", "avi", "quicktime", "jpeg", "png"];

proptest! {
    #[test]
    fn prop_size_bound_is_inclusive(size in 0u64..=MAX_UPLOAD_BYTES * 2) {
        let outcome = FileValidator::new().validate(candidate("video/mp4", size));
        if size <= MAX_UPLOAD_BYTES {
            prop_assert!(outcome.is_ok());
        } else {
            prop_assert!(
                matches!(outcome, Err(ValidationError::TooLarge { .. })),
                "expected TooLarge for size {}",
                size
            );
        }
    }

    /// Loose matching: any subtype that contains an accepted token passes,
    /// whatever surrounds it and whatever the top-level type is.
    #[test]
    fn prop_subtype_containing_token_is_accepted(
        top in "[a-z]{1,8}",
        prefix in "[a-z0-9.+-]{0,6}",
        token in prop::sample::select(ACCEPTED_TOKENS.to_vec()),
        suffix in "[a-z0-9.+-]{0,6}",
    ) {
        let media_type = format!("{}/{}{}{}", top, prefix, token, suffix);
        prop_assert!(FileValidator::is_accepted_type(&media_type), "{}", media_type);
    }

    #[test]
    fn prop_subtype_without_token_is_rejected(subtype in "[bcdfghklrstwxz]{1,12}") {
        // The alphabet excludes letters every accepted token needs
        let media_type = format!("video/{}", subtype);
        prop_assert!(!ACCEPTED_TOKENS.iter().any(|t| subtype.contains(t)));
        prop_assert!(!FileValidator::is_accepted_type(&media_type));
    }

    #[test]
    fn prop_average_is_rounded_mean(counts in prop::collection::vec(0u64..1000, 1..40)) {
        let mut stats = StatsAggregator::new();
        for count in &counts {
            stats.record(&ProcessingResult {
                success: true,
                violations_detected: Some(*count),
                ..Default::default()
            });
        }

        let total: u64 = counts.iter().sum();
        let expected = round2(total as f64 / counts.len() as f64);
        prop_assert_eq!(stats.stats().total_violations, total);
        prop_assert_eq!(stats.stats().runs_processed, counts.len() as u64);
        prop_assert_eq!(stats.stats().avg_violations, expected);
    }

    #[test]
    fn prop_average_ignores_order(mut counts in prop::collection::vec(0u64..1000, 1..20)) {
        let record_all = |counts: &[u64]| {
            let mut stats = StatsAggregator::new();
            for count in counts {
                stats.record(&ProcessingResult {
                    success: true,
                    violations_detected: Some(*count),
                    ..Default::default()
                });
            }
            stats.stats().clone()
        };

        let forward = record_all(&counts);
        counts.reverse();
        prop_assert_eq!(forward, record_all(&counts));
    }
}
