//! HTTP Range parsing and validation
//!
//! Single-range `bytes=<start>-<end?>` and suffix `bytes=-<n>` forms,
//! which are what video players and download resumers actually send.
//! Explicit ranges past the end are rejected, never clamped: a player
//! that asks for bytes past the end has a stale picture of the object
//! and must be told so.

use thiserror::Error;

/// A validated byte range against a known object size.
/// Invariant: `start <= end < total_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRange {
    pub start: u64,
    pub end: u64,
    pub total_size: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("Malformed Range header: {header}")]
    Malformed { header: String, total_size: u64 },

    #[error("Range {start}-{end:?} not satisfiable against {total_size} bytes")]
    Unsatisfiable {
        start: u64,
        end: Option<u64>,
        total_size: u64,
    },
}

impl RangeError {
    pub fn total_size(&self) -> u64 {
        match self {
            RangeError::Malformed { total_size, .. } => *total_size,
            RangeError::Unsatisfiable { total_size, .. } => *total_size,
        }
    }
}

impl StreamRange {
    /// Parse a `Range` header value against the object's total size.
    ///
    /// An omitted end means "through the last byte".
    pub fn parse(header: &str, total_size: u64) -> Result<StreamRange, RangeError> {
        let malformed = || RangeError::Malformed {
            header: header.to_string(),
            total_size,
        };

        let spec = header.trim().strip_prefix("bytes=").ok_or_else(malformed)?;

        // Reject multi-range requests outright rather than serving a
        // partial interpretation of them.
        if spec.contains(',') {
            return Err(malformed());
        }

        let (start_str, end_str) = spec.split_once('-').ok_or_else(malformed)?;

        // Suffix form `bytes=-N`: the last N bytes. A suffix longer
        // than the object means the whole object, per RFC 7233; a
        // zero-length suffix is unsatisfiable.
        if start_str.trim().is_empty() {
            let suffix: u64 = end_str.trim().parse().map_err(|_| malformed())?;
            if suffix == 0 || total_size == 0 {
                return Err(RangeError::Unsatisfiable {
                    start: 0,
                    end: None,
                    total_size,
                });
            }
            return Ok(StreamRange {
                start: total_size.saturating_sub(suffix),
                end: total_size - 1,
                total_size,
            });
        }

        let start: u64 = start_str.trim().parse().map_err(|_| malformed())?;

        let end: Option<u64> = match end_str.trim() {
            "" => None,
            s => Some(s.parse().map_err(|_| malformed())?),
        };

        let resolved_end = end.unwrap_or(total_size.saturating_sub(1));

        if start >= total_size || resolved_end >= total_size || start > resolved_end {
            return Err(RangeError::Unsatisfiable {
                start,
                end,
                total_size,
            });
        }

        Ok(StreamRange {
            start,
            end: resolved_end,
            total_size,
        })
    }

    /// Number of bytes the range covers
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for a 206 response
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_range() {
        let range = StreamRange::parse("bytes=200-299", 1000).unwrap();
        assert_eq!(range.start, 200);
        assert_eq!(range.end, 299);
        assert_eq!(range.length(), 100);
        assert_eq!(range.content_range(), "bytes 200-299/1000");
    }

    #[test]
    fn test_open_ended_range_defaults_to_last_byte() {
        let range = StreamRange::parse("bytes=500-", 1000).unwrap();
        assert_eq!(range.start, 500);
        assert_eq!(range.end, 999);
        assert_eq!(range.length(), 500);
    }

    #[test]
    fn test_full_object_range() {
        let range = StreamRange::parse("bytes=0-999", 1000).unwrap();
        assert_eq!(range.length(), 1000);
    }

    #[test]
    fn test_start_past_end_of_object_unsatisfiable() {
        let err = StreamRange::parse("bytes=999-1999", 1000).unwrap_err();
        assert!(matches!(err, RangeError::Unsatisfiable { .. }));
        assert_eq!(err.total_size(), 1000);
    }

    #[test]
    fn test_start_at_total_size_unsatisfiable() {
        assert!(StreamRange::parse("bytes=1000-", 1000).is_err());
    }

    #[test]
    fn test_end_past_object_is_rejected_not_clamped() {
        let err = StreamRange::parse("bytes=0-1000", 1000).unwrap_err();
        assert!(matches!(err, RangeError::Unsatisfiable { .. }));
    }

    #[test]
    fn test_inverted_range_unsatisfiable() {
        assert!(StreamRange::parse("bytes=300-200", 1000).is_err());
    }

    #[test]
    fn test_malformed_headers() {
        for header in ["bytes", "bytes=", "bytes=-", "items=0-10", "bytes=a-b", "bytes=0-10,20-30"] {
            let err = StreamRange::parse(header, 1000).unwrap_err();
            assert!(
                matches!(err, RangeError::Malformed { .. }),
                "header {:?} should be malformed",
                header
            );
        }
    }

    #[test]
    fn test_suffix_range_takes_last_n_bytes() {
        let range = StreamRange::parse("bytes=-500", 1000).unwrap();
        assert_eq!(range.start, 500);
        assert_eq!(range.end, 999);
        assert_eq!(range.length(), 500);
        assert_eq!(range.content_range(), "bytes 500-999/1000");
    }

    #[test]
    fn test_suffix_longer_than_object_covers_whole_object() {
        let range = StreamRange::parse("bytes=-5000", 1000).unwrap();
        assert_eq!(range.start, 0);
        assert_eq!(range.end, 999);
        assert_eq!(range.length(), 1000);
    }

    #[test]
    fn test_zero_length_suffix_unsatisfiable() {
        let err = StreamRange::parse("bytes=-0", 1000).unwrap_err();
        assert!(matches!(err, RangeError::Unsatisfiable { .. }));
    }

    #[test]
    fn test_suffix_against_empty_object_unsatisfiable() {
        assert!(StreamRange::parse("bytes=-100", 0).is_err());
    }

    #[test]
    fn test_single_byte_range() {
        let range = StreamRange::parse("bytes=0-0", 1000).unwrap();
        assert_eq!(range.length(), 1);
        assert_eq!(range.content_range(), "bytes 0-0/1000");
    }
}
