//! Chunk planning for multipart uploads
//!
//! Picks a part size for a given file size so that transfer efficiency
//! and the store's 10,000-part ceiling are both respected. The tiering
//! policy lives in one ordered table so it can be tested as data and
//! extended without touching control flow.

// ============================================================================
// Constants (S3 multipart limits)
// ============================================================================

/// Hard ceiling on parts per upload imposed by the object store
pub const MAX_PARTS: i64 = 10_000;

/// Parts held back from the ceiling when computing chunk size for very
/// large files, so rounding never pushes the count over the limit
const PART_COUNT_SAFETY_MARGIN: i64 = 100;

/// Smallest part size the store accepts (except the final part)
pub const MIN_PART_SIZE: u64 = 5 * MIB;

/// Largest part size the store accepts
pub const MAX_PART_SIZE: u64 = 5 * GIB;

/// Chunk size used when the file size is unknown or in the smallest tier
pub const DEFAULT_CHUNK_SIZE: u64 = 10 * MIB;

/// Very large files prefer parts of at least this size for efficiency
const LARGE_FILE_CHUNK_FLOOR: u64 = 100 * MIB;

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * MIB;

/// Size-tiered chunk policy: `(file size upper bound, chunk size)`,
/// tried in order. Files above the last bound get a computed chunk size.
const CHUNK_TIERS: &[(u64, u64)] = &[
    (500 * MIB, DEFAULT_CHUNK_SIZE),
    (GIB, 25 * MIB),
    (5 * GIB, 50 * MIB),
];

// ============================================================================
// Plan
// ============================================================================

/// A derived upload plan. Never persisted; recomputed on every initiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPlan {
    /// Size of every part except possibly the last
    pub chunk_size: u64,

    /// Number of parts, when the file size is known
    pub total_parts: Option<i64>,
}

/// Plan an upload for an optionally-known file size.
///
/// Total over its inputs: unknown or non-positive sizes degrade to the
/// default chunk size rather than erroring.
pub fn plan_upload(file_size: Option<i64>) -> UploadPlan {
    let size = match file_size {
        Some(s) if s > 0 => s as u64,
        _ => {
            return UploadPlan {
                chunk_size: DEFAULT_CHUNK_SIZE,
                total_parts: None,
            }
        }
    };

    let chunk_size = chunk_size_for(size);

    UploadPlan {
        chunk_size,
        total_parts: Some(size.div_ceil(chunk_size) as i64),
    }
}

fn chunk_size_for(size: u64) -> u64 {
    for &(upper_bound, chunk_size) in CHUNK_TIERS {
        if size <= upper_bound {
            return chunk_size;
        }
    }

    // Above the largest tier: spread the file across the part budget,
    // then clamp into the store's allowed band, preferring big parts.
    let budget = (MAX_PARTS - PART_COUNT_SAFETY_MARGIN) as u64;
    size.div_ceil(budget)
        .max(MIN_PART_SIZE)
        .max(LARGE_FILE_CHUNK_FLOOR)
        .min(MAX_PART_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_size_gets_default_chunk_and_no_count() {
        assert_eq!(
            plan_upload(None),
            UploadPlan {
                chunk_size: DEFAULT_CHUNK_SIZE,
                total_parts: None
            }
        );
        assert_eq!(plan_upload(Some(0)).total_parts, None);
        assert_eq!(plan_upload(Some(-42)).total_parts, None);
    }

    #[test]
    fn test_small_sizes_use_default_chunk() {
        for size in [1, MIB as i64, (500 * MIB) as i64] {
            let plan = plan_upload(Some(size));
            assert_eq!(plan.chunk_size, DEFAULT_CHUNK_SIZE, "size {}", size);
            assert_eq!(
                plan.total_parts,
                Some((size as u64).div_ceil(DEFAULT_CHUNK_SIZE) as i64)
            );
        }
    }

    #[test]
    fn test_medium_and_large_tiers() {
        assert_eq!(plan_upload(Some((500 * MIB + 1) as i64)).chunk_size, 25 * MIB);
        assert_eq!(plan_upload(Some(GIB as i64)).chunk_size, 25 * MIB);
        assert_eq!(plan_upload(Some((GIB + 1) as i64)).chunk_size, 50 * MIB);
        assert_eq!(plan_upload(Some((5 * GIB) as i64)).chunk_size, 50 * MIB);
    }

    #[test]
    fn test_huge_files_prefer_large_chunks() {
        // 6 GiB: computed chunk would be tiny, floor lifts it to 100 MiB
        let plan = plan_upload(Some((6 * GIB) as i64));
        assert_eq!(plan.chunk_size, LARGE_FILE_CHUNK_FLOOR);
        assert_eq!(plan.total_parts, Some(62));
    }

    #[test]
    fn test_part_count_never_exceeds_ceiling() {
        let sizes = [
            1,
            (500 * MIB) as i64,
            (5 * GIB) as i64,
            (100 * GIB) as i64,
            (1024 * GIB) as i64,
            // 5 TiB, the store's maximum object size
            (5 * 1024 * GIB) as i64,
        ];
        for size in sizes {
            let plan = plan_upload(Some(size));
            let parts = plan.total_parts.unwrap();
            assert!(parts <= MAX_PARTS, "size {} produced {} parts", size, parts);
            // Plan covers the whole file
            assert!(parts as u64 * plan.chunk_size >= size as u64);
        }
    }

    #[test]
    fn test_huge_chunk_stays_in_allowed_band() {
        for size in [(6 * GIB) as i64, (500 * GIB) as i64, (5 * 1024 * GIB) as i64] {
            let chunk = plan_upload(Some(size)).chunk_size;
            assert!(chunk >= MIN_PART_SIZE);
            assert!(chunk <= MAX_PART_SIZE);
        }
    }

    #[test]
    fn test_huge_files_keep_margin_under_ceiling() {
        // At 5 TiB the computed chunk size must keep the count inside
        // the reduced part budget, not just under the hard ceiling.
        let plan = plan_upload(Some((5 * 1024 * GIB) as i64));
        assert!(plan.total_parts.unwrap() <= MAX_PARTS - PART_COUNT_SAFETY_MARGIN);
    }
}
