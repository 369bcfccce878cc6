//! Version comparison for package records.
//!
//! Versions are compared the way distribution tooling reports them after the
//! epoch and suffix have been stripped: dotted or dashed runs of integers.

use anyhow::{Context, Result};
use std::cmp::Ordering;

/// Sentinel for "no particular version required".
pub const LATEST: &str = "latest";

/// Sentinel displayed when a version is unknown.
pub const NONE: &str = "none";

/// Compare two dotted/dashed numeric version strings.
///
/// Both strings are split on `.` and `-` and compared segment-wise as
/// integers up to the shorter length. The first unequal segment decides.
/// If every compared segment is equal, the version with fewer segments is
/// the lesser one.
///
/// Fails if a compared segment is not a non-negative integer.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering> {
    let left: Vec<&str> = a.split(['.', '-']).collect();
    let right: Vec<&str> = b.split(['.', '-']).collect();

    for (l, r) in left.iter().zip(right.iter()) {
        match segment(a, l)?.cmp(&segment(b, r)?) {
            Ordering::Equal => continue,
            decided => return Ok(decided),
        }
    }
    Ok(left.len().cmp(&right.len()))
}

/// Check whether `a < b`.
pub fn version_less(a: &str, b: &str) -> Result<bool> {
    Ok(compare_versions(a, b)? == Ordering::Less)
}

fn segment(version: &str, segment: &str) -> Result<u64> {
    segment.parse::<u64>().with_context(|| {
        format!(
            "invalid version '{}': segment '{}' is not numeric",
            version, segment
        )
    })
}
