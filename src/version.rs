//! Dotted numeric version ordering
//!
//! Catalog versions are free-form strings shaped like `"1.2.10"`: a
//! `.`-separated sequence of non-negative integers. Ordering is numeric
//! per segment, so `"10.1"` ranks above `"2.9"`. A version with fewer
//! segments sorts older when every shared segment is equal (`"1.2"` is
//! older than `"1.2.0"`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("empty version string")]
    Empty,

    #[error("version {version:?} has a non-numeric segment {segment:?}")]
    NonNumericSegment { version: String, segment: String },
}

/// A parsed dotted version, ordered by numeric segment comparison.
///
/// The original string is kept so round-trips preserve formatting
/// (`"1.02"` stays `"1.02"` even though it ranks as `[1, 2]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DottedVersion {
    raw: String,
    segments: Vec<u64>,
}

impl DottedVersion {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }
}

impl FromStr for DottedVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(VersionError::Empty);
        }

        let segments = s
            .split('.')
            .map(|segment| {
                segment
                    .parse::<u64>()
                    .map_err(|_| VersionError::NonNumericSegment {
                        version: s.to_string(),
                        segment: segment.to_string(),
                    })
            })
            .collect::<Result<Vec<u64>, _>>()?;

        Ok(Self {
            raw: s.to_string(),
            segments,
        })
    }
}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let shared = self.segments.len().min(other.segments.len());
        for i in 0..shared {
            match self.segments[i].cmp(&other.segments[i]) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        // All shared segments equal: fewer segments sorts older
        self.segments.len().cmp(&other.segments.len())
    }
}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two version strings without keeping the parsed forms around.
///
/// Fails fast on non-numeric segments instead of falling back to a
/// lexicographic order.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    let a: DottedVersion = a.parse()?;
    let b: DottedVersion = b.parse()?;
    Ok(a.cmp(&b))
}
