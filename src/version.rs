//! Version catalog: release label filtering and semantic version ordering
//!
//! Release titles on the hosting side are a mix of strict `MAJOR.MINOR.PATCH`
//! versions, the moving `latest` pointer and whatever else people typed. Only
//! the strict versions take part in "which release is the newest" decisions.

use std::collections::BTreeSet;

use semver::Version;

use crate::error::{self, Result};

/// Tag of the pointer release that always announces the newest version
pub const LATEST_TAG: &str = "latest";

/// Parse a strict `MAJOR.MINOR.PATCH` label made of ASCII digits only
pub fn parse_strict(label: &str) -> Option<Version> {
    let parts: Vec<&str> = label.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    Some(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// Parse a version with one to three numeric components, padding missing ones with zero
///
/// Changelog keys are often written as `1.0` or even `2`, and YAML may hand them
/// over as numbers, so this is more forgiving than [`parse_strict`].
pub fn parse_lenient(label: &str) -> Option<Version> {
    let trimmed = label.trim().trim_start_matches('v');
    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    Some(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// Select the highest strict version among `labels`
///
/// `latest` and non-conforming labels are ignored. Ordering is numeric per field,
/// so `1.10.0` beats `1.2.0`.
pub fn select_highest<I, S>(labels: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .filter_map(|label| {
            let label = label.as_ref();
            if label == LATEST_TAG {
                return None;
            }
            parse_strict(label).map(|version| (version, label.to_string()))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, label)| label)
}

/// True iff `version` is the maximum of `known_versions`
///
/// Both sides are compared as numbers after [`parse_lenient`], so `2.0` and
/// `2.0.0` name the same version. Entries that cannot be parsed are skipped.
/// An empty (or entirely unparseable) set has no maximum, so nothing is latest.
pub fn is_latest_version<I, S>(version: &str, known_versions: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Some(candidate) = parse_lenient(version) else {
        return false;
    };
    known_versions
        .into_iter()
        .filter_map(|v| parse_lenient(v.as_ref()))
        .max()
        .is_some_and(|highest| highest == candidate)
}

/// Major component of a version string, e.g. `3` for `3.0.4`
pub fn major_version_of(version: &str) -> Result<u64> {
    version
        .split('.')
        .next()
        .filter(|major| !major.is_empty() && major.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|major| major.parse().ok())
        .ok_or_else(|| error::version::invalid(version))
}

/// Ordered set of known versions for one plugin or release stream
#[derive(Debug, Clone, Default)]
pub struct VersionCatalog {
    versions: BTreeSet<Version>,
}

impl VersionCatalog {
    /// Build a catalog from arbitrary labels, keeping only strict versions
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let versions = labels
            .into_iter()
            .filter_map(|label| parse_strict(label.as_ref()))
            .collect();
        Self { versions }
    }

    pub fn highest(&self) -> Option<&Version> {
        self.versions.last()
    }

    /// True if `label` would be the newest version once added to the catalog
    pub fn would_be_latest(&self, label: &str) -> bool {
        match parse_strict(label) {
            Some(version) => self.highest().is_none_or(|highest| version >= *highest),
            None => false,
        }
    }
}
