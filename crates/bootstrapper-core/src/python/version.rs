//! Python version strings and their `major.minor` projection

use crate::error::{BootstrapError, Result};
use semver::{Comparator, Op, Version, VersionReq};
use std::fmt;
use std::str::FromStr;

/// A requested interpreter version, either `major.minor` or `major.minor.patch`.
///
/// The original spelling is kept because it is what gets pinned and compared
/// against the version marker file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonVersion {
    raw: String,
    major: u64,
    minor: u64,
    patch: Option<u64>,
}

impl PythonVersion {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> Option<u64> {
        self.patch
    }

    /// `"3.12.3"` -> `"3.12"`
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// Requirement matched by any interpreter of the same `major.minor` series
    pub fn series_requirement(&self) -> VersionReq {
        VersionReq {
            comparators: vec![Comparator {
                op: Op::Tilde,
                major: self.major,
                minor: Some(self.minor),
                patch: None,
                pre: semver::Prerelease::EMPTY,
            }],
        }
    }

    /// Whether an interpreter reporting `version` belongs to this series
    pub fn same_series(&self, version: &Version) -> bool {
        self.series_requirement().matches(version)
    }
}

impl FromStr for PythonVersion {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let invalid = |reason: &str| BootstrapError::InvalidVersion {
            version: s.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("version is empty"));
        }

        let parts: Vec<&str> = raw.split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid("expected major.minor or major.minor.patch"));
        }

        let numbers = parts
            .iter()
            .map(|p| p.parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| invalid("components must be numeric"))?;

        Ok(Self {
            raw: raw.to_string(),
            major: numbers[0],
            minor: numbers[1],
            patch: numbers.get(2).copied(),
        })
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse the output of `python --version` (`"Python 3.12.3"`).
///
/// Pre-release suffixes such as `rc1` are dropped; a missing patch counts as 0.
pub fn parse_reported_version(output: &str) -> Option<Version> {
    let token = output
        .split_whitespace()
        .skip_while(|t| t.eq_ignore_ascii_case("python"))
        .next()?;
    let cleaned = token.strip_prefix('v').unwrap_or(token);

    let mut numbers = cleaned.split('.').map(|part| {
        let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
        digits.parse::<u64>().ok()
    });

    let major = numbers.next()??;
    let minor = numbers.next()??;
    let patch = numbers.next().flatten().unwrap_or(0);
    Some(Version::new(major, minor, patch))
}
