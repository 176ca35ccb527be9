use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use thiserror::Error;

/// Error type for version parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid version format")]
    InvalidFormat,
    #[error("Version parse error: {0}")]
    ParseError(String),
}

/// Semantic version of the plugin-facing API
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ApiVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Major versions must match
    pub fn is_compatible_with(&self, other: &ApiVersion) -> bool {
        self.major == other.major
    }

    /// The same version as a `semver::Version`, for matching against ranges
    pub fn to_semver(&self) -> Version {
        Version::new(u64::from(self.major), u64::from(self.minor), u64::from(self.patch))
    }
}

impl FromStr for ApiVersion {
    type Err = VersionError;

    /// Parses a version string like "1.2.3"
    fn from_str(version: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = version.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::InvalidFormat);
        }

        let parse_part = |part: &str| -> Result<u32, VersionError> {
            part.parse::<u32>().map_err(|e| VersionError::ParseError(format!("'{}': {}", part, e)))
        };

        Ok(Self::new(parse_part(parts[0])?, parse_part(parts[1])?, parse_part(parts[2])?))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A version requirement such as `^0.1` or `>=1.0, <2.0`
#[derive(Debug, Clone)]
pub struct VersionRange {
    constraint: String,
    req: VersionReq,
}

impl VersionRange {
    pub fn from_constraint(constraint: &str) -> Result<Self, VersionError> {
        let req = VersionReq::parse(constraint)
            .map_err(|e| VersionError::ParseError(format!("Invalid version constraint '{}': {}", constraint, e)))?;
        Ok(Self {
            constraint: constraint.to_string(),
            req,
        })
    }

    pub fn includes(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    pub fn includes_api(&self, version: &ApiVersion) -> bool {
        self.includes(&version.to_semver())
    }

    /// Returns the original constraint string.
    pub fn constraint_string(&self) -> &str {
        &self.constraint
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint)
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::from_constraint(s)
    }
}
