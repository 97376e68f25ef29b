//! `RINEX` revision description
use crate::error::FormatError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Most recent RINEX revision this decoder knows of
pub const SUPPORTED_VERSION: Version = Version { major: 2, minor: 11 };

/// Only Compact RINEX revision we support
pub const SUPPORTED_CRX_VERSION: Version = Version { major: 1, minor: 0 };

/// Version is used to describe RINEX standards revisions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Version {
    /// Version major number
    pub major: u8,
    /// Version minor number
    pub minor: u8,
}

impl Default for Version {
    fn default() -> Self {
        SUPPORTED_VERSION
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for Version {
    type Err = FormatError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits: Vec<&str> = s.split('.').collect();
        if digits.is_empty() || digits.len() > 2 {
            return Err(FormatError::VersionParsing);
        }
        let major = digits[0]
            .trim()
            .parse::<u8>()
            .or(Err(FormatError::VersionParsing))?;
        let minor = match digits.get(1) {
            Some(minor) if !minor.trim().is_empty() => minor
                .trim()
                .parse::<u8>()
                .or(Err(FormatError::VersionParsing))?,
            _ => 0,
        };
        Ok(Self { major, minor })
    }
}

impl Version {
    /// Builds a new `Version` object
    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
    /// Returns true if this revision belongs to the 2.x family
    pub fn is_supported(&self) -> bool {
        self.major == SUPPORTED_VERSION.major
    }
    /// Returns true if this 2.x revision is more recent than what we know of
    pub fn is_newer(&self) -> bool {
        self.is_supported() && self.minor > SUPPORTED_VERSION.minor
    }
}
