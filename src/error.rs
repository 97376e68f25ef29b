//! Decoding errors and warnings
use crate::prelude::{Duration, SV};
use thiserror::Error;

/// Fatal conditions, each one aborts the decoding process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("RINEX version not parsable")]
    VersionParsing,
    #[error("non supported RINEX revision \"{0}\"")]
    NonSupportedVersion(String),
    #[error("this is not an Observation RINEX")]
    NotObservationData,
    #[error("non supported CRINEX revision \"{0}\"")]
    NonSupportedCrxVersion(String),
    #[error("header \"{0}\" occurs too often")]
    RepeatedHeader(String),
    #[error("continuation line without beginning")]
    OrphanContinuation,
    #[error("continuation line exceeds declared count")]
    ContinuationOverflow,
    #[error("uninitialized data arc")]
    UninitializedDataArc,
    #[error("uninitialized clock offset data arc")]
    UninitializedClockArc,
    #[error("unexpected end of stream while reading {0}")]
    UnexpectedEof(&'static str),
    #[error("header delimiter not found")]
    MissingHeaderDelimiter,
    #[error("failed to parse integer from \"{0}\"")]
    IntegerField(String),
    #[error("failed to parse float from \"{0}\"")]
    FloatField(String),
    #[error("invalid epoch flag \"{0}\"")]
    EpochFlag(String),
    #[error("unknown constellation \"{0}\"")]
    Constellation(String),
    #[error("invalid wavelength factor {0}")]
    WavelengthFactor(i64),
    #[error("invalid datetime \"{0}\"")]
    DateTime(String),
    #[error("compression order {0} exceeds maximal order")]
    MaximalCompressionOrder(usize),
    #[error("recovered value overflows")]
    ArcOverflow,
}

/// Errors that may rise while decoding
#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o error")]
    IoError(#[from] std::io::Error),
    #[error("line {line}: {kind} (\"{content}\")")]
    Format {
        /// Line number where the issue was detected
        line: usize,
        /// Raw content (label or entire line)
        content: String,
        kind: FormatError,
    },
}

impl Error {
    pub(crate) fn format(line: usize, content: &str, kind: FormatError) -> Self {
        Self::Format {
            line,
            content: content.to_string(),
            kind,
        }
    }
    /// Returns the [FormatError] kind, if this is a format issue
    pub fn kind(&self) -> Option<&FormatError> {
        match self {
            Self::Format { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

/// Non fatal issues: decoding continues with a best-effort resolution.
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Warning {
    /// Single valued header encountered again: latest value is kept
    #[error("line {line}: header \"{}\" encountered multiple times, old values clobbered", label.trim_end())]
    RepeatedHeader { label: String, line: usize },
    /// Label not known to the registry: line is skipped
    #[error("line {line}: header \"{}\" unrecognized, ignoring", label.trim_end())]
    UnknownLabel { label: String, line: usize },
    /// Label recognized despite incorrect whitespace
    #[error(
        "line {line}: label \"{}\" recognized as \"{}\" despite incorrect whitespace",
        found.trim_end(),
        expected.trim_end()
    )]
    MangledLabel {
        found: String,
        expected: String,
        line: usize,
    },
    /// File revision is more recent than what we know of
    #[error("RINEX revision {0} more recent than supported")]
    NewerRevision(String),
    /// Same satellite listed twice in `PRN / # OF OBS`
    #[error("line {line}: repeated # OF OBS for {sv}")]
    RepeatedSatelliteCounts { sv: SV, line: usize },
    /// Declared and actual number of observations differ
    #[error("{sv} {code}: {declared} observations declared, {observed} decoded")]
    ObservationCount {
        sv: SV,
        code: String,
        declared: u32,
        observed: u32,
    },
    /// Declared and actual sampling interval differ
    #[error("sampling interval {declared} declared, {observed} observed")]
    Interval { declared: Duration, observed: Duration },
}
