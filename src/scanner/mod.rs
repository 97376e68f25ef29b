//! Epoch descriptors and observation lines scanning
use crate::{
    columns::{field, to_int},
    epoch::{parse_obs_epoch, EpochFlag},
    error::{Error, FormatError},
    hatanaka::ObsArcs,
    observation::RawObservation,
    prelude::{Duration, Epoch, TimeScale, SV},
    prn::parse_prn,
    reader::LineSource,
};

use std::{collections::BTreeSet, str::FromStr};

mod compact;
mod standard;

pub use compact::CompactScanner;
pub use standard::{ObsLine, StandardScanner};

#[cfg(feature = "log")]
use log::debug;

/// Epoch descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochRecord {
    /// None for blank or malformed timestamps
    pub epoch: Option<Epoch>,
    pub flag: EpochFlag,
    /// Number of satellites, or number of following lines for header events
    pub numsat: usize,
    /// Line number of this descriptor
    pub line: usize,
}

/// Epoch descriptor state shared by both scanners
#[derive(Debug, Clone)]
pub(crate) struct Descriptor {
    /// Current (recovered) descriptor
    line: String,
    base_year: i32,
    timescale: TimeScale,
    record: Option<EpochRecord>,
    /// Epoch of the latest observation record
    previous: Option<Epoch>,
    intervals: BTreeSet<Duration>,
}

impl Descriptor {
    fn new(base_year: i32, timescale: TimeScale) -> Self {
        Self {
            line: String::new(),
            base_year,
            timescale,
            record: None,
            previous: None,
            intervals: BTreeSet::new(),
        }
    }

    /// Interprets a new descriptor
    fn parse(&mut self, line: String, line_number: usize) -> Result<EpochRecord, Error> {
        self.line = line;
        let err = |e: FormatError| Error::format(line_number, &self.line, e);

        let epoch = parse_obs_epoch(field(&self.line, 0, 26), self.base_year, self.timescale)
            .ok()
            .flatten();
        let flag = EpochFlag::from_str(field(&self.line, 28, 29)).map_err(err)?;
        let numsat = to_int(field(&self.line, 29, 32)).map_err(err)?;
        let numsat = usize::try_from(numsat)
            .map_err(|_| err(FormatError::IntegerField(numsat.to_string())))?;

        if flag.is_observation() {
            if let (Some(previous), Some(epoch)) = (self.previous, epoch) {
                self.intervals.insert(epoch - previous);
            }
            self.previous = epoch;
        }

        #[cfg(feature = "log")]
        if !flag.is_observation() {
            debug!("line {}: {:?} event, {} following lines", line_number, flag, numsat);
        }

        let record = EpochRecord {
            epoch,
            flag,
            numsat,
            line: line_number,
        };
        self.record = Some(record);
        Ok(record)
    }

    fn numsat(&self) -> usize {
        self.record.map(|r| r.numsat).unwrap_or(0)
    }

    fn line_number(&self) -> usize {
        self.record.map(|r| r.line).unwrap_or(0)
    }
}

/// Observations of one satellite, within one epoch
#[derive(Debug)]
pub enum DataLine<'a> {
    /// Fresh line(s) reader
    Standard(ObsLine),
    /// Persistent arcs of this satellite
    Compact(&'a mut ObsArcs),
}

impl DataLine<'_> {
    /// Consumes the observation line(s)
    pub fn update<S: LineSource>(&mut self, source: &mut S) -> Result<(), Error> {
        match self {
            Self::Standard(obsline) => obsline.update(source),
            Self::Compact(arcs) => {
                let line = source.require("compact observations")?;
                arcs.update(&line)
                    .map_err(|e| Error::format(source.line_number(), &line, e))
            },
        }
    }

    /// Returns observation `index`, in order of declaration
    pub fn get(&self, index: usize) -> RawObservation {
        match self {
            Self::Standard(obsline) => obsline.get(index),
            Self::Compact(arcs) => arcs.get(index),
        }
    }
}

/// Epoch scanner, selected once for the whole decoding process
#[derive(Debug, Clone)]
pub enum Scanner {
    Standard(StandardScanner),
    Compact(CompactScanner),
}

impl Scanner {
    /// Builds a new [Scanner], `base_year` disambiguates two digit years,
    /// epochs are expressed in `timescale`.
    pub fn new(compact: bool, base_year: i32, timescale: TimeScale) -> Self {
        if compact {
            Self::Compact(CompactScanner::new(base_year, timescale))
        } else {
            Self::Standard(StandardScanner::new(base_year, timescale))
        }
    }

    pub fn is_compact(&self) -> bool {
        matches!(self, Self::Compact(_))
    }

    /// Reads the next epoch descriptor.
    /// Returns None when the source is exhausted.
    pub fn update<S: LineSource>(&mut self, source: &mut S) -> Result<Option<EpochRecord>, Error> {
        match self {
            Self::Standard(s) => s.update(source),
            Self::Compact(s) => s.update(source),
        }
    }

    /// Satellites of current epoch, in order of appearance
    pub fn prn_list<S: LineSource>(&mut self, source: &mut S) -> Result<Vec<SV>, Error> {
        match self {
            Self::Standard(s) => s.prn_list(source),
            Self::Compact(s) => s.prn_list(),
        }
    }

    /// Receiver clock offset of current epoch, in seconds
    pub fn offset<S: LineSource>(&mut self, source: &mut S) -> Result<f64, Error> {
        match self {
            Self::Standard(s) => s.offset(),
            Self::Compact(s) => s.offset(source),
        }
    }

    /// Observation line(s) reader for this satellite
    pub fn dataline(&mut self, sv: SV, num_obs: usize) -> DataLine<'_> {
        match self {
            Self::Standard(_) => DataLine::Standard(ObsLine::new(num_obs)),
            Self::Compact(s) => DataLine::Compact(s.arcs(sv, num_obs)),
        }
    }

    /// Discards the content of a cycle slip record,
    /// satellites list already being consumed.
    pub fn skip<S: LineSource>(&mut self, source: &mut S, num_obs: usize) -> Result<(), Error> {
        match self {
            Self::Standard(s) => s.skip(source, num_obs),
            Self::Compact(s) => s.skip(source),
        }
    }

    /// Gaps between successive observation epochs, as observed so far
    pub fn intervals(&self) -> &BTreeSet<Duration> {
        match self {
            Self::Standard(s) => &s.descriptor.intervals,
            Self::Compact(s) => &s.descriptor.intervals,
        }
    }
}

/// Parses satellite `index` of the list starting at column 33
fn list_prn(line: &str, index: usize, line_number: usize) -> Result<SV, Error> {
    parse_prn(line, 32 + 3 * index).map_err(|e| Error::format(line_number, line, e))
}
