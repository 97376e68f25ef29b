//! Decoded observations
use crate::{
    decoder::Decoder,
    error::{Error, Warning},
    header::HeaderStore,
    observation::ObservationValue,
    prelude::{Duration, Epoch, SV},
    reader::{LineReader, LineSource},
};

use std::{
    collections::{BTreeMap, BTreeSet},
    io::Read,
    path::Path,
};

#[cfg(feature = "log")]
use log::warn;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Observations decoded so far, per satellite and observation code
pub type ObservationCounts = BTreeMap<SV, BTreeMap<String, u32>>;

/// Destination of the decoding process
pub trait ObservationSink {
    /// Header fields
    fn meta(&self) -> &HeaderStore;

    fn meta_mut(&mut self) -> &mut HeaderStore;

    /// Opens a new record
    fn new_record(&mut self, epoch: Option<Epoch>, power_failure: bool, clock_offset: f64);

    /// Stores one observation in record `index`
    fn add(&mut self, index: usize, sv: SV, code: &str, value: ObservationValue);

    /// Observation codes currently in use
    fn obs_codes(&self) -> Vec<String> {
        self.meta().obs_codes(self.len())
    }

    /// Phase tracking was interrupted for these satellites
    fn break_phase(&mut self, prns: &[SV]);

    /// Closes the current record
    fn check_break(&mut self);

    /// Antenna starts (true) or stops moving
    fn set_in_motion(&mut self, moving: bool);

    /// Non fatal issue
    fn warning(&mut self, warning: Warning);

    /// Audit, once the content has been entirely decoded
    fn check(&mut self, counts: &ObservationCounts, intervals: &BTreeSet<Duration>);

    /// Number of records
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One observation record
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ObservationRecord {
    /// None when the descriptor timestamp was blank or malformed
    pub epoch: Option<Epoch>,
    /// Power failure since previous record
    pub power_failure: bool,
    /// Antenna was moving
    pub in_motion: bool,
    /// Receiver clock offset (s)
    pub clock_offset: f64,
    /// Satellites whose phase arc starts at this record
    pub phase_breaks: BTreeSet<SV>,
    /// Observations, in order of appearance
    pub observations: Vec<(SV, String, ObservationValue)>,
}

impl ObservationRecord {
    /// Returns the observation of `sv` for this code
    pub fn get(&self, sv: SV, code: &str) -> Option<&ObservationValue> {
        self.observations
            .iter()
            .find(|(s, c, _)| *s == sv && c == code)
            .map(|(_, _, value)| value)
    }

    /// Satellites of this record, in order of appearance
    pub fn satellites(&self) -> Vec<SV> {
        let mut prns = Vec::new();
        for (sv, _, _) in self.observations.iter() {
            if !prns.contains(sv) {
                prns.push(*sv);
            }
        }
        prns
    }
}

/// Default [ObservationSink]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ObservationData {
    /// Header fields
    pub meta: HeaderStore,
    /// Records, in chronological order
    pub records: Vec<ObservationRecord>,
    /// Non fatal issues, in order of appearance
    pub warnings: Vec<Warning>,
    in_motion: bool,
    pending_breaks: BTreeSet<SV>,
}

impl ObservationData {
    /// Decodes a local file, see [LineReader::from_path]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut source = LineReader::from_path(path)?;
        Self::from_source(&mut source)
    }

    /// Decodes any readable content
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let mut source = LineReader::new(reader);
        Self::from_source(&mut source)
    }

    /// Decodes a [LineSource] with default options
    pub fn from_source<S: LineSource>(source: &mut S) -> Result<Self, Error> {
        let mut data = Self::default();
        Decoder::default().decode(source, &mut data)?;
        Ok(data)
    }

    /// Returns true if the antenna is currently moving
    pub fn in_motion(&self) -> bool {
        self.in_motion
    }

    /// Iterates over all observations
    pub fn observations(&self) -> impl Iterator<Item = (&Option<Epoch>, SV, &str, &ObservationValue)> + '_ {
        self.records.iter().flat_map(|record| {
            record
                .observations
                .iter()
                .map(move |(sv, code, value)| (&record.epoch, *sv, code.as_str(), value))
        })
    }
}

impl ObservationSink for ObservationData {
    fn meta(&self) -> &HeaderStore {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut HeaderStore {
        &mut self.meta
    }

    fn new_record(&mut self, epoch: Option<Epoch>, power_failure: bool, clock_offset: f64) {
        self.records.push(ObservationRecord {
            epoch,
            power_failure,
            in_motion: self.in_motion,
            clock_offset,
            ..Default::default()
        });
    }

    fn add(&mut self, index: usize, sv: SV, code: &str, value: ObservationValue) {
        if let Some(record) = self.records.get_mut(index) {
            record.observations.push((sv, code.to_string(), value));
        }
    }

    fn break_phase(&mut self, prns: &[SV]) {
        self.pending_breaks.extend(prns.iter().copied());
    }

    /// A phase arc starts with a satellite that was not in the previous record,
    /// with a loss of lock, or after a cycle slip record.
    fn check_break(&mut self) {
        let pending = std::mem::take(&mut self.pending_breaks);
        let previous: BTreeSet<SV> = match self.records.len() {
            0 | 1 => BTreeSet::new(),
            n => self.records[n - 2]
                .observations
                .iter()
                .map(|(sv, _, _)| *sv)
                .collect(),
        };
        if let Some(record) = self.records.last_mut() {
            let mut breaks = BTreeSet::new();
            for (sv, _, value) in record.observations.iter() {
                if !previous.contains(sv) || value.lost_lock || pending.contains(sv) {
                    breaks.insert(*sv);
                }
            }
            record.phase_breaks = breaks;
        }
    }

    fn set_in_motion(&mut self, moving: bool) {
        self.in_motion = moving;
    }

    fn warning(&mut self, warning: Warning) {
        #[cfg(feature = "log")]
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Compares declared `PRN / # OF OBS` and `INTERVAL` to the decoded content
    fn check(&mut self, counts: &ObservationCounts, intervals: &BTreeSet<Duration>) {
        let codes = self.meta.obs_codes(0);
        let mut warnings = Vec::new();

        if let Some(declared) = self
            .meta
            .get("obscount")
            .and_then(|v| v.value.as_obs_counts())
        {
            for (sv, declared) in declared.iter() {
                for (code, declared) in codes.iter().zip(declared.iter()) {
                    let observed = counts
                        .get(sv)
                        .and_then(|counts| counts.get(code))
                        .copied()
                        .unwrap_or(0);
                    if observed != *declared {
                        warnings.push(Warning::ObservationCount {
                            sv: *sv,
                            code: code.clone(),
                            declared: *declared,
                            observed,
                        });
                    }
                }
            }
        }

        let declared = self
            .meta
            .get("interval")
            .and_then(|v| v.value.as_float())
            .filter(|dt| *dt > 0.0);
        if let (Some(declared), Some(observed)) = (declared, intervals.iter().next()) {
            let declared = Duration::from_seconds(declared);
            if declared != *observed {
                warnings.push(Warning::Interval {
                    declared,
                    observed: *observed,
                });
            }
        }

        for warning in warnings {
            self.warning(warning);
        }
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
