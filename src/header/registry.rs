//! Header labels registry and occurrence policies
use super::{fields, HeaderStore, HeaderValue, Value};

use crate::{
    ambiguity::AmbiguityTracker,
    columns::field,
    error::{Error, FormatError, Warning},
    prelude::Epoch,
};

use std::collections::{HashMap, HashSet};

#[cfg(feature = "log")]
use log::debug;

/// Label terminating a header block
pub const END_OF_HEADER: &str = "END OF HEADER";

/// What happens when a single valued label occurs again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrencePolicy {
    /// Latest value is kept, a [Warning] is emitted
    WarnAndReplace,
    /// Fatal
    Forbid,
    /// Latest value is kept
    SilentReplace,
}

/// Storage shape of a header label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// One current value
    Single(OccurrencePolicy),
    /// Append only list
    Multi,
    /// Value valid from a record index onwards
    RecordIndexed,
}

/// Converters that span several lines, their state lives in [Continuations]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continued {
    ObservationTypes,
    WavelengthFactors,
    SatelliteObsCounts,
}

/// Field converter
#[derive(Clone, Copy)]
pub enum Convert {
    Pure(fn(&str) -> Result<Value, FormatError>),
    Continued(Continued),
}

impl std::fmt::Debug for Convert {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Pure(_) => write!(f, "Pure"),
            Self::Continued(c) => write!(f, "Continued({:?})", c),
        }
    }
}

/// One field of a header line
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Name in the [HeaderStore]
    pub name: &'static str,
    /// First column (0 based)
    pub start: usize,
    /// Last column, excluded
    pub stop: usize,
    pub convert: Convert,
}

/// Header label definition
#[derive(Debug, Clone)]
pub struct HeaderSpec {
    pub label: &'static str,
    pub kind: HandlerKind,
    pub fields: Vec<FieldSpec>,
}

fn trimmed(name: &'static str, start: usize, stop: usize) -> FieldSpec {
    pure(name, start, stop, fields::trim)
}

fn pure(
    name: &'static str,
    start: usize,
    stop: usize,
    f: fn(&str) -> Result<Value, FormatError>,
) -> FieldSpec {
    FieldSpec {
        name,
        start,
        stop,
        convert: Convert::Pure(f),
    }
}

fn continued(name: &'static str, start: usize, stop: usize, c: Continued) -> FieldSpec {
    FieldSpec {
        name,
        start,
        stop,
        convert: Convert::Continued(c),
    }
}

fn spec(label: &'static str, kind: HandlerKind, fields: Vec<FieldSpec>) -> (&'static str, HeaderSpec) {
    (
        label,
        HeaderSpec {
            label,
            kind,
            fields,
        },
    )
}

lazy_static! {
    /// Known labels, immutable. Per decoding state lives in [Registry].
    static ref HEADERS: HashMap<&'static str, HeaderSpec> = {
        use HandlerKind::*;
        use OccurrencePolicy::*;
        let warn = Single(WarnAndReplace);
        [
            spec("CRINEX VERS   / TYPE", warn, vec![
                pure("crnxver", 0, 20, fields::crinex_version),
                pure("is_crx", 0, 0, fields::truth),
            ]),
            spec("CRINEX PROG / DATE", warn, vec![
                trimmed("crnxprog", 0, 20),
                trimmed("crxdate", 40, 60),
                pure("is_crx", 0, 0, fields::truth),
            ]),
            spec("RINEX VERSION / TYPE", warn, vec![
                pure("rnxver", 0, 9, fields::rinex_version),
                pure("filetype", 20, 21, fields::observation_type),
                pure("satsystem", 40, 41, fields::satellite_system),
            ]),
            spec("PGM / RUN BY / DATE", warn, vec![
                trimmed("rnxprog", 0, 20),
                trimmed("agency", 20, 40),
                trimmed("filedate", 40, 60),
            ]),
            spec("COMMENT", Multi, vec![trimmed("comment", 0, 60)]),
            spec("MARKER NAME", RecordIndexed, vec![trimmed("marker", 0, 60)]),
            spec("MARKER NUMBER", RecordIndexed, vec![trimmed("markernum", 0, 20)]),
            spec("APPROX POSITION XYZ", RecordIndexed, vec![
                pure("markerpos", 0, 42, fields::triple),
            ]),
            spec("OBSERVER / AGENCY", warn, vec![
                trimmed("observer", 0, 20),
                trimmed("obsagency", 20, 60),
            ]),
            spec("REC # / TYPE / VERS", warn, vec![
                trimmed("receivernum", 0, 20),
                trimmed("receivertype", 20, 40),
                trimmed("receiververs", 40, 60),
            ]),
            spec("ANT # / TYPE", RecordIndexed, vec![
                trimmed("antennanum", 0, 20),
                trimmed("antennatype", 20, 40),
            ]),
            spec("ANTENNA: DELTA H/E/N", RecordIndexed, vec![
                pure("antennashift", 0, 42, fields::triple),
            ]),
            spec("WAVELENGTH FACT L1/2", RecordIndexed, vec![
                continued("ambiguity", 0, 60, Continued::WavelengthFactors),
            ]),
            spec("# / TYPES OF OBSERV", RecordIndexed, vec![
                continued("obscodes", 0, 60, Continued::ObservationTypes),
            ]),
            spec("INTERVAL", RecordIndexed, vec![pure("interval", 0, 10, fields::float)]),
            spec("TIME OF FIRST OBS", Single(Forbid), vec![
                pure("firsttime", 0, 43, fields::header_epoch),
                pure("firstyear", 0, 6, fields::integer),
                trimmed("firsttimesys", 48, 51),
            ]),
            spec("TIME OF LAST OBS", warn, vec![
                pure("endtime", 0, 43, fields::header_epoch),
                trimmed("endtimesys", 48, 51),
            ]),
            spec("RCV CLOCK OFFS APPL", RecordIndexed, vec![
                pure("rcvclockoffsappl", 0, 6, fields::integer),
            ]),
            spec("LEAP SECONDS", RecordIndexed, vec![pure("leapseconds", 0, 6, fields::integer)]),
            spec("# OF SATELLITES", warn, vec![pure("numsatellites", 0, 6, fields::integer)]),
            spec("PRN / # OF OBS", Single(SilentReplace), vec![
                continued("obscount", 3, 60, Continued::SatelliteObsCounts),
            ]),
        ]
        .into_iter()
        .collect()
    };
}

/// Returns the definition of this label, exact match only.
/// Trailing whitespace is not significant.
pub fn lookup(label: &str) -> Option<&'static HeaderSpec> {
    HEADERS.get(label.trim_end())
}

fn squeezed(label: &str) -> String {
    label.split_whitespace().collect()
}

/// One header line and its provenance
#[derive(Debug, Clone, Copy)]
pub struct HeaderLine<'a> {
    /// Entire line
    pub content: &'a str,
    /// Record index from which this line applies
    pub record: usize,
    /// Line number
    pub number: usize,
    /// Epoch of the triggering event, if any
    pub epoch: Option<Epoch>,
}

impl<'a> HeaderLine<'a> {
    /// Label, columns 61-80
    pub fn label(&self) -> &'a str {
        field(self.content, 60, 80)
    }
    /// Returns true if this line terminates a header block
    pub fn is_end_of_header(&self) -> bool {
        let label = self.label();
        label.trim_end() == END_OF_HEADER || squeezed(label) == squeezed(END_OF_HEADER)
    }
}

/// Per decoding state of the header parser: occurrences and
/// continuation converters. The label definitions themselves are shared.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    seen: HashSet<&'static str>,
    continuations: Continuations,
}

pub use fields::Continuations;

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifies the label of this line. Labels with incorrect whitespace
    /// are accepted with a [Warning], unknown labels are reported and skipped.
    pub fn resolve(line: &HeaderLine, warnings: &mut Vec<Warning>) -> Option<&'static HeaderSpec> {
        let label = line.label();
        if let Some(spec) = lookup(label) {
            return Some(spec);
        }
        let wanted = squeezed(label);
        match HEADERS.values().find(|spec| squeezed(spec.label) == wanted) {
            Some(spec) => {
                warnings.push(Warning::MangledLabel {
                    found: label.to_string(),
                    expected: spec.label.to_string(),
                    line: line.number,
                });
                Some(spec)
            },
            None => {
                warnings.push(Warning::UnknownLabel {
                    label: label.to_string(),
                    line: line.number,
                });
                None
            },
        }
    }

    /// Parses one header line into the [HeaderStore].
    /// Unknown labels are skipped (with a [Warning]).
    pub fn read(
        &mut self,
        line: &HeaderLine,
        store: &mut HeaderStore,
        tracker: &mut AmbiguityTracker,
        warnings: &mut Vec<Warning>,
    ) -> Result<(), Error> {
        let spec = match Self::resolve(line, warnings) {
            Some(spec) => spec,
            None => return Ok(()),
        };

        if let HandlerKind::Single(policy) = spec.kind {
            if !self.seen.insert(spec.label) {
                match policy {
                    OccurrencePolicy::Forbid => {
                        return Err(Error::format(
                            line.number,
                            line.label(),
                            FormatError::RepeatedHeader(spec.label.to_string()),
                        ));
                    },
                    OccurrencePolicy::WarnAndReplace => {
                        warnings.push(Warning::RepeatedHeader {
                            label: spec.label.to_string(),
                            line: line.number,
                        });
                    },
                    OccurrencePolicy::SilentReplace => {},
                }
            }
        }

        for fieldspec in spec.fields.iter() {
            let raw = field(line.content, fieldspec.start, fieldspec.stop);
            let value = match fieldspec.convert {
                Convert::Pure(f) => f(raw),
                Convert::Continued(Continued::ObservationTypes) => {
                    self.continuations.observation_types(raw)
                },
                Convert::Continued(Continued::WavelengthFactors) => {
                    self.continuations.wavelength_factors(raw, tracker)
                },
                Convert::Continued(Continued::SatelliteObsCounts) => {
                    self.continuations
                        .satellite_counts(raw, line.number, warnings)
                },
            }
            .map_err(|e| Error::format(line.number, line.content, e))?;

            let value = HeaderValue {
                value,
                record: line.record,
                line: line.number,
                epoch: line.epoch,
            };
            match spec.kind {
                HandlerKind::Single(_) => store.set_single(fieldspec.name, value),
                HandlerKind::Multi => store.push(fieldspec.name, value),
                HandlerKind::RecordIndexed => store.set_indexed(fieldspec.name, value),
            }
        }

        #[cfg(feature = "log")]
        debug!("line {}: \"{}\"", line.number, spec.label);
        Ok(())
    }
}
