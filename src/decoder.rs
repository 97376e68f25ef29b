//! Observation RINEX decoding process
use crate::{
    ambiguity::AmbiguityTracker,
    epoch::{timescale, EpochFlag, DEFAULT_BASE_YEAR},
    error::{Error, FormatError, Warning},
    header::{HeaderLine, HeaderValue, Registry, Value},
    observation::ObservationValue,
    prelude::{Epoch, SV},
    reader::LineSource,
    scanner::{EpochRecord, Scanner},
    sink::{ObservationCounts, ObservationSink},
};

#[cfg(feature = "log")]
use log::debug;

/// [Decoder] drives the decoding of one RINEX 2 (or CRINEX 1)
/// observation content into an [ObservationSink].
/// ```
/// use rinex_obs::prelude::*;
///
/// let content = "     2.11           OBSERVATION DATA    G (GPS)             RINEX VERSION / TYPE
///      1    C1                                                # / TYPES OF OBSERV
///                                                             END OF HEADER
///  21  1  1  0  0  0.0000000  0  1G01
///   20000000.000";
/// let mut source = LineReader::from_text(content);
/// let mut data = ObservationData::default();
/// Decoder::default()
///     .decode(&mut source, &mut data)
///     .unwrap();
/// assert_eq!(data.records.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoder {
    compact: bool,
    name: Option<String>,
}

impl Decoder {
    /// Forces Compact RINEX decoding, whatever the header says
    pub fn with_compact(&self, compact: bool) -> Self {
        let mut s = self.clone();
        s.compact = compact;
        s
    }

    /// Names the content, otherwise the name of the [LineSource] is used
    pub fn with_name(&self, name: &str) -> Self {
        let mut s = self.clone();
        s.name = Some(name.to_string());
        s
    }

    /// Decodes the entire content of `source` into `sink`.
    pub fn decode<S: LineSource, O: ObservationSink>(
        &self,
        source: &mut S,
        sink: &mut O,
    ) -> Result<(), Error> {
        let mut process = Process {
            registry: Registry::new(),
            tracker: AmbiguityTracker::default(),
            counts: ObservationCounts::new(),
            source,
            sink,
        };

        let name = self
            .name
            .clone()
            .or_else(|| process.source.name().map(|name| name.to_string()));
        if let Some(name) = name {
            process.sink.meta_mut().set_single(
                "filename",
                HeaderValue {
                    value: Value::Text(name),
                    record: 0,
                    line: 0,
                    epoch: None,
                },
            );
        }

        process.header_block(None, 0, None)?;
        process.validate_header();

        let meta = process.sink.meta();
        let base_year = meta
            .get("firstyear")
            .and_then(|v| v.value.as_integer())
            .map(|y| y as i32)
            .unwrap_or(DEFAULT_BASE_YEAR);
        let ts = timescale(
            meta.get("firsttimesys")
                .and_then(|v| v.value.as_text())
                .unwrap_or(""),
        );
        let compact = self.compact || meta.is_crinex();

        #[cfg(feature = "log")]
        debug!(
            "decoding {} content, base year {}, timescale {}",
            if compact { "compact" } else { "readable" },
            base_year,
            ts
        );

        let mut scanner = Scanner::new(compact, base_year, ts);
        while let Some(record) = scanner.update(process.source)? {
            process.record(&mut scanner, record)?;
        }

        let intervals = scanner.intervals().clone();
        process.sink.check(&process.counts, &intervals);
        Ok(())
    }
}

/// State of one decoding process
struct Process<'a, S: LineSource, O: ObservationSink> {
    registry: Registry,
    tracker: AmbiguityTracker,
    counts: ObservationCounts,
    source: &'a mut S,
    sink: &'a mut O,
}

impl<'a, S: LineSource, O: ObservationSink> Process<'a, S, O> {
    /// Parses a header block: either the file header (`numlines` = None)
    /// terminated by `END OF HEADER`, or the `numlines` lines of an event.
    fn header_block(
        &mut self,
        numlines: Option<usize>,
        record: usize,
        epoch: Option<Epoch>,
    ) -> Result<(), Error> {
        if numlines != Some(0) {
            self.sink.meta_mut().blocks += 1;
        }
        let mut remaining = numlines;
        loop {
            match remaining.as_mut() {
                Some(0) => break,
                Some(n) => *n -= 1,
                None => {},
            }
            let content = match self.source.next()? {
                Some(content) => content,
                None if numlines.is_none() => {
                    return Err(Error::format(
                        self.source.line_number(),
                        "",
                        FormatError::MissingHeaderDelimiter,
                    ));
                },
                None => {
                    return Err(Error::format(
                        self.source.line_number(),
                        "",
                        FormatError::UnexpectedEof("header block"),
                    ));
                },
            };
            let line = HeaderLine {
                content: &content,
                record,
                number: self.source.line_number(),
                epoch,
            };
            if line.is_end_of_header() {
                break;
            }
            let mut warnings = Vec::new();
            self.registry
                .read(&line, self.sink.meta_mut(), &mut self.tracker, &mut warnings)?;
            for warning in warnings {
                self.sink.warning(warning);
            }
        }
        Ok(())
    }

    /// Checks the file header, once parsed
    fn validate_header(&mut self) {
        let version = self
            .sink
            .meta()
            .get("rnxver")
            .and_then(|v| v.value.as_version());
        if let Some(version) = version {
            if version.is_newer() {
                self.sink.warning(Warning::NewerRevision(version.to_string()));
            }
        }
    }

    /// Processes one epoch
    fn record(&mut self, scanner: &mut Scanner, record: EpochRecord) -> Result<(), Error> {
        let index = self.sink.len();
        match record.flag {
            EpochFlag::CycleSlip => {
                let prns = scanner.prn_list(self.source)?;
                self.sink.break_phase(&prns);
                let num_obs = self.sink.obs_codes().len();
                scanner.skip(self.source, num_obs)
            },
            EpochFlag::ExternalEvent => {
                self.header_block(Some(record.numsat), index, record.epoch)
            },
            EpochFlag::HeaderInformationFollows => {
                self.header_block(Some(record.numsat), index, None)
            },
            EpochFlag::AntennaBeingMoved | EpochFlag::NewSiteOccupation => {
                self.sink
                    .set_in_motion(record.flag == EpochFlag::AntennaBeingMoved);
                self.header_block(Some(record.numsat), index, None)
            },
            EpochFlag::Ok | EpochFlag::PowerFailure => self.observations(scanner, record),
        }
    }

    /// Decodes an observation record
    fn observations(&mut self, scanner: &mut Scanner, record: EpochRecord) -> Result<(), Error> {
        let offset = scanner.offset(self.source)?;
        let codes = self.sink.obs_codes();
        self.sink
            .new_record(record.epoch, record.flag == EpochFlag::PowerFailure, offset);
        let index = self.sink.len().saturating_sub(1);

        for sv in scanner.prn_list(self.source)? {
            let mut dataline = scanner.dataline(sv, codes.len());
            dataline.update(self.source)?;
            for (i, code) in codes.iter().enumerate() {
                let raw = dataline.get(i);
                let value = ObservationValue::resolve(raw, sv, code, &self.tracker);
                self.sink.add(index, sv, code, value);
                if raw.present {
                    self.count(sv, code);
                }
            }
        }
        self.sink.check_break();
        Ok(())
    }

    fn count(&mut self, sv: SV, code: &str) {
        let counts = self.counts.entry(sv).or_default();
        match counts.get_mut(code) {
            Some(count) => *count += 1,
            None => {
                counts.insert(code.to_string(), 1);
            },
        }
    }
}
