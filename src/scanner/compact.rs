//! Compact RINEX 1.0 scanner
use super::{list_prn, Descriptor, EpochRecord};

use crate::{
    columns::to_int,
    error::{Error, FormatError},
    hatanaka::{parse_init_token, DataArc, ObsArcs, TextDiff},
    prelude::{TimeScale, SV},
    reader::LineSource,
};

use std::collections::HashMap;

#[cfg(feature = "log")]
use log::trace;

/// Clock offsets are given in nanoseconds
const CLOCK_SCALING: f64 = 1.0E9;

/// Scans Compact RINEX: each descriptor is overlaid onto the previous one,
/// a clock offset line follows each observation descriptor, and each satellite
/// is described by a single line of differences.
#[derive(Debug, Clone)]
pub struct CompactScanner {
    pub(crate) descriptor: Descriptor,
    textdiff: TextDiff,
    clock: Option<DataArc>,
    arcs: HashMap<SV, ObsArcs>,
}

impl CompactScanner {
    pub fn new(base_year: i32, timescale: TimeScale) -> Self {
        Self {
            descriptor: Descriptor::new(base_year, timescale),
            textdiff: TextDiff::default(),
            clock: None,
            arcs: HashMap::with_capacity(32),
        }
    }

    /// A descriptor starting with `&` is complete, otherwise it is overlaid
    pub fn update<S: LineSource>(&mut self, source: &mut S) -> Result<Option<EpochRecord>, Error> {
        let line = match source.next()? {
            Some(line) => line,
            None => return Ok(None),
        };
        if line.starts_with('&') {
            self.textdiff.force_init(&line);
        } else {
            self.textdiff.decompress(&line);
        }
        let recovered = self.textdiff.as_str().to_string();
        self.descriptor.parse(recovered, source.line_number()).map(Some)
    }

    /// The recovered descriptor always contains the entire list
    pub fn prn_list(&self) -> Result<Vec<SV>, Error> {
        let line_number = self.descriptor.line_number();
        (0..self.descriptor.numsat())
            .map(|i| list_prn(&self.descriptor.line, i, line_number))
            .collect()
    }

    /// Clock offset has its own arc. Blank lines mean "no offset".
    pub fn offset<S: LineSource>(&mut self, source: &mut S) -> Result<f64, Error> {
        let line = source.require("clock offset")?;
        let err = |e: FormatError| Error::format(source.line_number(), &line, e);

        if let Some((order, value)) = parse_init_token(line.trim()).map_err(err)? {
            #[cfg(feature = "log")]
            trace!("clock arc (re)init: order={} value={}", order, value);
            let mut arc = DataArc::new(order);
            arc.force_init(order, value);
            self.clock = Some(arc);
        } else if !line.trim().is_empty() {
            let diff = to_int(&line).map_err(err)?;
            match self.clock.as_mut() {
                Some(arc) => {
                    arc.update(diff).map_err(err)?;
                },
                None => return Err(err(FormatError::UninitializedClockArc)),
            }
        } else {
            return Ok(0.0);
        }

        Ok(self
            .clock
            .as_ref()
            .map(|arc| arc.value() as f64 / CLOCK_SCALING)
            .unwrap_or(0.0))
    }

    /// Returns the persistent arcs of this satellite, created on first sight,
    /// resized when the list of observation types changed.
    pub fn arcs(&mut self, sv: SV, num_obs: usize) -> &mut ObsArcs {
        let arcs = self
            .arcs
            .entry(sv)
            .or_insert_with(|| ObsArcs::new(num_obs));
        if arcs.len() != num_obs {
            arcs.resize(num_obs);
        }
        arcs
    }

    /// One line per satellite, arcs are not fed.
    pub fn skip<S: LineSource>(&mut self, source: &mut S) -> Result<(), Error> {
        for _ in 0..self.descriptor.numsat() {
            source.require("cycle slip record")?;
        }
        Ok(())
    }
}
