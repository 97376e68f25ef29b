//! Standard (readable) RINEX 2 scanner
use super::{list_prn, Descriptor, EpochRecord};

use crate::{
    columns::{field, to_float, to_int},
    error::{Error, FormatError},
    observation::RawObservation,
    prelude::{TimeScale, SV},
    reader::LineSource,
};

use num_integer::div_ceil;

/// Satellites per epoch descriptor line
const PRN_PER_LINE: usize = 12;

/// Observations per line
const OBS_PER_LINE: usize = 5;

/// Observation field width: F14.3, LLI and STR digits
const OBS_WIDTH: usize = 16;

/// Scans readable RINEX 2: one 80 column descriptor per epoch,
/// possibly continued when more than 12 satellites were tracked.
#[derive(Debug, Clone)]
pub struct StandardScanner {
    pub(crate) descriptor: Descriptor,
}

impl StandardScanner {
    pub fn new(base_year: i32, timescale: TimeScale) -> Self {
        Self {
            descriptor: Descriptor::new(base_year, timescale),
        }
    }

    pub fn update<S: LineSource>(&mut self, source: &mut S) -> Result<Option<EpochRecord>, Error> {
        match source.next()? {
            Some(line) => self.descriptor.parse(line, source.line_number()).map(Some),
            None => Ok(None),
        }
    }

    pub fn prn_list<S: LineSource>(&mut self, source: &mut S) -> Result<Vec<SV>, Error> {
        let numsat = self.descriptor.numsat();
        let mut prns = Vec::with_capacity(numsat);
        let mut line = self.descriptor.line.clone();
        let mut line_number = self.descriptor.line_number();
        for i in 0..numsat {
            let slot = i % PRN_PER_LINE;
            if i > 0 && slot == 0 {
                line = source.require("satellites list")?;
                line_number = source.line_number();
            }
            prns.push(list_prn(&line, slot, line_number)?);
        }
        Ok(prns)
    }

    /// Clock offset is optional, columns 69-80
    pub fn offset(&self) -> Result<f64, Error> {
        let line = &self.descriptor.line;
        to_float(field(line, 68, 80))
            .map_err(|e| Error::format(self.descriptor.line_number(), line, e))
    }

    /// A cycle slip record is laid out like an observation record
    pub fn skip<S: LineSource>(&mut self, source: &mut S, num_obs: usize) -> Result<(), Error> {
        let lines = self.descriptor.numsat() * div_ceil(num_obs, OBS_PER_LINE);
        for _ in 0..lines {
            source.require("cycle slip record")?;
        }
        Ok(())
    }
}

/// Observations of one satellite, 5 per line,
/// as many lines as required by the number of observation types.
#[derive(Debug, Clone, Default)]
pub struct ObsLine {
    num_obs: usize,
    observations: Vec<RawObservation>,
}

impl ObsLine {
    pub fn new(num_obs: usize) -> Self {
        Self {
            num_obs,
            observations: Vec::with_capacity(num_obs),
        }
    }

    /// Consumes the line(s) of one satellite
    pub fn update<S: LineSource>(&mut self, source: &mut S) -> Result<(), Error> {
        self.observations.clear();
        let mut line = String::new();
        for index in 0..self.num_obs {
            let slot = index % OBS_PER_LINE;
            if slot == 0 {
                line = source.require("observations")?;
            }
            let start = slot * OBS_WIDTH;
            let obs = parse_observation(field(&line, start, start + OBS_WIDTH))
                .map_err(|e| Error::format(source.line_number(), &line, e))?;
            self.observations.push(obs);
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> RawObservation {
        self.observations.get(index).copied().unwrap_or_default()
    }
}

fn parse_observation(content: &str) -> Result<RawObservation, FormatError> {
    let value = field(content, 0, 14);
    Ok(RawObservation {
        value: to_float(value)?,
        present: !value.trim().is_empty(),
        lli: to_int(field(content, 14, 15))? as u8,
        snr: to_int(field(content, 15, 16))? as u8,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{prelude::Constellation, reader::LineReader};

    #[test]
    fn observation_fields() {
        let obs = parse_observation("  20000000.000  ").unwrap();
        assert_eq!(obs.value, 20000000.0);
        assert!(obs.present);
        assert_eq!(obs.lli, 0);
        assert_eq!(obs.snr, 0);

        let obs = parse_observation(" 116942664.85017").unwrap();
        assert_eq!(obs.value, 116942664.850);
        assert_eq!(obs.lli, 1);
        assert_eq!(obs.snr, 7);

        let obs = parse_observation("").unwrap();
        assert!(!obs.present);
        assert_eq!(obs.value, 0.0);
    }
    #[test]
    fn continued_prn_list() {
        let content = format!(
            "{}{}\n{:32}{}",
            " 21  1  1  0  0  0.0000000  0 14G01G02G03G04G05G06G07G08G09G10G11G12",
            "-0.123456789",
            "",
            "G13R01"
        );
        let mut source = LineReader::from_text(&content);
        let mut scanner = StandardScanner::new(2021, TimeScale::GPST);
        let record = scanner.update(&mut source).unwrap().unwrap();
        assert_eq!(record.numsat, 14);
        assert_eq!(scanner.offset().unwrap(), -0.123456789);
        let prns = scanner.prn_list(&mut source).unwrap();
        assert_eq!(prns.len(), 14);
        assert_eq!(prns[0], SV::new(Constellation::GPS, 1));
        assert_eq!(prns[12], SV::new(Constellation::GPS, 13));
        assert_eq!(prns[13], SV::new(Constellation::Glonass, 1));
        assert_eq!(source.line_number(), 2);
    }
    #[test]
    fn truncated_prn_list() {
        let content = " 21  1  1  0  0  0.0000000  0 14G01G02G03G04G05G06G07G08G09G10G11G12";
        let mut source = LineReader::from_text(content);
        let mut scanner = StandardScanner::new(2021, TimeScale::GPST);
        scanner.update(&mut source).unwrap();
        let err = scanner.prn_list(&mut source).unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&FormatError::UnexpectedEof("satellites list"))
        );
    }
    #[test]
    fn multi_line_observations() {
        let first: String = [20000000.0, 1.0, 2.0, 3.0, 4.0]
            .iter()
            .map(|v| format!("{:14.3}  ", v))
            .collect();
        let content = format!("{}\n{:14.3}4", first, 5.0);
        let mut source = LineReader::from_text(&content);
        let mut obsline = ObsLine::new(6);
        obsline.update(&mut source).unwrap();
        assert_eq!(obsline.get(0).value, 20000000.0);
        assert_eq!(obsline.get(4).value, 4.0);
        assert_eq!(obsline.get(5).value, 5.0);
        assert_eq!(obsline.get(5).lli, 4);
        assert_eq!(obsline.get(5).snr, 0);
        assert!(!obsline.get(6).present);
        assert_eq!(source.line_number(), 2);
    }
}
