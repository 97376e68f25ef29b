//! Header field converters
use super::Value;

use crate::{
    ambiguity::AmbiguityTracker,
    columns::{field, to_float, to_int},
    epoch::parse_header_epoch,
    error::{FormatError, Warning},
    prn::{constellation, parse_prn},
    prelude::SV,
    version::{Version, SUPPORTED_CRX_VERSION},
};

use std::{collections::BTreeMap, str::FromStr};

/// Maximal number of observation codes per `# / TYPES OF OBSERV` line
const CODES_PER_LINE: usize = 9;

/// Maximal number of satellites per `WAVELENGTH FACT L1/2` line
const SATS_PER_WAVELENGTH_LINE: usize = 7;

/// Maximal number of counts per `PRN / # OF OBS` line
const COUNTS_PER_LINE: usize = 9;

pub(crate) fn trim(content: &str) -> Result<Value, FormatError> {
    Ok(Value::Text(content.trim().to_string()))
}

pub(crate) fn truth(_: &str) -> Result<Value, FormatError> {
    Ok(Value::Flag(true))
}

pub(crate) fn integer(content: &str) -> Result<Value, FormatError> {
    Ok(Value::Integer(to_int(content)?))
}

pub(crate) fn float(content: &str) -> Result<Value, FormatError> {
    Ok(Value::Float(to_float(content)?))
}

/// Three consecutive F14.4 fields
pub(crate) fn triple(content: &str) -> Result<Value, FormatError> {
    Ok(Value::Triple((
        to_float(field(content, 0, 14))?,
        to_float(field(content, 14, 28))?,
        to_float(field(content, 28, 42))?,
    )))
}

/// Only 2.x revisions may be decoded
pub(crate) fn rinex_version(content: &str) -> Result<Value, FormatError> {
    let version = Version::from_str(content)?;
    if !version.is_supported() {
        return Err(FormatError::NonSupportedVersion(content.trim().to_string()));
    }
    Ok(Value::Version(version))
}

/// Only CRINEX 1.0 may be decoded
pub(crate) fn crinex_version(content: &str) -> Result<Value, FormatError> {
    match Version::from_str(content) {
        Ok(version) if version == SUPPORTED_CRX_VERSION && content.trim() == "1.0" => {
            Ok(Value::Version(version))
        },
        _ => Err(FormatError::NonSupportedCrxVersion(
            content.trim().to_string(),
        )),
    }
}

/// Only Observation RINEX may be decoded
pub(crate) fn observation_type(content: &str) -> Result<Value, FormatError> {
    match content.trim().to_ascii_uppercase().as_str() {
        "O" => Ok(Value::Char('O')),
        _ => Err(FormatError::NotObservationData),
    }
}

/// Satellite system, blank defaults to GPS
pub(crate) fn satellite_system(content: &str) -> Result<Value, FormatError> {
    let letter = content.chars().next();
    constellation(letter)?;
    match letter {
        None | Some(' ') => Ok(Value::Char('G')),
        Some(c) => Ok(Value::Char(c.to_ascii_uppercase())),
    }
}

pub(crate) fn header_epoch(content: &str) -> Result<Value, FormatError> {
    Ok(Value::Epoch(parse_header_epoch(content)?))
}

/// State of the converters that span several lines.
/// A continuation line (blank count field) completes the state
/// initiated by a previous line. Each decoding process owns its own.
#[derive(Debug, Clone, Default)]
pub struct Continuations {
    /// Declared number of observation codes and codes gathered so far
    obs_codes: Option<(usize, Vec<String>)>,
    /// Pending per satellite wavelength definition: factors and
    /// number of satellites still to be listed
    wavelength: Option<((u8, u8), usize)>,
    /// Satellite described by the latest `PRN / # OF OBS`
    counts_sv: Option<SV>,
    counts: BTreeMap<SV, Vec<u32>>,
}

impl Continuations {
    /// `# / TYPES OF OBSERV`: (I6, 4X, 9(4X, A2))
    pub(crate) fn observation_types(&mut self, content: &str) -> Result<Value, FormatError> {
        let declared = to_int(field(content, 0, 6))?;
        let declared = usize::try_from(declared)
            .or(Err(FormatError::IntegerField(declared.to_string())))?;

        let (num, codes) = match (&mut self.obs_codes, declared) {
            (Some((num, codes)), 0) => {
                if codes.len() >= *num {
                    return Err(FormatError::ContinuationOverflow);
                }
                (*num, codes)
            },
            (_, 0) => return Err(FormatError::OrphanContinuation),
            (state, num) => {
                *state = Some((num, Vec::with_capacity(num)));
                match state {
                    Some((_, codes)) => (num, codes),
                    None => unreachable!("state just defined"),
                }
            },
        };

        let remaining = (num - codes.len()).min(CODES_PER_LINE);
        for i in 0..remaining {
            let start = 6 * i + 10;
            codes.push(field(content, start, start + 2).trim().to_string());
        }
        Ok(Value::Codes(codes.clone()))
    }

    /// `WAVELENGTH FACT L1/2`: (2I6, I6, 7(3X, A1, I2))
    pub(crate) fn wavelength_factors(
        &mut self,
        content: &str,
        tracker: &mut AmbiguityTracker,
    ) -> Result<Value, FormatError> {
        let (factors, listed) = if field(content, 0, 6).trim().is_empty() {
            // continuation of a per satellite definition
            match self.wavelength.take() {
                Some(pending) => pending,
                None => return Err(FormatError::OrphanContinuation),
            }
        } else {
            let l1 = wavelength_factor(field(content, 0, 6))?;
            let l2 = wavelength_factor(field(content, 6, 12))?;
            let numsat = to_int(field(content, 12, 18))?;
            let numsat = usize::try_from(numsat)
                .or(Err(FormatError::IntegerField(numsat.to_string())))?;
            self.wavelength = None;
            if numsat == 0 {
                tracker.set_global((l1, l2));
                return Ok(Value::Ambiguity(tracker.clone()));
            }
            ((l1, l2), numsat)
        };

        let on_this_line = listed.min(SATS_PER_WAVELENGTH_LINE);
        for i in 0..on_this_line {
            let sv = parse_prn(content, 21 + 6 * i)?;
            tracker.set(sv, factors);
        }
        if listed > on_this_line {
            self.wavelength = Some((factors, listed - on_this_line));
        }
        Ok(Value::Ambiguity(tracker.clone()))
    }

    /// `PRN / # OF OBS`: (3X, A1, I2, 9I6), content starts at column 4.
    pub(crate) fn satellite_counts(
        &mut self,
        content: &str,
        line: usize,
        warnings: &mut Vec<Warning>,
    ) -> Result<Value, FormatError> {
        let sv = if field(content, 0, 3).trim().is_empty() {
            match self.counts_sv {
                Some(sv) => sv,
                None => return Err(FormatError::OrphanContinuation),
            }
        } else {
            let sv = parse_prn(content, 0)?;
            self.counts_sv = Some(sv);
            if self.counts.contains_key(&sv) {
                warnings.push(Warning::RepeatedSatelliteCounts { sv, line });
            } else {
                self.counts.insert(sv, Vec::with_capacity(COUNTS_PER_LINE));
            }
            sv
        };

        let counts = self.counts.entry(sv).or_default();
        for i in 0..COUNTS_PER_LINE {
            let start = 3 + 6 * i;
            let count = field(content, start, start + 6);
            if count.trim().is_empty() {
                break;
            }
            let count = to_int(count)?;
            counts.push(
                u32::try_from(count).or(Err(FormatError::IntegerField(count.to_string())))?,
            );
        }
        Ok(Value::ObsCounts(self.counts.clone()))
    }
}

fn wavelength_factor(content: &str) -> Result<u8, FormatError> {
    let factor = to_int(content)?;
    match factor {
        0..=2 => Ok(factor as u8),
        _ => Err(FormatError::WavelengthFactor(factor)),
    }
}
