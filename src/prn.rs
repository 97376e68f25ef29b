//! RINEX 2 satellite identification
use crate::{
    columns::{char_at, field, to_int},
    error::FormatError,
    prelude::{Constellation, SV},
};

use std::str::FromStr;

/// Identifies the [Constellation] from a single letter RINEX 2 code.
/// Blank letters default to GPS.
pub(crate) fn constellation(letter: Option<char>) -> Result<Constellation, FormatError> {
    match letter {
        None | Some(' ') => Ok(Constellation::GPS),
        Some(c) => Constellation::from_str(&c.to_string())
            .or(Err(FormatError::Constellation(c.to_string()))),
    }
}

/// Parses the 3 column (A1,I2) satellite descriptor starting at `start`
pub(crate) fn parse_prn(line: &str, start: usize) -> Result<SV, FormatError> {
    let constellation = constellation(char_at(line, start))?;
    let prn = to_int(field(line, start + 1, start + 3))?;
    let prn = u8::try_from(prn).or(Err(FormatError::IntegerField(prn.to_string())))?;
    Ok(SV::new(constellation, prn))
}
