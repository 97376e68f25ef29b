//! Observation timestamps
use crate::{
    columns::{field, to_int, to_secs_nanos},
    error::FormatError,
    prelude::{Epoch, TimeScale},
};

mod flag;
pub use flag::EpochFlag;

/// Default baseline, when the header does not describe the first observation
pub const DEFAULT_BASE_YEAR: i32 = 2000;

/// Disambiguates a two digit year, given a nearby full baseline year.
/// ```
/// use rinex_obs::epoch::full_year;
/// assert_eq!(full_year(99, 2000), 1999);
/// assert_eq!(full_year(0, 1999), 2000);
/// assert_eq!(full_year(21, 2021), 2021);
/// ```
pub fn full_year(year: i32, base_year: i32) -> i32 {
    let mut century = base_year.div_euclid(100);
    let delta = base_year.rem_euclid(100) - year;
    if delta > 80 {
        // baseline 1999 and year 00: probably not 1900
        century += 1;
    } else if delta <= -80 {
        // baseline 2000 and year 99: probably not 2099
        century -= 1;
    }
    year + century * 100
}

/// Maps the time system of `TIME OF FIRST OBS` to a [TimeScale].
/// GPS is the default time system of RINEX 2 observations.
pub fn timescale(system: &str) -> TimeScale {
    match system.trim() {
        "GLO" => TimeScale::UTC,
        "GAL" => TimeScale::GST,
        _ => TimeScale::GPST,
    }
}

/// Parses the timestamp of an epoch descriptor (columns 1-26).
/// Blank descriptors (header events) return None.
pub(crate) fn parse_obs_epoch(
    content: &str,
    base_year: i32,
    ts: TimeScale,
) -> Result<Option<Epoch>, FormatError> {
    if content.trim().is_empty() {
        return Ok(None);
    }
    let y = to_int(field(content, 0, 3))?;
    let m = to_int(field(content, 3, 6))?;
    let d = to_int(field(content, 6, 9))?;
    let hh = to_int(field(content, 9, 12))?;
    let mm = to_int(field(content, 12, 15))?;
    let (ss, ns) = to_secs_nanos(field(content, 15, 26))?;

    let year = full_year(y as i32, base_year);
    build_epoch(content, year, m, d, hh, mm, ss, ns, ts).map(Some)
}

/// Parses the `TIME OF FIRST OBS` / `TIME OF LAST OBS` timestamp,
/// "yyyy mm dd hh mm ss.sssssss", interpreted in GPST.
pub(crate) fn parse_header_epoch(content: &str) -> Result<Epoch, FormatError> {
    let items: Vec<&str> = content.split_ascii_whitespace().collect();
    if items.len() != 6 {
        return Err(FormatError::DateTime(content.trim().to_string()));
    }
    let y = to_int(items[0])?;
    let m = to_int(items[1])?;
    let d = to_int(items[2])?;
    let hh = to_int(items[3])?;
    let mm = to_int(items[4])?;
    let (ss, ns) = to_secs_nanos(items[5])?;
    build_epoch(content, y as i32, m, d, hh, mm, ss, ns, TimeScale::GPST)
}

#[allow(clippy::too_many_arguments)]
fn build_epoch(
    content: &str,
    y: i32,
    m: i64,
    d: i64,
    hh: i64,
    mm: i64,
    ss: u8,
    ns: u32,
    ts: TimeScale,
) -> Result<Epoch, FormatError> {
    let err = || FormatError::DateTime(content.trim().to_string());
    let m = u8::try_from(m).or(Err(err()))?;
    let d = u8::try_from(d).or(Err(err()))?;
    let hh = u8::try_from(hh).or(Err(err()))?;
    let mm = u8::try_from(mm).or(Err(err()))?;
    Epoch::maybe_from_gregorian(y, m, d, hh, mm, ss, ns, ts).or(Err(err()))
}
