//! Fixed column helpers shared by all line parsers
use crate::error::FormatError;

/// Returns columns `[start, stop)` of this line,
/// truncated to what the line actually contains.
/// Short lines yield an empty (or partial) field, never a panic.
pub(crate) fn field(line: &str, start: usize, stop: usize) -> &str {
    let stop = stop.min(line.len());
    if start >= stop {
        return "";
    }
    line.get(start..stop).unwrap_or("")
}

/// Returns the single character at column `pos`, if any
pub(crate) fn char_at(line: &str, pos: usize) -> Option<char> {
    line.as_bytes().get(pos).map(|b| *b as char)
}

/// Blank fields are interpreted as 0
pub(crate) fn to_int(content: &str) -> Result<i64, FormatError> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(0);
    }
    content
        .parse::<i64>()
        .or(Err(FormatError::IntegerField(content.to_string())))
}

/// Blank fields are interpreted as 0.0
pub(crate) fn to_float(content: &str) -> Result<f64, FormatError> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(0.0);
    }
    content
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .or(Err(FormatError::FloatField(content.to_string())))
}

/// Parses a seconds field (`ss.sssssss`) without floating point conversion,
/// returning (seconds, nanoseconds).
pub(crate) fn to_secs_nanos(content: &str) -> Result<(u8, u32), FormatError> {
    let content = content.trim();
    let err = || FormatError::DateTime(content.to_string());
    let (secs, frac) = match content.find('.') {
        Some(dot) => (&content[..dot], &content[dot + 1..]),
        None => (content, ""),
    };
    let secs = if secs.trim().is_empty() {
        0
    } else {
        secs.trim().parse::<u8>().or(Err(err()))?
    };
    let frac = frac.trim_end();
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(err());
    }
    let mut nanos = 0_u32;
    for (i, c) in frac.chars().take(9).enumerate() {
        let digit = c.to_digit(10).ok_or_else(err)?;
        nanos += digit * 10_u32.pow(8 - i as u32);
    }
    Ok((secs, nanos))
}
