//! Compact RINEX observation line recovery
use super::{CharArc, DataArc, MAX_ORDER};
use crate::{columns::to_int, error::FormatError, observation::RawObservation};

#[cfg(feature = "log")]
use log::trace;

/// Parses a `k&v` (re)initialization token, returning (order, value)
pub(crate) fn parse_init_token(token: &str) -> Result<Option<(usize, i64)>, FormatError> {
    let Some(amp) = token.find('&') else {
        return Ok(None);
    };
    let (order, value) = (&token[..amp], &token[amp + 1..]);
    if amp == 0 || !order.chars().all(|c| c.is_ascii_digit()) {
        return Ok(None);
    }
    let order = to_int(order)? as usize;
    if order > MAX_ORDER {
        return Err(FormatError::MaximalCompressionOrder(order));
    }
    let value = to_int(value)?;
    Ok(Some((order, value)))
}

/// Per satellite set of arcs: one numerical [DataArc] and
/// two [CharArc]s (LLI, STR) per observation type.
/// This state persists over the entire decoding process, since
/// each compact line is a difference against the previous one.
#[derive(Debug, Clone, Default)]
pub struct ObsArcs {
    arcs: Vec<DataArc>,
    lli: Vec<CharArc>,
    snr: Vec<CharArc>,
    /// Whether each observation was present in the last line
    present: Vec<bool>,
}

impl ObsArcs {
    /// Builds a new set of (uninitialized) arcs
    pub fn new(num_obs: usize) -> Self {
        let mut s = Self::default();
        s.resize(num_obs);
        s
    }

    /// Number of observations this set tracks
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Adapts to a new list of observation types.
    /// Newly introduced types start uninitialized.
    pub fn resize(&mut self, num_obs: usize) {
        self.arcs.resize_with(num_obs, DataArc::default);
        self.lli.resize_with(num_obs, CharArc::default);
        self.snr.resize_with(num_obs, CharArc::default);
        self.present.resize(num_obs, false);
    }

    /// Absorbs one compact observation line.
    /// The first `len()` space separated tokens feed the numerical arcs,
    /// the remainder is interleaved (LLI, STR) pairs.
    pub fn update(&mut self, line: &str) -> Result<(), FormatError> {
        let num_obs = self.arcs.len();
        let mut tokens = line.splitn(num_obs + 1, ' ');

        for index in 0..num_obs {
            let token = tokens.next().unwrap_or("");
            let arc = &mut self.arcs[index];
            if let Some((order, value)) = parse_init_token(token)? {
                #[cfg(feature = "log")]
                trace!("arc #{} (re)init: order={} value={}", index, order, value);
                arc.force_init(order, value);
                self.present[index] = true;
            } else if !token.trim().is_empty() {
                if !arc.is_initialized() {
                    return Err(FormatError::UninitializedDataArc);
                }
                arc.update(to_int(token)?)?;
                self.present[index] = true;
            } else {
                self.present[index] = false;
            }
        }

        if let Some(flags) = tokens.next() {
            let flags: Vec<char> = flags.chars().take(num_obs * 2).collect();
            for (index, pair) in flags.chunks(2).enumerate() {
                self.lli[index].update(&pair[0].to_string());
                if let Some(snr) = pair.get(1) {
                    self.snr[index].update(&snr.to_string());
                }
            }
        }
        Ok(())
    }

    /// Returns the recovered observation, scaled back to its true value
    pub fn get(&self, index: usize) -> RawObservation {
        let present = self.present.get(index).copied().unwrap_or(false);
        RawObservation {
            value: if present {
                self.arcs[index].value() as f64 / 1000.0
            } else {
                0.0
            },
            present,
            lli: self.lli.get(index).map(|arc| arc.value()).unwrap_or(0),
            snr: self.snr.get(index).map(|arc| arc.value()).unwrap_or(0),
        }
    }
}
