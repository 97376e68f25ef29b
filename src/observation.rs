//! Observation values and wavelength factor resolution
use bitflags::bitflags;

use crate::{ambiguity::AmbiguityTracker, prelude::SV};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    /// Lost of Lock Indication (LLI) for phase tracking
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct LliFlags: u8 {
        /// Current epoch is marked Ok or Unknown status
        const OK_OR_UNKNOWN = 0x00;
        /// Lock lost between previous observation and current observation,
        /// cycle slip is possible
        const LOCK_LOSS = 0x01;
        /// Wavelength factor opposite to the one currently set,
        /// for this single observation
        const HALF_CYCLE_SLIP = 0x02;
        /// Observing under anti spoofing,
        /// might suffer from decreased SNR - decreased signal quality
        const UNDER_ANTI_SPOOFING = 0x04;
    }
}

/// Observation, as it stands in the file, prior any interpretation
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RawObservation {
    /// Observed value
    pub value: f64,
    /// False when the field was blank
    pub present: bool,
    /// LLI digit
    pub lli: u8,
    /// Signal strength digit
    pub snr: u8,
}

/// Decoded observation
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservationValue {
    /// Observed value
    pub value: f64,
    /// LLI bit 0
    pub lost_lock: bool,
    /// LLI bit 2
    pub antispoofing: bool,
    /// 1: full cycle ambiguity, 2: half cycle (squaring), 0: not applicable
    pub wavelength_factor: u8,
    /// Raw signal strength digit, 0 means unknown / unspecified
    pub strength: u8,
}

/// Returns the carrier frequency index of a RINEX 2 observation code
/// (L1 = 1, "P2" = 2, ..), if any
pub(crate) fn frequency(code: &str) -> Option<u8> {
    code.chars()
        .nth(1)
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
}

impl ObservationValue {
    /// Interprets a [RawObservation] of `code`, observed by `sv`.
    /// Wavelength factor is resolved with the current state of the [AmbiguityTracker].
    pub fn resolve(raw: RawObservation, sv: SV, code: &str, tracker: &AmbiguityTracker) -> Self {
        let lli = LliFlags::from_bits_truncate(raw.lli);
        let wavelength_factor = match frequency(code) {
            Some(freq) => {
                let factor = tracker.factor(sv, freq);
                if lli.contains(LliFlags::HALF_CYCLE_SLIP) {
                    AmbiguityTracker::toggle(factor)
                } else {
                    factor
                }
            },
            None => 0,
        };
        Self {
            value: raw.value,
            lost_lock: lli.contains(LliFlags::LOCK_LOSS),
            antispoofing: lli.contains(LliFlags::UNDER_ANTI_SPOOFING),
            wavelength_factor,
            strength: raw.snr,
        }
    }
}
