//! GPS L1/L2 wavelength factors (phase ambiguity) tracking
use crate::prelude::{Constellation, SV};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// (L1, L2) wavelength factors
pub type Factors = (u8, u8);

/// Full cycle ambiguities, the default
pub const DEFAULT_FACTORS: Factors = (1, 1);

/// [AmbiguityTracker] follows the `WAVELENGTH FACT L1/2` header events.
/// A "global" event applies to every GPS satellite and clears previous
/// per satellite definitions, a per satellite definition remains
/// valid until that satellite is redefined or a new global event arrives.
/// Each decoding process owns its own tracker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AmbiguityTracker {
    global: Factors,
    per_sv: BTreeMap<SV, Factors>,
}

impl Default for AmbiguityTracker {
    fn default() -> Self {
        Self {
            global: DEFAULT_FACTORS,
            per_sv: Default::default(),
        }
    }
}

impl AmbiguityTracker {
    /// Applies a global definition
    pub fn set_global(&mut self, factors: Factors) {
        self.global = factors;
        self.per_sv.clear();
    }

    /// Applies a definition to one satellite
    pub fn set(&mut self, sv: SV, factors: Factors) {
        self.per_sv.insert(sv, factors);
    }

    /// Returns current (L1, L2) factors for this satellite
    pub fn factors(&self, sv: SV) -> Factors {
        self.per_sv.get(&sv).copied().unwrap_or(self.global)
    }

    /// Returns the current wavelength factor of `sv` on carrier `freq` (1 or 2).
    /// Only GPS L1 and L2 observations have a wavelength factor, 0 otherwise.
    pub fn factor(&self, sv: SV, freq: u8) -> u8 {
        if sv.constellation != Constellation::GPS {
            return 0;
        }
        let (l1, l2) = self.factors(sv);
        match freq {
            1 => l1,
            2 => l2,
            _ => 0,
        }
    }

    /// Wavelength factor, opposite of the one currently set.
    /// 0 (not applicable) is never toggled.
    pub fn toggle(factor: u8) -> u8 {
        match factor {
            1 => 2,
            2 => 1,
            other => other,
        }
    }
}
