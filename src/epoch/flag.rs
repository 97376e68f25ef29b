use num_traits::FromPrimitive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// `EpochFlag` validates an epoch,
/// or describes possible events that occurred
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EpochFlag {
    /// Epoch is sane
    #[default]
    Ok = 0,
    /// Power failure since previous epoch
    PowerFailure = 1,
    /// Antenna is being moved at current epoch
    AntennaBeingMoved = 2,
    /// Site has changed, received has moved since last epoch
    NewSiteOccupation = 3,
    /// New information to come after this epoch
    HeaderInformationFollows = 4,
    /// External event - significant event in this epoch
    ExternalEvent = 5,
    /// Cycle slip at this epoch
    CycleSlip = 6,
}

impl EpochFlag {
    /// Returns True if self is a valid epoch
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
    /// Returns true if observations follow this epoch descriptor
    pub fn is_observation(self) -> bool {
        matches!(self, Self::Ok | Self::PowerFailure)
    }
    /// Returns true if header lines follow this epoch descriptor
    pub fn is_event(self) -> bool {
        matches!(
            self,
            Self::AntennaBeingMoved
                | Self::NewSiteOccupation
                | Self::HeaderInformationFollows
                | Self::ExternalEvent
        )
    }
}

impl std::str::FromStr for EpochFlag {
    type Err = FormatError;
    /// Blank flags are interpreted as [EpochFlag::Ok]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::Ok);
        }
        let value = trimmed
            .parse::<u8>()
            .or(Err(FormatError::EpochFlag(s.to_string())))?;
        Self::from_u8(value).ok_or(FormatError::EpochFlag(s.to_string()))
    }
}

impl std::fmt::Display for EpochFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    #[test]
    fn flag_parsing() {
        assert_eq!(EpochFlag::from_str("0"), Ok(EpochFlag::Ok));
        assert_eq!(EpochFlag::from_str(" "), Ok(EpochFlag::Ok));
        assert_eq!(EpochFlag::from_str("1"), Ok(EpochFlag::PowerFailure));
        assert_eq!(EpochFlag::from_str("4"), Ok(EpochFlag::HeaderInformationFollows));
        assert_eq!(EpochFlag::from_str("6"), Ok(EpochFlag::CycleSlip));
        assert!(EpochFlag::from_str("7").is_err());
        assert!(EpochFlag::from_str("x").is_err());
        assert!(EpochFlag::PowerFailure.is_observation());
        assert!(EpochFlag::ExternalEvent.is_event());
        assert!(!EpochFlag::CycleSlip.is_event());
        assert_eq!(EpochFlag::CycleSlip.to_string(), "6");
    }
}
