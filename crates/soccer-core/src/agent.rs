use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identifier for one of our robots.
///
/// Ordering is used to tick a team deterministically, and the raw id is what gets written into
/// outbound commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RobotId(pub u32);

impl RobotId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for RobotId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for RobotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "robot#{}", self.0)
    }
}
