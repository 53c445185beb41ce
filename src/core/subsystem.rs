use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A monitored electrical subsystem of the building.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum Subsystem {
    Lighting,
    Hvac,
    Appliance,
}

impl Subsystem {
    pub const ALL: [Self; 3] = [Self::Lighting, Self::Hvac, Self::Appliance];

    /// Point name in the tag store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lighting => "Lighting",
            Self::Hvac => "HVAC",
            Self::Appliance => "Appliance",
        }
    }

    /// Position in per-subsystem arrays, following [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Lighting => 0,
            Self::Hvac => 1,
            Self::Appliance => 2,
        }
    }
}

impl Display for Subsystem {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
