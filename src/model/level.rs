use serde::{Deserialize, Serialize};

/// Semantic-versioning impact of a change.
///
/// The order is total: `None < Patch < Minor < Major`, serialized as the
/// integers 0 to 3 when compared numerically.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    None = 0,
    Patch = 1,
    Minor = 2,
    Major = 3,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::None, Level::Patch, Level::Minor, Level::Major];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Level::None),
            1 => Some(Level::Patch),
            2 => Some(Level::Minor),
            3 => Some(Level::Major),
            _ => None,
        }
    }

    /// Whether a change of this level fits within `allowed`.
    pub fn allows(self, allowed: Level) -> bool {
        self <= allowed
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::None => write!(f, "NONE"),
            Level::Patch => write!(f, "PATCH"),
            Level::Minor => write!(f, "MINOR"),
            Level::Major => write!(f, "MAJOR"),
        }
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "0" => Ok(Level::None),
            "patch" | "1" => Ok(Level::Patch),
            "minor" | "2" => Ok(Level::Minor),
            "major" | "3" => Ok(Level::Major),
            _ => Err(format!("Unknown level: {}", s)),
        }
    }
}
