//! The closed set of friction dimensions an interview must cover.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// One of the six friction dimensions measured by the interview.
///
/// The set is closed by design: coverage completeness is an exhaustiveness
/// property over this enum, never a comparison of free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Clear requirements, objectives, and expectations.
    Clarity,
    /// Effectiveness and availability of tools and systems.
    Tooling,
    /// How well processes support efficient work.
    Process,
    /// Frequency of redoing work due to issues.
    Rework,
    /// Waiting times and blocked work.
    Delay,
    /// Psychological safety and ability to raise concerns.
    Safety,
}

impl Dimension {
    /// All dimensions, in canonical interview order.
    pub const ALL: [Dimension; 6] = [
        Dimension::Clarity,
        Dimension::Tooling,
        Dimension::Process,
        Dimension::Rework,
        Dimension::Delay,
        Dimension::Safety,
    ];

    /// Number of dimensions in the closed set.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the stable wire name (lowercase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Clarity => "clarity",
            Dimension::Tooling => "tooling",
            Dimension::Process => "process",
            Dimension::Rework => "rework",
            Dimension::Delay => "delay",
            Dimension::Safety => "safety",
        }
    }

    /// Returns the human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Dimension::Clarity => "Clarity",
            Dimension::Tooling => "Tooling",
            Dimension::Process => "Process",
            Dimension::Rework => "Rework",
            Dimension::Delay => "Delay",
            Dimension::Safety => "Safety",
        }
    }

    /// Returns the canonical index of this dimension (position in [`Self::ALL`]).
    pub fn index(&self) -> usize {
        match self {
            Dimension::Clarity => 0,
            Dimension::Tooling => 1,
            Dimension::Process => 2,
            Dimension::Rework => 3,
            Dimension::Delay => 4,
            Dimension::Safety => 5,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clarity" => Ok(Dimension::Clarity),
            "tooling" => Ok(Dimension::Tooling),
            "process" => Ok(Dimension::Process),
            "rework" => Ok(Dimension::Rework),
            "delay" => Ok(Dimension::Delay),
            "safety" => Ok(Dimension::Safety),
            other => Err(ValidationError::invalid_format(
                "dimension",
                format!("unknown dimension '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_contains_six_distinct_dimensions() {
        assert_eq!(Dimension::COUNT, 6);
        for (i, dim) in Dimension::ALL.iter().enumerate() {
            assert_eq!(dim.index(), i);
        }
    }

    #[test]
    fn wire_name_roundtrips() {
        for dim in Dimension::ALL {
            let parsed: Dimension = dim.as_str().parse().unwrap();
            assert_eq!(parsed, dim);
        }
    }

    #[test]
    fn from_str_rejects_unknown_name() {
        assert!("morale".parse::<Dimension>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Dimension::Safety).unwrap();
        assert_eq!(json, "\"safety\"");
    }
}
