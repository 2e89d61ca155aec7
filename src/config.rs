use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SplitError};

/// How frontier candidates are scored while growing the first half of a cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightingMethod {
    /// Inverse distance from the selection's centroid to the candidate.
    Distance,
    /// Summed Polsby-Popper score of the selection and of what remains.
    Compactness,
    /// Inverse distance of the candidate's edge from the fill's starting side.
    CardinalDistance,
}

/// Which groups are decomposed when a fill misses its population target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakingMethod {
    /// The best-scoring candidate the fill could not afford.
    SplitBestCandidateGroup,
    /// Groups touching across the boundary between the two halves.
    SplitGroupsOnEdge,
    /// Reserved; rejected by `SplitConfig::validate`.
    SplitLowestEnergySeam,
}

impl fmt::Display for WeightingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distance => write!(f, "distance"),
            Self::Compactness => write!(f, "compactness"),
            Self::CardinalDistance => write!(f, "cardinal-distance"),
        }
    }
}

impl fmt::Display for BreakingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SplitBestCandidateGroup => write!(f, "split-best-candidate-group"),
            Self::SplitGroupsOnEdge => write!(f, "split-groups-on-edge"),
            Self::SplitLowestEnergySeam => write!(f, "split-lowest-energy-seam"),
        }
    }
}

impl FromStr for WeightingMethod {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "distance" => Ok(Self::Distance),
            "compactness" | "polsby-popper" => Ok(Self::Compactness),
            "cardinal-distance" => Ok(Self::CardinalDistance),
            _ => Err(SplitError::UnsupportedConfiguration(format!(
                "unknown weighting method '{s}', expected distance, compactness or cardinal-distance"
            ))),
        }
    }
}

impl FromStr for BreakingMethod {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "split-best-candidate-group" | "best-candidate" => Ok(Self::SplitBestCandidateGroup),
            "split-groups-on-edge" | "edge" => Ok(Self::SplitGroupsOnEdge),
            "split-lowest-energy-seam" => Ok(Self::SplitLowestEnergySeam),
            _ => Err(SplitError::UnsupportedConfiguration(format!(
                "unknown breaking method '{s}', expected split-best-candidate-group or split-groups-on-edge"
            ))),
        }
    }
}

/// Parameters of a district split run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Allowed absolute deviation from each half's ideal population.
    pub population_deviation: u64,
    pub weighting: WeightingMethod,
    pub breaking: BreakingMethod,
    /// Merge decomposed fragments back into their former groups after each cut.
    pub merge_into_previous_groups: bool,
    /// Restart every fill from the border seeds instead of the previous selection.
    pub refill_each_pass: bool,
    /// Approximate shapes by bounding rectangles when scoring compactness.
    pub fast_calculations: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            population_deviation: 0,
            weighting: WeightingMethod::CardinalDistance,
            breaking: BreakingMethod::SplitGroupsOnEdge,
            merge_into_previous_groups: false,
            refill_each_pass: false,
            fast_calculations: true,
        }
    }
}

impl SplitConfig {
    /// Reject configurations that cannot run, before any partitioning work.
    pub fn validate(&self) -> Result<()> {
        if self.breaking == BreakingMethod::SplitLowestEnergySeam {
            return Err(SplitError::UnsupportedConfiguration(format!(
                "breaking method {} is not supported", self.breaking
            )));
        }
        Ok(())
    }

    /// Parse a configuration from JSON, filling unspecified fields with defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| SplitError::UnsupportedConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SplitConfig::default().validate().is_ok());
    }

    #[test]
    fn lowest_energy_seam_is_rejected() {
        let config = SplitConfig { breaking: BreakingMethod::SplitLowestEnergySeam, ..Default::default() };
        assert!(matches!(config.validate(), Err(SplitError::UnsupportedConfiguration(_))));
    }

    #[test]
    fn parse_method_names() {
        assert_eq!("compactness".parse::<WeightingMethod>().unwrap(), WeightingMethod::Compactness);
        assert_eq!("Polsby_Popper".parse::<WeightingMethod>().unwrap(), WeightingMethod::Compactness);
        assert_eq!("edge".parse::<BreakingMethod>().unwrap(), BreakingMethod::SplitGroupsOnEdge);
        assert!("random".parse::<WeightingMethod>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for method in [WeightingMethod::Distance, WeightingMethod::Compactness, WeightingMethod::CardinalDistance] {
            assert_eq!(method.to_string().parse::<WeightingMethod>().unwrap(), method);
        }
    }

    #[test]
    fn json_fills_defaults() {
        let config = SplitConfig::from_json(r#"{ "population_deviation": 50, "weighting": "distance" }"#).unwrap();
        assert_eq!(config.population_deviation, 50);
        assert_eq!(config.weighting, WeightingMethod::Distance);
        assert_eq!(config.breaking, BreakingMethod::SplitGroupsOnEdge);
        assert!(config.fast_calculations);
    }

    #[test]
    fn json_with_unsupported_breaking_fails() {
        let result = SplitConfig::from_json(r#"{ "breaking": "split-lowest-energy-seam" }"#);
        assert!(matches!(result, Err(SplitError::UnsupportedConfiguration(_))));
    }
}
