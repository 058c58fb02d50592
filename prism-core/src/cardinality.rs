//! Settings cardinality
//!
//! How many settings a requirement accepts. On the wire a cardinality is
//! either `numberOfSettings` (exactly N) or a `minNumberOfSettings` /
//! `maxNumberOfSettings` pair; a missing maximum means "any number".

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected cardinality bounds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("minimum number of settings ({min}) exceeds maximum ({max})")]
pub struct CardinalityError {
    pub min: usize,
    pub max: usize,
}

/// Inclusive bounds on the number of settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCardinality", into = "RawCardinality")]
pub struct Cardinality {
    min: usize,
    max: Option<usize>,
}

impl Cardinality {
    /// Exactly `n` settings
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    /// Between `min` and `max` settings, both inclusive
    pub fn between(min: usize, max: usize) -> Result<Self, CardinalityError> {
        if min > max {
            return Err(CardinalityError { min, max });
        }
        Ok(Self { min, max: Some(max) })
    }

    /// At least `min` settings, no upper bound
    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Zero or one setting
    pub const fn optional() -> Self {
        Self { min: 0, max: Some(1) }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    pub fn is_fixed(&self) -> bool {
        self.max == Some(self.min)
    }

    /// Whether `count` settings satisfy these bounds
    pub fn admits(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::exactly(1)
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {}", max),
            Some(max) => write!(f, "between {} and {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Wire form; accepts either the fixed or the ranged spelling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCardinality {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    number_of_settings: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_number_of_settings: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_number_of_settings: Option<usize>,
}

impl TryFrom<RawCardinality> for Cardinality {
    type Error = CardinalityError;

    fn try_from(raw: RawCardinality) -> Result<Self, Self::Error> {
        match (raw.number_of_settings, raw.min_number_of_settings, raw.max_number_of_settings) {
            (Some(n), None, None) => Ok(Cardinality::exactly(n)),
            (Some(n), min, max) => {
                // A fixed count wins, but contradicting bounds are an error
                let min = min.unwrap_or(n);
                let max = max.unwrap_or(n);
                if min != n || max != n {
                    return Err(CardinalityError { min, max });
                }
                Ok(Cardinality::exactly(n))
            }
            (None, None, None) => Ok(Cardinality::default()),
            (None, min, Some(max)) => Cardinality::between(min.unwrap_or(0), max),
            (None, Some(min), None) => Ok(Cardinality::at_least(min)),
        }
    }
}

impl From<Cardinality> for RawCardinality {
    fn from(c: Cardinality) -> Self {
        RawCardinality {
            number_of_settings: None,
            min_number_of_settings: Some(c.min),
            max_number_of_settings: c.max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_exactly_one() {
        let c = Cardinality::default();
        assert!(c.is_fixed());
        assert!(c.admits(1));
        assert!(!c.admits(0));
        assert!(!c.admits(2));
    }

    #[test]
    fn test_between_rejects_inverted_bounds() {
        assert_eq!(Cardinality::between(3, 1), Err(CardinalityError { min: 3, max: 1 }));
        let c = Cardinality::between(0, 2).unwrap();
        assert!(c.admits(0) && c.admits(2) && !c.admits(3));
    }

    #[test]
    fn test_at_least_is_unbounded() {
        let c = Cardinality::at_least(1);
        assert!(c.admits(1_000));
        assert!(!c.admits(0));
        assert_eq!(c.to_string(), "at least 1");
    }

    #[test]
    fn test_wire_forms() {
        let fixed: Cardinality = serde_json::from_str(r#"{"numberOfSettings": 2}"#).unwrap();
        assert_eq!(fixed, Cardinality::exactly(2));

        let ranged: Cardinality =
            serde_json::from_str(r#"{"minNumberOfSettings": 0, "maxNumberOfSettings": 1}"#).unwrap();
        assert_eq!(ranged, Cardinality::optional());

        let unspecified: Cardinality = serde_json::from_str("{}").unwrap();
        assert_eq!(unspecified, Cardinality::exactly(1));

        assert!(serde_json::from_str::<Cardinality>(
            r#"{"minNumberOfSettings": 4, "maxNumberOfSettings": 1}"#
        )
        .is_err());
    }

    #[test]
    fn test_serializes_as_min_max() {
        let json = serde_json::to_value(Cardinality::between(1, 3).unwrap()).unwrap();
        assert_eq!(json["minNumberOfSettings"], 1);
        assert_eq!(json["maxNumberOfSettings"], 3);
        assert!(json.get("numberOfSettings").is_none());

        let open = serde_json::to_value(Cardinality::at_least(2)).unwrap();
        assert!(open.get("maxNumberOfSettings").is_none());
    }
}
