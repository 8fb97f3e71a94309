//! Engine-facing literals produced by the value codecs.

use serde::Serialize;

use crate::field::{DistanceMetric, VectorElementType};
use crate::value::GeoPoint;

/// How a TEXT term matches the indexed tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    /// Exact phrase.
    Exact,
    Prefix,
    Suffix,
    /// Infix (`*value*`).
    Contains,
    /// Levenshtein distance 1 (`%value%`).
    Fuzzy,
}

/// How a TAG term matches the stored tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    Exact,
    Prefix,
    Suffix,
    Contains,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum RangeBound {
    Unbounded,
    Inclusive(f64),
    Exclusive(f64),
}

impl RangeBound {
    fn admits_above(self, value: f64) -> bool {
        match self {
            RangeBound::Unbounded => true,
            RangeBound::Inclusive(bound) => value >= bound,
            RangeBound::Exclusive(bound) => value > bound,
        }
    }

    fn admits_below(self, value: f64) -> bool {
        match self {
            RangeBound::Unbounded => true,
            RangeBound::Inclusive(bound) => value <= bound,
            RangeBound::Exclusive(bound) => value < bound,
        }
    }
}

/// Numeric range literal: `[lower upper]` in engine syntax.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericRange {
    pub lower: RangeBound,
    pub upper: RangeBound,
}

impl NumericRange {
    /// Closed single-point range, the engine's exact numeric match.
    #[inline]
    pub const fn exact(value: f64) -> Self {
        Self {
            lower: RangeBound::Inclusive(value),
            upper: RangeBound::Inclusive(value),
        }
    }

    /// Closed range, both ends inclusive.
    #[inline]
    pub const fn between(lower: f64, upper: f64) -> Self {
        Self {
            lower: RangeBound::Inclusive(lower),
            upper: RangeBound::Inclusive(upper),
        }
    }

    #[inline]
    pub const fn greater_than(value: f64) -> Self {
        Self {
            lower: RangeBound::Exclusive(value),
            upper: RangeBound::Unbounded,
        }
    }

    #[inline]
    pub const fn at_least(value: f64) -> Self {
        Self {
            lower: RangeBound::Inclusive(value),
            upper: RangeBound::Unbounded,
        }
    }

    #[inline]
    pub const fn less_than(value: f64) -> Self {
        Self {
            lower: RangeBound::Unbounded,
            upper: RangeBound::Exclusive(value),
        }
    }

    #[inline]
    pub const fn at_most(value: f64) -> Self {
        Self {
            lower: RangeBound::Unbounded,
            upper: RangeBound::Inclusive(value),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower.admits_above(value) && self.upper.admits_below(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoUnit {
    M,
    Km,
    Mi,
    Ft,
}

impl GeoUnit {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            GeoUnit::M => "m",
            GeoUnit::Km => "km",
            GeoUnit::Mi => "mi",
            GeoUnit::Ft => "ft",
        }
    }

    #[inline]
    pub const fn meters(self) -> f64 {
        match self {
            GeoUnit::M => 1.0,
            GeoUnit::Km => 1000.0,
            GeoUnit::Mi => 1609.344,
            GeoUnit::Ft => 0.3048,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "m" => Some(GeoUnit::M),
            "km" => Some(GeoUnit::Km),
            "mi" => Some(GeoUnit::Mi),
            "ft" => Some(GeoUnit::Ft),
            _ => None,
        }
    }
}

/// Geo radius literal: `[lon lat radius unit]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoRadius {
    pub center: GeoPoint,
    pub radius: f64,
    pub unit: GeoUnit,
}

impl GeoRadius {
    #[inline]
    pub fn radius_meters(&self) -> f64 {
        self.radius * self.unit.meters()
    }
}

/// The value expression of one term node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TermValue {
    Text { mode: TextMode, value: String },
    Tag { mode: TagMode, value: String },
    Numeric(NumericRange),
    Geo(GeoRadius),
    Missing,
}

impl TermValue {
    #[inline]
    pub fn text(mode: TextMode, value: impl Into<String>) -> Self {
        TermValue::Text {
            mode,
            value: value.into(),
        }
    }

    #[inline]
    pub fn tag(mode: TagMode, value: impl Into<String>) -> Self {
        TermValue::Tag {
            mode,
            value: value.into(),
        }
    }
}

/// k-nearest-neighbour clause.
///
/// The engine runs the surrounding filter first and ranks only the surviving
/// documents, so this clause always wraps the rest of the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnnClause {
    pub alias: String,
    pub k: usize,
    pub vector: Vec<f32>,
    pub element_type: VectorElementType,
    pub metric: DistanceMetric,
    /// Maximum distance a neighbour may have, if any.
    pub threshold: Option<f64>,
}

impl KnnClause {
    /// Little-endian vector blob in the field's element type.
    pub fn blob(&self) -> Vec<u8> {
        super::vector_blob(&self.vector, self.element_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_and_closed_bounds() {
        let range = NumericRange {
            lower: RangeBound::Exclusive(18.0),
            upper: RangeBound::Inclusive(65.0),
        };
        assert!(!range.contains(18.0));
        assert!(range.contains(18.5));
        assert!(range.contains(65.0));
        assert!(!range.contains(66.0));
    }

    #[test]
    fn half_open_helpers() {
        assert!(NumericRange::greater_than(1.0).contains(f64::MAX));
        assert!(!NumericRange::less_than(1.0).contains(1.0));
        assert!(NumericRange::at_most(1.0).contains(1.0));
        assert!(NumericRange::exact(3.0).contains(3.0));
        assert!(!NumericRange::exact(3.0).contains(3.1));
    }

    #[test]
    fn geo_units_convert_to_meters() {
        assert_eq!(GeoUnit::parse("KM"), Some(GeoUnit::Km));
        assert_eq!(GeoUnit::parse("yards"), None);
        let radius = GeoRadius {
            center: GeoPoint::new(0.0, 0.0),
            radius: 2.0,
            unit: GeoUnit::Km,
        };
        assert_eq!(radius.radius_meters(), 2000.0);
    }
}
