//! Value codecs: typed operands in, engine literals out.
//!
//! Each value family has one entry point. All of them validate eagerly and
//! return a [`QueryError`] at predicate construction, so the fold that later
//! consumes the literals never fails.
//!
//! Conversions that lose precision are deliberate and fixed:
//! - decimals become the nearest `f64`;
//! - dates and instants become epoch milliseconds in UTC, a bare date being
//!   midnight UTC and a local date-time being read as UTC.

pub mod escape;
pub mod literal;

pub use escape::*;
pub use literal::*;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::prelude::ToPrimitive;

use crate::errors::{QueryError, QueryResult};
use crate::field::{FieldDescriptor, FieldType, VectorElementType};
use crate::predicate::Operator;
use crate::value::{GeoPoint, Value};

/// Engine limits for indexed coordinates.
pub const MAX_LATITUDE: f64 = 85.051_128_78;
pub const MAX_LONGITUDE: f64 = 180.0;

/// Exact-match literal used by Equal, NotEqual, In and NotIn.
pub fn equality_literal(field: &FieldDescriptor, operator: Operator, value: &Value) -> QueryResult<TermValue> {
    match field.field_type() {
        FieldType::Text => Ok(TermValue::text(TextMode::Exact, string_operand(field, value)?)),
        FieldType::Tag => Ok(TermValue::tag(TagMode::Exact, string_operand(field, value)?)),
        FieldType::Numeric | FieldType::Date => Ok(TermValue::Numeric(NumericRange::exact(numeric_operand(field, value)?))),
        FieldType::Boolean => Ok(boolean_literal(boolean_operand(field, value)?)),
        FieldType::Geo | FieldType::Vector => Err(unsupported(field, operator)),
    }
}

/// Pattern literal for StartsWith, EndsWith, Containing and Like.
pub fn pattern_literal(
    field: &FieldDescriptor,
    operator: Operator,
    value: &Value,
    mode: TextMode,
) -> QueryResult<TermValue> {
    match field.field_type() {
        FieldType::Text => Ok(TermValue::text(mode, string_operand(field, value)?)),
        FieldType::Tag => {
            let mode = match mode {
                TextMode::Exact => TagMode::Exact,
                TextMode::Prefix => TagMode::Prefix,
                TextMode::Suffix => TagMode::Suffix,
                TextMode::Contains => TagMode::Contains,
                TextMode::Fuzzy => return Err(unsupported(field, operator)),
            };
            Ok(TermValue::tag(mode, string_operand(field, value)?))
        }
        FieldType::Numeric
        | FieldType::Boolean
        | FieldType::Date
        | FieldType::Geo
        | FieldType::Vector => Err(unsupported(field, operator)),
    }
}

/// Booleans are indexed as the tags `true` / `false`.
#[inline]
pub fn boolean_literal(flag: bool) -> TermValue {
    TermValue::tag(TagMode::Exact, if flag { "true" } else { "false" })
}

/// Normalize a numeric-like operand to a double-precision range endpoint.
pub fn numeric_operand(field: &FieldDescriptor, value: &Value) -> QueryResult<f64> {
    let number = match value {
        Value::Int(number) => *number as f64,
        Value::Float(number) => *number,
        Value::Decimal(decimal) => decimal.to_f64().ok_or_else(|| mismatch(field, value))?,
        Value::Date(date) => date_millis(*date),
        Value::DateTime(instant) => instant.timestamp_millis() as f64,
        Value::LocalDateTime(local) => local.and_utc().timestamp_millis() as f64,
        Value::Null | Value::Text(_) | Value::Bool(_) | Value::Geo(_) | Value::Vector(_) | Value::List(_) => {
            return Err(mismatch(field, value));
        }
    };

    if number.is_nan() {
        return Err(QueryError::TypeMismatch {
            field: field.name().to_string(),
            declared: field.field_type(),
            found: "NaN",
        });
    }
    Ok(number)
}

/// Midnight UTC of the given day, in epoch milliseconds.
#[inline]
pub fn date_millis(date: NaiveDate) -> f64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis() as f64
}

pub fn string_operand(field: &FieldDescriptor, value: &Value) -> QueryResult<String> {
    match value {
        Value::Text(text) => Ok(text.clone()),
        Value::Int(number) if field.field_type() == FieldType::Tag => Ok(number.to_string()),
        Value::Null
        | Value::Int(_)
        | Value::Float(_)
        | Value::Decimal(_)
        | Value::Bool(_)
        | Value::Date(_)
        | Value::DateTime(_)
        | Value::LocalDateTime(_)
        | Value::Geo(_)
        | Value::Vector(_)
        | Value::List(_) => Err(mismatch(field, value)),
    }
}

pub fn boolean_operand(field: &FieldDescriptor, value: &Value) -> QueryResult<bool> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::Null
        | Value::Text(_)
        | Value::Int(_)
        | Value::Float(_)
        | Value::Decimal(_)
        | Value::Date(_)
        | Value::DateTime(_)
        | Value::LocalDateTime(_)
        | Value::Geo(_)
        | Value::Vector(_)
        | Value::List(_) => Err(mismatch(field, value)),
    }
}

/// Validate a geo radius operand.
pub fn geo_radius(field: &FieldDescriptor, center: GeoPoint, radius: f64, unit: GeoUnit) -> QueryResult<GeoRadius> {
    let invalid = |message: String| QueryError::InvalidGeoParameter {
        field: field.name().to_string(),
        message,
    };

    if !radius.is_finite() || radius <= 0.0 {
        return Err(invalid(format!("radius must be a positive number, got {}", radius)));
    }
    if !center.lon.is_finite() || center.lon.abs() > MAX_LONGITUDE {
        return Err(invalid(format!("longitude {} is outside [-180, 180]", center.lon)));
    }
    if !center.lat.is_finite() || center.lat.abs() > MAX_LATITUDE {
        return Err(invalid(format!(
            "latitude {} is outside [-{max}, {max}]",
            center.lat,
            max = MAX_LATITUDE
        )));
    }

    Ok(GeoRadius { center, radius, unit })
}

/// Validate a vector operand against the descriptor and build the k-NN clause.
pub fn knn_clause(
    field: &FieldDescriptor,
    operator: Operator,
    value: &Value,
    k: usize,
    threshold: Option<f64>,
) -> QueryResult<KnnClause> {
    let Some(params) = field.vector_params() else {
        return Err(unsupported(field, operator));
    };

    let vector = match value {
        Value::Vector(vector) => vector,
        Value::Null
        | Value::Text(_)
        | Value::Int(_)
        | Value::Float(_)
        | Value::Decimal(_)
        | Value::Bool(_)
        | Value::Date(_)
        | Value::DateTime(_)
        | Value::LocalDateTime(_)
        | Value::Geo(_)
        | Value::List(_) => return Err(mismatch(field, value)),
    };

    if vector.len() != params.dimension {
        return Err(QueryError::DimensionMismatch {
            field: field.name().to_string(),
            expected: params.dimension,
            actual: vector.len(),
        });
    }

    let invalid = |message: String| QueryError::InvalidVectorParameter {
        field: field.name().to_string(),
        message,
    };
    if k == 0 {
        return Err(invalid("k must be greater than zero".to_string()));
    }
    if vector.iter().any(|component| !component.is_finite()) {
        return Err(invalid("vector components must be finite".to_string()));
    }
    if let Some(threshold) = threshold
        && (!threshold.is_finite() || threshold < 0.0)
    {
        return Err(invalid(format!("distance threshold must be a non-negative number, got {}", threshold)));
    }

    Ok(KnnClause {
        alias: field.alias().to_string(),
        k,
        vector: vector.clone(),
        element_type: params.element_type,
        metric: params.distance_metric,
        threshold,
    })
}

/// Little-endian blob as stored by the engine.
pub fn vector_blob(vector: &[f32], element_type: VectorElementType) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vector.len() * element_type.byte_width());
    for component in vector {
        match element_type {
            VectorElementType::Float32 => blob.extend_from_slice(&component.to_le_bytes()),
            VectorElementType::Float64 => blob.extend_from_slice(&f64::from(*component).to_le_bytes()),
        }
    }
    blob
}

pub(crate) fn mismatch(field: &FieldDescriptor, value: &Value) -> QueryError {
    QueryError::TypeMismatch {
        field: field.name().to_string(),
        declared: field.field_type(),
        found: value.kind(),
    }
}

pub(crate) fn unsupported(field: &FieldDescriptor, operator: Operator) -> QueryError {
    QueryError::UnsupportedOperatorForType {
        field: field.name().to_string(),
        operator,
        declared: field.field_type(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::field::{DistanceMetric, VectorParams};

    fn numeric() -> FieldDescriptor {
        FieldDescriptor::numeric("age").unwrap()
    }

    #[test]
    fn numeric_family_normalizes_to_f64() {
        let field = numeric();
        assert_eq!(numeric_operand(&field, &Value::Int(42)).unwrap(), 42.0);
        assert_eq!(numeric_operand(&field, &Value::Float(1.5)).unwrap(), 1.5);
        assert_eq!(
            numeric_operand(&field, &Value::Decimal(Decimal::new(125, 1))).unwrap(),
            12.5
        );
    }

    #[test]
    fn dates_become_epoch_millis_utc() {
        let field = FieldDescriptor::date("born").unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        assert_eq!(numeric_operand(&field, &Value::Date(date)).unwrap(), 1_672_617_600_000.0);

        let instant = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 1).unwrap();
        assert_eq!(numeric_operand(&field, &Value::DateTime(instant)).unwrap(), 1_672_617_601_000.0);
        assert_eq!(
            numeric_operand(&field, &Value::LocalDateTime(instant.naive_utc())).unwrap(),
            1_672_617_601_000.0
        );
    }

    #[test]
    fn numeric_rejects_text_and_nan() {
        let field = numeric();
        assert!(matches!(
            numeric_operand(&field, &Value::from("18")),
            Err(QueryError::TypeMismatch { found: "text", .. })
        ));
        assert!(matches!(
            numeric_operand(&field, &Value::Float(f64::NAN)),
            Err(QueryError::TypeMismatch { found: "NaN", .. })
        ));
    }

    #[test]
    fn tag_accepts_integers_text_does_not() {
        let tag = FieldDescriptor::tag("code").unwrap();
        let text = FieldDescriptor::text("title").unwrap();
        assert_eq!(string_operand(&tag, &Value::Int(7)).unwrap(), "7");
        assert!(string_operand(&text, &Value::Int(7)).is_err());
    }

    #[test]
    fn equality_literal_per_family() {
        let flag = FieldDescriptor::boolean("active").unwrap();
        assert_eq!(
            equality_literal(&flag, Operator::Equal, &Value::Bool(true)).unwrap(),
            TermValue::tag(TagMode::Exact, "true")
        );
        assert_eq!(
            equality_literal(&numeric(), Operator::Equal, &Value::Int(3)).unwrap(),
            TermValue::Numeric(NumericRange::exact(3.0))
        );
        let geo = FieldDescriptor::geo("location").unwrap();
        assert!(matches!(
            equality_literal(&geo, Operator::Equal, &Value::Int(3)),
            Err(QueryError::UnsupportedOperatorForType { .. })
        ));
    }

    #[test]
    fn fuzzy_is_text_only() {
        let tag = FieldDescriptor::tag("code").unwrap();
        assert!(pattern_literal(&tag, Operator::Like, &Value::from("x"), TextMode::Fuzzy).is_err());
        assert_eq!(
            pattern_literal(&tag, Operator::StartsWith, &Value::from("x"), TextMode::Prefix).unwrap(),
            TermValue::tag(TagMode::Prefix, "x")
        );
    }

    #[test]
    fn geo_validation() {
        let field = FieldDescriptor::geo("location").unwrap();
        let center = GeoPoint::new(-122.4, 37.7);
        assert!(geo_radius(&field, center, 5.0, GeoUnit::Km).is_ok());
        assert!(geo_radius(&field, center, 0.0, GeoUnit::Km).is_err());
        assert!(geo_radius(&field, center, -1.0, GeoUnit::Km).is_err());
        assert!(geo_radius(&field, GeoPoint::new(181.0, 0.0), 1.0, GeoUnit::M).is_err());
        assert!(geo_radius(&field, GeoPoint::new(0.0, 86.0), 1.0, GeoUnit::M).is_err());
    }

    #[test]
    fn knn_validates_shape_and_parameters() {
        let field = FieldDescriptor::vector("embedding", "embedding", VectorParams::new(4, DistanceMetric::Cosine)).unwrap();
        let op = Operator::VectorSimilarity;

        let err = knn_clause(&field, op, &Value::from(vec![1.0_f32, 2.0, 3.0]), 3, None).unwrap_err();
        assert_eq!(
            err,
            QueryError::DimensionMismatch {
                field: "embedding".to_string(),
                expected: 4,
                actual: 3,
            }
        );

        let vector = Value::from(vec![1.0_f32, 2.0, 3.0, 4.0]);
        assert!(matches!(
            knn_clause(&field, op, &vector, 0, None),
            Err(QueryError::InvalidVectorParameter { .. })
        ));
        assert!(matches!(
            knn_clause(&field, op, &vector, 3, Some(-0.5)),
            Err(QueryError::InvalidVectorParameter { .. })
        ));

        let clause = knn_clause(&field, op, &vector, 3, Some(0.2)).unwrap();
        assert_eq!(clause.metric, DistanceMetric::Cosine);
        assert_eq!(clause.blob().len(), 16);
    }

    #[test]
    fn blob_follows_element_type() {
        assert_eq!(vector_blob(&[1.0], VectorElementType::Float32), 1.0f32.to_le_bytes().to_vec());
        assert_eq!(vector_blob(&[1.0], VectorElementType::Float64), 1.0f64.to_le_bytes().to_vec());
    }
}
