//! Typed parsing of filter values, driven by the field's declared type.

use chrono::{DateTime, NaiveDate, Utc};

use crate::codec::GeoUnit;
use crate::errors::{QueryError, QueryResult};
use crate::field::{FieldDescriptor, FieldType};
use crate::filters::{FilterDescriptor, FilterOperator};
use crate::predicate::Predicate;
use crate::value::{GeoPoint, Value};

/// Build the predicate a parsed filter describes.
pub fn build_predicate<'a>(field: &'a FieldDescriptor, descriptor: &FilterDescriptor) -> QueryResult<Predicate<'a>> {
    let single = || parse_value(field, descriptor.values.first().map(String::as_str).unwrap_or_default());
    let many = || -> QueryResult<Value> {
        descriptor
            .values
            .iter()
            .map(|raw| parse_value(field, raw))
            .collect::<QueryResult<Vec<_>>>()
            .map(Value::List)
    };

    match descriptor.operator {
        FilterOperator::Eq => field.equal(single()?),
        FilterOperator::Ne => field.not_equal(single()?),
        FilterOperator::Gt => field.gt(single()?),
        FilterOperator::Gte => field.gte(single()?),
        FilterOperator::Lt => field.lt(single()?),
        FilterOperator::Lte => field.lte(single()?),
        FilterOperator::Range => build_range(field, descriptor),
        FilterOperator::In => field.in_values(many()?),
        FilterOperator::NotIn => field.not_in(many()?),
        FilterOperator::All => field.contains_all(many()?),
        FilterOperator::Bool => {
            let raw = descriptor.values.first().map(String::as_str).unwrap_or_default();
            if parse_bool(raw)? {
                field.is_true()
            } else {
                field.is_false()
            }
        }
        FilterOperator::Missing => field.is_missing(),
        FilterOperator::Prefix => field.starts_with(text_value(descriptor)),
        FilterOperator::Suffix => field.ends_with(text_value(descriptor)),
        FilterOperator::Contains => field.containing(text_value(descriptor)),
        FilterOperator::Fuzzy => field.like(text_value(descriptor)),
        FilterOperator::Near => build_near(field, descriptor),
    }
}

/// `lo,hi` with `*` or an empty side meaning unbounded.
fn build_range<'a>(field: &'a FieldDescriptor, descriptor: &FilterDescriptor) -> QueryResult<Predicate<'a>> {
    let lower = parse_bound(field, descriptor.values.first())?;
    let upper = parse_bound(field, descriptor.values.get(1))?;
    match (lower, upper) {
        (Some(lower), Some(upper)) => field.between(lower, upper),
        (Some(lower), None) => field.gte(lower),
        (None, Some(upper)) => field.lte(upper),
        (None, None) => Err(QueryError::invalid_request(format!(
            "Range filter on {} needs at least one bound",
            field.name()
        ))),
    }
}

/// `lon,lat,radius,unit`.
fn build_near<'a>(field: &'a FieldDescriptor, descriptor: &FilterDescriptor) -> QueryResult<Predicate<'a>> {
    let [lon, lat, radius, unit] = descriptor.values.as_slice() else {
        return Err(QueryError::invalid_request(format!(
            "Near filter on {} expects lon,lat,radius,unit",
            field.name()
        )));
    };
    let unit = GeoUnit::parse(unit)
        .ok_or_else(|| QueryError::invalid_request(format!("Unsupported distance unit: {}", unit)))?;
    field.near(
        GeoPoint::new(parse_number(lon)?, parse_number(lat)?),
        parse_number(radius)?,
        unit,
    )
}

fn text_value(descriptor: &FilterDescriptor) -> Value {
    Value::Text(descriptor.values.first().cloned().unwrap_or_default())
}

/// Parse one raw value according to the field's declared type. Blank input is `Null`.
pub fn parse_value(field: &FieldDescriptor, raw: &str) -> QueryResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    match field.field_type() {
        FieldType::Text | FieldType::Tag => Ok(Value::Text(raw.to_string())),
        FieldType::Numeric => match trimmed.parse::<i64>() {
            Ok(number) => Ok(Value::Int(number)),
            Err(_) => parse_number(trimmed).map(Value::Float),
        },
        FieldType::Date => parse_date(trimmed),
        FieldType::Boolean => parse_bool(trimmed).map(Value::Bool),
        FieldType::Geo | FieldType::Vector => Err(QueryError::invalid_request(format!(
            "Field {} cannot be filtered by a scalar value",
            field.name()
        ))),
    }
}

/// Parses a range bound, treating `*` and blanks as unbounded.
pub fn parse_bound(field: &FieldDescriptor, value: Option<&String>) -> QueryResult<Option<Value>> {
    match value.map(|raw| raw.trim()) {
        Some(raw) if !raw.is_empty() && raw != "*" => parse_value(field, raw).map(Some),
        _ => Ok(None),
    }
}

pub fn parse_number(raw: &str) -> QueryResult<f64> {
    let trimmed = raw.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|number| !number.is_nan())
        .ok_or_else(|| QueryError::invalid_request(format!("Invalid numeric value: {}", trimmed)))
}

pub fn parse_bool(raw: &str) -> QueryResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(QueryError::invalid_request(format!("Invalid boolean value: {}", other))),
    }
}

/// RFC 3339 instants, `YYYY-MM-DD` dates, or epoch milliseconds.
pub fn parse_date(raw: &str) -> QueryResult<Value> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Value::DateTime(instant.with_timezone(&Utc)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Value::Date(date));
    }
    raw.parse::<i64>()
        .map(Value::Int)
        .map_err(|_| QueryError::invalid_request(format!("Invalid date value: {}", raw)))
}
