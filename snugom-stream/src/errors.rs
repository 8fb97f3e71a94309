use std::borrow::Cow;

use thiserror::Error;

use crate::field::FieldType;
use crate::predicate::Operator;

/// Top-level error type returned while building predicates and streams.
///
/// Every variant is raised eagerly, at descriptor or predicate construction.
/// Once a predicate exists, folding it into a query tree cannot fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Operand's runtime type is incompatible with the field's declared type.
    #[error("type mismatch on field '{field}': {declared:?} field cannot take a {found} operand")]
    TypeMismatch {
        field: String,
        declared: FieldType,
        found: &'static str,
    },

    /// Vector operand length differs from the descriptor's dimension.
    #[error("dimension mismatch on field '{field}': expected {expected}, got {actual}")]
    DimensionMismatch { field: String, expected: usize, actual: usize },

    /// Geo radius is not positive or coordinates are out of range.
    #[error("invalid geo parameter on field '{field}': {message}")]
    InvalidGeoParameter { field: String, message: String },

    /// Operator is not defined for the field's value family.
    #[error("operator {operator:?} is not supported for {declared:?} field '{field}'")]
    UnsupportedOperatorForType {
        field: String,
        operator: Operator,
        declared: FieldType,
    },

    /// Operator requires a value but the operand was null or empty.
    #[error("operator {operator:?} on field '{field}' requires a value")]
    MissingOperand { field: String, operator: Operator },

    /// k-NN parameters (k, threshold) are out of range.
    #[error("invalid vector parameter on field '{field}': {message}")]
    InvalidVectorParameter { field: String, message: String },

    /// Field descriptor or schema metadata violates its invariants.
    #[error("invalid field descriptor '{field}': {message}")]
    InvalidDescriptor { field: String, message: String },

    /// Field name is not part of the entity schema.
    #[error("unknown field '{field}' on index '{index}'")]
    UnknownField { index: String, field: String },

    /// Sorting was requested on a field that is not sortable.
    #[error("field '{field}' is not sortable")]
    NotSortable { field: String },

    /// Invalid input supplied through the textual filter surface.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Configuration could not be read or parsed.
    #[error("config error: {message}")]
    Config { message: Cow<'static, str> },
}

impl QueryError {
    pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

/// Convenience alias for fallible construction.
pub type QueryResult<T> = Result<T, QueryError>;
