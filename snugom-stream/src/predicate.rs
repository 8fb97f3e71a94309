//! Predicates: typed criteria bound to one field.
//!
//! A [`Predicate`] is validated and encoded when it is built. Folding it into a
//! tree through [`Apply::apply`] is total; every error surfaces at
//! construction.
//!
//! ```
//! use snugom_stream::field::FieldDescriptor;
//! use snugom_stream::predicate::Apply;
//! use snugom_stream::query::QueryTree;
//!
//! let age = FieldDescriptor::numeric("age").unwrap();
//! let adults = age.gt(18).unwrap();
//! let tree = adults.apply(&QueryTree::root());
//! assert_eq!(tree.to_string(), "@age:[(18 +inf]");
//! ```

use serde::Serialize;

use crate::codec::{self, KnnClause, NumericRange, TermValue, TextMode};
use crate::codec::{GeoUnit, boolean_literal, equality_literal, numeric_operand, pattern_literal};
use crate::errors::{QueryError, QueryResult};
use crate::field::{FieldDescriptor, FieldType};
use crate::query::{QueryTree, intersect, knn, negated_union, term, union};
use crate::value::{GeoPoint, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    Equal,
    NotEqual,
    In,
    NotIn,
    Between,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    IsTrue,
    IsFalse,
    IsMissing,
    StartsWith,
    EndsWith,
    Containing,
    Like,
    ContainsAll,
    Near,
    VectorSimilarity,
}

impl Operator {
    pub const ALL: [Operator; 19] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::In,
        Operator::NotIn,
        Operator::Between,
        Operator::GreaterThan,
        Operator::GreaterThanOrEqual,
        Operator::LessThan,
        Operator::LessThanOrEqual,
        Operator::IsTrue,
        Operator::IsFalse,
        Operator::IsMissing,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Containing,
        Operator::Like,
        Operator::ContainsAll,
        Operator::Near,
        Operator::VectorSimilarity,
    ];

    /// Operators for which a null or empty operand means "no constraint".
    ///
    /// Every other operator that takes a value rejects an empty one with
    /// [`QueryError::MissingOperand`].
    pub const fn unconstrained_when_empty(self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::NotEqual
                | Operator::In
                | Operator::NotIn
                | Operator::StartsWith
                | Operator::EndsWith
                | Operator::Containing
                | Operator::Like
                | Operator::ContainsAll
        )
    }

    /// Operator / value-family compatibility table.
    pub const fn supports(self, field_type: FieldType) -> bool {
        use FieldType::*;

        match self {
            Operator::Equal | Operator::NotEqual => matches!(field_type, Text | Tag | Numeric | Boolean | Date),
            Operator::In | Operator::NotIn => matches!(field_type, Text | Tag | Numeric | Date),
            Operator::Between
            | Operator::GreaterThan
            | Operator::GreaterThanOrEqual
            | Operator::LessThan
            | Operator::LessThanOrEqual => matches!(field_type, Numeric | Date),
            Operator::IsTrue | Operator::IsFalse => matches!(field_type, Boolean),
            Operator::IsMissing => true,
            Operator::StartsWith | Operator::EndsWith | Operator::Containing => matches!(field_type, Text | Tag),
            Operator::Like => matches!(field_type, Text),
            Operator::ContainsAll => matches!(field_type, Tag),
            Operator::Near => matches!(field_type, Geo),
            Operator::VectorSimilarity => matches!(field_type, Vector),
        }
    }
}

/// Encoded operand of a predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "terms", rename_all = "snake_case")]
pub enum Criterion {
    /// Empty operand on an operator where that means "match anything".
    Unconstrained,
    Match(TermValue),
    AnyOf(Vec<TermValue>),
    AllOf(Vec<TermValue>),
    NoneOf(Vec<TermValue>),
    Nearest(KnnClause),
}

/// Folds a criterion into an existing query tree.
pub trait Apply {
    fn apply(&self, tree: &QueryTree) -> QueryTree;
}

/// One criterion on one field. Borrows the descriptor it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate<'a> {
    field: &'a FieldDescriptor,
    operator: Operator,
    criterion: Criterion,
}

impl Apply for Predicate<'_> {
    fn apply(&self, tree: &QueryTree) -> QueryTree {
        let alias = self.field.alias();
        match &self.criterion {
            Criterion::Unconstrained => tree.clone(),
            Criterion::Match(value) => intersect(tree, term(alias, value.clone())),
            Criterion::AnyOf(values) => intersect(tree, union(alias, values.iter().cloned())),
            Criterion::AllOf(values) => values
                .iter()
                .fold(tree.clone(), |acc, value| intersect(&acc, term(alias, value.clone()))),
            // The engine only negates groups, so a single value still goes through the
            // negated union.
            Criterion::NoneOf(values) => intersect(tree, negated_union(alias, values.iter().cloned())),
            Criterion::Nearest(clause) => knn(tree, clause.clone()),
        }
    }
}

impl<'a> Predicate<'a> {
    #[inline]
    pub fn field(&self) -> &'a FieldDescriptor {
        self.field
    }

    #[inline]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[inline]
    pub fn criterion(&self) -> &Criterion {
        &self.criterion
    }

    #[inline]
    pub fn is_unconstrained(&self) -> bool {
        matches!(self.criterion, Criterion::Unconstrained)
    }

    pub fn equal(field: &'a FieldDescriptor, value: impl Into<Value>) -> QueryResult<Self> {
        let value = value.into();
        Self::guarded(field, Operator::Equal, &value, || {
            Ok(Criterion::Match(equality_literal(field, Operator::Equal, &value)?))
        })
    }

    pub fn not_equal(field: &'a FieldDescriptor, value: impl Into<Value>) -> QueryResult<Self> {
        let value = value.into();
        Self::guarded(field, Operator::NotEqual, &value, || {
            Ok(Criterion::NoneOf(vec![equality_literal(field, Operator::NotEqual, &value)?]))
        })
    }

    /// Any of `values`. A scalar behaves like a one-element list.
    pub fn in_values(field: &'a FieldDescriptor, values: impl Into<Value>) -> QueryResult<Self> {
        let values = values.into();
        Self::guarded(field, Operator::In, &values, || {
            Ok(Criterion::AnyOf(Self::members(field, Operator::In, &values)?))
        })
    }

    pub fn not_in(field: &'a FieldDescriptor, values: impl Into<Value>) -> QueryResult<Self> {
        let values = values.into();
        Self::guarded(field, Operator::NotIn, &values, || {
            Ok(Criterion::NoneOf(Self::members(field, Operator::NotIn, &values)?))
        })
    }

    /// Every tag in `values` must be present.
    pub fn contains_all(field: &'a FieldDescriptor, values: impl Into<Value>) -> QueryResult<Self> {
        let values = values.into();
        Self::guarded(field, Operator::ContainsAll, &values, || {
            Ok(Criterion::AllOf(Self::members(field, Operator::ContainsAll, &values)?))
        })
    }

    /// Closed range, both bounds inclusive.
    pub fn between(field: &'a FieldDescriptor, lower: impl Into<Value>, upper: impl Into<Value>) -> QueryResult<Self> {
        let operator = Operator::Between;
        ensure_supported(field, operator)?;
        let lower = Self::required_number(field, operator, &lower.into())?;
        let upper = Self::required_number(field, operator, &upper.into())?;
        Ok(Self::range(field, operator, NumericRange::between(lower, upper)))
    }

    /// Exclusive lower bound.
    pub fn greater_than(field: &'a FieldDescriptor, value: impl Into<Value>) -> QueryResult<Self> {
        Self::comparison(field, Operator::GreaterThan, value.into(), NumericRange::greater_than)
    }

    pub fn greater_than_or_equal(field: &'a FieldDescriptor, value: impl Into<Value>) -> QueryResult<Self> {
        Self::comparison(field, Operator::GreaterThanOrEqual, value.into(), NumericRange::at_least)
    }

    /// Exclusive upper bound.
    pub fn less_than(field: &'a FieldDescriptor, value: impl Into<Value>) -> QueryResult<Self> {
        Self::comparison(field, Operator::LessThan, value.into(), NumericRange::less_than)
    }

    pub fn less_than_or_equal(field: &'a FieldDescriptor, value: impl Into<Value>) -> QueryResult<Self> {
        Self::comparison(field, Operator::LessThanOrEqual, value.into(), NumericRange::at_most)
    }

    pub fn is_true(field: &'a FieldDescriptor) -> QueryResult<Self> {
        ensure_supported(field, Operator::IsTrue)?;
        Ok(Self::build(field, Operator::IsTrue, Criterion::Match(boolean_literal(true))))
    }

    pub fn is_false(field: &'a FieldDescriptor) -> QueryResult<Self> {
        ensure_supported(field, Operator::IsFalse)?;
        Ok(Self::build(field, Operator::IsFalse, Criterion::Match(boolean_literal(false))))
    }

    /// Documents without a value for the field. The index must track missing values.
    pub fn is_missing(field: &'a FieldDescriptor) -> QueryResult<Self> {
        ensure_supported(field, Operator::IsMissing)?;
        Ok(Self::build(field, Operator::IsMissing, Criterion::Match(TermValue::Missing)))
    }

    pub fn starts_with(field: &'a FieldDescriptor, value: impl Into<Value>) -> QueryResult<Self> {
        Self::pattern(field, Operator::StartsWith, value.into(), TextMode::Prefix)
    }

    pub fn ends_with(field: &'a FieldDescriptor, value: impl Into<Value>) -> QueryResult<Self> {
        Self::pattern(field, Operator::EndsWith, value.into(), TextMode::Suffix)
    }

    pub fn containing(field: &'a FieldDescriptor, value: impl Into<Value>) -> QueryResult<Self> {
        Self::pattern(field, Operator::Containing, value.into(), TextMode::Contains)
    }

    /// Fuzzy match, Levenshtein distance 1.
    pub fn like(field: &'a FieldDescriptor, value: impl Into<Value>) -> QueryResult<Self> {
        Self::pattern(field, Operator::Like, value.into(), TextMode::Fuzzy)
    }

    pub fn near(field: &'a FieldDescriptor, center: GeoPoint, radius: f64, unit: GeoUnit) -> QueryResult<Self> {
        ensure_supported(field, Operator::Near)?;
        let radius = codec::geo_radius(field, center, radius, unit)?;
        Ok(Self::build(field, Operator::Near, Criterion::Match(TermValue::Geo(radius))))
    }

    /// k nearest neighbours of `vector`, optionally limited to `threshold` distance.
    pub fn vector_similarity(
        field: &'a FieldDescriptor,
        vector: impl Into<Value>,
        k: usize,
        threshold: Option<f64>,
    ) -> QueryResult<Self> {
        let operator = Operator::VectorSimilarity;
        let vector = vector.into();
        ensure_supported(field, operator)?;
        if vector.is_empty() {
            return Err(missing(field, operator));
        }
        let clause = codec::knn_clause(field, operator, &vector, k, threshold)?;
        Ok(Self::build(field, operator, Criterion::Nearest(clause)))
    }

    #[inline]
    fn build(field: &'a FieldDescriptor, operator: Operator, criterion: Criterion) -> Self {
        Self {
            field,
            operator,
            criterion,
        }
    }

    /// Shared skeleton: type check, then the empty-operand policy, then encoding.
    fn guarded<F>(field: &'a FieldDescriptor, operator: Operator, value: &Value, encode: F) -> QueryResult<Self>
    where
        F: FnOnce() -> QueryResult<Criterion>,
    {
        ensure_supported(field, operator)?;
        if value.is_empty() {
            if operator.unconstrained_when_empty() {
                return Ok(Self::build(field, operator, Criterion::Unconstrained));
            }
            return Err(missing(field, operator));
        }
        Ok(Self::build(field, operator, encode()?))
    }

    fn members(field: &FieldDescriptor, operator: Operator, values: &Value) -> QueryResult<Vec<TermValue>> {
        values
            .clone()
            .into_members()
            .iter()
            .map(|member| equality_literal(field, operator, member))
            .collect()
    }

    fn comparison(
        field: &'a FieldDescriptor,
        operator: Operator,
        value: Value,
        range: fn(f64) -> NumericRange,
    ) -> QueryResult<Self> {
        ensure_supported(field, operator)?;
        let bound = Self::required_number(field, operator, &value)?;
        Ok(Self::range(field, operator, range(bound)))
    }

    fn required_number(field: &FieldDescriptor, operator: Operator, value: &Value) -> QueryResult<f64> {
        if value.is_empty() {
            return Err(missing(field, operator));
        }
        numeric_operand(field, value)
    }

    #[inline]
    fn range(field: &'a FieldDescriptor, operator: Operator, range: NumericRange) -> Self {
        Self::build(field, operator, Criterion::Match(TermValue::Numeric(range)))
    }

    fn pattern(field: &'a FieldDescriptor, operator: Operator, value: Value, mode: TextMode) -> QueryResult<Self> {
        Self::guarded(field, operator, &value, || {
            Ok(Criterion::Match(pattern_literal(field, operator, &value, mode)?))
        })
    }
}

fn ensure_supported(field: &FieldDescriptor, operator: Operator) -> QueryResult<()> {
    if operator.supports(field.field_type()) {
        Ok(())
    } else {
        Err(codec::unsupported(field, operator))
    }
}

fn missing(field: &FieldDescriptor, operator: Operator) -> QueryError {
    QueryError::MissingOperand {
        field: field.name().to_string(),
        operator,
    }
}

/// Fluent constructors, e.g. `schema.field("age")?.gt(18)?`.
impl FieldDescriptor {
    pub fn equal(&self, value: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::equal(self, value)
    }

    pub fn not_equal(&self, value: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::not_equal(self, value)
    }

    pub fn in_values(&self, values: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::in_values(self, values)
    }

    pub fn not_in(&self, values: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::not_in(self, values)
    }

    pub fn contains_all(&self, values: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::contains_all(self, values)
    }

    pub fn between(&self, lower: impl Into<Value>, upper: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::between(self, lower, upper)
    }

    pub fn gt(&self, value: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::greater_than(self, value)
    }

    pub fn gte(&self, value: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::greater_than_or_equal(self, value)
    }

    pub fn lt(&self, value: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::less_than(self, value)
    }

    pub fn lte(&self, value: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::less_than_or_equal(self, value)
    }

    pub fn is_true(&self) -> QueryResult<Predicate<'_>> {
        Predicate::is_true(self)
    }

    pub fn is_false(&self) -> QueryResult<Predicate<'_>> {
        Predicate::is_false(self)
    }

    pub fn is_missing(&self) -> QueryResult<Predicate<'_>> {
        Predicate::is_missing(self)
    }

    pub fn starts_with(&self, value: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::starts_with(self, value)
    }

    pub fn ends_with(&self, value: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::ends_with(self, value)
    }

    pub fn containing(&self, value: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::containing(self, value)
    }

    pub fn like(&self, value: impl Into<Value>) -> QueryResult<Predicate<'_>> {
        Predicate::like(self, value)
    }

    pub fn near(&self, center: GeoPoint, radius: f64, unit: GeoUnit) -> QueryResult<Predicate<'_>> {
        Predicate::near(self, center, radius, unit)
    }

    pub fn knn(&self, vector: impl Into<Value>, k: usize) -> QueryResult<Predicate<'_>> {
        Predicate::vector_similarity(self, vector, k, None)
    }

    pub fn knn_within(&self, vector: impl Into<Value>, k: usize, threshold: f64) -> QueryResult<Predicate<'_>> {
        Predicate::vector_similarity(self, vector, k, Some(threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{RangeBound, TagMode};
    use crate::field::{DistanceMetric, VectorParams};
    use crate::query::QueryNode;
    use crate::value::list;

    fn base_tree() -> QueryTree {
        FieldDescriptor::numeric("age")
            .unwrap()
            .gt(1)
            .unwrap()
            .apply(&QueryTree::root())
    }

    fn descriptors() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::text("name").unwrap(),
            FieldDescriptor::tag("tags").unwrap(),
            FieldDescriptor::numeric("score").unwrap(),
            FieldDescriptor::boolean("active").unwrap(),
            FieldDescriptor::date("born").unwrap(),
            FieldDescriptor::geo("location").unwrap(),
            FieldDescriptor::vector("embedding", "embedding", VectorParams::new(4, DistanceMetric::L2)).unwrap(),
        ]
    }

    #[test]
    fn no_constraint_policy_table() {
        let unconstrained: Vec<Operator> = Operator::ALL
            .into_iter()
            .filter(|operator| operator.unconstrained_when_empty())
            .collect();
        assert_eq!(
            unconstrained,
            vec![
                Operator::Equal,
                Operator::NotEqual,
                Operator::In,
                Operator::NotIn,
                Operator::StartsWith,
                Operator::EndsWith,
                Operator::Containing,
                Operator::Like,
                Operator::ContainsAll,
            ]
        );
    }

    #[test]
    fn empty_operand_is_identity_for_every_family() {
        let tree = base_tree();
        let empties = [Value::Null, Value::from(""), list(Vec::<Value>::new())];

        for field in descriptors() {
            for operator in Operator::ALL.into_iter().filter(|op| op.unconstrained_when_empty()) {
                if !operator.supports(field.field_type()) {
                    continue;
                }
                for empty in &empties {
                    let predicate = match operator {
                        Operator::Equal => field.equal(empty.clone()),
                        Operator::NotEqual => field.not_equal(empty.clone()),
                        Operator::In => field.in_values(empty.clone()),
                        Operator::NotIn => field.not_in(empty.clone()),
                        Operator::StartsWith => field.starts_with(empty.clone()),
                        Operator::EndsWith => field.ends_with(empty.clone()),
                        Operator::Containing => field.containing(empty.clone()),
                        Operator::Like => field.like(empty.clone()),
                        Operator::ContainsAll => field.contains_all(empty.clone()),
                        other => unreachable!("{other:?} is not in the policy table"),
                    }
                    .unwrap();
                    assert!(predicate.is_unconstrained());
                    assert!(predicate.apply(&tree).ptr_eq(&tree), "{operator:?} on {:?}", field.field_type());
                }
            }
        }
    }

    #[test]
    fn value_operators_reject_empty_operand() {
        let score = FieldDescriptor::numeric("score").unwrap();
        for result in [score.gt(Value::Null), score.lte(""), score.between(1, Value::Null)] {
            assert!(matches!(result, Err(QueryError::MissingOperand { .. })));
        }
        let embedding = FieldDescriptor::vector("embedding", "embedding", VectorParams::new(4, DistanceMetric::L2)).unwrap();
        assert!(matches!(
            embedding.knn(Vec::<f32>::new(), 3),
            Err(QueryError::MissingOperand { .. })
        ));
    }

    #[test]
    fn incompatible_operand_is_type_mismatch() {
        let score = FieldDescriptor::numeric("score").unwrap();
        let name = FieldDescriptor::text("name").unwrap();
        let active = FieldDescriptor::boolean("active").unwrap();

        assert!(matches!(score.equal("eighteen"), Err(QueryError::TypeMismatch { .. })));
        assert!(matches!(score.gt(true), Err(QueryError::TypeMismatch { .. })));
        assert!(matches!(name.equal(42), Err(QueryError::TypeMismatch { .. })));
        assert!(matches!(active.not_equal("yes"), Err(QueryError::TypeMismatch { .. })));
        assert!(matches!(
            score.in_values(list([Value::Int(1), Value::Null])),
            Err(QueryError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn operator_outside_family_is_unsupported() {
        let name = FieldDescriptor::text("name").unwrap();
        let location = FieldDescriptor::geo("location").unwrap();
        assert!(matches!(name.gt(1), Err(QueryError::UnsupportedOperatorForType { .. })));
        assert!(matches!(name.is_true(), Err(QueryError::UnsupportedOperatorForType { .. })));
        assert!(matches!(location.equal(Value::Null), Err(QueryError::UnsupportedOperatorForType { .. })));
        assert!(matches!(name.contains_all(list(["a"])), Err(QueryError::UnsupportedOperatorForType { .. })));
    }

    #[test]
    fn equal_intersects_single_term() {
        let name = FieldDescriptor::text("name").unwrap();
        let tree = name.equal("Bob").unwrap().apply(&QueryTree::root());
        assert_eq!(
            *tree.node(),
            term("name", TermValue::text(TextMode::Exact, "Bob"))
        );
    }

    #[test]
    fn not_equal_wraps_single_value_in_negated_union() {
        let name = FieldDescriptor::text("name").unwrap();
        let tree = name.not_equal("Bob").unwrap().apply(&QueryTree::root());
        assert_eq!(
            *tree.node(),
            negated_union("name", [TermValue::text(TextMode::Exact, "Bob")])
        );
    }

    #[test]
    fn comparisons_choose_bounds() {
        let score = FieldDescriptor::numeric("score").unwrap();
        let cases = [
            (score.gt(5).unwrap(), RangeBound::Exclusive(5.0), RangeBound::Unbounded),
            (score.gte(5).unwrap(), RangeBound::Inclusive(5.0), RangeBound::Unbounded),
            (score.lt(5).unwrap(), RangeBound::Unbounded, RangeBound::Exclusive(5.0)),
            (score.lte(5).unwrap(), RangeBound::Unbounded, RangeBound::Inclusive(5.0)),
            (score.between(1, 5).unwrap(), RangeBound::Inclusive(1.0), RangeBound::Inclusive(5.0)),
        ];
        for (predicate, lower, upper) in cases {
            assert_eq!(
                predicate.criterion(),
                &Criterion::Match(TermValue::Numeric(NumericRange { lower, upper }))
            );
        }
    }

    #[test]
    fn in_builds_union_and_contains_all_builds_terms() {
        let tags = FieldDescriptor::tag("tags").unwrap();
        let any = tags.in_values(list(["a", "b"])).unwrap().apply(&QueryTree::root());
        assert!(matches!(any.node(), QueryNode::Union { alternatives, .. } if alternatives.len() == 2));

        let all = tags.contains_all(list(["a", "b"])).unwrap().apply(&QueryTree::root());
        let QueryNode::Intersect { children } = all.node() else {
            panic!("expected intersect");
        };
        assert_eq!(*children[0].node(), term("tags", TermValue::tag(TagMode::Exact, "a")));
        assert_eq!(*children[1].node(), term("tags", TermValue::tag(TagMode::Exact, "b")));
    }

    #[test]
    fn vector_similarity_checks_dimension() {
        let embedding = FieldDescriptor::vector("embedding", "embedding", VectorParams::new(4, DistanceMetric::L2)).unwrap();
        assert_eq!(
            embedding.knn(vec![1.0_f32, 2.0, 3.0], 5).unwrap_err(),
            QueryError::DimensionMismatch {
                field: "embedding".to_string(),
                expected: 4,
                actual: 3,
            }
        );

        let tree = embedding
            .knn_within(vec![1.0_f32, 2.0, 3.0, 4.0], 5, 0.5)
            .unwrap()
            .apply(&base_tree());
        let clause = tree.knn_clause().unwrap();
        assert_eq!(clause.k, 5);
        assert_eq!(clause.threshold, Some(0.5));
    }

    #[test]
    fn boolean_and_missing_predicates() {
        let active = FieldDescriptor::boolean("active").unwrap();
        assert_eq!(
            active.is_false().unwrap().criterion(),
            &Criterion::Match(TermValue::tag(TagMode::Exact, "false"))
        );
        assert_eq!(
            active.is_missing().unwrap().criterion(),
            &Criterion::Match(TermValue::Missing)
        );
    }
}
