//! Ordered predicate streams and their compilation into a single query tree.

use serde::{Deserialize, Serialize};

use crate::command;
use crate::config::SearchConfig;
use crate::errors::{QueryError, QueryResult};
use crate::field::EntitySchema;
use crate::predicate::{Apply, Predicate};
use crate::query::QueryTree;
use crate::render::{RenderedQuery, render_query};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// Case-insensitive `asc` / `desc`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Sort key resolved to its engine alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchSort {
    pub field: String,
    pub order: SortOrder,
}

/// Fold `predicates` left to right, starting from the match-everything tree.
pub fn compile(predicates: &[Predicate<'_>]) -> QueryTree {
    let tree = predicates
        .iter()
        .fold(QueryTree::root(), |tree, predicate| predicate.apply(&tree));
    log::debug!("compiled {} predicates into {}", predicates.len(), tree);
    tree
}

/// Predicates, sort and paging over one entity.
///
/// ```
/// use snugom_stream::field::{EntitySchema, FieldDescriptor};
/// use snugom_stream::stream::{SearchStream, SortOrder};
///
/// let schema = EntitySchema::new(
///     "idx:person",
///     "id",
///     [
///         FieldDescriptor::text("name").unwrap(),
///         FieldDescriptor::numeric("age").unwrap().sortable(),
///     ],
/// )
/// .unwrap();
/// let age = schema.field("age").unwrap();
/// let stream = SearchStream::of(&schema)
///     .filter(age.gt(18).unwrap())
///     .filter(age.lte(65).unwrap())
///     .sorted_by("age", SortOrder::Desc)
///     .unwrap();
/// assert_eq!(stream.compile().to_string(), "@age:[(18 +inf] @age:[-inf 65]");
/// ```
#[derive(Debug, Clone)]
pub struct SearchStream<'a> {
    schema: &'a EntitySchema,
    predicates: Vec<Predicate<'a>>,
    sort: Option<SearchSort>,
    offset: u64,
    limit: Option<u64>,
}

impl<'a> SearchStream<'a> {
    pub fn of(schema: &'a EntitySchema) -> Self {
        Self {
            schema,
            predicates: Vec::new(),
            sort: None,
            offset: 0,
            limit: None,
        }
    }

    #[inline]
    pub fn filter(mut self, predicate: Predicate<'a>) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Sort by a sortable field of the schema.
    pub fn sorted_by(mut self, field: &str, order: SortOrder) -> QueryResult<Self> {
        let descriptor = self.schema.field(field)?;
        if !descriptor.is_sortable() {
            return Err(QueryError::NotSortable {
                field: descriptor.name().to_string(),
            });
        }
        self.sort = Some(SearchSort {
            field: descriptor.alias().to_string(),
            order,
        });
        Ok(self)
    }

    #[inline]
    pub fn skip(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    #[inline]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[inline]
    pub fn schema(&self) -> &'a EntitySchema {
        self.schema
    }

    #[inline]
    pub fn predicates(&self) -> &[Predicate<'a>] {
        &self.predicates
    }

    #[inline]
    pub fn sort(&self) -> Option<&SearchSort> {
        self.sort.as_ref()
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Requested page size, before clamping.
    #[inline]
    pub fn requested_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn compile(&self) -> QueryTree {
        compile(&self.predicates)
    }

    pub fn render(&self, config: &SearchConfig) -> RenderedQuery {
        render_query(&self.compile(), config)
    }

    /// `FT.SEARCH` for one page of results.
    pub fn to_command(&self, config: &SearchConfig) -> redis::Cmd {
        let tree = self.compile();
        let page = command::Page {
            offset: self.offset,
            size: config.clamp_page_size(self.limit),
        };
        command::search_command(self.schema.index(), &tree, self.sort.as_ref(), page, config)
    }

    /// `FT.SEARCH ... LIMIT 0 0`, which only reports the number of matches.
    pub fn to_count_command(&self, config: &SearchConfig) -> redis::Cmd {
        command::count_command(self.schema.index(), &self.compile(), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{DistanceMetric, FieldDescriptor, VectorParams};
    use crate::value::list;

    fn schema() -> EntitySchema {
        EntitySchema::new(
            "idx:person",
            "id",
            [
                FieldDescriptor::text("name").unwrap(),
                FieldDescriptor::numeric("age").unwrap().sortable(),
                FieldDescriptor::tag("tags").unwrap(),
                FieldDescriptor::vector("embedding", "embedding", VectorParams::new(4, DistanceMetric::Cosine)).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn empty_stream_compiles_to_root() {
        let schema = schema();
        assert!(SearchStream::of(&schema).compile().is_root());
        assert!(compile(&[]).is_root());
    }

    #[test]
    fn unconstrained_predicates_leave_tree_untouched() {
        let schema = schema();
        let name = schema.field("name").unwrap();
        let tags = schema.field("tags").unwrap();
        let stream = SearchStream::of(&schema)
            .filter(name.equal("").unwrap())
            .filter(tags.in_values(list(Vec::<String>::new())).unwrap());
        assert!(stream.compile().is_root());
    }

    #[test]
    fn sorted_by_resolves_alias_and_checks_sortable() {
        let schema = schema();
        let stream = SearchStream::of(&schema).sorted_by("age", SortOrder::Desc).unwrap();
        assert_eq!(
            stream.sort(),
            Some(&SearchSort {
                field: "age".to_string(),
                order: SortOrder::Desc
            })
        );

        assert!(matches!(
            SearchStream::of(&schema).sorted_by("name", SortOrder::Asc),
            Err(QueryError::NotSortable { .. })
        ));
        assert!(matches!(
            SearchStream::of(&schema).sorted_by("nope", SortOrder::Asc),
            Err(QueryError::UnknownField { .. })
        ));
    }

    #[test]
    fn paging_accessors() {
        let schema = schema();
        let stream = SearchStream::of(&schema).skip(50).limit(10);
        assert_eq!(stream.offset(), 50);
        assert_eq!(stream.requested_limit(), Some(10));
    }

    #[test]
    fn render_carries_vector_params() {
        let schema = schema();
        let embedding = schema.field("embedding").unwrap();
        let rendered = SearchStream::of(&schema)
            .filter(embedding.knn(vec![0.1_f32, 0.2, 0.3, 0.4], 2).unwrap())
            .render(&SearchConfig::default());
        assert_eq!(rendered.params.len(), 1);
        assert_eq!(rendered.params[0].1.len(), 16);
    }

    #[test]
    fn sort_order_parses_case_insensitively() {
        assert_eq!(SortOrder::parse("DESC"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse(" asc "), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("up"), None);
    }
}
