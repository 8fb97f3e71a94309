//! Textual `field:operator:value` filters, as they arrive from query strings
//! or the command line, turned into a [`SearchStream`].
//!
//! | Operator        | Value                        | Predicate                 |
//! |-----------------|------------------------------|---------------------------|
//! | `eq` / `ne`     | single value                 | Equal / NotEqual          |
//! | `gt` `gte` `lt` `lte` | single value           | comparisons               |
//! | `range`         | `lo,hi`, `*` for open ends   | Between or one comparison |
//! | `in` / `nin`    | `a|b` or `a,b`               | In / NotIn                |
//! | `all`           | `a|b` or `a,b`               | ContainsAll               |
//! | `bool`          | `true` / `false`             | IsTrue / IsFalse          |
//! | `missing`       | none                         | IsMissing                 |
//! | `prefix` `suffix` `contains` `fuzzy` | single value | pattern predicates   |
//! | `near`          | `lon,lat,radius,unit`        | Near                      |

pub mod normalizers;

pub use normalizers::*;

use serde::Deserialize;

use crate::command::Page;
use crate::config::SearchConfig;
use crate::errors::{QueryError, QueryResult};
use crate::field::EntitySchema;
use crate::stream::{SearchStream, SortOrder};

const DEFAULT_PAGE: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Range,
    In,
    NotIn,
    All,
    Bool,
    Missing,
    Prefix,
    Suffix,
    Contains,
    Fuzzy,
    Near,
}

impl FilterOperator {
    pub fn parse(raw: &str) -> QueryResult<Self> {
        let operator = match raw.trim().to_ascii_lowercase().as_str() {
            "eq" => FilterOperator::Eq,
            "ne" => FilterOperator::Ne,
            "gt" => FilterOperator::Gt,
            "gte" => FilterOperator::Gte,
            "lt" => FilterOperator::Lt,
            "lte" => FilterOperator::Lte,
            "range" => FilterOperator::Range,
            "in" => FilterOperator::In,
            "nin" => FilterOperator::NotIn,
            "all" => FilterOperator::All,
            "bool" | "boolean" => FilterOperator::Bool,
            "missing" => FilterOperator::Missing,
            "prefix" => FilterOperator::Prefix,
            "suffix" => FilterOperator::Suffix,
            "contains" => FilterOperator::Contains,
            "fuzzy" => FilterOperator::Fuzzy,
            "near" => FilterOperator::Near,
            other => {
                return Err(QueryError::invalid_request(format!("Unsupported filter operator: {}", other)));
            }
        };
        Ok(operator)
    }
}

/// One parsed filter, still untyped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDescriptor {
    pub field: String,
    pub operator: FilterOperator,
    pub values: Vec<String>,
}

impl FilterDescriptor {
    /// Parse `field:operator:value`. Only `missing` may omit the value.
    pub fn parse(raw: &str) -> QueryResult<Self> {
        let parts: Vec<&str> = raw.splitn(3, ':').collect();
        let (field, operator, value) = match parts.as_slice() {
            [field, operator, value] => (*field, FilterOperator::parse(operator)?, *value),
            [field, operator] => {
                let operator = FilterOperator::parse(operator)?;
                if operator != FilterOperator::Missing {
                    return Err(QueryError::invalid_request(format!("Invalid filter syntax: {}", raw)));
                }
                (*field, operator, "")
            }
            _ => return Err(QueryError::invalid_request(format!("Invalid filter syntax: {}", raw))),
        };

        let field = field.trim();
        if field.is_empty() {
            return Err(QueryError::invalid_request(format!("Invalid filter syntax: {}", raw)));
        }

        let values = match operator {
            FilterOperator::In | FilterOperator::NotIn | FilterOperator::All => value
                .split(['|', ','])
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
            FilterOperator::Range | FilterOperator::Near => {
                value.split(',').map(|segment| segment.trim().to_string()).collect()
            }
            FilterOperator::Missing => Vec::new(),
            // Pattern values keep their exact text.
            FilterOperator::Prefix | FilterOperator::Suffix | FilterOperator::Contains | FilterOperator::Fuzzy => {
                vec![value.to_string()]
            }
            FilterOperator::Eq
            | FilterOperator::Ne
            | FilterOperator::Gt
            | FilterOperator::Gte
            | FilterOperator::Lt
            | FilterOperator::Lte
            | FilterOperator::Bool => vec![value.trim().to_string()],
        };

        Ok(Self {
            field: field.to_string(),
            operator,
            values,
        })
    }
}

/// Query-string form of a search: filters plus paging and sorting.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FilterQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    #[serde(default)]
    pub filter: Vec<String>,
}

impl FilterQuery {
    /// Resolve every filter against `schema`, in order.
    pub fn into_stream<'a>(self, schema: &'a EntitySchema, config: &SearchConfig) -> QueryResult<SearchStream<'a>> {
        let page_size = config.clamp_page_size(self.page_size);
        let page = self.page.unwrap_or(DEFAULT_PAGE).max(1);

        let mut stream = SearchStream::of(schema)
            .skip(Page::numbered(page, page_size).offset)
            .limit(page_size);

        if let Some(sort_name) = self.sort_by.as_deref() {
            let field = schema
                .fields()
                .iter()
                .find(|field| field.name().eq_ignore_ascii_case(sort_name.trim()))
                .ok_or_else(|| QueryError::invalid_request(format!("Unsupported sort field: {}", sort_name)))?;
            stream = stream.sorted_by(field.name(), self.sort_order.unwrap_or_default())?;
        }

        for raw in &self.filter {
            let descriptor = FilterDescriptor::parse(raw)?;
            let field = schema.field(&descriptor.field)?;
            stream = stream.filter(build_predicate(field, &descriptor)?);
        }

        log::debug!(
            "parsed {} filters on {} (page {}, size {})",
            self.filter.len(),
            schema.index(),
            page,
            page_size
        );
        Ok(stream)
    }
}
