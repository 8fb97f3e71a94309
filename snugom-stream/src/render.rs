//! Query tree to RediSearch query syntax.
//!
//! | Node                  | Rendering                                        |
//! |-----------------------|--------------------------------------------------|
//! | `Root`                | `*`                                              |
//! | `Intersect`           | children joined by a space                       |
//! | `Union`               | `(@f:a|@f:b)`, or `@f:{a|b}` for exact tags      |
//! | `NegatedUnion`        | `-` in front of the union                        |
//! | numeric term          | `@f:[lo hi]`, `(` marks an exclusive bound       |
//! | geo term              | `@f:[lon lat radius unit]`                       |
//! | missing term          | `ismissing(@f)`                                  |
//! | `Knn`                 | `(filter)=>[KNN k @f $param AS score]`           |

use serde::Serialize;

use crate::codec::{
    RangeBound, TagMode, TermValue, TextMode, escape_tag, field_ref, format_numeric, text_contains, text_exact, text_fuzzy,
    text_prefix, text_suffix,
};
use crate::config::SearchConfig;
use crate::query::{QueryNode, QueryTree};

const TAG_SEPARATOR: &str = "|";

/// Query string plus the binary parameters it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedQuery {
    pub query: String,
    pub params: Vec<(String, Vec<u8>)>,
}

pub fn render_query(tree: &QueryTree, config: &SearchConfig) -> RenderedQuery {
    let rendered = match tree.node() {
        QueryNode::Knn { filter, clause } => {
            let param = &config.vector_param;
            let mut filters = Vec::with_capacity(2);
            if let Some(threshold) = clause.threshold {
                filters.push(format!(
                    "{}:[VECTOR_RANGE {} ${}]",
                    field_ref(&clause.alias),
                    format_numeric(threshold),
                    param
                ));
            }
            if !filter.is_root() || filters.is_empty() {
                filters.push(render_node(filter, true));
            }

            RenderedQuery {
                query: format!(
                    "({})=>[KNN {} {} ${} AS {}]",
                    filters.join(" "),
                    clause.k,
                    field_ref(&clause.alias),
                    param,
                    config.score_field
                ),
                params: vec![(param.clone(), clause.blob())],
            }
        }
        _ => RenderedQuery {
            query: render_node(tree, true),
            params: Vec::new(),
        },
    };

    log::trace!("rendered query: {}", rendered.query);
    rendered
}

fn render_node(tree: &QueryTree, top_level: bool) -> String {
    match tree.node() {
        QueryNode::Root => "*".to_string(),
        QueryNode::Term(term) => render_term(&term.alias, &term.value),
        QueryNode::Intersect { children } => {
            let clauses: Vec<String> = children.iter().map(|child| render_node(child, false)).collect();
            if top_level || clauses.len() == 1 {
                clauses.join(" ")
            } else {
                format!("({})", clauses.join(" "))
            }
        }
        QueryNode::Union { alias, alternatives } => {
            if alternatives.is_empty() {
                return "-*".to_string();
            }
            render_alternatives(alias, alternatives)
        }
        QueryNode::NegatedUnion { alias, alternatives } => {
            if alternatives.is_empty() {
                return "*".to_string();
            }
            format!("-{}", render_alternatives(alias, alternatives))
        }
        // Only reachable for hand-built trees: `intersect` keeps k-NN outermost.
        QueryNode::Knn { filter, .. } => render_node(filter, top_level),
    }
}

/// A single group: one term, one tag set, or a parenthesized disjunction.
fn render_alternatives(alias: &str, alternatives: &[TermValue]) -> String {
    if let [single] = alternatives {
        return render_term(alias, single);
    }

    let exact_tags: Option<Vec<String>> = alternatives
        .iter()
        .map(|alternative| match alternative {
            TermValue::Tag {
                mode: TagMode::Exact,
                value,
            } => Some(escape_tag(value)),
            _ => None,
        })
        .collect();
    if let Some(tags) = exact_tags {
        return format!("{}:{{{}}}", field_ref(alias), tags.join(TAG_SEPARATOR));
    }

    let terms: Vec<String> = alternatives.iter().map(|alternative| render_term(alias, alternative)).collect();
    format!("({})", terms.join("|"))
}

fn render_term(alias: &str, value: &TermValue) -> String {
    let field = field_ref(alias);
    match value {
        TermValue::Text { mode, value } => {
            let literal = match mode {
                TextMode::Exact => text_exact(value),
                TextMode::Prefix => text_prefix(value),
                TextMode::Suffix => text_suffix(value),
                TextMode::Contains => text_contains(value),
                TextMode::Fuzzy => text_fuzzy(value),
            };
            if literal.contains(' ') && *mode != TextMode::Exact {
                format!("{}:({})", field, literal)
            } else {
                format!("{}:{}", field, literal)
            }
        }
        TermValue::Tag { mode, value } => {
            let escaped = escape_tag(value);
            let pattern = match mode {
                TagMode::Exact => escaped,
                TagMode::Prefix => format!("{}*", escaped),
                TagMode::Suffix => format!("*{}", escaped),
                TagMode::Contains => format!("*{}*", escaped),
            };
            format!("{}:{{{}}}", field, pattern)
        }
        TermValue::Numeric(range) => {
            format!("{}:[{} {}]", field, lower_bound(range.lower), upper_bound(range.upper))
        }
        TermValue::Geo(geo) => format!(
            "{}:[{} {} {} {}]",
            field,
            geo.center.lon,
            geo.center.lat,
            format_numeric(geo.radius),
            geo.unit.as_str()
        ),
        TermValue::Missing => format!("ismissing({})", field),
    }
}

fn lower_bound(bound: RangeBound) -> String {
    match bound {
        RangeBound::Unbounded => "-inf".to_string(),
        RangeBound::Inclusive(value) => format_numeric(value),
        RangeBound::Exclusive(value) => format!("({}", format_numeric(value)),
    }
}

fn upper_bound(bound: RangeBound) -> String {
    match bound {
        RangeBound::Unbounded => "+inf".to_string(),
        RangeBound::Inclusive(value) => format_numeric(value),
        RangeBound::Exclusive(value) => format!("({}", format_numeric(value)),
    }
}
