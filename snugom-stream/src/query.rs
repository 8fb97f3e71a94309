//! Query tree and its composition algebra.
//!
//! Trees are persistent: every node sits behind an [`Arc`], and the builder
//! primitives return new nodes instead of mutating existing ones. Two trees
//! extended from a shared prefix therefore never observe each other's changes.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::codec::{KnnClause, TermValue};

/// One atomic criterion: a literal on a field alias.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Term {
    pub alias: String,
    pub value: TermValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum QueryNode {
    /// Matches every document. Identity element of [`intersect`].
    Root,
    Term(Term),
    Intersect { children: Vec<QueryTree> },
    Union { alias: String, alternatives: Vec<TermValue> },
    /// None of the alternatives match.
    NegatedUnion { alias: String, alternatives: Vec<TermValue> },
    /// k-NN over the documents matched by `filter`.
    Knn { filter: QueryTree, clause: Arc<KnnClause> },
}

/// Cheaply clonable handle to an immutable query node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryTree(Arc<QueryNode>);

impl QueryTree {
    /// The match-everything tree.
    pub fn root() -> Self {
        Self(Arc::new(QueryNode::Root))
    }

    #[inline]
    pub fn node(&self) -> &QueryNode {
        &self.0
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        matches!(*self.0, QueryNode::Root)
    }

    /// The k-NN clause wrapping this tree, if any.
    pub fn knn_clause(&self) -> Option<&KnnClause> {
        match self.node() {
            QueryNode::Knn { clause, .. } => Some(clause.as_ref()),
            _ => None,
        }
    }

    /// True when both handles point at the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &QueryTree) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for QueryTree {
    fn default() -> Self {
        Self::root()
    }
}

impl From<QueryNode> for QueryTree {
    fn from(node: QueryNode) -> Self {
        Self(Arc::new(node))
    }
}

impl From<Term> for QueryTree {
    fn from(term: Term) -> Self {
        QueryNode::Term(term).into()
    }
}

impl fmt::Display for QueryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::render_query(self, &crate::config::SearchConfig::default()).query)
    }
}

/// Single term on `alias`.
#[inline]
pub fn term(alias: impl Into<String>, value: TermValue) -> QueryNode {
    QueryNode::Term(Term {
        alias: alias.into(),
        value,
    })
}

/// Conjunction of `tree` and `node`.
///
/// - `Root` on either side is the identity.
/// - An existing conjunction is extended; its children are shared, not copied.
/// - A k-NN wrapper stays outermost: the new node joins its filter. When both
///   sides carry a k-NN clause, the clause of `node` wins.
pub fn intersect(tree: &QueryTree, node: impl Into<QueryTree>) -> QueryTree {
    let node = node.into();
    match (tree.node(), node.node()) {
        (_, QueryNode::Root) => tree.clone(),
        (QueryNode::Root, _) => node.clone(),
        (QueryNode::Knn { filter: left, .. }, QueryNode::Knn { filter: right, clause }) => QueryNode::Knn {
            filter: intersect(left, right.clone()),
            clause: Arc::clone(clause),
        }
        .into(),
        (QueryNode::Knn { filter, clause }, _) => QueryNode::Knn {
            filter: intersect(filter, node.clone()),
            clause: Arc::clone(clause),
        }
        .into(),
        (_, QueryNode::Knn { filter, clause }) => QueryNode::Knn {
            filter: intersect(tree, filter.clone()),
            clause: Arc::clone(clause),
        }
        .into(),
        (QueryNode::Intersect { children }, _) => {
            let mut children = children.clone();
            match node.node() {
                QueryNode::Intersect { children: more } => children.extend(more.iter().cloned()),
                _ => children.push(node.clone()),
            }
            QueryNode::Intersect { children }.into()
        }
        (_, QueryNode::Intersect { children: more }) => {
            let mut children = Vec::with_capacity(more.len() + 1);
            children.push(tree.clone());
            children.extend(more.iter().cloned());
            QueryNode::Intersect { children }.into()
        }
        _ => QueryNode::Intersect {
            children: vec![tree.clone(), node.clone()],
        }
        .into(),
    }
}

/// Any of `alternatives` on `alias`.
pub fn union(alias: impl Into<String>, alternatives: impl IntoIterator<Item = TermValue>) -> QueryNode {
    QueryNode::Union {
        alias: alias.into(),
        alternatives: alternatives.into_iter().collect(),
    }
}

/// None of `alternatives` on `alias`.
pub fn negated_union(alias: impl Into<String>, alternatives: impl IntoIterator<Item = TermValue>) -> QueryNode {
    QueryNode::NegatedUnion {
        alias: alias.into(),
        alternatives: alternatives.into_iter().collect(),
    }
}

/// Wrap `tree` in a k-NN clause. An existing clause is replaced; its filter is kept.
pub fn knn(tree: &QueryTree, clause: KnnClause) -> QueryTree {
    let filter = match tree.node() {
        QueryNode::Knn { filter, .. } => filter.clone(),
        _ => tree.clone(),
    };
    QueryNode::Knn {
        filter,
        clause: Arc::new(clause),
    }
    .into()
}
