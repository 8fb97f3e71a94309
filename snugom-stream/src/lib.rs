//! SnugOM stream library.
//!
//! Typed predicates over indexed entity fields, folded in order into an
//! immutable query tree and rendered as a RediSearch `FT.SEARCH` query.
//!
//! ```
//! use snugom_stream::{EntitySchema, FieldDescriptor, SearchStream};
//!
//! let schema = EntitySchema::new(
//!     "idx:person",
//!     "id",
//!     [FieldDescriptor::text("name").unwrap(), FieldDescriptor::numeric("age").unwrap()],
//! )
//! .unwrap();
//! let name = schema.field("name").unwrap();
//! let age = schema.field("age").unwrap();
//!
//! let tree = SearchStream::of(&schema)
//!     .filter(age.between(18, 65).unwrap())
//!     .filter(name.not_equal("Bob").unwrap())
//!     .compile();
//! assert_eq!(tree.to_string(), "@age:[18 65] -@name:\"Bob\"");
//! ```

pub mod codec;
pub mod command;
pub mod config;
pub mod errors;
pub mod field;
pub mod filters;
pub mod matcher;
pub mod predicate;
pub mod query;
pub mod render;
pub mod stream;
pub mod value;

pub use config::SearchConfig;
pub use errors::*;
pub use field::{
    DistanceMetric, EntitySchema, FieldDescriptor, FieldType, VectorAlgorithm, VectorElementType, VectorParams,
};
pub use filters::FilterQuery;
pub use predicate::{Apply, Operator, Predicate};
pub use query::{QueryNode, QueryTree};
pub use render::RenderedQuery;
pub use stream::{SearchStream, SortOrder, compile};
pub use value::{GeoPoint, Value};
