//! Field descriptors and entity schemas.
//!
//! A [`FieldDescriptor`] is the metadata the mapping layer hands to the compiler:
//! logical name, query alias, declared type and, for vector fields, the index
//! parameters. Descriptors are validated once and never mutated; predicates only
//! borrow them.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{QueryError, QueryResult};

static ALIAS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_.$]*$").expect("alias pattern is valid"));

/// Declared index type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Tag,
    Numeric,
    Boolean,
    Date,
    Geo,
    Vector,
}

impl FieldType {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Tag => "TAG",
            FieldType::Numeric => "NUMERIC",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Date => "DATE",
            FieldType::Geo => "GEO",
            FieldType::Vector => "VECTOR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorAlgorithm {
    #[default]
    Flat,
    Hnsw,
}

/// Element type of the stored vector blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorElementType {
    #[default]
    Float32,
    Float64,
}

impl VectorElementType {
    #[inline]
    pub const fn byte_width(self) -> usize {
        match self {
            VectorElementType::Float32 => 4,
            VectorElementType::Float64 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    L2,
    Ip,
    Cosine,
}

impl DistanceMetric {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            DistanceMetric::L2 => "L2",
            DistanceMetric::Ip => "IP",
            DistanceMetric::Cosine => "COSINE",
        }
    }
}

/// Vector index parameters.
///
/// Only `dimension`, `element_type` and `distance_metric` influence compilation;
/// the remaining values are carried for the index-creation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorParams {
    pub dimension: usize,
    #[serde(default)]
    pub algorithm: VectorAlgorithm,
    #[serde(default)]
    pub element_type: VectorElementType,
    #[serde(default)]
    pub distance_metric: DistanceMetric,
    #[serde(default)]
    pub initial_capacity: Option<usize>,
    #[serde(default)]
    pub m: Option<usize>,
}

impl VectorParams {
    pub fn new(dimension: usize, distance_metric: DistanceMetric) -> Self {
        Self {
            dimension,
            algorithm: VectorAlgorithm::default(),
            element_type: VectorElementType::default(),
            distance_metric,
            initial_capacity: None,
            m: None,
        }
    }

    pub fn hnsw(mut self, m: usize) -> Self {
        self.algorithm = VectorAlgorithm::Hnsw;
        self.m = Some(m);
        self
    }

    pub fn with_element_type(mut self, element_type: VectorElementType) -> Self {
        self.element_type = element_type;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }
}

/// Immutable metadata for one indexed field of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldDescriptor", into = "RawFieldDescriptor")]
pub struct FieldDescriptor {
    name: String,
    alias: String,
    field_type: FieldType,
    vector: Option<VectorParams>,
    sortable: bool,
}

impl FieldDescriptor {
    /// Create a non-vector descriptor. Vector fields must go through [`FieldDescriptor::vector`].
    pub fn new(name: impl Into<String>, alias: impl Into<String>, field_type: FieldType) -> QueryResult<Self> {
        Self::build(name.into(), alias.into(), field_type, None, false)
    }

    /// Create a vector descriptor with its index parameters.
    pub fn vector(name: impl Into<String>, alias: impl Into<String>, params: VectorParams) -> QueryResult<Self> {
        Self::build(name.into(), alias.into(), FieldType::Vector, Some(params), false)
    }

    pub fn text(name: impl Into<String>) -> QueryResult<Self> {
        let name = name.into();
        Self::new(name.clone(), name, FieldType::Text)
    }

    pub fn tag(name: impl Into<String>) -> QueryResult<Self> {
        let name = name.into();
        Self::new(name.clone(), name, FieldType::Tag)
    }

    pub fn numeric(name: impl Into<String>) -> QueryResult<Self> {
        let name = name.into();
        Self::new(name.clone(), name, FieldType::Numeric)
    }

    pub fn boolean(name: impl Into<String>) -> QueryResult<Self> {
        let name = name.into();
        Self::new(name.clone(), name, FieldType::Boolean)
    }

    pub fn date(name: impl Into<String>) -> QueryResult<Self> {
        let name = name.into();
        Self::new(name.clone(), name, FieldType::Date)
    }

    pub fn geo(name: impl Into<String>) -> QueryResult<Self> {
        let name = name.into();
        Self::new(name.clone(), name, FieldType::Geo)
    }

    /// Mark the field as sortable.
    #[inline]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    fn build(
        name: String,
        alias: String,
        field_type: FieldType,
        vector: Option<VectorParams>,
        sortable: bool,
    ) -> QueryResult<Self> {
        let invalid = |message: String| QueryError::InvalidDescriptor {
            field: name.clone(),
            message,
        };

        if name.trim().is_empty() {
            return Err(invalid("field name must not be empty".to_string()));
        }
        if !ALIAS_PATTERN.is_match(&alias) {
            return Err(invalid(format!("alias '{}' is not a valid index identifier", alias)));
        }

        match (field_type, &vector) {
            (FieldType::Vector, None) => {
                return Err(invalid("vector fields require vector parameters".to_string()));
            }
            (FieldType::Vector, Some(params)) => {
                if params.dimension == 0 {
                    return Err(invalid("vector dimension must be greater than zero".to_string()));
                }
                if params.m.is_some() && params.algorithm != VectorAlgorithm::Hnsw {
                    return Err(invalid("`m` only applies to the HNSW algorithm".to_string()));
                }
            }
            (other, Some(_)) => {
                return Err(invalid(format!("vector parameters are not allowed on {} fields", other.as_str())));
            }
            (_, None) => {}
        }

        Ok(Self {
            name,
            alias,
            field_type,
            vector,
            sortable,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    #[inline]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    #[inline]
    pub fn vector_params(&self) -> Option<&VectorParams> {
        self.vector.as_ref()
    }

    /// Dimension of a vector field, `None` for every other type.
    #[inline]
    pub fn vector_dimension(&self) -> Option<usize> {
        self.vector.as_ref().map(|params| params.dimension)
    }

    #[inline]
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawFieldDescriptor {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alias: Option<String>,
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vector: Option<VectorParams>,
    #[serde(default)]
    sortable: bool,
}

impl TryFrom<RawFieldDescriptor> for FieldDescriptor {
    type Error = QueryError;

    fn try_from(raw: RawFieldDescriptor) -> Result<Self, Self::Error> {
        let alias = raw.alias.unwrap_or_else(|| raw.name.clone());
        Self::build(raw.name, alias, raw.field_type, raw.vector, raw.sortable)
    }
}

impl From<FieldDescriptor> for RawFieldDescriptor {
    fn from(value: FieldDescriptor) -> Self {
        Self {
            alias: (value.alias != value.name).then_some(value.alias),
            name: value.name,
            field_type: value.field_type,
            vector: value.vector,
            sortable: value.sortable,
        }
    }
}

/// The indexed fields of one entity plus the index they live in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEntitySchema")]
pub struct EntitySchema {
    index: String,
    id_field: String,
    fields: Vec<FieldDescriptor>,
}

impl EntitySchema {
    pub fn new(
        index: impl Into<String>,
        id_field: impl Into<String>,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> QueryResult<Self> {
        let index = index.into();
        let fields: Vec<FieldDescriptor> = fields.into_iter().collect();

        if index.trim().is_empty() {
            return Err(QueryError::InvalidDescriptor {
                field: String::new(),
                message: "index name must not be empty".to_string(),
            });
        }

        let mut names = HashSet::with_capacity(fields.len());
        let mut aliases = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !names.insert(field.name()) {
                return Err(QueryError::InvalidDescriptor {
                    field: field.name().to_string(),
                    message: format!("duplicate field name on index '{}'", index),
                });
            }
            if !aliases.insert(field.alias()) {
                return Err(QueryError::InvalidDescriptor {
                    field: field.name().to_string(),
                    message: format!("alias '{}' is already used on index '{}'", field.alias(), index),
                });
            }
        }

        Ok(Self {
            index,
            id_field: id_field.into(),
            fields,
        })
    }

    /// Parse a schema from its TOML form.
    pub fn from_toml_str(source: &str) -> QueryResult<Self> {
        toml::from_str(source).map_err(|err| QueryError::InvalidDescriptor {
            field: String::new(),
            message: format!("failed to parse schema: {}", err),
        })
    }

    #[inline]
    pub fn index(&self) -> &str {
        &self.index
    }

    #[inline]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by logical name.
    pub fn field(&self, name: &str) -> QueryResult<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| QueryError::UnknownField {
                index: self.index.clone(),
                field: name.to_string(),
            })
    }
}

#[derive(Debug, Deserialize)]
struct RawEntitySchema {
    index: String,
    #[serde(default = "default_id_field")]
    id_field: String,
    #[serde(default)]
    fields: Vec<FieldDescriptor>,
}

fn default_id_field() -> String {
    "id".to_string()
}

impl TryFrom<RawEntitySchema> for EntitySchema {
    type Error = QueryError;

    fn try_from(raw: RawEntitySchema) -> Result<Self, Self::Error> {
        Self::new(raw.index, raw.id_field, raw.fields)
    }
}
