//! Search settings.
//!
//! Stored as TOML, for example:
//!
//! ```toml
//! [search]
//! dialect = 3
//! default_page_size = 25
//! max_page_size = 100
//! score_field = "__score"
//! vector_param = "vector_blob"
//! ```

use std::borrow::Cow;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{QueryError, QueryResult};

pub const DEFAULT_DIALECT: u8 = 3;
pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const MAX_PAGE_SIZE: u64 = 100;

/// k-NN needs dialect 2 or later.
const MIN_DIALECT: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_dialect")]
    pub dialect: u8,
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// Alias the engine yields k-NN distances under.
    #[serde(default = "default_score_field")]
    pub score_field: String,
    /// `PARAMS` name carrying the query vector blob.
    #[serde(default = "default_vector_param")]
    pub vector_param: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            score_field: default_score_field(),
            vector_param: default_vector_param(),
        }
    }
}

fn default_dialect() -> u8 {
    DEFAULT_DIALECT
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> u64 {
    MAX_PAGE_SIZE
}

fn default_score_field() -> String {
    "__score".to_string()
}

fn default_vector_param() -> String {
    "vector_blob".to_string()
}

/// File layout: settings live under a `[search]` table.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    search: SearchConfig,
}

impl SearchConfig {
    /// Parse the `[search]` table of a TOML document. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> QueryResult<Self> {
        let file: ConfigFile = toml::from_str(source).map_err(|err| QueryError::Config {
            message: Cow::Owned(format!("failed to parse config: {}", err)),
        })?;
        file.search.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|err| QueryError::Config {
            message: Cow::Owned(format!("failed to read {}: {}", path.display(), err)),
        })?;
        let config = Self::from_toml_str(&source)?;
        log::debug!("loaded search config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    fn validated(self) -> QueryResult<Self> {
        if self.dialect < MIN_DIALECT {
            return Err(QueryError::Config {
                message: Cow::Owned(format!("dialect must be at least {}, got {}", MIN_DIALECT, self.dialect)),
            });
        }
        if self.max_page_size == 0 || self.default_page_size == 0 {
            return Err(QueryError::Config {
                message: Cow::Borrowed("page sizes must be greater than zero"),
            });
        }
        if self.default_page_size > self.max_page_size {
            return Err(QueryError::Config {
                message: Cow::Owned(format!(
                    "default_page_size {} exceeds max_page_size {}",
                    self.default_page_size, self.max_page_size
                )),
            });
        }
        for (key, value) in [("score_field", &self.score_field), ("vector_param", &self.vector_param)] {
            if value.is_empty() || !value.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
                return Err(QueryError::Config {
                    message: Cow::Owned(format!("{} must be a non-empty identifier, got '{}'", key, value)),
                });
            }
        }
        Ok(self)
    }

    /// Clamp a requested page size into `[1, max_page_size]`. A hand-built
    /// config with `max_page_size = 0` still yields pages of one.
    #[inline]
    pub fn clamp_page_size(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.default_page_size).clamp(1, self.max_page_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(SearchConfig::from_toml_str("").unwrap(), SearchConfig::default());
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let config = SearchConfig::from_toml_str("[search]\ndialect = 2\nmax_page_size = 50\n").unwrap();
        assert_eq!(config.dialect, 2);
        assert_eq!(config.max_page_size, 50);
        assert_eq!(config.default_page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.score_field, "__score");
    }

    #[test]
    fn rejects_dialect_one() {
        assert!(matches!(
            SearchConfig::from_toml_str("[search]\ndialect = 1\n"),
            Err(QueryError::Config { .. })
        ));
    }

    #[test]
    fn rejects_default_above_max() {
        assert!(SearchConfig::from_toml_str("[search]\ndefault_page_size = 200\n").is_err());
    }

    #[test]
    fn rejects_bad_param_name() {
        assert!(SearchConfig::from_toml_str("[search]\nvector_param = \"$blob\"\n").is_err());
    }

    #[test]
    fn clamps_page_size() {
        let config = SearchConfig::default();
        assert_eq!(config.clamp_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(config.clamp_page_size(Some(0)), 1);
        assert_eq!(config.clamp_page_size(Some(1000)), MAX_PAGE_SIZE);
    }

    #[test]
    fn unvalidated_zero_sizes_still_clamp() {
        let config = SearchConfig {
            default_page_size: 0,
            max_page_size: 0,
            ..SearchConfig::default()
        };
        assert_eq!(config.clamp_page_size(None), 1);
        assert_eq!(config.clamp_page_size(Some(40)), 1);
    }
}
