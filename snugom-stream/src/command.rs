//! `FT.SEARCH` command construction. Commands are built, never sent.

use redis::{Arg, Cmd, cmd};

use crate::config::SearchConfig;
use crate::query::QueryTree;
use crate::render::{RenderedQuery, render_query};
use crate::stream::{SearchSort, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub size: u64,
}

impl Page {
    /// Page numbers start at 1; anything lower is treated as the first page.
    /// Offsets past `u64::MAX` saturate.
    #[inline]
    pub fn numbered(page: u64, size: u64) -> Self {
        Self {
            offset: page.saturating_sub(1).saturating_mul(size),
            size,
        }
    }
}

/// `FT.SEARCH index query [SORTBY f ASC|DESC] LIMIT off n [PARAMS ...] DIALECT d`.
///
/// A k-NN query without an explicit sort is ordered by its score alias, closest first.
pub fn search_command(index: &str, tree: &QueryTree, sort: Option<&SearchSort>, page: Page, config: &SearchConfig) -> Cmd {
    let rendered = render_query(tree, config);

    let mut command = cmd("FT.SEARCH");
    command.arg(index);
    command.arg(&rendered.query);

    match sort {
        Some(sort) => {
            command.arg("SORTBY").arg(&sort.field).arg(sort.order.as_str());
        }
        None if tree.knn_clause().is_some() => {
            command
                .arg("SORTBY")
                .arg(&config.score_field)
                .arg(SortOrder::Asc.as_str());
        }
        None => {}
    }

    command.arg("LIMIT").arg(page.offset).arg(page.size);
    push_params(&mut command, &rendered);
    command.arg("DIALECT").arg(config.dialect);

    log::debug!("built FT.SEARCH on {} for {}", index, rendered.query);
    command
}

/// Same query with `LIMIT 0 0`; the reply only carries the total.
pub fn count_command(index: &str, tree: &QueryTree, config: &SearchConfig) -> Cmd {
    let rendered = render_query(tree, config);

    let mut command = cmd("FT.SEARCH");
    command.arg(index);
    command.arg(&rendered.query);
    command.arg("LIMIT").arg(0).arg(0);
    push_params(&mut command, &rendered);
    command.arg("DIALECT").arg(config.dialect);
    command
}

/// Printable arguments of `command`. Binary arguments show up as `<N bytes>`.
pub fn describe(command: &Cmd) -> Vec<String> {
    command
        .args_iter()
        .map(|arg| match arg {
            Arg::Simple(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => text.to_string(),
                Err(_) => format!("<{} bytes>", bytes.len()),
            },
            Arg::Cursor => "<cursor>".to_string(),
        })
        .collect()
}

fn push_params(command: &mut Cmd, rendered: &RenderedQuery) {
    if rendered.params.is_empty() {
        return;
    }
    command.arg("PARAMS").arg(rendered.params.len() * 2);
    for (name, blob) in &rendered.params {
        command.arg(name).arg(blob.as_slice());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{DistanceMetric, EntitySchema, FieldDescriptor, VectorParams};
    use crate::stream::SearchStream;

    fn args(command: &Cmd) -> Vec<String> {
        describe(command)
    }

    fn schema() -> EntitySchema {
        EntitySchema::new(
            "idx:person",
            "id",
            [
                FieldDescriptor::new("name", "person_name", crate::field::FieldType::Text).unwrap(),
                FieldDescriptor::numeric("age").unwrap().sortable(),
                FieldDescriptor::vector("embedding", "embedding", VectorParams::new(2, DistanceMetric::L2)).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn page_offsets() {
        assert_eq!(Page::numbered(1, 25).offset, 0);
        assert_eq!(Page::numbered(3, 10).offset, 20);
        assert_eq!(Page::numbered(0, 10).offset, 0);
        assert_eq!(Page::numbered(u64::MAX, 25).offset, u64::MAX);
    }

    #[test]
    fn plain_search_command() {
        let schema = schema();
        let age = schema.field("age").unwrap();
        let stream = SearchStream::of(&schema)
            .filter(age.gte(21).unwrap())
            .sorted_by("age", SortOrder::Desc)
            .unwrap()
            .skip(10)
            .limit(5);
        let command = stream.to_command(&SearchConfig::default());
        assert_eq!(
            args(&command),
            ["FT.SEARCH", "idx:person", "@age:[21 +inf]", "SORTBY", "age", "DESC", "LIMIT", "10", "5", "DIALECT", "3"]
        );
    }

    #[test]
    fn limit_is_clamped() {
        let schema = schema();
        let command = SearchStream::of(&schema).limit(5_000).to_command(&SearchConfig::default());
        let args = args(&command);
        assert_eq!(&args[2..6], ["*", "LIMIT", "0", "100"]);
    }

    #[test]
    fn hand_built_zero_page_config_does_not_panic() {
        let schema = schema();
        let config = SearchConfig {
            default_page_size: 0,
            max_page_size: 0,
            ..SearchConfig::default()
        };
        let args = args(&SearchStream::of(&schema).to_command(&config));
        assert_eq!(&args[3..6], ["LIMIT", "0", "1"]);
    }

    #[test]
    fn alias_is_used_in_query() {
        let schema = schema();
        let name = schema.field("name").unwrap();
        let command = SearchStream::of(&schema)
            .filter(name.equal("Alice").unwrap())
            .to_command(&SearchConfig::default());
        assert_eq!(args(&command)[2], "@person_name:\"Alice\"");
    }

    #[test]
    fn knn_sorts_by_score_and_sends_params() {
        let schema = schema();
        let embedding = schema.field("embedding").unwrap();
        let stream = SearchStream::of(&schema).filter(embedding.knn(vec![1.0_f32, 2.0], 4).unwrap());
        let command = stream.to_command(&SearchConfig::default());

        let expected_blob: Vec<u8> = [1.0_f32, 2.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        let raw: Vec<Vec<u8>> = command
            .args_iter()
            .map(|arg| match arg {
                Arg::Simple(bytes) => bytes.to_vec(),
                Arg::Cursor => Vec::new(),
            })
            .collect();
        let args = args(&command);

        assert_eq!(args[2], "(*)=>[KNN 4 @embedding $vector_blob AS __score]");
        assert_eq!(&args[3..6], ["SORTBY", "__score", "ASC"]);
        assert_eq!(&args[9..12], ["PARAMS", "2", "vector_blob"]);
        assert_eq!(raw[12], expected_blob);
        assert_eq!(&args[13..], ["DIALECT", "3"]);
    }

    #[test]
    fn count_command_requests_no_documents() {
        let schema = schema();
        let age = schema.field("age").unwrap();
        let config = SearchConfig {
            dialect: 2,
            ..SearchConfig::default()
        };
        let command = SearchStream::of(&schema)
            .filter(age.lt(30).unwrap())
            .to_count_command(&config);
        assert_eq!(
            args(&command),
            ["FT.SEARCH", "idx:person", "@age:[-inf (30]", "LIMIT", "0", "0", "DIALECT", "2"]
        );
    }
}
