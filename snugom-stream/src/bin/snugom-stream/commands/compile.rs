use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use serde_json::Value as JsonValue;

use snugom_stream::command::describe;
use snugom_stream::render::render_query;
use snugom_stream::{EntitySchema, FilterQuery, QueryTree, SearchConfig, SortOrder, matcher};

use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TextDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Compile Filters",
        commands: &[
            "snugom-stream compile -s person.toml -f age:gt:18 -f name:ne:Bob",
            "snugom-stream compile -s person.toml -f tags:in:admin|ops --sort age:desc",
        ],
    },
    ExampleGroup {
        title: "Dry Run",
        commands: &["snugom-stream compile -s person.toml -f active:bool:true --documents people.json"],
    },
    ExampleGroup {
        title: "Scripting",
        commands: &["snugom-stream --format json compile -s person.toml -f location:near:2.35,48.85,5,km"],
    },
];

#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Entity schema (TOML)
    #[arg(short = 's', long)]
    schema: PathBuf,

    /// Filter as field:operator:value; repeat to add more, applied in order
    #[arg(short = 'f', long = "filter")]
    filters: Vec<String>,

    /// Sort as FIELD or FIELD:asc|desc
    #[arg(long)]
    sort: Option<String>,

    /// Page number, starting at 1
    #[arg(long)]
    page: Option<u64>,

    /// Page size, clamped to the configured maximum
    #[arg(long)]
    page_size: Option<u64>,

    /// Search settings (TOML)
    #[arg(long, env = "SNUGOM_STREAM_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of documents to evaluate the compiled query against
    #[arg(long)]
    documents: Option<PathBuf>,
}

#[derive(Serialize)]
struct ParamSummary {
    name: String,
    bytes: usize,
}

#[derive(Serialize)]
struct CompileReport {
    index: String,
    query: String,
    params: Vec<ParamSummary>,
    command: Vec<String>,
    count_command: Vec<String>,
    tree: QueryTree,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected: Option<Vec<JsonValue>>,
    #[serde(skip)]
    id_field: String,
}

impl TextDisplay for CompileReport {
    fn print_text(&self, output: &OutputManager) {
        output.heading("Compiled query");
        output.key_value("Index", &self.index);
        output.key_value("Query", &self.query);
        for param in &self.params {
            output.bullet(&format!("PARAMS {} ({} bytes)", param.name, param.bytes));
        }
        output.key_value("Command", &self.command.join(" "));
        output.key_value("Count", &self.count_command.join(" "));

        if let Some(selected) = &self.selected {
            output.heading("Dry run");
            output.success(&format!("{} documents selected", selected.len()));
            for doc in selected {
                let id = match doc.get(&self.id_field) {
                    Some(JsonValue::String(id)) => id.clone(),
                    Some(other) => other.to_string(),
                    None => doc.to_string(),
                };
                output.bullet(&id);
            }
        }
    }
}

pub fn handle_compile(args: CompileArgs, output: &OutputManager) -> Result<()> {
    let config = match &args.config {
        Some(path) => SearchConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SearchConfig::default(),
    };
    let schema = load_schema(&args.schema)?;
    let (sort_by, sort_order) = parse_sort(args.sort.as_deref())?;

    let query = FilterQuery {
        page: args.page,
        page_size: args.page_size,
        sort_by,
        sort_order,
        filter: args.filters,
    };
    let stream = query
        .into_stream(&schema, &config)
        .context("Failed to build search stream")?;

    let tree = stream.compile();
    if tree.is_root() {
        output.info("No constraining filters: the query matches every document");
    }
    let rendered = render_query(&tree, &config);

    let selected = match &args.documents {
        Some(path) => {
            let docs = load_documents(path)?;
            Some(matcher::select(&tree, &docs).into_iter().cloned().collect())
        }
        None => None,
    };

    let report = CompileReport {
        index: schema.index().to_string(),
        query: rendered.query,
        params: rendered
            .params
            .iter()
            .map(|(name, blob)| ParamSummary {
                name: name.clone(),
                bytes: blob.len(),
            })
            .collect(),
        command: describe(&stream.to_command(&config)),
        count_command: describe(&stream.to_count_command(&config)),
        tree,
        selected,
        id_field: schema.id_field().to_string(),
    };

    output.display(&report)
}

fn load_schema(path: &Path) -> Result<EntitySchema> {
    let source = fs::read_to_string(path).with_context(|| format!("Failed to read schema {}", path.display()))?;
    EntitySchema::from_toml_str(&source).with_context(|| format!("Invalid schema {}", path.display()))
}

fn load_documents(path: &Path) -> Result<Vec<JsonValue>> {
    let source = fs::read_to_string(path).with_context(|| format!("Failed to read documents {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("{} must contain a JSON array of objects", path.display()))
}

fn parse_sort(raw: Option<&str>) -> Result<(Option<String>, Option<SortOrder>)> {
    let Some(raw) = raw else {
        return Ok((None, None));
    };
    match raw.split_once(':') {
        Some((field, order)) => match SortOrder::parse(order) {
            Some(order) => Ok((Some(field.trim().to_string()), Some(order))),
            None => bail!("Invalid sort order '{}', expected asc or desc", order),
        },
        None => Ok((Some(raw.trim().to_string()), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sort_accepts_optional_order() {
        assert_eq!(parse_sort(None).unwrap(), (None, None));
        assert_eq!(parse_sort(Some("age")).unwrap(), (Some("age".to_string()), None));
        assert_eq!(
            parse_sort(Some("age:DESC")).unwrap(),
            (Some("age".to_string()), Some(SortOrder::Desc))
        );
        assert!(parse_sort(Some("age:sideways")).is_err());
    }
}
