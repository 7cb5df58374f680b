// In-memory snapshot of a log directory:
// name → kind → category → { global, steps { step → item } }
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::command::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Scalars,
    Images,
    Texts,
    Logs,
    Markdown,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Scalars => "scalars",
            Kind::Images => "images",
            Kind::Texts => "texts",
            Kind::Logs => "logs",
            Kind::Markdown => "markdown",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("unknown data kind: {0}")]
    UnknownKind(String),
    #[error("step must be a non-negative integer or \"global\": {0}")]
    InvalidStep(String),
}

impl FromStr for Kind {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scalars" => Ok(Kind::Scalars),
            "images" => Ok(Kind::Images),
            "texts" => Ok(Kind::Texts),
            "logs" => Ok(Kind::Logs),
            "markdown" => Ok(Kind::Markdown),
            other => Err(PathError::UnknownKind(other.to_string())),
        }
    }
}

/// Items either belong to a numbered step or to the run as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKey {
    Global,
    Step(u64),
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKey::Global => write!(f, "global"),
            StepKey::Step(step) => write!(f, "{step}"),
        }
    }
}

impl FromStr for StepKey {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "global" {
            return Ok(StepKey::Global);
        }
        s.parse::<u64>()
            .map(StepKey::Step)
            .map_err(|_| PathError::InvalidStep(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarEntry {
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
    pub base64: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageEntry {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextEntry {
    pub actual: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogLine {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub lines: Vec<LogLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkdownEntry {
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Item {
    Scalar(ScalarEntry),
    Image(ImageEntry),
    Text(TextEntry),
    Log(LogEntry),
    Markdown(MarkdownEntry),
}

/// An item plus whether the truncated snapshot view should replace it with
/// an API reference because it is too big to inline.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
    pub item: Item,
    pub truncate: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryData {
    pub global: Option<StoredItem>,
    pub steps: BTreeMap<u64, StoredItem>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunData {
    pub command: Option<Command>,
    kinds: BTreeMap<Kind, BTreeMap<String, CategoryData>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    runs: BTreeMap<String, RunData>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a run even when it has no data yet, so empty experiments
    /// still show up in listings.
    pub fn add_run(&mut self, name: &str) {
        self.runs.entry(name.to_string()).or_default();
    }

    pub fn run_names(&self) -> impl Iterator<Item = &str> {
        self.runs.keys().map(String::as_str)
    }

    pub fn set(
        &mut self,
        kind: Kind,
        name: &str,
        step: StepKey,
        category: &str,
        item: Item,
        truncate: bool,
    ) {
        let stored = StoredItem { item, truncate };
        let category_data = self
            .runs
            .entry(name.to_string())
            .or_default()
            .kinds
            .entry(kind)
            .or_default()
            .entry(category.to_string())
            .or_default();
        match step {
            StepKey::Global => category_data.global = Some(stored),
            StepKey::Step(step) => {
                category_data.steps.insert(step, stored);
            }
        }
    }

    /// Always returns the full item, never the truncated reference.
    pub fn get(&self, kind: Kind, name: &str, step: StepKey, category: &str) -> Option<&Item> {
        let category_data = self.runs.get(name)?.kinds.get(&kind)?.get(category)?;
        let stored = match step {
            StepKey::Global => category_data.global.as_ref()?,
            StepKey::Step(step) => category_data.steps.get(&step)?,
        };
        Some(&stored.item)
    }

    pub fn set_command(&mut self, name: &str, command: Command) {
        self.runs.entry(name.to_string()).or_default().command = Some(command);
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.runs.get(name)?.command.as_ref()
    }

    /// Sorted unique categories of one kind across all runs.
    pub fn categories(&self, kind: Kind) -> Vec<String> {
        let mut categories: Vec<String> = self
            .runs
            .values()
            .filter_map(|run| run.kinds.get(&kind))
            .flat_map(|categories| categories.keys().cloned())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn category_data(&self, kind: Kind, name: &str, category: &str) -> Option<&CategoryData> {
        self.runs.get(name)?.kinds.get(&kind)?.get(category)
    }

    /// The snapshot as sent to the client: oversized items are swapped for
    /// `{"api": {"url": ...}}` references the client can fetch lazily.
    pub fn truncated(&self) -> Value {
        let mut runs = serde_json::Map::new();
        for (name, run) in &self.runs {
            let mut run_value = serde_json::Map::new();
            if let Some(command) = &run.command {
                run_value.insert("command".to_string(), json!(command));
            }
            for (kind, categories) in &run.kinds {
                let mut kind_value = serde_json::Map::new();
                for (category, data) in categories {
                    let mut category_value = serde_json::Map::new();
                    if let Some(global) = &data.global {
                        category_value.insert(
                            "global".to_string(),
                            stored_value(global, *kind, name, StepKey::Global, category),
                        );
                    }
                    if !data.steps.is_empty() {
                        let mut steps = serde_json::Map::new();
                        for (step, stored) in &data.steps {
                            steps.insert(
                                step.to_string(),
                                stored_value(stored, *kind, name, StepKey::Step(*step), category),
                            );
                        }
                        category_value.insert("steps".to_string(), Value::Object(steps));
                    }
                    kind_value.insert(category.clone(), Value::Object(category_value));
                }
                run_value.insert(kind.as_str().to_string(), Value::Object(kind_value));
            }
            runs.insert(name.clone(), Value::Object(run_value));
        }
        Value::Object(runs)
    }
}

fn stored_value(
    stored: &StoredItem,
    kind: Kind,
    name: &str,
    step: StepKey,
    category: &str,
) -> Value {
    if stored.truncate {
        json!({ "api": { "url": api_url(kind, name, step, category) } })
    } else {
        json!(stored.item)
    }
}

/// API path for fetching a single item, with the run name and every category
/// path segment URL-encoded.
pub fn api_url(kind: Kind, name: &str, step: StepKey, category: &str) -> String {
    let encoded_category = category
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "/api/{}/{}/{}/{}",
        kind.as_str(),
        urlencoding::encode(name),
        step,
        encoded_category
    )
}
