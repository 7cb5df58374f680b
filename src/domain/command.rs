// Command reconstruction: the shell invocation a run was started with,
// rebuilt from the logged binary, arguments and parser description.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Command {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Arguments>,
    /// Parser description (available options, defaults, choices). Passed
    /// through to the client untouched; only the arguments are needed to
    /// rebuild the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Arguments {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positional: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,
}

impl Command {
    /// Rebuilds the full command line: binary, script, positional arguments,
    /// then options sorted by name. A boolean true is a bare flag, a boolean
    /// false disappears entirely, list values join with spaces.
    pub fn command_line(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(bin) = &self.bin {
            parts.push(bin.clone());
        }
        if let Some(script) = &self.script {
            parts.push(script.clone());
        }
        if let Some(arguments) = &self.arguments {
            parts.extend(arguments.positional.iter().cloned());
            for (name, value) in &arguments.options {
                match value {
                    Value::Null | Value::Bool(false) => continue,
                    Value::Bool(true) => parts.push(format!("--{name}")),
                    other => {
                        parts.push(format!("--{name}"));
                        parts.push(option_to_string(other));
                    }
                }
            }
        }
        parts.join(" ")
    }
}

fn option_to_string(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(option_to_string)
            .collect::<Vec<_>>()
            .join(" "),
        Value::String(text) => quote_option(text),
        other => other.to_string(),
    }
}

// A value starting with a double quote is passed through verbatim, so shell
// expressions inside it still get evaluated. Everything else containing an
// unescaped space is single-quoted, with embedded single quotes escaped as
// '\'' (literally).
fn quote_option(value: &str) -> String {
    if value.starts_with('"') {
        value.to_string()
    } else if has_unescaped_space(value) {
        format!("'{}'", value.replace('\'', "'\\''"))
    } else {
        value.to_string()
    }
}

fn has_unescaped_space(value: &str) -> bool {
    value
        .as_bytes()
        .windows(2)
        .any(|pair| pair[1] == b' ' && pair[0] != b'\\')
}
