use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde_json::Value;

/// How resolved values are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Toml,
    /// Strings unquoted, sections flattened to `Section.key = value` lines
    Plain,
}

pub fn format_value(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Toml => {
            if !value.is_object() {
                bail!("TOML output needs a section, got {}", value);
            }
            toml::to_string_pretty(&without_nulls(value)).context("Failed to render TOML")
        }
        OutputFormat::Plain => Ok(plain(value)),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::Object(_) => {
            let mut lines = Vec::new();
            flatten("", value, &mut lines);
            lines.join("\n")
        }
        other => scalar(other),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn flatten(prefix: &str, value: &Value, lines: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, lines);
            }
        }
        other => lines.push(format!("{prefix} = {}", scalar(other))),
    }
}

/// TOML has no null
fn without_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), without_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter(|v| !v.is_null())
                .map(without_nulls)
                .collect(),
        ),
        other => other.clone(),
    }
}
