//! Output formatting for the lease CLI.
//!
//! Results print either as pretty JSON or as concise one-line text records.

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::{self, Write};

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// One line per record.
    Text,
}

#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render any serializable result in the configured format.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(data)?,
            OutputFormat::Text => render_text(&serde_json::to_value(data)?),
        })
    }

    pub fn print<T: Serialize>(&self, data: &T) -> Result<()> {
        let output = self.format(data)?;
        writeln!(io::stdout().lock(), "{output}")?;
        Ok(())
    }

    /// Print a collection. JSON wraps it as `{ <name>: [...], "count": n }`;
    /// text prints `empty_message` when there is nothing to show.
    pub fn print_list<T: Serialize>(
        &self,
        data: &[T],
        empty_message: &str,
        collection_name: &str,
    ) -> Result<()> {
        let output = self.format_list(data, empty_message, collection_name)?;
        writeln!(io::stdout().lock(), "{output}")?;
        Ok(())
    }

    fn format_list<T: Serialize>(
        &self,
        data: &[T],
        empty_message: &str,
        collection_name: &str,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut envelope = Map::new();
                envelope.insert(collection_name.to_string(), serde_json::to_value(data)?);
                envelope.insert("count".to_string(), Value::from(data.len()));
                Ok(serde_json::to_string_pretty(&Value::Object(envelope))?)
            }
            OutputFormat::Text if data.is_empty() => Ok(empty_message.to_string()),
            OutputFormat::Text => self.format(&data),
        }
    }
}

/// Keys printed first, bare, when present on a record.
const ID_KEYS: [&str; 4] = ["message_id", "review_id", "listing_id", "user_id"];

fn render_text(value: &Value) -> String {
    match value {
        Value::Array(records) => records
            .iter()
            .map(render_text)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(record) => render_record(record),
        scalar => render_scalar(scalar),
    }
}

/// One record per line: its id bare, then `key:value` pairs.
///
/// Nested records (message participants, conversation partners) flatten
/// into dotted keys such as `sender.display_name:Dana`.
fn render_record(record: &Map<String, Value>) -> String {
    let lead = ID_KEYS.into_iter().find(|key| record.contains_key(*key));

    let mut parts = Vec::new();
    if let Some(id) = lead.and_then(|key| record.get(key)) {
        parts.push(render_scalar(id));
    }
    for (key, value) in record {
        if Some(key.as_str()) != lead {
            push_field(&mut parts, key, value);
        }
    }
    parts.join("  ")
}

fn push_field(parts: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) if items.is_empty() => {}
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(render_scalar).collect();
            parts.push(format!("{key}:{}", items.join(",")));
        }
        Value::Object(nested) => {
            for (inner, value) in nested {
                push_field(parts, &format!("{key}.{inner}"), value);
            }
        }
        scalar => parts.push(format!("{key}:{}", render_scalar(scalar))),
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) if s.is_empty() || s.contains(char::is_whitespace) => format!("{s:?}"),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
