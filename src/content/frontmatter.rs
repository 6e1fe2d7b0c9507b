//! Front-matter parsing

use serde_yaml::{Mapping, Value};

/// Front-matter block of a post: the YAML mapping between the `---` fences.
///
/// Fields are kept as a raw mapping. Typed access goes through the accessors
/// below, each of which falls back to a default instead of failing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    fields: Mapping,
}

impl FrontMatter {
    /// Parse front-matter from content string.
    /// Returns (front_matter, remaining_content)
    ///
    /// Content without a complete `---` block, or whose block is not valid
    /// YAML, yields an empty mapping and the original content.
    pub fn parse(content: &str) -> (Self, &str) {
        let text = content.strip_prefix('\u{feff}').unwrap_or(content);

        let Some(rest) = strip_opening_fence(text) else {
            return (FrontMatter::default(), content);
        };

        let Some((yaml, body)) = split_at_closing_fence(rest) else {
            tracing::debug!("Front-matter block is not closed, treating as content");
            return (FrontMatter::default(), content);
        };

        if yaml.trim().is_empty() {
            return (FrontMatter::default(), body);
        }

        match serde_yaml::from_str::<Value>(yaml) {
            Ok(Value::Mapping(fields)) => (Self { fields }, body),
            Ok(Value::Null) => (FrontMatter::default(), body),
            Ok(other) => {
                tracing::warn!(
                    "Front-matter is not a mapping ({:?}), ignoring it",
                    value_kind(&other)
                );
                (FrontMatter::default(), body)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse YAML front-matter, treating as content: {}",
                    e
                );
                (FrontMatter::default(), content)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw value for a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String value; numbers are printed, anything else is the empty string
    pub fn string(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    /// A list of strings. A single string is a one-element list, a missing
    /// or null value is empty, and non-scalar items are skipped.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
            _ => Vec::new(),
        }
    }

    /// Boolean value; anything that is not a YAML boolean yields `default`
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            _ => default,
        }
    }
}

/// Strip the opening `---` line, returning what follows it
fn strip_opening_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("---")?;
    let (line, after) = match rest.find('\n') {
        Some(pos) => (&rest[..pos], &rest[pos + 1..]),
        None => (rest, ""),
    };
    // `----` or `--- title` are not fences
    if !line.trim().is_empty() {
        return None;
    }
    Some(after)
}

/// Find the closing `---` line. Returns (yaml, body)
fn split_at_closing_fence(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}
