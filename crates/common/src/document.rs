//! Document tree parsing and serialization
//!
//! The document tree is a `serde_json::Value` built with insertion-ordered
//! objects, so sibling keys keep the order they had in the source text.

use crate::{ConvertError, Result};
use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;
use std::path::Path;

/// In-memory API description at any pipeline stage
pub type Document = Value;

/// Textual dialect of a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// YAML (default for anything that is not `.json`)
    Yaml,
    /// JSON
    Json,
}

impl SourceFormat {
    /// Select the dialect from a file extension
    ///
    /// # Examples
    /// ```
    /// use oas_bridge_common::SourceFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(SourceFormat::from_path(Path::new("api.JSON")), SourceFormat::Json);
    /// assert_eq!(SourceFormat::from_path(Path::new("api.yml")), SourceFormat::Yaml);
    /// assert_eq!(SourceFormat::from_path(Path::new("swagger")), SourceFormat::Yaml);
    /// ```
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SourceFormat::Json,
            _ => SourceFormat::Yaml,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Yaml => write!(f, "YAML"),
            SourceFormat::Json => write!(f, "JSON"),
        }
    }
}

/// Parse source text in the given dialect into a document tree
pub fn parse_document(text: &str, format: SourceFormat) -> Result<Document> {
    match format {
        SourceFormat::Json => serde_json::from_str(text)
            .map_err(|e| ConvertError::Parse(format!("Failed to parse JSON: {}", e))),
        SourceFormat::Yaml => {
            let mut yaml: YamlValue = serde_yaml::from_str(text)
                .map_err(|e| ConvertError::Parse(format!("Failed to parse YAML: {}", e)))?;
            yaml.apply_merge()
                .map_err(|e| ConvertError::Parse(format!("Failed to apply YAML merge keys: {}", e)))?;
            Ok(yaml_to_document(yaml))
        }
    }
}

/// Maximum width of an emitted YAML line
///
/// Longer string values are written as folded (`>-`) block scalars. A line
/// can still exceed the width when a single word, a key, or a scalar that
/// cannot be folded is longer than that.
pub const OUTPUT_LINE_WIDTH: usize = 120;

/// Serialize a document tree as YAML
///
/// # Examples
/// ```
/// use oas_bridge_common::{parse_document, to_yaml, SourceFormat, OUTPUT_LINE_WIDTH};
/// use serde_json::json;
///
/// let doc = json!({ "description": "word ".repeat(60).trim_end() });
/// let yaml = to_yaml(&doc).unwrap();
/// assert!(yaml.lines().all(|line| line.len() <= OUTPUT_LINE_WIDTH));
/// assert_eq!(parse_document(&yaml, SourceFormat::Yaml).unwrap(), doc);
/// ```
pub fn to_yaml(doc: &Document) -> Result<String> {
    let marker = fold_marker(doc);
    let mut marked = doc.clone();
    let mut originals = Vec::new();
    mark_foldable(&mut marked, &marker, &mut originals);

    let text = emit_yaml(&marked)?;
    if originals.is_empty() {
        return Ok(text);
    }

    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        match marked_scalar(line, &marker, &originals) {
            Some((prefix, original)) => write_scalar(&mut out, prefix, original)?,
            None => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    Ok(out)
}

fn emit_yaml<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_yaml::to_string(value)
        .map_err(|e| ConvertError::Parse(format!("Failed to serialize YAML: {}", e)))
}

/// Placeholder prefix that occurs in no key or string of `doc`
fn fold_marker(doc: &Document) -> String {
    let mut marker = String::from("__oas_bridge_fold_");
    while mentions(doc, &marker) {
        marker.insert(0, '_');
    }
    marker
}

fn mentions(node: &Value, needle: &str) -> bool {
    match node {
        Value::String(s) => s.contains(needle),
        Value::Array(items) => items.iter().any(|item| mentions(item, needle)),
        Value::Object(map) => map
            .iter()
            .any(|(key, value)| key.contains(needle) || mentions(value, needle)),
        _ => false,
    }
}

/// A single-line string a folded block scalar can carry unchanged
fn is_foldable(s: &str) -> bool {
    s.contains(' ')
        && !s.starts_with(' ')
        && !s.ends_with(' ')
        && !s
            .chars()
            .any(|c| c.is_control() || matches!(c, '\u{feff}' | '\u{2028}' | '\u{2029}'))
}

/// Swap every foldable string for a numbered placeholder
fn mark_foldable(node: &mut Value, marker: &str, originals: &mut Vec<String>) {
    match node {
        Value::String(s) if is_foldable(s) => {
            let token = format!("{}{}", marker, originals.len());
            originals.push(std::mem::replace(s, token));
        }
        Value::Array(items) => items
            .iter_mut()
            .for_each(|item| mark_foldable(item, marker, originals)),
        Value::Object(map) => map
            .values_mut()
            .for_each(|value| mark_foldable(value, marker, originals)),
        _ => {}
    }
}

/// Split an emitted line ending in a placeholder into its prefix and original string
fn marked_scalar<'a>(line: &'a str, marker: &str, originals: &'a [String]) -> Option<(&'a str, &'a str)> {
    let pos = line.rfind(marker)?;
    let (prefix, token) = line.split_at(pos);
    if !(prefix.is_empty() || prefix.ends_with(' ')) {
        return None;
    }
    let index: usize = token[marker.len()..].parse().ok()?;
    originals.get(index).map(|original| (prefix, original.as_str()))
}

fn write_scalar(out: &mut String, prefix: &str, original: &str) -> Result<()> {
    let inline = emit_yaml(original)?;
    let inline = inline.trim_end_matches('\n');

    let indent = content_indent(prefix);
    let lines = if prefix.chars().count() + inline.chars().count() > OUTPUT_LINE_WIDTH {
        wrap_words(original, OUTPUT_LINE_WIDTH.saturating_sub(indent))
    } else {
        Vec::new()
    };

    if lines.len() < 2 {
        out.push_str(prefix);
        out.push_str(inline);
        out.push('\n');
        return Ok(());
    }

    out.push_str(prefix);
    out.push_str(">-\n");
    for line in lines {
        out.extend(std::iter::repeat(' ').take(indent));
        out.push_str(line);
        out.push('\n');
    }
    Ok(())
}

/// Indentation for block scalar content under `prefix` (`key: `, `- `, `- key: `)
fn content_indent(prefix: &str) -> usize {
    let mut rest = prefix.trim_start_matches(' ');
    let mut column = prefix.len() - rest.len();
    while let Some(after) = rest.strip_prefix("- ") {
        column += 2;
        rest = after;
    }
    column + 2
}

/// Greedy word wrap that only breaks at single spaces between words
fn wrap_words(text: &str, width: usize) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    for (i, _) in text.match_indices(' ') {
        if i > 0 && i + 1 < bytes.len() && bytes[i - 1] != b' ' && bytes[i + 1] != b' ' {
            segments.push((start, i));
            start = i + 1;
        }
    }
    segments.push((start, text.len()));

    let mut lines = Vec::new();
    let (mut line_start, mut line_end) = (0, 0);
    for (seg_start, seg_end) in segments {
        if line_end > line_start && text[line_start..seg_end].chars().count() > width {
            lines.push(&text[line_start..line_end]);
            line_start = seg_start;
        }
        line_end = seg_end;
    }
    lines.push(&text[line_start..line_end]);
    lines
}

fn yaml_to_document(value: YamlValue) -> Document {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => yaml_number(&n),
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_document).collect())
        }
        YamlValue::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(yaml_key(key), yaml_to_document(value));
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_document(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        // .nan and .inf have no JSON number form
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string()))
    }
}

/// Response codes and similar keys are often written as bare integers
fn yaml_key(key: YamlValue) -> String {
    match key {
        YamlValue::String(s) => s,
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Null => "null".to_string(),
        YamlValue::Tagged(tagged) => yaml_key(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_yaml_with_integer_keys() {
        let text = r#"
swagger: "2.0"
paths:
  /pets:
    get:
      responses:
        200:
          description: OK
"#;
        let doc = parse_document(text, SourceFormat::Yaml).unwrap();
        assert_eq!(doc["swagger"], json!("2.0"));
        assert_eq!(
            doc["paths"]["/pets"]["get"]["responses"]["200"]["description"],
            json!("OK")
        );
    }

    #[test]
    fn test_parse_yaml_aliases_and_merge_keys() {
        let text = r#"
base: &base
  type: string
  maxLength: 10
name:
  <<: *base
  description: Name
alias: *base
"#;
        let doc = parse_document(text, SourceFormat::Yaml).unwrap();
        assert_eq!(doc["name"]["type"], json!("string"));
        assert_eq!(doc["name"]["maxLength"], json!(10));
        assert_eq!(doc["alias"], json!({"type": "string", "maxLength": 10}));
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_document("{\"a\": ", SourceFormat::Json).unwrap_err();
        assert!(matches!(err, ConvertError::Parse(_)));

        let err = parse_document("a: [1, 2", SourceFormat::Yaml).unwrap_err();
        assert!(matches!(err, ConvertError::Parse(_)));
    }

    #[test]
    fn test_yaml_output_keeps_key_order() {
        let doc = json!({
            "openapi": "3.1.0",
            "info": {"title": "Pets", "version": "1.0"},
            "paths": {}
        });
        let yaml = to_yaml(&doc).unwrap();
        let openapi = yaml.find("openapi").unwrap();
        let info = yaml.find("info").unwrap();
        let paths = yaml.find("paths").unwrap();
        assert!(openapi < info && info < paths);
        assert!(yaml.contains("openapi: 3.1.0"));
    }

    #[test]
    fn test_long_strings_are_folded() {
        let long = "Returns the environments the current user can access. ".repeat(6);
        let doc = json!({
            "paths": {
                "/endpoints": {
                    "get": {
                        "summary": "short summary",
                        "description": long.trim_end(),
                        "tags": [long.trim_end()],
                        "parameters": [{ "name": "q", "description": format!("a: {}", long.trim_end()) }]
                    }
                }
            }
        });

        let yaml = to_yaml(&doc).unwrap();
        let widest = yaml.lines().map(|line| line.chars().count()).max().unwrap();
        assert!(widest <= OUTPUT_LINE_WIDTH, "line of {widest} characters");
        assert!(yaml.contains("description: >-"));
        assert!(yaml.contains("summary: short summary"));
        assert_eq!(parse_document(&yaml, SourceFormat::Yaml).unwrap(), doc);
    }

    #[test]
    fn test_unfoldable_strings_stay_inline() {
        let word = "x".repeat(150);
        let padded = format!(" {}", "lead ".repeat(30));
        let doc = json!({ "word": word, "padded": padded, "multi": "one\ntwo" });

        let yaml = to_yaml(&doc).unwrap();
        assert!(!yaml.contains(">-"));
        assert_eq!(parse_document(&yaml, SourceFormat::Yaml).unwrap(), doc);
    }

    #[test]
    fn test_wrap_words() {
        assert_eq!(wrap_words("aa bb cc dd", 5), vec!["aa bb", "cc dd"]);
        assert_eq!(wrap_words("aa  bb cc", 6), vec!["aa  bb", "cc"]);
        assert_eq!(wrap_words("abcdefgh ij", 4), vec!["abcdefgh", "ij"]);
        assert_eq!(content_indent("    - key: "), 8);
        assert_eq!(content_indent("- "), 4);
    }

    #[test]
    fn test_yaml_round_trip_preserves_order() {
        let text = "zeta: 1\nalpha: 2\nmid:\n  b: true\n  a: false\n";
        let doc = parse_document(text, SourceFormat::Yaml).unwrap();
        let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        assert_eq!(to_yaml(&doc).unwrap(), text);
    }
}
