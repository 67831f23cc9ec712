//! Parameter, header, and request body conversion

use super::context::Context;
use super::schema::fix_schema;
use oas_bridge_common::Result;
use serde_json::{json, Map, Value};

/// Keywords that describe a non-body parameter's type in Swagger 2.0 and
/// move into `schema` in OpenAPI 3.0
const SCHEMA_KEYWORDS: [&str; 17] = [
    "type",
    "format",
    "items",
    "default",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "maxItems",
    "minItems",
    "uniqueItems",
    "enum",
    "multipleOf",
    "x-nullable",
];

/// Media types that can carry `formData` parameters
const FORM_MEDIA_TYPES: [&str; 2] = ["application/x-www-form-urlencoded", "multipart/form-data"];

/// Serialization style derived from a Swagger 2.0 `collectionFormat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Style {
    style: &'static str,
    explode: bool,
}

fn collection_style(format: &str, location: &str) -> Option<Style> {
    let style = match (format, location) {
        ("csv", "path" | "header") => Style {
            style: "simple",
            explode: false,
        },
        ("csv", _) => Style {
            style: "form",
            explode: false,
        },
        ("ssv", _) => Style {
            style: "spaceDelimited",
            explode: false,
        },
        ("pipes", _) => Style {
            style: "pipeDelimited",
            explode: false,
        },
        ("multi", _) => Style {
            style: "form",
            explode: true,
        },
        _ => return None,
    };
    Some(style)
}

/// Strip `collectionFormat` from nested `items` objects
fn clean_items(schema: &mut Map<String, Value>) {
    if let Some(Value::Object(items)) = schema.get_mut("items") {
        items.shift_remove("collectionFormat");
        clean_items(items);
    }
}

/// Convert a query/header/path parameter
///
/// `$ref` parameters are returned as-is; their targets are rewritten later.
pub(crate) fn convert_parameter(
    ctx: &mut Context<'_>,
    mut param: Map<String, Value>,
) -> Result<Map<String, Value>> {
    if param.contains_key("$ref") {
        return Ok(param);
    }

    let location = param
        .get("in")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if location == "path" && param.get("required") != Some(&Value::Bool(true)) {
        let name = param.get("name").and_then(Value::as_str).unwrap_or("?");
        if ctx.patchable(format!("path parameter '{}' must be required", name))? {
            param.insert("required".to_string(), Value::Bool(true));
        }
    }

    let mut out = Map::new();
    let mut schema = Map::new();
    let mut collection_format = None;

    for (key, value) in param {
        match key.as_str() {
            k if SCHEMA_KEYWORDS.contains(&k) => {
                schema.insert(key, value);
            }
            "collectionFormat" => collection_format = value.as_str().map(str::to_string),
            "x-example" => {
                out.insert("example".to_string(), value);
            }
            _ => {
                out.insert(key, value);
            }
        }
    }

    if let Some(format) = collection_format {
        match collection_style(&format, &location) {
            Some(style) => {
                out.insert("style".to_string(), json!(style.style));
                out.insert("explode".to_string(), json!(style.explode));
            }
            None => {
                let message = format!("collectionFormat '{}' is not supported", format);
                ctx.unpatchable(Some(&mut out), message)?;
            }
        }
    }

    if !schema.is_empty() {
        clean_items(&mut schema);
        let mut schema = Value::Object(schema);
        fix_schema(&mut schema);
        out.insert("schema".to_string(), schema);
    }

    Ok(out)
}

/// Convert a response header object
pub(crate) fn convert_header(header: Map<String, Value>) -> Map<String, Value> {
    if header.contains_key("$ref") {
        return header;
    }

    let mut out = Map::new();
    let mut schema = Map::new();

    for (key, value) in header {
        match key.as_str() {
            k if SCHEMA_KEYWORDS.contains(&k) => {
                schema.insert(key, value);
            }
            "collectionFormat" => {
                out.insert("style".to_string(), json!("simple"));
            }
            "x-example" => {
                out.insert("example".to_string(), value);
            }
            _ => {
                out.insert(key, value);
            }
        }
    }

    if !schema.is_empty() {
        clean_items(&mut schema);
        let mut schema = Value::Object(schema);
        fix_schema(&mut schema);
        out.insert("schema".to_string(), schema);
    }

    out
}

/// Convert a `body` parameter into a request body
pub(crate) fn body_request_body(
    ctx: &mut Context<'_>,
    param: &Map<String, Value>,
    consumes: &[String],
) -> Result<Map<String, Value>> {
    let mut schema = match param.get("schema") {
        Some(schema) => schema.clone(),
        None => {
            let name = param.get("name").and_then(Value::as_str).unwrap_or("?");
            if !ctx.patchable(format!("body parameter '{}' has no schema", name))? {
                return Ok(Map::new());
            }
            json!({})
        }
    };
    fix_schema(&mut schema);

    let mut body = Map::new();
    if let Some(description) = param.get("description") {
        body.insert("description".to_string(), description.clone());
    }

    let examples = param.get("x-examples").and_then(Value::as_object);
    let mut content = Map::new();
    for media_type in consumes {
        let mut entry = Map::new();
        entry.insert("schema".to_string(), schema.clone());
        if let Some(example) = examples.and_then(|e| e.get(media_type)) {
            entry.insert("example".to_string(), example.clone());
        }
        content.insert(media_type.clone(), Value::Object(entry));
    }
    body.insert("content".to_string(), Value::Object(content));

    if let Some(required) = param.get("required") {
        body.insert("required".to_string(), required.clone());
    }
    for (key, value) in param {
        if key.starts_with("x-") && key != "x-examples" {
            body.insert(key.clone(), value.clone());
        }
    }

    Ok(body)
}

/// Collapse `formData` parameters into a single object-schema request body
pub(crate) fn form_request_body(
    params: &[Map<String, Value>],
    consumes: &[String],
) -> Map<String, Value> {
    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut encoding = Map::new();
    let mut has_file = false;

    for param in params {
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            continue;
        };
        if param.get("type").and_then(Value::as_str) == Some("file") {
            has_file = true;
        }
        if param.get("required") == Some(&Value::Bool(true)) {
            required.push(json!(name));
        }

        let mut property = Map::new();
        for (key, value) in param {
            if SCHEMA_KEYWORDS.contains(&key.as_str()) || key == "description" {
                property.insert(key.clone(), value.clone());
            }
        }
        clean_items(&mut property);
        let mut property = Value::Object(property);
        fix_schema(&mut property);
        properties.insert(name.to_string(), property);

        let style = param
            .get("collectionFormat")
            .and_then(Value::as_str)
            .and_then(|format| collection_style(format, "formData"));
        if let Some(style) = style {
            encoding.insert(
                name.to_string(),
                json!({ "style": style.style, "explode": style.explode }),
            );
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required.clone()));
    }

    let mut media_types: Vec<&str> = consumes
        .iter()
        .map(String::as_str)
        .filter(|mt| FORM_MEDIA_TYPES.contains(mt))
        .collect();
    if media_types.is_empty() {
        media_types.push(if has_file {
            "multipart/form-data"
        } else {
            "application/x-www-form-urlencoded"
        });
    }

    let mut content = Map::new();
    for media_type in media_types {
        let mut entry = Map::new();
        entry.insert("schema".to_string(), Value::Object(schema.clone()));
        if !encoding.is_empty() {
            entry.insert("encoding".to_string(), Value::Object(encoding.clone()));
        }
        content.insert(media_type.to_string(), Value::Object(entry));
    }

    let mut body = Map::new();
    body.insert("content".to_string(), Value::Object(content));
    if !required.is_empty() {
        body.insert("required".to_string(), json!(true));
    }
    body
}
