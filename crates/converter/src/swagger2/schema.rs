//! Schema object fixes and `$ref` rewriting

use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Schema keys whose values are themselves schemas
const SUBSCHEMA_KEYS: [&str; 4] = ["items", "not", "additionalProperties", "additionalItems"];

/// Schema keys whose values are arrays of schemas
const SUBSCHEMA_LIST_KEYS: [&str; 3] = ["allOf", "anyOf", "oneOf"];

/// Replace characters that are not valid in an OpenAPI 3 component name
///
/// # Examples
/// ```
/// use oas_bridge_converter::swagger2::sanitize_component_name;
///
/// assert_eq!(sanitize_component_name("portainer.Stack"), "portainer.Stack");
/// assert_eq!(sanitize_component_name("Page[User]"), "Page_User_");
/// assert_eq!(sanitize_component_name("a b/c"), "a_b_c");
/// ```
pub fn sanitize_component_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Decode a JSON pointer segment (`~1`, `~0`, and `%XX` escapes)
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let unescaped = segment.replace("~1", "/").replace("~0", "~");
    percent_decode(&unescaped)
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| input.to_string())
}

/// Apply Swagger 2.0 → OpenAPI 3.0 schema fixes, recursively
///
/// - `x-nullable` → `nullable`
/// - `type: file` → `type: string, format: binary`
/// - string `discriminator` → `{ propertyName }`
pub(crate) fn fix_schema(schema: &mut Value) {
    let Some(map) = schema.as_object_mut() else {
        return;
    };

    if map.contains_key("x-nullable") {
        rename_key(map, "x-nullable", "nullable");
    }

    if map.get("type").and_then(Value::as_str) == Some("file") {
        map.insert("type".to_string(), json!("string"));
        map.insert("format".to_string(), json!("binary"));
    }

    if let Some(Value::String(property)) = map.get("discriminator") {
        let discriminator = json!({ "propertyName": property });
        map.insert("discriminator".to_string(), discriminator);
    }

    if let Some(Value::Object(properties)) = map.get_mut("properties") {
        for property in properties.values_mut() {
            fix_schema(property);
        }
    }

    for key in SUBSCHEMA_KEYS {
        match map.get_mut(key) {
            Some(Value::Array(items)) => items.iter_mut().for_each(fix_schema),
            Some(sub) => fix_schema(sub),
            None => {}
        }
    }

    for key in SUBSCHEMA_LIST_KEYS {
        if let Some(Value::Array(items)) = map.get_mut(key) {
            items.iter_mut().for_each(fix_schema);
        }
    }
}

/// Rename a key in place, keeping its position among its siblings
pub(crate) fn rename_key(map: &mut Map<String, Value>, from: &str, to: &str) {
    if map.contains_key(to) {
        map.shift_remove(from);
        return;
    }
    *map = std::mem::take(map)
        .into_iter()
        .map(|(key, value)| {
            if key == from {
                (to.to_string(), value)
            } else {
                (key, value)
            }
        })
        .collect();
}

/// Rewrite every `$ref` in `node` to its OpenAPI 3.0 component location
pub(crate) fn rewrite_refs(node: &mut Value, body_parameters: &HashSet<String>) {
    match node {
        Value::Array(items) => {
            for item in items {
                rewrite_refs(item, body_parameters);
            }
        }
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get_mut("$ref") {
                *reference = rewrite_ref(reference, body_parameters);
            }
            for value in map.values_mut() {
                rewrite_refs(value, body_parameters);
            }
        }
        _ => {}
    }
}

/// Map a single Swagger 2.0 reference onto its OpenAPI 3.0 target
///
/// References that do not point into a moved section are returned unchanged.
pub(crate) fn rewrite_ref(reference: &str, body_parameters: &HashSet<String>) -> String {
    let Some(hash) = reference.find('#') else {
        return reference.to_string();
    };
    let (file, fragment) = reference.split_at(hash);
    let Some(pointer) = fragment.strip_prefix("#/") else {
        return reference.to_string();
    };

    let mut segments = pointer.splitn(3, '/');
    let (Some(section), Some(name)) = (segments.next(), segments.next()) else {
        return reference.to_string();
    };
    let rest = segments.next();

    let name = sanitize_component_name(&decode_pointer_segment(name));
    let target = match section {
        "definitions" => "schemas",
        "responses" => "responses",
        "parameters" if file.is_empty() && body_parameters.contains(&name) => "requestBodies",
        "parameters" => "parameters",
        _ => return reference.to_string(),
    };

    match rest {
        Some(rest) => format!("{}#/components/{}/{}/{}", file, target, name, rest),
        None => format!("{}#/components/{}/{}", file, target, name),
    }
}
