//! OpenAPI 3.0.0 → 3.1.0 schema dialect upgrade
//!
//! OpenAPI 3.1 adopts JSON Schema 2020-12, which drops the 3.0-only
//! `nullable` keyword and turns `exclusiveMinimum` / `exclusiveMaximum` from
//! boolean modifiers into numeric bounds. Every object in the tree is
//! visited once, parent before children, and rewritten in place. Each rule
//! only fires on the 3.0 shape, so upgrading twice changes nothing.

use oas_bridge_common::Document;
use serde_json::{json, Map, Value};

/// Version written to the document's `openapi` field
pub const OPENAPI_31_VERSION: &str = "3.1.0";

/// Key prefix the structural converter uses for its own warning markers
pub const CONVERTER_MARKER_PREFIX: &str = "x-s2o";

/// Upgrade an OpenAPI 3.0.0 document to 3.1.0
///
/// # Examples
/// ```
/// use oas_bridge_transform::upgrade_to_oas31;
/// use serde_json::json;
///
/// let doc = json!({
///     "openapi": "3.0.0",
///     "components": { "schemas": { "Name": { "type": "string", "nullable": true } } }
/// });
/// let upgraded = upgrade_to_oas31(doc);
/// assert_eq!(upgraded["openapi"], "3.1.0");
/// assert_eq!(upgraded["components"]["schemas"]["Name"], json!({ "type": ["string", "null"] }));
/// ```
pub fn upgrade_to_oas31(mut doc: Document) -> Document {
    if let Some(root) = doc.as_object_mut() {
        root.insert("openapi".to_string(), json!(OPENAPI_31_VERSION));
    }
    walk(&mut doc);
    if let Some(root) = doc.as_object_mut() {
        strip_converter_markers(root);
    }
    doc
}

fn walk(node: &mut Value) {
    match node {
        Value::Array(items) => items.iter_mut().for_each(walk),
        Value::Object(map) => {
            upgrade_node(map);
            map.values_mut().for_each(walk);
        }
        _ => {}
    }
}

fn upgrade_node(node: &mut Map<String, Value>) {
    eliminate_nullable(node);
    normalize_exclusive_bound(node, "exclusiveMinimum", "minimum");
    normalize_exclusive_bound(node, "exclusiveMaximum", "maximum");
    strip_converter_markers(node);
}

/// `nullable: true` → `"null"` in the type list, or a `{type: null}` alternative
fn eliminate_nullable(node: &mut Map<String, Value>) {
    if node.get("nullable") != Some(&Value::Bool(true)) {
        return;
    }

    match node.get_mut("type") {
        Some(ty) if ty.is_string() => {
            let name = ty.take();
            *ty = json!([name, "null"]);
        }
        Some(Value::Array(types)) => {
            let null = json!("null");
            if !types.contains(&null) {
                types.push(null);
            }
        }
        _ => match node.get_mut("oneOf") {
            Some(Value::Array(alternatives)) => alternatives.push(json!({ "type": "null" })),
            Some(_) => {}
            None => {
                node.insert("oneOf".to_string(), json!([{ "type": "null" }]));
            }
        },
    }

    node.shift_remove("nullable");
}

/// Boolean `exclusive*` + sibling bound → numeric `exclusive*`
///
/// A boolean flag without a usable sibling bound is dropped.
fn normalize_exclusive_bound(node: &mut Map<String, Value>, exclusive: &str, bound: &str) {
    let Some(&Value::Bool(flag)) = node.get(exclusive) else {
        return;
    };

    if flag {
        if let Some(value) = node.shift_remove(bound) {
            node.insert(exclusive.to_string(), value);
            return;
        }
    }
    node.shift_remove(exclusive);
}

fn strip_converter_markers(node: &mut Map<String, Value>) {
    node.retain(|key, _| !key.starts_with(CONVERTER_MARKER_PREFIX));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upgrade_schema(schema: Value) -> Value {
        let doc = upgrade_to_oas31(json!({ "openapi": "3.0.0", "schema": schema }));
        doc["schema"].clone()
    }

    #[test]
    fn test_nullable_single_type() {
        assert_eq!(
            upgrade_schema(json!({ "type": "string", "nullable": true, "maxLength": 5 })),
            json!({ "type": ["string", "null"], "maxLength": 5 })
        );
    }

    #[test]
    fn test_nullable_type_array() {
        assert_eq!(
            upgrade_schema(json!({ "type": ["integer"], "nullable": true })),
            json!({ "type": ["integer", "null"] })
        );
        assert_eq!(
            upgrade_schema(json!({ "type": ["integer", "null"], "nullable": true })),
            json!({ "type": ["integer", "null"] })
        );
    }

    #[test]
    fn test_nullable_one_of() {
        let upgraded = upgrade_schema(json!({
            "nullable": true,
            "oneOf": [{ "$ref": "#/components/schemas/A" }, { "$ref": "#/components/schemas/B" }]
        }));
        let alternatives = upgraded["oneOf"].as_array().unwrap();
        assert_eq!(alternatives.len(), 3);
        assert_eq!(alternatives[2], json!({ "type": "null" }));
        assert!(upgraded.get("nullable").is_none());
    }

    #[test]
    fn test_nullable_without_type_or_one_of() {
        assert_eq!(
            upgrade_schema(json!({ "$ref": "#/components/schemas/A", "nullable": true })),
            json!({ "$ref": "#/components/schemas/A", "oneOf": [{ "type": "null" }] })
        );
    }

    #[test]
    fn test_nullable_false_is_left_alone() {
        assert_eq!(
            upgrade_schema(json!({ "type": "string", "nullable": false })),
            json!({ "type": "string", "nullable": false })
        );
    }

    #[test]
    fn test_exclusive_minimum_with_bound() {
        assert_eq!(
            upgrade_schema(json!({ "type": "integer", "exclusiveMinimum": true, "minimum": 5 })),
            json!({ "type": "integer", "exclusiveMinimum": 5 })
        );
        assert_eq!(
            upgrade_schema(json!({ "exclusiveMaximum": true, "maximum": 10.5 })),
            json!({ "exclusiveMaximum": 10.5 })
        );
    }

    #[test]
    fn test_exclusive_flags_without_bound_are_dropped() {
        assert_eq!(
            upgrade_schema(json!({ "exclusiveMinimum": false, "minimum": 1 })),
            json!({ "minimum": 1 })
        );
        assert_eq!(
            upgrade_schema(json!({ "exclusiveMaximum": true })),
            json!({})
        );
    }

    #[test]
    fn test_numeric_exclusive_bound_untouched() {
        assert_eq!(
            upgrade_schema(json!({ "exclusiveMinimum": 3, "minimum": 1 })),
            json!({ "exclusiveMinimum": 3, "minimum": 1 })
        );
    }

    #[test]
    fn test_converter_markers_removed_everywhere() {
        let doc = json!({
            "openapi": "3.0.0",
            "x-s2o-warning": "root",
            "x-keep": true,
            "paths": {
                "/a": {
                    "get": {
                        "parameters": [{ "name": "q", "x-s2o-warning": "tsv", "x-s2o-overloaded": true }]
                    }
                }
            }
        });
        let upgraded = upgrade_to_oas31(doc);
        assert_eq!(
            upgraded,
            json!({
                "openapi": "3.1.0",
                "x-keep": true,
                "paths": { "/a": { "get": { "parameters": [{ "name": "q" }] } } }
            })
        );
    }

    #[test]
    fn test_upgrade_is_idempotent() {
        let doc = json!({
            "openapi": "3.0.0",
            "components": {
                "schemas": {
                    "A": { "type": "string", "nullable": true },
                    "B": { "nullable": true, "oneOf": [{ "type": "integer" }] },
                    "C": { "nullable": true },
                    "D": { "type": "number", "exclusiveMinimum": true, "minimum": 0, "exclusiveMaximum": false },
                    "E": { "type": "array", "items": { "type": "string", "nullable": true } }
                }
            }
        });
        let once = upgrade_to_oas31(doc);
        let twice = upgrade_to_oas31(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_key_order_preserved() {
        let upgraded = upgrade_schema(json!({
            "description": "d",
            "type": "string",
            "nullable": true,
            "example": "x"
        }));
        let keys: Vec<&String> = upgraded.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["description", "type", "example"]);
    }
}
