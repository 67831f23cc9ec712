//! Post-conversion metadata cleanup
//!
//! Every rule here is an existence check on the upgraded document; nothing
//! in this module can fail.

use oas_bridge_common::{ConversionConfig, Document, TagGroup};
use serde_json::{json, Map, Value};

/// Extension field holding tag navigation groups
pub const TAG_GROUPS_EXTENSION: &str = "x-tagGroups";

/// Apply security, server, and tag cleanup to an upgraded document
pub fn apply_cleanup(doc: &mut Document, config: &ConversionConfig) {
    let Some(root) = doc.as_object_mut() else {
        return;
    };

    if let Some(Value::Object(schemes)) = root
        .get_mut("components")
        .and_then(|components| components.get_mut("securitySchemes"))
    {
        for (name, scheme) in schemes.iter_mut() {
            if let Value::Object(scheme) = scheme {
                normalize_bearer_scheme(name, scheme);
            }
        }
    }

    if let Some(description) = config.server_description.as_deref() {
        fill_server_descriptions(root, description);
    }

    if let Some(overrides) = &config.tag_descriptions {
        if let Some(Value::Array(tags)) = root.get_mut("tags") {
            for tag in tags.iter_mut().filter_map(Value::as_object_mut) {
                let Some(name) = tag.get("name").and_then(Value::as_str) else {
                    continue;
                };
                if let Some(description) = overrides.get(name) {
                    tag.insert("description".to_string(), json!(description));
                }
            }
        }
    }

    if let Some(groups) = config.tag_groups.as_deref().filter(|g| !g.is_empty()) {
        root.insert(TAG_GROUPS_EXTENSION.to_string(), tag_groups_value(groups));
    }
}

/// Rewrite an `Authorization` API key header into an HTTP bearer scheme
///
/// Returns `true` when the scheme was rewritten.
pub fn normalize_bearer_scheme(name: &str, scheme: &mut Map<String, Value>) -> bool {
    let is_authorization_header = scheme.get("type").and_then(Value::as_str) == Some("apiKey")
        && scheme.get("in").and_then(Value::as_str) == Some("header")
        && scheme
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|header| header.eq_ignore_ascii_case("authorization"));
    if !is_authorization_header {
        return false;
    }

    scheme.shift_remove("in");
    scheme.shift_remove("name");
    scheme.insert("type".to_string(), json!("http"));
    scheme.insert("scheme".to_string(), json!("bearer"));

    let lowered = name.to_lowercase();
    if lowered.contains("jwt") || lowered.contains("bearer") {
        scheme.insert("bearerFormat".to_string(), json!("JWT"));
    }
    true
}

fn fill_server_descriptions(root: &mut Map<String, Value>, description: &str) {
    if description.is_empty() {
        return;
    }
    let Some(Value::Array(servers)) = root.get_mut("servers") else {
        return;
    };

    for server in servers.iter_mut().filter_map(Value::as_object_mut) {
        let lacks_description = match server.get("description") {
            None | Some(Value::Null) => true,
            Some(Value::String(existing)) => existing.is_empty(),
            Some(_) => false,
        };
        if lacks_description {
            server.insert("description".to_string(), json!(description));
        }
    }
}

fn tag_groups_value(groups: &[TagGroup]) -> Value {
    groups
        .iter()
        .map(|group| {
            let mut entry = Map::new();
            if let Some(name) = &group.name {
                entry.insert("name".to_string(), json!(name));
            }
            if let Some(tags) = &group.tags {
                entry.insert("tags".to_string(), json!(tags));
            }
            entry.extend(group.extra.clone());
            Value::Object(entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_schemes(schemes: Value) -> Document {
        json!({
            "openapi": "3.1.0",
            "components": { "securitySchemes": schemes }
        })
    }

    #[test]
    fn test_bearer_normalization_with_jwt_hint() {
        let mut doc = with_schemes(json!({
            "bearerAuth": { "type": "apiKey", "in": "header", "name": "Authorization" }
        }));
        apply_cleanup(&mut doc, &ConversionConfig::default());
        assert_eq!(
            doc["components"]["securitySchemes"]["bearerAuth"],
            json!({ "type": "http", "scheme": "bearer", "bearerFormat": "JWT" })
        );
    }

    #[test]
    fn test_bearer_normalization_without_hint() {
        let mut doc = with_schemes(json!({
            "customAuth": {
                "type": "apiKey",
                "in": "header",
                "name": "authorization",
                "description": "Token"
            }
        }));
        apply_cleanup(&mut doc, &ConversionConfig::default());
        assert_eq!(
            doc["components"]["securitySchemes"]["customAuth"],
            json!({ "type": "http", "description": "Token", "scheme": "bearer" })
        );
    }

    #[test]
    fn test_other_api_keys_untouched() {
        let schemes = json!({
            "queryKey": { "type": "apiKey", "in": "query", "name": "Authorization" },
            "headerKey": { "type": "apiKey", "in": "header", "name": "X-API-Key" },
            "basic": { "type": "http", "scheme": "basic" }
        });
        let mut doc = with_schemes(schemes.clone());
        apply_cleanup(&mut doc, &ConversionConfig::default());
        assert_eq!(doc["components"]["securitySchemes"], schemes);
    }

    #[test]
    fn test_server_descriptions_filled_not_overwritten() {
        let mut doc = json!({
            "servers": [
                { "url": "https://x" },
                { "url": "https://y", "description": "kept" },
                { "url": "https://z", "description": "" }
            ]
        });
        let config = ConversionConfig {
            server_description: Some("D".to_string()),
            ..Default::default()
        };
        apply_cleanup(&mut doc, &config);
        assert_eq!(
            doc["servers"],
            json!([
                { "url": "https://x", "description": "D" },
                { "url": "https://y", "description": "kept" },
                { "url": "https://z", "description": "D" }
            ])
        );
    }

    #[test]
    fn test_empty_server_description_is_ignored() {
        let mut doc = json!({ "servers": [{ "url": "https://x" }] });
        let config = ConversionConfig {
            server_description: Some(String::new()),
            ..Default::default()
        };
        apply_cleanup(&mut doc, &config);
        assert_eq!(doc["servers"], json!([{ "url": "https://x" }]));
    }

    #[test]
    fn test_tag_descriptions_override() {
        let mut doc = json!({
            "tags": [
                { "name": "auth", "description": "old" },
                { "name": "users" },
                { "name": "misc", "description": "untouched" }
            ]
        });
        let config = ConversionConfig {
            tag_descriptions: Some(HashMap::from([
                ("auth".to_string(), "Authenticate".to_string()),
                ("users".to_string(), "Manage users".to_string()),
                ("ghost".to_string(), "Not present".to_string()),
            ])),
            ..Default::default()
        };
        apply_cleanup(&mut doc, &config);
        assert_eq!(
            doc["tags"],
            json!([
                { "name": "auth", "description": "Authenticate" },
                { "name": "users", "description": "Manage users" },
                { "name": "misc", "description": "untouched" }
            ])
        );
    }

    #[test]
    fn test_tag_groups_replace_existing() {
        let mut doc = json!({ "x-tagGroups": [{ "name": "Old", "tags": [] }] });
        let config = ConversionConfig {
            tag_groups: Some(vec![TagGroup {
                name: Some("Auth".to_string()),
                tags: Some(vec!["auth".to_string()]),
                ..Default::default()
            }]),
            ..Default::default()
        };
        apply_cleanup(&mut doc, &config);
        assert_eq!(
            doc[TAG_GROUPS_EXTENSION],
            json!([{ "name": "Auth", "tags": ["auth"] }])
        );
    }

    #[test]
    fn test_tag_groups_are_copied_verbatim() {
        let mut doc = json!({ "openapi": "3.1.0" });
        let config = ConversionConfig::from_json(
            r#"{ "tagGroups": [
                { "name": "Core", "tags": ["a"], "x-collapsed": true },
                { "tags": ["b"] }
            ] }"#,
        )
        .unwrap();
        apply_cleanup(&mut doc, &config);
        assert_eq!(
            doc[TAG_GROUPS_EXTENSION],
            json!([
                { "name": "Core", "tags": ["a"], "x-collapsed": true },
                { "tags": ["b"] }
            ])
        );
    }

    #[test]
    fn test_empty_tag_groups_leave_document_alone() {
        let mut doc = json!({ "openapi": "3.1.0" });
        let config = ConversionConfig {
            tag_groups: Some(Vec::new()),
            ..Default::default()
        };
        apply_cleanup(&mut doc, &config);
        assert_eq!(doc, json!({ "openapi": "3.1.0" }));
    }
}
