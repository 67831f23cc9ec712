//! Security definition conversion

use super::context::Context;
use oas_bridge_common::Result;
use serde_json::{json, Map, Value};

/// Convert a Swagger 2.0 security definition into a security scheme
pub(crate) fn convert_security_scheme(
    ctx: &mut Context<'_>,
    name: &str,
    mut scheme: Map<String, Value>,
) -> Result<Map<String, Value>> {
    let scheme_type = scheme
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match scheme_type.as_str() {
        "basic" => {
            let mut out = Map::new();
            out.insert("type".to_string(), json!("http"));
            out.insert("scheme".to_string(), json!("basic"));
            copy_description_and_extensions(&scheme, &mut out);
            Ok(out)
        }
        "apiKey" => Ok(scheme),
        "oauth2" => Ok(convert_oauth2(&scheme)),
        other => {
            let message = format!(
                "security definition '{}' has unsupported type '{}'",
                name, other
            );
            ctx.unpatchable(Some(&mut scheme), message)?;
            Ok(scheme)
        }
    }
}

fn convert_oauth2(scheme: &Map<String, Value>) -> Map<String, Value> {
    let flow_name = match scheme.get("flow").and_then(Value::as_str) {
        Some("application") => "clientCredentials",
        Some("accessCode") => "authorizationCode",
        Some("password") => "password",
        _ => "implicit",
    };

    let mut flow = Map::new();
    for key in ["authorizationUrl", "tokenUrl"] {
        if let Some(url) = scheme.get(key) {
            flow.insert(key.to_string(), url.clone());
        }
    }
    let scopes = scheme.get("scopes").cloned().unwrap_or_else(|| json!({}));
    flow.insert("scopes".to_string(), scopes);

    let mut flows = Map::new();
    flows.insert(flow_name.to_string(), Value::Object(flow));

    let mut out = Map::new();
    out.insert("type".to_string(), json!("oauth2"));
    out.insert("flows".to_string(), Value::Object(flows));
    copy_description_and_extensions(scheme, &mut out);
    out
}

fn copy_description_and_extensions(from: &Map<String, Value>, to: &mut Map<String, Value>) {
    for (key, value) in from {
        if key == "description" || key.starts_with("x-") {
            to.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConvertOptions;

    fn convert(name: &str, scheme: Value) -> Value {
        let options = ConvertOptions::LENIENT;
        let mut ctx = Context::new(&options);
        let Value::Object(scheme) = scheme else {
            panic!("expected object")
        };
        Value::Object(convert_security_scheme(&mut ctx, name, scheme).unwrap())
    }

    #[test]
    fn test_basic_becomes_http() {
        assert_eq!(
            convert("basicAuth", json!({ "type": "basic", "description": "Login" })),
            json!({ "type": "http", "scheme": "basic", "description": "Login" })
        );
    }

    #[test]
    fn test_api_key_is_kept() {
        let scheme = json!({ "type": "apiKey", "in": "header", "name": "Authorization" });
        assert_eq!(convert("jwt", scheme.clone()), scheme);
    }

    #[test]
    fn test_oauth2_flows() {
        assert_eq!(
            convert(
                "oauth",
                json!({
                    "type": "oauth2",
                    "flow": "accessCode",
                    "authorizationUrl": "https://auth/authorize",
                    "tokenUrl": "https://auth/token",
                    "scopes": { "read": "Read access" }
                })
            ),
            json!({
                "type": "oauth2",
                "flows": {
                    "authorizationCode": {
                        "authorizationUrl": "https://auth/authorize",
                        "tokenUrl": "https://auth/token",
                        "scopes": { "read": "Read access" }
                    }
                }
            })
        );

        let converted = convert(
            "machine",
            json!({ "type": "oauth2", "flow": "application", "tokenUrl": "https://auth/token" }),
        );
        assert_eq!(
            converted["flows"]["clientCredentials"],
            json!({ "tokenUrl": "https://auth/token", "scopes": {} })
        );
    }

    #[test]
    fn test_unknown_type_is_marked() {
        let converted = convert("odd", json!({ "type": "mutualTLS" }));
        assert!(converted.get("x-s2o-warning").is_some());
    }
}
