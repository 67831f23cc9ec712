//! Converts a Swagger 2.0 document tree into an OpenAPI 3.0.0 document tree

use super::context::{media_types, string_list, Context, ParameterKind};
use super::parameters::{body_request_body, convert_header, convert_parameter, form_request_body};
use super::schema::{fix_schema, rewrite_refs};
use super::security::convert_security_scheme;
use crate::{Conversion, ConvertOptions, StructuralConverter};
use oas_bridge_common::{ConvertError, Document, Result};
use serde_json::{json, Map, Value};

/// Output version of the structural conversion
pub const OPENAPI_30_VERSION: &str = "3.0.0";

/// Operation keys of a Swagger 2.0 path item
const HTTP_METHODS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

/// Root keys consumed by the conversion; anything else that is not an
/// extension is dropped
const ROOT_KEYS: [&str; 15] = [
    "swagger",
    "info",
    "host",
    "basePath",
    "schemes",
    "consumes",
    "produces",
    "paths",
    "definitions",
    "parameters",
    "responses",
    "securityDefinitions",
    "security",
    "tags",
    "externalDocs",
];

/// Built-in Swagger 2.0 → OpenAPI 3.0.0 converter
#[derive(Debug, Clone, Copy, Default)]
pub struct Swagger2Converter;

impl StructuralConverter for Swagger2Converter {
    fn convert(&self, swagger: Document, options: &ConvertOptions) -> Result<Conversion> {
        if is_openapi3(&swagger) {
            return Ok(Conversion {
                openapi: swagger,
                warnings: Vec::new(),
            });
        }

        let Value::Object(root) = swagger else {
            return Err(ConvertError::StructuralConversion(
                "Document root is not an object".to_string(),
            ));
        };
        check_version(&root)?;

        let mut ctx = Context::new(options);
        let openapi = convert_document(&mut ctx, root)?;
        Ok(Conversion {
            openapi,
            warnings: ctx.warnings,
        })
    }
}

fn is_openapi3(doc: &Document) -> bool {
    doc.get("openapi")
        .and_then(Value::as_str)
        .is_some_and(|v| v.starts_with("3."))
}

fn check_version(root: &Map<String, Value>) -> Result<()> {
    let supported = match root.get("swagger") {
        Some(Value::String(version)) => version == "2.0",
        Some(Value::Number(version)) => version.as_f64() == Some(2.0),
        _ => false,
    };
    if supported {
        return Ok(());
    }

    let found = match root.get("swagger") {
        Some(Value::String(version)) => version.clone(),
        Some(other) => other.to_string(),
        None => "missing".to_string(),
    };
    Err(ConvertError::StructuralConversion(format!(
        "Unsupported swagger/OpenAPI version: {}",
        found
    )))
}

fn convert_document(ctx: &mut Context<'_>, mut root: Map<String, Value>) -> Result<Document> {
    ctx.consumes = string_list(root.get("consumes"));
    ctx.produces = string_list(root.get("produces"));
    if let Some(Value::Object(parameters)) = root.get("parameters") {
        ctx.global_parameters = parameters.clone();
    }
    let global_parameters: Vec<(String, Value)> = ctx
        .global_parameters
        .iter()
        .map(|(name, param)| (name.clone(), param.clone()))
        .collect();
    for (name, param) in &global_parameters {
        if let Some(param) = param.as_object() {
            if ParameterKind::of(param) == ParameterKind::Body {
                let name = ctx.component_name("parameters", name);
                ctx.body_parameters.insert(name);
            }
        }
    }

    let info = convert_info(ctx, root.shift_remove("info"))?;
    let servers = build_servers(
        root.get("host").and_then(Value::as_str),
        root.get("basePath").and_then(Value::as_str),
        &string_list(root.get("schemes")),
    );

    let mut schemas = Map::new();
    if let Some(Value::Object(definitions)) = root.shift_remove("definitions") {
        for (name, mut schema) in definitions {
            fix_schema(&mut schema);
            schemas.insert(ctx.component_name("schemas", &name), schema);
        }
    }

    let mut parameters = Map::new();
    let mut request_bodies = Map::new();
    let global_consumes = media_types(None, &ctx.consumes);
    for (name, param) in global_parameters {
        let Value::Object(param) = param else {
            continue;
        };
        match ParameterKind::of(&param) {
            ParameterKind::Body => {
                let body = body_request_body(ctx, &param, &global_consumes)?;
                let name = ctx.component_name("parameters", &name);
                request_bodies.insert(name, Value::Object(body));
            }
            // inlined at each use site
            ParameterKind::Form => {}
            ParameterKind::Other => {
                let name = ctx.component_name("parameters", &name);
                let param = convert_parameter(ctx, param)?;
                parameters.insert(name, Value::Object(param));
            }
        }
    }

    let mut responses = Map::new();
    let global_produces = media_types(None, &ctx.produces);
    if let Some(Value::Object(definitions)) = root.shift_remove("responses") {
        for (name, response) in definitions {
            let response = convert_response(ctx, response, &global_produces)?;
            responses.insert(ctx.component_name("responses", &name), response);
        }
    }

    let mut security_schemes = Map::new();
    if let Some(Value::Object(definitions)) = root.shift_remove("securityDefinitions") {
        for (name, scheme) in definitions {
            let scheme = match scheme {
                Value::Object(scheme) => {
                    Value::Object(convert_security_scheme(ctx, &name, scheme)?)
                }
                other => other,
            };
            security_schemes.insert(name, scheme);
        }
    }

    let paths = convert_paths(ctx, root.shift_remove("paths"))?;

    let mut out = Map::new();
    out.insert("openapi".to_string(), json!(OPENAPI_30_VERSION));
    if let Some(info) = info {
        out.insert("info".to_string(), info);
    }
    if let Some(external_docs) = root.shift_remove("externalDocs") {
        out.insert("externalDocs".to_string(), external_docs);
    }
    if !servers.is_empty() {
        out.insert("servers".to_string(), Value::Array(servers));
    }
    for key in ["tags", "security"] {
        if let Some(value) = root.shift_remove(key) {
            out.insert(key.to_string(), value);
        }
    }
    out.insert("paths".to_string(), Value::Object(paths));

    for (key, value) in root {
        if key.starts_with("x-") {
            out.insert(key, value);
        } else if !ROOT_KEYS.contains(&key.as_str()) {
            ctx.warnings
                .push(format!("Dropped unknown root property '{}'", key));
        }
    }

    let mut components = Map::new();
    for (section, entries) in [
        ("schemas", schemas),
        ("responses", responses),
        ("parameters", parameters),
        ("requestBodies", request_bodies),
        ("securitySchemes", security_schemes),
    ] {
        if !entries.is_empty() {
            components.insert(section.to_string(), Value::Object(entries));
        }
    }
    if !components.is_empty() {
        out.insert("components".to_string(), Value::Object(components));
    }

    let mut openapi = Value::Object(out);
    rewrite_refs(&mut openapi, &ctx.body_parameters);
    Ok(openapi)
}

fn convert_info(ctx: &mut Context<'_>, info: Option<Value>) -> Result<Option<Value>> {
    let mut info = match info {
        Some(Value::Object(info)) => info,
        other => {
            if !ctx.patchable("document has no info object")? {
                return Ok(other);
            }
            Map::new()
        }
    };

    for field in ["title", "version"] {
        if !info.contains_key(field) && ctx.patchable(format!("info.{} is missing", field))? {
            info.insert(field.to_string(), json!(""));
        }
    }
    Ok(Some(Value::Object(info)))
}

/// Build `servers` from `host`, `basePath`, and `schemes`
fn build_servers(host: Option<&str>, base_path: Option<&str>, schemes: &[String]) -> Vec<Value> {
    let base_path = base_path.unwrap_or_default();
    let urls: Vec<String> = match host {
        Some(host) if !host.is_empty() => {
            if schemes.is_empty() {
                vec![format!("//{}{}", host, base_path)]
            } else {
                schemes
                    .iter()
                    .map(|scheme| format!("{}://{}{}", scheme, host, base_path))
                    .collect()
            }
        }
        _ if !base_path.is_empty() => vec![base_path.to_string()],
        _ => Vec::new(),
    };

    urls.into_iter()
        .map(|mut url| {
            if url.len() > 1 && url.ends_with('/') {
                url.pop();
            }
            json!({ "url": url })
        })
        .collect()
}

fn convert_paths(ctx: &mut Context<'_>, paths: Option<Value>) -> Result<Map<String, Value>> {
    let paths = match paths {
        Some(Value::Object(paths)) => paths,
        _ => {
            ctx.patchable("document has no paths object")?;
            return Ok(Map::new());
        }
    };

    let mut out = Map::new();
    for (path, item) in paths {
        let item = match item {
            Value::Object(item) => Value::Object(convert_path_item(ctx, &path, item)?),
            other => other,
        };
        out.insert(path, item);
    }
    Ok(out)
}

fn parameter_kind(ctx: &Context<'_>, param: &Value) -> ParameterKind {
    match param.get("$ref").and_then(Value::as_str) {
        Some(reference) => ctx
            .referenced_parameter(reference)
            .map(ParameterKind::of)
            .unwrap_or(ParameterKind::Other),
        None => param
            .as_object()
            .map(ParameterKind::of)
            .unwrap_or(ParameterKind::Other),
    }
}

/// Follow a local parameter `$ref`, returning the parameter object itself
fn resolve_parameter(ctx: &Context<'_>, param: &Value) -> Option<Map<String, Value>> {
    match param.get("$ref").and_then(Value::as_str) {
        Some(reference) => ctx.referenced_parameter(reference).cloned(),
        None => param.as_object().cloned(),
    }
}

fn convert_path_item(
    ctx: &mut Context<'_>,
    path: &str,
    item: Map<String, Value>,
) -> Result<Map<String, Value>> {
    let mut shared_payload = Vec::new();
    let mut shared_parameters = Vec::new();
    if let Some(Value::Array(params)) = item.get("parameters") {
        for param in params {
            match parameter_kind(ctx, param) {
                ParameterKind::Body | ParameterKind::Form => shared_payload.push(param.clone()),
                ParameterKind::Other => shared_parameters.push(param.clone()),
            }
        }
    }

    let mut out = Map::new();
    for (key, value) in item {
        if key == "parameters" {
            let mut converted = Vec::with_capacity(shared_parameters.len());
            for param in std::mem::take(&mut shared_parameters) {
                converted.push(match param {
                    Value::Object(param) => Value::Object(convert_parameter(ctx, param)?),
                    other => other,
                });
            }
            if !converted.is_empty() {
                out.insert(key, Value::Array(converted));
            }
        } else if HTTP_METHODS.contains(&key.as_str()) {
            let value = match value {
                Value::Object(operation) => {
                    Value::Object(convert_operation(ctx, path, operation, &shared_payload)?)
                }
                other => other,
            };
            out.insert(key, value);
        } else {
            out.insert(key, value);
        }
    }
    Ok(out)
}

fn convert_operation(
    ctx: &mut Context<'_>,
    path: &str,
    operation: Map<String, Value>,
    shared_payload: &[Value],
) -> Result<Map<String, Value>> {
    let consumes = ctx.consumes_for(&operation);
    let produces = ctx.produces_for(&operation);

    let mut parameters = Vec::new();
    let mut body = None;
    let mut form = Vec::new();
    if let Some(Value::Array(params)) = operation.get("parameters") {
        for param in params {
            match parameter_kind(ctx, param) {
                ParameterKind::Body => body = Some(param.clone()),
                ParameterKind::Form => form.push(param.clone()),
                ParameterKind::Other => parameters.push(match param {
                    Value::Object(param) => Value::Object(convert_parameter(ctx, param.clone())?),
                    other => other.clone(),
                }),
            }
        }
    }

    if body.is_none() && form.is_empty() {
        for param in shared_payload {
            match parameter_kind(ctx, param) {
                ParameterKind::Body => body = Some(param.clone()),
                _ => form.push(param.clone()),
            }
        }
    }

    if body.is_some() && !form.is_empty() {
        ctx.unpatchable(
            None,
            format!(
                "operation at '{}' has both body and formData parameters; formData ignored",
                path
            ),
        )?;
        form.clear();
    }

    let mut request_body = match body {
        Some(body) => Some(body_parameter_request_body(ctx, &body, &consumes)?),
        None if !form.is_empty() => {
            let resolved: Vec<Map<String, Value>> = form
                .iter()
                .filter_map(|param| resolve_parameter(ctx, param))
                .collect();
            Some(Value::Object(form_request_body(&resolved, &consumes)))
        }
        None => None,
    };

    let mut out = Map::new();
    for (key, value) in operation {
        match key.as_str() {
            "parameters" => {
                if !parameters.is_empty() {
                    out.insert(key, Value::Array(std::mem::take(&mut parameters)));
                }
                if let Some(body) = request_body.take() {
                    out.insert("requestBody".to_string(), body);
                }
            }
            "consumes" | "produces" | "schemes" => {}
            "operationId" => {
                let value = match value {
                    Value::String(id) => Value::String(ctx.claim_operation_id(&id)?),
                    other => other,
                };
                out.insert(key, value);
            }
            "responses" => {
                let value = match value {
                    Value::Object(responses) => {
                        let mut converted = Map::new();
                        for (code, response) in responses {
                            converted.insert(code, convert_response(ctx, response, &produces)?);
                        }
                        Value::Object(converted)
                    }
                    other => other,
                };
                out.insert(key, value);
            }
            _ => {
                out.insert(key, value);
            }
        }
    }
    if let Some(body) = request_body {
        out.insert("requestBody".to_string(), body);
    }

    Ok(out)
}

fn body_parameter_request_body(
    ctx: &mut Context<'_>,
    param: &Value,
    consumes: &[String],
) -> Result<Value> {
    let reference = param.get("$ref").and_then(Value::as_str);
    match reference {
        Some(reference) if ctx.options.preserve_refs => Ok(json!({ "$ref": reference })),
        _ => {
            let Some(resolved) = resolve_parameter(ctx, param) else {
                return Ok(param.clone());
            };
            Ok(Value::Object(body_request_body(ctx, &resolved, consumes)?))
        }
    }
}

fn convert_response(ctx: &mut Context<'_>, response: Value, produces: &[String]) -> Result<Value> {
    let Value::Object(mut response) = response else {
        return Ok(response);
    };
    if response.contains_key("$ref") {
        return Ok(Value::Object(response));
    }

    let mut out = Map::new();
    match response.shift_remove("description") {
        Some(description) => {
            out.insert("description".to_string(), description);
        }
        None => {
            if ctx.patchable("response is missing a description")? {
                out.insert("description".to_string(), json!(""));
            }
        }
    }

    let schema = response.shift_remove("schema");
    let examples = response.shift_remove("examples");

    for (key, value) in response {
        let value = match value {
            Value::Object(headers) if key == "headers" => Value::Object(
                headers
                    .into_iter()
                    .map(|(name, header)| match header {
                        Value::Object(header) => (name, Value::Object(convert_header(header))),
                        other => (name, other),
                    })
                    .collect(),
            ),
            other => other,
        };
        out.insert(key, value);
    }

    let mut content = Map::new();
    if let Some(mut schema) = schema {
        fix_schema(&mut schema);
        for media_type in produces {
            content.insert(media_type.clone(), json!({ "schema": schema.clone() }));
        }
    }
    if let Some(Value::Object(examples)) = examples {
        for (media_type, example) in examples {
            let entry = content.entry(media_type).or_insert_with(|| json!({}));
            if let Some(entry) = entry.as_object_mut() {
                entry.insert("example".to_string(), example);
            }
        }
    }
    if !content.is_empty() {
        out.insert("content".to_string(), Value::Object(content));
    }

    Ok(Value::Object(out))
}
