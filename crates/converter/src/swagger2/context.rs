//! Shared state for a single conversion run

use super::schema::sanitize_component_name;
use crate::ConvertOptions;
use oas_bridge_common::{ConvertError, Result};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Marker key attached to nodes with an unpatched defect
pub(crate) const WARNING_MARKER: &str = "x-s2o-warning";

pub(crate) const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Where a (possibly referenced) parameter ends up in OpenAPI 3.0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParameterKind {
    Body,
    Form,
    Other,
}

impl ParameterKind {
    pub(crate) fn of(param: &Map<String, Value>) -> Self {
        match param.get("in").and_then(Value::as_str) {
            Some("body") => ParameterKind::Body,
            Some("formData") => ParameterKind::Form,
            _ => ParameterKind::Other,
        }
    }
}

pub(crate) struct Context<'a> {
    pub options: &'a ConvertOptions,
    pub warnings: Vec<String>,

    /// Global `consumes`, or empty when the document declares none
    pub consumes: Vec<String>,

    /// Global `produces`, or empty when the document declares none
    pub produces: Vec<String>,

    /// Global parameters keyed by their original name
    pub global_parameters: Map<String, Value>,

    /// Sanitized names of global body parameters (emitted as requestBodies)
    pub body_parameters: HashSet<String>,

    operation_ids: HashSet<String>,
    renamed: HashMap<String, String>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(options: &'a ConvertOptions) -> Self {
        Self {
            options,
            warnings: Vec::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
            global_parameters: Map::new(),
            body_parameters: HashSet::new(),
            operation_ids: HashSet::new(),
            renamed: HashMap::new(),
        }
    }

    /// Report a defect that has a known fix
    ///
    /// Returns `Ok(true)` when the caller should apply the fix.
    pub(crate) fn patchable(&mut self, message: impl Into<String>) -> Result<bool> {
        let message = message.into();
        if self.options.patch {
            self.warnings.push(format!("Patched: {}", message));
            Ok(true)
        } else {
            self.unpatchable(None, message)?;
            Ok(false)
        }
    }

    /// Report a defect without a fix, marking `node` when warnings are allowed
    pub(crate) fn unpatchable(
        &mut self,
        node: Option<&mut Map<String, Value>>,
        message: impl Into<String>,
    ) -> Result<()> {
        let message = message.into();
        if !self.options.warn_only {
            return Err(ConvertError::StructuralConversion(message));
        }
        if let Some(node) = node {
            node.insert(WARNING_MARKER.to_string(), Value::String(message.clone()));
        }
        self.warnings.push(message);
        Ok(())
    }

    /// Sanitize a component name, recording a warning the first time it changes
    pub(crate) fn component_name(&mut self, section: &str, name: &str) -> String {
        let sanitized = sanitize_component_name(name);
        if sanitized != name {
            let key = format!("{}/{}", section, name);
            if !self.renamed.contains_key(&key) {
                self.warnings.push(format!(
                    "Renamed {} component '{}' to '{}'",
                    section, name, sanitized
                ));
                self.renamed.insert(key, sanitized.clone());
            }
        }
        sanitized
    }

    /// Look up the global parameter targeted by a local `#/parameters/...` ref
    pub(crate) fn referenced_parameter(&self, reference: &str) -> Option<&Map<String, Value>> {
        let name = reference.strip_prefix("#/parameters/")?;
        let name = super::schema::decode_pointer_segment(name);
        self.global_parameters.get(&name).and_then(Value::as_object)
    }

    /// Claim an operationId, returning a unique one when it is already taken
    pub(crate) fn claim_operation_id(&mut self, id: &str) -> Result<String> {
        if self.operation_ids.insert(id.to_string()) {
            return Ok(id.to_string());
        }
        if !self.patchable(format!("duplicate operationId '{}'", id))? {
            return Ok(id.to_string());
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", id, n);
            if self.operation_ids.insert(candidate.clone()) {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    pub(crate) fn consumes_for(&self, op: &Map<String, Value>) -> Vec<String> {
        media_types(op.get("consumes"), &self.consumes)
    }

    pub(crate) fn produces_for(&self, op: &Map<String, Value>) -> Vec<String> {
        media_types(op.get("produces"), &self.produces)
    }
}

/// Read a list of media types, falling back to `inherited`, then to JSON
pub(crate) fn media_types(local: Option<&Value>, inherited: &[String]) -> Vec<String> {
    let local = string_list(local);
    if !local.is_empty() {
        local
    } else if !inherited.is_empty() {
        inherited.to_vec()
    } else {
        vec![DEFAULT_MEDIA_TYPE.to_string()]
    }
}

pub(crate) fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
