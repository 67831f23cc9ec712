//! End-to-end conversion pipeline
//!
//! One run reads a single input file, converts it, and writes a single
//! YAML output file. Every stage runs in memory; the output is written only
//! after all stages have succeeded.

use crate::cleanup::apply_cleanup;
use crate::config_resolver::{resolve_config, ConfigSource};
use crate::substitution::apply_text_replacements;
use crate::upgrade::{upgrade_to_oas31, OPENAPI_31_VERSION};
use oas_bridge_common::{
    parse_document, to_yaml, ConversionConfig, ConvertError, Document, Result, SourceFormat,
};
use oas_bridge_converter::{swagger_to_oas30, StructuralConverter, Swagger2Converter};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of derived output files
pub const OUTPUT_EXTENSION: &str = "yml";

/// Progress notifications emitted by [`Pipeline::run_with_events`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// A configuration file was found and loaded
    ConfigLoaded(PathBuf),
    /// An explicit configuration path does not exist; defaults are used
    ConfigMissing(PathBuf),
    /// The input file is being read
    Reading(PathBuf),
    /// Step 1/4
    Substituting,
    /// The `swagger` / `openapi` field of the parsed input, or `?`
    Detected(String),
    /// Step 2/4
    Converting,
    /// Step 3/4
    Upgrading,
    /// Step 4/4
    CleaningUp,
    /// A non-fatal issue reported by the structural converter
    Warning(String),
    /// The output file was written
    Done(PathBuf),
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Path the output was written to
    pub output: PathBuf,
    /// Version declared by the input document
    pub detected_version: String,
    /// Converter warnings
    pub warnings: Vec<String>,
    /// Configuration the run used
    pub config: ConversionConfig,
}

/// Swagger 2.0 → OpenAPI 3.1.0 conversion of one file
///
/// ```no_run
/// use oas_bridge_transform::Pipeline;
///
/// let report = Pipeline::new("api/swagger.yaml")
///     .config("api/portainer.config.json")
///     .run()?;
/// println!("wrote {}", report.output.display());
/// # Ok::<(), oas_bridge_common::ConvertError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline<C = Swagger2Converter> {
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    converter: C,
}

impl Pipeline {
    /// Create a pipeline for `input` using the bundled converter
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            config: None,
            converter: Swagger2Converter,
        }
    }
}

impl<C: StructuralConverter> Pipeline<C> {
    /// Write to `output` instead of a path derived from the document version
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Use an explicit configuration file, skipping sidecar discovery
    pub fn config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Swap the structural converter
    pub fn with_converter<D: StructuralConverter>(self, converter: D) -> Pipeline<D> {
        Pipeline {
            input: self.input,
            output: self.output,
            config: self.config,
            converter,
        }
    }

    /// Run without progress reporting
    pub fn run(&self) -> Result<PipelineReport> {
        self.run_with_events(|_| {})
    }

    /// Run, reporting each stage to `on_event`
    pub fn run_with_events<F>(&self, mut on_event: F) -> Result<PipelineReport>
    where
        F: FnMut(PipelineEvent),
    {
        if !self.input.exists() {
            return Err(ConvertError::InputNotFound(self.input.clone()));
        }

        let resolved = resolve_config(&self.input, self.config.as_deref())?;
        match &resolved.source {
            ConfigSource::File(path) => on_event(PipelineEvent::ConfigLoaded(path.clone())),
            ConfigSource::MissingExplicit(path) => {
                on_event(PipelineEvent::ConfigMissing(path.clone()))
            }
            ConfigSource::Defaults => {}
        }
        let config = resolved.config;

        on_event(PipelineEvent::Reading(self.input.clone()));
        let raw = fs::read_to_string(&self.input)?;

        on_event(PipelineEvent::Substituting);
        let text = apply_text_replacements(&raw, config.replacements());
        let swagger = parse_document(&text, SourceFormat::from_path(&self.input))?;

        let detected_version = detect_version(&swagger);
        on_event(PipelineEvent::Detected(detected_version.clone()));

        on_event(PipelineEvent::Converting);
        let conversion = swagger_to_oas30(&self.converter, swagger)?;
        for warning in &conversion.warnings {
            on_event(PipelineEvent::Warning(warning.clone()));
        }

        on_event(PipelineEvent::Upgrading);
        let mut oas31 = upgrade_to_oas31(conversion.openapi);

        on_event(PipelineEvent::CleaningUp);
        apply_cleanup(&mut oas31, &config);

        let output = match &self.output {
            Some(path) => path.clone(),
            None => derive_output_path(&self.input, &oas31),
        };
        write_output(&output, &oas31)?;
        on_event(PipelineEvent::Done(output.clone()));

        Ok(PipelineReport {
            output,
            detected_version,
            warnings: conversion.warnings,
            config,
        })
    }
}

/// The `swagger` field, else the `openapi` field, else `?`
pub fn detect_version(doc: &Document) -> String {
    ["swagger", "openapi"]
        .iter()
        .find_map(|key| match doc.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(version)) => Some(version.clone()),
            Some(other) => Some(other.to_string()),
        })
        .unwrap_or_else(|| "?".to_string())
}

/// Replace every character outside `[A-Za-z0-9._-]` with `-`
pub fn sanitize_version(version: &str) -> String {
    version
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// `<input dir>/<sanitized openapi version>.yml`
pub fn derive_output_path(input: &Path, doc: &Document) -> PathBuf {
    let version = doc
        .get("openapi")
        .and_then(Value::as_str)
        .unwrap_or(OPENAPI_31_VERSION);
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}.{}", sanitize_version(version), OUTPUT_EXTENSION))
}

fn write_output(path: &Path, doc: &Document) -> Result<()> {
    let rendered = to_yaml(doc)?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| ConvertError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, rendered).map_err(|source| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    })
}
