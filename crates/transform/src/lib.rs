//! OpenAPI 3.1 upgrade, cleanup, and the end-to-end conversion pipeline
//!
//! Stages, in the order [`Pipeline`] runs them:
//! 1. [`resolve_config`]: find the conversion configuration
//! 2. [`apply_text_replacements`]: literal substitutions on the raw text
//! 3. structural conversion to OpenAPI 3.0.0 (see `oas_bridge_converter`)
//! 4. [`upgrade_to_oas31`]: schema dialect upgrade to 3.1.0
//! 5. [`apply_cleanup`]: security scheme, server, and tag metadata

pub mod cleanup;
pub mod config_resolver;
pub mod pipeline;
pub mod substitution;
pub mod upgrade;

pub use cleanup::{apply_cleanup, normalize_bearer_scheme};
pub use config_resolver::{resolve_config, ConfigSource, ResolvedConfig};
pub use pipeline::{
    derive_output_path, detect_version, sanitize_version, Pipeline, PipelineEvent,
    PipelineReport,
};
pub use substitution::{apply_text_replacements, BUILTIN_REPLACEMENTS};
pub use upgrade::{upgrade_to_oas31, OPENAPI_31_VERSION};
