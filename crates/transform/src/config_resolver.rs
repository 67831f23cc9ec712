//! Conversion configuration discovery
//!
//! Lookup order for an input `dir/api.yaml`:
//! 1. the explicit `--config` path, when given (no further lookup)
//! 2. `dir/api.config.json`
//! 3. `dir/convert.config.json`

use oas_bridge_common::{ConversionConfig, ConvertError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Shared configuration file name looked up beside the input
pub const SHARED_CONFIG_FILE: &str = "convert.config.json";

/// Suffix of the per-input sidecar configuration file
pub const SIDECAR_SUFFIX: &str = ".config.json";

/// Where the resolved configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from this file
    File(PathBuf),
    /// An explicit path was given but does not exist
    MissingExplicit(PathBuf),
    /// No candidate file exists
    Defaults,
}

/// A configuration together with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub config: ConversionConfig,
    pub source: ConfigSource,
}

impl ResolvedConfig {
    /// Path of the file the configuration was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            ConfigSource::File(path) => Some(path),
            _ => None,
        }
    }
}

/// Candidate configuration paths for `input`, in priority order
pub fn candidate_paths(input: &Path, explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(explicit) = explicit {
        return vec![explicit.to_path_buf()];
    }

    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    let mut candidates = Vec::with_capacity(2);
    if let Some(stem) = input.file_stem() {
        let mut sidecar = stem.to_os_string();
        sidecar.push(SIDECAR_SUFFIX);
        candidates.push(dir.join(sidecar));
    }
    candidates.push(dir.join(SHARED_CONFIG_FILE));
    candidates
}

/// Resolve the configuration for `input`
///
/// A missing configuration is never an error. A configuration file that
/// exists but cannot be read or parsed is a [`ConvertError::Config`].
pub fn resolve_config(input: &Path, explicit: Option<&Path>) -> Result<ResolvedConfig> {
    for candidate in candidate_paths(input, explicit) {
        if candidate.exists() {
            let config = load_config(&candidate)?;
            return Ok(ResolvedConfig {
                config,
                source: ConfigSource::File(candidate),
            });
        }
    }

    let source = match explicit {
        Some(path) => ConfigSource::MissingExplicit(path.to_path_buf()),
        None => ConfigSource::Defaults,
    };
    Ok(ResolvedConfig {
        config: ConversionConfig::default(),
        source,
    })
}

/// Load a configuration file
pub fn load_config(path: &Path) -> Result<ConversionConfig> {
    let text = fs::read_to_string(path).map_err(|e| ConvertError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    ConversionConfig::from_json(&text).map_err(|e| ConvertError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
