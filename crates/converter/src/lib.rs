//! Structural conversion of Swagger 2.0 documents into OpenAPI 3.0.0
//!
//! The pipeline only depends on the [`StructuralConverter`] trait. The
//! bundled implementation is [`Swagger2Converter`], which rewrites the
//! document layout (servers, components, request bodies, content maps,
//! security schemes) while leaving schema dialect changes to later stages.
//!
//! ## Usage
//! ```rust
//! use oas_bridge_converter::{swagger_to_oas30, Swagger2Converter};
//! use serde_json::json;
//!
//! let swagger = json!({
//!     "swagger": "2.0",
//!     "info": { "title": "Pets", "version": "1.0" },
//!     "paths": {}
//! });
//! let conversion = swagger_to_oas30(&Swagger2Converter, swagger).unwrap();
//! assert_eq!(conversion.openapi["openapi"], "3.0.0");
//! ```

pub mod swagger2;

pub use swagger2::Swagger2Converter;

use oas_bridge_common::{Document, Result};
use serde::{Deserialize, Serialize};

/// Options understood by a structural converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Fix minor, well-known defects in the source instead of rejecting them
    pub patch: bool,

    /// Report defects that cannot be patched as warnings instead of errors
    pub warn_only: bool,

    /// Keep `$ref` indirections (e.g. to shared body parameters) instead of
    /// inlining the referenced definitions
    pub preserve_refs: bool,
}

impl ConvertOptions {
    /// Lenient options used by the conversion pipeline
    pub const LENIENT: ConvertOptions = ConvertOptions {
        patch: true,
        warn_only: true,
        preserve_refs: true,
    };

    /// Options that reject every defect
    pub const STRICT: ConvertOptions = ConvertOptions {
        patch: false,
        warn_only: false,
        preserve_refs: true,
    };
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::LENIENT
    }
}

/// Result of a structural conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// The converted OpenAPI 3.0.0 document
    pub openapi: Document,

    /// Non-fatal issues found (and possibly patched) along the way
    pub warnings: Vec<String>,
}

/// Converts a Swagger 2.0 document tree into an OpenAPI 3.0.0 document tree
pub trait StructuralConverter {
    /// Convert `swagger` according to `options`
    ///
    /// Unrecoverable problems are returned as
    /// [`ConvertError::StructuralConversion`](oas_bridge_common::ConvertError::StructuralConversion).
    fn convert(&self, swagger: Document, options: &ConvertOptions) -> Result<Conversion>;
}

impl<T: StructuralConverter + ?Sized> StructuralConverter for &T {
    fn convert(&self, swagger: Document, options: &ConvertOptions) -> Result<Conversion> {
        (**self).convert(swagger, options)
    }
}

impl<T: StructuralConverter + ?Sized> StructuralConverter for Box<T> {
    fn convert(&self, swagger: Document, options: &ConvertOptions) -> Result<Conversion> {
        (**self).convert(swagger, options)
    }
}

/// Run a converter with the pipeline's lenient options
pub fn swagger_to_oas30<C: StructuralConverter + ?Sized>(
    converter: &C,
    swagger: Document,
) -> Result<Conversion> {
    converter.convert(swagger, &ConvertOptions::LENIENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::eq;
    use oas_bridge_common::ConvertError;
    use serde_json::json;

    mock! {
        pub Converter {}
        impl StructuralConverter for Converter {
            fn convert(&self, swagger: Document, options: &ConvertOptions) -> Result<Conversion>;
        }
    }

    #[test]
    fn test_adapter_passes_lenient_options() {
        let mut converter = MockConverter::new();
        converter
            .expect_convert()
            .with(eq(json!({"swagger": "2.0"})), eq(ConvertOptions::LENIENT))
            .times(1)
            .returning(|_, _| {
                Ok(Conversion {
                    openapi: json!({"openapi": "3.0.0"}),
                    warnings: vec![],
                })
            });

        let conversion = swagger_to_oas30(&converter, json!({"swagger": "2.0"})).unwrap();
        assert_eq!(conversion.openapi, json!({"openapi": "3.0.0"}));
    }

    #[test]
    fn test_adapter_propagates_failure() {
        let mut converter = MockConverter::new();
        converter.expect_convert().returning(|_, _| {
            Err(ConvertError::StructuralConversion(
                "Unsupported swagger/OpenAPI version: 1.2".to_string(),
            ))
        });

        let err = swagger_to_oas30(&converter, json!({"swagger": "1.2"})).unwrap_err();
        assert!(err.to_string().contains("Unsupported swagger/OpenAPI version"));
    }

    #[test]
    fn test_default_options_are_lenient() {
        let options = ConvertOptions::default();
        assert!(options.patch && options.warn_only && options.preserve_refs);
    }
}
