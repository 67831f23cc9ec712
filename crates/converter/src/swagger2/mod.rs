//! Swagger 2.0 → OpenAPI 3.0.0 structural converter
//!
//! Rewrites the parts of a Swagger 2.0 document whose layout changed in
//! OpenAPI 3.0:
//! - `host` / `basePath` / `schemes` → `servers`
//! - `definitions`, `parameters`, `responses`, `securityDefinitions` →
//!   `components.*`
//! - `body` and `formData` parameters → `requestBody`
//! - response `schema` / `examples` → `content`
//! - `$ref` targets, following the component moves
//!
//! Schema keywords are left in their 3.0 form (`nullable`, boolean
//! `exclusiveMinimum`); upgrading them is a separate stage.
//!
//! ## Usage
//! ```rust,ignore
//! use oas_bridge_converter::{ConvertOptions, StructuralConverter, Swagger2Converter};
//!
//! let conversion = Swagger2Converter.convert(swagger, &ConvertOptions::LENIENT)?;
//! for warning in &conversion.warnings {
//!     eprintln!("{warning}");
//! }
//! ```

mod context;
mod converter;
mod parameters;
mod schema;
mod security;

pub use converter::Swagger2Converter;
pub use schema::sanitize_component_name;
