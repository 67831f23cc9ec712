//! Conversion configuration loaded from a sidecar JSON file

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Optional per-document cleanup settings
///
/// Every field is optional; an absent field disables the matching cleanup.
///
/// ```json
/// {
///   "serverDescription": "Relative to your instance base URL.",
///   "tagDescriptions": { "auth": "Authenticate against the API." },
///   "tagGroups": [{ "name": "Auth", "tags": ["auth"] }],
///   "textReplacements": [{ "find": "old phrase", "replace": "new phrase" }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionConfig {
    /// Description added to every server entry that lacks one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_description: Option<String>,

    /// Tag name → replacement description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_descriptions: Option<HashMap<String, String>>,

    /// Navigation groups emitted as `x-tagGroups`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_groups: Option<Vec<TagGroup>>,

    /// Literal substitutions applied after the built-in ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_replacements: Option<Vec<TextReplacement>>,
}

impl ConversionConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// User-supplied text replacements, or an empty slice
    pub fn replacements(&self) -> &[TextReplacement] {
        self.text_replacements.as_deref().unwrap_or_default()
    }
}

/// A named cluster of tags for documentation sidebars
///
/// Written to the output as given, including keys other than `name` and `tags`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A literal find/replace pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextReplacement {
    pub find: String,
    pub replace: String,
}

impl TextReplacement {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}
