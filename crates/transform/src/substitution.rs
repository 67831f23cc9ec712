//! Literal text substitutions applied to the raw source before parsing

use oas_bridge_common::TextReplacement;

/// Built-in substitutions, applied before any user-supplied ones
///
/// Older Portainer descriptions spell the same concept two ways at once.
pub const BUILTIN_REPLACEMENTS: [(&str, &str); 2] = [
    ("environments(endpoints)", "endpoints"),
    ("environment(endpoint)", "endpoint"),
];

/// Apply the built-in table, then `extra`, in order
///
/// Each pass runs over the output of the previous one, so replacements
/// compose. An empty `find` is skipped.
///
/// # Examples
/// ```
/// use oas_bridge_common::TextReplacement;
/// use oas_bridge_transform::apply_text_replacements;
///
/// let extra = [TextReplacement::new("endpoints", "environments")];
/// let text = apply_text_replacements("List environments(endpoints)", &extra);
/// assert_eq!(text, "List environments");
/// ```
pub fn apply_text_replacements(raw: &str, extra: &[TextReplacement]) -> String {
    let mut pairs: Vec<(&str, &str)> = BUILTIN_REPLACEMENTS.to_vec();
    pairs.extend(extra.iter().map(|r| (r.find.as_str(), r.replace.as_str())));

    let mut text = raw.to_string();
    for (find, replace) in pairs {
        if find.is_empty() || !text.contains(find) {
            continue;
        }
        text = text.replace(find, replace);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_replacements() {
        let raw = "summary: List environments(endpoints)\ndescription: Get an environment(endpoint)";
        assert_eq!(
            apply_text_replacements(raw, &[]),
            "summary: List endpoints\ndescription: Get an endpoint"
        );
    }

    #[test]
    fn test_replacements_compose_in_order() {
        let extra = [
            TextReplacement::new("endpoint", "node"),
            TextReplacement::new("node", "host"),
        ];
        assert_eq!(
            apply_text_replacements("environment(endpoint) only", &extra),
            "host only"
        );
    }

    #[test]
    fn test_literal_and_case_sensitive() {
        let extra = [TextReplacement::new("a.c", "X")];
        assert_eq!(apply_text_replacements("abc a.c A.C", &extra), "abc X A.C");
    }

    #[test]
    fn test_empty_find_is_noop() {
        let extra = [TextReplacement::new("", "X")];
        assert_eq!(apply_text_replacements("abc", &extra), "abc");
    }
}
