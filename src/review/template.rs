use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Values available to `{{ token }}` placeholders
pub type TemplateContext = Map<String, Value>;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("token pattern is valid"));

/// Replace `{{ name }}` placeholders with values from `context`.
///
/// Unknown tokens are left untouched; `null` renders as an empty string.
/// There is no escaping and substituted values are not rendered again.
pub fn render(template: &str, context: &TemplateContext) -> String {
    if template.is_empty() {
        return String::new();
    }

    TOKEN
        .replace_all(template, |caps: &Captures| match context.get(&caps[1]) {
            Some(value) => value_to_string(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: Value) -> TemplateContext {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_replaces_known_tokens() {
        let ctx = context(json!({"totalVersions": 3, "totalFiles": 42}));
        assert_eq!(render("Found {{totalVersions}} of {{totalFiles}}", &ctx), "Found 3 of 42");
    }

    #[test]
    fn test_whitespace_inside_braces_is_ignored() {
        let ctx = context(json!({"totalVersions": 2}));
        assert_eq!(render("{{ totalVersions }} / {{totalVersions   }}", &ctx), "2 / 2");
    }

    #[test]
    fn test_unknown_tokens_pass_through() {
        let ctx = context(json!({"totalVersions": 1}));
        assert_eq!(render("Hello {{unknown}}", &ctx), "Hello {{unknown}}");
    }

    #[test]
    fn test_null_renders_empty() {
        let ctx = context(json!({"totalFiles": null}));
        assert_eq!(render("[{{totalFiles}}]", &ctx), "[]");
    }

    #[test]
    fn test_strings_render_without_quotes() {
        let ctx = context(json!({"name": "V2"}));
        assert_eq!(render("## {{name}}", &ctx), "## V2");
    }

    #[test]
    fn test_no_recursive_substitution() {
        let ctx = context(json!({"a": "{{b}}", "b": "nope"}));
        assert_eq!(render("{{a}}", &ctx), "{{b}}");
    }

    #[test]
    fn test_identity_without_tokens() {
        let ctx = context(json!({"totalVersions": 9}));
        for template in ["", "plain", "{ {totalVersions} }", "{{}}", "{{ two words }}", "# Title\n\n---"] {
            assert_eq!(render(template, &ctx), template);
        }
    }

    #[test]
    fn test_empty_template_and_context() {
        assert_eq!(render("", &TemplateContext::new()), "");
        assert_eq!(render("{{x}}", &TemplateContext::new()), "{{x}}");
    }
}
