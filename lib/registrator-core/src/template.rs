//! Best-effort template evaluation against container records
//!
//! Templates are plain text with `{{ .Field.Path }}` actions. Field paths are
//! resolved against the serialized container record, so they use the runtime's
//! field names (`.Config.Hostname`, `.Image`, `.NetworkSettings.IPAddress`).
//! A bare `{{.}}` renders the whole record.

use registrator_api::Container;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

const ACTION_OPEN: &str = "{{";
const ACTION_CLOSE: &str = "}}";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("parse error at byte {position}: {reason}")]
    Parse { position: usize, reason: String },

    #[error("can't evaluate field {0}")]
    MissingField(String),

    #[error("can't traverse into non-object at {0}")]
    NotTraversable(String),

    #[error("unable to build template context: {0}")]
    Context(#[from] serde_json::Error),
}

/// Result of evaluating a template
#[derive(Debug)]
pub enum TemplateOutcome {
    /// Nothing to evaluate; the input is returned as-is
    Unchanged(String),
    Rendered(String),
    /// Evaluation failed; `original` is the untouched input
    Fallback { original: String, error: TemplateError },
}

impl TemplateOutcome {
    pub fn value(&self) -> &str {
        match self {
            Self::Unchanged(value) | Self::Rendered(value) => value,
            Self::Fallback { original, .. } => original,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            Self::Unchanged(value) | Self::Rendered(value) => value,
            Self::Fallback { original, .. } => original,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Text(String),
    /// Field names after the leading `.`; empty for `{{.}}`
    Field(Vec<String>),
}

/// A parsed template
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut consumed = 0;

        while let Some(start) = rest.find(ACTION_OPEN) {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }

            let position = consumed + start;
            let body_start = start + ACTION_OPEN.len();
            let body_len = rest[body_start..]
                .find(ACTION_CLOSE)
                .ok_or_else(|| TemplateError::Parse {
                    position,
                    reason: "unclosed action".to_string(),
                })?;

            let body = rest[body_start..body_start + body_len].trim();
            let path = parse_field_path(body)
                .map_err(|reason| TemplateError::Parse { position, reason })?;
            segments.push(Segment::Field(path));

            let end = body_start + body_len + ACTION_CLOSE.len();
            consumed += end;
            rest = &rest[end..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Execute against a container record
    pub fn render(&self, container: &Container) -> Result<String, TemplateError> {
        let context = serde_json::to_value(container)?;
        self.render_value(&context)
    }

    fn render_value(&self, context: &Value) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(path) => write_value(&mut out, lookup(context, path)?),
            }
        }
        Ok(out)
    }
}

fn parse_field_path(body: &str) -> Result<Vec<String>, String> {
    if body.is_empty() {
        return Err("missing value for command".to_string());
    }
    if body == "." {
        return Ok(Vec::new());
    }

    let Some(path) = body.strip_prefix('.') else {
        return Err(format!("unsupported action {:?}", body));
    };

    path.split('.')
        .map(|name| {
            let valid = !name.is_empty()
                && name.chars().all(|c| c.is_alphanumeric() || c == '_');
            if valid {
                Ok(name.to_string())
            } else {
                Err(format!("bad field name {:?} in {:?}", name, body))
            }
        })
        .collect()
}

fn lookup<'v>(context: &'v Value, path: &[String]) -> Result<&'v Value, TemplateError> {
    let mut current = context;
    let mut walked = String::new();

    for name in path {
        walked.push('.');
        walked.push_str(name);
        current = match current {
            Value::Object(fields) => fields
                .get(name)
                .ok_or_else(|| TemplateError::MissingField(walked.clone()))?,
            _ => return Err(TemplateError::NotTraversable(walked)),
        };
    }

    Ok(current)
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("<nil>"),
        Value::String(s) => out.push_str(s),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => out.push_str(&value.to_string()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(out, item);
            }
            out.push(']');
        }
    }
}

/// Evaluate `template` against `container`.
///
/// Without a container or with an empty template the input comes back
/// unchanged. Parse and execution failures yield [`TemplateOutcome::Fallback`].
pub fn evaluate(template: &str, container: Option<&Container>) -> TemplateOutcome {
    let Some(container) = container else {
        return TemplateOutcome::Unchanged(template.to_string());
    };
    if template.is_empty() {
        return TemplateOutcome::Unchanged(String::new());
    }

    match Template::parse(template).and_then(|parsed| parsed.render(container)) {
        Ok(rendered) => TemplateOutcome::Rendered(rendered),
        Err(error) => TemplateOutcome::Fallback {
            original: template.to_string(),
            error,
        },
    }
}

/// Fail-open evaluation: the literal input is used when the template fails
pub fn evaluate_template_tags(template: &str, container: Option<&Container>) -> String {
    let outcome = evaluate(template, container);
    if let TemplateOutcome::Fallback { error, .. } = &outcome {
        warn!(template, error = %error, "template tags: unable to evaluate template against container");
    }
    outcome.into_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn container() -> Container {
        serde_json::from_value(json!({
            "Id": "test-id",
            "Image": "configs/test",
            "Config": {
                "Hostname": "testbox-1",
                "User": "testuser",
                "Env": ["A=1", "B=2"],
                "Labels": { "team": "core" }
            },
            "NetworkSettings": {
                "IPAddress": "172.17.0.3",
                "Networks": { "bridge": { "IPAddress": "172.17.0.3" } }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_no_container_is_noop() {
        let outcome = evaluate("a-{{.Config.Status}}", None);
        assert!(matches!(outcome, TemplateOutcome::Unchanged(_)));
        assert_eq!(outcome.value(), "a-{{.Config.Status}}");
    }

    #[test]
    fn test_empty_template_is_noop() {
        let container = container();
        let outcome = evaluate("", Some(&container));
        assert!(matches!(outcome, TemplateOutcome::Unchanged(_)));
        assert_eq!(outcome.value(), "");
    }

    #[test]
    fn test_invalid_template_falls_back() {
        let container = container();
        let outcome = evaluate("a-{{.Config.Status}", Some(&container));
        assert!(matches!(
            outcome,
            TemplateOutcome::Fallback { error: TemplateError::Parse { position: 2, .. }, .. }
        ));
        assert_eq!(outcome.value(), "a-{{.Config.Status}");
    }

    #[test]
    fn test_missing_field_falls_back() {
        let container = container();
        let outcome = evaluate("a-{{.Config.Status}}", Some(&container));
        assert!(outcome.is_fallback());
        assert_eq!(outcome.value(), "a-{{.Config.Status}}");
        assert_eq!(
            evaluate_template_tags("a-{{.Config.Status}}", Some(&container)),
            "a-{{.Config.Status}}"
        );
    }

    #[test]
    fn test_traversing_scalar_falls_back() {
        let container = container();
        let outcome = evaluate("{{.Image.Name}}", Some(&container));
        assert!(matches!(
            outcome,
            TemplateOutcome::Fallback { error: TemplateError::NotTraversable(_), .. }
        ));
    }

    #[test]
    fn test_unsupported_action_falls_back() {
        let container = container();
        assert!(evaluate("{{}}", Some(&container)).is_fallback());
        assert!(evaluate("{{ printf \"%s\" .Image }}", Some(&container)).is_fallback());
        assert!(evaluate("{{.Config..User}}", Some(&container)).is_fallback());
    }

    #[test]
    fn test_valid_template() {
        let container = container();
        let outcome = evaluate("a-{{.Config.Hostname}}", Some(&container));
        assert!(matches!(outcome, TemplateOutcome::Rendered(_)));
        assert_eq!(outcome.value(), "a-testbox-1");
    }

    #[test]
    fn test_valid_template_multiple_tags() {
        let container = container();
        assert_eq!(
            evaluate_template_tags(
                "a-{{.Config.Hostname}},b-{{ .Config.User }},c-{{.Image}}",
                Some(&container)
            ),
            "a-testbox-1,b-testuser,c-configs/test"
        );
    }

    #[test]
    fn test_nested_and_collection_values() {
        let container = container();
        assert_eq!(
            evaluate_template_tags("{{.NetworkSettings.Networks.bridge.IPAddress}}", Some(&container)),
            "172.17.0.3"
        );
        assert_eq!(evaluate_template_tags("{{.Config.Env}}", Some(&container)), "[A=1 B=2]");
        assert_eq!(evaluate_template_tags("id={{.ID}}", Some(&container)), "id=test-id");
    }

    #[test]
    fn test_parse_plain_text() {
        let template = Template::parse("no actions here }}").unwrap();
        assert_eq!(template.render(&container()).unwrap(), "no actions here }}");
    }
}
