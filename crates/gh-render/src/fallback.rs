//! Generic rendering for event kinds without a dedicated renderer.

use serde_json::Value;

use crate::error::RenderError;
use crate::message::{MessageField, NotificationMessage};

/// Dump the top-level keys of a payload as message fields.
pub fn render_generic(event: &str, body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| RenderError::invalid(event, e))?;
    let Value::Object(map) = value else {
        return Err(RenderError::NotAnObject);
    };

    let mut msg = NotificationMessage::new(title_case(event));
    for (key, value) in map {
        let rendered = match value {
            Value::Null => continue,
            Value::String(s) if s.is_empty() => continue,
            Value::String(s) => s,
            other => other.to_string(),
        };
        msg.fields.push(MessageField::new(title_case(&key), rendered));
    }
    Ok(msg)
}

/// "pull_request_review" -> "Pull Request Review"
pub fn title_case(s: &str) -> String {
    s.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(super::events::capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("branch_protection_rule"), "Branch Protection Rule");
        assert_eq!(title_case("ping"), "Ping");
        assert_eq!(title_case("__x__"), "X");
    }

    #[test]
    fn test_generic_dump() {
        let body = br#"{"action": "created", "rule": {"id": 1}, "hook_id": 7, "empty": "", "gone": null}"#;
        let msg = render_generic("branch_protection_rule", body).unwrap();

        assert_eq!(msg.title, "Branch Protection Rule");
        let names: Vec<_> = msg.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Action", "Hook Id", "Rule"]);
        assert_eq!(msg.fields[2].value, r#"{"id":1}"#);
    }

    #[test]
    fn test_generic_rejects_non_object() {
        assert!(matches!(
            render_generic("x", b"[1,2]"),
            Err(RenderError::NotAnObject)
        ));
        assert!(matches!(
            render_generic("x", b"not json"),
            Err(RenderError::InvalidPayload { .. })
        ));
    }
}
