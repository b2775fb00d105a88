//! Post-processing for reasoning-service responses.
//!
//! Models often wrap JSON answers in markdown code fences; every
//! JSON-parsing call site goes through [`parse_json_response`], which strips
//! the fencing first.

use serde::de::DeserializeOwned;

use deepq_types::{DeepqError, Result};

/// Strip a single surrounding markdown code fence, with or without a
/// language tag. Text without a fence is returned unchanged (trimmed).
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line, e.g. "json".
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse a service response as JSON after removing any code fencing.
/// `expected` names the shape being parsed, for the error message.
pub fn parse_json_response<T: DeserializeOwned>(text: &str, expected: &str) -> Result<T> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(cleaned).map_err(|e| DeepqError::Parse {
        expected: expected.into(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_tagged_fence() {
        let text = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(text), "{\"a\": 1}");
    }

    #[test]
    fn strips_untagged_fence() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(text), "{\"a\": 1}");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(strip_code_fences("  hello  "), "hello");
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn parses_fenced_object() {
        #[derive(serde::Deserialize)]
        struct Obj {
            a: u32,
        }
        let obj: Obj = parse_json_response("```json\n{\"a\": 7}\n```", "test").unwrap();
        assert_eq!(obj.a, 7);
    }

    #[test]
    fn parse_failure_names_expected_shape() {
        let err =
            parse_json_response::<serde_json::Value>("not json at all", "selection").unwrap_err();
        match err {
            DeepqError::Parse { expected, .. } => assert_eq!(expected, "selection"),
            other => panic!("Expected Parse error, got: {other:?}"),
        }
    }
}
