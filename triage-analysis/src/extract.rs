//! JSON-shape extraction from raw model output.
//!
//! Providers sometimes wrap JSON with code fences or prose; slicing from
//! the first `{` to the last `}` is robust against both.

/// Extract the JSON object embedded in a model response, if any.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_object_passes_through() {
        assert_eq!(extract_json_object(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn fenced_object_is_unwrapped() {
        let raw = "Here is the result:\n```json\n{\"a\": 1}\n```\nDone.";
        assert_eq!(extract_json_object(raw), Some("{\"a\": 1}"));
    }

    #[test]
    fn missing_braces_yield_none() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }
}
