//! Lenient parsing of the unit-split and attribute-summary LLM responses
//! (`spec.md` §4.K), following the same "never throws, degrade instead"
//! discipline as `semem_concepts::parse::parse_response`.

use serde::Deserialize;
use serde_json::Value;

/// Parse a JSON array of unit strings. Falls back to treating the whole
/// `chunk` as one unit when the response isn't a non-empty JSON array of
/// strings — `decompose` must never drop a chunk entirely.
#[must_use]
pub fn parse_units(raw: &str, chunk: &str) -> Vec<String> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw.trim()) {
        let units: Vec<String> = items.iter().filter_map(|v| v.as_str().map(str::to_string)).filter(|s| !s.trim().is_empty()).collect();
        if !units.is_empty() {
            return units;
        }
    }
    if chunk.trim().is_empty() {
        Vec::new()
    } else {
        vec![chunk.to_string()]
    }
}

#[derive(Debug, Deserialize)]
struct AttributeForm {
    category: String,
    summary: String,
}

/// Parse `{"category": ..., "summary": ...}`. Returns `None` on any parse
/// failure or empty summary — `augment` simply skips that entity's
/// Attribute rather than persisting a degenerate one.
#[must_use]
pub fn parse_attribute(raw: &str) -> Option<(String, String)> {
    let form: AttributeForm = serde_json::from_str(raw.trim()).ok()?;
    if form.summary.trim().is_empty() {
        return None;
    }
    Some((form.category, form.summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_array_of_units() {
        let units = parse_units(r#"["first unit.", "second unit."]"#, "ignored");
        assert_eq!(units, vec!["first unit.".to_string(), "second unit.".to_string()]);
    }

    #[test]
    fn falls_back_to_whole_chunk_on_malformed_response() {
        let units = parse_units("not json", "the whole chunk");
        assert_eq!(units, vec!["the whole chunk".to_string()]);
    }

    #[test]
    fn empty_chunk_yields_no_units_even_on_fallback() {
        let units = parse_units("not json", "   ");
        assert!(units.is_empty());
    }

    #[test]
    fn parses_attribute_object() {
        let (category, summary) = parse_attribute(r#"{"category": "role", "summary": "Alice is an engineer."}"#).unwrap();
        assert_eq!(category, "role");
        assert_eq!(summary, "Alice is an engineer.");
    }

    #[test]
    fn malformed_attribute_response_yields_none() {
        assert!(parse_attribute("not json").is_none());
    }
}
