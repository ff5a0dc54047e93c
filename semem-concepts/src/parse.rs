//! Lenient parsing of LLM extraction output (`spec.md` §4.E: "the output is
//! parsed leniently (accepts numbered, bulleted, or JSON forms) and
//! validated (non-empty tokens, length ≤ configured max). On parse
//! failure, returns the empty set — never throws").

use serde::Deserialize;
use serde_json::Value;

/// A `(subject, predicate, object)` relationship over two concept tokens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConceptTriple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// Result of extracting concepts (and optional relationships) from one
/// piece of text. Always a valid value, even on total parse failure —
/// in that case `concepts` and `triples` are both empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    pub concepts: Vec<String>,
    pub triples: Vec<ConceptTriple>,
}

#[derive(Debug, Deserialize)]
struct JsonForm {
    #[serde(default)]
    concepts: Vec<String>,
    #[serde(default)]
    relationships: Vec<ConceptTriple>,
}

/// Parse a raw LLM response into validated, deduplicated, lowercased
/// concept tokens and relationship triples over them.
#[must_use]
pub fn parse_response(raw: &str, max_token_length: usize, max_tokens: usize) -> ExtractionResult {
    let (raw_concepts, raw_triples) = extract_raw(raw);

    let mut seen = std::collections::HashSet::new();
    let mut concepts = Vec::new();
    for token in raw_concepts {
        let normalized = token.trim().to_lowercase();
        if normalized.is_empty() || normalized.len() > max_token_length {
            continue;
        }
        if seen.insert(normalized.clone()) {
            concepts.push(normalized);
            if concepts.len() >= max_tokens {
                break;
            }
        }
    }

    let concept_set: std::collections::HashSet<&str> = concepts.iter().map(String::as_str).collect();
    let triples = raw_triples
        .into_iter()
        .map(|t| ConceptTriple {
            subject: t.subject.trim().to_lowercase(),
            predicate: t.predicate.trim().to_lowercase(),
            object: t.object.trim().to_lowercase(),
        })
        .filter(|t| concept_set.contains(t.subject.as_str()) && concept_set.contains(t.object.as_str()))
        .collect();

    ExtractionResult { concepts, triples }
}

/// Try JSON first (either `{"concepts": [...], "relationships": [...]}` or
/// a bare array of strings), then fall back to numbered/bulleted text with
/// an optional trailing `Relationships:` JSON array.
fn extract_raw(raw: &str) -> (Vec<String>, Vec<ConceptTriple>) {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Value::Array(items) = &value {
            let concepts = items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect();
            return (concepts, Vec::new());
        }
        if let Ok(form) = serde_json::from_value::<JsonForm>(value) {
            return (form.concepts, form.relationships);
        }
        return (Vec::new(), Vec::new());
    }

    let (concept_section, relationship_section) = split_relationship_section(trimmed);
    let concepts = concept_section.lines().filter_map(strip_list_marker).collect();
    let triples = relationship_section
        .and_then(|section| find_json_array(section))
        .and_then(|array| serde_json::from_str::<Vec<ConceptTriple>>(array).ok())
        .unwrap_or_default();

    (concepts, triples)
}

/// Split on a line containing "relationships" (case-insensitive); returns
/// the concept-list text and, if found, the text from that line onward.
fn split_relationship_section(text: &str) -> (&str, Option<&str>) {
    if let Some(idx) = text.to_lowercase().find("relationships") {
        (&text[..idx], Some(&text[idx..]))
    } else {
        (text, None)
    }
}

/// Extract the first balanced top-level `[...]` substring, for locating a
/// JSON array embedded in otherwise free-form text.
fn find_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0i32;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip a leading numbering ("1.", "1)") or bullet ("-", "*", "•") marker
/// from a line. Returns `None` if the line has neither marker — a line
/// that isn't clearly a list item is not treated as a concept, even if
/// the rest of the text parses as a list.
fn strip_list_marker(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let without_bullet = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('*'))
        .or_else(|| trimmed.strip_prefix('\u{2022}'));

    let without_marker = if let Some(rest) = without_bullet {
        rest
    } else {
        let digits_consumed = trimmed.chars().take_while(char::is_ascii_digit).count();
        if digits_consumed == 0 {
            return None;
        }
        trimmed[digits_consumed..].trim_start_matches(['.', ')'])
    };

    let content = without_marker.trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbered_list() {
        let result = parse_response("1. Rust\n2. Memory Safety\n3. Rust", 64, 32);
        assert_eq!(result.concepts, vec!["rust", "memory safety"]);
    }

    #[test]
    fn parses_bulleted_list() {
        let result = parse_response("- rust\n* cargo\n\u{2022} tokio", 64, 32);
        assert_eq!(result.concepts, vec!["rust", "cargo", "tokio"]);
    }

    #[test]
    fn parses_bare_json_array() {
        let result = parse_response(r#"["rust", "cargo"]"#, 64, 32);
        assert_eq!(result.concepts, vec!["rust", "cargo"]);
    }

    #[test]
    fn parses_json_object_with_relationships() {
        let raw = r#"{"concepts": ["rust", "memory safety"], "relationships": [{"subject": "rust", "predicate": "has_feature", "object": "memory safety"}]}"#;
        let result = parse_response(raw, 64, 32);
        assert_eq!(result.concepts, vec!["rust", "memory safety"]);
        assert_eq!(result.triples.len(), 1);
    }

    #[test]
    fn parses_numbered_list_with_trailing_relationships_json() {
        let raw = "1. rust\n2. memory safety\n\nRelationships:\n[{\"subject\": \"rust\", \"predicate\": \"has_feature\", \"object\": \"memory safety\"}]";
        let result = parse_response(raw, 64, 32);
        assert_eq!(result.concepts, vec!["rust", "memory safety"]);
        assert_eq!(result.triples[0].predicate, "has_feature");
    }

    #[test]
    fn drops_triples_referencing_unknown_concepts() {
        let raw = r#"{"concepts": ["rust"], "relationships": [{"subject": "rust", "predicate": "is_a", "object": "python"}]}"#;
        let result = parse_response(raw, 64, 32);
        assert!(result.triples.is_empty());
    }

    #[test]
    fn rejects_overlong_tokens() {
        let long = "x".repeat(100);
        let result = parse_response(&format!("1. {long}\n2. ok"), 64, 32);
        assert_eq!(result.concepts, vec!["ok"]);
    }

    #[test]
    fn truncates_to_max_tokens() {
        let raw = "1. a\n2. b\n3. c\n4. d";
        let result = parse_response(raw, 64, 2);
        assert_eq!(result.concepts.len(), 2);
    }

    #[test]
    fn malformed_input_returns_empty_set() {
        let result = parse_response("", 64, 32);
        assert!(result.concepts.is_empty());
        assert!(result.triples.is_empty());
    }

    #[test]
    fn garbage_text_with_no_list_markers_yields_no_concepts() {
        let result = parse_response("the weather is nice today", 64, 32);
        assert!(result.concepts.is_empty());
    }
}
