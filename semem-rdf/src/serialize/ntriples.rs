//! N-Triples serialization: one statement per line, no prefixes needed, so
//! this is the format the round-trip invariant (`spec.md` §4.B) is checked
//! against most directly.

use crate::error::{RdfError, Result};
use crate::triple::{Object, Triple};

#[must_use]
pub fn to_ntriples(triples: &[Triple]) -> String {
    triples.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

/// Parse N-Triples back into [`Triple`]s. Accepts the subset this crate
/// emits: `<s> <p> <o> .`, `<s> <p> "literal" .`,
/// `<s> <p> "literal"^^<datatype> .`, `<s> <p> "literal"@lang .`.
///
/// # Errors
/// Returns [`RdfError::Parse`] on a malformed line.
pub fn parse_ntriples(input: &str) -> Result<Vec<Triple>> {
    input.lines().map(str::trim).filter(|l| !l.is_empty()).map(parse_line).collect()
}

fn parse_line(line: &str) -> Result<Triple> {
    let line = line.strip_suffix(" .").ok_or_else(|| RdfError::Parse(format!("missing trailing ' .': {line}")))?;
    let (subject, rest) = take_iri(line)?;
    let rest = rest.trim_start();
    let (predicate, rest) = take_iri(rest)?;
    let object_str = rest.trim();
    let object = parse_object(object_str)?;
    Ok(Triple::new(subject, predicate, object))
}

fn take_iri(input: &str) -> Result<(String, &str)> {
    let input = input.trim_start();
    if !input.starts_with('<') {
        return Err(RdfError::Parse(format!("expected IRI: {input}")));
    }
    let end = input.find('>').ok_or_else(|| RdfError::Parse(format!("unterminated IRI: {input}")))?;
    Ok((input[1..end].to_string(), &input[end + 1..]))
}

fn parse_object(input: &str) -> Result<Object> {
    if input.starts_with('<') {
        let end = input.find('>').ok_or_else(|| RdfError::Parse(format!("unterminated IRI: {input}")))?;
        return Ok(Object::Iri(input[1..end].to_string()));
    }
    if !input.starts_with('"') {
        return Err(RdfError::Parse(format!("expected literal or IRI: {input}")));
    }
    let mut end = None;
    let bytes = input.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == b'"' {
            end = Some(i);
            break;
        }
        i += 1;
    }
    let end = end.ok_or_else(|| RdfError::Parse(format!("unterminated literal: {input}")))?;
    let value = unescape_literal(&input[1..end]);
    let suffix = &input[end + 1..];
    if let Some(lang) = suffix.strip_prefix('@') {
        return Ok(Object::Literal { value, datatype: None, language: Some(lang.to_string()) });
    }
    if let Some(dt) = suffix.strip_prefix("^^<") {
        let dt = dt.strip_suffix('>').ok_or_else(|| RdfError::Parse(format!("unterminated datatype IRI: {input}")))?;
        return Ok(Object::Literal { value, datatype: Some(dt.to_string()), language: None });
    }
    Ok(Object::Literal { value, datatype: None, language: None })
}

fn unescape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_iri_object() {
        let triples = vec![Triple::new("urn:s", "urn:p", Object::Iri("urn:o".to_string()))];
        let text = to_ntriples(&triples);
        let parsed = parse_ntriples(&text).unwrap();
        assert_eq!(parsed, triples);
    }

    #[test]
    fn round_trips_typed_literal() {
        let triples = vec![Triple::new("urn:s", "urn:p", Object::typed_literal("42", "http://www.w3.org/2001/XMLSchema#integer"))];
        let text = to_ntriples(&triples);
        let parsed = parse_ntriples(&text).unwrap();
        assert_eq!(parsed, triples);
    }

    #[test]
    fn round_trips_literal_with_escaped_quote() {
        let triples = vec![Triple::new("urn:s", "urn:p", Object::plain_literal("she said \"hi\""))];
        let text = to_ntriples(&triples);
        let parsed = parse_ntriples(&text).unwrap();
        assert_eq!(parsed, triples);
    }
}
