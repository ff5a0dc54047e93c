//! Turtle serialization via `rio_turtle`/`rio_api`, the same crates
//! `samyama-ai-samyama-graph/src/rdf/serialization/turtle.rs` uses. This
//! crate's [`crate::triple::Triple`] has no blank nodes, which drops most of
//! that file's subject/object branching.

use rio_api::formatter::TriplesFormatter;
use rio_api::model as rio_model;
use rio_api::parser::TriplesParser;
use rio_turtle::{TurtleFormatter, TurtleParser};
use std::io::{BufReader, Cursor};

use crate::error::{RdfError, Result};
use crate::triple::{Object, Triple};

/// # Errors
/// Returns [`RdfError::Serialize`] if the underlying formatter fails (only
/// possible on I/O errors from the in-memory buffer, never in practice).
pub fn to_turtle(triples: &[Triple]) -> Result<String> {
    let mut output = Vec::new();
    let mut formatter = TurtleFormatter::new(&mut output);

    for triple in triples {
        let subject = rio_model::Subject::NamedNode(rio_model::NamedNode { iri: &triple.subject });
        let predicate = rio_model::NamedNode { iri: &triple.predicate };
        let dt_holder;
        let object = match &triple.object {
            Object::Iri(iri) => rio_model::Term::NamedNode(rio_model::NamedNode { iri }),
            Object::Literal { value, datatype: Some(dt), .. } => {
                dt_holder = rio_model::NamedNode { iri: dt };
                rio_model::Term::Literal(rio_model::Literal::Typed { value, datatype: dt_holder })
            }
            Object::Literal { value, language: Some(lang), .. } => {
                rio_model::Term::Literal(rio_model::Literal::LanguageTaggedString { value, language: lang })
            }
            Object::Literal { value, .. } => rio_model::Term::Literal(rio_model::Literal::Simple { value }),
        };

        formatter
            .format(&rio_model::Triple { subject, predicate, object })
            .map_err(|e| RdfError::Serialize(e.to_string()))?;
    }

    let bytes = formatter.finish().map_err(|e| RdfError::Serialize(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| RdfError::Serialize(e.to_string()))
}

/// # Errors
/// Returns [`RdfError::Parse`] on malformed Turtle, or if a parsed triple
/// contains a blank node (unsupported by this crate's Element model).
pub fn parse_turtle(input: &str) -> Result<Vec<Triple>> {
    let cursor = Cursor::new(input);
    let mut reader = BufReader::new(cursor);
    let mut parser = TurtleParser::new(&mut reader, None);
    let mut triples = Vec::new();

    parser
        .parse_all(&mut |t| {
            let subject = match t.subject {
                rio_model::Subject::NamedNode(n) => n.iri.to_string(),
                rio_model::Subject::BlankNode(_) => return io_err("blank node subjects are not supported"),
                rio_model::Subject::Triple(_) => return io_err("RDF-star subjects are not supported"),
            };
            let predicate = t.predicate.iri.to_string();
            let object = match t.object {
                rio_model::Term::NamedNode(n) => Object::Iri(n.iri.to_string()),
                rio_model::Term::BlankNode(_) => return io_err("blank node objects are not supported"),
                rio_model::Term::Literal(lit) => match lit {
                    rio_model::Literal::Simple { value } => Object::plain_literal(value),
                    rio_model::Literal::LanguageTaggedString { value, language } => {
                        Object::Literal { value: value.to_string(), datatype: None, language: Some(language.to_string()) }
                    }
                    rio_model::Literal::Typed { value, datatype } => Object::typed_literal(value, datatype.iri),
                },
                rio_model::Term::Triple(_) => return io_err("RDF-star objects are not supported"),
            };
            triples.push(Triple::new(subject, predicate, object));
            Ok(())
        })
        .map_err(|e: rio_turtle::TurtleError| RdfError::Parse(e.to_string()))?;

    Ok(triples)
}

fn io_err(msg: &str) -> std::result::Result<(), std::io::Error> {
    Err(std::io::Error::new(std::io::ErrorKind::InvalidData, msg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_simple_triple() {
        let triples = vec![Triple::new("urn:s", "urn:p", Object::plain_literal("hello"))];
        let text = to_turtle(&triples).unwrap();
        let parsed = parse_turtle(&text).unwrap();
        assert_eq!(parsed, triples);
    }

    #[test]
    fn round_trips_iri_object() {
        let triples = vec![Triple::new("urn:s", "urn:p", Object::Iri("urn:o".to_string()))];
        let text = to_turtle(&triples).unwrap();
        let parsed = parse_turtle(&text).unwrap();
        assert_eq!(parsed, triples);
    }
}
