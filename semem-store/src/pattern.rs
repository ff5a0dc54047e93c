//! Triple pattern matching: the "subset of SPARQL SELECT semantics
//! sufficient for the patterns in §4.H and §4.K" (`spec.md` §4.C). Each of
//! `subject`/`predicate`/`object` is either bound (an exact match) or a
//! wildcard; a query returns one [`Binding`] per matching triple with the
//! wildcard positions filled in.

use std::collections::BTreeMap;

use semem_rdf::triple::{Object, Triple};

/// `None` means "match anything and bind it under `var`".
#[derive(Debug, Clone)]
pub struct TriplePattern {
    pub subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<Object>,
}

impl TriplePattern {
    #[must_use]
    pub fn any() -> Self {
        Self { subject: None, predicate: None, object: None }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    #[must_use]
    pub fn with_object(mut self, object: Object) -> Self {
        self.object = Some(object);
        self
    }

    #[must_use]
    pub fn matches(&self, triple: &Triple) -> bool {
        self.subject.as_deref().is_none_or_eq(triple.subject.as_str())
            && self.predicate.as_deref().is_none_or_eq(triple.predicate.as_str())
            && self.object.as_ref().is_none_or_eq(&triple.object)
    }

    /// A stable cache key for this pattern, used by the remote variant's
    /// read-through cache (`spec.md` §4.C: "keyed by the parameter hash of
    /// the executed pattern").
    #[must_use]
    pub fn fingerprint(&self, graph: &str) -> String {
        let payload = serde_json::json!({
            "graph": graph,
            "subject": self.subject,
            "predicate": self.predicate,
            "object": self.object,
        });
        semem_core::fingerprint::fingerprint(&payload)
    }

    /// Whether this pattern could match any triple the other pattern could
    /// match — used to invalidate overlapping cache entries on write
    /// (`spec.md` §4.C: "any write invalidates overlapping read-cache
    /// entries by pattern intersection").
    #[must_use]
    pub fn overlaps(&self, other: &TriplePattern) -> bool {
        positions_overlap(&self.subject, &other.subject) && positions_overlap(&self.predicate, &other.predicate) && objects_overlap(&self.object, &other.object)
    }
}

fn positions_overlap(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}

fn objects_overlap(a: &Option<Object>, b: &Option<Object>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}

trait OptionEqExt<T: PartialEq> {
    fn is_none_or_eq(&self, other: &T) -> bool;
}

impl<T: PartialEq> OptionEqExt<T> for Option<&T> {
    fn is_none_or_eq(&self, other: &T) -> bool {
        match self {
            Some(v) => *v == other,
            None => true,
        }
    }
}

/// A single matching triple reduced to its pattern's free variables.
pub type Binding = BTreeMap<String, String>;

#[must_use]
pub fn bind(pattern: &TriplePattern, triple: &Triple) -> Binding {
    let mut binding = BTreeMap::new();
    if pattern.subject.is_none() {
        binding.insert("subject".to_string(), triple.subject.clone());
    }
    if pattern.predicate.is_none() {
        binding.insert("predicate".to_string(), triple.predicate.clone());
    }
    if pattern.object.is_none() {
        let value = match &triple.object {
            Object::Iri(iri) => iri.clone(),
            Object::Literal { value, .. } => value.clone(),
        };
        binding.insert("object".to_string(), value);
    }
    binding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_pattern_matches_everything() {
        let triple = Triple::new("s", "p", Object::plain_literal("o"));
        assert!(TriplePattern::any().matches(&triple));
    }

    #[test]
    fn bound_subject_filters_non_matches() {
        let triple = Triple::new("s", "p", Object::plain_literal("o"));
        let pattern = TriplePattern::any().with_subject("other");
        assert!(!pattern.matches(&triple));
    }

    #[test]
    fn overlapping_patterns_on_disjoint_subjects_do_not_overlap() {
        let a = TriplePattern::any().with_subject("s1");
        let b = TriplePattern::any().with_subject("s2");
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn wildcard_pattern_overlaps_any_bound_pattern() {
        let a = TriplePattern::any();
        let b = TriplePattern::any().with_subject("s1");
        assert!(a.overlaps(&b));
    }
}
