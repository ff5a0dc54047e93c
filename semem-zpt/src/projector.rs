//! Projection (`spec.md` §4.J "Projection: converts selected elements into
//! one of four representations"). Metadata carries the algorithm name and
//! generation time so a caller can tell which tilt produced the
//! projection and when.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::params::{OutputFormat, Tilt};
use crate::selection::SelectedItem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionMetadata {
    pub algorithm: &'static str,
    pub generated_at: DateTime<Utc>,
    pub item_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projection {
    pub format: OutputFormat,
    pub body: String,
    pub metadata: ProjectionMetadata,
}

/// Project `items` into `format`. `generated_at` is supplied by the caller
/// since the tool chain this workspace builds against may not stamp
/// timestamps from within library code.
#[must_use]
pub fn project(items: &[SelectedItem], format: OutputFormat, tilt: Tilt, generated_at: DateTime<Utc>) -> Projection {
    let body = match format {
        OutputFormat::Json => project_json(items),
        OutputFormat::Markdown => project_markdown(items),
        OutputFormat::Structured => project_structured(items),
        OutputFormat::Conversational => project_conversational(items),
        OutputFormat::Analytical => project_analytical(items),
    };

    Projection { format, body, metadata: ProjectionMetadata { algorithm: tilt_algorithm_name(tilt), generated_at, item_count: items.len() } }
}

fn tilt_algorithm_name(tilt: Tilt) -> &'static str {
    match tilt {
        Tilt::Keywords => "tf-idf",
        Tilt::Embedding => "ann-cosine",
        Tilt::Graph => "personalized-pagerank",
        Tilt::Temporal => "recency-weighted",
    }
}

fn project_json(items: &[SelectedItem]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn project_markdown(items: &[SelectedItem]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&format!("## {} ({:?})\n\n{}\n\n", item.uri, item.zoom, item.text));
    }
    out
}

fn project_structured(items: &[SelectedItem]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&format!("- uri: {}\n  zoom: {:?}\n  score: {:.4}\n  text: {}\n", item.uri, item.zoom, item.score, item.text));
    }
    out
}

fn project_conversational(items: &[SelectedItem]) -> String {
    items.iter().map(|item| item.text.clone()).collect::<Vec<_>>().join("\n\n")
}

fn project_analytical(items: &[SelectedItem]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} items\n", items.len()));
    for item in items {
        out.push_str(&format!("{:.4}\t{}\t{}\n", item.score, item.uri, item.text));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Zoom;

    fn sample_items() -> Vec<SelectedItem> {
        vec![SelectedItem { uri: "urn:e1".to_string(), text: "alice".to_string(), zoom: Zoom::Entity, score: 0.9 }]
    }

    #[test]
    fn json_projection_round_trips_as_valid_json() {
        let projection = project(&sample_items(), OutputFormat::Json, Tilt::Keywords, Utc::now());
        let parsed: serde_json::Value = serde_json::from_str(&projection.body).unwrap();
        assert!(parsed.is_array());
    }

    #[test]
    fn markdown_projection_includes_headings_per_element() {
        let projection = project(&sample_items(), OutputFormat::Markdown, Tilt::Graph, Utc::now());
        assert!(projection.body.starts_with("## urn:e1"));
        assert_eq!(projection.metadata.algorithm, "personalized-pagerank");
    }
}
