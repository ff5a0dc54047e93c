//! Core memory item type (`spec.md` §3 "Interaction"). Grounded on
//! `llmspell-memory::types::EpisodicEntry`'s field shape, generalized to
//! carry the decay/tiering fields `spec.md` §4.F needs directly on the
//! item rather than in a side table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Which tier an [`Interaction`] currently lives in (`spec.md` §4.F
/// "Tiering").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Short,
    Long,
}

/// A single ingested prompt/response pair (`spec.md` §3: "Interaction
/// (memory item)"). Invariants: `|embedding| = d`; `0 < decay_factor`;
/// `access_count >= 0`; `last_accessed >= timestamp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(default = "generate_id")]
    pub id: String,
    pub prompt: String,
    pub response: String,
    pub embedding: Vec<f32>,
    pub concepts: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u32,
    pub decay_factor: f64,
    pub tier: Tier,
    #[serde(default)]
    pub metadata: Value,
}

impl Interaction {
    #[must_use]
    pub fn new(prompt: String, response: String, embedding: Vec<f32>, concepts: Vec<String>, metadata: Value) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            prompt,
            response,
            embedding,
            concepts,
            timestamp: now,
            last_accessed: now,
            access_count: 0,
            decay_factor: 1.0,
            tier: Tier::Short,
            metadata,
        }
    }
}

/// Emitted on [`crate::store::MemoryStore::add`] (`spec.md` §4.F step 4).
#[derive(Debug, Clone)]
pub struct InteractionAdded {
    pub id: String,
}

/// One retrieval hit with its component sub-scores (`spec.md` §4.F step 5:
/// "Return top-k, each marked with sub-scores").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredInteraction {
    pub interaction: Interaction,
    pub similarity: f32,
    pub concept_score: f64,
    pub score: f64,
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
