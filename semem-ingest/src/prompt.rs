//! Fixed prompt templates for the Ingestion Pipeline's LLM-driven stages
//! (`spec.md` §4.K: "Prompt the LLM per chunk to extract SemanticUnits" /
//! "prompt the LLM to produce Attribute summaries" / "LLM-generated
//! summary"). Grounded on `semem_concepts::prompt`'s system/user split,
//! one template per stage.

#[must_use]
pub fn unit_system_prompt() -> String {
    "# Role\n\n\
    You split a passage of text into self-contained semantic units: \
    sentence groups that each describe one coherent event, fact, or claim.\n\n\
    # Output Format\n\n\
    Respond with a JSON array of strings, each string the verbatim text of \
    one unit, in source order. Do not summarize or paraphrase; copy the \
    exact substrings. If the passage is already a single coherent unit, \
    return an array with one element containing the whole passage."
        .to_string()
}

#[must_use]
pub fn unit_user_prompt(chunk: &str) -> String {
    format!("# Text\n\n{chunk}\n\n# Task\n\nSplit into semantic units per the format above.")
}

#[must_use]
pub fn attribute_system_prompt() -> String {
    "# Role\n\n\
    You write a short factual summary describing one property of an entity, \
    given the text mentioning it.\n\n\
    # Output Format\n\n\
    Respond with a JSON object: {\"category\": \"...\", \"summary\": \"...\"}. \
    `category` is a short label for the kind of property (e.g. \"role\", \
    \"location\"); `summary` is one or two sentences, grounded only in the \
    given text."
        .to_string()
}

#[must_use]
pub fn attribute_user_prompt(entity_label: &str, context: &str) -> String {
    format!("# Entity\n\n{entity_label}\n\n# Context\n\n{context}\n\n# Task\n\nSummarize per the format above.")
}

#[must_use]
pub fn community_system_prompt() -> String {
    "# Role\n\n\
    You summarize a community of related entities detected in a knowledge \
    graph.\n\n\
    # Output Format\n\n\
    Respond with one or two sentences describing what the entities in this \
    community have in common. No preamble, no JSON."
        .to_string()
}

#[must_use]
pub fn community_user_prompt(member_labels: &[String]) -> String {
    format!("# Members\n\n{}\n\n# Task\n\nSummarize per the format above.", member_labels.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_user_prompt_embeds_the_chunk() {
        assert!(unit_user_prompt("hello world").contains("hello world"));
    }

    #[test]
    fn attribute_user_prompt_embeds_entity_and_context() {
        let prompt = attribute_user_prompt("Alice", "Alice works at Acme.");
        assert!(prompt.contains("Alice"));
        assert!(prompt.contains("works at Acme"));
    }

    #[test]
    fn community_user_prompt_joins_members() {
        let prompt = community_user_prompt(&["alice".to_string(), "bob".to_string()]);
        assert!(prompt.contains("alice, bob"));
    }
}
