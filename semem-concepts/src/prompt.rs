//! Fixed prompt template for concept extraction (`spec.md` §4.E: "Uses an
//! LLM via a fixed prompt template that requests a structured list").
//! Grounded on `llmspell-memory::consolidation::prompts::ConsolidationPromptBuilder`'s
//! system/user prompt split and few-shot style, reduced to the single fixed
//! template this operation needs (no format/version selection — concept
//! extraction always asks for the same shape of output).

/// System prompt instructing the model to return a numbered list of
/// concepts and, optionally, a JSON array of `(subject, predicate, object)`
/// triples over those concepts.
#[must_use]
pub fn system_prompt() -> String {
    "# Role\n\n\
    You extract the key concepts mentioned in a piece of text, and any clear \
    relationships between those concepts.\n\n\
    # Output Format\n\n\
    Respond with:\n\
    1. A numbered list of concepts, one per line, lowercase, each a short \
    noun phrase (2-4 words).\n\
    2. Optionally, a `Relationships:` section followed by a JSON array of \
    `{\"subject\": \"...\", \"predicate\": \"...\", \"object\": \"...\"}` \
    objects, where `subject` and `object` are concepts from the list above.\n\n\
    If the text has no extractable concepts, respond with an empty list.\n\n\
    # Example\n\n\
    Text: \"Rust is a systems programming language with memory safety.\"\n\n\
    Output:\n\
    1. rust\n\
    2. systems programming language\n\
    3. memory safety\n\n\
    Relationships:\n\
    [{\"subject\": \"rust\", \"predicate\": \"is_a\", \"object\": \"systems programming language\"}, \
    {\"subject\": \"rust\", \"predicate\": \"has_feature\", \"object\": \"memory safety\"}]"
        .to_string()
}

/// User prompt wrapping the input text.
#[must_use]
pub fn user_prompt(text: &str) -> String {
    format!("# Text\n\n{text}\n\n# Task\n\nExtract the concepts and relationships per the format above.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_names_the_output_shape() {
        let prompt = system_prompt();
        assert!(prompt.contains("numbered list"));
        assert!(prompt.contains("Relationships"));
    }

    #[test]
    fn user_prompt_embeds_the_text() {
        let prompt = user_prompt("hello world");
        assert!(prompt.contains("hello world"));
    }
}
