//! Retrieval-augmented prompt construction.
//!
//! Pure string assembly: a fixed system instruction, a context section built
//! from ranked passages, and the literal user query. No external calls.

use crate::models::{AugmentedPrompt, RankedPassage};

/// The refusal sentence the model is instructed to emit when the supplied
/// passages are insufficient. Also returned directly by the orchestrator on
/// the no-context path, so the two must stay identical.
pub const REFUSAL_SENTENCE: &str =
    "I don't have enough information to answer this question based on the provided context.";

/// Emitted in place of the context section when no usable passage exists.
pub const NO_PASSAGES_LINE: &str = "No relevant passages were found.";

const INSTRUCTION: &str = "You are an assistant that answers questions using only the passages \
provided below. Do not use outside knowledge. If the passages do not contain enough information \
to answer, reply exactly: \"I don't have enough information to answer this question based on the \
provided context.\"";

const SEPARATOR: &str = "---";

/// Assemble the structured prompt from ranked passages and the user query.
///
/// Passages with empty or whitespace-only text are skipped; the `[Passage N]`
/// label numbers the passages actually emitted, starting at 1. When no
/// passage survives, the context section is the fixed
/// [`NO_PASSAGES_LINE`] instead.
pub fn build_prompt(ranked: &[RankedPassage], query: &str) -> AugmentedPrompt {
    let context_blocks: Vec<String> = ranked
        .iter()
        .filter(|p| !p.text.trim().is_empty())
        .enumerate()
        .map(|(i, p)| format!("{}\n[Passage {}]\n{}\n{}", SEPARATOR, i + 1, p.text.trim(), SEPARATOR))
        .collect();

    AugmentedPrompt {
        instruction: INSTRUCTION.to_string(),
        context_blocks,
        query: query.to_string(),
    }
}

/// Render the three prompt sections to the single string sent to the
/// completion provider. Deterministic for identical inputs.
pub fn compose(ranked: &[RankedPassage], query: &str) -> String {
    let prompt = build_prompt(ranked, query);

    let context = if prompt.context_blocks.is_empty() {
        NO_PASSAGES_LINE.to_string()
    } else {
        prompt.context_blocks.join("\n")
    };

    format!(
        "{}\n\nContext:\n{}\n\nQuestion: {}",
        prompt.instruction, context, prompt.query
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoredPassage;

    fn passage(id: &str, text: &str) -> ScoredPassage {
        ScoredPassage {
            id: id.to_string(),
            text: text.to_string(),
            score: 0.8,
            metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let ranked = vec![passage("a", "Quarterly revenue grew.")];
        let prompt = compose(&ranked, "What happened to revenue?");

        let instruction_pos = prompt.find("answers questions using only").unwrap();
        let context_pos = prompt.find("[Passage 1]").unwrap();
        let query_pos = prompt.find("Question: What happened to revenue?").unwrap();
        assert!(instruction_pos < context_pos);
        assert!(context_pos < query_pos);
    }

    #[test]
    fn test_passages_labelled_in_order() {
        let ranked = vec![passage("a", "First passage."), passage("b", "Second passage.")];
        let prompt = compose(&ranked, "q");
        assert!(prompt.contains("[Passage 1]\nFirst passage."));
        assert!(prompt.contains("[Passage 2]\nSecond passage."));
    }

    #[test]
    fn test_blank_passages_skipped_and_numbering_compacted() {
        let ranked = vec![
            passage("a", "Kept."),
            passage("b", "   "),
            passage("c", "Also kept."),
        ];
        let prompt = compose(&ranked, "q");
        assert!(prompt.contains("[Passage 1]\nKept."));
        assert!(prompt.contains("[Passage 2]\nAlso kept."));
        assert!(!prompt.contains("[Passage 3]"));
    }

    #[test]
    fn test_empty_passages_emit_fixed_line_and_query() {
        let prompt = compose(&[], "where is the meeting?");
        assert!(prompt.contains(NO_PASSAGES_LINE));
        assert!(prompt.contains("where is the meeting?"));
    }

    #[test]
    fn test_all_blank_passages_same_as_empty() {
        let ranked = vec![passage("a", ""), passage("b", "  \n ")];
        let prompt = compose(&ranked, "q");
        assert!(prompt.contains(NO_PASSAGES_LINE));
    }

    #[test]
    fn test_instruction_embeds_refusal_sentence() {
        let prompt = compose(&[], "q");
        assert!(prompt.contains(REFUSAL_SENTENCE));
    }

    #[test]
    fn test_deterministic() {
        let ranked = vec![passage("a", "One."), passage("b", "Two.")];
        assert_eq!(compose(&ranked, "q"), compose(&ranked, "q"));
    }
}
