//! Grounded answer generation.
//!
//! An answer generator turns a question and a retrieved context into a
//! natural-language answer. The contract is strict grounding: with no
//! usable context the generator refuses with [`NO_CONTEXT_ANSWER`], and
//! the prompt instructs the model to answer only from the supplied
//! context.

use async_trait::async_trait;

/// The fixed refusal answer returned when no context is available or the
/// context cannot answer the question.
pub const NO_CONTEXT_ANSWER: &str = "No context about this question.";

/// Default system prompt enforcing grounding and brevity.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a retrieval-augmented assistant.\n\
You must answer only using the information in the Context section.\n\
If the context contains information that can reasonably answer the question \
(even if wording is slightly different), use it to answer.\n\
If the context does not contain any information that can help answer the question,\n\
reply exactly with: \"No context about this question.\".\n\
Keep answers short and focused (1-3 sentences). Do not add introductions or closing remarks.\n\
Never guess, speculate, or use outside knowledge beyond the provided context.";

/// Generates a grounded answer from a question and retrieved context.
///
/// Implementations never surface transport errors to the caller: an empty
/// context produces [`NO_CONTEXT_ANSWER`] without a model call, and a
/// failed model call produces an error-prefixed answer string.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer to `question` using only `context`.
    async fn generate(&self, question: &str, context: &str) -> String;

    /// The model identifier answering queries.
    fn model_name(&self) -> &str;
}

/// Assemble the single grounding-instructed prompt sent to the model.
pub fn grounding_prompt(system_prompt: &str, context: &str, question: &str) -> String {
    format!("{system_prompt}\n\nContext:\n{context}\n\nQuestion: {question}\n\nAnswer:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_all_sections_in_order() {
        let prompt = grounding_prompt("SYSTEM", "the context body", "the question?");

        let system_pos = prompt.find("SYSTEM").unwrap();
        let context_pos = prompt.find("Context:\nthe context body").unwrap();
        let question_pos = prompt.find("Question: the question?").unwrap();
        assert!(system_pos < context_pos);
        assert!(context_pos < question_pos);
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn default_system_prompt_names_the_refusal_verbatim() {
        assert!(DEFAULT_SYSTEM_PROMPT.contains(NO_CONTEXT_ANSWER));
    }
}
