//! Prompt templates. Placeholders are replaced verbatim.

/// Grounded answer template; `{context}` and `{question}` are filled per request
pub const ANSWER_TEMPLATE: &str = "You are an expert legal assistant. Answer the question using only the context below.

Instructions:
1. Answer strictly from the context. Do not use outside knowledge.
2. Cite the specific legal authority found in the text (for example \"Article 6\" or \"Section 302\").
3. Format citations as: [Legal Reference] (Source: file, page).
4. If the context does not contain the answer, say: \"The provided context does not contain sufficient information to answer this question.\"

Context:
{context}

Question:
{question}

Answer:";

pub const MEMORY_HEADER: &str = "Conversation Memory:";

pub const NO_PREVIOUS_CONVERSATION: &str = "No previous conversation.";

/// Answer pre-set when retrieval found nothing usable
pub const NO_INFORMATION_ANSWER: &str =
    "I could not find relevant information in the provided document.";

pub const CONTEXTUALIZE_TEMPLATE: &str = "Given this conversation history:
{history}

Rewrite the following question to be standalone, including the necessary context from the history.
Question: {question}

Standalone question:";

pub const GRADE_TEMPLATE: &str = "You are grading whether a retrieved passage is relevant to a user question.
If the passage contains keywords or meaning related to the question, it is relevant.
Answer with a single word: yes or no.

Passage:
{document}

Question: {question}

Relevant:";

pub const TRANSFORM_TEMPLATE: &str = "The question below did not retrieve relevant passages from a legal document.
Rewrite it to be more specific and retrieval friendly: use exact legal terminology and disambiguate entities, keeping the original intent.
Reply with the rewritten question only.

Question: {question}

Rewritten question:";

pub const SUMMARIZE_TEMPLATE: &str = "Summarize the conversation above.";

pub const EXTEND_SUMMARY_TEMPLATE: &str = "Existing summary:
{summary}

Extend the summary using the new conversation above.";

/// Fill `{name}` placeholders
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_answer_template() {
        let prompt = render(
            ANSWER_TEMPLATE,
            &[("context", "[Source: code.pdf, page 2]\nArt. 121"), ("question", "Penalty?")],
        );
        assert!(prompt.contains("Art. 121"));
        assert!(prompt.contains("Question:\nPenalty?"));
        assert!(!prompt.contains("{context}"));
    }
}
