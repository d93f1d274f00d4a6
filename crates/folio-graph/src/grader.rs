//! Per-chunk binary relevance grading.

use anyhow::Result;
use folio_llm::{ChatClient, ChatOptions, ChatRequest, Message};
use folio_types::{Chunk, LLMConfig};
use futures::future::join_all;
use std::sync::Arc;
use tracing::debug;

use crate::prompts::{render, GRADE_TEMPLATE};

#[derive(Debug, Clone, PartialEq)]
pub struct Grading {
    pub relevant: Vec<Chunk>,
    /// `relevant / graded`, 0 when nothing was graded
    pub confidence: f32,
}

pub struct RelevanceGrader {
    client: Arc<dyn ChatClient>,
    llm: LLMConfig,
    excerpt_chars: usize,
}

impl RelevanceGrader {
    pub fn new(client: Arc<dyn ChatClient>, llm: LLMConfig, excerpt_chars: usize) -> Self {
        Self {
            client,
            llm,
            excerpt_chars,
        }
    }

    /// Judge every chunk independently and concurrently. Order of the
    /// relevant chunks follows the input order.
    pub async fn grade(&self, query: &str, chunks: Vec<Chunk>) -> Result<Grading> {
        if chunks.is_empty() {
            return Ok(Grading {
                relevant: Vec::new(),
                confidence: 0.0,
            });
        }

        let verdicts = join_all(chunks.iter().map(|c| self.judge(query, c))).await;

        let total = chunks.len();
        let mut relevant = Vec::new();
        for (chunk, verdict) in chunks.into_iter().zip(verdicts) {
            if verdict? {
                relevant.push(chunk);
            }
        }

        let confidence = relevant.len() as f32 / total as f32;
        Ok(Grading {
            relevant,
            confidence,
        })
    }

    async fn judge(&self, query: &str, chunk: &Chunk) -> Result<bool> {
        let prompt = render(
            GRADE_TEMPLATE,
            &[("document", chunk.excerpt(self.excerpt_chars)), ("question", query)],
        );

        let mut options = ChatOptions::new().temperature(0.0);
        if let Some(max) = self.llm.max_tokens {
            options = options.max_tokens(max);
        }
        let request = ChatRequest::new(self.llm.model.clone(), vec![Message::human(prompt)])
            .with_options(options);

        let response = self.client.chat(request).await?;
        let relevant = is_affirmative(response.text());

        debug!(
            doc_id = %chunk.doc_id,
            chunk_index = chunk.chunk_index,
            relevant = relevant,
            "Graded chunk"
        );
        Ok(relevant)
    }
}

/// "yes", "Yes.", " YES" count; anything else is a no
fn is_affirmative(verdict: &str) -> bool {
    verdict
        .trim()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
        .starts_with("yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative(" Yes."));
        assert!(is_affirmative("\"YES\""));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("not relevant"));
    }
}
