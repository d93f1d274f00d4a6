use anyhow::Result;
use folio_llm::{ChatClient, ChatOptions, ChatRequest, Message};
use folio_types::LLMConfig;
use std::sync::Arc;

use crate::prompts::{render, TRANSFORM_TEMPLATE};

/// Rewrites a query toward retrieval-friendly phrasing for the corrective retry
pub struct QueryTransformer {
    client: Arc<dyn ChatClient>,
    llm: LLMConfig,
}

impl QueryTransformer {
    pub fn new(client: Arc<dyn ChatClient>, llm: LLMConfig) -> Self {
        Self { client, llm }
    }

    /// Falls back to the original query if the model returns nothing
    pub async fn transform(&self, query: &str) -> Result<String> {
        let prompt = render(TRANSFORM_TEMPLATE, &[("question", query)]);
        let mut options = ChatOptions::new();
        if let Some(temp) = self.llm.temperature {
            options = options.temperature(temp);
        }
        let request = ChatRequest::new(self.llm.model.clone(), vec![Message::human(prompt)])
            .with_options(options);

        let response = self.client.chat(request).await?;
        let rewritten = response.text().trim();

        Ok(if rewritten.is_empty() {
            query.to_string()
        } else {
            rewritten.to_string()
        })
    }
}
