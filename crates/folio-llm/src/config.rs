// Configuration layer for provider client creation

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openai::OpenAIClient;
use crate::traits::{ChatClient, EmbeddingClient};

/// Configuration for an OpenAI-compatible provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    /// Base URL for the API (optional, defaults to https://api.openai.com/v1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            embedding_model: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }
}

/// Factory for creating process-wide clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    fn build(config: OpenAIConfig) -> Result<OpenAIClient> {
        let mut client = OpenAIClient::new(config.api_key)?;
        if let Some(base_url) = config.base_url {
            client = client.with_base_url(base_url);
        }
        if let Some(model) = config.embedding_model {
            client = client.with_embedding_model(model);
        }
        Ok(client)
    }

    /// One client serving both capabilities
    pub fn create_clients(
        config: OpenAIConfig,
    ) -> Result<(Arc<dyn ChatClient>, Arc<dyn EmbeddingClient>)> {
        let client = Arc::new(Self::build(config)?);
        Ok((client.clone(), client))
    }

    pub fn create_chat_client(config: OpenAIConfig) -> Result<Arc<dyn ChatClient>> {
        Ok(Arc::new(Self::build(config)?))
    }

    pub fn create_embedding_client(config: OpenAIConfig) -> Result<Arc<dyn EmbeddingClient>> {
        Ok(Arc::new(Self::build(config)?))
    }
}
