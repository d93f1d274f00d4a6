use config::{Config as ConfigLoader, ConfigError, Environment, File};
use folio_types::RagConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub rag: RagConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    pub logging: LoggingConfig,
    pub uploads: UploadsConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub mongodb_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds before a request is cut off, streaming included
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub embedding_model: String,
    pub temperature: f32,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl From<&LlmConfig> for folio_types::LLMConfig {
    fn from(config: &LlmConfig) -> Self {
        folio_types::LLMConfig::new(config.model.clone()).with_temperature(config.temperature)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotaConfig {
    /// Lifetime tokens per user; requests are refused once reached
    pub token_limit: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self { token_limit: 10_000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    pub directory: PathBuf,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_max_bytes() -> usize {
    25 * 1024 * 1024
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (with SERVER_, LLM_, RAG_, STORAGE_, LOG_ prefixes)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        for prefix in ["SERVER", "LLM", "RAG", "STORAGE", "LOG"] {
            builder = builder.add_source(
                Environment::default()
                    .prefix(prefix)
                    .separator("_")
                    .try_parsing(true),
            );
        }

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        cfg.openai_api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ConfigError::Message("OPENAI_API_KEY environment variable is required".to_string())
        })?;
        cfg.mongodb_uri = std::env::var("MONGODB_URI").ok();

        if cfg.storage.backend == StorageBackend::Mongodb && cfg.mongodb_uri.is_none() {
            return Err(ConfigError::Message(
                "MONGODB_URI is required when storage.backend = \"mongodb\"".to_string(),
            ));
        }

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8000

        [cors]
        enabled = true
        origins = ["http://localhost:5173"]

        [llm]
        model = "gpt-4o-mini"
        embedding_model = "text-embedding-3-small"
        temperature = 0.0

        [rag]
        retry_budget = 2

        [storage]
        backend = "memory"
        database = "folio"

        [logging]
        level = "debug"
        format = "json"

        [uploads]
        directory = "uploaded_docs"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(TOML).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.timeout_secs, 300);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.uploads.directory, PathBuf::from("uploaded_docs"));
    }

    #[test]
    fn test_partial_rag_section_and_quota_default() {
        let config: Config = toml::from_str(TOML).unwrap();
        assert_eq!(config.rag.retry_budget, 2);
        assert_eq!(config.rag.fused_top_n, 4);
        assert_eq!(config.quota.token_limit, 10_000);
    }

    #[test]
    fn test_llm_section_maps_to_request_config() {
        let config: Config = toml::from_str(TOML).unwrap();
        let llm = folio_types::LLMConfig::from(&config.llm);
        assert_eq!(llm.model, "gpt-4o-mini");
        assert_eq!(llm.temperature, Some(0.0));
    }
}
