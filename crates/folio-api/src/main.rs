use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_api::{
    config::{Config, StorageBackend},
    routes::build_router,
    state::AppState,
};
use folio_graph::Workflow;
use folio_llm::{ClientFactory, OpenAIConfig};
use folio_persist::{InMemoryPersistenceClient, MongoPersistenceClient, PersistenceClient};
use folio_retrieval::{InMemoryVectorIndex, MongoVectorIndex, VectorIndex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Folio API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    tracing::info!("Initializing LLM clients");
    let mut openai = OpenAIConfig::new(config.openai_api_key.clone())
        .with_embedding_model(config.llm.embedding_model.clone());
    if let Some(base_url) = &config.llm.base_url {
        openai = openai.with_base_url(base_url.clone());
    }
    let (chat_client, embedding_client) = ClientFactory::create_clients(openai)?;

    // Rows and vectors live in the same backend, so neither outlives the other
    let (persist, vectors): (Arc<dyn PersistenceClient>, Arc<dyn VectorIndex>) =
        match config.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; nothing survives a restart");
                (
                    Arc::new(InMemoryPersistenceClient::new()),
                    Arc::new(InMemoryVectorIndex::new()),
                )
            }
            StorageBackend::Mongodb => {
                tracing::info!("Connecting to MongoDB");
                let uri = config
                    .mongodb_uri
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("MONGODB_URI is not set"))?;
                let database = &config.storage.database;
                (
                    Arc::new(MongoPersistenceClient::connect(uri, database).await?),
                    Arc::new(MongoVectorIndex::connect(uri, database).await?),
                )
            }
        };

    tokio::fs::create_dir_all(&config.uploads.directory).await?;

    tracing::info!("Initializing workflow");
    let workflow = Workflow::builder()
        .chat_client(chat_client)
        .embedding_client(embedding_client)
        .persistence(persist.clone())
        .vector_index(vectors)
        .llm_config((&config.llm).into())
        .rag_config(config.rag.clone())
        .build()?;

    let state = Arc::new(AppState::new(config.clone(), persist, workflow));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
