use folio_graph::Workflow;
use folio_persist::PersistenceClient;
use std::sync::Arc;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The workflow holds no per-request state, so one instance serves every
/// request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: Arc<dyn PersistenceClient>,
    pub workflow: Workflow,
}

impl AppState {
    pub fn new(config: Config, persist: Arc<dyn PersistenceClient>, workflow: Workflow) -> Self {
        Self {
            config: Arc::new(config),
            persist,
            workflow,
        }
    }
}
