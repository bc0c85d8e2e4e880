//! Application wiring: one session, one HTTP wrapper, three stores.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::http::ApiClient;
use crate::navigation::Navigator;
use crate::session::SessionContext;
use crate::storage::{DurableStorage, open_storage};
use crate::stores::{AuthStore, ProjectStore, TaskStore};

/// Everything a host needs, wired leaves-first.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub session: SessionContext,
    pub api: ApiClient,
    pub auth: AuthStore,
    pub projects: Arc<ProjectStore>,
    pub tasks: Arc<TaskStore>,
}

impl AppState {
    /// Open storage from `config`, restore the session and build the stores.
    pub async fn new(config: ClientConfig, navigator: Arc<dyn Navigator>) -> ClientResult<Self> {
        let storage = open_storage(&config.storage);
        Self::with_storage(config, storage, navigator).await
    }

    /// Same as [`AppState::new`] over an already opened storage.
    pub async fn with_storage(
        config: ClientConfig,
        storage: Arc<dyn DurableStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let session = SessionContext::load(storage).await?;
        let api = ApiClient::new(&config, session.clone(), navigator)?;

        let auth = AuthStore::new(api.clone());
        auth.restore_session().await;

        tracing::info!(
            base_url = %config.base_url,
            authenticated = auth.is_authenticated(),
            "client initialized"
        );

        Ok(Self {
            projects: Arc::new(ProjectStore::new(api.clone())),
            tasks: Arc::new(TaskStore::new(api.clone())),
            config,
            session,
            api,
            auth,
        })
    }
}
