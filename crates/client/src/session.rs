//! Session context: the token pair and current user, shared explicitly by the
//! HTTP wrapper and the auth store.
//!
//! Mutation goes through the handful of methods below, each of which keeps the
//! in-memory state and durable storage in step.

use std::sync::Arc;

use taskhub_core::UserRecord;
use tokio::sync::watch;

use crate::error::ClientResult;
use crate::storage::{DurableStorage, keys};

/// Snapshot of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<UserRecord>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionState {
    /// A session is authenticated exactly when it holds an access token.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Cheaply clonable handle to the process session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    state: watch::Sender<SessionState>,
    storage: Arc<dyn DurableStorage>,
}

impl SessionContext {
    /// Restore persisted tokens from `storage`.
    ///
    /// Tokens are taken as-is; nothing checks they are still valid until a
    /// request proves otherwise. The user object is restored separately by
    /// the auth store.
    pub async fn load(storage: Arc<dyn DurableStorage>) -> ClientResult<Self> {
        let access_token = storage.get(keys::ACCESS_TOKEN).await?;
        let refresh_token = storage.get(keys::REFRESH_TOKEN).await?;

        tracing::debug!(
            has_access = access_token.is_some(),
            has_refresh = refresh_token.is_some(),
            "session tokens restored"
        );

        let state = SessionState {
            user: None,
            access_token,
            refresh_token,
        };

        Ok(Self::from_parts(state, storage))
    }

    /// Anonymous session over `storage` (nothing is read).
    pub fn anonymous(storage: Arc<dyn DurableStorage>) -> Self {
        Self::from_parts(SessionState::default(), storage)
    }

    fn from_parts(state: SessionState, storage: Arc<dyn DurableStorage>) -> Self {
        let (state, _) = watch::channel(state);
        Self {
            inner: Arc::new(Inner { state, storage }),
        }
    }

    pub fn storage(&self) -> &Arc<dyn DurableStorage> {
        &self.inner.storage
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receive every session change (login, refresh, logout).
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.state.borrow().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner.state.borrow().refresh_token.clone()
    }

    pub fn user(&self) -> Option<UserRecord> {
        self.inner.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Persist a login result, then adopt it.
    ///
    /// Every storage write happens before the in-memory session changes, so
    /// a storage failure leaves the session as it was. The user is written
    /// first. Without a user object the previously stored one is kept.
    pub async fn store_login(
        &self,
        access: &str,
        refresh: &str,
        user: Option<UserRecord>,
    ) -> ClientResult<()> {
        let storage = &self.inner.storage;
        if let Some(user) = &user {
            storage.set(keys::USER, &serde_json::to_string(user)?).await?;
        }
        storage.set(keys::ACCESS_TOKEN, access).await?;
        storage.set(keys::REFRESH_TOKEN, refresh).await?;

        self.inner.state.send_modify(|s| {
            s.access_token = Some(access.to_string());
            s.refresh_token = Some(refresh.to_string());
            if user.is_some() {
                s.user = user;
            }
        });
        Ok(())
    }

    /// Replace the access token in place (token renewal).
    pub async fn store_access_token(&self, access: &str) -> ClientResult<()> {
        self.inner.storage.set(keys::ACCESS_TOKEN, access).await?;
        self.inner
            .state
            .send_modify(|s| s.access_token = Some(access.to_string()));
        Ok(())
    }

    /// Adopt a user read back from storage without writing it again.
    pub(crate) fn restore_user(&self, user: UserRecord) {
        self.inner.state.send_modify(|s| s.user = Some(user));
    }

    /// Drop user and tokens, in memory and in storage. Idempotent and
    /// infallible: storage failures are logged, the in-memory session is
    /// always cleared.
    pub async fn clear(&self) {
        self.inner.state.send_replace(SessionState::default());

        for key in [keys::ACCESS_TOKEN, keys::REFRESH_TOKEN, keys::USER] {
            if let Err(err) = self.inner.storage.remove(key).await {
                tracing::warn!(key, "failed to remove session entry: {err}");
            }
        }

        tracing::info!("session cleared");
    }
}
