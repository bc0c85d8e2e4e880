//! Auth store: login, token renewal, logout and session restore on top of the
//! shared [`SessionContext`].
//!
//! Lifecycle: Anonymous → (login) → Authenticated → (logout, or a failed
//! renewal, or any 401) → Anonymous.

use taskhub_core::UserRecord;
use tokio::sync::watch;

use crate::api::{Credentials, RefreshResponse, RegisterRequest, TokenPair};
use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;
use crate::session::{SessionContext, SessionState};
use crate::storage::keys;

#[derive(Debug, Clone)]
pub struct AuthStore {
    api: ApiClient,
    session: SessionContext,
}

impl AuthStore {
    pub fn new(api: ApiClient) -> Self {
        let session = api.session().clone();
        Self { api, session }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn current_user(&self) -> Option<UserRecord> {
        self.session.user()
    }

    pub fn snapshot(&self) -> SessionState {
        self.session.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    /// Create an account. The session is not touched.
    pub async fn register(&self, user: &RegisterRequest) -> ClientResult<UserRecord> {
        let created = self.api.auth().register(user).await?;
        tracing::info!(username = %user.username, "account registered");
        Ok(created)
    }

    /// Exchange credentials for a token pair and persist it (with the user
    /// object when the backend sends one).
    ///
    /// A 401 ends any current session, like every other 401. Other failures
    /// (network, validation, storage) leave the session as it was.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<TokenPair> {
        let pair = match self.api.auth().login(credentials).await {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!(username = %credentials.username, "login failed: {err}");
                return Err(err);
            }
        };

        self.session
            .store_login(&pair.access, &pair.refresh, pair.user.clone())
            .await?;

        tracing::info!(username = %credentials.username, "logged in");
        Ok(pair)
    }

    /// Renew the access token. Any failure, including a missing refresh
    /// token, ends the session before the error is returned.
    pub async fn refresh_access_token(&self) -> ClientResult<RefreshResponse> {
        match self.try_refresh().await {
            Ok(resp) => Ok(resp),
            Err(err) => {
                tracing::warn!("token renewal failed: {err}");
                self.logout().await;
                Err(err)
            }
        }
    }

    async fn try_refresh(&self) -> ClientResult<RefreshResponse> {
        let refresh = self.session.refresh_token().ok_or(ClientError::NoRefreshToken)?;
        let resp = self.api.auth().refresh(&refresh).await?;
        self.session.store_access_token(&resp.access).await?;
        tracing::debug!("access token renewed");
        Ok(resp)
    }

    /// Forget user and tokens, in memory and in storage. Idempotent.
    pub async fn logout(&self) {
        self.session.clear().await;
    }

    /// Bring back the persisted user object.
    ///
    /// Unreadable or malformed data is logged and ignored; startup never
    /// fails because of it.
    pub async fn restore_session(&self) {
        let raw = match self.session.storage().get(keys::USER).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(err) => {
                tracing::error!("error reading saved user: {err}");
                return;
            }
        };

        match serde_json::from_str::<UserRecord>(&raw) {
            Ok(user) => self.session.restore_user(user),
            Err(err) => tracing::error!("error parsing saved user: {err}"),
        }
    }
}
