//! HTTP wrapper: the single place outbound requests are built and responses
//! interpreted.
//!
//! Two policies apply to every call:
//! - the current access token (if any) is attached as a bearer credential;
//! - a 401 clears the session and asks the host to show the login view,
//!   whichever endpoint produced it (login included).
//!
//! There is no retry, timeout override or backoff.

use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::navigation::{Navigator, Route};
use crate::session::SessionContext;

enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(multipart::Form),
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: SessionContext,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build the wrapper around an explicitly injected session.
    pub fn new(
        config: &ClientConfig,
        session: SessionContext,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            http,
            session,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(Method::GET, path, Body::Empty).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = Body::Json(serde_json::to_value(body)?);
        self.send(Method::POST, path, body).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = Body::Json(serde_json::to_value(body)?);
        self.send(Method::PATCH, path, body).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send(Method::DELETE, path, Body::Empty).await
    }

    /// POST a multipart form (file uploads). Same contract as the JSON calls.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: multipart::Form,
    ) -> ClientResult<T> {
        self.send(Method::POST, path, Body::Multipart(form)).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Body,
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method.clone(), &url);

        if let Some(token) = self.session.access_token() {
            req = req.bearer_auth(token);
        }

        req = match body {
            Body::Empty => req.header(header::CONTENT_TYPE, "application/json"),
            Body::Json(value) => req.json(&value),
            Body::Multipart(form) => req.multipart(form),
        };

        let resp = req.send().await.map_err(|e| {
            tracing::warn!(%method, path, "request failed before a response: {e}");
            ClientError::Network(e)
        })?;

        let status = resp.status();
        tracing::debug!(%method, path, status = status.as_u16(), "response received");

        if status == StatusCode::UNAUTHORIZED {
            let message = resp.text().await.unwrap_or_default();
            self.handle_unauthorized(path).await;
            return Err(ClientError::Unauthorized(message));
        }

        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = resp.bytes().await?;
        decode_body(&bytes)
    }

    /// Global 401 policy: whichever store issued the request, the session
    /// ends here.
    async fn handle_unauthorized(&self, path: &str) {
        tracing::warn!(path, "backend rejected the session; logging out");
        self.session.clear().await;
        self.navigator.navigate(Route::Login);
    }
}

/// Empty bodies (204 on delete) decode as JSON `null`, which is what `()`
/// expects.
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> ClientResult<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"null")?);
    }
    Ok(serde_json::from_slice(bytes)?)
}
