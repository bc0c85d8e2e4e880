//! `taskhub-client`
//!
//! **Responsibility:** talk to the TaskHub REST backend on behalf of a UI.
//!
//! This crate provides:
//! - an HTTP wrapper that injects the bearer token and ends the session on 401
//! - a session context persisted to durable storage
//! - observable stores for auth, projects and tasks (with documents)
//!
//! The backend stays the authority; stores only cache its responses.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod navigation;
pub mod session;
pub mod sqlite;
pub mod storage;
pub mod stores;

pub use api::{Credentials, DocumentUpload, RegisterRequest, TokenPair};
pub use app::AppState;
pub use config::{ClientConfig, StorageConfig};
pub use error::{ClientError, ClientResult};
pub use http::ApiClient;
pub use navigation::{Navigator, NoopNavigator, RecordingNavigator, Route};
pub use session::{SessionContext, SessionState};
pub use storage::{DurableStorage, MemoryStorage, StorageError};
pub use stores::{AuthStore, ProjectState, ProjectStore, TaskState, TaskStore};
