//! Observable state containers.
//!
//! Each store owns one state struct published through a `watch` channel, so
//! a UI can re-render on every change. Async operations share one contract:
//! - entry: `loading = true`, `error = None`;
//! - failure: `error = Some(message)`, the error is returned to the caller;
//! - exit: `loading = false`, whatever the outcome (also if the operation
//!   future is dropped mid-flight).
//!
//! Operations on the same store are serialized, so `loading`/`error`
//! always describe exactly one operation.

use std::future::Future;

use tokio::sync::{Mutex, watch};

use crate::error::ClientResult;

pub mod auth;
pub mod projects;
pub mod tasks;

pub use auth::AuthStore;
pub use projects::{ProjectState, ProjectStore};
pub use tasks::{TaskState, TaskStore};

/// The loading/error slots every resource state carries.
pub(crate) trait OperationStatus {
    fn set_loading(&mut self, loading: bool);
    fn set_error(&mut self, error: Option<String>);
}

/// State + operation lock shared by the resource stores.
#[derive(Debug)]
pub(crate) struct StoreCell<S> {
    state: watch::Sender<S>,
    op_lock: Mutex<()>,
}

impl<S: OperationStatus + Clone> StoreCell<S> {
    pub(crate) fn new(initial: S) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            op_lock: Mutex::new(()),
        }
    }

    pub(crate) fn snapshot(&self) -> S {
        self.state.borrow().clone()
    }

    /// Read a projection of the state without cloning all of it.
    pub(crate) fn read<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&self.state.borrow())
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut S)) {
        self.state.send_modify(f);
    }

    /// Run one store operation under the shared contract.
    pub(crate) async fn run<T, F>(&self, operation: &'static str, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let _serial = self.op_lock.lock().await;

        self.update(|s| {
            s.set_loading(true);
            s.set_error(None);
        });
        let _loading = LoadingGuard { state: &self.state };

        let result = fut.await;

        if let Err(err) = &result {
            let message = err.to_string();
            tracing::warn!(operation, error = %message, "store operation failed");
            self.update(|s| s.set_error(Some(message)));
        } else {
            tracing::debug!(operation, "store operation succeeded");
        }

        result
    }
}

/// Clears `loading` when dropped.
struct LoadingGuard<'a, S: OperationStatus> {
    state: &'a watch::Sender<S>,
}

impl<S: OperationStatus> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.set_loading(false));
    }
}
