//! `taskhub-core` — backend records and identifiers.
//!
//! This crate contains **pure domain** types (no HTTP, no storage).

pub mod document;
pub mod entity;
pub mod error;
pub mod id;
pub mod project;
pub mod task;
pub mod user;

pub use document::Document;
pub use entity::Entity;
pub use error::DomainError;
pub use id::{DocumentId, ProjectId, TaskId};
pub use project::{NewProject, Project, ProjectPatch};
pub use task::{NewTask, Priority, Task, TaskPatch};
pub use user::UserRecord;
