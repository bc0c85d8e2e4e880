//! Typed endpoint bindings over [`ApiClient`].

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use taskhub_core::{
    Document, DocumentId, NewProject, NewTask, Project, ProjectId, ProjectPatch, Task, TaskId,
    TaskPatch, UserRecord,
};

use crate::error::ClientResult;
use crate::http::ApiClient;

/// Username/password pair for `POST /api/auth/token/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Account creation payload for `POST /api/auth/register/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Confirmation field; the backend checks it matches `password`.
    pub password2: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_name: String,
}

impl RegisterRequest {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            email: email.into(),
            password2: password.clone(),
            password,
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }
}

/// Response of a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRecord>,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

/// Response of a successful token renewal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// A file to attach to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Multipart body with the `file` part and the `file_name` field the
    /// backend expects.
    fn into_form(self) -> ClientResult<Form> {
        let mut part = Part::bytes(self.bytes).file_name(self.file_name.clone());
        if let Some(mime) = &self.mime_type {
            part = part.mime_str(mime)?;
        }
        Ok(Form::new()
            .text("file_name", self.file_name)
            .part("file", part))
    }
}

fn project_path(project_id: ProjectId) -> String {
    format!("/api/projects/{project_id}/")
}

fn tasks_path(project_id: ProjectId) -> String {
    format!("/api/projects/{project_id}/tasks/")
}

fn task_path(project_id: ProjectId, task_id: TaskId) -> String {
    format!("/api/projects/{project_id}/tasks/{task_id}/")
}

fn documents_path(project_id: ProjectId, task_id: TaskId) -> String {
    format!("/api/projects/{project_id}/tasks/{task_id}/documents/")
}

fn document_path(project_id: ProjectId, task_id: TaskId, document_id: DocumentId) -> String {
    format!("/api/projects/{project_id}/tasks/{task_id}/documents/{document_id}/")
}

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi { client: self }
    }

    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi { client: self }
    }

    pub fn documents(&self) -> DocumentsApi<'_> {
        DocumentsApi { client: self }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl AuthApi<'_> {
    pub async fn register(&self, user: &RegisterRequest) -> ClientResult<UserRecord> {
        self.client.post("/api/auth/register/", user).await
    }

    pub async fn login(&self, credentials: &Credentials) -> ClientResult<TokenPair> {
        self.client.post("/api/auth/token/", credentials).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> ClientResult<RefreshResponse> {
        let body = RefreshRequest {
            refresh: refresh_token,
        };
        self.client.post("/api/auth/token/refresh/", &body).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectsApi<'a> {
    client: &'a ApiClient,
}

impl ProjectsApi<'_> {
    pub async fn list(&self) -> ClientResult<Vec<Project>> {
        self.client.get("/api/projects/").await
    }

    pub async fn create(&self, project: &NewProject) -> ClientResult<Project> {
        self.client.post("/api/projects/", project).await
    }

    pub async fn get(&self, project_id: ProjectId) -> ClientResult<Project> {
        self.client.get(&project_path(project_id)).await
    }

    pub async fn update(
        &self,
        project_id: ProjectId,
        patch: &ProjectPatch,
    ) -> ClientResult<Project> {
        self.client.patch(&project_path(project_id), patch).await
    }

    pub async fn delete(&self, project_id: ProjectId) -> ClientResult<()> {
        self.client.delete(&project_path(project_id)).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TasksApi<'a> {
    client: &'a ApiClient,
}

impl TasksApi<'_> {
    pub async fn list(&self, project_id: ProjectId) -> ClientResult<Vec<Task>> {
        self.client.get(&tasks_path(project_id)).await
    }

    pub async fn create(&self, project_id: ProjectId, task: &NewTask) -> ClientResult<Task> {
        self.client.post(&tasks_path(project_id), task).await
    }

    pub async fn get(&self, project_id: ProjectId, task_id: TaskId) -> ClientResult<Task> {
        self.client.get(&task_path(project_id, task_id)).await
    }

    pub async fn update(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        patch: &TaskPatch,
    ) -> ClientResult<Task> {
        self.client
            .patch(&task_path(project_id, task_id), patch)
            .await
    }

    pub async fn delete(&self, project_id: ProjectId, task_id: TaskId) -> ClientResult<()> {
        self.client.delete(&task_path(project_id, task_id)).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DocumentsApi<'a> {
    client: &'a ApiClient,
}

impl DocumentsApi<'_> {
    pub async fn list(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> ClientResult<Vec<Document>> {
        self.client.get(&documents_path(project_id, task_id)).await
    }

    pub async fn upload(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        upload: DocumentUpload,
    ) -> ClientResult<Document> {
        let form = upload.into_form()?;
        self.client
            .post_multipart(&documents_path(project_id, task_id), form)
            .await
    }

    pub async fn delete(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        document_id: DocumentId,
    ) -> ClientResult<()> {
        self.client
            .delete(&document_path(project_id, task_id, document_id))
            .await
    }
}
