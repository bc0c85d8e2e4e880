//! Task store: tasks of one project, the selected task, and that task's
//! documents.

use taskhub_core::entity::{is_selected, remove_by_id, replace_by_id};
use taskhub_core::{Document, DocumentId, NewTask, Priority, ProjectId, Task, TaskId, TaskPatch};
use tokio::sync::watch;

use crate::api::DocumentUpload;
use crate::error::ClientResult;
use crate::http::ApiClient;
use crate::stores::{OperationStatus, StoreCell};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskState {
    pub tasks: Vec<Task>,
    pub current_task: Option<Task>,
    /// Documents of `current_task`.
    pub documents: Vec<Document>,
    pub loading: bool,
    pub error: Option<String>,
}

impl TaskState {
    pub fn completed_tasks(&self) -> Vec<Task> {
        self.tasks.iter().filter(|t| t.is_completed).cloned().collect()
    }

    pub fn pending_tasks(&self) -> Vec<Task> {
        self.tasks.iter().filter(|t| !t.is_completed).cloned().collect()
    }

    pub fn high_priority_tasks(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.is_high_priority())
            .cloned()
            .collect()
    }

    pub fn apply_update(&mut self, task_id: TaskId, updated: Task) {
        if is_selected(self.current_task.as_ref(), &task_id) {
            self.current_task = Some(updated.clone());
        }
        replace_by_id(&mut self.tasks, &task_id, updated);
    }

    /// Drop the task; if it was selected, its documents go with it.
    pub fn apply_delete(&mut self, task_id: TaskId) {
        remove_by_id(&mut self.tasks, &task_id);
        if is_selected(self.current_task.as_ref(), &task_id) {
            self.current_task = None;
            self.documents.clear();
        }
    }
}

impl OperationStatus for TaskState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

#[derive(Debug)]
pub struct TaskStore {
    api: ApiClient,
    cell: StoreCell<TaskState>,
}

impl TaskStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cell: StoreCell::new(TaskState::default()),
        }
    }

    pub fn snapshot(&self) -> TaskState {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.cell.subscribe()
    }

    pub fn all_tasks(&self) -> Vec<Task> {
        self.cell.read(|s| s.tasks.clone())
    }

    pub fn selected_task(&self) -> Option<Task> {
        self.cell.read(|s| s.current_task.clone())
    }

    pub fn task_documents(&self) -> Vec<Document> {
        self.cell.read(|s| s.documents.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.cell.read(|s| s.loading)
    }

    pub fn error(&self) -> Option<String> {
        self.cell.read(|s| s.error.clone())
    }

    pub fn completed_tasks(&self) -> Vec<Task> {
        self.cell.read(TaskState::completed_tasks)
    }

    pub fn pending_tasks(&self) -> Vec<Task> {
        self.cell.read(TaskState::pending_tasks)
    }

    pub fn high_priority_tasks(&self) -> Vec<Task> {
        self.cell.read(TaskState::high_priority_tasks)
    }

    pub async fn fetch_tasks(&self, project_id: ProjectId) -> ClientResult<Vec<Task>> {
        self.cell
            .run("fetch_tasks", async {
                let tasks = self.api.tasks().list(project_id).await?;
                tracing::debug!(%project_id, count = tasks.len(), "tasks fetched");
                self.cell.update(|s| s.tasks = tasks.clone());
                Ok(tasks)
            })
            .await
    }

    pub async fn create_task(&self, project_id: ProjectId, task: &NewTask) -> ClientResult<Task> {
        self.cell
            .run("create_task", async {
                let created = self.api.tasks().create(project_id, task).await?;
                self.cell.update(|s| s.tasks.push(created.clone()));
                Ok(created)
            })
            .await
    }

    pub async fn update_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        patch: &TaskPatch,
    ) -> ClientResult<Task> {
        self.cell
            .run("update_task", async {
                let updated = self.api.tasks().update(project_id, task_id, patch).await?;
                self.cell.update(|s| s.apply_update(task_id, updated.clone()));
                Ok(updated)
            })
            .await
    }

    pub async fn delete_task(&self, project_id: ProjectId, task_id: TaskId) -> ClientResult<()> {
        self.cell
            .run("delete_task", async {
                self.api.tasks().delete(project_id, task_id).await?;
                self.cell.update(|s| s.apply_delete(task_id));
                tracing::info!(%project_id, %task_id, "task deleted");
                Ok(())
            })
            .await
    }

    pub async fn toggle_task_completion(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        is_completed: bool,
    ) -> ClientResult<Task> {
        self.update_task(project_id, task_id, &TaskPatch::completion(is_completed))
            .await
    }

    pub async fn update_task_priority(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        priority: Priority,
    ) -> ClientResult<Task> {
        self.update_task(project_id, task_id, &TaskPatch::priority(priority))
            .await
    }

    /// Load one task from the backend and make it the selection.
    ///
    /// Documents of a previously selected, different task are dropped.
    pub async fn load_task(&self, project_id: ProjectId, task_id: TaskId) -> ClientResult<Task> {
        self.cell
            .run("load_task", async {
                let task = self.api.tasks().get(project_id, task_id).await?;
                self.cell.update(|s| {
                    if !is_selected(s.current_task.as_ref(), &task_id) {
                        s.documents.clear();
                    }
                    s.current_task = Some(task.clone());
                });
                Ok(task)
            })
            .await
    }

    pub async fn fetch_documents(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> ClientResult<Vec<Document>> {
        self.cell
            .run("fetch_documents", async {
                let documents = self.api.documents().list(project_id, task_id).await?;
                self.cell.update(|s| s.documents = documents.clone());
                Ok(documents)
            })
            .await
    }

    pub async fn upload_document(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        upload: DocumentUpload,
    ) -> ClientResult<Document> {
        self.cell
            .run("upload_document", async {
                let size = upload.bytes.len();
                let document = self
                    .api
                    .documents()
                    .upload(project_id, task_id, upload)
                    .await?;
                tracing::info!(%task_id, document_id = %document.id, size, "document uploaded");
                self.cell.update(|s| s.documents.push(document.clone()));
                Ok(document)
            })
            .await
    }

    pub async fn delete_document(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        document_id: DocumentId,
    ) -> ClientResult<()> {
        self.cell
            .run("delete_document", async {
                self.api
                    .documents()
                    .delete(project_id, task_id, document_id)
                    .await?;
                self.cell.update(|s| {
                    remove_by_id(&mut s.documents, &document_id);
                });
                Ok(())
            })
            .await
    }

    pub fn select_task(&self, task: Task) {
        self.cell.update(|s| s.current_task = Some(task));
    }

    pub fn clear_current_task(&self) {
        self.cell.update(|s| {
            s.current_task = None;
            s.documents.clear();
        });
    }

    pub fn clear_tasks(&self) {
        self.cell.update(|s| {
            s.tasks.clear();
            s.current_task = None;
            s.documents.clear();
        });
    }
}
