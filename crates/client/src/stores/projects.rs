//! Project store: the user's projects plus the currently selected one.

use taskhub_core::entity::{is_selected, remove_by_id, replace_by_id};
use taskhub_core::{NewProject, Project, ProjectId, ProjectPatch};
use tokio::sync::watch;

use crate::error::ClientResult;
use crate::http::ApiClient;
use crate::stores::{OperationStatus, StoreCell};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectState {
    pub projects: Vec<Project>,
    /// Selected project, held by value.
    pub current_project: Option<Project>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ProjectState {
    /// Splice an updated record in place; refresh the selection if it is the
    /// same project. Unknown ids leave the collection as is.
    pub fn apply_update(&mut self, project_id: ProjectId, updated: Project) {
        if is_selected(self.current_project.as_ref(), &project_id) {
            self.current_project = Some(updated.clone());
        }
        replace_by_id(&mut self.projects, &project_id, updated);
    }

    pub fn apply_delete(&mut self, project_id: ProjectId) {
        remove_by_id(&mut self.projects, &project_id);
        if is_selected(self.current_project.as_ref(), &project_id) {
            self.current_project = None;
        }
    }
}

impl OperationStatus for ProjectState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

#[derive(Debug)]
pub struct ProjectStore {
    api: ApiClient,
    cell: StoreCell<ProjectState>,
}

impl ProjectStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cell: StoreCell::new(ProjectState::default()),
        }
    }

    pub fn snapshot(&self) -> ProjectState {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProjectState> {
        self.cell.subscribe()
    }

    pub fn all_projects(&self) -> Vec<Project> {
        self.cell.read(|s| s.projects.clone())
    }

    pub fn selected_project(&self) -> Option<Project> {
        self.cell.read(|s| s.current_project.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.cell.read(|s| s.loading)
    }

    pub fn error(&self) -> Option<String> {
        self.cell.read(|s| s.error.clone())
    }

    /// Replace the local collection with the backend listing.
    pub async fn fetch_projects(&self) -> ClientResult<Vec<Project>> {
        self.cell
            .run("fetch_projects", async {
                let projects = self.api.projects().list().await?;
                tracing::debug!(count = projects.len(), "projects fetched");
                self.cell.update(|s| s.projects = projects.clone());
                Ok(projects)
            })
            .await
    }

    pub async fn create_project(&self, project: &NewProject) -> ClientResult<Project> {
        self.cell
            .run("create_project", async {
                let created = self.api.projects().create(project).await?;
                self.cell.update(|s| s.projects.push(created.clone()));
                Ok(created)
            })
            .await
    }

    pub async fn update_project(
        &self,
        project_id: ProjectId,
        patch: &ProjectPatch,
    ) -> ClientResult<Project> {
        self.cell
            .run("update_project", async {
                let updated = self.api.projects().update(project_id, patch).await?;
                self.cell
                    .update(|s| s.apply_update(project_id, updated.clone()));
                Ok(updated)
            })
            .await
    }

    pub async fn delete_project(&self, project_id: ProjectId) -> ClientResult<()> {
        self.cell
            .run("delete_project", async {
                self.api.projects().delete(project_id).await?;
                self.cell.update(|s| s.apply_delete(project_id));
                tracing::info!(%project_id, "project deleted");
                Ok(())
            })
            .await
    }

    /// Load one project from the backend and make it the selection.
    pub async fn select_project(&self, project_id: ProjectId) -> ClientResult<Project> {
        self.cell
            .run("select_project", async {
                let project = self.api.projects().get(project_id).await?;
                self.cell
                    .update(|s| s.current_project = Some(project.clone()));
                Ok(project)
            })
            .await
    }

    pub fn clear_current_project(&self) {
        self.cell.update(|s| s.current_project = None);
    }

    pub fn clear_projects(&self) {
        self.cell.update(|s| {
            s.projects.clear();
            s.current_project = None;
        });
    }
}
