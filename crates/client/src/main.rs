//! Headless entry point: restore (or open) a session and print an overview of
//! the user's projects as JSON.

use std::sync::Arc;

use anyhow::Context;
use taskhub_client::{AppState, ClientConfig, Credentials, NoopNavigator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    taskhub_observability::init();

    let config = ClientConfig::from_env();
    let app = AppState::new(config, Arc::new(NoopNavigator))
        .await
        .context("failed to initialize client")?;

    if !app.auth.is_authenticated() {
        let username = std::env::var("TASKHUB_USERNAME")
            .context("not logged in and TASKHUB_USERNAME is not set")?;
        let password = std::env::var("TASKHUB_PASSWORD")
            .context("not logged in and TASKHUB_PASSWORD is not set")?;

        app.auth
            .login(&Credentials::new(username, password))
            .await
            .context("login failed")?;
    }

    let projects = app
        .projects
        .fetch_projects()
        .await
        .context("failed to list projects")?;

    let mut overview = Vec::with_capacity(projects.len());
    for project in &projects {
        let tasks = app.tasks.fetch_tasks(project.id).await?;
        let state = app.tasks.snapshot();
        overview.push(serde_json::json!({
            "id": project.id,
            "name": project.name,
            "tasks": tasks.len(),
            "completed": state.completed_tasks().len(),
            "high_priority": state.high_priority_tasks().len(),
        }));
    }

    println!("{}", serde_json::to_string_pretty(&overview)?);
    Ok(())
}
