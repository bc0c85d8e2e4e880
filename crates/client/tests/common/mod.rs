//! In-process mock of the TaskHub backend, bound to an ephemeral port.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use taskhub_client::{AppState, ClientConfig, Credentials, MemoryStorage, RecordingNavigator};

pub const USERNAME: &str = "ana";
pub const PASSWORD: &str = "secret";
const CREATED_AT: &str = "2024-03-01T10:00:00Z";

#[derive(Debug, Default)]
pub struct Backend {
    next_id: i64,
    token_seq: u32,
    access_tokens: HashSet<String>,
    refresh_tokens: HashSet<String>,
    pub projects: Vec<Value>,
    /// (project id, task)
    pub tasks: Vec<(i64, Value)>,
    /// (task id, document)
    pub documents: Vec<(i64, Value)>,
    pub hits: usize,
    fail_next: Option<StatusCode>,
    fail_login: Option<StatusCode>,
}

impl Backend {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn issue_access(&mut self) -> String {
        self.token_seq += 1;
        let token = format!("access-{}", self.token_seq);
        self.access_tokens.insert(token.clone());
        token
    }

    /// Injected failure first, then bearer check.
    fn gate(&mut self, headers: &HeaderMap) -> Result<(), Response> {
        if let Some(status) = self.fail_next.take() {
            return Err((status, Json(json!({ "detail": "injected failure" }))).into_response());
        }

        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        match token {
            Some(token) if self.access_tokens.contains(token) => Ok(()),
            _ => Err(unauthorized("Given token not valid for any token type")),
        }
    }
}

type Db = Arc<Mutex<Backend>>;

fn lock(db: &Db) -> MutexGuard<'_, Backend> {
    db.lock().unwrap()
}

fn unauthorized(detail: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail }))).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (k, v) in patch {
            target.insert(k.clone(), v.clone());
        }
    }
}

pub struct TestServer {
    pub base_url: String,
    pub db: Db,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let db: Db = Arc::new(Mutex::new(Backend::default()));
        let app = router(db.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            db,
            handle,
        }
    }

    pub fn backend(&self) -> MutexGuard<'_, Backend> {
        lock(&self.db)
    }

    pub fn hits(&self) -> usize {
        self.backend().hits
    }

    /// The next gated request fails with `status`.
    pub fn fail_next(&self, status: StatusCode) {
        self.backend().fail_next = Some(status);
    }

    /// The next token request fails with `status`, whatever the credentials.
    pub fn fail_next_login(&self, status: StatusCode) {
        self.backend().fail_login = Some(status);
    }

    /// Revoke every access and refresh token.
    pub fn expire_sessions(&self) {
        let mut db = self.backend();
        db.access_tokens.clear();
        db.refresh_tokens.clear();
    }

    pub fn seed_project(&self, name: &str) -> i64 {
        let mut db = self.backend();
        let id = db.next_id();
        db.projects.push(project_json(id, name));
        id
    }

    pub fn remove_project(&self, id: i64) {
        self.backend().projects.retain(|p| p["id"] != id);
    }

    pub fn seed_task(&self, project_id: i64, title: &str, priority: &str, done: bool) -> i64 {
        let mut db = self.backend();
        let id = db.next_id();
        let task = json!({
            "id": id,
            "title": title,
            "description": "",
            "created_at": CREATED_AT,
            "due_date": null,
            "priority": priority,
            "is_completed": done,
            "project": project_id,
            "documents": [],
            "documents_count": 0
        });
        db.tasks.push((project_id, task));
        id
    }

    pub fn seed_document(&self, task_id: i64, file_name: &str) -> i64 {
        let mut db = self.backend();
        let id = db.next_id();
        let doc = document_json(id, task_id, file_name);
        db.documents.push((task_id, doc));
        id
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Client wired to `srv` with in-memory storage and a recording navigator.
pub struct Harness {
    pub app: AppState,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub async fn new(srv: &TestServer) -> Self {
        Self::with_storage(srv, Arc::new(MemoryStorage::new())).await
    }

    pub async fn with_storage(srv: &TestServer, storage: Arc<MemoryStorage>) -> Self {
        let navigator = Arc::new(RecordingNavigator::new());
        let app = AppState::with_storage(
            ClientConfig::new(srv.base_url.clone()),
            storage.clone(),
            navigator.clone(),
        )
        .await
        .expect("client should initialize");

        Self {
            app,
            storage,
            navigator,
        }
    }

    pub async fn logged_in(srv: &TestServer) -> Self {
        let harness = Self::new(srv).await;
        harness
            .app
            .auth
            .login(&Credentials::new(USERNAME, PASSWORD))
            .await
            .expect("login should succeed");
        harness
    }
}

fn project_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "created_at": CREATED_AT,
        "owner": USERNAME,
        "tasks": [],
        "tasks_count": 0,
        "completed_tasks_count": 0
    })
}

fn document_json(id: i64, task_id: i64, file_name: &str) -> Value {
    json!({
        "id": id,
        "file_name": file_name,
        "file": format!("/media/documents/{file_name}"),
        "file_url": format!("http://testserver/media/documents/{file_name}"),
        "uploaded_at": CREATED_AT,
        "task": task_id
    })
}

fn router(db: Db) -> Router {
    Router::new()
        .route("/api/auth/register/", post(register))
        .route("/api/auth/token/", post(obtain_token))
        .route("/api/auth/token/refresh/", post(refresh_token))
        .route("/api/projects/", get(list_projects).post(create_project))
        .route(
            "/api/projects/:project_id/",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route(
            "/api/projects/:project_id/tasks/",
            get(list_tasks).post(create_task),
        )
        .route(
            "/api/projects/:project_id/tasks/:task_id/",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route(
            "/api/projects/:project_id/tasks/:task_id/documents/",
            get(list_documents).post(upload_document),
        )
        .route(
            "/api/projects/:project_id/tasks/:task_id/documents/:document_id/",
            delete(delete_document),
        )
        .layer(middleware::from_fn_with_state(db.clone(), count_hits))
        .with_state(db)
}

async fn count_hits(State(db): State<Db>, req: Request, next: Next) -> Response {
    lock(&db).hits += 1;
    next.run(req).await
}

// ---------------------------------------------------------------- auth

async fn register(State(db): State<Db>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default().to_string();
    if username == "taken" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "username": ["A user with that username already exists."] })),
        )
            .into_response();
    }

    let id = lock(&db).next_id();
    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "username": username, "email": body["email"] })),
    )
        .into_response()
}

async fn obtain_token(State(db): State<Db>, Json(body): Json<Value>) -> Response {
    let mut db = lock(&db);
    if let Some(status) = db.fail_login.take() {
        return (status, Json(json!({ "detail": "token service unavailable" }))).into_response();
    }
    if body["password"] != PASSWORD {
        return unauthorized("No active account found with the given credentials");
    }

    let access = db.issue_access();
    let refresh = format!("refresh-{}", db.token_seq);
    db.refresh_tokens.insert(refresh.clone());

    let username = body["username"].as_str().unwrap_or_default();
    let mut payload = json!({ "access": access, "refresh": refresh });
    // Plain SimpleJWT sends no user object; "bare" mimics that.
    if username != "bare" {
        payload["user"] = json!({ "id": 1, "username": username });
    }
    Json(payload).into_response()
}

async fn refresh_token(State(db): State<Db>, Json(body): Json<Value>) -> Response {
    let mut db = lock(&db);
    let presented = body["refresh"].as_str().unwrap_or_default();
    if !db.refresh_tokens.contains(presented) {
        return unauthorized("Token is invalid or expired");
    }
    let access = db.issue_access();
    Json(json!({ "access": access })).into_response()
}

// ---------------------------------------------------------------- projects

async fn list_projects(State(db): State<Db>, headers: HeaderMap) -> Response {
    let mut db = lock(&db);
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    Json(Value::Array(db.projects.clone())).into_response()
}

async fn create_project(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = lock(&db);
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    let name = body["name"].as_str().unwrap_or_default();
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "name": ["This field may not be blank."] })),
        )
            .into_response();
    }
    let id = db.next_id();
    let mut project = project_json(id, name);
    project["description"] = body["description"].clone();
    db.projects.push(project.clone());
    (StatusCode::CREATED, Json(project)).into_response()
}

async fn get_project(
    State(db): State<Db>,
    Path(project_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut db = lock(&db);
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    match db.projects.iter().find(|p| p["id"] == project_id) {
        Some(project) => Json(project.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_project(
    State(db): State<Db>,
    Path(project_id): Path<i64>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    let mut db = lock(&db);
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    match db.projects.iter_mut().find(|p| p["id"] == project_id) {
        Some(project) => {
            merge(project, &patch);
            Json(project.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn delete_project(
    State(db): State<Db>,
    Path(project_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut db = lock(&db);
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    let before = db.projects.len();
    db.projects.retain(|p| p["id"] != project_id);
    if db.projects.len() == before {
        return not_found();
    }
    db.tasks.retain(|(p, _)| *p != project_id);
    StatusCode::NO_CONTENT.into_response()
}

// ---------------------------------------------------------------- tasks

async fn list_tasks(
    State(db): State<Db>,
    Path(project_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut db = lock(&db);
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    let tasks: Vec<Value> = db
        .tasks
        .iter()
        .filter(|(p, _)| *p == project_id)
        .map(|(_, t)| t.clone())
        .collect();
    Json(tasks).into_response()
}

async fn create_task(
    State(db): State<Db>,
    Path(project_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = lock(&db);
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    let id = db.next_id();
    let task = json!({
        "id": id,
        "title": body["title"],
        "description": body["description"],
        "created_at": CREATED_AT,
        "due_date": body.get("due_date").cloned().unwrap_or(Value::Null),
        "priority": body.get("priority").cloned().unwrap_or(json!("Medium")),
        "is_completed": false,
        "project": project_id,
        "documents": [],
        "documents_count": 0
    });
    db.tasks.push((project_id, task.clone()));
    (StatusCode::CREATED, Json(task)).into_response()
}

async fn get_task(
    State(db): State<Db>,
    Path((project_id, task_id)): Path<(i64, i64)>,
    headers: HeaderMap,
) -> Response {
    let mut db = lock(&db);
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    match db
        .tasks
        .iter()
        .find(|(p, t)| *p == project_id && t["id"] == task_id)
    {
        Some((_, task)) => Json(task.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_task(
    State(db): State<Db>,
    Path((project_id, task_id)): Path<(i64, i64)>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    let mut db = lock(&db);
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    match db
        .tasks
        .iter_mut()
        .find(|(p, t)| *p == project_id && t["id"] == task_id)
    {
        Some((_, task)) => {
            merge(task, &patch);
            Json(task.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn delete_task(
    State(db): State<Db>,
    Path((project_id, task_id)): Path<(i64, i64)>,
    headers: HeaderMap,
) -> Response {
    let mut db = lock(&db);
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    let before = db.tasks.len();
    db.tasks
        .retain(|(p, t)| !(*p == project_id && t["id"] == task_id));
    if db.tasks.len() == before {
        return not_found();
    }
    db.documents.retain(|(t, _)| *t != task_id);
    StatusCode::NO_CONTENT.into_response()
}

// ---------------------------------------------------------------- documents

async fn list_documents(
    State(db): State<Db>,
    Path((_project_id, task_id)): Path<(i64, i64)>,
    headers: HeaderMap,
) -> Response {
    let mut db = lock(&db);
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    let docs: Vec<Value> = db
        .documents
        .iter()
        .filter(|(t, _)| *t == task_id)
        .map(|(_, d)| d.clone())
        .collect();
    Json(docs).into_response()
}

async fn upload_document(
    State(db): State<Db>,
    Path((_project_id, task_id)): Path<(i64, i64)>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let gated = lock(&db).gate(&headers);
    if let Err(resp) = gated {
        return resp;
    }

    let mut file_name = None;
    let mut file_bytes = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let original = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.unwrap_or_default();
                file_bytes = Some(bytes.len());
                file_name = file_name.or(original);
            }
            "file_name" => {
                file_name = Some(field.text().await.unwrap_or_default());
            }
            _ => {}
        }
    }

    let (Some(file_name), Some(_size)) = (file_name, file_bytes) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "file": ["No file was submitted."] })),
        )
            .into_response();
    };

    let mut db = lock(&db);
    let id = db.next_id();
    let doc = document_json(id, task_id, &file_name);
    db.documents.push((task_id, doc.clone()));
    (StatusCode::CREATED, Json(doc)).into_response()
}

async fn delete_document(
    State(db): State<Db>,
    Path((_project_id, task_id, document_id)): Path<(i64, i64, i64)>,
    headers: HeaderMap,
) -> Response {
    let mut db = lock(&db);
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    let before = db.documents.len();
    db.documents
        .retain(|(t, d)| !(*t == task_id && d["id"] == document_id));
    if db.documents.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}
