use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use directories::ProjectDirs;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::todo::{Todo, TodoPatch, TodoStore};

/// Shared state for all handlers: the store behind its lock, plus an
/// optional snapshot file written after each mutation.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<TodoStore>>,
    pub data_path: Option<Arc<PathBuf>>,
}

impl AppState {
    pub fn in_memory(store: TodoStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            data_path: None,
        }
    }
}

/// Handler-level errors. Everything unexpected collapses into the generic
/// per-operation 500 payload; the detail only goes to the log.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Todo not found")]
    NotFound,
    #[error("Failed to load todos")]
    ListFailed(String),
    #[error("Failed to create todo")]
    CreateFailed(String),
    #[error("Failed to update todo")]
    UpdateFailed(String),
    #[error("Failed to delete todo")]
    DeleteFailed(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Todo not found"),
            ApiError::ListFailed(detail) => {
                tracing::error!(error = %detail, "list failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load todos")
            }
            ApiError::CreateFailed(detail) => {
                tracing::error!(error = %detail, "create failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create todo")
            }
            ApiError::UpdateFailed(detail) => {
                tracing::error!(error = %detail, "update failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to update todo")
            }
            ApiError::DeleteFailed(detail) => {
                tracing::error!(error = %detail, "delete failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete todo")
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct CreateTodo {
    text: String,
    deadline: Option<String>,
}

fn lock_store(state: &AppState) -> Result<MutexGuard<'_, TodoStore>, String> {
    state.store.lock().map_err(|e| format!("store lock poisoned: {}", e))
}

fn snapshot(state: &AppState, store: &TodoStore) {
    if let Some(path) = &state.data_path {
        if let Err(e) = store.save_to_file(path.as_ref()) {
            tracing::warn!(error = %e, path = %path.display(), "snapshot write failed");
        }
    }
}

/// The original UI parses ids with `parseInt`, where garbage becomes `NaN`
/// and misses every record. Treat an unparseable id the same way: 404.
fn parse_id(raw: &str) -> ApiResult<u64> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

/// GET /todos
async fn list_todos(State(state): State<AppState>) -> ApiResult<Json<Vec<Todo>>> {
    let store = lock_store(&state).map_err(ApiError::ListFailed)?;
    Ok(Json(store.list().to_vec()))
}

/// POST /todos
///
/// The body is parsed by hand so a malformed request lands in the generic
/// failure envelope instead of an extractor rejection.
async fn create_todo(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let req: CreateTodo =
        serde_json::from_slice(&body).map_err(|e| ApiError::CreateFailed(e.to_string()))?;
    let mut store = lock_store(&state).map_err(ApiError::CreateFailed)?;
    let todo = store
        .add(req.text, req.deadline)
        .map_err(ApiError::CreateFailed)?;
    snapshot(&state, &store);
    tracing::info!(id = todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// PATCH /todos/{id}
async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Todo>> {
    let id = parse_id(&id)?;
    let patch: TodoPatch =
        serde_json::from_slice(&body).map_err(|e| ApiError::UpdateFailed(e.to_string()))?;
    if let Some(text) = &patch.text {
        if text.trim().is_empty() {
            return Err(ApiError::UpdateFailed("patched text is empty".to_string()));
        }
    }
    let mut store = lock_store(&state).map_err(ApiError::UpdateFailed)?;
    let updated = store.update(id, patch).ok_or(ApiError::NotFound)?;
    snapshot(&state, &store);
    tracing::info!(id, "todo updated");
    Ok(Json(updated))
}

/// DELETE /todos/{id}
async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = parse_id(&id)?;
    let mut store = lock_store(&state).map_err(ApiError::DeleteFailed)?;
    let deleted = store.delete(id).ok_or(ApiError::NotFound)?;
    snapshot(&state, &store);
    tracing::info!(id, "todo deleted");
    Ok(Json(json!({
        "message": "Todo deleted successfully",
        "deletedTodo": deleted,
    })))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            axum::routing::patch(update_todo).delete(delete_todo),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub fn default_data_path() -> PathBuf {
    let dir = ProjectDirs::from("", "", "WebTodos")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir).ok();
    dir.join("todos.json")
}

pub async fn run() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webtodos=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_path = std::env::var("WEBTODOS_DATA_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_data_path());
    let store = TodoStore::load_from_file(&data_path);
    tracing::info!(todos = store.list().len(), path = %data_path.display(), "store loaded");

    let state = AppState {
        store: Arc::new(Mutex::new(store)),
        data_path: Some(Arc::new(data_path)),
    };
    let app = router(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("PORT must be a number");

    let addr = SocketAddr::new(host.parse().expect("Invalid HOST"), port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app).await.expect("Server error");
}
