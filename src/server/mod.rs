//! REST + WebSocket 服务
//!
//! - `POST /generate-blog`: 提交生成任务，202 返回 task_id
//! - `GET  /task-status/:task_id`: 轮询任务快照
//! - `GET  /tasks`: 全部任务（监控/调试）
//! - `GET  /ws`: WebSocket，join_task 后接收该任务的实时进度
//! - `GET  /api/health`: 存活探针
//! - `GET  /api/metrics`: LLM token 累计用量

mod ws;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::llm::LlmClient;
use crate::tasks::{
    GenerationTask, ProgressBroadcaster, SubmitError, TaskDispatcher, TaskRegistry, TaskStatus,
};

pub struct ServerState {
    pub registry: Arc<TaskRegistry>,
    pub broadcaster: Arc<ProgressBroadcaster>,
    pub dispatcher: TaskDispatcher,
    pub llm: Arc<dyn LlmClient>,
}

pub fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/generate-blog", post(generate_blog))
        .route("/task-status/:task_id", get(task_status))
        .route("/tasks", get(tasks_list))
        .route("/ws", get(ws::ws_handler))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/metrics", get(api_metrics))
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    topic: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    task_id: String,
    status: TaskStatus,
    message: String,
}

/// POST /generate-blog：校验 topic 后派发任务，立即返回
async fn generate_blog(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<GenerateResponse>), (StatusCode, Json<serde_json::Value>)> {
    let topic = req.topic.unwrap_or_default();
    match state.dispatcher.submit(&topic).await {
        Ok(task_id) => Ok((
            StatusCode::ACCEPTED,
            Json(GenerateResponse {
                task_id,
                status: TaskStatus::Queued,
                message: "Blog generation started. Connect to WebSocket for real-time updates."
                    .to_string(),
            }),
        )),
        Err(SubmitError::EmptyTopic) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Topic is required"})),
        )),
    }
}

/// GET /task-status/:task_id：任务快照，终态后重复查询结果不变
async fn task_status(
    State(state): State<Arc<ServerState>>,
    Path(task_id): Path<String>,
) -> Result<Json<GenerationTask>, (StatusCode, Json<serde_json::Value>)> {
    match state.registry.get(&task_id).await {
        Some(task) => Ok(Json(task)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Task not found"})),
        )),
    }
}

/// GET /tasks：全部任务快照
async fn tasks_list(State(state): State<Arc<ServerState>>) -> Json<Vec<GenerationTask>> {
    Json(state.registry.list().await)
}

#[derive(Debug, Serialize)]
struct MetricsResponse {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

/// GET /api/metrics：LLM token 累计用量
async fn api_metrics(State(state): State<Arc<ServerState>>) -> Json<MetricsResponse> {
    let (prompt_tokens, completion_tokens, total_tokens) = state.llm.token_usage();
    Json(MetricsResponse {
        prompt_tokens,
        completion_tokens,
        total_tokens,
    })
}
