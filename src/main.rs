//! Bloggen Web 服务入口
//!
//! 启动: cargo run
//! 提交: POST http://127.0.0.1:5000/generate-blog {"topic": "..."}
//! 进度: ws://127.0.0.1:5000/ws，发送 {"type":"join_task","task_id":"..."}

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bloggen::config::load_config;
use bloggen::crew::CrewEngine;
use bloggen::llm::{LlmClient, OpenAiClient};
use bloggen::observability;
use bloggen::server::{router, ServerState};
use bloggen::tasks::{ProgressBroadcaster, TaskDispatcher, TaskRegistry};
use bloggen::tools::UnsplashClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).unwrap_or_default();

    let api_key_env = cfg
        .llm
        .api_key_env
        .clone()
        .unwrap_or_else(|| "OPENAI_API_KEY".to_string());
    let api_key = std::env::var(&api_key_env).ok();
    if api_key.is_none() {
        tracing::warn!("LLM API key not found in env {}", api_key_env);
    }
    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(
        cfg.llm.base_url.as_deref(),
        &cfg.llm.model,
        api_key.as_deref(),
    ));

    let unsplash_key = std::env::var(&cfg.unsplash.access_key_env).ok();
    let unsplash = UnsplashClient::new(unsplash_key, cfg.unsplash.timeout_secs);

    let engine = Arc::new(CrewEngine::new(Arc::clone(&llm), unsplash));
    let registry = Arc::new(TaskRegistry::new());
    let broadcaster = Arc::new(ProgressBroadcaster::new(Duration::from_millis(
        cfg.pipeline.min_event_interval_ms,
    )));
    let dispatcher = TaskDispatcher::new(Arc::clone(&registry), Arc::clone(&broadcaster), engine);

    let state = Arc::new(ServerState {
        registry,
        broadcaster,
        dispatcher,
        llm,
    });
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", cfg.web.host, cfg.web.port).parse()?;
    tracing::info!("Blog generation service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
