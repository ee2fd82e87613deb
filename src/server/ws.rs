//! WebSocket 推送
//!
//! 客户端发送 {"type":"join_task","task_id":...} 订阅任务进度；
//! 订阅回执 joined_task 后，任务存在时补发一条当前状态快照
//!（重连契约：事件不回放，错过的进度以快照补齐）。
//! 一个连接可先后加入多个任务。

use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};

use crate::server::ServerState;
use crate::tasks::ProgressEvent;

/// 客户端 -> 服务端
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    /// 订阅某任务的进度
    JoinTask { task_id: String },
    Ping {
        #[serde(default)]
        timestamp: Option<i64>,
    },
}

/// 服务端 -> 客户端控制消息（进度事件由 ProgressEvent 直接序列化下发）
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    Connected { message: String },
    JoinedTask { task_id: String, message: String },
    Pong {
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },
    Error { message: String },
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // 单写者：所有出站消息经 mpsc 汇聚后写回 socket
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(WsMessage::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    send_json(
        &tx,
        &ServerMessage::Connected {
            message: "Connected to blog generation service".to_string(),
        },
    );

    while let Some(msg) = ws_rx.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("WebSocket receive error: {}", e);
                break;
            }
        };

        match msg {
            WsMessage::Text(text) => {
                let client_msg: ClientMessage = match serde_json::from_str(&text) {
                    Ok(m) => m,
                    Err(e) => {
                        send_json(
                            &tx,
                            &ServerMessage::Error {
                                message: format!("parse_error: {}", e),
                            },
                        );
                        continue;
                    }
                };

                match client_msg {
                    ClientMessage::JoinTask { task_id } => {
                        join_task(&state, &tx, task_id).await;
                    }
                    ClientMessage::Ping { timestamp } => {
                        send_json(&tx, &ServerMessage::Pong { timestamp });
                    }
                }
            }
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    writer.abort();
}

/// 订阅任务：回执 + 快照补偿 + 转发进度事件直至通道关闭或连接断开
async fn join_task(state: &Arc<ServerState>, tx: &mpsc::UnboundedSender<String>, task_id: String) {
    send_json(
        tx,
        &ServerMessage::JoinedTask {
            task_id: task_id.clone(),
            message: format!("Joined task {}", task_id),
        },
    );

    // 先订阅再取快照，两者之间的事件不会丢
    let mut events = state.broadcaster.subscribe(&task_id).await;

    if let Some(task) = state.registry.get(&task_id).await {
        send_json(tx, &ProgressEvent::snapshot_of(&task));
    }

    let tx = tx.clone();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let json = serde_json::to_string(&event).unwrap_or_default();
                    if tx.send(json).is_err() {
                        break;
                    }
                }
                // 慢订阅者被丢事件：继续收新的，错过的由快照契约兜底
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(task_id = %task_id, skipped, "progress subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

fn send_json<T: Serialize>(tx: &mpsc::UnboundedSender<String>, msg: &T) {
    if let Ok(json) = serde_json::to_string(msg) {
        let _ = tx.send(json);
    }
}
