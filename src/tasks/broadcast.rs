//! 进度广播
//!
//! 每个任务一个 broadcast 通道，单任务内事件按发布顺序送达；
//! 不同订阅者之间、不同任务之间无跨序保证。尽力而为：无订阅者时事件即丢，
//! 不做回放，重连方应从 TaskRegistry 取快照补齐（客户端契约）。
//!
//! 非终态事件（status/log）在发布侧按最小间隔 pacing，避免冲垮慢订阅者；
//! 终态事件（generation_complete / generation_error）从不延迟或丢弃。

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, RwLock};

use crate::tasks::events::ProgressEvent;
use crate::tasks::registry::TaskId;

/// 单任务通道容量：慢订阅者超过此积压会丢最旧事件（broadcast lagged 语义）
const CHANNEL_CAPACITY: usize = 64;

pub struct ProgressBroadcaster {
    channels: RwLock<HashMap<TaskId, broadcast::Sender<ProgressEvent>>>,
    /// 相邻非终态事件的最小间隔；zero 表示不节流
    min_interval: Duration,
    /// 每任务最近一次发布时刻
    last_publish: RwLock<HashMap<TaskId, Instant>>,
}

impl ProgressBroadcaster {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            min_interval,
            last_publish: RwLock::new(HashMap::new()),
        }
    }

    /// 订阅任务通道；通道不存在时创建，因此可在事件产生前订阅
    pub async fn subscribe(&self, task_id: &str) -> broadcast::Receiver<ProgressEvent> {
        self.sender_for(task_id).await.subscribe()
    }

    /// 发布事件：非终态事件先按最小间隔 pacing；无订阅者时静默丢弃
    ///
    /// 单个任务的事件都由其 PhaseRunner 顺序发布，pacing 的 sleep 不会乱序。
    pub async fn publish(&self, event: ProgressEvent) {
        let task_id = event.task_id().to_string();

        if !event.is_terminal() && !self.min_interval.is_zero() {
            let wait = {
                let last = self.last_publish.read().await;
                last.get(&task_id)
                    .map(|t| self.min_interval.saturating_sub(t.elapsed()))
                    .unwrap_or(Duration::ZERO)
            };
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
        }

        self.last_publish
            .write()
            .await
            .insert(task_id.clone(), Instant::now());

        let sender = self.sender_for(&task_id).await;
        let _ = sender.send(event);
    }

    /// 任务终结后释放通道；已订阅的接收端读完积压事件后收到 Closed
    pub async fn close(&self, task_id: &str) {
        self.channels.write().await.remove(task_id);
        self.last_publish.write().await.remove(task_id);
    }

    /// 当前打开的通道数
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    async fn sender_for(&self, task_id: &str) -> broadcast::Sender<ProgressEvent> {
        if let Some(sender) = self.channels.read().await.get(task_id) {
            return sender.clone();
        }
        let mut channels = self.channels.write().await;
        channels
            .entry(task_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::registry::TaskStatus;

    fn log_event(task_id: &str, log: &str) -> ProgressEvent {
        ProgressEvent::LogUpdate {
            task_id: task_id.to_string(),
            log: log.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    #[tokio::test]
    async fn test_publish_in_order() {
        let broadcaster = ProgressBroadcaster::new(Duration::ZERO);
        let mut rx = broadcaster.subscribe("task_1").await;

        broadcaster.publish(log_event("task_1", "first")).await;
        broadcaster.publish(log_event("task_1", "second")).await;

        match rx.recv().await.unwrap() {
            ProgressEvent::LogUpdate { log, .. } => assert_eq!(log, "first"),
            other => panic!("unexpected event: {:?}", other),
        }
        match rx.recv().await.unwrap() {
            ProgressEvent::LogUpdate { log, .. } => assert_eq!(log, "second"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_dropped() {
        let broadcaster = ProgressBroadcaster::new(Duration::ZERO);
        // 不 panic、不阻塞
        broadcaster.publish(log_event("task_1", "lost")).await;

        let mut rx = broadcaster.subscribe("task_1").await;
        broadcaster.publish(log_event("task_1", "seen")).await;
        match rx.recv().await.unwrap() {
            ProgressEvent::LogUpdate { log, .. } => assert_eq!(log, "seen"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_terminal_event_skips_pacing() {
        let broadcaster = ProgressBroadcaster::new(Duration::from_secs(30));
        let mut rx = broadcaster.subscribe("task_1").await;

        broadcaster.publish(log_event("task_1", "first")).await;
        let terminal = ProgressEvent::GenerationComplete {
            task_id: "task_1".to_string(),
            status: TaskStatus::Completed,
            message: "done".to_string(),
            content: "post".to_string(),
        };
        // 若终态事件参与 pacing，这里会等 30 秒导致测试超时
        tokio::time::timeout(Duration::from_secs(1), broadcaster.publish(terminal))
            .await
            .expect("terminal event must not be throttled");

        rx.recv().await.unwrap();
        assert!(rx.recv().await.unwrap().is_terminal());
    }

    #[tokio::test]
    async fn test_close_releases_channel() {
        let broadcaster = ProgressBroadcaster::new(Duration::ZERO);
        let mut rx = broadcaster.subscribe("task_1").await;
        broadcaster.publish(log_event("task_1", "first")).await;
        broadcaster.close("task_1").await;
        assert_eq!(broadcaster.channel_count().await, 0);

        // 积压事件仍可读完，随后通道关闭
        assert!(rx.recv().await.is_ok());
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }
}
