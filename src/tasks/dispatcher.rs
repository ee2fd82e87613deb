//! 任务派发
//!
//! 校验请求、分配任务 ID、登记初始记录，并为每个任务启动独立的后台流水线。
//! 每任务一个 tokio task，不限并发、无准入控制（已知缺口，见 DESIGN.md）。

use std::sync::Arc;

use thiserror::Error;

use crate::crew::ContentEngine;
use crate::pipeline::PhaseRunner;
use crate::tasks::broadcast::ProgressBroadcaster;
use crate::tasks::registry::{GenerationTask, TaskId, TaskRegistry};

/// 提交失败（调用方可见，HTTP 400 级别）
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Topic is required")]
    EmptyTopic,
}

pub struct TaskDispatcher {
    registry: Arc<TaskRegistry>,
    broadcaster: Arc<ProgressBroadcaster>,
    engine: Arc<dyn ContentEngine>,
}

impl TaskDispatcher {
    pub fn new(
        registry: Arc<TaskRegistry>,
        broadcaster: Arc<ProgressBroadcaster>,
        engine: Arc<dyn ContentEngine>,
    ) -> Self {
        Self {
            registry,
            broadcaster,
            engine,
        }
    }

    /// 提交新任务：返回前记录即已登记可查（status=queued），流水线在后台独立执行
    pub async fn submit(&self, topic: &str) -> Result<TaskId, SubmitError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(SubmitError::EmptyTopic);
        }

        let task_id = format!("task_{}", uuid::Uuid::new_v4());
        self.registry
            .create(GenerationTask::new(task_id.clone(), topic.to_string()))
            .await;

        let runner = PhaseRunner::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.broadcaster),
            Arc::clone(&self.engine),
        );
        let id = task_id.clone();
        let topic = topic.to_string();
        tokio::spawn(async move {
            runner.run(&id, &topic).await;
        });

        tracing::info!(task_id = %task_id, "blog generation task queued");
        Ok(task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    use crate::pipeline::PipelineContext;
    use crate::tasks::registry::TaskStatus;

    struct NoopEngine;

    #[async_trait]
    impl ContentEngine for NoopEngine {
        async fn research(&self, _ctx: &PipelineContext) -> Result<String, String> {
            Ok("research".to_string())
        }
        async fn compose(&self, _ctx: &PipelineContext) -> Result<String, String> {
            Ok("draft".to_string())
        }
        async fn verify(&self, _ctx: &PipelineContext) -> Result<String, String> {
            Ok("verified".to_string())
        }
        async fn polish(&self, _ctx: &PipelineContext) -> Result<String, String> {
            Ok("final".to_string())
        }
    }

    fn dispatcher() -> (TaskDispatcher, Arc<TaskRegistry>) {
        let registry = Arc::new(TaskRegistry::new());
        let broadcaster = Arc::new(ProgressBroadcaster::new(Duration::ZERO));
        let dispatcher = TaskDispatcher::new(
            Arc::clone(&registry),
            broadcaster,
            Arc::new(NoopEngine),
        );
        (dispatcher, registry)
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_topic() {
        let (dispatcher, registry) = dispatcher();
        assert_eq!(dispatcher.submit("").await, Err(SubmitError::EmptyTopic));
        assert_eq!(dispatcher.submit("   ").await, Err(SubmitError::EmptyTopic));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_submit_registers_task_immediately() {
        let (dispatcher, registry) = dispatcher();
        let task_id = dispatcher.submit("quantum computing").await.unwrap();

        // 返回即可见；后台可能已开跑，但状态只会沿 queued -> in_progress 前进
        let task = registry.get(&task_id).await.unwrap();
        assert_eq!(task.topic, "quantum computing");
        assert!(matches!(
            task.status,
            TaskStatus::Queued | TaskStatus::InProgress | TaskStatus::Completed
        ));
    }
}
