//! 阶段流水线状态机
//!
//! queued -> in_progress -> {completed | failed}：按 PHASES 固定顺序执行，
//! 前一阶段产出是后一阶段输入，阶段之间不重叠、不跳过、不重排。
//! 任一阶段失败即分类记录并终止本任务，不重试、不保留部分产出；
//! 失败不外溢，也不影响其他任务。

use std::sync::Arc;

use crate::crew::ContentEngine;
use crate::pipeline::classifier::ErrorReport;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase::{PHASES, TOTAL_STEPS};
use crate::tasks::broadcast::ProgressBroadcaster;
use crate::tasks::events::ProgressEvent;
use crate::tasks::registry::{TaskRegistry, TaskStatus};

pub struct PhaseRunner {
    registry: Arc<TaskRegistry>,
    broadcaster: Arc<ProgressBroadcaster>,
    engine: Arc<dyn ContentEngine>,
}

impl PhaseRunner {
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

    /// 驱动一个任务跑完整条流水线；出错写回注册表并广播，不向上传播
    pub async fn run(&self, task_id: &str, topic: &str) {
        self.registry
            .update(task_id, |t| {
                t.status = TaskStatus::InProgress;
                t.current_step = "Initializing blog generation workflow...".to_string();
            })
            .await;
        self.status(task_id, 0, "Initializing blog generation workflow...", None)
            .await;
        self.log(
            task_id,
            format!("Blog generation started for topic: \"{}\"", topic),
        )
        .await;

        let current_year = chrono::Utc::now().format("%Y").to_string();
        let mut ctx = PipelineContext::new(topic, current_year);

        for (i, phase) in PHASES.iter().enumerate() {
            let step = i + 1;

            self.registry
                .update(task_id, |t| t.current_step = phase.starting_message.to_string())
                .await;
            self.status(task_id, step, phase.starting_message, Some(phase.starting_detail))
                .await;
            self.log(
                task_id,
                format!("Step {}/{}: {}", step, TOTAL_STEPS, phase.starting_message),
            )
            .await;

            match (phase.run)(self.engine.as_ref(), &ctx).await {
                Ok(output) => {
                    ctx.absorb(phase.kind, output);
                    self.status(task_id, step, phase.completed_message, Some(phase.completed_detail))
                        .await;
                    self.log(task_id, format!("Phase {} completed", phase.name)).await;
                }
                Err(failure) => {
                    self.fail(task_id, &failure).await;
                    return;
                }
            }
        }

        let content = ctx.latest().unwrap_or_default().to_string();
        self.registry
            .update(task_id, |t| {
                t.status = TaskStatus::Completed;
                t.result = Some(content.clone());
                t.completed_at = Some(chrono::Utc::now().timestamp_millis());
                t.current_step = "Blog generation completed successfully!".to_string();
            })
            .await;
        self.log(task_id, "Blog generation workflow completed successfully".to_string())
            .await;
        self.broadcaster
            .publish(ProgressEvent::GenerationComplete {
                task_id: task_id.to_string(),
                status: TaskStatus::Completed,
                message: "Blog generation completed successfully!".to_string(),
                content,
            })
            .await;
        self.broadcaster.close(task_id).await;
        tracing::info!(task_id = %task_id, "blog generation completed");
    }

    /// 失败路径：分类一次、写回记录、广播终态事件
    async fn fail(&self, task_id: &str, failure: &str) {
        let report = ErrorReport::from_failure(failure);
        self.registry
            .update(task_id, |t| {
                t.status = TaskStatus::Failed;
                t.error = Some(report.clone());
                t.completed_at = Some(chrono::Utc::now().timestamp_millis());
                t.current_step = format!("Error: {}", report.user_message);
            })
            .await;
        tracing::error!(task_id = %task_id, error = %failure, "blog generation failed");
        self.broadcaster
            .publish(ProgressEvent::GenerationError {
                task_id: task_id.to_string(),
                status: TaskStatus::Failed,
                message: "Blog generation failed. Please try again.".to_string(),
                error: report,
            })
            .await;
        self.broadcaster.close(task_id).await;
    }

    async fn status(&self, task_id: &str, step: usize, message: &str, detail: Option<&str>) {
        self.broadcaster
            .publish(ProgressEvent::StatusUpdate {
                task_id: task_id.to_string(),
                status: TaskStatus::InProgress,
                message: message.to_string(),
                step,
                total_steps: TOTAL_STEPS,
                detail: detail.map(str::to_string),
            })
            .await;
    }

    async fn log(&self, task_id: &str, log: String) {
        self.broadcaster
            .publish(ProgressEvent::LogUpdate {
                task_id: task_id.to_string(),
                log,
                timestamp: chrono::Utc::now().timestamp_millis(),
            })
            .await;
    }
}
