//! 任务进度事件
//!
//! 瞬态推送消息，不持久化、不回放；晚到的订阅者只能拿到由注册表快照
//! 合成的当前状态，拿不到历史事件（客户端契约）。

use serde::Serialize;

use crate::pipeline::{ErrorReport, TOTAL_STEPS};
use crate::tasks::registry::{GenerationTask, TaskId, TaskStatus};

/// 单条进度事件（序列化为 JSON 推送给订阅者）
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// 阶段状态更新；step 为 1-based 阶段序号，0 表示初始化/快照
    StatusUpdate {
        task_id: TaskId,
        status: TaskStatus,
        message: String,
        step: usize,
        total_steps: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// 过程日志
    LogUpdate {
        task_id: TaskId,
        log: String,
        /// 毫秒时间戳
        timestamp: i64,
    },
    /// 生成完成（终态，携带最终内容）
    GenerationComplete {
        task_id: TaskId,
        status: TaskStatus,
        message: String,
        content: String,
    },
    /// 生成失败（终态，携带结构化错误）
    GenerationError {
        task_id: TaskId,
        status: TaskStatus,
        message: String,
        error: ErrorReport,
    },
}

impl ProgressEvent {
    pub fn task_id(&self) -> &str {
        match self {
            Self::StatusUpdate { task_id, .. }
            | Self::LogUpdate { task_id, .. }
            | Self::GenerationComplete { task_id, .. }
            | Self::GenerationError { task_id, .. } => task_id,
        }
    }

    /// 终态事件（完成/失败）不参与节流，必达
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::GenerationComplete { .. } | Self::GenerationError { .. }
        )
    }

    /// 阶段序号（仅 StatusUpdate 携带）
    pub fn step(&self) -> Option<usize> {
        match self {
            Self::StatusUpdate { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// 由注册表快照合成一条当前状态事件（订阅/重连补偿用）
    pub fn snapshot_of(task: &GenerationTask) -> Self {
        Self::StatusUpdate {
            task_id: task.id.clone(),
            status: task.status,
            message: task.current_step.clone(),
            step: 0,
            total_steps: TOTAL_STEPS,
            detail: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = ProgressEvent::StatusUpdate {
            task_id: "task_1".to_string(),
            status: TaskStatus::InProgress,
            message: "working".to_string(),
            step: 2,
            total_steps: 4,
            detail: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "status_update");
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["step"], 2);
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn test_terminal_flags() {
        let log = ProgressEvent::LogUpdate {
            task_id: "task_1".to_string(),
            log: "hello".to_string(),
            timestamp: 0,
        };
        assert!(!log.is_terminal());
        assert_eq!(log.step(), None);

        let done = ProgressEvent::GenerationComplete {
            task_id: "task_1".to_string(),
            status: TaskStatus::Completed,
            message: "done".to_string(),
            content: "post".to_string(),
        };
        assert!(done.is_terminal());
    }
}
