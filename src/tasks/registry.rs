//! 任务注册表
//!
//! 进程级 task_id -> 任务记录映射。写入仅来自持有该任务的 PhaseRunner；
//! 轮询与订阅路径并发读取，读到的是读锁下克隆的完整快照，不存在半写记录。
//! 记录随进程存续（不持久化、不淘汰）。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::pipeline::ErrorReport;

/// 任务 ID
pub type TaskId = String;

/// 任务状态：queued -> in_progress -> {completed | failed}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// 已登记，等待后台执行
    Queued,
    /// 流水线执行中
    InProgress,
    /// 已完成（终态）
    Completed,
    /// 执行失败（终态）
    Failed,
}

impl TaskStatus {
    /// 终态不再迁移
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// 博客生成任务记录
#[derive(Debug, Clone, Serialize)]
pub struct GenerationTask {
    /// 任务 ID
    pub id: TaskId,
    /// 用户提交的主题（创建后不变）
    pub topic: String,
    /// 任务状态
    pub status: TaskStatus,
    /// 面向用户的当前步骤描述（last-write-wins）
    pub current_step: String,
    /// 创建时间（毫秒时间戳）
    pub created_at: i64,
    /// 完成时间
    pub completed_at: Option<i64>,
    /// 最终产出，仅 status=completed 时存在
    pub result: Option<String>,
    /// 结构化错误，仅 status=failed 时存在
    pub error: Option<ErrorReport>,
}

impl GenerationTask {
    pub fn new(id: TaskId, topic: String) -> Self {
        Self {
            id,
            topic,
            status: TaskStatus::Queued,
            current_step: "Queued for processing".to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
            completed_at: None,
            result: None,
            error: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}

/// 任务注册表（内存版）
pub struct TaskRegistry {
    tasks: RwLock<HashMap<TaskId, GenerationTask>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// 登记新任务
    pub async fn create(&self, task: GenerationTask) {
        self.tasks.write().await.insert(task.id.clone(), task);
    }

    /// 读取单任务快照
    pub async fn get(&self, task_id: &str) -> Option<GenerationTask> {
        self.tasks.read().await.get(task_id).cloned()
    }

    /// 对单任务记录做原子读改写；任务不存在时返回 false
    pub async fn update(&self, task_id: &str, mutate: impl FnOnce(&mut GenerationTask)) -> bool {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(task_id) {
            Some(task) => {
                mutate(task);
                true
            }
            None => false,
        }
    }

    /// 全部任务快照（监控/调试用），按创建时间排序
    pub async fn list(&self) -> Vec<GenerationTask> {
        let mut all: Vec<GenerationTask> = self.tasks.read().await.values().cloned().collect();
        all.sort_by_key(|t| t.created_at);
        all
    }

    /// 当前任务数
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registry_basic() {
        let registry = TaskRegistry::new();
        let task = GenerationTask::new("task_1".to_string(), "quantum computing".to_string());
        registry.create(task).await;

        let snapshot = registry.get("task_1").await.unwrap();
        assert_eq!(snapshot.status, TaskStatus::Queued);
        assert_eq!(snapshot.current_step, "Queued for processing");
        assert!(snapshot.result.is_none());
        assert!(snapshot.error.is_none());

        let updated = registry
            .update("task_1", |t| {
                t.status = TaskStatus::InProgress;
                t.current_step = "working".to_string();
            })
            .await;
        assert!(updated);

        let snapshot = registry.get("task_1").await.unwrap();
        assert_eq!(snapshot.status, TaskStatus::InProgress);
        assert_eq!(snapshot.current_step, "working");
    }

    #[tokio::test]
    async fn test_registry_unknown_task() {
        let registry = TaskRegistry::new();
        assert!(registry.get("task_missing").await.is_none());
        assert!(!registry.update("task_missing", |_| {}).await);
    }

    #[tokio::test]
    async fn test_registry_list_sorted() {
        let registry = TaskRegistry::new();
        let mut first = GenerationTask::new("task_a".to_string(), "a".to_string());
        first.created_at = 100;
        let mut second = GenerationTask::new("task_b".to_string(), "b".to_string());
        second.created_at = 50;
        registry.create(first).await;
        registry.create(second).await;

        let all = registry.list().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "task_b");
        assert_eq!(all[1].id, "task_a");
    }
}
