//! 阶段流水线
//!
//! - **phase**: 静态阶段表（研究 -> 撰写 -> 审校 -> 定稿）
//! - **context**: 跨阶段累积的流水线上下文
//! - **runner**: 状态机，驱动单个任务跑完整条流水线
//! - **classifier**: 失败分类与结构化错误报告

pub mod classifier;
pub mod context;
pub mod phase;
pub mod runner;

pub use classifier::{classify, ErrorKind, ErrorReport, Severity};
pub use context::PipelineContext;
pub use phase::{PhaseKind, PhaseSpec, PHASES, TOTAL_STEPS};
pub use runner::PhaseRunner;
