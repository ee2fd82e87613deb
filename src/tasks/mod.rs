//! 任务层
//!
//! - **registry**: 进程级任务注册表（快照读取）
//! - **events**: 进度事件定义
//! - **broadcast**: 按任务分通道的尽力而为广播
//! - **dispatcher**: 请求校验与后台派发

pub mod broadcast;
pub mod dispatcher;
pub mod events;
pub mod registry;

pub use broadcast::ProgressBroadcaster;
pub use dispatcher::{SubmitError, TaskDispatcher};
pub use events::ProgressEvent;
pub use registry::{GenerationTask, TaskId, TaskRegistry, TaskStatus};
