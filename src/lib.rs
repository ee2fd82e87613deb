//! Bloggen - Rust 博客生成服务
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **crew**: 内容生成 Crew（研究员 / 撰稿人 / 审校 / 主编）与引擎抽象
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **pipeline**: 阶段流水线状态机与错误分类
//! - **server**: REST + WebSocket 服务
//! - **tasks**: 任务注册表、进度广播、任务派发
//! - **tools**: 外部工具（Unsplash 图片搜索）

pub mod config;
pub mod crew;
pub mod llm;
pub mod observability;
pub mod pipeline;
pub mod server;
pub mod tasks;
pub mod tools;
