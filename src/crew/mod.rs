//! 内容生成 Crew
//!
//! 流水线的外部协作方：每个阶段的实际内容工作由 ContentEngine 完成，
//! 引擎内部如何编排（LLM、检索、配图）对状态机不可见。
//! 实现可为 LLM Crew（生产）或脚本化引擎（测试）。

pub mod agents;
pub mod engine;

pub use engine::CrewEngine;

use async_trait::async_trait;

use crate::pipeline::PipelineContext;

/// 阶段工作提供方：接收累积上下文，产出本阶段内容，或以任意文本描述失败
///
/// 调用可能耗时任意长（外部网络调用），也可能以任意原因失败；
/// 失败文本会交给错误分类器，不需要预先归类。
#[async_trait]
pub trait ContentEngine: Send + Sync {
    /// 阶段 1：主题研究
    async fn research(&self, ctx: &PipelineContext) -> Result<String, String>;
    /// 阶段 2：基于研究撰写带配图的初稿
    async fn compose(&self, ctx: &PipelineContext) -> Result<String, String>;
    /// 阶段 3：事实核查
    async fn verify(&self, ctx: &PipelineContext) -> Result<String, String>;
    /// 阶段 4：定稿润色
    async fn polish(&self, ctx: &PipelineContext) -> Result<String, String>;
}
