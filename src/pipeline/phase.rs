//! 静态阶段表
//!
//! 阶段顺序在编译期固定：研究 -> 撰写 -> 审校 -> 定稿。
//! 每个 PhaseSpec 持有类型化的工作函数，而非运行时按名称查表。

use futures_util::future::BoxFuture;

use crate::crew::ContentEngine;
use crate::pipeline::context::PipelineContext;

/// 阶段种类：决定产出写回 PipelineContext 的哪个槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Research,
    Generation,
    Verification,
    Finalization,
}

/// 阶段工作函数：接收累积上下文，产出本阶段内容或以文本描述失败
pub type PhaseFn =
    for<'a> fn(&'a dyn ContentEngine, &'a PipelineContext) -> BoxFuture<'a, Result<String, String>>;

/// 单个阶段的静态描述：名称、进度文案与工作函数
pub struct PhaseSpec {
    pub kind: PhaseKind,
    pub name: &'static str,
    pub starting_message: &'static str,
    pub starting_detail: &'static str,
    pub completed_message: &'static str,
    pub completed_detail: &'static str,
    pub run: PhaseFn,
}

fn run_research<'a>(
    engine: &'a dyn ContentEngine,
    ctx: &'a PipelineContext,
) -> BoxFuture<'a, Result<String, String>> {
    engine.research(ctx)
}

fn run_compose<'a>(
    engine: &'a dyn ContentEngine,
    ctx: &'a PipelineContext,
) -> BoxFuture<'a, Result<String, String>> {
    engine.compose(ctx)
}

fn run_verify<'a>(
    engine: &'a dyn ContentEngine,
    ctx: &'a PipelineContext,
) -> BoxFuture<'a, Result<String, String>> {
    engine.verify(ctx)
}

fn run_polish<'a>(
    engine: &'a dyn ContentEngine,
    ctx: &'a PipelineContext,
) -> BoxFuture<'a, Result<String, String>> {
    engine.polish(ctx)
}

/// 固定顺序的阶段表
pub const PHASES: [PhaseSpec; 4] = [
    PhaseSpec {
        kind: PhaseKind::Research,
        name: "research",
        starting_message: "Conducting deep research on the topic...",
        starting_detail: "Senior Researcher is analyzing trends, gathering data, and finding key insights",
        completed_message: "Research completed - found valuable insights!",
        completed_detail: "Moving to content generation phase",
        run: run_research,
    },
    PhaseSpec {
        kind: PhaseKind::Generation,
        name: "content_generation",
        starting_message: "Creating engaging blog content...",
        starting_detail: "Content Writer is crafting a compelling narrative based on research findings",
        completed_message: "Content with professional images completed!",
        completed_detail: "Proceeding to fact-checking and verification",
        run: run_compose,
    },
    PhaseSpec {
        kind: PhaseKind::Verification,
        name: "fact_checking",
        starting_message: "Fact-checking and verifying information...",
        starting_detail: "Quality Assurance Editor is verifying claims and ensuring accuracy",
        completed_message: "Fact-checking completed - content verified!",
        completed_detail: "Moving to final polishing and formatting",
        run: run_verify,
    },
    PhaseSpec {
        kind: PhaseKind::Finalization,
        name: "finalization",
        starting_message: "Finalizing and polishing your blog post...",
        starting_detail: "Chief Editor is applying final touches and formatting",
        completed_message: "Blog post completed and ready!",
        completed_detail: "Your professional blog post has been generated successfully",
        run: run_polish,
    },
];

/// 流水线阶段总数
pub const TOTAL_STEPS: usize = PHASES.len();
