//! # 数据模型模块
//!
//! 定义批处理任务、结果与统计的数据模型。
//!
//! ## 依赖关系
//! - 被 `batch/` 和 `commands/` 使用
//! - 子模块: batch

pub mod batch;

pub use batch::{BatchStats, FileTask, TaskResult};
