//! # 批量处理模块
//!
//! 批处理编排核心。
//!
//! ## 功能
//! - 收集匹配文件列表
//! - 输出路径解析（递归时保留目录结构）
//! - 单任务错误隔离
//! - 有界并行处理
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/process.rs` 使用
//! - 使用 `document/` 处理单个文件
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod config;
pub mod executor;
pub mod paths;
pub mod runner;
pub mod stats;

pub use config::BatchConfig;
pub use runner::{BatchReport, BatchRunner, DispatchMode};
