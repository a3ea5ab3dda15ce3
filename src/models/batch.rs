//! # 批处理数据模型
//!
//! - `FileTask`: 一个待处理的输入文件，由文件收集器产生，只被调度一次
//! - `TaskResult`: 单个任务的不可变结果，每个 `FileTask` 恰好对应一个
//! - `BatchStats`: 批处理计数
//!
//! ## 依赖关系
//! - 被 `batch/` 模块使用
//! - 使用 `error.rs` 的 `ErrorKind`

use crate::error::{ErrorKind, PsdToolkitError};

use std::path::{Path, PathBuf};

/// 单个待处理文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub source: PathBuf,
}

impl FileTask {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        FileTask {
            source: source.into(),
        }
    }

    /// 用于消息显示的文件名
    pub fn file_name(&self) -> String {
        display_name(&self.source)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 单个文件的处理结果
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub source: PathBuf,
    pub success: bool,
    pub message: String,
    pub layers_hidden: usize,
    pub error: Option<ErrorKind>,
}

impl TaskResult {
    pub fn success(task: &FileTask, layers_hidden: usize) -> Self {
        TaskResult {
            source: task.source.clone(),
            success: true,
            message: format!("✓ {}: Hidden {} layers", task.file_name(), layers_hidden),
            layers_hidden,
            error: None,
        }
    }

    pub fn failure(task: &FileTask, error: &PsdToolkitError) -> Self {
        TaskResult {
            source: task.source.clone(),
            success: false,
            message: format!("✗ {}: Failed - {}", task.file_name(), error),
            layers_hidden: 0,
            error: Some(error.kind()),
        }
    }
}

/// 批处理统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// 发现的文件总数
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// 预留给过滤功能，目前恒为 0
    pub skipped: usize,
}

impl BatchStats {
    pub fn new(total: usize) -> Self {
        BatchStats {
            total,
            ..BatchStats::default()
        }
    }

    /// 已收到的结果数
    pub fn completed(&self) -> usize {
        self.success + self.failed + self.skipped
    }

    pub fn is_complete(&self) -> bool {
        self.completed() == self.total
    }
}
