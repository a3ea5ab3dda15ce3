//! # 统一错误处理模块
//!
//! 定义 psd-toolkit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - 致命错误（派发前）：`DirectoryNotFound`, `InvalidArgument`
//! - 单文件错误（被 `batch/executor.rs` 捕获）：`Load`, `Transform`, `Export`, `Unexpected`
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use std::fmt;
use thiserror::Error;

/// psd-toolkit 统一错误类型
#[derive(Error, Debug)]
pub enum PsdToolkitError {
    // ─────────────────────────────────────────────────────────────
    // 致命错误
    // ─────────────────────────────────────────────────────────────
    #[error("Input directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 单文件错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Failed to transform layers of {path}: {reason}")]
    Transform { path: String, reason: String },

    #[error("Failed to export {path}: {reason}")]
    Export { path: String, reason: String },

    #[error("Failed to write: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl PsdToolkitError {
    /// 错误所属的类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            PsdToolkitError::DirectoryNotFound { .. } => ErrorKind::NotFound,
            PsdToolkitError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            PsdToolkitError::Load { .. } => ErrorKind::Load,
            PsdToolkitError::Transform { .. } => ErrorKind::Transform,
            PsdToolkitError::Export { .. } | PsdToolkitError::FileWriteError { .. } => {
                ErrorKind::Export
            }
            PsdToolkitError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

/// 错误类别，记录在 `TaskResult` 中
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Load,
    Transform,
    Export,
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not-found"),
            ErrorKind::InvalidArgument => write!(f, "invalid-argument"),
            ErrorKind::Load => write!(f, "load"),
            ErrorKind::Transform => write!(f, "transform"),
            ErrorKind::Export => write!(f, "export"),
            ErrorKind::Unexpected => write!(f, "unexpected"),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, PsdToolkitError>;
