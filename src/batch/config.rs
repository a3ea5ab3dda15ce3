//! # 批处理配置
//!
//! `BatchConfig` 在运行开始前构造一次，整个运行期间不可变。
//!
//! ## 默认值
//! - 输出目录：与输入目录相同
//! - 输出格式：`png`（统一小写，去掉前导 `.`）
//! - 并行数：主机可用核心数
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs`, `batch/executor.rs`, `commands/process.rs` 使用
//! - 使用 `num_cpus` 获取默认并行度

use crate::error::{PsdToolkitError, Result};

use std::path::PathBuf;

/// 输入文件扩展名
pub const SOURCE_EXTENSION: &str = "psd";

/// 默认输出格式
pub const DEFAULT_OUTPUT_FORMAT: &str = "png";

/// 批处理配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub recursive: bool,
    pub output_format: String,
    /// None 表示使用主机并行度
    pub max_workers: Option<usize>,
}

impl BatchConfig {
    pub fn new(input_root: impl Into<PathBuf>) -> Self {
        let input_root = input_root.into();
        BatchConfig {
            output_root: input_root.clone(),
            input_root,
            recursive: false,
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            max_workers: None,
        }
    }

    /// 设置输出目录（None 表示与输入目录相同）
    pub fn with_output_root(mut self, output_root: Option<PathBuf>) -> Self {
        self.output_root = output_root.unwrap_or_else(|| self.input_root.clone());
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_output_format(mut self, format: &str) -> Self {
        self.output_format = format.trim().trim_start_matches('.').to_lowercase();
        self
    }

    pub fn with_max_workers(mut self, max_workers: Option<usize>) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// 检查配置不变量
    pub fn validate(&self) -> Result<()> {
        if self.output_format.is_empty() {
            return Err(PsdToolkitError::InvalidArgument(
                "output format must not be empty".to_string(),
            ));
        }
        if self.max_workers == Some(0) {
            return Err(PsdToolkitError::InvalidArgument(
                "max workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// 实际使用的并行数
    pub fn workers(&self) -> usize {
        self.max_workers.unwrap_or_else(num_cpus::get).max(1)
    }
}
