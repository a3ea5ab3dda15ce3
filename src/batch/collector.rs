//! # 文件收集器
//!
//! 在输入目录下收集待处理的文件列表。
//!
//! ## 功能
//! - glob 模式匹配文件名（大小写按文件系统原样，不做折叠）
//! - 非递归时只匹配直接子文件，递归时匹配任意深度
//! - 按名称匹配符号链接（包括失效的链接），但不进入链接指向的目录
//! - 输入目录不存在或不是目录时返回 `DirectoryNotFound`
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 调用
//! - 使用 `walkdir` 遍历目录, `glob` 匹配文件名

use crate::error::{PsdToolkitError, Result};

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// 文件收集器
pub struct FileCollector {
    /// 输入目录
    root: PathBuf,
    /// 文件名匹配模式（None 匹配所有文件）
    pattern: Option<Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器（默认匹配所有文件）
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pattern: None,
            recursive: false,
        }
    }

    /// 按扩展名匹配，等价于 `*.<ext>`
    pub fn with_extension(self, extension: &str) -> Result<Self> {
        self.with_pattern(&format!("*.{}", extension))
    }

    /// 设置匹配模式
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let compiled = Pattern::new(pattern).map_err(|e| {
            PsdToolkitError::InvalidArgument(format!("Invalid pattern '{}': {}", pattern, e))
        })?;
        self.pattern = Some(compiled);
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 惰性遍历匹配的文件
    ///
    /// 根目录不存在时立即失败，不会产生任何条目。
    pub fn iter(&self) -> Result<impl Iterator<Item = PathBuf> + '_> {
        if !self.root.is_dir() {
            return Err(PsdToolkitError::DirectoryNotFound {
                path: self.root.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() || e.path_is_symlink())
            .filter(move |e| self.matches(e.path()))
            .map(|e| e.into_path());

        Ok(walker)
    }

    /// 收集所有匹配的文件（排序后返回）
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = self.iter()?.collect();
        files.sort();
        Ok(files)
    }

    /// 检查文件名是否匹配模式
    fn matches(&self, path: &Path) -> bool {
        let Some(pattern) = &self.pattern else {
            return true;
        };
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => pattern.matches_with(name, MATCH_OPTIONS),
            None => false,
        }
    }
}
