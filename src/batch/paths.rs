//! # 输出路径解析
//!
//! 将输入文件映射为输出文件路径。
//!
//! ## 规则
//! 1. 递归且输出目录不同于输入目录：保留相对输入目录的子目录结构
//!    `in/sub/a.psd` → `out/sub/a.png`
//! 2. 其余情况（非递归，或输出目录即输入目录）：平铺到输出目录
//!    `in/sub/a.psd` → `out/a.png`
//!
//! 平铺时不同子目录中的同名文件会写到同一路径，后写入者覆盖先写入者。
//!
//! ## 依赖关系
//! - 被 `batch/executor.rs` 调用
//! - 无外部 crate 依赖

use crate::error::{PsdToolkitError, Result};

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// 计算输出文件路径
pub fn resolve_output_path(
    source: &Path,
    input_root: &Path,
    output_root: &Path,
    recursive: bool,
    format: &str,
) -> PathBuf {
    if recursive && output_root != input_root {
        if let Ok(relative) = source.strip_prefix(input_root) {
            return output_root.join(relative).with_extension(format);
        }
    }

    let file_name = source.file_name().unwrap_or_else(|| OsStr::new("output"));
    output_root.join(file_name).with_extension(format)
}

/// 输出目录创建记录
///
/// 每个目标目录只调用一次 `create_dir_all`，在所有工作线程间共享。
#[derive(Debug, Default)]
pub struct OutputDirs {
    created: Mutex<HashSet<PathBuf>>,
}

impl OutputDirs {
    pub fn new() -> Self {
        Self::default()
    }

    /// 确保 `dest` 的父目录存在（已存在不报错）
    pub fn ensure_parent(&self, dest: &Path) -> Result<()> {
        let dir = match dest.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => return Ok(()),
        };

        let mut created = self.created.lock().unwrap_or_else(PoisonError::into_inner);
        if created.contains(dir) {
            return Ok(());
        }

        fs::create_dir_all(dir).map_err(|e| PsdToolkitError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;
        created.insert(dir.to_path_buf());
        Ok(())
    }
}
