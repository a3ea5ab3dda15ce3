//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: process

pub mod process;

use clap::Parser;

/// psd-toolkit - 批量隐藏 PSD 文字图层并导出图像
#[derive(Parser)]
#[command(name = "psd-toolkit")]
#[command(version)]
#[command(about = "Batch hide text layers in PSDs and export flattened images", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub args: process::ProcessArgs,
}
