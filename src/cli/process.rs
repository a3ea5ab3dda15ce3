//! # 批处理 CLI 参数定义
//!
//! 隐藏 PSD 文件中的文字图层并导出为图像。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/process.rs`，转换为 `batch::BatchConfig`

use crate::batch::config::{BatchConfig, DEFAULT_OUTPUT_FORMAT};
use crate::error::{PsdToolkitError, Result};

use clap::Args;
use std::path::PathBuf;

/// 批处理参数
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input directory containing PSD files
    #[arg(short, long)]
    pub dir: PathBuf,

    /// Output directory (default: input directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (png, jpg, bmp, tiff, webp, ...)
    #[arg(short = 'f', long, default_value = DEFAULT_OUTPUT_FORMAT)]
    pub output_format: String,

    /// Process subdirectories recursively
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0, env = "PSD_TOOLKIT_JOBS")]
    pub jobs: usize,

    /// Hide the progress bar
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}

impl TryFrom<&ProcessArgs> for BatchConfig {
    type Error = PsdToolkitError;

    fn try_from(args: &ProcessArgs) -> Result<Self> {
        let max_workers = if args.jobs == 0 { None } else { Some(args.jobs) };

        let config = BatchConfig::new(args.dir.clone())
            .with_output_root(args.output.clone())
            .recursive(args.recursive)
            .with_output_format(&args.output_format)
            .with_max_workers(max_workers);

        config.validate()?;
        Ok(config)
    }
}
