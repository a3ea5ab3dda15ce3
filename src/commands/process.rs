//! # 批处理命令实现
//!
//! 隐藏目录中所有 PSD 文件的文字图层，并导出为指定格式的图像。
//!
//! ## 功能
//! - 构造并校验 `BatchConfig`
//! - 使用 PSD 后端运行批处理
//! - 打印汇总报告（单个文件失败不影响退出码）
//!
//! ## 依赖关系
//! - 使用 `cli/process.rs` 定义的参数
//! - 使用 `batch/`, `document/psd.rs`
//! - 使用 `utils/output.rs`

use crate::batch::{BatchConfig, BatchRunner, DispatchMode};
use crate::cli::process::ProcessArgs;
use crate::document::PsdProcessor;
use crate::error::Result;
use crate::utils::output;

/// 执行批处理命令
pub fn execute(args: ProcessArgs) -> Result<()> {
    output::print_header("Hide Text Layers & Export");

    let config = BatchConfig::try_from(&args)?;

    output::print_info(&format!("Input:  {}", config.input_root.display()));
    output::print_info(&format!("Output: {}", config.output_root.display()));
    output::print_info(&format!(
        "Format: {}{}",
        config.output_format,
        if config.recursive { " (recursive)" } else { "" }
    ));

    let processor = PsdProcessor::new();
    let report = BatchRunner::new(&processor)
        .with_progress(!args.quiet)
        .run(&config)?;

    match report.mode {
        DispatchMode::Empty => return Ok(()),
        DispatchMode::Inline => {}
        DispatchMode::Pooled { workers } => {
            output::print_info(&format!("Used {} parallel worker(s)", workers));
        }
    }

    println!();
    output::print_separator();
    for line in report.summary.lines() {
        println!("  {}", line);
    }
    output::print_separator();

    if report.stats.failed == 0 {
        output::print_done(&format!("All {} file(s) processed", report.stats.total));
    } else {
        output::print_warning(&format!(
            "{} of {} file(s) failed",
            report.stats.failed, report.stats.total
        ));
    }

    Ok(())
}
