//! # psd-toolkit - PSD 批处理工具
//!
//! 批量隐藏 PSD 文档中的文字图层，合成可见图层并导出为图像。
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (文件收集、路径解析、并行调度、统计)
//!   │     ├── document/  (文档处理：图层树、PSD 后端、图像导出)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```
//!
//! ## 退出码
//! - 0: 正常完成（包括部分文件失败）
//! - 1: 致命错误（输入目录不存在、参数无效）

mod batch;
mod cli;
mod commands;
mod document;
mod error;
mod models;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("Critical Error: {}", e));
        std::process::exit(1);
    }
}
