//! # 统计汇总
//!
//! 线程安全的成功/失败/跳过计数，以及逐文件的进度输出。
//!
//! 计数更新与进度行输出在同一把锁内完成，保证计数只增不减、
//! 进度行按完成顺序输出且不会交错。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 使用
//! - 使用 `models/batch.rs`, `utils/output.rs`
//! - 使用 `indicatif` 的进度条作为输出通道

use crate::models::{BatchStats, TaskResult};
use crate::utils::output;

use indicatif::ProgressBar;
use std::sync::{Mutex, PoisonError};

/// 批处理统计汇总器
pub struct StatsAggregator {
    stats: Mutex<BatchStats>,
    progress: ProgressBar,
}

impl StatsAggregator {
    pub fn new(total: usize, progress: ProgressBar) -> Self {
        Self {
            stats: Mutex::new(BatchStats::new(total)),
            progress,
        }
    }

    /// 不显示进度条
    pub fn without_progress(total: usize) -> Self {
        Self::new(total, ProgressBar::hidden())
    }

    /// 记录一个任务结果（可并发调用）
    pub fn record(&self, result: TaskResult) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        if result.success {
            stats.success += 1;
        } else {
            stats.failed += 1;
        }

        let done = stats.completed();
        let total = stats.total;
        self.progress.suspend(|| {
            output::print_progress_line(done, total, &result.message, result.success);
        });
        self.progress.inc(1);
    }

    /// 当前统计快照
    pub fn snapshot(&self) -> BatchStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 汇总文本
    pub fn summary_text(&self) -> String {
        summary_text(&self.snapshot())
    }

    /// 结束进度条显示
    pub fn finish(&self) {
        self.progress.finish_and_clear();
    }
}

/// 格式化统计汇总
pub fn summary_text(stats: &BatchStats) -> String {
    let mut text = String::new();
    text.push_str("Processing Complete\n");
    text.push_str(&format!("Total Files: {}\n", stats.total));
    text.push_str(&format!("Successful:  {}\n", stats.success));
    text.push_str(&format!("Failed:      {}", stats.failed));
    if stats.skipped > 0 {
        text.push_str(&format!("\nSkipped:     {}", stats.skipped));
    }
    text
}
