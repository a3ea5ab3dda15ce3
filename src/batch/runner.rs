//! # 批量执行器
//!
//! 收集文件并并行执行处理任务。
//!
//! ## 流程
//! 1. 收集文件；为空时提示并直接返回全零统计（不创建线程池）
//! 2. 只有一个文件时在当前线程执行（与线程池路径结果一致）
//! 3. 否则创建大小为 `max_workers` 的 rayon 线程池，每个文件一个任务，
//!    结果按完成顺序交给 `StatsAggregator`
//! 4. 等待所有任务结束，线程池在返回前销毁
//!
//! 输入目录不存在等致命错误在派发任何任务之前返回。
//!
//! ## 依赖关系
//! - 被 `commands/process.rs` 调用
//! - 使用 `batch/collector.rs`, `batch/executor.rs`, `batch/stats.rs`
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use super::collector::FileCollector;
use super::config::{BatchConfig, SOURCE_EXTENSION};
use super::executor::TaskExecutor;
use super::stats::{summary_text, StatsAggregator};
use crate::document::DocumentProcessor;
use crate::error::{PsdToolkitError, Result};
use crate::models::{BatchStats, FileTask};
use crate::utils::{output, progress};

use rayon::prelude::*;

/// 任务派发方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// 没有找到文件
    Empty,
    /// 单文件，在调用线程执行
    Inline,
    /// 线程池并行执行
    Pooled { workers: usize },
}

/// 批处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub stats: BatchStats,
    pub mode: DispatchMode,
    /// 汇总文本
    pub summary: String,
}

/// 批量执行器
pub struct BatchRunner<'a, P: DocumentProcessor> {
    processor: &'a P,
    /// 是否显示进度条
    show_progress: bool,
}

impl<'a, P: DocumentProcessor> BatchRunner<'a, P> {
    /// 创建新的批量执行器
    pub fn new(processor: &'a P) -> Self {
        Self {
            processor,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// 执行批处理
    pub fn run(&self, config: &BatchConfig) -> Result<BatchReport> {
        config.validate()?;

        let files = FileCollector::new(&config.input_root)
            .with_extension(SOURCE_EXTENSION)?
            .recursive(config.recursive)
            .collect()?;

        let total = files.len();
        if total == 0 {
            output::print_warning(&format!(
                "No PSD files found in {}",
                config.input_root.display()
            ));
            let stats = BatchStats::default();
            return Ok(BatchReport {
                summary: summary_text(&stats),
                stats,
                mode: DispatchMode::Empty,
            });
        }

        output::print_info(&format!(
            "Found {} PSD file(s). Starting process...",
            total
        ));

        let tasks: Vec<FileTask> = files.into_iter().map(FileTask::new).collect();
        let executor = TaskExecutor::new(self.processor, config);

        let mode = if total == 1 {
            DispatchMode::Inline
        } else {
            DispatchMode::Pooled {
                workers: config.workers(),
            }
        };

        let pb = progress::create_optional_bar(
            total as u64,
            "Processing PSD files",
            self.show_progress && total > 1,
        );
        let stats = StatsAggregator::new(total, pb);

        match mode {
            DispatchMode::Pooled { workers } => {
                // 配置 rayon 线程池，运行结束时随作用域销毁
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("psd-worker-{}", i))
                    .build()
                    .map_err(|e| {
                        PsdToolkitError::InvalidArgument(format!(
                            "Failed to start {} workers: {}",
                            workers, e
                        ))
                    })?;

                pool.install(|| {
                    tasks
                        .par_iter()
                        .with_max_len(1)
                        .for_each(|task| stats.record(executor.execute(task)));
                });
            }
            _ => {
                for task in &tasks {
                    stats.record(executor.execute(task));
                }
            }
        }

        stats.finish();
        debug_assert!(stats.snapshot().is_complete());

        Ok(BatchReport {
            stats: stats.snapshot(),
            mode,
            summary: stats.summary_text(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::testing::{write_fixture, FakeProcessor};
    use std::fs;
    use std::path::Path;

    fn populate(root: &Path, count: usize) {
        for i in 0..count {
            let layers = "text ".repeat(i % 3);
            write_fixture(root, &format!("file{:02}.psd", i), &format!("pixel {}", layers));
        }
    }

    fn run(processor: &FakeProcessor, config: &BatchConfig) -> BatchReport {
        BatchRunner::new(processor)
            .with_progress(false)
            .run(config)
            .unwrap()
    }

    #[test]
    fn test_counts_independent_of_worker_count() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 12);

        for workers in [Some(1), Some(12), None] {
            let out = tempfile::tempdir().unwrap();
            let config = BatchConfig::new(dir.path())
                .with_output_root(Some(out.path().to_path_buf()))
                .with_max_workers(workers);
            let processor = FakeProcessor::default();

            let report = run(&processor, &config);
            assert_eq!(report.stats.total, 12);
            assert_eq!(report.stats.success, 12);
            assert_eq!(report.stats.failed, 0);
            assert!(report.stats.is_complete());
            assert_eq!(processor.opened(), 12);
            assert_eq!(fs::read_dir(out.path()).unwrap().count(), 12);
            assert_eq!(
                report.mode,
                DispatchMode::Pooled {
                    workers: config.workers()
                }
            );
        }
    }

    #[test]
    fn test_single_corrupt_file_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 5);
        write_fixture(dir.path(), "file99.psd", "corrupt");
        let config = BatchConfig::new(dir.path()).with_max_workers(Some(3));
        let processor = FakeProcessor::default();

        let report = run(&processor, &config);
        assert_eq!(report.stats.total, 6);
        assert_eq!(report.stats.success, 5);
        assert_eq!(report.stats.failed, 1);
        assert!(!dir.path().join("file99.png").exists());
        assert!(dir.path().join("file00.png").exists());
    }

    #[test]
    fn test_panicking_task_keeps_pool_alive() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 4);
        write_fixture(dir.path(), "boom.psd", "panic");
        let config = BatchConfig::new(dir.path()).with_max_workers(Some(1));
        let processor = FakeProcessor::default();

        let report = run(&processor, &config);
        assert_eq!(report.stats.success, 4);
        assert_eq!(report.stats.failed, 1);
        assert!(report.stats.is_complete());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 2);
        std::os::unix::fs::symlink(dir.path().join("nowhere.psd"), dir.path().join("ghost.psd"))
            .unwrap();
        let processor = FakeProcessor::default();

        let report = run(&processor, &BatchConfig::new(dir.path()));
        assert_eq!(report.stats.total, 3);
        assert_eq!(report.stats.success, 2);
        assert_eq!(report.stats.failed, 1);
    }

    #[test]
    fn test_zero_files_skips_pool() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "readme.txt", "");
        let processor = FakeProcessor::default();

        let report = run(&processor, &BatchConfig::new(dir.path()));
        assert_eq!(report.mode, DispatchMode::Empty);
        assert_eq!(report.stats, BatchStats::default());
        assert_eq!(processor.opened(), 0);
    }

    #[test]
    fn test_single_file_runs_inline() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "only.psd", "text text pixel");
        let processor = FakeProcessor::default();

        let report = run(&processor, &BatchConfig::new(dir.path()));
        assert_eq!(report.mode, DispatchMode::Inline);
        assert_eq!(report.stats.total, 1);
        assert_eq!(report.stats.success, 1);
        assert!(dir.path().join("only.png").is_file());
    }

    #[test]
    fn test_missing_input_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let processor = FakeProcessor::default();
        let config = BatchConfig::new(dir.path().join("missing"));

        let err = BatchRunner::new(&processor)
            .with_progress(false)
            .run(&config)
            .unwrap_err();
        assert!(matches!(err, PsdToolkitError::DirectoryNotFound { .. }));
        assert_eq!(processor.opened(), 0);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 2);
        let processor = FakeProcessor::default();
        let config = BatchConfig::new(dir.path()).with_max_workers(Some(0));

        let err = BatchRunner::new(&processor).run(&config).unwrap_err();
        assert!(matches!(err, PsdToolkitError::InvalidArgument(_)));
        assert_eq!(processor.opened(), 0);
    }

    #[test]
    fn test_recursive_mirrors_into_output_root() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        write_fixture(&input, "a.psd", "text");
        write_fixture(&input, "sub/b.psd", "text");
        write_fixture(&input, "sub/deep/c.psd", "text");
        let out = dir.path().join("out");

        let config = BatchConfig::new(&input)
            .with_output_root(Some(out.clone()))
            .recursive(true);
        let report = run(&FakeProcessor::default(), &config);

        assert_eq!(report.stats.success, 3);
        assert!(out.join("a.png").is_file());
        assert!(out.join("sub/b.png").is_file());
        assert!(out.join("sub/deep/c.png").is_file());
    }

    #[test]
    fn test_recursive_in_place_is_flat() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "a.psd", "text");
        write_fixture(dir.path(), "sub/b.psd", "text");

        let config = BatchConfig::new(dir.path()).recursive(true);
        let report = run(&FakeProcessor::default(), &config);

        assert_eq!(report.stats.success, 2);
        assert!(dir.path().join("a.png").is_file());
        assert!(dir.path().join("b.png").is_file());
        assert!(!dir.path().join("sub/b.png").exists());
    }

    #[test]
    fn test_flat_collision_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "x/a.psd", "text");
        write_fixture(dir.path(), "y/a.psd", "pixel pixel");

        let config = BatchConfig::new(dir.path()).recursive(true);
        let report = run(&FakeProcessor::default(), &config);

        assert_eq!(report.stats.success, 2);
        assert_eq!(report.stats.failed, 0);
        assert!(dir.path().join("a.png").is_file());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 6);
        write_fixture(dir.path(), "bad.psd", "corrupt");
        let out = tempfile::tempdir().unwrap();
        let config = BatchConfig::new(dir.path())
            .with_output_root(Some(out.path().to_path_buf()))
            .with_max_workers(Some(4));

        let first = run(&FakeProcessor::default(), &config);
        let second = run(&FakeProcessor::default(), &config);
        assert_eq!(first, second);
        assert_eq!(first.stats.failed, 1);
        assert!(first.summary.contains("Failed:      1"));
    }
}
