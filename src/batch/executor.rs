//! # 单任务执行器
//!
//! 对一个输入文件执行完整流水线：打开 → 隐藏文字图层 → 解析输出路径 →
//! 创建目录 → 合成 → 编码写出。
//!
//! 任何一步的失败（包括 panic）都在这里转换为失败的 `TaskResult`，
//! 不会向外传播，也不会影响其他任务。任务内的 panic 不经过默认的
//! panic hook 输出，其消息随失败结果一起由 `StatsAggregator` 打印。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 调用
//! - 使用 `batch/paths.rs`, `document/`, `models/batch.rs`

use super::config::BatchConfig;
use super::paths::{resolve_output_path, OutputDirs};
use crate::document::DocumentProcessor;
use crate::error::{PsdToolkitError, Result};
use crate::models::{FileTask, TaskResult};

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Once;

thread_local! {
    /// 当前线程是否正在执行任务
    static IN_TASK: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// 单任务执行器
pub struct TaskExecutor<'a, P: DocumentProcessor> {
    processor: &'a P,
    config: &'a BatchConfig,
    dirs: OutputDirs,
}

impl<'a, P: DocumentProcessor> TaskExecutor<'a, P> {
    pub fn new(processor: &'a P, config: &'a BatchConfig) -> Self {
        Self {
            processor,
            config,
            dirs: OutputDirs::new(),
        }
    }

    /// 执行一个任务，始终返回一个结果
    pub fn execute(&self, task: &FileTask) -> TaskResult {
        match catch_quietly(|| self.try_execute(task)) {
            Ok(Ok(layers_hidden)) => TaskResult::success(task, layers_hidden),
            Ok(Err(e)) => TaskResult::failure(task, &e),
            Err(payload) => {
                let error = PsdToolkitError::Unexpected(panic_message(payload.as_ref()));
                TaskResult::failure(task, &error)
            }
        }
    }

    /// 任务的输出路径
    pub fn destination(&self, task: &FileTask) -> PathBuf {
        resolve_output_path(
            &task.source,
            &self.config.input_root,
            &self.config.output_root,
            self.config.recursive,
            &self.config.output_format,
        )
    }

    fn try_execute(&self, task: &FileTask) -> Result<usize> {
        let mut doc = self.processor.open(&task.source)?;
        let layers_hidden = self.processor.hide_text_layers(&mut doc)?;

        let dest = self.destination(task);
        self.dirs.ensure_parent(&dest)?;

        let image = self.processor.render(&doc)?;
        self.processor
            .encode(&image, &dest, &self.config.output_format)?;

        Ok(layers_hidden)
    }
}

/// 安装一次全局 hook：任务线程上的 panic 不输出，其余交给原 hook
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !IN_TASK.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

fn catch_quietly<T>(f: impl FnOnce() -> T) -> std::thread::Result<T> {
    install_quiet_hook();
    IN_TASK.with(|flag| flag.set(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    IN_TASK.with(|flag| flag.set(false));
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "task panicked".to_string()
    }
}
