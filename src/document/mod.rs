//! # 文档处理模块
//!
//! 单文件处理流水线的抽象：打开文档、遍历图层树、合成、编码输出。
//! 批处理核心只依赖 `DocumentProcessor` trait，具体格式由后端实现。
//!
//! ## 后端
//! - `psd`: 基于 `psd` crate 的 Photoshop 文档后端
//!
//! ## 依赖关系
//! - 被 `batch/executor.rs`, `commands/process.rs` 使用
//! - 子模块: layer, records, psd, export

pub mod export;
pub mod layer;
pub mod psd;
pub mod records;

#[cfg(test)]
pub mod testing;

pub use layer::{Layer, LayerKind};
pub use psd::PsdProcessor;

use crate::error::Result;
use image::RgbaImage;
use std::path::Path;

/// 已打开的文档，暴露可变的图层树
pub trait Document {
    /// 顶层图层；图层树不可用时返回 `Transform` 错误
    fn layers_mut(&mut self) -> Result<&mut [Layer]>;
}

/// 单文件处理能力
///
/// 实现需要可在多个工作线程间共享；每个文档只在一个线程内使用。
pub trait DocumentProcessor: Sync {
    type Document: Document;

    /// 打开并解码文档，失败返回 `Load` 错误
    fn open(&self, path: &Path) -> Result<Self::Document>;

    /// 合成所有可见图层
    fn render(&self, doc: &Self::Document) -> Result<RgbaImage>;

    /// 按指定格式编码并写入目标路径，失败返回 `Export` 错误
    fn encode(&self, image: &RgbaImage, dest: &Path, format: &str) -> Result<()>;

    /// 隐藏所有可见文字图层，返回被隐藏的数量
    fn hide_text_layers(&self, doc: &mut Self::Document) -> Result<usize> {
        let layers = doc.layers_mut()?;
        Ok(layer::hide_text_layers(layers))
    }
}
