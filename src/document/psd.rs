//! # PSD 文档后端
//!
//! 使用 `psd` crate 解码像素并合成，使用 `records` 模块重建图层树。
//!
//! ## 流程
//! 1. 读取文件字节并解析图层记录（结构损坏 → Load）
//! 2. `psd::Psd::from_bytes` 解码像素（失败 → Load）
//! 3. 按名称把记录对齐到解码出的图层（`psd` crate 自顶向下排列）；
//!    对不上时图层树标记为不可用（隐藏文字图层或渲染时 → Transform）
//! 4. 渲染时只合成自身及祖先均可见的图层；没有图层记录的文档直接使用合成图
//!
//! ## 依赖关系
//! - 实现 `document/mod.rs` 的 `DocumentProcessor`
//! - 使用 `document/records.rs`, `document/layer.rs`, `document/export.rs`
//! - 使用 `psd`, `image` crate

use super::export;
use super::layer::{remap_indices, visible_indices, Layer};
use super::records::{read_layer_records, LayerRecords};
use super::{Document, DocumentProcessor};
use crate::error::{PsdToolkitError, Result};

use image::RgbaImage;
use psd::Psd;
use std::fs;
use std::path::Path;

/// 已解码的 PSD 文档
pub struct PsdDocument {
    path: String,
    psd: Psd,
    tree: std::result::Result<Vec<Layer>, String>,
}

impl PsdDocument {
    fn transform_error(&self, reason: &str) -> PsdToolkitError {
        PsdToolkitError::Transform {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl Document for PsdDocument {
    fn layers_mut(&mut self) -> Result<&mut [Layer]> {
        match &mut self.tree {
            Ok(layers) => Ok(layers.as_mut_slice()),
            Err(reason) => Err(PsdToolkitError::Transform {
                path: self.path.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

/// Photoshop 文档处理器
#[derive(Debug, Default, Clone, Copy)]
pub struct PsdProcessor;

impl PsdProcessor {
    pub fn new() -> Self {
        PsdProcessor
    }
}

/// 从记录重建图层树，并把像素索引对齐到 `Psd::layers()` 的顺序
///
/// 记录按文件顺序自底向上排列，`psd` crate 的图层列表自顶向下排列。
/// 两者逐一核对名称，数量或名称对不上时不做猜测。
fn build_tree(
    records: LayerRecords,
    decoded: &[&str],
) -> std::result::Result<Vec<Layer>, String> {
    let count = records.pixel_layer_count();
    if count != decoded.len() {
        return Err(format!(
            "layer records ({}) do not match decoded layers ({})",
            count,
            decoded.len()
        ));
    }

    let last = count.saturating_sub(1);
    let top_down = records
        .pixel_records()
        .enumerate()
        .all(|(i, record)| record.answers_to(decoded[last - i]));
    let bottom_up = records
        .pixel_records()
        .zip(decoded)
        .all(|(record, name)| record.answers_to(name));

    let mut tree = records.into_tree();
    if top_down {
        remap_indices(&mut tree, |i| last - i);
    } else if !bottom_up {
        return Err("layer names do not line up with decoded layers".to_string());
    }
    Ok(tree)
}

impl DocumentProcessor for PsdProcessor {
    type Document = PsdDocument;

    fn open(&self, path: &Path) -> Result<PsdDocument> {
        let display = path.display().to_string();
        let bytes = fs::read(path).map_err(|e| PsdToolkitError::Load {
            path: display.clone(),
            reason: e.to_string(),
        })?;

        let records = read_layer_records(&bytes, &display)?;

        let psd = Psd::from_bytes(&bytes).map_err(|e| PsdToolkitError::Load {
            path: display.clone(),
            reason: e.to_string(),
        })?;

        let names: Vec<&str> = psd.layers().iter().map(|layer| layer.name()).collect();
        let tree = build_tree(records, &names);

        Ok(PsdDocument {
            path: display,
            psd,
            tree,
        })
    }

    fn render(&self, doc: &PsdDocument) -> Result<RgbaImage> {
        let (width, height) = (doc.psd.width(), doc.psd.height());
        let layer_count = doc.psd.layers().len();

        let pixels = if layer_count == 0 {
            doc.psd.rgba()
        } else {
            let tree = doc
                .tree
                .as_ref()
                .map_err(|reason| doc.transform_error(reason))?;

            let mut keep = vec![false; layer_count];
            for index in visible_indices(tree) {
                if let Some(slot) = keep.get_mut(index) {
                    *slot = true;
                }
            }

            if keep.iter().any(|&k| k) {
                doc.psd
                    .flatten_layers_rgba(&|(index, _)| keep.get(index).copied().unwrap_or(false))
                    .map_err(|e| PsdToolkitError::Export {
                        path: doc.path.clone(),
                        reason: format!("compositing failed: {}", e),
                    })?
            } else {
                // 全部隐藏时输出透明画布
                vec![0u8; width as usize * height as usize * 4]
            }
        };

        RgbaImage::from_raw(width, height, pixels).ok_or_else(|| PsdToolkitError::Export {
            path: doc.path.clone(),
            reason: "composited pixel buffer does not match canvas size".to_string(),
        })
    }

    fn encode(&self, image: &RgbaImage, dest: &Path, format: &str) -> Result<()> {
        export::write_image(image, dest, format)
    }
}
