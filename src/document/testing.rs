//! 测试用的文档处理器
//!
//! 夹具文件是以空白分隔的图层描述：`text`, `pixel`, `hidden-text`,
//! `[` / `]` 表示图层组。内容包含 `corrupt` 时打开失败，包含 `panic` 时崩溃。

use super::export;
use super::layer::{Layer, LayerKind};
use super::{Document, DocumentProcessor};
use crate::error::{PsdToolkitError, Result};

use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct FakeDocument {
    layers: Vec<Layer>,
}

impl Document for FakeDocument {
    fn layers_mut(&mut self) -> Result<&mut [Layer]> {
        Ok(&mut self.layers)
    }
}

#[derive(Default)]
pub struct FakeProcessor {
    pub opened: AtomicUsize,
}

impl FakeProcessor {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

fn parse_layers(content: &str) -> Vec<Layer> {
    let mut stack: Vec<Vec<Layer>> = vec![Vec::new()];
    for token in content.split_whitespace() {
        let layer = match token {
            "[" => {
                stack.push(Vec::new());
                continue;
            }
            "]" => {
                let children = stack.pop().unwrap_or_default();
                Layer::group("group", children)
            }
            "text" => Layer::new("text", LayerKind::Text),
            "hidden-text" => Layer::new("text", LayerKind::Text).with_visible(false),
            _ => Layer::new(token, LayerKind::Pixel),
        };
        match stack.last_mut() {
            Some(top) => top.push(layer),
            None => stack.push(vec![layer]),
        }
    }
    stack.into_iter().flatten().collect()
}

impl DocumentProcessor for FakeProcessor {
    type Document = FakeDocument;

    fn open(&self, path: &Path) -> Result<FakeDocument> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let content = fs::read_to_string(path).map_err(|e| PsdToolkitError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if content.contains("corrupt") {
            return Err(PsdToolkitError::Load {
                path: path.display().to_string(),
                reason: "missing 8BPS signature".to_string(),
            });
        }
        if content.contains("panic") {
            panic!("decoder crashed");
        }
        Ok(FakeDocument {
            layers: parse_layers(&content),
        })
    }

    fn render(&self, doc: &FakeDocument) -> Result<RgbaImage> {
        let width = doc.layers.len().max(1) as u32;
        Ok(RgbaImage::from_pixel(width, 1, Rgba([255, 255, 255, 255])))
    }

    fn encode(&self, image: &RgbaImage, dest: &Path, format: &str) -> Result<()> {
        export::write_image(image, dest, format)
    }
}

/// 在 `root` 下写入夹具文件（自动创建父目录）
pub fn write_fixture(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}
