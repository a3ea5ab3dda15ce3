//! # 栅格图像导出
//!
//! 将合成结果编码为目标格式并写入磁盘。
//!
//! ## 支持格式
//! 由 `image` crate 按扩展名推断：png, jpg/jpeg, bmp, gif, tif/tiff, webp, tga, ico, ...
//! jpeg 与 bmp 输出不带透明通道，先转换为 RGB。
//!
//! ## 依赖关系
//! - 被 `document/psd.rs` 调用
//! - 使用 `image` crate

use crate::error::{PsdToolkitError, Result};

use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::Path;

/// 根据扩展名解析输出格式
pub fn resolve_format(format: &str) -> Option<ImageFormat> {
    ImageFormat::from_extension(format.trim_start_matches('.'))
}

/// 编码并写入图像
pub fn write_image(image: &RgbaImage, dest: &Path, format: &str) -> Result<()> {
    let export_error = |reason: String| PsdToolkitError::Export {
        path: dest.display().to_string(),
        reason,
    };

    let image_format = resolve_format(format)
        .ok_or_else(|| export_error(format!("unsupported output format '{}'", format)))?;

    let result = match image_format {
        ImageFormat::Jpeg | ImageFormat::Bmp => DynamicImage::ImageRgba8(image.clone())
            .to_rgb8()
            .save_with_format(dest, image_format),
        _ => image.save_with_format(dest, image_format),
    };

    result.map_err(|e| export_error(e.to_string()))
}
