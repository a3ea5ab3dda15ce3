//! # PSD 图层记录解析器
//!
//! 读取 PSD/PSB 文件 "Layer and Mask Information" 段中的图层记录，
//! 仅提取构建图层树所需的元数据（像素由 `psd` crate 解码）。
//!
//! ## 文件布局
//! ```text
//! Header (26 bytes)            "8BPS" version(1=PSD, 2=PSB) ...
//! Color mode data              u32 length + data
//! Image resources              u32 length + data
//! Layer and mask information   u32/u64 length
//!   Layer info                 u32/u64 length, i16 layer count
//!     Layer record * N         rect, channels, blend mode, flags, extra data
//!       extra data             mask, blending ranges, pascal name,
//!                              additional info blocks ("8BIM" key length data)
//! ```
//!
//! ## 识别的附加信息块
//! - `luni`: Unicode 图层名
//! - `lsct` / `lsdk`: 图层组分隔（1/2 = 组开始, 3 = 组边界）
//! - `TySh` / `tySh`: 文字图层
//! - `SoLd` / `PlLd` / `SoLE`: 智能对象
//!
//! ## 依赖关系
//! - 被 `document/psd.rs` 调用
//! - 使用 `document/layer.rs` 的图层模型

use super::layer::{Layer, LayerKind};
use crate::error::{PsdToolkitError, Result};

/// PSB 中使用 8 字节长度的附加信息块
const LONG_LENGTH_KEYS: &[&[u8; 4]] = &[
    b"LMsk", b"Lr16", b"Lr32", b"Layr", b"Mt16", b"Mt32", b"Mtrn", b"Alph", b"FMsk", b"lnk2",
    b"FEid", b"FXid", b"PxSD",
];

/// 图层组分隔类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionDivider {
    OpenFolder,
    ClosedFolder,
    BoundingDivider,
}

/// 单条图层记录的元数据
#[derive(Debug, Clone, Default)]
pub struct LayerRecord {
    /// 显示名（优先 `luni`）
    pub name: String,
    /// 记录头中的 Pascal 名称
    pub pascal_name: String,
    pub hidden: bool,
    pub divider: Option<SectionDivider>,
    pub text: bool,
    pub smart_object: bool,
}

/// 解析结果
#[derive(Debug, Default)]
pub struct LayerRecords {
    /// 按文件顺序（自底向上）排列的记录
    pub records: Vec<LayerRecord>,
}

impl LayerRecord {
    /// 名称是否与给定名称一致（Unicode 名或 Pascal 名）
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.pascal_name == name
    }
}

impl LayerRecords {
    /// 非分隔记录（即像素图层），按文件顺序
    pub fn pixel_records(&self) -> impl Iterator<Item = &LayerRecord> {
        self.records.iter().filter(|r| r.divider.is_none())
    }

    /// 非分隔记录数（即像素图层数）
    pub fn pixel_layer_count(&self) -> usize {
        self.pixel_records().count()
    }

    /// 重建图层树
    ///
    /// 组边界记录开启一个新组，组开始记录关闭它；像素图层按文件顺序
    /// （自底向上，最底层为 0）编号。
    /// 不平衡的分隔记录不会报错，多余的子图层会并入上一级。
    pub fn into_tree(self) -> Vec<Layer> {
        let mut stack: Vec<Vec<Layer>> = vec![Vec::new()];
        let mut pixel_index = 0;

        for record in self.records {
            match record.divider {
                Some(SectionDivider::BoundingDivider) => stack.push(Vec::new()),
                Some(SectionDivider::OpenFolder) | Some(SectionDivider::ClosedFolder) => {
                    let children = if stack.len() > 1 {
                        stack.pop().unwrap_or_default()
                    } else {
                        Vec::new()
                    };
                    let group = Layer::group(record.name, children).with_visible(!record.hidden);
                    push_layer(&mut stack, group);
                }
                None => {
                    let kind = if record.text {
                        LayerKind::Text
                    } else if record.smart_object {
                        LayerKind::SmartObject
                    } else {
                        LayerKind::Pixel
                    };
                    let layer = Layer::new(record.name, kind)
                        .with_index(pixel_index)
                        .with_visible(!record.hidden);
                    pixel_index += 1;
                    push_layer(&mut stack, layer);
                }
            }
        }

        while stack.len() > 1 {
            let orphans = stack.pop().unwrap_or_default();
            for layer in orphans {
                push_layer(&mut stack, layer);
            }
        }

        stack.pop().unwrap_or_default()
    }
}

fn push_layer(stack: &mut Vec<Vec<Layer>>, layer: Layer) {
    match stack.last_mut() {
        Some(top) => top.push(layer),
        None => stack.push(vec![layer]),
    }
}

/// 解析文件字节中的图层记录
pub fn read_layer_records(bytes: &[u8], path: &str) -> Result<LayerRecords> {
    let mut reader = Reader::new(bytes, path);

    if reader.take(4)? != b"8BPS" {
        return Err(reader.error("missing 8BPS signature"));
    }
    let psb = match reader.u16()? {
        1 => false,
        2 => true,
        v => return Err(reader.error(&format!("unsupported version {}", v))),
    };
    // reserved(6) channels(2) height(4) width(4) depth(2) mode(2)
    reader.skip(20)?;

    // Color mode data / Image resources
    let len = reader.u32()? as usize;
    reader.skip(len)?;
    let len = reader.u32()? as usize;
    reader.skip(len)?;

    let layer_and_mask_len = reader.length(psb)?;
    if layer_and_mask_len == 0 {
        return Ok(LayerRecords::default());
    }
    let layer_info_len = reader.length(psb)?;
    if layer_info_len == 0 {
        return Ok(LayerRecords::default());
    }

    // 负数表示第一个 alpha 通道存放合成透明度
    let count = reader.i16()?.unsigned_abs() as usize;
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(read_record(&mut reader, psb)?);
    }

    Ok(LayerRecords { records })
}

fn read_record(reader: &mut Reader<'_>, psb: bool) -> Result<LayerRecord> {
    // top, left, bottom, right
    reader.skip(16)?;
    let channels = reader.u16()? as usize;
    let channel_entry = if psb { 2 + 8 } else { 2 + 4 };
    reader.skip(channels * channel_entry)?;

    if reader.take(4)? != b"8BIM" {
        return Err(reader.error("invalid blend mode signature"));
    }
    // blend key(4) opacity(1) clipping(1)
    reader.skip(6)?;
    let flags = reader.u8()?;
    reader.skip(1)?;

    let extra_len = reader.u32()? as usize;
    let extra_end = reader.pos + extra_len;
    if extra_end > reader.bytes.len() {
        return Err(reader.error("layer extra data exceeds file size"));
    }

    let mut record = LayerRecord {
        hidden: flags & 0x02 != 0,
        ..LayerRecord::default()
    };

    let mask_len = reader.u32()? as usize;
    reader.skip(mask_len)?;
    let ranges_len = reader.u32()? as usize;
    reader.skip(ranges_len)?;

    // Pascal 字符串，总长度按 4 字节对齐
    let name_len = reader.u8()? as usize;
    record.pascal_name = String::from_utf8_lossy(reader.take(name_len)?).into_owned();
    record.name = record.pascal_name.clone();
    let padded = (1 + name_len).div_ceil(4) * 4;
    reader.skip(padded - 1 - name_len)?;

    while reader.pos + 12 <= extra_end {
        if !reader.align_to_signature(extra_end) {
            break;
        }
        reader.skip(4)?;
        let key: [u8; 4] = reader
            .take(4)?
            .try_into()
            .map_err(|_| reader.error("truncated block key"))?;
        let len = if psb && LONG_LENGTH_KEYS.contains(&&key) {
            reader.u64()? as usize
        } else {
            reader.u32()? as usize
        };
        let end = reader.pos.saturating_add(len).min(extra_end).max(reader.pos);
        if reader.pos > extra_end {
            break;
        }
        let data = &reader.bytes[reader.pos..end];

        match &key {
            b"luni" => {
                if let Some(name) = decode_unicode_name(data) {
                    record.name = name;
                }
            }
            b"lsct" | b"lsdk" => {
                record.divider = match data.get(..4).map(be_u32) {
                    Some(1) => Some(SectionDivider::OpenFolder),
                    Some(2) => Some(SectionDivider::ClosedFolder),
                    Some(3) => Some(SectionDivider::BoundingDivider),
                    _ => record.divider,
                };
            }
            b"TySh" | b"tySh" => record.text = true,
            b"SoLd" | b"PlLd" | b"SoLE" => record.smart_object = true,
            _ => {}
        }

        reader.pos = end;
    }

    reader.pos = extra_end;
    Ok(record)
}

/// `luni`: u32 字符数 + UTF-16BE
fn decode_unicode_name(data: &[u8]) -> Option<String> {
    let count = be_u32(data.get(..4)?) as usize;
    let units: Vec<u16> = data
        .get(4..4 + count * 2)?
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16(&units).ok()
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// 大端字节读取器
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    path: &'a str,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8], path: &'a str) -> Self {
        Reader {
            bytes,
            pos: 0,
            path,
        }
    }

    fn error(&self, reason: &str) -> PsdToolkitError {
        PsdToolkitError::Load {
            path: self.path.to_string(),
            reason: format!("{} (offset {})", reason, self.pos),
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| self.error("unexpected end of file"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn i16(&mut self) -> Result<i16> {
        Ok(self.u16()? as i16)
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(be_u32(self.take(4)?))
    }

    fn u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_be_bytes(buf))
    }

    /// PSD 中为 u32，PSB 中为 u64
    fn length(&mut self, psb: bool) -> Result<usize> {
        if psb {
            Ok(self.u64()? as usize)
        } else {
            Ok(self.u32()? as usize)
        }
    }

    /// 跳过至多 3 字节的对齐填充，定位到下一个附加信息块签名
    fn align_to_signature(&mut self, limit: usize) -> bool {
        for pad in 0..4 {
            let start = self.pos + pad;
            match self.bytes.get(start..start + 4) {
                Some(sig) if start + 12 <= limit && (sig == b"8BIM" || sig == b"8B64") => {
                    self.pos = start;
                    return true;
                }
                _ => {}
            }
        }
        false
    }
}
