//! # 图层树模型
//!
//! 文档的图层以树的形式组织，图层组可以任意深度嵌套。
//!
//! ## 功能
//! - `hide_text_layers`: 隐藏所有可见的文字图层
//! - `visible_indices`: 计算实际参与合成的像素图层
//! - `remap_indices`: 把像素索引换算为后端的图层顺序
//!
//! 遍历均使用显式栈，不受嵌套深度限制。
//!
//! ## 依赖关系
//! - 被 `document/mod.rs`, `document/psd.rs`, `document/records.rs` 使用
//! - 无外部模块依赖

/// 图层类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// 普通像素图层
    Pixel,
    /// 文字图层
    Text,
    /// 智能对象
    SmartObject,
    /// 图层组
    Group,
}

/// 单个图层
#[derive(Debug, Clone)]
pub struct Layer {
    /// 图层名称
    pub name: String,
    /// 图层类型
    pub kind: LayerKind,
    /// 可见性标志（仅本图层，不含祖先）
    pub visible: bool,
    /// 像素数据在后端文档中的索引（图层组为 None）
    pub index: Option<usize>,
    /// 子图层（仅图层组非空）
    pub children: Vec<Layer>,
}

impl Layer {
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Layer {
            name: name.into(),
            kind,
            visible: true,
            index: None,
            children: Vec::new(),
        }
    }

    /// 创建图层组
    pub fn group(name: impl Into<String>, children: Vec<Layer>) -> Self {
        Layer {
            children,
            ..Layer::new(name, LayerKind::Group)
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn is_text(&self) -> bool {
        self.kind == LayerKind::Text
    }
}

/// 隐藏所有可见的文字图层，返回被修改的图层数
///
/// 位于隐藏图层组内的文字图层同样会被处理。
pub fn hide_text_layers(layers: &mut [Layer]) -> usize {
    let mut hidden = 0;
    let mut stack: Vec<&mut Layer> = layers.iter_mut().collect();

    while let Some(layer) = stack.pop() {
        if layer.is_text() && layer.visible {
            layer.visible = false;
            hidden += 1;
        }
        stack.extend(layer.children.iter_mut());
    }

    hidden
}

/// 收集实际可见的像素图层索引（自身及所有祖先都可见），升序排列
pub fn visible_indices(layers: &[Layer]) -> Vec<usize> {
    let mut indices = Vec::new();
    let mut stack: Vec<&Layer> = layers.iter().filter(|l| l.visible).collect();

    while let Some(layer) = stack.pop() {
        if let Some(index) = layer.index {
            indices.push(index);
        }
        stack.extend(layer.children.iter().filter(|c| c.visible));
    }

    indices.sort_unstable();
    indices
}

/// 对树中所有像素索引应用 `map`
pub fn remap_indices(layers: &mut [Layer], map: impl Fn(usize) -> usize) {
    let mut stack: Vec<&mut Layer> = layers.iter_mut().collect();

    while let Some(layer) = stack.pop() {
        layer.index = layer.index.map(&map);
        stack.extend(layer.children.iter_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Vec<Layer> {
        vec![
            Layer::new("Background", LayerKind::Pixel).with_index(0),
            Layer::group(
                "Labels",
                vec![
                    Layer::new("Title", LayerKind::Text).with_index(1),
                    Layer::group(
                        "Nested",
                        vec![
                            Layer::new("Caption", LayerKind::Text).with_index(2),
                            Layer::new("Logo", LayerKind::SmartObject).with_index(3),
                        ],
                    ),
                ],
            ),
            Layer::new("Old note", LayerKind::Text)
                .with_index(4)
                .with_visible(false),
        ]
    }

    #[test]
    fn test_hide_text_layers_descends_into_groups() {
        let mut layers = sample_tree();
        assert_eq!(hide_text_layers(&mut layers), 2);
        assert!(!layers[1].children[0].visible);
        assert!(!layers[1].children[1].children[0].visible);
        assert!(layers[1].children[1].children[1].visible);
        assert!(layers[0].visible);
    }

    #[test]
    fn test_hide_text_layers_is_idempotent() {
        let mut layers = sample_tree();
        hide_text_layers(&mut layers);
        assert_eq!(hide_text_layers(&mut layers), 0);
    }

    #[test]
    fn test_hide_text_inside_hidden_group() {
        let mut layers = vec![Layer::group(
            "Hidden",
            vec![Layer::new("Text", LayerKind::Text).with_index(0)],
        )
        .with_visible(false)];
        assert_eq!(hide_text_layers(&mut layers), 1);
    }

    #[test]
    fn test_deep_nesting() {
        let mut layer = Layer::new("Deep text", LayerKind::Text).with_index(0);
        for depth in 0..10_000 {
            layer = Layer::group(format!("g{}", depth), vec![layer]);
        }
        let mut layers = vec![layer];
        assert_eq!(hide_text_layers(&mut layers), 1);
        assert!(visible_indices(&layers).is_empty());
        // 深层嵌套的 Drop 是递归的，逐层拆开避免栈溢出
        let mut pending = layers;
        while let Some(mut layer) = pending.pop() {
            pending.append(&mut layer.children);
        }
    }

    #[test]
    fn test_remap_indices_reverses_order() {
        let mut layers = sample_tree();
        remap_indices(&mut layers, |i| 4 - i);
        assert_eq!(layers[0].index, Some(4));
        assert_eq!(layers[1].index, None);
        assert_eq!(layers[1].children[1].children[1].index, Some(1));
        assert_eq!(layers[2].index, Some(0));
    }

    #[test]
    fn test_visible_indices_respects_ancestors() {
        let mut layers = sample_tree();
        assert_eq!(visible_indices(&layers), vec![0, 1, 2, 3]);

        layers[1].children[1].visible = false;
        assert_eq!(visible_indices(&layers), vec![0, 1]);

        hide_text_layers(&mut layers);
        assert_eq!(visible_indices(&layers), vec![0]);
    }
}
