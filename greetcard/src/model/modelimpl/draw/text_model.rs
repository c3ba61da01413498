/// 对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    /// 解析对齐参数，不认识的值一律居中
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("left") => TextAlign::Left,
            Some("right") => TextAlign::Right,
            _ => TextAlign::Center,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// 文字方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// 单行文字及其中线位置
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub y: f32,
}

/// 单次绘制的文字状态
#[derive(Debug, Clone, PartialEq)]
pub struct TextModel {
    pub lines: Vec<TextLine>,
    pub direction: TextDirection,
    pub alignment: TextAlign,
    /// 缩放后的字号
    pub font_size: f32,
    /// 对齐参考点X
    pub x: f32,
}
