use crate::model::modelimpl::draw::{TemplateModel, TextAlign, TextDirection, TextLine, TextModel};

/// 名字最多保留的字符数
pub const MAX_NAME_CHARS: usize = 80;
/// 最多绘制的行数
pub const MAX_LINES: usize = 2;
/// 自动缩小的最小字号
pub const MIN_FONT_SIZE: f32 = 18.0;
/// 每次缩小的步长
pub const FONT_SIZE_STEP: f32 = 2.0;

/// 文字宽度度量
pub trait TextMeasure {
    fn measure_width(&self, text: &str, size: f32) -> f32;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, f32) -> f32,
{
    fn measure_width(&self, text: &str, size: f32) -> f32 {
        self(text, size)
    }
}

/// 去掉首尾空白并截断到80个字符
pub fn safe_text(raw: &str) -> String {
    raw.trim().chars().take(MAX_NAME_CHARS).collect()
}

/// 输入框内容规整：统一换行符，超过两行的部分丢弃
pub fn limit_input_lines(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n");
    if normalized.split('\n').count() > MAX_LINES {
        normalized
            .split('\n')
            .take(MAX_LINES)
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        normalized
    }
}

/// 是否包含阿拉伯文字符(U+0600..U+06FF)
pub fn is_rtl(text: &str) -> bool {
    text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}

pub fn text_direction(text: &str) -> TextDirection {
    if is_rtl(text) {
        TextDirection::Rtl
    } else {
        TextDirection::Ltr
    }
}

/// 分割为待绘制的行
///
/// 两行模式下按换行拆分，去掉空行，最多保留两行；
/// 否则整段作为一行，换行按空格处理。
pub fn split_lines(text: &str, allow_two_lines: bool) -> Vec<String> {
    if !allow_two_lines {
        return vec![text.replace(['\r', '\n'], " ")];
    }

    text.split('\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_LINES)
        .map(str::to_string)
        .collect()
}

/// 计算合适的字号
///
/// 从 `base_size` 开始，最宽的一行超过 `max_width` 时每次减2，
/// 直到放得下或到达最小字号。
pub fn fit_font_size<M>(lines: &[String], max_width: f32, base_size: f32, measure: &M) -> f32
where
    M: TextMeasure + ?Sized,
{
    let widest = |size: f32| {
        lines
            .iter()
            .map(|line| measure.measure_width(line, size))
            .fold(0.0_f32, f32::max)
    };

    let mut size = base_size;
    while widest(size) > max_width && size > MIN_FONT_SIZE {
        size -= FONT_SIZE_STEP;
    }
    size
}

/// 根据对齐方式计算绘制参考点X
pub fn anchor_x(alignment: TextAlign, x: f32, max_width: f32) -> f32 {
    match alignment {
        TextAlign::Left => x - max_width / 2.0,
        TextAlign::Right => x + max_width / 2.0,
        TextAlign::Center => x,
    }
}

/// 各行中线的Y坐标，两行时围绕y上下各偏移半个行距
pub fn line_ys(count: usize, y: f32, line_height: f32) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![y],
        _ => vec![y - line_height / 2.0, y + line_height / 2.0],
    }
}

/// 计算一次绘制需要的全部文字状态，没有可绘制内容时返回None
pub fn layout_text<M>(
    template: &TemplateModel,
    raw: &str,
    alignment: TextAlign,
    measure: &M,
) -> Option<TextModel>
where
    M: TextMeasure + ?Sized,
{
    let name = safe_text(raw);
    if name.is_empty() {
        return None;
    }

    let direction = text_direction(&name);
    let lines = split_lines(&name, template.allow_two_lines);
    if lines.is_empty() {
        return None;
    }

    let font_size = fit_font_size(
        &lines,
        template.max_width,
        template.base_font_size,
        measure,
    );
    let ys = line_ys(lines.len(), template.y, template.line_height);

    Some(TextModel {
        lines: lines
            .into_iter()
            .zip(ys)
            .map(|(text, y)| TextLine { text, y })
            .collect(),
        direction,
        alignment,
        font_size,
        x: anchor_x(alignment, template.x, template.max_width),
    })
}
