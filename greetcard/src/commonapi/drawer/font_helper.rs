use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use cosmic_text::{
    Attrs, Buffer, CacheKey, Color, Family, FontSystem, Metrics, Shaping, SwashCache, fontdb,
};
use tracing::{info, warn};

use crate::commonapi::drawer::text_helper::TextMeasure;
use crate::model::modelimpl::draw::TextDirection;

/// 备用字体每个字符的宽度系数
const FALLBACK_ADVANCE: f32 = 0.6;
/// 整形用的行高系数，只影响缓冲区内部排版
const LINE_HEIGHT_FACTOR: f32 = 1.2;
/// 从右到左标记，强制段落方向为RTL
const RLM: char = '\u{200F}';
const LOCALE: &str = "ar";

/// 整形后的单个字形
#[derive(Debug, Clone, Copy)]
pub struct ShapedGlyph {
    pub cache_key: CacheKey,
    /// 字形在原文中的字节偏移
    pub start: usize,
    /// 相对行首的X
    pub x: f32,
    pub advance: f32,
    /// 对齐到像素的绘制偏移，Y相对基线
    pub physical_x: i32,
    pub physical_y: i32,
}

/// 整形后的一行，字形按视觉顺序从左到右排列
#[derive(Debug, Clone)]
pub struct ShapedLine {
    pub glyphs: Vec<ShapedGlyph>,
    pub width: f32,
    pub ascent: f32,
    /// 正值，基线以下的高度
    pub descent: f32,
}

impl ShapedLine {
    /// "middle" 基线：使字形框的中线落在y上
    pub fn baseline_for_middle(&self, y: f32) -> f32 {
        y + (self.ascent - self.descent) / 2.0
    }
}

/// cosmic-text 加载的字体，整形和栅格化共用一个字体库
pub struct LoadedFont {
    family: String,
    weight: fontdb::Weight,
    style: fontdb::Style,
    stretch: fontdb::Stretch,
    font_system: Mutex<FontSystem>,
    swash_cache: Mutex<SwashCache>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl LoadedFont {
    fn attrs(&self) -> Attrs<'_> {
        Attrs::new()
            .family(Family::Name(&self.family))
            .weight(self.weight)
            .style(self.style)
            .stretch(self.stretch)
    }

    /// 整形一行文字，处理双向文本和阿拉伯文连写
    pub fn shape(&self, text: &str, size: f32, direction: TextDirection) -> ShapedLine {
        let (content, prefix) = match direction {
            TextDirection::Rtl => (format!("{RLM}{text}"), RLM.len_utf8()),
            TextDirection::Ltr => (text.to_string(), 0),
        };

        let mut font_system = lock(&self.font_system);
        let mut buffer = Buffer::new(
            &mut font_system,
            Metrics::new(size, size * LINE_HEIGHT_FACTOR),
        );
        buffer.set_text(&mut font_system, &content, self.attrs(), Shaping::Advanced);
        buffer.shape_until_scroll(&mut font_system, false);

        let (ascent, descent) = buffer
            .line_layout(&mut font_system, 0)
            .and_then(|lines| lines.first())
            .map(|line| (line.max_ascent, line.max_descent))
            .unwrap_or((size * 0.8, size * 0.2));

        let mut glyphs = Vec::new();
        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter().filter(|g| g.start >= prefix) {
                let physical = glyph.physical((0., 0.), 1.0);
                glyphs.push(ShapedGlyph {
                    cache_key: physical.cache_key,
                    start: glyph.start - prefix,
                    x: glyph.x,
                    advance: glyph.w,
                    physical_x: physical.x,
                    physical_y: physical.y,
                });
            }
        }

        let left = glyphs.iter().map(|g| g.x).fold(f32::INFINITY, f32::min);
        let right = glyphs
            .iter()
            .map(|g| g.x + g.advance)
            .fold(f32::NEG_INFINITY, f32::max);
        let width = if glyphs.is_empty() {
            0.0
        } else {
            for g in glyphs.iter_mut() {
                g.x -= left;
                g.physical_x -= left.round() as i32;
            }
            right - left
        };
        glyphs.sort_by(|a, b| a.x.total_cmp(&b.x));

        ShapedLine {
            glyphs,
            width,
            ascent,
            descent,
        }
    }

    /// 栅格化一个字形，回调参数为相对字形原点的坐标和覆盖度
    pub fn rasterize<F: FnMut(i32, i32, u8)>(&self, cache_key: CacheKey, mut f: F) {
        let mut font_system = lock(&self.font_system);
        let mut swash_cache = lock(&self.swash_cache);
        swash_cache.with_pixels(
            &mut font_system,
            cache_key,
            Color::rgb(0xFF, 0xFF, 0xFF),
            |x, y, color| f(x, y, color.a()),
        );
    }
}

/// 卡片字体
///
/// 字体文件加载失败时使用方块备用字体，保证渲染照常进行。
pub enum CardFont {
    Loaded(LoadedFont),
    Fallback,
}

impl CardFont {
    pub fn from_bytes(data: &[u8]) -> anyhow::Result<Self> {
        let mut db = fontdb::Database::new();
        db.load_font_data(data.to_vec());

        let face = db
            .faces()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Failed to load font: no usable face"))?;
        let family = face
            .families
            .first()
            .map(|(name, _)| name.clone())
            .ok_or_else(|| anyhow::anyhow!("Failed to load font: no family name"))?;
        let (weight, style, stretch) = (face.weight, face.style, face.stretch);

        Ok(CardFont::Loaded(LoadedFont {
            family,
            weight,
            style,
            stretch,
            font_system: Mutex::new(FontSystem::new_with_locale_and_db(LOCALE.to_string(), db)),
            swash_cache: Mutex::new(SwashCache::new()),
        }))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, CardFont::Fallback)
    }

    pub fn family(&self) -> Option<&str> {
        match self {
            CardFont::Loaded(f) => Some(f.family.as_str()),
            CardFont::Fallback => None,
        }
    }
}

impl TextMeasure for CardFont {
    /// 文字在指定字号下的宽度
    fn measure_width(&self, text: &str, size: f32) -> f32 {
        match self {
            CardFont::Loaded(font) => font.shape(text, size, TextDirection::Ltr).width,
            CardFont::Fallback => text.chars().count() as f32 * size * FALLBACK_ADVANCE,
        }
    }
}

/// 加载字体，失败时记录日志并返回备用字体
pub async fn load_font(path: Option<&str>) -> CardFont {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        warn!("no font configured, using fallback font");
        return CardFont::Fallback;
    };

    let full_path = Path::new(path);
    let data = match tokio::fs::read(full_path).await {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %full_path.display(), error = %e, "font load failed, using fallback font");
            return CardFont::Fallback;
        }
    };

    match CardFont::from_bytes(&data) {
        Ok(font) => {
            info!(path = %full_path.display(), family = font.family(), "font loaded");
            font
        }
        Err(e) => {
            warn!(path = %full_path.display(), error = %e, "font parse failed, using fallback font");
            CardFont::Fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRAND_FONT: &str = "assets/fonts/BrandFont.ttf";

    async fn brand_font() -> LoadedFont {
        match load_font(Some(BRAND_FONT)).await {
            CardFont::Loaded(f) => f,
            CardFont::Fallback => panic!("bundled font did not load"),
        }
    }

    /// 按视觉顺序取出字形对应的原文字符
    fn visual_chars(text: &str, line: &ShapedLine) -> String {
        line.glyphs
            .iter()
            .filter_map(|g| text[g.start..].chars().next())
            .collect()
    }

    #[test]
    fn fallback_measure_is_proportional() {
        let font = CardFont::Fallback;
        assert!((font.measure_width("abcd", 10.0) - 24.0).abs() < 1e-3);
        assert_eq!(font.measure_width("", 10.0), 0.0);
        assert_eq!(font.family(), None);
    }

    #[test]
    fn invalid_bytes_are_rejected() {
        assert!(CardFont::from_bytes(b"not a font").is_err());
    }

    #[tokio::test]
    async fn missing_font_falls_back() {
        assert!(load_font(Some("assets/fonts/missing.ttf")).await.is_fallback());
        assert!(load_font(None).await.is_fallback());
        assert!(load_font(Some("")).await.is_fallback());
    }

    #[tokio::test]
    async fn brand_font_measures_text() {
        let font = load_font(Some(BRAND_FONT)).await;
        assert!(!font.is_fallback());
        assert!(font.family().is_some());

        let small = font.measure_width("Sara", 20.0);
        let large = font.measure_width("Sara", 40.0);
        assert!(small > 0.0);
        assert!(large > small);
        assert_eq!(font.measure_width("", 30.0), 0.0);
    }

    #[tokio::test]
    async fn middle_baseline_sits_below_anchor() {
        let font = brand_font().await;
        let line = font.shape("Sara", 30.0, TextDirection::Ltr);
        assert!(line.ascent > 0.0);
        assert!(line.descent > 0.0);
        assert!(line.baseline_for_middle(100.0) > 100.0);
    }

    #[tokio::test]
    async fn rtl_line_keeps_numbers_in_reading_order() {
        let font = brand_font().await;
        let text = "نورة 2024";
        let line = font.shape(text, 30.0, TextDirection::Rtl);
        let visual = visual_chars(text, &line);

        assert!(visual.contains("2024"), "visual order was {visual:?}");
        // 阿拉伯文在右侧，数字在左侧
        assert!(visual.starts_with("2024"), "visual order was {visual:?}");
        assert!(line.glyphs.windows(2).all(|w| w[0].x <= w[1].x));
    }

    #[tokio::test]
    async fn rtl_line_keeps_latin_words_intact() {
        let font = brand_font().await;
        let text = "Hi محمد";
        let line = font.shape(text, 30.0, TextDirection::Rtl);
        let visual = visual_chars(text, &line);

        assert!(visual.contains("Hi"), "visual order was {visual:?}");
        assert!(visual.ends_with("Hi"), "visual order was {visual:?}");
    }

    #[tokio::test]
    async fn arabic_letters_are_joined() {
        let font = brand_font().await;
        let isolated = font.shape("م", 30.0, TextDirection::Rtl);
        let word = font.shape("محمد", 30.0, TextDirection::Rtl);

        // 词首的 م 使用连写字形，与单独书写的字形不同
        let initial = word.glyphs.iter().find(|g| g.start == 0).unwrap();
        assert_eq!(isolated.glyphs.len(), 1);
        assert_ne!(initial.cache_key.glyph_id, isolated.glyphs[0].cache_key.glyph_id);
        // 第一个字母在最右侧
        assert_eq!(word.glyphs.last().unwrap().start, 0);
    }

    #[tokio::test]
    async fn glyphs_rasterize_to_coverage() {
        let font = brand_font().await;
        let line = font.shape("A", 30.0, TextDirection::Ltr);
        let mut covered = 0;
        font.rasterize(line.glyphs[0].cache_key, |_, _, a| {
            if a > 0 {
                covered += 1;
            }
        });
        assert!(covered > 0);
    }
}
