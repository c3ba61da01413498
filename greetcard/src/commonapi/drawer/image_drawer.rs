use image::{GrayImage, ImageBuffer, Luma, Rgba, RgbaImage};

use crate::commonapi::drawer::font_helper::{CardFont, LoadedFont, ShapedLine};
use crate::commonapi::drawer::text_helper::TextMeasure;
use crate::model::modelimpl::draw::{TextAlign, TextModel};

/// 解析后的阴影参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Rgba<u8>,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// 基于image库的绘图实现
pub struct ImageDrawer {
    image: Option<RgbaImage>,
}

impl ImageDrawer {
    /// 创建新实例
    pub fn new() -> Self {
        ImageDrawer { image: None }
    }

    /// 获取当前image
    fn get_image(&self) -> anyhow::Result<&RgbaImage> {
        self.image
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Image not initialized"))
    }

    /// 获取当前image的可变引用
    fn get_mut_image(&mut self) -> anyhow::Result<&mut RgbaImage> {
        self.image
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Image not initialized"))
    }

    /// 解析颜色：#RGB / #RRGGBB / #RRGGBBAA / transparent
    pub fn parse_color(value: &str) -> anyhow::Result<Rgba<u8>> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("transparent") {
            return Ok(Rgba([0, 0, 0, 0]));
        }

        let hex = value
            .strip_prefix('#')
            .ok_or_else(|| anyhow::anyhow!("invalid color: {}", value))?;
        if !hex.is_ascii() {
            anyhow::bail!("invalid color: {}", value);
        }
        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| anyhow::anyhow!("invalid color: {}", value))
        };

        match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = channel(&c.to_string())?;
                    rgb[i] = v * 17;
                }
                Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
            }
            6 | 8 => {
                let r = channel(&hex[0..2])?;
                let g = channel(&hex[2..4])?;
                let b = channel(&hex[4..6])?;
                let a = if hex.len() == 8 { channel(&hex[6..8])? } else { 255 };
                Ok(Rgba([r, g, b, a]))
            }
            _ => anyhow::bail!("invalid color: {}", value),
        }
    }

    /// 初始化绘图上下文
    pub fn init(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        self.image = Some(ImageBuffer::new(width.max(1), height.max(1)));
        Ok(())
    }

    /// 清空画布并绘制背景，背景尺寸需与画布一致
    pub fn draw_background(&mut self, background: &RgbaImage) -> anyhow::Result<()> {
        let image = self.get_mut_image()?;
        if image.dimensions() != background.dimensions() {
            anyhow::bail!(
                "background {:?} does not match canvas {:?}",
                background.dimensions(),
                image.dimensions()
            );
        }
        image.copy_from_slice(background);
        Ok(())
    }

    /// 生成PNG字节流
    pub fn encode_to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let image = self.get_image()?;
        let mut buffer = Vec::new();
        image.write_to(
            &mut std::io::Cursor::new(&mut buffer),
            image::ImageFormat::Png,
        )?;
        Ok(buffer)
    }

    pub fn into_image(self) -> anyhow::Result<RgbaImage> {
        self.image
            .ok_or_else(|| anyhow::anyhow!("Image not initialized"))
    }

    /// 绘制文字
    ///
    /// 先把所有行栅格化为覆盖度蒙版，有阴影时先合成阴影再合成文字。
    pub fn draw_text(
        &mut self,
        text: &TextModel,
        font: &CardFont,
        color: Rgba<u8>,
        shadow: Option<Shadow>,
    ) -> anyhow::Result<()> {
        let image = self.get_mut_image()?;
        let (width, height) = image.dimensions();

        let mut mask = GrayImage::new(width, height);
        for line in &text.lines {
            match font {
                CardFont::Loaded(f) => {
                    let shaped = f.shape(&line.text, text.font_size, text.direction);
                    let start_x = line_start_x(text.alignment, text.x, shaped.width);
                    let baseline = shaped.baseline_for_middle(line.y);
                    rasterize_line(&mut mask, f, &shaped, start_x, baseline);
                }
                CardFont::Fallback => {
                    let line_width = font.measure_width(&line.text, text.font_size);
                    let start_x = line_start_x(text.alignment, text.x, line_width);
                    rasterize_blocks(&mut mask, &line.text, start_x, line.y, text.font_size);
                }
            }
        }

        if let Some(shadow) = shadow.filter(|s| s.color.0[3] > 0) {
            let shifted = offset_mask(&mask, shadow.offset_x, shadow.offset_y);
            let blurred = if shadow.blur > 0.0 {
                image::imageops::blur(&shifted, shadow.blur / 2.0)
            } else {
                shifted
            };
            composite(image, &blurred, shadow.color);
        }
        composite(image, &mask, color);

        Ok(())
    }
}

/// 按对齐方式求行首X
fn line_start_x(alignment: TextAlign, anchor: f32, line_width: f32) -> f32 {
    match alignment {
        TextAlign::Left => anchor,
        TextAlign::Center => anchor - line_width / 2.0,
        TextAlign::Right => anchor - line_width,
    }
}

/// 覆盖度取最大值，重叠字形不会变暗
fn cover(mask: &mut GrayImage, px: i64, py: i64, alpha: u8) {
    if px < 0 || py < 0 || px >= mask.width() as i64 || py >= mask.height() as i64 {
        return;
    }
    let pixel = mask.get_pixel_mut(px as u32, py as u32);
    pixel.0[0] = pixel.0[0].max(alpha);
}

/// 栅格化整形后的一行文字
fn rasterize_line(
    mask: &mut GrayImage,
    font: &LoadedFont,
    line: &ShapedLine,
    start_x: f32,
    baseline: f32,
) {
    let origin_x = start_x.round() as i64;
    let origin_y = baseline.round() as i64;
    for glyph in &line.glyphs {
        let gx = origin_x + glyph.physical_x as i64;
        let gy = origin_y + glyph.physical_y as i64;
        font.rasterize(glyph.cache_key, |x, y, alpha| {
            if alpha > 0 {
                cover(mask, gx + x as i64, gy + y as i64, alpha);
            }
        });
    }
}

/// 没有字体文件时用方块代替字符
fn rasterize_blocks(mask: &mut GrayImage, text: &str, start_x: f32, mid_y: f32, size: f32) {
    let advance = size * 0.6;
    let glyph_w = (advance * 0.8).max(1.0);
    let top = (mid_y - size / 2.0).round() as i64;
    let bottom = (mid_y + size / 2.0).round() as i64;

    for (i, c) in text.chars().enumerate() {
        if c.is_whitespace() {
            continue;
        }
        let left = (start_x + i as f32 * advance).round() as i64;
        let right = (start_x + i as f32 * advance + glyph_w).round() as i64;
        for px in left..right {
            for py in top..bottom {
                cover(mask, px, py, 255);
            }
        }
    }
}

/// 蒙版整体平移
fn offset_mask(mask: &GrayImage, dx: f32, dy: f32) -> GrayImage {
    let dx = dx.round() as i64;
    let dy = dy.round() as i64;
    let (width, height) = mask.dimensions();
    ImageBuffer::from_fn(width, height, |x, y| {
        let sx = x as i64 - dx;
        let sy = y as i64 - dy;
        if sx < 0 || sy < 0 || sx >= width as i64 || sy >= height as i64 {
            Luma([0])
        } else {
            *mask.get_pixel(sx as u32, sy as u32)
        }
    })
}

/// 按蒙版覆盖度把颜色混合到画布上
fn composite(image: &mut RgbaImage, mask: &GrayImage, color: Rgba<u8>) {
    for (x, y, coverage) in mask.enumerate_pixels() {
        let coverage = coverage.0[0];
        if coverage == 0 {
            continue;
        }
        let alpha = (color.0[3] as u16 * coverage as u16 / 255) as u8;
        blend_over(image.get_pixel_mut(x, y), color, alpha);
    }
}

/// source-over 混合
fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>, alpha: u8) {
    if alpha == 0 {
        return;
    }
    if alpha == 255 {
        *dst = Rgba([src.0[0], src.0[1], src.0[2], 255]);
        return;
    }

    let sa = alpha as f32 / 255.0;
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for i in 0..3 {
        let c = (src.0[i] as f32 * sa + dst.0[i] as f32 * da * (1.0 - sa)) / out_a;
        dst.0[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round() as u8;
}

/// 创建基于image库的绘图实例
pub fn new_image_drawer() -> ImageDrawer {
    ImageDrawer::new()
}
