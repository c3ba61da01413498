use image::{Rgba, RgbaImage};
use tracing::{debug, info, warn};

use crate::app::app_config::Export;
use crate::commonapi::drawer::{
    CardFont, ImageDrawer, Shadow, layout_text, load_font, load_image_async, new_image_drawer,
    resize_image, to_png_data_url,
};
use crate::model::modelimpl::draw::{TemplateModel, TextAlign, TextModel};

/// 名字卡片渲染服务
///
/// 模板、背景和字体在启动时加载，之后只读，每次请求在自己的画布上绘制。
pub struct CardService {
    template: TemplateModel,
    background: RgbaImage,
    font: CardFont,
    color: Rgba<u8>,
    shadow: Option<Shadow>,
    export: Export,
}

impl CardService {
    /// 加载模板资源。背景图加载失败直接返回错误，字体失败则使用备用字体
    pub async fn load(template: TemplateModel, export: Export) -> anyhow::Result<Self> {
        let img = load_image_async(&template.src)
            .await
            .map_err(|e| anyhow::anyhow!("Template image failed to load: {}", e))?;
        info!(
            src = template.src.as_str(),
            width = img.width(),
            height = img.height(),
            "template image loaded"
        );

        let background = resize_image(&img, template.width, template.height);
        let font = load_font(template.font_path.as_deref()).await;
        Self::new(template, background, font, export)
    }

    pub fn new(
        template: TemplateModel,
        background: RgbaImage,
        font: CardFont,
        export: Export,
    ) -> anyhow::Result<Self> {
        let color = ImageDrawer::parse_color(&template.color)?;
        let shadow = match template.active_shadow() {
            Some(s) => Some(Shadow {
                color: ImageDrawer::parse_color(&s.color)?,
                blur: s.blur.max(0.0),
                offset_x: s.offset_x,
                offset_y: s.offset_y,
            }),
            None => None,
        };

        let background = if background.dimensions() == (template.width, template.height) {
            background
        } else {
            resize_image(
                &image::DynamicImage::ImageRgba8(background),
                template.width,
                template.height,
            )
        };

        Ok(CardService {
            template,
            background,
            font,
            color,
            shadow,
            export,
        })
    }

    pub fn export(&self) -> &Export {
        &self.export
    }

    pub fn font(&self) -> &CardFont {
        &self.font
    }

    /// 计算文字布局
    pub fn layout(&self, name: &str, alignment: TextAlign) -> Option<TextModel> {
        layout_text(&self.template, name, alignment, &self.font)
    }

    fn draw(&self, name: &str, alignment: TextAlign) -> anyhow::Result<ImageDrawer> {
        let mut drawer = new_image_drawer();
        drawer.init(self.template.width, self.template.height)?;
        drawer.draw_background(&self.background)?;

        if let Some(text) = self.layout(name, alignment) {
            debug!(
                lines = text.lines.len(),
                font = self.template.font_descriptor(text.font_size).as_str(),
                align = alignment.as_str(),
                rtl = ?text.direction,
                "draw name"
            );
            drawer.draw_text(&text, &self.font, self.color, self.shadow)?;
        }
        Ok(drawer)
    }

    /// 绘制卡片，名字为空时只有背景
    pub fn render(&self, name: &str, alignment: TextAlign) -> anyhow::Result<RgbaImage> {
        self.draw(name, alignment)?.into_image()
    }

    /// 导出PNG，失败时返回None
    pub fn export_png(&self, name: &str, alignment: TextAlign) -> Option<Vec<u8>> {
        match self
            .draw(name, alignment)
            .and_then(|drawer| drawer.encode_to_bytes())
        {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "png export failed");
                None
            }
        }
    }

    /// 导出 data:image/png;base64 预览
    pub fn export_data_url(&self, name: &str, alignment: TextAlign) -> Option<String> {
        self.export_png(name, alignment)
            .map(|png| to_png_data_url(&png))
    }
}
