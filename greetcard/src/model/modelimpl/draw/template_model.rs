use serde::Deserialize;

/// 阴影配置
#[derive(Debug, Clone, Deserialize)]
pub struct ShadowModel {
    #[serde(default)]
    pub enabled: bool,
    /// 阴影颜色(#RRGGBB / #RRGGBBAA)
    pub color: String,
    /// 模糊半径(像素)
    #[serde(default)]
    pub blur: f32,
    #[serde(default)]
    pub offset_x: f32,
    #[serde(default)]
    pub offset_y: f32,
}

/// 卡片模板
///
/// 启动时从配置加载一次，之后只读。坐标与画布尺寸一致，
/// 背景图会被缩放到 `width` x `height`。
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateModel {
    /// 背景图 文件路径/url/base64
    pub src: String,
    /// 画布宽度
    pub width: u32,
    /// 画布高度
    pub height: u32,
    /// 名字锚点X
    pub x: f32,
    /// 名字锚点Y(垂直居中)
    pub y: f32,
    /// 名字最大宽度，超出自动缩小字号
    pub max_width: f32,
    /// 字体名称
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// 字重
    #[serde(default = "default_font_weight")]
    pub font_weight: u16,
    /// 字体文件
    #[serde(default)]
    pub font_path: Option<String>,
    /// 初始字号
    #[serde(default = "default_base_font_size")]
    pub base_font_size: f32,
    /// 文字颜色
    #[serde(default = "default_color")]
    pub color: String,
    /// 阴影
    #[serde(default)]
    pub shadow: Option<ShadowModel>,
    /// 是否允许两行
    #[serde(default = "default_allow_two_lines")]
    pub allow_two_lines: bool,
    /// 两行之间的距离
    #[serde(default = "default_line_height")]
    pub line_height: f32,
}

impl TemplateModel {
    /// 启用的阴影，未配置或关闭时为None
    pub fn active_shadow(&self) -> Option<&ShadowModel> {
        self.shadow.as_ref().filter(|s| s.enabled)
    }

    /// CSS风格字体描述，仅用于日志
    pub fn font_descriptor(&self, size: f32) -> String {
        format!("{} {}px {}", self.font_weight, size, self.font_family)
    }
}

fn default_font_family() -> String {
    "BrandFont".to_string()
}

fn default_font_weight() -> u16 {
    700
}

fn default_base_font_size() -> f32 {
    30.0
}

fn default_color() -> String {
    "#F26D21".to_string()
}

fn default_allow_two_lines() -> bool {
    true
}

fn default_line_height() -> f32 {
    50.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let toml = r#"
            src = "assets/card.png"
            width = 1080
            height = 1350
            x = 540
            y = 780
            max_width = 820
        "#;
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap();
        let template = cfg.try_deserialize::<TemplateModel>().unwrap();

        assert_eq!(template.base_font_size, 30.0);
        assert_eq!(template.line_height, 50.0);
        assert_eq!(template.color, "#F26D21");
        assert!(template.allow_two_lines);
        assert!(template.font_path.is_none());
        assert!(template.active_shadow().is_none());
        assert_eq!(template.font_descriptor(30.0), "700 30px BrandFont");
    }

    #[test]
    fn disabled_shadow_is_inactive() {
        let toml = r##"
            src = "assets/card.png"
            width = 10
            height = 10
            x = 5
            y = 5
            max_width = 8

            [shadow]
            enabled = false
            color = "#000000"
            blur = 4
        "##;
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap();
        let template = cfg.try_deserialize::<TemplateModel>().unwrap();

        assert!(template.shadow.is_some());
        assert!(template.active_shadow().is_none());
    }
}
