use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose;
use image::{DynamicImage, RgbaImage};

/// 本地资源路径以 `base` 为基准，URL、data URL和绝对路径保持不变
pub fn resolve_asset(base: &Path, path: &str) -> String {
    if path.is_empty()
        || path.starts_with("http://")
        || path.starts_with("https://")
        || path.starts_with("data:")
        || Path::new(path).is_absolute()
    {
        return path.to_string();
    }
    base.join(path).to_string_lossy().into_owned()
}

/// 加载图片
pub async fn load_image_async(path: &str) -> anyhow::Result<DynamicImage> {
    if path.starts_with("http://") || path.starts_with("https://") {
        // 从URL加载
        load_image_from_url_async(path).await
    } else if path.starts_with("data:image/") {
        // 从base64加载
        load_image_from_base64(path)
    } else {
        // 从本地文件加载
        load_image_from_file_async(path).await
    }
}

/// 从URL加载图片
async fn load_image_from_url_async(url: &str) -> anyhow::Result<DynamicImage> {
    let response = reqwest::get(url).await?.error_for_status()?;
    let bytes = response.bytes().await?;
    let img = image::load_from_memory(&bytes)?;
    Ok(img)
}

/// 从base64加载图片
fn load_image_from_base64(base64_str: &str) -> anyhow::Result<DynamicImage> {
    // 移除data:image/xxx;base64,前缀
    let data = base64_str
        .split_once(',')
        .map(|(_, data)| data)
        .ok_or_else(|| anyhow::anyhow!("Invalid base64 format"))?;
    let bytes = general_purpose::STANDARD.decode(data)?;
    let img = image::load_from_memory(&bytes)?;
    Ok(img)
}

/// 从本地文件加载图片
async fn load_image_from_file_async(path: &str) -> anyhow::Result<DynamicImage> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| anyhow::anyhow!("read {}: {}", path, e))?;
    let img = image::load_from_memory(&bytes)?;
    Ok(img)
}

/// 拉伸到目标尺寸
pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    if img.width() == width && img.height() == height {
        return img.to_rgba8();
    }
    image::imageops::resize(img, width, height, image::imageops::FilterType::Lanczos3)
}

/// 编码为 data:image/png;base64 形式
pub fn to_png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png))
}
