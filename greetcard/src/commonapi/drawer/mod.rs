pub mod font_helper;
pub mod image_drawer;
pub mod image_helper;
pub mod text_helper;

pub use font_helper::{CardFont, load_font};
pub use image_drawer::*;
pub use image_helper::{load_image_async, resize_image, resolve_asset, to_png_data_url};
pub use text_helper::{TextMeasure, layout_text, limit_input_lines, safe_text};
