pub mod template_model;
pub mod text_model;

pub use template_model::{ShadowModel, TemplateModel};
pub use text_model::{TextAlign, TextDirection, TextLine, TextModel};
