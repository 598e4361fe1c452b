pub mod config;
pub mod convert;
pub mod css;
pub mod error;
pub mod escape;
pub mod icons;
pub mod render;
pub mod style;

pub use config::{ConvertConfig, HeadingRule, TextTag};
pub use convert::{
    Conversion, convert_document, convert_document_with, convert_file, convert_file_with,
    convert_str,
};
pub use error::{ConvertError, ConvertResult};
pub use render::{RenderContext, Renderer, instantiate};
pub use style::StyleResolver;

// Re-export the document model so callers need only this crate
pub use pen_core;
