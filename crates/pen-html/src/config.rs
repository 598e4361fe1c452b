//! Conversion settings.

use pen_core::Typography;

// ─── Text tags ────────────────────────────────────────────────────────────

/// Element used for a `text` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTag {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    P,
}

impl TextTag {
    pub fn as_str(self) -> &'static str {
        match self {
            TextTag::H1 => "h1",
            TextTag::H2 => "h2",
            TextTag::H3 => "h3",
            TextTag::H4 => "h4",
            TextTag::H5 => "h5",
            TextTag::H6 => "h6",
            TextTag::P => "p",
        }
    }
}

/// A text node at least this large and this heavy becomes `tag`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingRule {
    pub min_font_size: f64,
    pub min_font_weight: u16,
    pub tag: TextTag,
}

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for `convert_document_with` / `convert_file_with`.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Prefix for generated class names: `pen-` gives `.pen-<id>`.
    pub class_prefix: String,

    /// Hard limit on nested `ref` expansion, on top of cycle detection.
    /// Default: **32**.
    pub max_ref_depth: usize,

    /// Ordered heading policy; the first matching rule wins, `<p>` otherwise.
    /// Default: 32px/700 → `h1`, 24px/600 → `h2`.
    pub heading_rules: Vec<HeadingRule>,

    /// Emit `<!-- … -->` markers where a cyclic or too-deep `ref` was cut
    /// off. Default: **true**.
    pub cycle_comments: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            class_prefix: "pen-".to_string(),
            max_ref_depth: 32,
            heading_rules: vec![
                HeadingRule {
                    min_font_size: 32.0,
                    min_font_weight: 700,
                    tag: TextTag::H1,
                },
                HeadingRule {
                    min_font_size: 24.0,
                    min_font_weight: 600,
                    tag: TextTag::H2,
                },
            ],
            cycle_comments: true,
        }
    }
}

impl ConvertConfig {
    /// Pick the element for text with this typography. Sizes given as
    /// variables cannot be measured and always yield `<p>`.
    pub fn text_tag(&self, typography: &Typography) -> TextTag {
        let Some(size) = typography.font_size.as_ref().and_then(|s| s.as_number()) else {
            return TextTag::P;
        };
        let weight = typography.weight().unwrap_or(400);
        self.heading_rules
            .iter()
            .find(|rule| size >= rule.min_font_size && weight >= rule.min_font_weight)
            .map_or(TextTag::P, |rule| rule.tag)
    }
}
