//! Style resolution: node style attributes → CSS declaration blocks.
//!
//! Every builder returns a string of `prop: value;` lines, or `""` when
//! there is nothing to emit. Values this resolver cannot map (unknown
//! tokens, zero-width strokes, empty gradients) are dropped per
//! declaration rather than reported.

use crate::css::{format_num, push_decl, px};
use crate::escape::escape_css_string;
use pen_core::{
    Axis, Effect, Fill, FillSpec, GradientFill, ImageFill, Layout, NodeCommon, Scalar, Sides,
    Size, SizeMode, Stroke, Thickness, Typography, VariableDef, hex_val, normalize_variable_key,
    variable_name,
};
use std::collections::{BTreeMap, HashSet};

/// Shadow color when a shadow entry gives none.
const DEFAULT_SHADOW_COLOR: &str = "rgba(0, 0, 0, 0.25)";

/// Stateless style builders bound to one document's variable table.
pub struct StyleResolver<'a> {
    declared: HashSet<&'a str>,
}

impl<'a> StyleResolver<'a> {
    pub fn new(variables: &'a BTreeMap<String, VariableDef>) -> Self {
        Self {
            declared: variables
                .keys()
                .map(|k| normalize_variable_key(k))
                .collect(),
        }
    }

    // ─── Values ──────────────────────────────────────────────────────────

    /// `var(--name)` for a `$name` reference; anything else unchanged.
    pub fn resolve_str(&self, s: &str) -> String {
        match variable_name(s) {
            Some(name) => self.var(name),
            None => s.to_string(),
        }
    }

    /// Numbers are stringified, `$name` becomes `var(--name)`.
    pub fn resolve_value(&self, v: &Scalar) -> String {
        match v {
            Scalar::Number(n) => format_num(*n),
            Scalar::Text(s) => self.resolve_str(s),
        }
    }

    /// Like [`Self::resolve_value`] but numbers get `px`.
    pub fn resolve_length(&self, v: &Scalar) -> String {
        match v {
            Scalar::Number(n) => px(*n),
            Scalar::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) => px(n),
                Err(_) => self.resolve_str(s),
            },
        }
    }

    fn var(&self, name: &str) -> String {
        if !self.declared.contains(name) {
            log::debug!("reference to undeclared variable ${name}");
        }
        format!("var(--{name})")
    }

    /// Normalize a color: `#ABC` → `#AABBCC`, `#RRGGBBAA` → `rgba(…)`,
    /// variables → `var(…)`. Other values pass through.
    pub fn resolve_color(&self, color: &str) -> String {
        let color = color.trim();
        if variable_name(color).is_some() {
            return self.resolve_str(color);
        }
        let Some(hex) = color.strip_prefix('#') else {
            return color.to_string();
        };
        if !hex.bytes().all(|b| hex_val(b).is_some()) {
            return color.to_string();
        }
        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => {
                let mut out = String::with_capacity(7);
                out.push('#');
                for &b in bytes {
                    out.push(b as char);
                    out.push(b as char);
                }
                out
            }
            4 => {
                let doubled: Vec<u8> = bytes.iter().flat_map(|&b| [b, b]).collect();
                rgba_from_hex8(&doubled)
            }
            8 => rgba_from_hex8(bytes),
            _ => color.to_string(),
        }
    }

    // ─── Fill ────────────────────────────────────────────────────────────

    /// Background declarations for a fill. Lists are layered with the last
    /// entry on top.
    pub fn build_fill(&self, fill: Option<&Fill>) -> String {
        let Some(fill) = fill else {
            return String::new();
        };
        let mut background = Background::default();
        self.collect_background(fill, &mut background);
        background.into_declarations()
    }

    fn collect_background(&self, fill: &Fill, bg: &mut Background) {
        match fill {
            Fill::Color(c) => bg.color = Some(self.resolve_color(c)),
            Fill::Layers(layers) => {
                for layer in layers {
                    self.collect_background(layer, bg);
                }
            }
            Fill::Spec(spec) if !spec.is_enabled() => {}
            Fill::Spec(FillSpec::Color(c)) => bg.color = Some(self.resolve_color(&c.color)),
            Fill::Spec(FillSpec::Gradient(g)) => {
                if let Some(image) = self.gradient(g) {
                    bg.layers.push(BackgroundLayer {
                        image,
                        size: None,
                        repeat: false,
                    });
                }
            }
            Fill::Spec(FillSpec::Image(img)) => bg.layers.push(self.image_layer(img)),
            Fill::Spec(FillSpec::Unsupported) => {}
        }
    }

    fn gradient(&self, g: &GradientFill) -> Option<String> {
        let mut stops: Vec<String> = g
            .colors
            .iter()
            .map(|stop| {
                let color = self.resolve_color(&stop.color);
                match stop.position {
                    Some(p) => format!("{color} {}%", format_num(p * 100.0)),
                    None => color,
                }
            })
            .collect();
        match stops.len() {
            0 => return None,
            1 => stops.push(stops[0].clone()),
            _ => {}
        }
        let stops = stops.join(", ");
        let angle = format_num(g.rotation.unwrap_or(180.0));
        Some(match g.gradient_type.as_deref() {
            Some("radial") => format!("radial-gradient(circle, {stops})"),
            Some("angular") => format!("conic-gradient(from {angle}deg, {stops})"),
            _ => format!("linear-gradient({angle}deg, {stops})"),
        })
    }

    fn image_layer(&self, img: &ImageFill) -> BackgroundLayer {
        let (size, repeat) = match img.mode.as_deref() {
            Some("fit") => ("contain", false),
            Some("stretch") => ("100% 100%", false),
            Some("tile") => ("auto", true),
            _ => ("cover", false),
        };
        BackgroundLayer {
            image: format!("url(\"{}\")", escape_css_string(&img.url)),
            size: Some(size),
            repeat,
        }
    }

    /// `color:` for text and icons. Only solid fills apply.
    pub fn build_text_color(&self, fill: Option<&Fill>) -> String {
        let mut out = String::new();
        if let Some(color) = fill.and_then(Fill::solid_color) {
            push_decl(&mut out, "color", &self.resolve_color(color));
        }
        out
    }

    // ─── Stroke ──────────────────────────────────────────────────────────

    /// The resolved stroke color, `currentColor` when the stroke has none.
    pub fn stroke_color(&self, stroke: &Stroke) -> String {
        stroke
            .fill
            .as_ref()
            .and_then(Fill::solid_color)
            .map_or_else(|| "currentColor".to_string(), |c| self.resolve_color(c))
    }

    /// `border` for a uniform thickness, `border-<side>` per side otherwise.
    /// Zero-thickness sides are omitted; a missing thickness means 1px.
    pub fn build_stroke(&self, stroke: Option<&Stroke>) -> String {
        let mut out = String::new();
        let Some(stroke) = stroke.filter(|s| s.enabled) else {
            return out;
        };
        let color = self.stroke_color(stroke);
        match &stroke.thickness {
            None => push_decl(&mut out, "border", &format!("1px solid {color}")),
            Some(Thickness::Uniform(t)) => {
                if !is_zero(t) {
                    let width = self.resolve_length(t);
                    push_decl(&mut out, "border", &format!("{width} solid {color}"));
                }
            }
            Some(Thickness::Sides(sides)) => {
                for (name, t) in [
                    ("border-top", &sides.top),
                    ("border-right", &sides.right),
                    ("border-bottom", &sides.bottom),
                    ("border-left", &sides.left),
                ] {
                    if let Some(t) = t.as_ref().filter(|t| !is_zero(t)) {
                        let width = self.resolve_length(t);
                        push_decl(&mut out, name, &format!("{width} solid {color}"));
                    }
                }
            }
        }
        out
    }

    /// Width of the thickest side, for renderers that draw a single line.
    pub fn stroke_width(&self, stroke: &Stroke) -> Option<String> {
        match &stroke.thickness {
            None => Some(px(1.0)),
            Some(Thickness::Uniform(t)) => (!is_zero(t)).then(|| self.resolve_length(t)),
            Some(Thickness::Sides(s)) => [&s.top, &s.right, &s.bottom, &s.left]
                .into_iter()
                .flatten()
                .filter_map(Scalar::as_number)
                .filter(|n| *n > 0.0)
                .reduce(f64::max)
                .map(px),
        }
    }

    // ─── Effects ─────────────────────────────────────────────────────────

    /// `box-shadow` (all shadows comma-joined), `filter`, `backdrop-filter`.
    pub fn build_effects(&self, effects: &[Effect]) -> String {
        let mut shadows = Vec::new();
        let mut filters = Vec::new();
        let mut backdrop = Vec::new();

        for effect in effects {
            match effect {
                Effect::Shadow(s) if s.enabled => {
                    let inset = if s.shadow_type.as_deref() == Some("inner") {
                        "inset "
                    } else {
                        ""
                    };
                    let blur = s.blur.as_ref().map_or_else(|| px(0.0), |b| self.resolve_length(b));
                    let spread = s.spread.as_ref().map_or_else(|| px(0.0), |v| self.resolve_length(v));
                    let color = s
                        .color
                        .as_deref()
                        .map_or_else(|| DEFAULT_SHADOW_COLOR.to_string(), |c| self.resolve_color(c));
                    shadows.push(format!(
                        "{inset}{} {} {blur} {spread} {color}",
                        px(s.offset.x),
                        px(s.offset.y)
                    ));
                }
                Effect::Blur(b) if b.enabled => {
                    if let Some(r) = &b.radius {
                        filters.push(format!("blur({})", self.resolve_length(r)));
                    }
                }
                Effect::BackgroundBlur(b) if b.enabled => {
                    if let Some(r) = &b.radius {
                        backdrop.push(format!("blur({})", self.resolve_length(r)));
                    }
                }
                _ => {}
            }
        }

        let mut out = String::new();
        if !shadows.is_empty() {
            push_decl(&mut out, "box-shadow", &shadows.join(", "));
        }
        if !filters.is_empty() {
            push_decl(&mut out, "filter", &filters.join(" "));
        }
        if !backdrop.is_empty() {
            push_decl(&mut out, "backdrop-filter", &backdrop.join(" "));
        }
        out
    }

    // ─── Layout ──────────────────────────────────────────────────────────

    /// Flex container declarations for a frame. Always `display: flex`.
    pub fn build_layout(&self, layout: &Layout) -> String {
        let mut out = String::new();
        push_decl(&mut out, "display", "flex");
        match layout.direction.as_deref() {
            Some("horizontal") => push_decl(&mut out, "flex-direction", "row"),
            Some("vertical") => push_decl(&mut out, "flex-direction", "column"),
            _ => {}
        }
        if let Some(gap) = &layout.gap {
            push_decl(&mut out, "gap", &self.resolve_length(gap));
        }
        if let Some(padding) = &layout.padding
            && let Some(value) = self.sides(padding)
        {
            push_decl(&mut out, "padding", &value);
        }
        if let Some(justify) = layout.justify_content.as_deref().and_then(justify_keyword) {
            push_decl(&mut out, "justify-content", justify);
        }
        if let Some(align) = layout.align_items.as_deref().and_then(align_keyword) {
            push_decl(&mut out, "align-items", align);
        }
        out
    }

    /// CSS shorthand for 1–4 lengths. Extra entries are ignored.
    fn sides(&self, sides: &Sides) -> Option<String> {
        match sides {
            Sides::Uniform(v) => Some(self.resolve_length(v)),
            Sides::List(list) if list.is_empty() => None,
            Sides::List(list) => Some(
                list.iter()
                    .take(4)
                    .map(|v| self.resolve_length(v))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }

    // ─── Typography ──────────────────────────────────────────────────────

    pub fn build_typography(&self, t: &Typography) -> String {
        let mut out = String::new();
        if let Some(family) = t.font_family.as_deref() {
            let value = match variable_name(family) {
                Some(name) => self.var(name),
                None => format!("\"{}\"", escape_css_string(family)),
            };
            push_decl(&mut out, "font-family", &value);
        }
        if let Some(size) = &t.font_size {
            push_decl(&mut out, "font-size", &self.resolve_length(size));
        }
        if let Some(weight) = &t.font_weight {
            let value = match weight.variable() {
                Some(name) => Some(self.var(name)),
                None => t.weight().map(|w| w.to_string()),
            };
            if let Some(value) = value {
                push_decl(&mut out, "font-weight", &value);
            }
        }
        if let Some(style) = t.font_style.as_deref().filter(|s| matches!(*s, "italic" | "normal" | "oblique")) {
            push_decl(&mut out, "font-style", style);
        }
        if let Some(lh) = &t.line_height {
            push_decl(&mut out, "line-height", &self.resolve_value(lh));
        }
        if let Some(ls) = &t.letter_spacing {
            push_decl(&mut out, "letter-spacing", &self.resolve_length(ls));
        }
        if let Some(align) = t.text_align.as_deref().filter(|a| matches!(*a, "left" | "center" | "right" | "justify")) {
            push_decl(&mut out, "text-align", align);
        }
        let decoration = match t.text_decoration.as_deref() {
            Some("underline") => Some("underline"),
            Some("line-through" | "line_through" | "strikethrough") => Some("line-through"),
            Some("none") => Some("none"),
            _ => None,
        };
        if let Some(decoration) = decoration {
            push_decl(&mut out, "text-decoration", decoration);
        }
        out
    }

    // ─── Sizing ──────────────────────────────────────────────────────────

    /// Width/height declarations. `parent_axis` is the main axis of the
    /// enclosing flex container, if any: `fill_container` along it becomes
    /// `flex`, across it `align-self: stretch`, and without one `100%`.
    pub fn build_sizing(
        &self,
        width: Option<&Size>,
        height: Option<&Size>,
        parent_axis: Option<Axis>,
    ) -> String {
        let mut out = String::new();
        self.size_decls(&mut out, "width", Axis::Horizontal, width, parent_axis);
        self.size_decls(&mut out, "height", Axis::Vertical, height, parent_axis);
        out
    }

    fn size_decls(
        &self,
        out: &mut String,
        prop: &str,
        axis: Axis,
        size: Option<&Size>,
        parent_axis: Option<Axis>,
    ) {
        let Some(mode) = size.and_then(Size::mode) else {
            return;
        };
        match mode {
            SizeMode::Fixed(n) => push_decl(out, prop, &px(n)),
            SizeMode::Variable(name) => push_decl(out, prop, &self.var(&name)),
            SizeMode::Fit(_) => push_decl(out, prop, "fit-content"),
            SizeMode::Fill(basis) => match parent_axis {
                Some(main) if main == axis => {
                    let basis = basis.map_or_else(|| "0%".to_string(), px);
                    push_decl(out, "flex", &format!("1 1 {basis}"));
                    push_decl(out, &format!("min-{prop}"), "0");
                }
                Some(_) => push_decl(out, "align-self", "stretch"),
                None => push_decl(out, prop, "100%"),
            },
        }
    }

    // ─── Appearance ──────────────────────────────────────────────────────

    /// `border-radius`, `opacity`, and `overflow` from the common fields.
    pub fn build_appearance(&self, common: &NodeCommon) -> String {
        let mut out = String::new();
        if let Some(radius) = common.corner_radius.as_ref().and_then(|r| self.sides(r)) {
            push_decl(&mut out, "border-radius", &radius);
        }
        if let Some(opacity) = &common.opacity {
            let value = match opacity.as_number() {
                Some(n) => format_num(n.clamp(0.0, 1.0)),
                None => self.resolve_value(opacity),
            };
            push_decl(&mut out, "opacity", &value);
        }
        if common.clip {
            push_decl(&mut out, "overflow", "hidden");
        }
        out
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn is_zero(v: &Scalar) -> bool {
    v.as_number() == Some(0.0)
}

fn rgba_from_hex8(hex: &[u8]) -> String {
    let byte = |i: usize| {
        let hi = hex_val(hex[i]).unwrap_or(0);
        let lo = hex_val(hex[i + 1]).unwrap_or(0);
        hi << 4 | lo
    };
    let alpha = f64::from(byte(6)) / 255.0;
    format!(
        "rgba({}, {}, {}, {})",
        byte(0),
        byte(2),
        byte(4),
        format_num(alpha)
    )
}

fn justify_keyword(token: &str) -> Option<&'static str> {
    match token {
        "start" | "flex_start" => Some("flex-start"),
        "center" => Some("center"),
        "end" | "flex_end" => Some("flex-end"),
        "space_between" => Some("space-between"),
        "space_around" => Some("space-around"),
        "space_evenly" => Some("space-evenly"),
        other => {
            log::debug!("unknown justifyContent {other:?}");
            None
        }
    }
}

fn align_keyword(token: &str) -> Option<&'static str> {
    match token {
        "start" | "flex_start" => Some("flex-start"),
        "center" => Some("center"),
        "end" | "flex_end" => Some("flex-end"),
        "stretch" => Some("stretch"),
        "baseline" => Some("baseline"),
        other => {
            log::debug!("unknown alignItems {other:?}");
            None
        }
    }
}

#[derive(Default)]
struct Background {
    color: Option<String>,
    layers: Vec<BackgroundLayer>,
}

struct BackgroundLayer {
    image: String,
    /// `None` for gradients, which size themselves.
    size: Option<&'static str>,
    repeat: bool,
}

impl Background {
    fn into_declarations(mut self) -> String {
        let mut out = String::new();
        if let Some(color) = &self.color {
            push_decl(&mut out, "background-color", color);
        }
        if self.layers.is_empty() {
            return out;
        }
        // Design tools paint the last fill on top; CSS lists the top layer first.
        self.layers.reverse();
        let images: Vec<&str> = self.layers.iter().map(|l| l.image.as_str()).collect();
        push_decl(&mut out, "background-image", &images.join(", "));
        if self.layers.iter().any(|l| l.size.is_some()) {
            let sizes: Vec<&str> = self.layers.iter().map(|l| l.size.unwrap_or("auto")).collect();
            let repeats: Vec<&str> = self
                .layers
                .iter()
                .map(|l| if l.repeat { "repeat" } else { "no-repeat" })
                .collect();
            push_decl(&mut out, "background-size", &sizes.join(", "));
            push_decl(&mut out, "background-position", "center");
            push_decl(&mut out, "background-repeat", &repeats.join(", "));
        }
        out
    }
}
