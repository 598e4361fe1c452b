//! Node renderer: one node → one HTML fragment.
//!
//! CSS is never returned alongside the markup. Each node registers a rule
//! for its `.pen-<id>` class in the collector owned by the [`Renderer`];
//! icon fonts register their stylesheet in the shared import set.
//!
//! The first body seen for a class becomes its plain rule. A node inside an
//! instance whose body differs gets a rule scoped by the classes of every
//! enclosing instance root, outermost first, with `unset` for declarations
//! of the plain rule it does not carry. Top-level ref ids are unique, so a
//! scoped rule only ever matches inside its own instance.
//!
//! `ref` nodes expand into an owned copy of the component tree with the
//! instance's overrides applied, so instances never share node values.
//! The stack of components being expanded is threaded through the
//! recursion; re-entering a component on that stack stops the branch.

use crate::config::ConvertConfig;
use crate::css::{CssCollector, format_num, push_decl};
use crate::escape::{comment_text, css_ident, escape_attr, escape_text, slug};
use crate::icons::{self, Glyph, IconImports};
use crate::style::StyleResolver;
use pen_core::{
    Axis, Document, Fill, Frame, IconFont, Node, NodeCommon, NodeId, PathNode, Polygon, RefNode,
    Shape, Size, Text, TextContent, variable_name,
};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt::Write;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Side length used for polygons whose box is not a fixed size.
const DEFAULT_POLYGON_SIZE: f64 = 100.0;

/// Reusable components by id.
pub type ComponentRegistry<'a> = HashMap<NodeId, &'a Node>;

// ─── Context ─────────────────────────────────────────────────────────────

/// Read-only inputs for one conversion: component registry, variable-aware
/// style resolver, and settings. Built once per document, never cached.
pub struct RenderContext<'a> {
    pub components: ComponentRegistry<'a>,
    pub styles: StyleResolver<'a>,
    pub config: &'a ConvertConfig,
}

impl<'a> RenderContext<'a> {
    pub fn new(doc: &'a Document, config: &'a ConvertConfig) -> Self {
        let mut components = ComponentRegistry::new();
        for node in doc.components() {
            let Some(id) = node.id() else { continue };
            match components.entry(id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(node);
                }
                Entry::Occupied(_) => {
                    log::warn!("duplicate component id `{id}`; keeping the first definition");
                }
            }
        }
        Self {
            components,
            styles: StyleResolver::new(&doc.variables),
            config,
        }
    }
}

/// What a conversion accumulates besides markup.
#[derive(Debug, Default)]
pub struct RenderOutput {
    pub css: CssCollector,
    pub imports: IconImports,
}

// ─── Renderer ────────────────────────────────────────────────────────────

pub struct Renderer<'c, 'a> {
    ctx: &'c RenderContext<'a>,
    out: RenderOutput,
    /// Components currently being expanded, outermost first.
    ref_stack: SmallVec<[NodeId; 8]>,
    /// Classes of the enclosing instance roots, outermost first.
    scopes: Vec<String>,
    /// First declaration block registered per plain selector.
    base_bodies: HashMap<String, String>,
}

impl<'c, 'a> Renderer<'c, 'a> {
    pub fn new(ctx: &'c RenderContext<'a>) -> Self {
        Self {
            ctx,
            out: RenderOutput::default(),
            ref_stack: SmallVec::new(),
            scopes: Vec::new(),
            base_bodies: HashMap::new(),
        }
    }

    /// Hand back the collected CSS rules and imports.
    pub fn finish(self) -> RenderOutput {
        self.out
    }

    /// Render one node. `parent_axis` is the main axis of the enclosing
    /// flex container, if any. Disabled and reusable nodes render as `""`
    /// and register no CSS; their subtrees are not visited.
    pub fn render(&mut self, node: &Node, parent_axis: Option<Axis>) -> String {
        if !node.is_enabled() {
            log::trace!("skip disabled {:?}", node.id());
            return String::new();
        }
        if node.is_reusable() {
            return String::new();
        }
        match node {
            Node::Frame(f) => self.render_frame(f, parent_axis),
            Node::Text(t) => self.render_text(t, parent_axis),
            Node::Rectangle(s) => self.render_box(s, parent_axis, false),
            Node::Ellipse(s) => self.render_box(s, parent_axis, true),
            Node::Path(p) => self.render_path(p, parent_axis),
            Node::Line(s) => self.render_line(s, parent_axis),
            Node::Polygon(p) => self.render_polygon(p, parent_axis),
            Node::Ref(r) => self.render_ref(r, parent_axis),
            Node::IconFont(i) => self.render_icon(i, parent_axis),
            Node::Unknown => {
                log::debug!("skipping node of unknown type");
                String::new()
            }
        }
    }

    /// Class name for a node. Whitespace would split the `class` attribute,
    /// so it becomes `_`; everything else is escaped where it is used.
    fn class_of(&self, id: &NodeId) -> String {
        let id: String = id
            .as_str()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        format!("{}{id}", self.ctx.config.class_prefix)
    }

    /// Register the rule for `class`. The first body becomes the plain
    /// rule, even when empty. A differing body inside an instance is
    /// scoped to that instance and resets what the plain rule adds.
    fn add_rule(&mut self, class: &str, body: String) {
        let selector = format!(".{}", css_ident(class));
        let Some(base) = self.base_bodies.get(&selector) else {
            self.base_bodies.insert(selector.clone(), body.clone());
            self.out.css.push(selector, body);
            return;
        };
        if *base == body {
            return;
        }
        let resets = unset_missing(base, &body);
        match self.scope_chain(class) {
            Some(scope) => self
                .out
                .css
                .push(format!("{scope} {selector}"), body + &resets),
            None => self.out.css.push(selector, body),
        }
    }

    /// Descendant selector for the instance roots enclosing `class`. An
    /// instance root is scoped by its ancestors only.
    fn scope_chain(&self, class: &str) -> Option<String> {
        let roots = match self.scopes.split_last() {
            Some((last, outer)) if last == class => outer,
            _ => &self.scopes[..],
        };
        if roots.is_empty() {
            return None;
        }
        let selectors: Vec<String> = roots.iter().map(|c| format!(".{}", css_ident(c))).collect();
        Some(selectors.join(" "))
    }

    /// Declarations shared by every box-like node.
    fn box_styles(&self, common: &NodeCommon, parent_axis: Option<Axis>) -> String {
        let styles = &self.ctx.styles;
        [
            styles.build_fill(common.fill.as_ref()),
            styles.build_stroke(common.stroke.as_ref()),
            styles.build_effects(&common.effects),
            styles.build_sizing(common.width.as_ref(), common.height.as_ref(), parent_axis),
            styles.build_appearance(common),
        ]
        .concat()
    }

    // ─── Containers ──────────────────────────────────────────────────────

    fn render_frame(&mut self, frame: &Frame, parent_axis: Option<Axis>) -> String {
        let ctx = self.ctx;
        let class = self.class_of(&frame.common.id);
        let body = [
            ctx.styles.build_layout(&frame.layout),
            self.box_styles(&frame.common, parent_axis),
        ]
        .concat();
        self.add_rule(&class, body);

        let tag = frame_tag(frame.common.name.as_deref());
        let axis = frame.layout.axis();
        let mut html = format!("<{tag} class=\"{}\">", escape_attr(&class));
        for child in &frame.children {
            let fragment = self.render(child, axis);
            html.push_str(&fragment);
        }
        let _ = write!(html, "</{tag}>");
        html
    }

    // ─── Text ────────────────────────────────────────────────────────────

    fn render_text(&mut self, text: &Text, parent_axis: Option<Axis>) -> String {
        let ctx = self.ctx;
        let c = &text.common;
        let class = self.class_of(&c.id);
        let body = [
            ctx.styles.build_typography(&text.typography),
            ctx.styles.build_text_color(c.fill.as_ref()),
            ctx.styles.build_sizing(c.width.as_ref(), c.height.as_ref(), parent_axis),
            ctx.styles.build_effects(&c.effects),
            ctx.styles.build_appearance(c),
        ]
        .concat();
        self.add_rule(&class, body);

        let inner = match &text.content {
            TextContent::Plain(s) => text_html(s),
            TextContent::Runs(runs) => {
                let mut html = String::new();
                for (i, run) in runs.iter().enumerate() {
                    let run_body = [
                        ctx.styles.build_typography(&run.typography),
                        ctx.styles.build_text_color(run.fill.as_ref()),
                    ]
                    .concat();
                    if run_body.is_empty() {
                        let _ = write!(html, "<span>{}</span>", text_html(&run.content));
                    } else {
                        let run_class = format!("{class}-run-{i}");
                        self.add_rule(&run_class, run_body);
                        let _ = write!(
                            html,
                            "<span class=\"{}\">{}</span>",
                            escape_attr(&run_class),
                            text_html(&run.content)
                        );
                    }
                }
                html
            }
        };

        let tag = ctx.config.text_tag(&text.typography).as_str();
        format!("<{tag} class=\"{}\">{inner}</{tag}>", escape_attr(&class))
    }

    // ─── Shapes ──────────────────────────────────────────────────────────

    fn render_box(&mut self, shape: &Shape, parent_axis: Option<Axis>, ellipse: bool) -> String {
        let class = self.class_of(&shape.common.id);
        let mut body = self.box_styles(&shape.common, parent_axis);
        if ellipse {
            push_decl(&mut body, "border-radius", "50%");
        }
        self.add_rule(&class, body);
        format!("<div class=\"{}\"></div>", escape_attr(&class))
    }

    fn render_line(&mut self, shape: &Shape, parent_axis: Option<Axis>) -> String {
        let ctx = self.ctx;
        let styles = &ctx.styles;
        let c = &shape.common;
        let class = self.class_of(&c.id);

        let mut body = String::new();
        push_decl(&mut body, "border", "none");
        push_decl(&mut body, "margin", "0");
        let stroke = c
            .stroke
            .as_ref()
            .filter(|s| s.enabled)
            .and_then(|s| styles.stroke_width(s).map(|w| (s, w)));
        let height = match stroke {
            Some((stroke, width)) => {
                let color = styles.stroke_color(stroke);
                push_decl(&mut body, "border-top", &format!("{width} solid {color}"));
                None
            }
            None => {
                if let Some(color) = c.fill.as_ref().and_then(Fill::solid_color) {
                    push_decl(&mut body, "background-color", &styles.resolve_color(color));
                }
                Some(c.height.clone().unwrap_or(Size::Fixed(1.0)))
            }
        };
        body.push_str(&styles.build_sizing(c.width.as_ref(), height.as_ref(), parent_axis));
        body.push_str(&styles.build_effects(&c.effects));
        body.push_str(&styles.build_appearance(c));
        self.add_rule(&class, body);
        format!("<hr class=\"{}\">", escape_attr(&class))
    }

    /// Fill attribute for an SVG shape, plus any paint declarations for the
    /// `<svg>` rule. Presentation attributes cannot hold `var()`, so
    /// variable colors go through the inherited CSS `fill` instead.
    fn svg_paint(&self, common: &NodeCommon, body: &mut String) -> String {
        let styles = &self.ctx.styles;
        let mut attrs = String::new();
        match common.fill.as_ref() {
            None => attrs.push_str(" fill=\"none\""),
            Some(fill) => match fill.solid_color() {
                Some(color) if variable_name(color).is_some() => {
                    push_decl(body, "fill", &styles.resolve_color(color));
                }
                Some(color) => {
                    let _ = write!(attrs, " fill=\"{}\"", escape_attr(&styles.resolve_color(color)));
                }
                None if styles.build_fill(Some(fill)).is_empty() => {
                    attrs.push_str(" fill=\"none\"");
                }
                None => attrs.push_str(" fill=\"currentColor\""),
            },
        }
        if let Some(stroke) = common.stroke.as_ref().filter(|s| s.enabled)
            && let Some(width) = styles.stroke_width(stroke)
        {
            push_decl(body, "stroke", &styles.stroke_color(stroke));
            push_decl(body, "stroke-width", &width);
        }
        attrs
    }

    fn svg_styles(&self, common: &NodeCommon, parent_axis: Option<Axis>) -> String {
        let styles = &self.ctx.styles;
        let mut body = [
            styles.build_sizing(common.width.as_ref(), common.height.as_ref(), parent_axis),
            styles.build_effects(&common.effects),
            styles.build_appearance(common),
        ]
        .concat();
        push_decl(&mut body, "overflow", "visible");
        body
    }

    fn render_path(&mut self, path: &PathNode, parent_axis: Option<Axis>) -> String {
        let c = &path.common;
        let class = self.class_of(&c.id);
        let mut body = self.svg_styles(c, parent_axis);
        let paint = self.svg_paint(c, &mut body);
        self.add_rule(&class, body);

        let view_box = fixed_box(c)
            .map(|(w, h)| format!(" viewBox=\"0 0 {} {}\"", format_num(w), format_num(h)))
            .unwrap_or_default();
        format!(
            "<svg class=\"{}\" xmlns=\"{SVG_NS}\"{view_box} preserveAspectRatio=\"none\">\
             <path d=\"{}\"{paint}/></svg>",
            escape_attr(&class),
            escape_attr(&path.geometry)
        )
    }

    fn render_polygon(&mut self, polygon: &Polygon, parent_axis: Option<Axis>) -> String {
        let c = &polygon.common;
        let class = self.class_of(&c.id);
        let mut body = self.svg_styles(c, parent_axis);
        let paint = self.svg_paint(c, &mut body);
        self.add_rule(&class, body);

        let (w, h) = fixed_box(c).unwrap_or((DEFAULT_POLYGON_SIZE, DEFAULT_POLYGON_SIZE));
        let points = polygon_points(polygon.polygon_count.unwrap_or(3), w, h);
        format!(
            "<svg class=\"{}\" xmlns=\"{SVG_NS}\" viewBox=\"0 0 {} {}\" preserveAspectRatio=\"none\">\
             <polygon points=\"{points}\"{paint}/></svg>",
            escape_attr(&class),
            format_num(w),
            format_num(h)
        )
    }

    // ─── Icons ───────────────────────────────────────────────────────────

    fn render_icon(&mut self, icon: &IconFont, parent_axis: Option<Axis>) -> String {
        let ctx = self.ctx;
        let c = &icon.common;
        let class = self.class_of(&c.id);

        let mut body = String::new();
        let size = match &icon.font_size {
            Some(size) => Some(ctx.styles.resolve_length(size)),
            None => c
                .width
                .as_ref()
                .and_then(Size::as_pixels)
                .map(|w| format!("{}px", format_num(w))),
        };
        if let Some(size) = size {
            push_decl(&mut body, "font-size", &size);
        }
        push_decl(&mut body, "line-height", "1");
        body.push_str(&ctx.styles.build_text_color(c.fill.as_ref()));
        body.push_str(&ctx.styles.build_sizing(c.width.as_ref(), c.height.as_ref(), parent_axis));
        body.push_str(&ctx.styles.build_effects(&c.effects));
        body.push_str(&ctx.styles.build_appearance(c));
        self.add_rule(&class, body);

        let family = icon.font_family.as_deref().unwrap_or_default();
        let name = icon.icon_name.as_deref().unwrap_or_default();
        let (tag, glyph_classes, content) = match icons::lookup(family) {
            Some(known) => {
                if self.out.imports.insert(known.import) {
                    log::debug!("icon font `{family}` imported from {}", known.import);
                }
                match known.glyph {
                    Glyph::Ligature { class } => ("span", class.to_string(), escape_text(name)),
                    Glyph::Class { base, prefix } => {
                        let glyph = format!("{prefix}{}", slug(name));
                        let classes = match base {
                            Some(base) => format!("{base} {glyph}"),
                            None => glyph,
                        };
                        ("i", classes, String::new())
                    }
                }
            }
            None => {
                let family = slug(family);
                let glyph = if family.is_empty() {
                    format!("icon-{}", slug(name))
                } else {
                    format!("{family} {family}-{}", slug(name))
                };
                ("i", glyph, String::new())
            }
        };
        format!(
            "<{tag} class=\"{} {}\" aria-hidden=\"true\">{content}</{tag}>",
            escape_attr(&glyph_classes),
            escape_attr(&class)
        )
    }

    // ─── References ──────────────────────────────────────────────────────

    fn render_ref(&mut self, instance: &RefNode, parent_axis: Option<Axis>) -> String {
        let ctx = self.ctx;
        let Some(component) = ctx.components.get(&instance.target).copied() else {
            log::warn!(
                "`{}` references unknown component `{}`",
                instance.common.id,
                instance.target
            );
            return String::new();
        };
        if self.ref_stack.contains(&instance.target) {
            log::warn!(
                "`{}` re-enters component `{}` while expanding it; stopping",
                instance.common.id,
                instance.target
            );
            return self.cut_off(&format!(
                "cyclic ref {} -> {}",
                instance.common.id, instance.target
            ));
        }
        if self.ref_stack.len() >= ctx.config.max_ref_depth {
            log::warn!(
                "ref expansion deeper than {} at `{}`; stopping",
                ctx.config.max_ref_depth,
                instance.common.id
            );
            return self.cut_off(&format!("ref depth limit at {}", instance.common.id));
        }

        let tree = instantiate(component, instance);
        let scope = self.class_of(&instance.common.id);
        self.ref_stack.push(instance.target.clone());
        self.scopes.push(scope);
        let html = self.render(&tree, parent_axis);
        self.scopes.pop();
        self.ref_stack.pop();
        html
    }

    fn cut_off(&self, message: &str) -> String {
        if self.ctx.config.cycle_comments {
            format!("<!-- {} -->", comment_text(message))
        } else {
            String::new()
        }
    }
}

// ─── Instantiation ───────────────────────────────────────────────────────

/// Build the node tree for one instance of `component`.
///
/// Properties set on the `ref` node itself overlay the component root,
/// and the root takes the ref's id. Each `descendants` entry is applied
/// to the node its path names. The component is never modified.
#[must_use]
pub fn instantiate(component: &Node, instance: &RefNode) -> Node {
    let overlay = instance_overlay(instance);
    let mut root = if overlay.is_empty() {
        component.clone()
    } else {
        component.with_overrides(&overlay)
    };
    for (path, patch) in &instance.descendants {
        apply_descendant_override(&mut root, path, patch);
    }
    if let Some(common) = root.common_mut() {
        common.id = instance.common.id.clone();
        common.reusable = false;
    }
    root
}

fn instance_overlay(instance: &RefNode) -> Map<String, Value> {
    let Ok(Value::Object(mut fields)) = serde_json::to_value(&instance.common) else {
        return Map::new();
    };
    fields.remove("id");
    fields.remove("reusable");
    fields
}

/// Resolve `path` (`"a"` or `"a/b/c"`) inside `root` and merge `patch`
/// into the node it names. The first segment may be any node in the tree;
/// each following segment is searched below the previous one. Reaching a
/// `ref` with segments left forwards the rest of the path into that ref's
/// own overrides, to be resolved when it expands.
fn apply_descendant_override(root: &mut Node, path: &str, patch: &Map<String, Value>) {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let Some(mut target) = root.find_mut(first) else {
        log::debug!("override path `{path}` matches nothing");
        return;
    };

    for (i, segment) in rest.iter().enumerate() {
        if let Node::Ref(nested) = &mut *target {
            let remaining = rest[i..].join("/");
            nested
                .descendants
                .entry(remaining)
                .or_default()
                .extend(patch.clone());
            return;
        }
        let Some(next) = target
            .children_mut()
            .and_then(|children| children.iter_mut().find_map(|child| child.find_mut(segment)))
        else {
            log::debug!("override path `{path}` matches nothing");
            return;
        };
        target = next;
    }
    target.apply_overrides(patch);
}

// ─── Helpers ─────────────────────────────────────────────────────────────

/// `prop: unset;` for every property of `base` that `body` does not set.
fn unset_missing(base: &str, body: &str) -> String {
    let props = |block: &str| -> Vec<String> {
        block
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(prop, _)| prop.trim().to_string())
            .collect()
    };
    let present = props(body);
    let mut resets = String::new();
    let mut seen = Vec::new();
    for prop in props(base) {
        if !present.contains(&prop) && !seen.contains(&prop) {
            push_decl(&mut resets, &prop, "unset");
            seen.push(prop);
        }
    }
    resets
}

/// Semantic container tag from a frame's name.
fn frame_tag(name: Option<&str>) -> &'static str {
    let Some(name) = name else {
        return "div";
    };
    let name = name.to_lowercase();
    if name.contains("header") {
        "header"
    } else if name.contains("footer") {
        "footer"
    } else if name.contains("main") || name.contains("content") {
        "main"
    } else {
        "div"
    }
}

fn text_html(s: &str) -> String {
    escape_text(s).replace("\r\n", "\n").replace('\n', "<br>")
}

/// Width and height when both are known pixel values.
fn fixed_box(common: &NodeCommon) -> Option<(f64, f64)> {
    let w = common.width.as_ref()?.as_pixels()?;
    let h = common.height.as_ref()?.as_pixels()?;
    Some((w, h))
}

/// Vertices of a regular polygon inscribed in a `width` × `height` box,
/// first vertex at top center, clockwise.
pub fn polygon_points(sides: u32, width: f64, height: f64) -> String {
    let n = sides.max(3);
    (0..n)
        .map(|i| {
            let angle = -FRAC_PI_2 + TAU * f64::from(i) / f64::from(n);
            let x = width / 2.0 * (1.0 + angle.cos());
            let y = height / 2.0 * (1.0 + angle.sin());
            format!("{},{}", format_num(x), format_num(y))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        serde_json::from_value(value).expect("document should parse")
    }

    fn render_all(d: &Document) -> (String, String) {
        let config = ConvertConfig::default();
        let ctx = RenderContext::new(d, &config);
        let mut renderer = Renderer::new(&ctx);
        let html: String = d
            .children
            .iter()
            .map(|n| renderer.render(n, None))
            .collect();
        (html, renderer.finish().css.to_css())
    }

    #[test]
    fn frame_tags_from_names() {
        assert_eq!(frame_tag(Some("Site Header")), "header");
        assert_eq!(frame_tag(Some("FOOTER links")), "footer");
        assert_eq!(frame_tag(Some("Main Column")), "main");
        assert_eq!(frame_tag(Some("page-content")), "main");
        assert_eq!(frame_tag(Some("Card")), "div");
        assert_eq!(frame_tag(None), "div");
    }

    #[test]
    fn polygon_vertices() {
        assert_eq!(polygon_points(3, 100.0, 100.0), "50,0 93.301,75 6.699,75");
        assert_eq!(polygon_points(4, 100.0, 50.0), "50,0 100,25 50,50 0,25");
        assert_eq!(polygon_points(1, 10.0, 10.0), polygon_points(3, 10.0, 10.0));
    }

    #[test]
    fn frame_children_inherit_axis() {
        let d = doc(json!({ "children": [
            { "type": "frame", "id": "row", "layout": "horizontal", "children": [
                { "type": "rectangle", "id": "grow", "width": "fill_container", "height": 10 }
            ]}
        ]}));
        let (html, css) = render_all(&d);
        assert_eq!(
            html,
            "<div class=\"pen-row\"><div class=\"pen-grow\"></div></div>"
        );
        assert!(css.contains(".pen-grow {\n  flex: 1 1 0%;\n  min-width: 0;\n  height: 10px;\n}"), "{css}");
    }

    #[test]
    fn runs_become_spans() {
        let d = doc(json!({ "children": [
            { "type": "text", "id": "mixed", "content": [
                { "content": "Plain " },
                { "content": "bold & <b>", "fontWeight": 700 }
            ]}
        ]}));
        let (html, css) = render_all(&d);
        assert_eq!(
            html,
            "<p class=\"pen-mixed\"><span>Plain </span>\
             <span class=\"pen-mixed-run-1\">bold &amp; &lt;b&gt;</span></p>"
        );
        assert!(css.contains(".pen-mixed-run-1 {\n  font-weight: 700;\n}"), "{css}");
    }

    #[test]
    fn newlines_become_breaks() {
        let d = doc(json!({ "children": [
            { "type": "text", "id": "lines", "content": "one\ntwo" }
        ]}));
        let (html, _) = render_all(&d);
        assert_eq!(html, "<p class=\"pen-lines\">one<br>two</p>");
    }

    #[test]
    fn path_and_polygon_svg() {
        let d = doc(json!({ "children": [
            { "type": "path", "id": "arrow", "geometry": "M0 0L10 5L0 10Z", "width": 10, "height": 10, "fill": "#F00" },
            { "type": "polygon", "id": "hex", "polygonCount": 4, "width": 20, "height": 20, "fill": "$accent" }
        ]}));
        let (html, css) = render_all(&d);
        assert!(html.contains(
            "<svg class=\"pen-arrow\" xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 10 10\" \
             preserveAspectRatio=\"none\"><path d=\"M0 0L10 5L0 10Z\" fill=\"#FF0000\"/></svg>"
        ), "{html}");
        assert!(html.contains("<polygon points=\"10,0 20,10 10,20 0,10\"/>"), "{html}");
        assert!(css.contains("fill: var(--accent);"), "{css}");
    }

    #[test]
    fn line_uses_stroke_as_border() {
        let d = doc(json!({ "children": [
            { "type": "line", "id": "rule", "width": "fill_container", "stroke": { "thickness": 2, "fill": "#CCC" } }
        ]}));
        let (html, css) = render_all(&d);
        assert_eq!(html, "<hr class=\"pen-rule\">");
        assert_eq!(
            css,
            ".pen-rule {\n  border: none;\n  margin: 0;\n  border-top: 2px solid #CCCCCC;\n  width: 100%;\n}\n"
        );
    }

    #[test]
    fn icon_markup_per_family() {
        let d = doc(json!({ "children": [
            { "type": "icon_font", "id": "home", "fontFamily": "Material Symbols Outlined", "iconName": "home", "fontSize": 24 },
            { "type": "icon_font", "id": "star", "fontFamily": "lucide", "iconName": "star" },
            { "type": "icon_font", "id": "odd", "fontFamily": "My Glyphs", "iconName": "Big Arrow" }
        ]}));
        let (html, _) = render_all(&d);
        assert!(html.contains(
            "<span class=\"material-symbols-outlined pen-home\" aria-hidden=\"true\">home</span>"
        ), "{html}");
        assert!(html.contains("<i class=\"icon-star pen-star\" aria-hidden=\"true\"></i>"), "{html}");
        assert!(html.contains("<i class=\"my-glyphs my-glyphs-big-arrow pen-odd\""), "{html}");
    }

    #[test]
    fn instantiate_applies_overlay_and_paths() {
        let component: Node = serde_json::from_value(json!({
            "type": "frame", "id": "card", "reusable": true, "width": 200,
            "children": [
                { "type": "text", "id": "card-title", "content": "Title" },
                { "type": "frame", "id": "card-body", "children": [
                    { "type": "text", "id": "card-copy", "content": "Copy" }
                ]}
            ]
        }))
        .unwrap();
        let Node::Ref(instance) = serde_json::from_value::<Node>(json!({
            "type": "ref", "id": "card-1", "ref": "card", "width": 320,
            "descendants": {
                "card-title": { "content": "Hello" },
                "card-body/card-copy": { "content": "World" }
            }
        }))
        .unwrap() else {
            panic!("expected ref");
        };

        let tree = instantiate(&component, &instance);
        let Node::Frame(root) = &tree else { panic!() };
        assert_eq!(root.common.id, NodeId::new("card-1"));
        assert!(!root.common.reusable);
        assert_eq!(root.common.width, Some(Size::Fixed(320.0)));
        let texts: Vec<String> = {
            let mut out = Vec::new();
            tree.walk(&mut |n| {
                if let Node::Text(t) = n {
                    out.push(t.content.plain_text());
                }
            });
            out
        };
        assert_eq!(texts, vec!["Hello", "World"]);

        // The component itself is untouched.
        let Node::Frame(original) = &component else { panic!() };
        assert_eq!(original.common.width, Some(Size::Fixed(200.0)));
    }

    #[test]
    fn paths_through_nested_refs_are_forwarded() {
        let component: Node = serde_json::from_value(json!({
            "type": "frame", "id": "outer", "reusable": true,
            "children": [ { "type": "ref", "id": "inner-slot", "ref": "inner" } ]
        }))
        .unwrap();
        let Node::Ref(instance) = serde_json::from_value::<Node>(json!({
            "type": "ref", "id": "outer-1", "ref": "outer",
            "descendants": { "inner-slot/leaf": { "content": "Deep" } }
        }))
        .unwrap() else {
            panic!("expected ref");
        };

        let tree = instantiate(&component, &instance);
        let Node::Frame(root) = &tree else { panic!() };
        let Node::Ref(slot) = &root.children[0] else { panic!() };
        assert_eq!(
            slot.descendants.get("leaf"),
            json!({ "content": "Deep" }).as_object()
        );
    }

    #[test]
    fn broken_refs_render_nothing_or_a_marker() {
        let d = doc(json!({ "children": [
            { "type": "ref", "id": "ghost", "ref": "missing-component" },
            { "type": "frame", "id": "loop", "reusable": true, "children": [
                { "type": "ref", "id": "loop-again", "ref": "loop" }
            ]},
            { "type": "ref", "id": "loop-1", "ref": "loop" }
        ]}));
        let (html, _) = render_all(&d);
        assert_eq!(
            html,
            "<div class=\"pen-loop-1\"><!-- cyclic ref loop-again -&gt; loop --></div>"
        );
    }

    #[test]
    fn overridden_instances_get_scoped_rules() {
        let d = doc(json!({ "children": [
            { "type": "frame", "id": "chip", "reusable": true, "children": [
                { "type": "rectangle", "id": "chip-dot", "fill": "#00F" }
            ]},
            { "type": "ref", "id": "chip-a", "ref": "chip" },
            { "type": "ref", "id": "chip-b", "ref": "chip",
              "descendants": { "chip-dot": { "fill": "#F00" } } }
        ]}));
        let (_, css) = render_all(&d);
        assert!(css.contains(".pen-chip-dot {\n  background-color: #0000FF;\n}"), "{css}");
        assert!(
            css.contains(".pen-chip-b .pen-chip-dot {\n  background-color: #FF0000;\n}"),
            "{css}"
        );
    }

    #[test]
    fn plain_instance_after_an_overridden_one_resets_extra_declarations() {
        let d = doc(json!({ "children": [
            { "type": "frame", "id": "chip", "reusable": true, "children": [
                { "type": "rectangle", "id": "chip-dot", "width": 8 }
            ]},
            { "type": "ref", "id": "chip-a", "ref": "chip",
              "descendants": { "chip-dot": { "fill": "#F00" } } },
            { "type": "ref", "id": "chip-b", "ref": "chip" }
        ]}));
        let (_, css) = render_all(&d);
        assert!(
            css.contains(".pen-chip-dot {\n  background-color: #FF0000;\n  width: 8px;\n}"),
            "{css}"
        );
        assert!(
            css.contains(
                ".pen-chip-b .pen-chip-dot {\n  width: 8px;\n  background-color: unset;\n}"
            ),
            "{css}"
        );
    }

    #[test]
    fn override_of_an_empty_rule_stays_in_its_instance() {
        let d = doc(json!({ "children": [
            { "type": "frame", "id": "chip", "reusable": true, "children": [
                { "type": "rectangle", "id": "chip-dot" }
            ]},
            { "type": "ref", "id": "chip-a", "ref": "chip" },
            { "type": "ref", "id": "chip-b", "ref": "chip",
              "descendants": { "chip-dot": { "fill": "#F00" } } }
        ]}));
        let (_, css) = render_all(&d);
        assert!(
            css.contains(".pen-chip-b .pen-chip-dot {\n  background-color: #FF0000;\n}"),
            "{css}"
        );
        assert_eq!(css.matches(".pen-chip-dot {").count(), 1, "{css}");
    }

    #[test]
    fn nested_ref_overrides_are_scoped_by_the_outer_instance() {
        let d = doc(json!({ "children": [
            { "type": "frame", "id": "inner", "reusable": true, "children": [
                { "type": "text", "id": "leaf", "content": "x", "fill": "#000" }
            ]},
            { "type": "frame", "id": "outer", "reusable": true, "children": [
                { "type": "ref", "id": "slot", "ref": "inner" }
            ]},
            { "type": "ref", "id": "x1", "ref": "outer",
              "descendants": { "slot/leaf": { "fill": "#F00" } } },
            { "type": "ref", "id": "x2", "ref": "outer" }
        ]}));
        let (_, css) = render_all(&d);
        assert!(css.contains(".pen-leaf {\n  color: #FF0000;\n}"), "{css}");
        assert!(
            css.contains(".pen-x2 .pen-slot .pen-leaf {\n  color: #000000;\n}"),
            "{css}"
        );
        assert!(!css.contains("\n.pen-slot .pen-leaf"), "{css}");
    }

    #[test]
    fn ids_are_escaped_in_selectors() {
        let d = doc(json!({ "children": [
            { "type": "rectangle", "id": "a.b", "fill": "#F00" },
            { "type": "rectangle", "id": "two words", "fill": "#0F0" }
        ]}));
        let (html, css) = render_all(&d);
        assert_eq!(
            html,
            "<div class=\"pen-a.b\"></div><div class=\"pen-two_words\"></div>"
        );
        assert!(css.contains(".pen-a\\.b {\n  background-color: #FF0000;\n}"), "{css}");
        assert!(css.contains(".pen-two_words {\n  background-color: #00FF00;\n}"), "{css}");
    }

    #[test]
    fn plain_instances_copy_the_component() {
        let component: Node = serde_json::from_value(json!({
            "type": "rectangle", "id": "dot", "reusable": true, "fill": "#00F"
        }))
        .unwrap();
        let Node::Ref(instance) =
            serde_json::from_value::<Node>(json!({ "type": "ref", "id": "dot-1", "ref": "dot" }))
                .unwrap()
        else {
            panic!("expected ref");
        };
        assert!(instance_overlay(&instance).is_empty());
        let Node::Rectangle(copy) = instantiate(&component, &instance) else { panic!() };
        assert_eq!(copy.common.id, NodeId::new("dot-1"));
        assert_eq!(copy.common.fill, component.common().and_then(|c| c.fill.clone()));
    }
}
