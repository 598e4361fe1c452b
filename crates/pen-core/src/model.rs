//! Design document model for `.pen` files.
//!
//! A document is a list of top-level nodes plus a table of typed
//! variables. Nodes form a plain ownership tree (`children` vectors);
//! sharing happens only through `ref` nodes that instantiate a reusable
//! component by id. Style attributes stay close to the JSON shape so that
//! unknown enum tokens survive parsing and are dropped later, per
//! declaration, by the style resolver.

use crate::id::NodeId;
use crate::size::{SizeMode, parse_size_keyword};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Strip the `$` marker from a variable reference, plus any leading `--`.
///
/// `"$--primary"` and `"$primary"` both yield `Some("primary")`;
/// non-references yield `None`.
pub fn variable_name(s: &str) -> Option<&str> {
    let rest = s.strip_prefix('$')?;
    Some(rest.strip_prefix("--").unwrap_or(rest))
}

/// Normalize a variable table key: `"--primary"` and `"primary"` both
/// name the custom property `--primary`.
pub fn normalize_variable_key(key: &str) -> &str {
    key.strip_prefix("--").unwrap_or(key)
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

// ─── Scalars ─────────────────────────────────────────────────────────────

/// A value that is either a number or a string (typically a `$variable`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }

    /// The referenced variable name, if this is a `$variable`.
    pub fn variable(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => variable_name(s),
            Scalar::Number(_) => None,
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

/// One value or a per-side list (`padding`, `cornerRadius`).
///
/// Lists follow CSS shorthand order: 2 entries are vertical/horizontal,
/// 4 entries are top/right/bottom/left (corners: clockwise from top-left).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sides {
    Uniform(Scalar),
    List(SmallVec<[Scalar; 4]>),
}

// ─── Fill ────────────────────────────────────────────────────────────────

/// A fill: bare color, typed fill object, or a stack of fills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    Color(String),
    Layers(Vec<Fill>),
    Spec(FillSpec),
}

impl Fill {
    /// The plain color of this fill when it is one, for targets that only
    /// accept a color (`color:`, SVG `fill=`, border colors).
    pub fn solid_color(&self) -> Option<&str> {
        match self {
            Fill::Color(c) => Some(c),
            Fill::Spec(FillSpec::Color(c)) if c.enabled => Some(&c.color),
            Fill::Layers(layers) => layers.iter().rev().find_map(Fill::solid_color),
            Fill::Spec(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FillSpec {
    Color(ColorFill),
    Gradient(GradientFill),
    Image(ImageFill),
    #[serde(other)]
    Unsupported,
}

impl FillSpec {
    pub fn is_enabled(&self) -> bool {
        match self {
            FillSpec::Color(f) => f.enabled,
            FillSpec::Gradient(f) => f.enabled,
            FillSpec::Image(f) => f.enabled,
            FillSpec::Unsupported => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorFill {
    pub color: String,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientFill {
    /// `linear` (default), `radial`, or `angular`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient_type: Option<String>,
    /// Degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub colors: Vec<GradientStop>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub color: String,
    /// 0.0 ..= 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFill {
    pub url: String,
    /// `fill` (default), `fit`, `stretch`, or `tile`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
}

// ─── Stroke ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<Thickness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Thickness {
    Uniform(Scalar),
    Sides(SideThickness),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideThickness {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Scalar>,
}

// ─── Effects ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Shadow(Shadow),
    Blur(BlurEffect),
    BackgroundBlur(BlurEffect),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    /// `outer` (default) or `inner`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_type: Option<String>,
    #[serde(default)]
    pub offset: Offset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlurEffect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<Scalar>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
}

/// Accept `effects: [...]`, `effect: {...}`, or `null`.
fn one_or_many_effects<'de, D>(deserializer: D) -> Result<Vec<Effect>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Effect),
        Many(Vec<Effect>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(effect)) => vec![effect],
        Some(OneOrMany::Many(effects)) => effects,
    })
}

// ─── Sizing ──────────────────────────────────────────────────────────────

/// `width` / `height`: a pixel number or a keyword such as
/// `fill_container`, `fill_container(240)`, `fit_content`, `$size-card`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Size {
    Fixed(f64),
    Keyword(String),
}

impl Size {
    /// Interpret this size. Unrecognized keywords yield `None`.
    pub fn mode(&self) -> Option<SizeMode> {
        match self {
            Size::Fixed(n) => Some(SizeMode::Fixed(*n)),
            Size::Keyword(s) => parse_size_keyword(s),
        }
    }

    pub fn as_pixels(&self) -> Option<f64> {
        match self.mode()? {
            SizeMode::Fixed(n) => Some(n),
            SizeMode::Fill(basis) | SizeMode::Fit(basis) => basis,
            SizeMode::Variable(_) => None,
        }
    }
}

// ─── Layout / Typography ─────────────────────────────────────────────────

/// Flex layout fields carried by frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// `horizontal`, `vertical`, or `none`.
    #[serde(rename = "layout", default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<Sides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justify_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align_items: Option<String>,
}

/// The main axis children of a container are laid out along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Layout {
    /// Main axis for children, `None` when the frame has no flex layout.
    pub fn axis(&self) -> Option<Axis> {
        match self.direction.as_deref() {
            Some("vertical") => Some(Axis::Vertical),
            Some("none") => None,
            _ => Some(Axis::Horizontal),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    /// Unitless multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
}

impl Typography {
    /// Numeric font weight; accepts numbers, numeric strings, and the
    /// `normal` / `bold` keywords.
    pub fn weight(&self) -> Option<u16> {
        match self.font_weight.as_ref()? {
            Scalar::Number(n) => Some(*n as u16),
            Scalar::Text(s) => match s.trim() {
                "normal" | "regular" => Some(400),
                "medium" => Some(500),
                "semibold" => Some(600),
                "bold" => Some(700),
                other => other.parse().ok(),
            },
        }
    }
}

/// Text content: a plain string or a list of styled runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextContent {
    Plain(String),
    Runs(Vec<TextRun>),
}

impl Default for TextContent {
    fn default() -> Self {
        TextContent::Plain(String::new())
    }
}

impl TextContent {
    /// Concatenated raw text, run styling dropped.
    pub fn plain_text(&self) -> String {
        match self {
            TextContent::Plain(s) => s.clone(),
            TextContent::Runs(runs) => runs.iter().map(|r| r.content.as_str()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(flatten)]
    pub typography: Typography,
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Fields shared by every node kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeCommon {
    pub id: NodeId,
    /// Human label. Frames use it as a semantic-tag hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `false` prunes the node and its whole subtree.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
    /// Reusable components only render through `ref` instances.
    #[serde(default, skip_serializing_if = "is_false")]
    pub reusable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(
        default,
        alias = "effect",
        deserialize_with = "one_or_many_effects",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub effects: Vec<Effect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<Sides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Scalar>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub clip: bool,
}

impl NodeCommon {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            name: None,
            enabled: true,
            reusable: false,
            fill: None,
            stroke: None,
            effects: Vec::new(),
            width: None,
            height: None,
            corner_radius: None,
            opacity: None,
            clip: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(flatten)]
    pub common: NodeCommon,
    #[serde(flatten)]
    pub layout: Layout,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(flatten)]
    pub common: NodeCommon,
    #[serde(default)]
    pub content: TextContent,
    #[serde(flatten)]
    pub typography: Typography,
}

/// Rectangles, ellipses, and lines carry nothing beyond the common fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(flatten)]
    pub common: NodeCommon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    #[serde(flatten)]
    pub common: NodeCommon,
    /// Raw SVG path data.
    #[serde(default)]
    pub geometry: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polygon {
    #[serde(flatten)]
    pub common: NodeCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconFont {
    #[serde(flatten)]
    pub common: NodeCommon,
    #[serde(default, alias = "iconFontFamily", skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, alias = "iconFontName", skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Scalar>,
}

/// A path-addressed property patch: `"footer-left/footer-copyright"` →
/// `{ "content": "© 2026" }`.
pub type DescendantOverrides = BTreeMap<String, Map<String, Value>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefNode {
    #[serde(flatten)]
    pub common: NodeCommon,
    /// Id of the reusable component this node instantiates.
    #[serde(rename = "ref")]
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub descendants: DescendantOverrides,
}

/// One element of the design tree, keyed by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Frame(Frame),
    Text(Text),
    Rectangle(Shape),
    Ellipse(Shape),
    Path(PathNode),
    Line(Shape),
    Polygon(Polygon),
    Ref(RefNode),
    IconFont(IconFont),
    /// Any `type` this converter does not know; renders as nothing.
    #[serde(other)]
    Unknown,
}

impl Node {
    pub fn common(&self) -> Option<&NodeCommon> {
        match self {
            Node::Frame(n) => Some(&n.common),
            Node::Text(n) => Some(&n.common),
            Node::Rectangle(n) | Node::Ellipse(n) | Node::Line(n) => Some(&n.common),
            Node::Path(n) => Some(&n.common),
            Node::Polygon(n) => Some(&n.common),
            Node::Ref(n) => Some(&n.common),
            Node::IconFont(n) => Some(&n.common),
            Node::Unknown => None,
        }
    }

    pub fn common_mut(&mut self) -> Option<&mut NodeCommon> {
        match self {
            Node::Frame(n) => Some(&mut n.common),
            Node::Text(n) => Some(&mut n.common),
            Node::Rectangle(n) | Node::Ellipse(n) | Node::Line(n) => Some(&mut n.common),
            Node::Path(n) => Some(&mut n.common),
            Node::Polygon(n) => Some(&mut n.common),
            Node::Ref(n) => Some(&mut n.common),
            Node::IconFont(n) => Some(&mut n.common),
            Node::Unknown => None,
        }
    }

    pub fn id(&self) -> Option<&NodeId> {
        self.common().map(|c| &c.id)
    }

    pub fn is_enabled(&self) -> bool {
        self.common().is_none_or(|c| c.enabled)
    }

    pub fn is_reusable(&self) -> bool {
        self.common().is_some_and(|c| c.reusable)
    }

    /// The `type` tag this node was parsed from.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Frame(_) => "frame",
            Node::Text(_) => "text",
            Node::Rectangle(_) => "rectangle",
            Node::Ellipse(_) => "ellipse",
            Node::Path(_) => "path",
            Node::Line(_) => "line",
            Node::Polygon(_) => "polygon",
            Node::Ref(_) => "ref",
            Node::IconFont(_) => "icon_font",
            Node::Unknown => "unknown",
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Frame(f) => &f.children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Frame(f) => Some(&mut f.children),
            _ => None,
        }
    }

    /// Pre-order traversal over this node and all descendants.
    /// `ref` targets are not followed.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// First node with `id` in pre-order, this node included.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id().is_some_and(|own| own.as_str() == id) {
            return Some(self);
        }
        self.children_mut()?
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// Return a copy of this node with `patch` shallow-merged over its
    /// properties. `id` and `type` in the patch are ignored. A patch that
    /// no longer yields a valid node leaves the copy unchanged.
    #[must_use]
    pub fn with_overrides(&self, patch: &Map<String, Value>) -> Node {
        let mut merged = self.clone();
        merged.apply_overrides(patch);
        merged
    }

    /// In-place form of [`Node::with_overrides`], for nodes already owned
    /// by an instance tree.
    pub fn apply_overrides(&mut self, patch: &Map<String, Value>) {
        let Ok(Value::Object(mut fields)) = serde_json::to_value(&*self) else {
            return;
        };
        for (key, value) in patch {
            if key == "id" || key == "type" {
                continue;
            }
            fields.insert(key.clone(), value.clone());
        }
        match serde_json::from_value::<Node>(Value::Object(fields)) {
            Ok(node) => *self = node,
            Err(e) => log::warn!(
                "ignoring override on {}: patch does not fit a {} node ({e})",
                self.id().map(|id| id.to_string()).unwrap_or_default(),
                self.kind_name()
            ),
        }
    }
}

// ─── Variables ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Color,
    Number,
    String,
    #[serde(other)]
    Other,
}

/// A typed document-level constant, surfaced as a CSS custom property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDef {
    #[serde(rename = "type")]
    pub kind: VariableKind,
    /// A scalar, or a themed list `[{ "value": …, "theme": {…} }]`.
    pub value: Value,
}

impl VariableDef {
    /// The value used for the default theme: the themed entry without a
    /// `theme`, else the first entry.
    pub fn default_value(&self) -> &Value {
        let Value::Array(entries) = &self.value else {
            return &self.value;
        };
        let unthemed = entries
            .iter()
            .find(|e| e.get("theme").is_none_or(Value::is_null))
            .or_else(|| entries.first());
        match unthemed {
            Some(Value::Object(entry)) => entry.get("value").unwrap_or(&Value::Null),
            Some(other) => other,
            None => &Value::Null,
        }
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// A whole `.pen` design document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, VariableDef>,
    pub children: Vec<Node>,
}

impl Document {
    /// Parse a document from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Pre-order traversal over every node in the document.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Every node flagged `reusable`, at any depth, in document order.
    pub fn components(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.walk(&mut |node| {
            if node.is_reusable() {
                out.push(node);
            }
        });
        out
    }

    /// Whether `name` (bare, without `$` or `--`) is declared.
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables
            .keys()
            .any(|key| normalize_variable_key(key) == name)
    }
}
