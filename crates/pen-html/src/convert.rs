//! Document converter: whole document → `{ html, css }`.

use crate::config::ConvertConfig;
use crate::css::{format_num, push_decl, write_rule};
use crate::error::{ConvertError, ConvertResult};
use crate::render::{RenderContext, Renderer};
use crate::style::StyleResolver;
use pen_core::{
    Document, Effect, Node, NodeCommon, Scalar, Sides, Size, SizeMode, TextContent, Thickness,
    Typography, VariableDef, VariableKind, normalize_variable_key, variable_name,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// Result of converting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conversion {
    /// Top-level fragments in document order, newline-separated.
    pub html: String,
    /// Icon imports, the `:root` variable block, then node rules.
    pub css: String,
}

/// Convert with the default [`ConvertConfig`].
pub fn convert_document(doc: &Document) -> Conversion {
    convert_document_with(doc, &ConvertConfig::default())
}

/// Convert a parsed document. Never fails: broken refs and unmappable
/// styles produce empty or partial output and a log line.
pub fn convert_document_with(doc: &Document, config: &ConvertConfig) -> Conversion {
    let ctx = RenderContext::new(doc, config);
    log::debug!(
        "converting {} top-level nodes, {} components",
        doc.children.len(),
        ctx.components.len()
    );

    let mut renderer = Renderer::new(&ctx);
    let fragments: Vec<String> = doc
        .children
        .iter()
        .map(|node| renderer.render(node, None))
        .filter(|html| !html.is_empty())
        .collect();
    let out = renderer.finish();

    let mut css = out.imports.to_css();
    css.push_str(&root_block(doc, &ctx.styles));
    if !out.css.is_empty() {
        css.push('\n');
        css.push_str(&out.css.to_css());
    }

    Conversion {
        html: fragments.join("\n"),
        css,
    }
}

/// Parse a document from JSON text and convert it.
pub fn convert_str(json: &str) -> ConvertResult<Conversion> {
    let doc = Document::from_json(json)?;
    Ok(convert_document(&doc))
}

/// Read, parse, and convert a `.pen` file.
pub fn convert_file(path: impl AsRef<Path>) -> ConvertResult<Conversion> {
    convert_file_with(path, &ConvertConfig::default())
}

pub fn convert_file_with(
    path: impl AsRef<Path>,
    config: &ConvertConfig,
) -> ConvertResult<Conversion> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = Document::from_json(&text).map_err(|source| ConvertError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded {}", path.display());
    Ok(convert_document_with(&doc, config))
}

// ─── :root ───────────────────────────────────────────────────────────────

/// The `:root { … }` block: one custom property per declared variable.
/// Always present, even for a document without variables.
fn root_block(doc: &Document, styles: &StyleResolver<'_>) -> String {
    let lengths = collect_length_variables(doc);
    let mut body = String::new();
    for (key, def) in &doc.variables {
        let name = normalize_variable_key(key);
        let Some(value) = variable_value(def, lengths.contains(name), styles) else {
            log::warn!("variable `{key}` has no usable value");
            continue;
        };
        push_decl(&mut body, &format!("--{name}"), &value);
    }
    let mut out = String::new();
    write_rule(&mut out, ":root", &body);
    out
}

fn variable_value(def: &VariableDef, is_length: bool, styles: &StyleResolver<'_>) -> Option<String> {
    let raw = match def.default_value() {
        Value::String(s) => s.clone(),
        Value::Number(n) => format_num(n.as_f64()?),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    Some(match def.kind {
        VariableKind::Color => styles.resolve_color(&raw),
        VariableKind::Number => match raw.trim().parse::<f64>() {
            Ok(n) if is_length && n != 0.0 => format!("{}px", format_num(n)),
            Ok(n) => format_num(n),
            Err(_) => styles.resolve_str(&raw),
        },
        VariableKind::String | VariableKind::Other => styles.resolve_str(&raw),
    })
}

/// Names of variables referenced by any length-valued property.
fn collect_length_variables(doc: &Document) -> HashSet<&str> {
    let mut names = HashSet::new();
    doc.walk(&mut |node| {
        if let Some(common) = node.common() {
            common_lengths(common, &mut names);
        }
        match node {
            Node::Frame(f) => {
                scalar_var(f.layout.gap.as_ref(), &mut names);
                sides_vars(f.layout.padding.as_ref(), &mut names);
            }
            Node::Text(t) => {
                typography_lengths(&t.typography, &mut names);
                if let TextContent::Runs(runs) = &t.content {
                    for run in runs {
                        typography_lengths(&run.typography, &mut names);
                    }
                }
            }
            Node::IconFont(i) => scalar_var(i.font_size.as_ref(), &mut names),
            Node::Ref(r) => {
                for patch in r.descendants.values() {
                    for (key, value) in patch {
                        patch_lengths(key, value, &mut names);
                    }
                }
            }
            _ => {}
        }
    });
    names
}

/// Properties whose values are lengths, as they appear in override patches.
const LENGTH_KEYS: &[&str] = &[
    "width",
    "height",
    "gap",
    "padding",
    "cornerRadius",
    "thickness",
    "blur",
    "spread",
    "radius",
    "fontSize",
    "letterSpacing",
];

/// Variables in a raw override value. Nested objects and arrays (strokes,
/// effects, text runs, forwarded `descendants`) are searched by key.
fn patch_lengths<'a>(key: &str, value: &'a Value, names: &mut HashSet<&'a str>) {
    match value {
        Value::String(s) if LENGTH_KEYS.contains(&key) => names.extend(variable_name(s)),
        Value::Array(items) => {
            for item in items {
                patch_lengths(key, item, names);
            }
        }
        Value::Object(fields) => {
            for (k, v) in fields {
                patch_lengths(k, v, names);
            }
        }
        _ => {}
    }
}

fn common_lengths<'a>(common: &'a NodeCommon, names: &mut HashSet<&'a str>) {
    for size in [&common.width, &common.height].into_iter().flatten() {
        if let Size::Keyword(s) = size
            && let Some(SizeMode::Variable(_)) = size.mode()
        {
            names.extend(variable_name(s));
        }
    }
    sides_vars(common.corner_radius.as_ref(), names);
    if let Some(stroke) = &common.stroke {
        match &stroke.thickness {
            Some(Thickness::Uniform(t)) => scalar_var(Some(t), names),
            Some(Thickness::Sides(s)) => {
                for t in [&s.top, &s.right, &s.bottom, &s.left] {
                    scalar_var(t.as_ref(), names);
                }
            }
            None => {}
        }
    }
    for effect in &common.effects {
        match effect {
            Effect::Shadow(s) => {
                scalar_var(s.blur.as_ref(), names);
                scalar_var(s.spread.as_ref(), names);
            }
            Effect::Blur(b) | Effect::BackgroundBlur(b) => scalar_var(b.radius.as_ref(), names),
            Effect::Unsupported => {}
        }
    }
}

fn typography_lengths<'a>(t: &'a Typography, names: &mut HashSet<&'a str>) {
    scalar_var(t.font_size.as_ref(), names);
    scalar_var(t.letter_spacing.as_ref(), names);
}

fn sides_vars<'a>(sides: Option<&'a Sides>, names: &mut HashSet<&'a str>) {
    match sides {
        Some(Sides::Uniform(v)) => scalar_var(Some(v), names),
        Some(Sides::List(list)) => {
            for v in list {
                scalar_var(Some(v), names);
            }
        }
        None => {}
    }
}

fn scalar_var<'a>(v: Option<&'a Scalar>, names: &mut HashSet<&'a str>) {
    names.extend(v.and_then(Scalar::variable));
}
