//! CSS declaration helpers and the per-conversion rule collector.
//!
//! Declaration blocks travel as plain strings of `prop: value;\n` lines so
//! builders compose by concatenation and an empty string means "nothing".

use std::collections::HashMap;
use std::fmt::Write;

/// Append one `prop: value;` line.
pub(crate) fn push_decl(out: &mut String, prop: &str, value: &str) {
    let _ = writeln!(out, "{prop}: {value};");
}

/// Format a number for CSS: integers without a fraction, otherwise at most
/// three decimals with trailing zeros trimmed.
pub fn format_num(n: f64) -> String {
    let rounded = (n * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded == rounded.trunc() && rounded.abs() < 1e15 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.3}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// A pixel length; zero stays unitless.
pub(crate) fn px(n: f64) -> String {
    if format_num(n) == "0" {
        "0".to_string()
    } else {
        format!("{}px", format_num(n))
    }
}

/// A single `selector { … }` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: String,
    pub body: String,
}

/// Collects rules in first-seen order. Identical rules are stored once;
/// a selector may appear again with a different body, in which case the
/// later rule wins in the cascade.
#[derive(Debug, Default)]
pub struct CssCollector {
    rules: Vec<CssRule>,
    by_selector: HashMap<String, Vec<usize>>,
}

impl CssCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_selector(&self, selector: &str) -> bool {
        self.by_selector.contains_key(selector)
    }

    pub fn contains(&self, selector: &str, body: &str) -> bool {
        self.by_selector
            .get(selector)
            .is_some_and(|idxs| idxs.iter().any(|&i| self.rules[i].body == body))
    }

    /// Add a rule. Empty bodies and exact duplicates are dropped.
    pub fn push(&mut self, selector: String, body: String) {
        if body.is_empty() || self.contains(&selector, &body) {
            return;
        }
        let idx = self.rules.len();
        self.by_selector.entry(selector.clone()).or_default().push(idx);
        self.rules.push(CssRule { selector, body });
    }

    pub fn rules(&self) -> &[CssRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Render every rule, two-space indented, one blank line apart.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            write_rule(&mut out, &rule.selector, &rule.body);
        }
        out
    }
}

pub(crate) fn write_rule(out: &mut String, selector: &str, body: &str) {
    let _ = writeln!(out, "{selector} {{");
    for line in body.lines() {
        let _ = writeln!(out, "  {line}");
    }
    out.push_str("}\n");
}
