//! Escaping for untrusted document text placed into HTML and CSS.

use std::fmt::Write;

/// Escape text content. Newlines are left alone; callers decide on `<br>`.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape an attribute value for use inside double quotes.
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a value for a double-quoted CSS string (`url("…")`, font names).
pub fn escape_css_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' | '\r' => result.push(' '),
            // Would end the surrounding <style> element when inlined.
            '<' => result.push_str("\\3c "),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a class name for use in a CSS selector. Identifier characters
/// pass through. A leading digit or `<` is written as a hex escape, and
/// other ASCII punctuation gets a backslash.
pub fn css_ident(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        let leading_digit = c.is_ascii_digit() && (i == 0 || (i == 1 && s.starts_with('-')));
        if leading_digit || c.is_ascii_control() || c == '<' {
            let _ = write!(out, "\\{:x} ", u32::from(c));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// Make text safe for the body of an HTML comment.
pub fn comment_text(s: &str) -> String {
    s.replace("--", "- -").replace('>', "&gt;")
}

/// Lowercase, hyphen-separated token usable in a class name.
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
