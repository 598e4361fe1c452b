//! Sizing keywords: `fill_container`, `fill_container(240)`, `fit_content`,
//! `fit_content(120)`, numeric strings, and `$variable` references.
//!
//! Built on `winnow` 0.7.

use crate::model::variable_name;
use winnow::ascii::{float, space0};
use winnow::combinator::{alt, delimited, opt};
use winnow::prelude::*;

/// How a node is sized along one axis.
#[derive(Debug, Clone, PartialEq)]
pub enum SizeMode {
    /// Exact pixel size.
    Fixed(f64),
    /// Grow to fill the parent; optional flex-basis fallback in px.
    Fill(Option<f64>),
    /// Shrink to content; optional fallback size in px.
    Fit(Option<f64>),
    /// Bare variable name (no `$`, no `--`).
    Variable(String),
}

#[derive(Debug, Clone, Copy)]
enum Keyword {
    Fill,
    Fit,
}

fn keyword(input: &mut &str) -> ModalResult<Keyword> {
    alt((
        "fill_container".value(Keyword::Fill),
        "fit_content".value(Keyword::Fit),
    ))
    .parse_next(input)
}

fn fallback(input: &mut &str) -> ModalResult<f64> {
    delimited(('(', space0), float, (space0, ')')).parse_next(input)
}

fn size_keyword(input: &mut &str) -> ModalResult<SizeMode> {
    let kw = keyword.parse_next(input)?;
    let basis = opt(fallback).parse_next(input)?;
    Ok(match kw {
        Keyword::Fill => SizeMode::Fill(basis),
        Keyword::Fit => SizeMode::Fit(basis),
    })
}

/// Parse a sizing keyword. Returns `None` for anything unrecognized.
#[must_use]
pub fn parse_size_keyword(text: &str) -> Option<SizeMode> {
    let text = text.trim();
    if let Some(name) = variable_name(text) {
        return Some(SizeMode::Variable(name.to_string()));
    }
    if let Ok(n) = text.parse::<f64>() {
        return Some(SizeMode::Fixed(n));
    }
    match size_keyword.parse(text) {
        Ok(mode) => Some(mode),
        Err(e) => {
            log::debug!("unrecognized size keyword {text:?}: {e}");
            None
        }
    }
}
