//! Per-format parsers. Every parser consumes the shared [`Input`] context
//! and returns the parsed root, or [`Item::Error`] when the input is beyond
//! salvage. Recoverable problems are recorded on the input instead.

pub(crate) mod css;
pub(crate) mod csv;
pub(crate) mod eml;
pub(crate) mod html;
pub(crate) mod json;
pub(crate) mod latex;
pub(crate) mod man;
pub(crate) mod mark;
pub(crate) mod math;
pub(crate) mod md;
pub(crate) mod rtf;
pub(crate) mod textile;
pub(crate) mod vcf;
pub(crate) mod wiki;
pub(crate) mod xml;

use crate::Input;
use vellum_tree::{Element, ErrorCode, Item, ParseError};

/// Arena-allocate a text item.
pub(crate) fn text<'a>(input: &Input<'a>, s: &str) -> Item<'a> {
    Item::String(input.arena.alloc_str(s))
}

pub(crate) fn element<'a>(input: &Input<'a>, tag: &str) -> &'a Element<'a> {
    Element::new_in(input.arena, input.names.intern(tag))
}

pub(crate) fn set_attr<'a>(input: &Input<'a>, el: &'a Element<'a>, name: &str, value: &str) {
    el.set_attr(
        input.names.intern(name),
        Item::String(input.arena.alloc_str(value)),
    );
}

pub(crate) fn record<'a>(
    input: &mut Input<'a>,
    code: ErrorCode,
    message: &str,
    line: u32,
    column: u32,
) {
    input
        .errors
        .push(ParseError::new(code, message, line, column));
}

/// Infer a scalar from loose text: integers, floats, booleans, else string.
pub(crate) fn scalar<'a>(input: &Input<'a>, raw: &str) -> Item<'a> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Item::Null;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Item::Int(n);
    }
    if let Ok(x) = trimmed.parse::<f64>() {
        if trimmed.chars().next().map_or(false, |c| c.is_ascii_digit() || c == '-' || c == '+')
        {
            return Item::float(x);
        }
    }
    match trimmed {
        "true" => Item::Bool(true),
        "false" => Item::Bool(false),
        _ => text(input, trimmed),
    }
}
