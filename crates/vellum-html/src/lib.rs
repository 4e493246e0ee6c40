//! `vellum-html` parses HTML5 into vellum value trees.
//!
//! The crate follows the WHATWG split: a [`Tokenizer`] turns characters into
//! tokens, and the tree constructor consumes those tokens through 24
//! insertion modes to build an element tree in the caller's arena. Parsing
//! never fails — malformed markup produces a best-effort tree plus a list of
//! recorded parse errors.
//!
//! Foreign content (SVG/MathML namespaces), `<template>` content trees, and
//! script execution are out of scope; such elements are built as ordinary
//! elements.
//!
//! ## Example
//! ```rust
//! use vellum_tree::{Arena, NamePool};
//!
//! let arena = Arena::new();
//! let names = NamePool::new(&arena);
//! let doc = vellum_html::parse_html(&arena, &names, "<p>one<b>two</b></p>");
//!
//! let html = doc.root().unwrap();
//! assert_eq!(html.tag(), "html");
//! assert!(doc.errors.iter().any(|e| e.message.contains("doctype")));
//! ```

mod serialize;
mod tokenizer;
mod tree;

pub use serialize::serialize_html;
pub use tokenizer::{Attribute, Doctype, State, Tag, Token, Tokenizer};
pub use tree::{HtmlDocument, InsertionMode, QuirksMode};

use vellum_tree::{Arena, NamePool};

/// Parse an HTML document into `arena`, driving the tokenizer to EOF.
pub fn parse_html<'a>(arena: &'a Arena, names: &NamePool<'a>, source: &str) -> HtmlDocument<'a> {
    tree::parse(arena, names, source)
}
