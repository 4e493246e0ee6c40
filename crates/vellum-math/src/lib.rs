//! `vellum-math` parses math expressions in three notations — LaTeX, Typst,
//! and ASCII — into vellum value trees.
//!
//! Every construct becomes an element whose tag names the operation (`add`,
//! `frac`, `pow`, `matrix`, …) with operands as children in positional order
//! and auxiliary data (matrix dimensions, arrow directions, prime counts) as
//! attributes. A malformed expression yields [`Item::Error`]; the parser
//! carries no state between invocations.
//!
//! ## Example
//! ```rust
//! use vellum_math::{parse_math, MathFlavor};
//! use vellum_tree::{Arena, NamePool};
//!
//! let arena = Arena::new();
//! let names = NamePool::new(&arena);
//! let parse = parse_math(&arena, &names, r"\frac{a+b}{c}", MathFlavor::Latex);
//!
//! let frac = parse.root.as_element().unwrap();
//! assert_eq!(frac.tag(), "frac");
//! assert_eq!(frac.content_length(), 2);
//! ```

mod commands;
mod cursor;
mod environment;
mod parser;

use parser::MathParser;
use vellum_tree::{Arena, ErrorCode, Item, NamePool, ParseError};

/// The notation accepted by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFlavor {
    Latex,
    Typst,
    Ascii,
}

impl MathFlavor {
    /// Flavor from its dispatcher name (`"latex"`, `"typst"`, `"ascii"`).
    pub fn from_name(name: &str) -> Option<MathFlavor> {
        match name {
            "latex" => Some(MathFlavor::Latex),
            "typst" => Some(MathFlavor::Typst),
            "ascii" | "asciimath" => Some(MathFlavor::Ascii),
            _ => None,
        }
    }
}

/// A finished parse: the root item (or [`Item::Error`]) and recorded errors.
pub struct MathParse<'a> {
    pub root: Item<'a>,
    pub errors: Vec<ParseError>,
}

/// Parse one math expression. The whole source must be consumed; trailing
/// garbage makes the parse an error.
pub fn parse_math<'a>(
    arena: &'a Arena,
    names: &NamePool<'a>,
    source: &str,
    flavor: MathFlavor,
) -> MathParse<'a> {
    let mut parser = MathParser::new(arena, names, source, flavor);
    parser.cursor.skip_whitespace();
    if parser.cursor.is_eof() {
        return MathParse {
            root: Item::Null,
            errors: parser.errors,
        };
    }

    let mut root = parser.parse_expression();
    parser.cursor.skip_whitespace();
    if !parser.cursor.is_eof() && !root.is_error() {
        parser.error(ErrorCode::UnexpectedToken, "trailing input after expression");
        root = Item::Error;
    }
    if root.is_null() {
        parser.error(ErrorCode::UnexpectedToken, "no expression recognized");
        root = Item::Error;
    }
    MathParse {
        root,
        errors: parser.errors,
    }
}

#[cfg(test)]
mod tests;
