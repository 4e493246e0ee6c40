//! LaTeX environment parsers: the matrix family, `cases`, and the
//! equation/align/gather display environments.

use crate::parser::MathParser;
use vellum_tree::{Element, ErrorCode, Item};

/// How a row-structured body ends: a closing brace (`\matrix{…}` shorthand)
/// or a matching `\end{name}`.
enum Terminator {
    Brace,
    End(String),
}

impl Terminator {
    fn try_consume(&self, p: &mut MathParser<'_, '_, '_>) -> bool {
        match self {
            Terminator::Brace => p.cursor.eat('}'),
            Terminator::End(name) => {
                if p.cursor.starts_with("\\end{") {
                    // only consume a matching \end; a mismatched one is the
                    // caller's malformed-environment error
                    let full = format!("\\end{{{name}}}");
                    return p.cursor.eat_str(&full);
                }
                false
            }
        }
    }
}

/// Dispatch `\begin{name} … \end{name}`, cursor on the backslash.
pub(crate) fn parse_environment<'a>(p: &mut MathParser<'a, '_, '_>) -> Item<'a> {
    p.cursor.eat_str("\\begin{");
    let mut name = String::new();
    p.cursor.take_while(|c| c != '}', &mut name);
    if !p.cursor.eat('}') {
        p.error(ErrorCode::MalformedEnvironment, "unterminated `\\begin`");
        return Item::Error;
    }

    let terminator = Terminator::End(name.clone());
    let base = name.trim_end_matches('*');
    let numbered = !name.ends_with('*');
    match base {
        "matrix" | "pmatrix" | "bmatrix" | "vmatrix" | "Vmatrix" | "smallmatrix" => {
            parse_matrix(p, base, terminator)
        }
        "cases" => parse_cases(p, terminator),
        "equation" => parse_display(p, "equation", terminator, numbered, "center"),
        "align" => parse_display(p, "align", terminator, numbered, "columns"),
        "aligned" => parse_display(p, "aligned", terminator, false, "columns"),
        "gather" => parse_display(p, "gather", terminator, numbered, "center"),
        _ => {
            tracing::warn!(environment = %name, "unknown latex environment");
            parse_display(p, base, terminator, false, "center")
        }
    }
}

/// `\matrix{1 & 2 \\ 3 & 4}` shorthand.
pub(crate) fn parse_braced_matrix<'a>(p: &mut MathParser<'a, '_, '_>, kind: &str) -> Item<'a> {
    p.cursor.skip_whitespace();
    if !p.cursor.eat('{') {
        p.error(ErrorCode::MalformedEnvironment, "expected `{` after matrix");
        return Item::Error;
    }
    parse_matrix(p, kind, Terminator::Brace)
}

pub(crate) fn parse_braced_cases<'a>(p: &mut MathParser<'a, '_, '_>) -> Item<'a> {
    p.cursor.skip_whitespace();
    if !p.cursor.eat('{') {
        p.error(ErrorCode::MalformedEnvironment, "expected `{` after cases");
        return Item::Error;
    }
    parse_cases(p, Terminator::Brace)
}

/// Rows separated by `\\`, cells by `&`.
fn parse_rows<'a>(
    p: &mut MathParser<'a, '_, '_>,
    terminator: Terminator,
) -> Option<Vec<&'a Element<'a>>> {
    let mut rows = Vec::new();
    let mut row = p.element("row");
    let mut row_has_cells = false;

    loop {
        p.cursor.skip_whitespace();
        if terminator.try_consume(p) {
            break;
        }
        if p.cursor.is_eof() {
            p.error(ErrorCode::MalformedEnvironment, "unterminated environment");
            return None;
        }
        if p.cursor.eat_str("\\\\") {
            rows.push(row);
            row = p.element("row");
            row_has_cells = false;
            continue;
        }
        if p.cursor.eat('&') {
            continue;
        }
        // an alignment cell may start at a relation (`&= b`); keep the
        // operator as the cell's element with the right-hand side as child
        if let Some(op) = leading_relation(p) {
            p.cursor.skip_whitespace();
            let rhs = p.parse_expression();
            if rhs.is_error() {
                return None;
            }
            let rel = p.element(op);
            if !rhs.is_null() {
                rel.add_child(rhs);
            }
            row.add_child(Item::Element(rel));
            row_has_cells = true;
            continue;
        }
        let cell = p.parse_expression();
        if cell.is_error() {
            return None;
        }
        if cell.is_null() {
            // nothing parseable before the next separator; avoid spinning
            p.error(ErrorCode::MalformedEnvironment, "unexpected content in environment");
            return None;
        }
        row.add_child(cell);
        row_has_cells = true;
    }

    if row_has_cells || row.content_length() > 0 {
        rows.push(row);
    }
    Some(rows)
}

fn leading_relation(p: &mut MathParser<'_, '_, '_>) -> Option<&'static str> {
    if p.cursor.eat_str("<=") {
        Some("leq")
    } else if p.cursor.eat_str(">=") {
        Some("geq")
    } else if p.cursor.eat('=') {
        Some("eq")
    } else if p.cursor.eat('<') {
        Some("lt")
    } else if p.cursor.eat('>') {
        Some("gt")
    } else {
        None
    }
}

fn parse_matrix<'a>(
    p: &mut MathParser<'a, '_, '_>,
    kind: &str,
    terminator: Terminator,
) -> Item<'a> {
    let Some(rows) = parse_rows(p, terminator) else {
        return Item::Error;
    };
    let cols = rows.first().map(|r| r.content_length()).unwrap_or(0);
    for (i, row) in rows.iter().enumerate() {
        if row.content_length() != cols {
            tracing::warn!(
                row = i + 1,
                expected = cols,
                found = row.content_length(),
                "inconsistent column count in matrix"
            );
        }
    }

    let el = p.element(kind);
    el.set_attr(p.intern("rows"), Item::Int(rows.len() as i64));
    el.set_attr(p.intern("cols"), Item::Int(cols as i64));
    for row in rows {
        el.add_child(Item::Element(row));
    }
    Item::Element(el)
}

/// `cases`: each row is `expr & condition`.
fn parse_cases<'a>(p: &mut MathParser<'a, '_, '_>, terminator: Terminator) -> Item<'a> {
    let Some(rows) = parse_rows(p, terminator) else {
        return Item::Error;
    };
    let el = p.element("cases");
    el.set_attr(p.intern("rows"), Item::Int(rows.len() as i64));
    for row in rows {
        el.add_child(Item::Element(row));
    }
    Item::Element(el)
}

/// The equation/align/gather display family: one or more rows; `align`-style
/// rows keep their `&`-split halves as separate row children.
fn parse_display<'a>(
    p: &mut MathParser<'a, '_, '_>,
    tag: &str,
    terminator: Terminator,
    numbered: bool,
    alignment: &str,
) -> Item<'a> {
    let Some(rows) = parse_rows(p, terminator) else {
        return Item::Error;
    };
    let el = p.element(tag);
    el.set_attr(p.intern("numbered"), Item::Bool(numbered));
    el.set_attr(p.intern("alignment"), p.symbol(alignment));
    for row in rows {
        el.add_child(Item::Element(row));
    }
    Item::Element(el)
}
