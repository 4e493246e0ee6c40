//! Parser for the project's native mark serialization: a superset of JSON
//! with symbols, datetimes, binary literals, identifier-keyed maps,
//! comments, and element syntax `<tag attr:value; children>`.

use super::record;
use crate::Input;
use vellum_tree::{Element, ErrorCode, Item, List, Map};

struct Mark {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

pub(crate) fn parse<'a>(input: &mut Input<'a>, source: &str) -> Item<'a> {
    let mut p = Mark {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
    };
    p.skip_trivia();
    if p.at_end() {
        return Item::Null;
    }
    let value = parse_value(input, &mut p);
    if value.is_error() {
        return Item::Error;
    }
    p.skip_trivia();
    if !p.at_end() {
        record(
            input,
            ErrorCode::UnexpectedToken,
            "trailing characters after mark value",
            p.line,
            p.column,
        );
        return Item::Error;
    }
    value
}

impl Mark {
    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Whitespace and `//` / `/* */` comments.
    fn skip_trivia(&mut self) {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.bump();
            }
            if self.peek() == Some('/') && self.peek_at(1) == Some('/') {
                while !matches!(self.peek(), None | Some('\n')) {
                    self.bump();
                }
                continue;
            }
            if self.peek() == Some('/') && self.peek_at(1) == Some('*') {
                self.bump();
                self.bump();
                while !(self.peek() == Some('*') && self.peek_at(1) == Some('/')) {
                    if self.bump().is_none() {
                        return;
                    }
                }
                self.bump();
                self.bump();
                continue;
            }
            return;
        }
    }

    fn starts_keyword(&self, kw: &str) -> bool {
        kw.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.starts_keyword(kw) {
            for _ in kw.chars() {
                self.bump();
            }
            true
        } else {
            false
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn parse_value<'a>(input: &mut Input<'a>, p: &mut Mark) -> Item<'a> {
    p.skip_trivia();
    match p.peek() {
        None => {
            record(input, ErrorCode::UnexpectedEof, "expected value", p.line, p.column);
            Item::Error
        }
        Some('n') if p.eat_keyword("null") => Item::Null,
        Some('t') if p.peek_at(1) == Some('\'') => parse_datetime(input, p),
        Some('t') if p.eat_keyword("true") => Item::Bool(true),
        Some('f') if p.eat_keyword("false") => Item::Bool(false),
        Some('b') if p.peek_at(1) == Some('\'') => parse_binary(input, p),
        Some('"') => parse_quoted(input, p, '"').map_or(Item::Error, Item::String),
        Some('\'') => match parse_quoted(input, p, '\'') {
            Some(s) => Item::Symbol(input.names.intern(s)),
            None => Item::Error,
        },
        Some('[') => parse_list(input, p),
        Some('{') => parse_map(input, p),
        Some('<') => parse_element(input, p),
        Some('-') => parse_number(input, p),
        Some(c) if c.is_ascii_digit() => parse_number(input, p),
        Some(_) => {
            record(
                input,
                ErrorCode::UnexpectedToken,
                "unexpected character in mark",
                p.line,
                p.column,
            );
            Item::Error
        }
    }
}

fn parse_quoted<'a>(input: &mut Input<'a>, p: &mut Mark, quote: char) -> Option<&'a str> {
    p.bump(); // opening quote
    input.buf.reset();
    loop {
        match p.bump() {
            None => {
                record(input, ErrorCode::UnexpectedEof, "unterminated string", p.line, p.column);
                return None;
            }
            Some(c) if c == quote => break,
            Some('\\') => match p.bump() {
                Some('n') => input.buf.push_char('\n'),
                Some('r') => input.buf.push_char('\r'),
                Some('t') => input.buf.push_char('\t'),
                Some('b') => input.buf.push_char('\u{8}'),
                Some('f') => input.buf.push_char('\u{c}'),
                Some('u') => {
                    let mut code = 0u32;
                    let mut ok = true;
                    for _ in 0..4 {
                        match p.bump().and_then(|c| c.to_digit(16)) {
                            Some(d) => code = code * 16 + d,
                            None => {
                                ok = false;
                                break;
                            }
                        }
                    }
                    let c = if ok { char::from_u32(code) } else { None };
                    input.buf.push_char(c.unwrap_or('\u{fffd}'));
                }
                Some(c) => input.buf.push_char(c),
                None => {
                    record(input, ErrorCode::UnexpectedEof, "unterminated escape", p.line, p.column);
                    return None;
                }
            },
            Some(c) => input.buf.push_char(c),
        }
    }
    Some(input.buf.seal(input.arena))
}

fn parse_datetime<'a>(input: &mut Input<'a>, p: &mut Mark) -> Item<'a> {
    p.bump(); // t
    match parse_quoted(input, p, '\'') {
        Some(s) => Item::DateTime(s),
        None => Item::Error,
    }
}

/// `b'\xDEADBEEF'` hex binary.
fn parse_binary<'a>(input: &mut Input<'a>, p: &mut Mark) -> Item<'a> {
    p.bump(); // b
    p.bump(); // '
    let mut bytes = Vec::new();
    if p.eat('\\') && !p.eat('x') {
        record(input, ErrorCode::UnexpectedToken, "expected `\\x` in binary", p.line, p.column);
        return Item::Error;
    }
    let mut high: Option<u32> = None;
    loop {
        match p.bump() {
            None => {
                record(input, ErrorCode::UnexpectedEof, "unterminated binary", p.line, p.column);
                return Item::Error;
            }
            Some('\'') => break,
            Some(c) if c.is_whitespace() => {}
            Some(c) => match c.to_digit(16) {
                Some(digit) => match high.take() {
                    Some(h) => bytes.push((h * 16 + digit) as u8),
                    None => high = Some(digit),
                },
                None => {
                    record(input, ErrorCode::UnexpectedToken, "invalid hex digit", p.line, p.column);
                    return Item::Error;
                }
            },
        }
    }
    Item::Binary(input.arena.alloc_bytes(&bytes))
}

fn parse_number<'a>(input: &mut Input<'a>, p: &mut Mark) -> Item<'a> {
    input.buf.reset();
    if p.eat('-') {
        input.buf.push_char('-');
    }
    while matches!(p.peek(), Some(c) if c.is_ascii_digit()) {
        input.buf.push_char(p.bump().unwrap_or('0'));
    }
    let mut is_float = false;
    if p.peek() == Some('.') && matches!(p.peek_at(1), Some(c) if c.is_ascii_digit()) {
        is_float = true;
        input.buf.push_char(p.bump().unwrap_or('.'));
        while matches!(p.peek(), Some(c) if c.is_ascii_digit()) {
            input.buf.push_char(p.bump().unwrap_or('0'));
        }
    }
    if matches!(p.peek(), Some('e' | 'E')) {
        is_float = true;
        input.buf.push_char(p.bump().unwrap_or('e'));
        if matches!(p.peek(), Some('+' | '-')) {
            input.buf.push_char(p.bump().unwrap_or('+'));
        }
        while matches!(p.peek(), Some(c) if c.is_ascii_digit()) {
            input.buf.push_char(p.bump().unwrap_or('0'));
        }
    }
    let raw = input.buf.as_str();
    let item = if is_float {
        raw.parse::<f64>().map(Item::float).unwrap_or(Item::Error)
    } else {
        raw.parse::<i64>().map(Item::Int).unwrap_or(Item::Error)
    };
    input.buf.reset();
    item
}

fn parse_list<'a>(input: &mut Input<'a>, p: &mut Mark) -> Item<'a> {
    p.bump(); // [
    let list = List::new_in(input.arena);
    loop {
        p.skip_trivia();
        if p.eat(']') {
            return Item::List(list);
        }
        let value = parse_value(input, p);
        if value.is_error() {
            return Item::Error;
        }
        list.push(value);
        p.skip_trivia();
        if p.eat(',') {
            continue;
        }
        if p.eat(']') {
            return Item::List(list);
        }
        record(input, ErrorCode::UnexpectedToken, "expected `,` or `]`", p.line, p.column);
        return Item::Error;
    }
}

fn parse_key<'a>(input: &mut Input<'a>, p: &mut Mark) -> Option<&'a str> {
    match p.peek() {
        Some('"') => parse_quoted(input, p, '"'),
        Some(c) if is_ident_start(c) => {
            input.buf.reset();
            while matches!(p.peek(), Some(c) if is_ident_char(c)) {
                input.buf.push_char(p.bump()?);
            }
            Some(input.buf.seal(input.arena))
        }
        _ => None,
    }
}

fn parse_map<'a>(input: &mut Input<'a>, p: &mut Mark) -> Item<'a> {
    p.bump(); // {
    let map = Map::new_in(input.arena);
    loop {
        p.skip_trivia();
        if p.eat('}') {
            return Item::Map(map);
        }
        let Some(key) = parse_key(input, p) else {
            record(input, ErrorCode::UnexpectedToken, "expected map key", p.line, p.column);
            return Item::Error;
        };
        p.skip_trivia();
        if !p.eat(':') {
            record(input, ErrorCode::UnexpectedToken, "expected `:`", p.line, p.column);
            return Item::Error;
        }
        let value = parse_value(input, p);
        if value.is_error() {
            return Item::Error;
        }
        map.put(input.names.intern(key), value);
        p.skip_trivia();
        if p.eat(',') {
            continue;
        }
        if p.eat('}') {
            return Item::Map(map);
        }
        record(input, ErrorCode::UnexpectedToken, "expected `,` or `}`", p.line, p.column);
        return Item::Error;
    }
}

/// `<tag attr:value …; child child …>`
fn parse_element<'a>(input: &mut Input<'a>, p: &mut Mark) -> Item<'a> {
    p.bump(); // <
    p.skip_trivia();
    let Some(tag) = parse_key(input, p) else {
        record(input, ErrorCode::UnexpectedToken, "expected element tag", p.line, p.column);
        return Item::Error;
    };
    let el = Element::new_in(input.arena, input.names.intern(tag));

    // attributes until `;` or `>`
    loop {
        p.skip_trivia();
        match p.peek() {
            Some('>') => {
                p.bump();
                return Item::Element(el);
            }
            Some(';') => {
                p.bump();
                break;
            }
            None => {
                record(input, ErrorCode::UnexpectedEof, "unterminated element", p.line, p.column);
                return Item::Error;
            }
            _ => {
                let Some(name) = parse_key(input, p) else {
                    record(
                        input,
                        ErrorCode::UnexpectedToken,
                        "expected attribute name",
                        p.line,
                        p.column,
                    );
                    return Item::Error;
                };
                p.skip_trivia();
                if !p.eat(':') {
                    record(input, ErrorCode::UnexpectedToken, "expected `:`", p.line, p.column);
                    return Item::Error;
                }
                let value = parse_value(input, p);
                if value.is_error() {
                    return Item::Error;
                }
                el.set_attr(input.names.intern(name), value);
            }
        }
    }

    // children until `>`
    loop {
        p.skip_trivia();
        match p.peek() {
            Some('>') => {
                p.bump();
                return Item::Element(el);
            }
            None => {
                record(input, ErrorCode::UnexpectedEof, "unterminated element", p.line, p.column);
                return Item::Error;
            }
            _ => {
                let child = parse_value(input, p);
                if child.is_error() {
                    return Item::Error;
                }
                el.add_child(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Format, Input};
    use pretty_assertions::assert_eq;
    use vellum_tree::{serialize_mark, Arena, TypeTag};

    fn round_trip(source: &str) {
        let arena = Arena::new();
        let input = Input::from_source_with_format(&arena, source, Format::Mark);
        assert!(!input.root.is_error(), "parse failed for {source}: {:?}", input.errors);
        assert_eq!(serialize_mark(input.root), source);
    }

    #[test]
    fn scalar_round_trips() {
        round_trip("null");
        round_trip("true");
        round_trip("-17");
        round_trip("2.5");
        round_trip("\"text\"");
        round_trip("'sym'");
        round_trip("t'2024-11-05T12:30:00Z'");
        round_trip("b'\\x00ff10'");
    }

    #[test]
    fn container_round_trips() {
        round_trip("[1, 2, 3]");
        round_trip("{a: 1, b-2: \"x\"}");
        round_trip("<note id:7; \"hi\" 'tail'>");
        round_trip("<doc; <p; \"one\"> <p; \"two\">>");
        round_trip("<empty>");
    }

    #[test]
    fn comments_are_trivia() {
        let arena = Arena::new();
        let input = Input::from_source_with_format(
            &arena,
            "// leading\n{a: /* inline */ 1}",
            Format::Mark,
        );
        assert_eq!(serialize_mark(input.root), "{a: 1}");
    }

    #[test]
    fn datetime_and_binary_tags() {
        let arena = Arena::new();
        let input = Input::from_source_with_format(&arena, "[t'2020-01-01', b'\\xa1b2']", Format::Mark);
        let list = input.root.as_list().unwrap();
        assert_eq!(list.get(0).map(|i| i.tag()), Some(TypeTag::DateTime));
        assert_eq!(list.get(1).map(|i| i.tag()), Some(TypeTag::Binary));
    }

    #[test]
    fn empty_input_is_null() {
        let arena = Arena::new();
        let input = Input::from_source_with_format(&arena, " // nothing\n", Format::Mark);
        assert!(input.root.is_null());
    }
}
