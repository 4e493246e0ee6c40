//! JSON parser. Scalars, arrays, and objects round-trip through
//! [`vellum_tree::serialize_json`].

use super::record;
use crate::Input;
use vellum_tree::{ErrorCode, Item, List, Map};

struct Json<'s> {
    bytes: &'s [u8],
    pos: usize,
    line: u32,
    column: u32,
}

pub(crate) fn parse<'a>(input: &mut Input<'a>, source: &str) -> Item<'a> {
    let mut p = Json {
        bytes: source.as_bytes(),
        pos: 0,
        line: 1,
        column: 1,
    };
    p.skip_whitespace();
    if p.at_end() {
        return Item::Null;
    }
    let value = parse_value(input, &mut p);
    if value.is_error() {
        return Item::Error;
    }
    p.skip_whitespace();
    if !p.at_end() {
        record(
            input,
            ErrorCode::UnexpectedToken,
            "trailing characters after json value",
            p.line,
            p.column,
        );
        return Item::Error;
    }
    value
}

impl<'s> Json<'s> {
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.bytes[self.pos..].starts_with(kw.as_bytes()) {
            for _ in 0..kw.len() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.bump();
        }
    }
}

fn parse_value<'a>(input: &mut Input<'a>, p: &mut Json<'_>) -> Item<'a> {
    p.skip_whitespace();
    match p.peek() {
        None => {
            record(input, ErrorCode::UnexpectedEof, "expected value", p.line, p.column);
            Item::Error
        }
        Some(b'n') if p.eat_keyword("null") => Item::Null,
        Some(b't') if p.eat_keyword("true") => Item::Bool(true),
        Some(b'f') if p.eat_keyword("false") => Item::Bool(false),
        Some(b'"') => parse_string(input, p),
        Some(b'[') => parse_array(input, p),
        Some(b'{') => parse_object(input, p),
        Some(b'-') => parse_number(input, p),
        Some(b) if b.is_ascii_digit() => parse_number(input, p),
        Some(_) => {
            record(
                input,
                ErrorCode::UnexpectedToken,
                "unexpected character in json",
                p.line,
                p.column,
            );
            Item::Error
        }
    }
}

fn parse_array<'a>(input: &mut Input<'a>, p: &mut Json<'_>) -> Item<'a> {
    p.bump(); // [
    let list = List::new_in(input.arena);
    p.skip_whitespace();
    if p.eat(b']') {
        return Item::List(list);
    }
    loop {
        let value = parse_value(input, p);
        if value.is_error() {
            return Item::Error;
        }
        list.push(value);
        p.skip_whitespace();
        if p.eat(b',') {
            continue;
        }
        if p.eat(b']') {
            return Item::List(list);
        }
        record(input, ErrorCode::UnexpectedToken, "expected `,` or `]`", p.line, p.column);
        return Item::Error;
    }
}

fn parse_object<'a>(input: &mut Input<'a>, p: &mut Json<'_>) -> Item<'a> {
    p.bump(); // {
    let map = Map::new_in(input.arena);
    p.skip_whitespace();
    if p.eat(b'}') {
        return Item::Map(map);
    }
    loop {
        p.skip_whitespace();
        if p.peek() != Some(b'"') {
            record(input, ErrorCode::UnexpectedToken, "expected string key", p.line, p.column);
            return Item::Error;
        }
        let key = match parse_string(input, p) {
            Item::String(s) => s,
            _ => return Item::Error,
        };
        p.skip_whitespace();
        if !p.eat(b':') {
            record(input, ErrorCode::UnexpectedToken, "expected `:`", p.line, p.column);
            return Item::Error;
        }
        let value = parse_value(input, p);
        if value.is_error() {
            return Item::Error;
        }
        map.put(input.names.intern(key), value);
        p.skip_whitespace();
        if p.eat(b',') {
            continue;
        }
        if p.eat(b'}') {
            return Item::Map(map);
        }
        record(input, ErrorCode::UnexpectedToken, "expected `,` or `}`", p.line, p.column);
        return Item::Error;
    }
}

fn parse_string<'a>(input: &mut Input<'a>, p: &mut Json<'_>) -> Item<'a> {
    p.bump(); // opening quote
    input.buf.reset();
    loop {
        match p.bump() {
            None => {
                record(input, ErrorCode::UnexpectedEof, "unterminated string", p.line, p.column);
                return Item::Error;
            }
            Some(b'"') => break,
            Some(b'\\') => match p.bump() {
                Some(b'"') => input.buf.push_char('"'),
                Some(b'\\') => input.buf.push_char('\\'),
                Some(b'/') => input.buf.push_char('/'),
                Some(b'b') => input.buf.push_char('\u{8}'),
                Some(b'f') => input.buf.push_char('\u{c}'),
                Some(b'n') => input.buf.push_char('\n'),
                Some(b'r') => input.buf.push_char('\r'),
                Some(b't') => input.buf.push_char('\t'),
                Some(b'u') => match parse_unicode_escape(p) {
                    Some(c) => input.buf.push_char(c),
                    None => {
                        record(
                            input,
                            ErrorCode::UnexpectedToken,
                            "invalid \\u escape",
                            p.line,
                            p.column,
                        );
                        return Item::Error;
                    }
                },
                _ => {
                    record(input, ErrorCode::UnexpectedToken, "invalid escape", p.line, p.column);
                    return Item::Error;
                }
            },
            Some(b) if b < 0x80 => input.buf.push_char(b as char),
            Some(b) => {
                // re-decode the multi-byte sequence from the source
                let start = p.pos - 1;
                let len = utf8_len(b);
                for _ in 1..len {
                    p.bump();
                }
                let end = (start + len).min(p.bytes.len());
                if let Ok(s) = std::str::from_utf8(&p.bytes[start..end]) {
                    input.buf.push_str(s);
                } else {
                    input.buf.push_char('\u{fffd}');
                }
            }
        }
    }
    Item::String(input.buf.seal(input.arena))
}

fn utf8_len(first: u8) -> usize {
    match first {
        0xf0..=0xf7 => 4,
        0xe0..=0xef => 3,
        _ => 2,
    }
}

fn parse_unicode_escape(p: &mut Json<'_>) -> Option<char> {
    let first = parse_hex4(p)?;
    // surrogate pair
    if (0xd800..0xdc00).contains(&first) {
        if p.eat(b'\\') && p.eat(b'u') {
            let second = parse_hex4(p)?;
            if (0xdc00..0xe000).contains(&second) {
                let code = 0x10000 + ((first - 0xd800) << 10) + (second - 0xdc00);
                return char::from_u32(code);
            }
        }
        return Some('\u{fffd}');
    }
    if (0xdc00..0xe000).contains(&first) {
        return Some('\u{fffd}');
    }
    char::from_u32(first)
}

fn parse_hex4(p: &mut Json<'_>) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..4 {
        let b = p.bump()?;
        value = value * 16 + (b as char).to_digit(16)?;
    }
    Some(value)
}

fn parse_number<'a>(input: &mut Input<'a>, p: &mut Json<'_>) -> Item<'a> {
    let start = p.pos;
    p.eat(b'-');
    while matches!(p.peek(), Some(b) if b.is_ascii_digit()) {
        p.bump();
    }
    let mut is_float = false;
    if p.peek() == Some(b'.') {
        is_float = true;
        p.bump();
        while matches!(p.peek(), Some(b) if b.is_ascii_digit()) {
            p.bump();
        }
    }
    if matches!(p.peek(), Some(b'e' | b'E')) {
        is_float = true;
        p.bump();
        if matches!(p.peek(), Some(b'+' | b'-')) {
            p.bump();
        }
        while matches!(p.peek(), Some(b) if b.is_ascii_digit()) {
            p.bump();
        }
    }
    let raw = std::str::from_utf8(&p.bytes[start..p.pos]).unwrap_or("");
    if is_float {
        match raw.parse::<f64>() {
            Ok(v) => Item::float(v),
            Err(_) => Item::Error,
        }
    } else {
        match raw.parse::<i64>() {
            Ok(v) => Item::Int(v),
            // integers wider than i64 fall back to floats
            Err(_) => match raw.parse::<f64>() {
                Ok(v) => Item::float(v),
                Err(_) => Item::Error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Format, Input};
    use pretty_assertions::assert_eq;
    use vellum_tree::{serialize_json, Arena, Item, TypeTag};

    fn parse<'a>(arena: &'a Arena, source: &str) -> Input<'a> {
        Input::from_source_with_format(arena, source, Format::Json)
    }

    #[test]
    fn object_with_mixed_array() {
        let arena = Arena::new();
        let input = parse(&arena, "{\"a\":[1,true,null]}");
        let map = input.root.as_map().expect("map root");
        assert_eq!(map.len(), 1);
        let list = map.get("a").and_then(|v| v.as_list()).expect("array field");
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(0).map(|i| i.tag()), Some(TypeTag::Int));
        assert_eq!(list.get(1).map(|i| i.tag()), Some(TypeTag::Bool));
        assert_eq!(list.get(2).map(|i| i.tag()), Some(TypeTag::Null));
    }

    #[test]
    fn round_trip_identity() {
        let arena = Arena::new();
        for source in [
            "null",
            "true",
            "-42",
            "3.25",
            "\"hi\\nthere\"",
            "[]",
            "[1,2,3]",
            "{\"a\":1,\"b\":[false,null],\"c\":{\"d\":\"x\"}}",
        ] {
            let input = parse(&arena, source);
            assert_eq!(serialize_json(input.root), source, "for {source}");
        }
    }

    #[test]
    fn every_ascii_character_survives_round_trip() {
        let arena = Arena::new();
        let all_ascii: String = (0u8..0x80).map(|b| b as char).collect();
        let first = serialize_json(Item::String(arena.alloc_str(&all_ascii)));
        let parsed = parse(&arena, &first);
        let second = serialize_json(parsed.root);
        assert_eq!(first, second);
        assert_eq!(parsed.root.as_str(), Some(all_ascii.as_str()));
    }

    #[test]
    fn unicode_escapes_and_surrogates() {
        let arena = Arena::new();
        let input = parse(&arena, "\"\\u0041\\u00e9\\ud83d\\ude00\"");
        assert_eq!(input.root.as_str(), Some("Aé😀"));
    }

    #[test]
    fn empty_input_is_null() {
        let arena = Arena::new();
        let input = parse(&arena, "  ");
        assert!(input.root.is_null());
    }

    #[test]
    fn malformed_is_error_with_record() {
        let arena = Arena::new();
        let input = parse(&arena, "{\"a\": }");
        assert!(input.root.is_error());
        assert!(!input.errors.is_empty());
    }
}
