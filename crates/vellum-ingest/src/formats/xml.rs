//! XML parser: elements, attributes, text, comments, CDATA. Processing
//! instructions and the prolog are skipped; the five predefined entities and
//! numeric references are decoded.

use super::{element, record};
use crate::Input;
use vellum_tree::{Element, ErrorCode, Item};

struct Xml {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

pub(crate) fn parse<'a>(input: &mut Input<'a>, source: &str) -> Item<'a> {
    let mut p = Xml {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
    };
    skip_prolog(&mut p);
    if p.at_end() {
        return Item::Null;
    }
    if p.peek() != Some('<') {
        record(input, ErrorCode::UnexpectedToken, "expected `<`", p.line, p.column);
        return Item::Error;
    }
    match parse_element(input, &mut p) {
        Some(el) => Item::Element(el),
        None => Item::Error,
    }
}

impl Xml {
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

    fn starts(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.starts(s) {
            for _ in s.chars() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn skip_until(&mut self, end: &str) {
        while !self.at_end() && !self.starts(end) {
            self.bump();
        }
        self.eat_str(end);
    }
}

/// Skip `<?xml …?>`, doctype declarations, comments, and whitespace before
/// the document element.
fn skip_prolog(p: &mut Xml) {
    loop {
        p.skip_whitespace();
        if p.starts("<?") {
            p.skip_until("?>");
        } else if p.starts("<!--") {
            p.skip_until("-->");
        } else if p.starts("<!DOCTYPE") || p.starts("<!doctype") {
            p.skip_until(">");
        } else {
            return;
        }
    }
}

fn name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

fn parse_name(p: &mut Xml) -> String {
    let mut name = String::new();
    while matches!(p.peek(), Some(c) if name_char(c)) {
        if let Some(c) = p.bump() {
            name.push(c);
        }
    }
    name
}

fn parse_element<'a>(input: &mut Input<'a>, p: &mut Xml) -> Option<&'a Element<'a>> {
    p.bump(); // <
    let tag = parse_name(p);
    if tag.is_empty() {
        record(input, ErrorCode::UnexpectedToken, "empty tag name", p.line, p.column);
        return None;
    }
    let el = element(input, &tag);

    // attributes
    loop {
        p.skip_whitespace();
        match p.peek() {
            Some('/') => {
                p.bump();
                if !p.eat('>') {
                    record(input, ErrorCode::UnexpectedToken, "expected `>`", p.line, p.column);
                    return None;
                }
                return Some(el);
            }
            Some('>') => {
                p.bump();
                break;
            }
            None => {
                record(input, ErrorCode::UnexpectedEof, "eof in tag", p.line, p.column);
                return None;
            }
            _ => {
                let name = parse_name(p);
                if name.is_empty() {
                    record(input, ErrorCode::UnexpectedToken, "expected attribute", p.line, p.column);
                    return None;
                }
                p.skip_whitespace();
                let value = if p.eat('=') {
                    p.skip_whitespace();
                    let quote = match p.peek() {
                        Some(q @ ('"' | '\'')) => {
                            p.bump();
                            q
                        }
                        _ => {
                            record(
                                input,
                                ErrorCode::UnexpectedToken,
                                "expected quoted attribute value",
                                p.line,
                                p.column,
                            );
                            return None;
                        }
                    };
                    let mut raw = String::new();
                    loop {
                        match p.bump() {
                            None => {
                                record(
                                    input,
                                    ErrorCode::UnexpectedEof,
                                    "eof in attribute value",
                                    p.line,
                                    p.column,
                                );
                                return None;
                            }
                            Some(c) if c == quote => break,
                            Some(c) => raw.push(c),
                        }
                    }
                    decode_entities(&raw)
                } else {
                    String::new()
                };
                el.set_attr(
                    input.names.intern(&name),
                    Item::String(input.arena.alloc_str(&value)),
                );
            }
        }
    }

    // content
    loop {
        if p.starts("</") {
            p.bump();
            p.bump();
            let close = parse_name(p);
            p.skip_whitespace();
            if !p.eat('>') {
                record(input, ErrorCode::UnexpectedToken, "expected `>`", p.line, p.column);
                return None;
            }
            if close != tag {
                record(input, ErrorCode::UnexpectedToken, "mismatched closing tag", p.line, p.column);
            }
            return Some(el);
        }
        if p.starts("<!--") {
            p.skip_until("-->");
            continue;
        }
        if p.starts("<![CDATA[") {
            for _ in 0.."<![CDATA[".len() {
                p.bump();
            }
            let mut text = String::new();
            while !p.at_end() && !p.starts("]]>") {
                if let Some(c) = p.bump() {
                    text.push(c);
                }
            }
            p.eat_str("]]>");
            el.add_child(Item::String(input.arena.alloc_str(&text)));
            continue;
        }
        if p.starts("<?") {
            p.skip_until("?>");
            continue;
        }
        match p.peek() {
            None => {
                record(input, ErrorCode::UnexpectedEof, "eof in element content", p.line, p.column);
                return Some(el);
            }
            Some('<') => {
                let child = parse_element(input, p)?;
                el.add_child(Item::Element(child));
            }
            _ => {
                let mut raw = String::new();
                while !matches!(p.peek(), None | Some('<')) {
                    if let Some(c) = p.bump() {
                        raw.push(c);
                    }
                }
                let text = decode_entities(&raw);
                if !text.trim().is_empty() {
                    el.add_child(Item::String(input.arena.alloc_str(&text)));
                }
            }
        }
    }
}

/// The predefined five plus decimal/hex numeric references.
fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '&' {
            out.push(c);
            continue;
        }
        let mut entity = String::new();
        let mut terminated = false;
        for e in chars.by_ref() {
            if e == ';' {
                terminated = true;
                break;
            }
            entity.push(e);
            if entity.len() > 10 {
                break;
            }
        }
        if !terminated {
            out.push('&');
            out.push_str(&entity);
            continue;
        }
        match entity.as_str() {
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "amp" => out.push('&'),
            "quot" => out.push('"'),
            "apos" => out.push('\''),
            _ => {
                let decoded = entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|h| u32::from_str_radix(h, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32);
                match decoded {
                    Some(c) => out.push(c),
                    None => {
                        out.push('&');
                        out.push_str(&entity);
                        out.push(';');
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::{Format, Input};
    use pretty_assertions::assert_eq;
    use vellum_tree::{serialize_mark, Arena};

    fn parse_to_mark(source: &str) -> String {
        let arena = Arena::new();
        let input = Input::from_source_with_format(&arena, source, Format::Xml);
        serialize_mark(input.root)
    }

    #[test]
    fn nested_elements_and_attributes() {
        assert_eq!(
            parse_to_mark(r#"<a x="1"><b>text</b><c/></a>"#),
            "<a x:\"1\"; <b; \"text\"> <c>>"
        );
    }

    #[test]
    fn prolog_comments_and_cdata() {
        assert_eq!(
            parse_to_mark("<?xml version=\"1.0\"?><!-- hi --><r><![CDATA[a<b]]></r>"),
            "<r; \"a<b\">"
        );
    }

    #[test]
    fn entity_decoding() {
        assert_eq!(
            parse_to_mark("<r a=\"&lt;&#65;\">&amp;&#x42;</r>"),
            "<r a:\"<A\"; \"&B\">"
        );
    }

    #[test]
    fn mismatched_close_is_recorded_not_fatal() {
        let arena = Arena::new();
        let input = Input::from_source_with_format(&arena, "<a><b></c></a>", Format::Xml);
        assert!(!input.root.is_error());
        assert!(!input.errors.is_empty());
    }
}
