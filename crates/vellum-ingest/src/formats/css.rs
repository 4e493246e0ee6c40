//! CSS parser producing a `stylesheet` element: one `rule` child per rule
//! with a `selector` attribute and `decl` children, at-rules preserved with
//! their nested rules or raw body.

use super::{element, set_attr};
use crate::Input;
use vellum_tree::{Element, Item};

struct Css {
    chars: Vec<char>,
    pos: usize,
}

pub(crate) fn parse<'a>(input: &mut Input<'a>, source: &str) -> Item<'a> {
    let mut p = Css {
        chars: source.chars().collect(),
        pos: 0,
    };
    let sheet = element(input, "stylesheet");
    parse_rule_list(input, &mut p, sheet, false);
    Item::Element(sheet)
}

impl Css {
    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.bump();
            }
            if self.peek() == Some('/') && self.chars.get(self.pos + 1) == Some(&'*') {
                self.bump();
                self.bump();
                while !self.at_end() {
                    if self.bump() == Some('*') && self.peek() == Some('/') {
                        self.bump();
                        break;
                    }
                }
                continue;
            }
            return;
        }
    }

    /// Text up to any of `stops`, trimmed. Does not consume the stop.
    fn until(&mut self, stops: &[char]) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if stops.contains(&c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out.trim().to_string()
    }
}

fn parse_rule_list<'a>(input: &mut Input<'a>, p: &mut Css, parent: &'a Element<'a>, nested: bool) {
    loop {
        p.skip_trivia();
        match p.peek() {
            None => return,
            Some('}') if nested => {
                p.bump();
                return;
            }
            Some('}') => {
                // stray brace at the top level
                p.bump();
            }
            Some('@') => parse_at_rule(input, p, parent),
            _ => parse_style_rule(input, p, parent),
        }
    }
}

fn parse_style_rule<'a>(input: &mut Input<'a>, p: &mut Css, parent: &'a Element<'a>) {
    let selector = p.until(&['{', '}']);
    if p.peek() != Some('{') {
        p.bump();
        return;
    }
    p.bump(); // {
    if selector.is_empty() {
        // skip the block of a selector we failed to read
        p.until(&['}']);
        p.bump();
        return;
    }
    let rule = element(input, "rule");
    set_attr(input, rule, "selector", &selector);
    parse_declarations(input, p, rule);
    parent.add_child(Item::Element(rule));
}

fn parse_declarations<'a>(input: &mut Input<'a>, p: &mut Css, rule: &'a Element<'a>) {
    loop {
        p.skip_trivia();
        match p.peek() {
            None => return,
            Some('}') => {
                p.bump();
                return;
            }
            Some(';') => {
                p.bump();
            }
            _ => {
                let name = p.until(&[':', ';', '}']);
                if p.peek() != Some(':') {
                    continue;
                }
                p.bump();
                let value = p.until(&[';', '}']);
                if name.is_empty() {
                    continue;
                }
                let decl = element(input, "decl");
                set_attr(input, decl, "name", &name);
                set_attr(input, decl, "value", &value);
                rule.add_child(Item::Element(decl));
            }
        }
    }
}

/// `@media` and other grouping at-rules get their rules parsed; statement
/// at-rules (`@import …;`) keep their prelude only.
fn parse_at_rule<'a>(input: &mut Input<'a>, p: &mut Css, parent: &'a Element<'a>) {
    p.bump(); // @
    let mut keyword = String::new();
    while matches!(p.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '-') {
        if let Some(c) = p.bump() {
            keyword.push(c);
        }
    }
    let prelude = p.until(&['{', ';']);
    let at = element(input, "at-rule");
    set_attr(input, at, "keyword", &keyword);
    if !prelude.is_empty() {
        set_attr(input, at, "prelude", &prelude);
    }
    match p.peek() {
        Some('{') => {
            p.bump();
            if matches!(keyword.as_str(), "media" | "supports" | "layer" | "scope") {
                parse_rule_list(input, p, at, true);
            } else {
                // raw body (keyframes etc.), balanced braces
                let mut depth = 1usize;
                let mut body = String::new();
                while let Some(c) = p.bump() {
                    match c {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    if depth > 0 {
                        body.push(c);
                    }
                }
                let trimmed = body.trim();
                if !trimmed.is_empty() {
                    at.add_child(Item::String(input.arena.alloc_str(trimmed)));
                }
            }
        }
        Some(';') => {
            p.bump();
        }
        _ => {}
    }
    parent.add_child(Item::Element(at));
}

#[cfg(test)]
mod tests {
    use crate::{Format, Input};
    use pretty_assertions::assert_eq;
    use vellum_tree::{serialize_mark, Arena};

    fn parse_to_mark(source: &str) -> String {
        let arena = Arena::new();
        let input = Input::from_source_with_format(&arena, source, Format::Css);
        serialize_mark(input.root)
    }

    #[test]
    fn simple_rules() {
        assert_eq!(
            parse_to_mark("p { color: red; margin: 0 }\n/* note */ a:hover { top: 1px; }"),
            "<stylesheet; <rule selector:\"p\"; <decl name:\"color\" value:\"red\"> \
             <decl name:\"margin\" value:\"0\">> <rule selector:\"a:hover\"; \
             <decl name:\"top\" value:\"1px\">>>"
        );
    }

    #[test]
    fn media_query_nests_rules() {
        assert_eq!(
            parse_to_mark("@media (min-width: 10em) { p { x: y } }"),
            "<stylesheet; <at-rule keyword:\"media\" prelude:\"(min-width: 10em)\"; \
             <rule selector:\"p\"; <decl name:\"x\" value:\"y\">>>>"
        );
    }

    #[test]
    fn import_statement() {
        assert_eq!(
            parse_to_mark("@import url(\"x.css\");"),
            "<stylesheet; <at-rule keyword:\"import\" prelude:\"url(\\\"x.css\\\")\">>"
        );
    }

    #[test]
    fn empty_stylesheet() {
        assert_eq!(parse_to_mark("  "), "<stylesheet>");
    }
}
