//! Markdown parser: ATX headings, fenced code blocks, blockquotes, lists,
//! thematic breaks, and paragraphs, with inline emphasis, code spans, and
//! links.

use super::{element, set_attr};
use crate::Input;
use vellum_tree::{Element, Item};

pub(crate) fn parse<'a>(input: &mut Input<'a>, source: &str) -> Item<'a> {
    if source.trim().is_empty() {
        return Item::Null;
    }
    let doc = element(input, "doc");
    let lines: Vec<&str> = source.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            i += 1;
            continue;
        }

        // fenced code block
        if let Some(fence_info) = trimmed.strip_prefix("```") {
            let mut body = String::new();
            i += 1;
            while i < lines.len() && !lines[i].trim_start().starts_with("```") {
                body.push_str(lines[i]);
                body.push('\n');
                i += 1;
            }
            i += 1; // closing fence
            let pre = element(input, "pre");
            if !fence_info.trim().is_empty() {
                set_attr(input, pre, "lang", fence_info.trim());
            }
            pre.add_child(Item::String(input.arena.alloc_str(&body)));
            doc.add_child(Item::Element(pre));
            continue;
        }

        // ATX heading
        if trimmed.starts_with('#') {
            let level = trimmed.chars().take_while(|c| *c == '#').count();
            if level <= 6 && trimmed.chars().nth(level).map_or(true, |c| c == ' ') {
                let text = trimmed[level..].trim().trim_end_matches('#').trim_end();
                let heading = element(input, &format!("h{level}"));
                parse_inline(input, heading, text);
                doc.add_child(Item::Element(heading));
                i += 1;
                continue;
            }
        }

        // thematic break
        if is_thematic_break(trimmed) {
            doc.add_child(Item::Element(element(input, "hr")));
            i += 1;
            continue;
        }

        // blockquote: collect consecutive `>` lines into a nested parse
        if trimmed.starts_with('>') {
            let mut inner = String::new();
            while i < lines.len() {
                let t = lines[i].trim_start();
                if let Some(rest) = t.strip_prefix('>') {
                    inner.push_str(rest.strip_prefix(' ').unwrap_or(rest));
                    inner.push('\n');
                    i += 1;
                } else {
                    break;
                }
            }
            let quote = element(input, "blockquote");
            let nested = parse(input, &inner);
            if let Some(nested_doc) = nested.as_element() {
                nested_doc.move_children_to(quote);
            }
            doc.add_child(Item::Element(quote));
            continue;
        }

        // lists
        if let Some(marker) = list_marker(trimmed) {
            let list = element(input, if marker.ordered { "ol" } else { "ul" });
            while i < lines.len() {
                let t = lines[i].trim_start();
                let Some(m) = list_marker(t) else { break };
                if m.ordered != marker.ordered {
                    break;
                }
                let li = element(input, "li");
                parse_inline(input, li, &t[m.content_offset..]);
                list.add_child(Item::Element(li));
                i += 1;
            }
            doc.add_child(Item::Element(list));
            continue;
        }

        // paragraph: run of plain lines
        let mut text = String::new();
        while i < lines.len() {
            let t = lines[i].trim_start();
            if t.is_empty()
                || t.starts_with('#')
                || t.starts_with("```")
                || t.starts_with('>')
                || list_marker(t).is_some()
                || is_thematic_break(t)
            {
                break;
            }
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(lines[i].trim());
            i += 1;
        }
        if text.is_empty() {
            // a line that resembles a block start but matched no block rule
            // (e.g. `#x`); consume it as plain text to guarantee progress
            text.push_str(lines[i].trim());
            i += 1;
        }
        let p = element(input, "p");
        parse_inline(input, p, &text);
        doc.add_child(Item::Element(p));
    }

    Item::Element(doc)
}

fn is_thematic_break(line: &str) -> bool {
    let no_space: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    no_space.len() >= 3
        && (no_space.chars().all(|c| c == '-')
            || no_space.chars().all(|c| c == '*')
            || no_space.chars().all(|c| c == '_'))
}

struct Marker {
    ordered: bool,
    content_offset: usize,
}

fn list_marker(line: &str) -> Option<Marker> {
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        let _ = rest;
        return Some(Marker {
            ordered: false,
            content_offset: 2,
        });
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if rest.starts_with(". ") || rest.starts_with(") ") {
            return Some(Marker {
                ordered: true,
                content_offset: digits + 2,
            });
        }
    }
    None
}

/// Inline syntax: `code`, **strong**, *em*, [text](url).
fn parse_inline<'a>(input: &Input<'a>, parent: &'a Element<'a>, text: &str) {
    let chars: Vec<char> = text.chars().collect();
    let mut plain = String::new();
    let mut i = 0;

    let flush = |plain: &mut String, parent: &'a Element<'a>| {
        if !plain.is_empty() {
            parent.add_child(Item::String(input.arena.alloc_str(plain)));
            plain.clear();
        }
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            '`' => {
                if let Some(end) = find(&chars, i + 1, &['`']) {
                    flush(&mut plain, parent);
                    let code = element(input, "code");
                    let body: String = chars[i + 1..end].iter().collect();
                    code.add_child(Item::String(input.arena.alloc_str(&body)));
                    parent.add_child(Item::Element(code));
                    i = end + 1;
                } else {
                    plain.push(c);
                    i += 1;
                }
            }
            '*' => {
                let strong = i + 1 < chars.len() && chars[i + 1] == '*';
                let (open_len, tag) = if strong { (2, "strong") } else { (1, "em") };
                if let Some(end) = find_run(&chars, i + open_len, '*', open_len) {
                    flush(&mut plain, parent);
                    let em = element(input, tag);
                    let body: String = chars[i + open_len..end].iter().collect();
                    parse_inline(input, em, &body);
                    parent.add_child(Item::Element(em));
                    i = end + open_len;
                } else {
                    plain.push(c);
                    i += 1;
                }
            }
            '[' => {
                // [text](url)
                if let Some(close) = find(&chars, i + 1, &[']']) {
                    if chars.get(close + 1) == Some(&'(') {
                        if let Some(end) = find(&chars, close + 2, &[')']) {
                            flush(&mut plain, parent);
                            let a = element(input, "a");
                            let url: String = chars[close + 2..end].iter().collect();
                            set_attr(input, a, "href", &url);
                            let label: String = chars[i + 1..close].iter().collect();
                            parse_inline(input, a, &label);
                            parent.add_child(Item::Element(a));
                            i = end + 1;
                            continue;
                        }
                    }
                }
                plain.push(c);
                i += 1;
            }
            '\\' if i + 1 < chars.len() => {
                plain.push(chars[i + 1]);
                i += 2;
            }
            c => {
                plain.push(c);
                i += 1;
            }
        }
    }
    flush(&mut plain, parent);
}

fn find(chars: &[char], from: usize, stops: &[char]) -> Option<usize> {
    (from..chars.len()).find(|&i| stops.contains(&chars[i]))
}

/// Find a run of `needle` repeated `count` times at or after `from`.
fn find_run(chars: &[char], from: usize, needle: char, count: usize) -> Option<usize> {
    let mut i = from;
    while i + count <= chars.len() {
        if (0..count).all(|k| chars[i + k] == needle) {
            return Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::{Format, Input};
    use pretty_assertions::assert_eq;
    use vellum_tree::{serialize_mark, Arena};

    fn parse_to_mark(source: &str) -> String {
        let arena = Arena::new();
        let input = Input::from_source_with_format(&arena, source, Format::Markdown);
        serialize_mark(input.root)
    }

    #[test]
    fn headings_and_paragraphs() {
        assert_eq!(
            parse_to_mark("# Title\n\nbody text\nspans lines\n"),
            "<doc; <h1; \"Title\"> <p; \"body text spans lines\">>"
        );
    }

    #[test]
    fn inline_emphasis_code_and_links() {
        assert_eq!(
            parse_to_mark("a **b** *c* `d` [e](f)"),
            "<doc; <p; \"a \" <strong; \"b\"> \" \" <em; \"c\"> \" \" <code; \"d\"> \" \" <a href:\"f\"; \"e\">>>"
        );
    }

    #[test]
    fn fenced_code_block() {
        assert_eq!(
            parse_to_mark("```rust\nfn x() {}\n```\n"),
            "<doc; <pre lang:\"rust\"; \"fn x() {}\\n\">>"
        );
    }

    #[test]
    fn lists_ordered_and_unordered() {
        assert_eq!(
            parse_to_mark("- a\n- b\n\n1. x\n2. y\n"),
            "<doc; <ul; <li; \"a\"> <li; \"b\">> <ol; <li; \"x\"> <li; \"y\">>>"
        );
    }

    #[test]
    fn blockquote_nests_blocks() {
        assert_eq!(
            parse_to_mark("> quoted\n> more\n"),
            "<doc; <blockquote; <p; \"quoted more\">>>"
        );
    }

    #[test]
    fn thematic_break() {
        assert_eq!(parse_to_mark("a\n\n---\n\nb\n"), "<doc; <p; \"a\"> <hr> <p; \"b\">>");
    }
}
