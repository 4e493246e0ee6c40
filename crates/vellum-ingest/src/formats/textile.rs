//! Textile markup: `h1.` headings, `bq.` blockquotes, `*`/`#` lists,
//! `*strong*` / `_emphasis_` / `@code@` inlines, paragraphs.

use super::element;
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
        let line = lines[i].trim_end();
        let trimmed = line.trim();
        if trimmed.is_empty() {
            i += 1;
            continue;
        }

        // h1. … h6. block signatures
        if let Some(heading) = heading_level(trimmed) {
            let text = trimmed[3..].trim_start_matches('.').trim();
            let h = element(input, &format!("h{heading}"));
            parse_inline(input, h, text);
            doc.add_child(Item::Element(h));
            i += 1;
            continue;
        }

        // bq. blockquote
        if let Some(rest) = trimmed.strip_prefix("bq.") {
            let quote = element(input, "blockquote");
            let p = element(input, "p");
            parse_inline(input, p, rest.trim());
            quote.add_child(Item::Element(p));
            doc.add_child(Item::Element(quote));
            i += 1;
            continue;
        }

        // lists
        if trimmed.starts_with("* ") || trimmed.starts_with("# ") {
            let ordered = trimmed.starts_with('#');
            let marker = if ordered { "# " } else { "* " };
            let list = element(input, if ordered { "ol" } else { "ul" });
            while i < lines.len() {
                let t = lines[i].trim();
                let Some(rest) = t.strip_prefix(marker) else { break };
                let li = element(input, "li");
                parse_inline(input, li, rest.trim());
                list.add_child(Item::Element(li));
                i += 1;
            }
            doc.add_child(Item::Element(list));
            continue;
        }

        // paragraph, optionally introduced by `p.`
        let mut text = String::new();
        while i < lines.len() {
            let t = lines[i].trim();
            if t.is_empty()
                || heading_level(t).is_some()
                || t.starts_with("bq.")
                || t.starts_with("* ")
                || t.starts_with("# ")
            {
                break;
            }
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(t.strip_prefix("p.").map(str::trim).unwrap_or(t));
            i += 1;
        }
        let p = element(input, "p");
        parse_inline(input, p, &text);
        doc.add_child(Item::Element(p));
    }
    Item::Element(doc)
}

fn heading_level(line: &str) -> Option<u32> {
    let mut chars = line.chars();
    if chars.next() != Some('h') {
        return None;
    }
    let level = chars.next()?.to_digit(10)?;
    if (1..=6).contains(&level) && chars.next() == Some('.') {
        Some(level)
    } else {
        None
    }
}

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
        let tag = match c {
            '*' => Some("strong"),
            '_' => Some("em"),
            '@' => Some("code"),
            _ => None,
        };
        if let Some(tag) = tag {
            // a closing marker must exist and the span must be non-empty
            if let Some(end) = (i + 2..chars.len()).find(|&j| chars[j] == c) {
                flush(&mut plain, parent);
                let span = element(input, tag);
                let body: String = chars[i + 1..end].iter().collect();
                if tag == "code" {
                    span.add_child(Item::String(input.arena.alloc_str(&body)));
                } else {
                    parse_inline(input, span, &body);
                }
                parent.add_child(Item::Element(span));
                i = end + 1;
                continue;
            }
        }
        plain.push(c);
        i += 1;
    }
    flush(&mut plain, parent);
}

#[cfg(test)]
mod tests {
    use crate::{Format, Input};
    use pretty_assertions::assert_eq;
    use vellum_tree::{serialize_mark, Arena};

    fn parse_to_mark(source: &str) -> String {
        let arena = Arena::new();
        let input = Input::from_source_with_format(&arena, source, Format::Textile);
        serialize_mark(input.root)
    }

    #[test]
    fn headings_and_paragraphs() {
        assert_eq!(
            parse_to_mark("h1. Top\n\np. A *bold* word.\n"),
            "<doc; <h1; \"Top\"> <p; \"A \" <strong; \"bold\"> \" word.\">>"
        );
    }

    #[test]
    fn blockquote_and_lists() {
        assert_eq!(
            parse_to_mark("bq. quoted\n\n* a\n* b\n"),
            "<doc; <blockquote; <p; \"quoted\">> <ul; <li; \"a\"> <li; \"b\">>>"
        );
    }

    #[test]
    fn code_spans_stay_literal() {
        assert_eq!(
            parse_to_mark("use @x_y@ here\n"),
            "<doc; <p; \"use \" <code; \"x_y\"> \" here\">>"
        );
    }
}
