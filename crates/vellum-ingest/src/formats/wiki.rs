//! MediaWiki markup: `== headings ==`, `'''bold'''` / `''italic''`,
//! `[[internal]]` and `[external label]` links, `*`/`#` lists, paragraphs.

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
        let line = lines[i].trim_end();
        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        // == heading ==
        if line.starts_with('=') {
            let level = line.chars().take_while(|c| *c == '=').count().min(6);
            let text = line
                .trim_start_matches('=')
                .trim_end_matches('=')
                .trim();
            let heading = element(input, &format!("h{level}"));
            parse_inline(input, heading, text);
            doc.add_child(Item::Element(heading));
            i += 1;
            continue;
        }

        // lists: consecutive lines of the same marker
        if line.starts_with('*') || line.starts_with('#') {
            let ordered = line.starts_with('#');
            let marker = if ordered { '#' } else { '*' };
            let list = element(input, if ordered { "ol" } else { "ul" });
            while i < lines.len() && lines[i].starts_with(marker) {
                let li = element(input, "li");
                parse_inline(input, li, lines[i].trim_start_matches(marker).trim());
                list.add_child(Item::Element(li));
                i += 1;
            }
            doc.add_child(Item::Element(list));
            continue;
        }

        // paragraph
        let mut text = String::new();
        while i < lines.len() {
            let l = lines[i].trim();
            if l.is_empty() || l.starts_with('=') || l.starts_with('*') || l.starts_with('#') {
                break;
            }
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(l);
            i += 1;
        }
        let p = element(input, "p");
        parse_inline(input, p, &text);
        doc.add_child(Item::Element(p));
    }
    Item::Element(doc)
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
        // ''' bold ''' and '' italic ''
        if chars[i] == '\'' {
            let quotes = chars[i..].iter().take_while(|c| **c == '\'').count();
            if quotes >= 2 {
                let (open, tag) = if quotes >= 3 { (3, "strong") } else { (2, "em") };
                if let Some(end) = find_seq(&chars, i + open, '\'', open) {
                    flush(&mut plain, parent);
                    let em = element(input, tag);
                    let body: String = chars[i + open..end].iter().collect();
                    parse_inline(input, em, &body);
                    parent.add_child(Item::Element(em));
                    i = end + open;
                    continue;
                }
            }
        }
        // [[target]] or [[target|label]]
        if chars[i] == '[' && chars.get(i + 1) == Some(&'[') {
            if let Some(end) = find_str(&chars, i + 2, "]]") {
                flush(&mut plain, parent);
                let body: String = chars[i + 2..end].iter().collect();
                let (target, label) = match body.split_once('|') {
                    Some((t, l)) => (t.to_string(), l.to_string()),
                    None => (body.clone(), body.clone()),
                };
                let link = element(input, "link");
                set_attr(input, link, "target", &target);
                link.add_child(Item::String(input.arena.alloc_str(&label)));
                parent.add_child(Item::Element(link));
                i = end + 2;
                continue;
            }
        }
        // [url label]
        if chars[i] == '[' {
            if let Some(end) = find_seq(&chars, i + 1, ']', 1) {
                let body: String = chars[i + 1..end].iter().collect();
                if body.starts_with("http://") || body.starts_with("https://") {
                    flush(&mut plain, parent);
                    let (url, label) = match body.split_once(' ') {
                        Some((u, l)) => (u.to_string(), l.to_string()),
                        None => (body.clone(), body.clone()),
                    };
                    let link = element(input, "a");
                    set_attr(input, link, "href", &url);
                    link.add_child(Item::String(input.arena.alloc_str(&label)));
                    parent.add_child(Item::Element(link));
                    i = end + 1;
                    continue;
                }
            }
        }
        plain.push(chars[i]);
        i += 1;
    }
    flush(&mut plain, parent);
}

fn find_seq(chars: &[char], from: usize, needle: char, count: usize) -> Option<usize> {
    let mut i = from;
    while i + count <= chars.len() {
        if (0..count).all(|k| chars[i + k] == needle) {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn find_str(chars: &[char], from: usize, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    let mut i = from;
    while i + needle.len() <= chars.len() {
        if needle.iter().enumerate().all(|(k, c)| chars[i + k] == *c) {
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
        let input = Input::from_source_with_format(&arena, source, Format::MediaWiki);
        serialize_mark(input.root)
    }

    #[test]
    fn headings_and_emphasis() {
        assert_eq!(
            parse_to_mark("== Title ==\n'''bold''' and ''em''\n"),
            "<doc; <h2; \"Title\"> <p; <strong; \"bold\"> \" and \" <em; \"em\">>>"
        );
    }

    #[test]
    fn internal_and_external_links() {
        assert_eq!(
            parse_to_mark("see [[Main Page|the main page]] or [https://x.org docs]\n"),
            "<doc; <p; \"see \" <link target:\"Main Page\"; \"the main page\"> \" or \" <a href:\"https://x.org\"; \"docs\">>>"
        );
    }

    #[test]
    fn lists() {
        assert_eq!(
            parse_to_mark("* a\n* b\n# one\n# two\n"),
            "<doc; <ul; <li; \"a\"> <li; \"b\">> <ol; <li; \"one\"> <li; \"two\">>>"
        );
    }
}
