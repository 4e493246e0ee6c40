//! RFC-822 email parser: headers (with continuation lines) become
//! attributes of an `email` element; MIME multipart bodies split into
//! `part` children, anything else becomes a text body child.

use super::{element, set_attr};
use crate::Input;
use vellum_tree::{Element, Item};

pub(crate) fn parse<'a>(input: &mut Input<'a>, source: &str) -> Item<'a> {
    if source.trim().is_empty() {
        return Item::Null;
    }
    let el = parse_message(input, source, "email");
    Item::Element(el)
}

fn parse_message<'a>(input: &mut Input<'a>, source: &str, tag: &str) -> &'a Element<'a> {
    let el = element(input, tag);
    let (headers, body) = split_headers(source);

    let mut content_type = String::new();
    for (name, value) in &headers {
        if name == "content-type" {
            content_type = value.clone();
        }
        set_attr(input, el, name, value);
    }

    if let Some(boundary) = boundary_of(&content_type) {
        for part in split_multipart(body, &boundary) {
            let part_el = parse_message(input, part, "part");
            el.add_child(Item::Element(part_el));
        }
    } else {
        let trimmed = body.trim_end();
        if !trimmed.is_empty() {
            el.add_child(Item::String(input.arena.alloc_str(trimmed)));
        }
    }
    el
}

/// Headers end at the first empty line. Continuation lines start with
/// whitespace and extend the previous header's value.
fn split_headers(source: &str) -> (Vec<(String, String)>, &str) {
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut rest = source;

    while let Some(newline) = rest.find('\n') {
        let line = rest[..newline].trim_end_matches('\r');
        if line.is_empty() {
            rest = &rest[newline + 1..];
            return (headers, rest);
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = headers.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
        } else if let Some(colon) = line.find(':') {
            let name = line[..colon].trim().to_ascii_lowercase();
            let value = line[colon + 1..].trim().to_string();
            headers.push((name, value));
        }
        rest = &rest[newline + 1..];
    }
    (headers, "")
}

fn boundary_of(content_type: &str) -> Option<String> {
    if !content_type.to_ascii_lowercase().starts_with("multipart/") {
        return None;
    }
    for param in content_type.split(';').skip(1) {
        let param = param.trim();
        if let Some(value) = param.strip_prefix("boundary=") {
            return Some(value.trim_matches('"').to_string());
        }
    }
    None
}

fn split_multipart<'s>(body: &'s str, boundary: &str) -> Vec<&'s str> {
    let delimiter = format!("--{boundary}");
    let mut parts = Vec::new();
    let mut current_start: Option<usize> = None;
    let mut offset = 0;

    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == delimiter || trimmed == format!("{delimiter}--") {
            if let Some(start) = current_start.take() {
                parts.push(&body[start..offset]);
            }
            if trimmed == delimiter {
                current_start = Some(offset + line.len());
            }
        }
        offset += line.len();
    }
    if let Some(start) = current_start {
        parts.push(&body[start..]);
    }
    parts
}

#[cfg(test)]
mod tests {
    use crate::{Format, Input};
    use pretty_assertions::assert_eq;
    use vellum_tree::{Arena, Item};

    #[test]
    fn headers_and_body() {
        let arena = Arena::new();
        let source = "From: ada@example.com\r\nTo: grace@example.com\r\nSubject: hello\r\n  again\r\n\r\nBody text.\r\n";
        let input = Input::from_source_with_format(&arena, source, Format::Eml);
        let email = input.root.as_element().unwrap();
        assert_eq!(email.attr("from"), Some(Item::String("ada@example.com")));
        assert_eq!(email.attr("subject"), Some(Item::String("hello again")));
        assert_eq!(email.text_content(), "Body text.");
    }

    #[test]
    fn multipart_splits_into_parts() {
        let arena = Arena::new();
        let source = concat!(
            "Content-Type: multipart/alternative; boundary=\"XYZ\"\n",
            "\n",
            "--XYZ\n",
            "Content-Type: text/plain\n",
            "\n",
            "plain body\n",
            "--XYZ\n",
            "Content-Type: text/html\n",
            "\n",
            "<b>html</b>\n",
            "--XYZ--\n",
        );
        let input = Input::from_source_with_format(&arena, source, Format::Eml);
        let email = input.root.as_element().unwrap();
        let parts = email.child_elements();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].attr("content-type"), Some(Item::String("text/plain")));
        assert_eq!(parts[0].text_content(), "plain body");
        assert_eq!(parts[1].attr("content-type"), Some(Item::String("text/html")));
    }

    #[test]
    fn empty_input_is_null() {
        let arena = Arena::new();
        let input = Input::from_source_with_format(&arena, "\n", Format::Eml);
        assert!(input.root.is_null());
    }
}
