//! HTML serialization of parsed trees, so documents can round-trip:
//! reparsing serialized output yields an isomorphic tree (up to the
//! whitespace normalization the parser itself performs).

use crate::tree::tag_sets::is_void;
use std::fmt::Write;
use vellum_tree::{Element, Item};

/// Raw-text elements whose content is emitted verbatim.
fn is_raw_text(name: &str) -> bool {
    matches!(name, "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" | "plaintext")
}

/// Serialize a document or subtree back to HTML text.
///
/// Pass the `#document` node from [`HtmlDocument::document`] to serialize a
/// whole document including its doctype, or any element for a fragment.
///
/// [`HtmlDocument::document`]: crate::HtmlDocument
pub fn serialize_html(root: &Element<'_>) -> String {
    let mut out = String::new();
    if root.tag() == "#document" {
        for child in root.children().iter() {
            write_node(&mut out, *child, false);
        }
    } else {
        write_node_element(&mut out, root);
    }
    out
}

fn write_node(out: &mut String, item: Item<'_>, raw: bool) {
    match item {
        Item::String(text) => {
            if raw {
                out.push_str(text);
            } else {
                escape_into(out, text, false);
            }
        }
        Item::Element(el) => write_node_element(out, el),
        _ => {}
    }
}

fn write_node_element(out: &mut String, el: &Element<'_>) {
    let tag = el.tag();
    match tag.as_str() {
        "!comment" => {
            out.push_str("<!--");
            out.push_str(&el.text_content());
            out.push_str("-->");
            return;
        }
        "!doctype" => {
            out.push_str("<!DOCTYPE");
            if let Some(name) = el.attr("name").and_then(|v| v.as_str()) {
                let _ = write!(out, " {name}");
            }
            match (
                el.attr("public").and_then(|v| v.as_str()),
                el.attr("system").and_then(|v| v.as_str()),
            ) {
                (Some(public), Some(system)) => {
                    let _ = write!(out, " PUBLIC \"{public}\" \"{system}\"");
                }
                (Some(public), None) => {
                    let _ = write!(out, " PUBLIC \"{public}\"");
                }
                (None, Some(system)) => {
                    let _ = write!(out, " SYSTEM \"{system}\"");
                }
                (None, None) => {}
            }
            out.push('>');
            return;
        }
        _ => {}
    }

    out.push('<');
    out.push_str(tag.as_str());
    for (name, value) in el.attrs() {
        out.push(' ');
        out.push_str(name.as_str());
        out.push_str("=\"");
        if let Some(text) = value.as_str() {
            escape_into(out, text, true);
        } else {
            let _ = write!(out, "{value:?}");
        }
        out.push('"');
    }
    out.push('>');

    if is_void(tag.as_str()) {
        return;
    }
    let raw = is_raw_text(tag.as_str());
    for child in el.children().iter() {
        write_node(out, *child, raw);
    }
    let _ = write!(out, "</{tag}>");
}

fn escape_into(out: &mut String, text: &str, in_attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '<' if !in_attribute => out.push_str("&lt;"),
            '>' if !in_attribute => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_html;
    use pretty_assertions::assert_eq;
    use vellum_tree::{Arena, NamePool};

    #[test]
    fn serializes_a_simple_document() {
        let arena = Arena::new();
        let names = NamePool::new(&arena);
        let doc = parse_html(
            &arena,
            &names,
            "<!DOCTYPE html><html><head></head><body><p id=\"x\">a &lt; b</p></body></html>",
        );
        assert_eq!(
            serialize_html(doc.document),
            "<!DOCTYPE html><html><head></head><body><p id=\"x\">a &lt; b</p></body></html>"
        );
    }

    #[test]
    fn reparse_is_isomorphic() {
        let arena = Arena::new();
        let names = NamePool::new(&arena);
        let source = "<!DOCTYPE html><p class=\"n\">one<br>two <b>three</b></p>";
        let first = parse_html(&arena, &names, source);
        let serialized = serialize_html(first.document);
        let second = parse_html(&arena, &names, &serialized);
        assert_eq!(serialize_html(second.document), serialized);
        assert_eq!(first.document, second.document);
    }
}
