//! Serializers for the two round-trippable text forms of the value tree:
//! the project's native mark format and plain JSON.

use crate::Item;
use std::fmt::Write;

/// Serialize an item to mark text.
///
/// Mark is a superset of JSON: symbols are `'quoted'`, datetimes `t'…'`,
/// binary `b'\x…'`, map keys are bare identifiers where possible, and
/// elements read `<tag attr:value; child child>`.
pub fn serialize_mark(item: Item<'_>) -> String {
    let mut out = String::new();
    write_mark(&mut out, item);
    out
}

fn write_mark(out: &mut String, item: Item<'_>) {
    match item {
        Item::Null => out.push_str("null"),
        Item::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        Item::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Item::Float(x) => {
            let _ = write!(out, "{:?}", x.into_inner());
        }
        Item::String(s) => write_quoted(out, s, '"'),
        Item::Symbol(name) => write_quoted(out, name.as_str(), '\''),
        Item::DateTime(s) => {
            out.push('t');
            write_quoted(out, s, '\'');
        }
        Item::Binary(bytes) => {
            out.push_str("b'\\x");
            for byte in bytes {
                let _ = write!(out, "{byte:02x}");
            }
            out.push('\'');
        }
        Item::List(list) => {
            out.push('[');
            for (i, child) in list.items().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_mark(out, *child);
            }
            out.push(']');
        }
        Item::Map(map) => {
            out.push('{');
            for (i, (name, value)) in map.entries().into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_key(out, name.as_str());
                out.push_str(": ");
                write_mark(out, value);
            }
            out.push('}');
        }
        Item::Element(el) => {
            out.push('<');
            out.push_str(el.tag().as_str());
            for (name, value) in el.attrs() {
                out.push(' ');
                out.push_str(name.as_str());
                out.push(':');
                write_mark(out, value);
            }
            let children = el.children();
            if !children.is_empty() {
                out.push(';');
                for child in children.iter() {
                    out.push(' ');
                    write_mark(out, *child);
                }
            }
            out.push('>');
        }
        Item::Type(ty) => {
            let _ = write!(out, "{ty}");
        }
        Item::Error => out.push_str("error"),
    }
}

/// Serialize an item to JSON text.
///
/// Mark-only values degrade: symbols and datetimes become strings, binary
/// becomes a hex string, elements become `{"tag", "attrs", "children"}`
/// objects.
pub fn serialize_json(item: Item<'_>) -> String {
    let mut out = String::new();
    write_json(&mut out, item);
    out
}

fn write_json(out: &mut String, item: Item<'_>) {
    match item {
        Item::Null | Item::Error => out.push_str("null"),
        Item::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        Item::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Item::Float(x) => {
            let value = x.into_inner();
            if value.is_finite() {
                let _ = write!(out, "{value:?}");
            } else {
                out.push_str("null");
            }
        }
        Item::String(s) => write_quoted(out, s, '"'),
        Item::Symbol(name) => write_quoted(out, name.as_str(), '"'),
        Item::DateTime(s) => write_quoted(out, s, '"'),
        Item::Binary(bytes) => {
            out.push('"');
            for byte in bytes {
                let _ = write!(out, "{byte:02x}");
            }
            out.push('"');
        }
        Item::List(list) => {
            out.push('[');
            for (i, child) in list.items().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json(out, *child);
            }
            out.push(']');
        }
        Item::Map(map) => {
            out.push('{');
            for (i, (name, value)) in map.entries().into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_quoted(out, name.as_str(), '"');
                out.push(':');
                write_json(out, value);
            }
            out.push('}');
        }
        Item::Element(el) => {
            out.push_str("{\"tag\":");
            write_quoted(out, el.tag().as_str(), '"');
            out.push_str(",\"attrs\":{");
            for (i, (name, value)) in el.attrs().into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_quoted(out, name.as_str(), '"');
                out.push(':');
                write_json(out, value);
            }
            out.push_str("},\"children\":[");
            for (i, child) in el.children().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json(out, *child);
            }
            out.push_str("]}");
        }
        Item::Type(ty) => {
            let rendered = ty.to_string();
            write_quoted(out, &rendered, '"');
        }
    }
}

fn write_key(out: &mut String, key: &str) {
    let bare = !key.is_empty()
        && key
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false)
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        out.push_str(key);
    } else {
        write_quoted(out, key, '"');
    }
}

fn write_quoted(out: &mut String, s: &str, quote: char) {
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arena, Element, List, Map, NamePool};
    use pretty_assertions::assert_eq;

    #[test]
    fn scalars() {
        assert_eq!(serialize_json(Item::Null), "null");
        assert_eq!(serialize_json(Item::Bool(true)), "true");
        assert_eq!(serialize_json(Item::Int(-3)), "-3");
        assert_eq!(serialize_json(Item::float(1.5)), "1.5");
        assert_eq!(serialize_json(Item::String("a\"b\n")), "\"a\\\"b\\n\"");
    }

    #[test]
    fn containers() {
        let arena = Arena::new();
        let names = NamePool::new(&arena);

        let list = List::new_in(&arena);
        list.push(Item::Int(1));
        list.push(Item::Bool(true));
        list.push(Item::Null);

        let map = Map::new_in(&arena);
        map.put(names.intern("a"), Item::List(list));

        assert_eq!(serialize_json(Item::Map(map)), "{\"a\":[1,true,null]}");
        assert_eq!(serialize_mark(Item::Map(map)), "{a: [1, true, null]}");
    }

    #[test]
    fn mark_element_form() {
        let arena = Arena::new();
        let names = NamePool::new(&arena);

        let el = Element::new_in(&arena, names.intern("note"));
        el.set_attr(names.intern("id"), Item::Int(7));
        el.add_child(Item::String(arena.alloc_str("hi")));
        el.add_child(Item::Symbol(names.intern("tail")));

        assert_eq!(serialize_mark(Item::Element(el)), "<note id:7; \"hi\" 'tail'>");
    }

    #[test]
    fn control_characters_escape() {
        let arena = Arena::new();
        let text: String = (0u8..0x20).map(|b| b as char).collect();
        let item = Item::String(arena.alloc_str(&text));
        let json = serialize_json(item);
        assert!(json.contains("\\u0000"));
        assert!(json.contains("\\n"));
        assert!(json.contains("\\u001f"));
    }
}
