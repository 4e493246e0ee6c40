//! vCard parser. Each `BEGIN:VCARD … END:VCARD` block becomes a `vcard`
//! element; `KEY;PARAM=V:value` lines become child elements tagged by the
//! lowercased key, with parameters as attributes and the value as text.

use super::{element, record, set_attr};
use crate::Input;
use vellum_tree::{Element, ErrorCode, Item, List};

pub(crate) fn parse<'a>(input: &mut Input<'a>, source: &str) -> Item<'a> {
    if source.trim().is_empty() {
        return Item::Null;
    }

    // unfold continuation lines first (RFC 6350 §3.2)
    let unfolded = source.replace("\r\n ", "").replace("\n ", "").replace("\r\n\t", "").replace("\n\t", "");

    let mut cards: Vec<&'a Element<'a>> = Vec::new();
    let mut current: Option<&'a Element<'a>> = None;

    for (line_no, line) in unfolded.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let upper = line.to_ascii_uppercase();
        if upper == "BEGIN:VCARD" {
            if current.is_some() {
                record(
                    input,
                    ErrorCode::UnexpectedToken,
                    "nested BEGIN:VCARD",
                    line_no as u32 + 1,
                    1,
                );
            }
            current = Some(element(input, "vcard"));
            continue;
        }
        if upper == "END:VCARD" {
            match current.take() {
                Some(card) => cards.push(card),
                None => record(
                    input,
                    ErrorCode::UnexpectedToken,
                    "END:VCARD without BEGIN",
                    line_no as u32 + 1,
                    1,
                ),
            }
            continue;
        }
        let Some(card) = current else {
            continue; // junk outside a card
        };
        let Some(colon) = line.find(':') else {
            continue;
        };
        let (key_part, value) = (&line[..colon], &line[colon + 1..]);
        let mut key_segments = key_part.split(';');
        let key = key_segments.next().unwrap_or("").to_ascii_lowercase();
        if key.is_empty() {
            continue;
        }
        let prop = element(input, &key);
        for param in key_segments {
            match param.split_once('=') {
                Some((name, value)) => {
                    set_attr(input, prop, &name.to_ascii_lowercase(), value)
                }
                None => set_attr(input, prop, "type", param),
            }
        }
        let value = value.replace("\\n", "\n").replace("\\,", ",").replace("\\;", ";");
        if !value.is_empty() {
            prop.add_child(Item::String(input.arena.alloc_str(&value)));
        }
        card.add_child(Item::Element(prop));
    }

    if current.is_some() {
        record(input, ErrorCode::UnexpectedEof, "unterminated vcard", 0, 0);
    }

    match cards.len() {
        0 => Item::Null,
        1 => Item::Element(cards[0]),
        _ => {
            let list = List::new_in(input.arena);
            for card in cards {
                list.push(Item::Element(card));
            }
            Item::List(list)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Format, Input};
    use pretty_assertions::assert_eq;
    use vellum_tree::{Arena, Item};

    #[test]
    fn single_card_properties() {
        let arena = Arena::new();
        let source = "BEGIN:VCARD\nVERSION:4.0\nFN:Ada Lovelace\nTEL;TYPE=work:+44 1\nEND:VCARD\n";
        let input = Input::from_source_with_format(&arena, source, Format::Vcf);
        let card = input.root.as_element().unwrap();
        assert_eq!(card.tag(), "vcard");

        let props = card.child_elements();
        assert_eq!(props.len(), 3);
        assert_eq!(props[1].tag(), "fn");
        assert_eq!(props[1].text_content(), "Ada Lovelace");
        assert_eq!(props[2].attr("type"), Some(Item::String("work")));
    }

    #[test]
    fn folded_lines_unfold() {
        let arena = Arena::new();
        let source = "BEGIN:VCARD\nNOTE:line one\n  continues\nEND:VCARD\n";
        let input = Input::from_source_with_format(&arena, source, Format::Vcf);
        let card = input.root.as_element().unwrap();
        assert_eq!(card.child_elements()[0].text_content(), "line one continues");
    }

    #[test]
    fn multiple_cards_become_a_list() {
        let arena = Arena::new();
        let source = "BEGIN:VCARD\nFN:A\nEND:VCARD\nBEGIN:VCARD\nFN:B\nEND:VCARD\n";
        let input = Input::from_source_with_format(&arena, source, Format::Vcf);
        assert_eq!(input.root.as_list().map(|l| l.len()), Some(2));
    }

    #[test]
    fn unterminated_card_is_recorded() {
        let arena = Arena::new();
        let input = Input::from_source_with_format(&arena, "BEGIN:VCARD\nFN:A\n", Format::Vcf);
        assert!(!input.errors.is_empty());
    }
}
