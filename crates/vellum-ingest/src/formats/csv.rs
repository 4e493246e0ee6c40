//! CSV parser. The first record names the fields; every following record
//! becomes a map with inferred scalar values. Quoted fields may contain
//! separators, doubled quotes, and newlines.

use super::scalar;
use crate::Input;
use vellum_tree::{Item, List, Map};

pub(crate) fn parse<'a>(input: &mut Input<'a>, source: &str) -> Item<'a> {
    if source.trim().is_empty() {
        return Item::Null;
    }
    let records = read_records(source);
    let mut iter = records.into_iter();
    let Some(header) = iter.next() else {
        return Item::Null;
    };
    let fields: Vec<_> = header
        .iter()
        .map(|name| input.names.intern(name.trim()))
        .collect();

    let rows = List::new_in(input.arena);
    for record in iter {
        if record.len() == 1 && record[0].is_empty() {
            continue; // trailing blank line
        }
        let map = Map::new_in(input.arena);
        for (i, field) in fields.iter().enumerate() {
            let value = record.get(i).map(|raw| scalar(input, raw)).unwrap_or(Item::Null);
            map.put(*field, value);
        }
        rows.push(Item::Map(map));
    }
    Item::List(rows)
}

fn read_records(source: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                c => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            c => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use crate::{Format, Input};
    use pretty_assertions::assert_eq;
    use vellum_tree::{serialize_mark, Arena, Item};

    fn parse<'a>(arena: &'a Arena, source: &str) -> Input<'a> {
        Input::from_source_with_format(arena, source, Format::Csv)
    }

    #[test]
    fn header_names_fields() {
        let arena = Arena::new();
        let input = parse(&arena, "name,age\nada,36\ngrace,45\n");
        assert_eq!(
            serialize_mark(input.root),
            "[{name: \"ada\", age: 36}, {name: \"grace\", age: 45}]"
        );
    }

    #[test]
    fn quoted_fields_with_separators_and_newlines() {
        let arena = Arena::new();
        let input = parse(&arena, "a,b\n\"x,y\",\"line1\nline2\"\n");
        let rows = input.root.as_list().unwrap();
        let row = rows.get(0).and_then(|r| r.as_map()).unwrap();
        assert_eq!(row.get("a"), Some(Item::String("x,y")));
        assert_eq!(row.get("b"), Some(Item::String("line1\nline2")));
    }

    #[test]
    fn doubled_quotes_escape() {
        let arena = Arena::new();
        let input = parse(&arena, "q\n\"say \"\"hi\"\"\"\n");
        let rows = input.root.as_list().unwrap();
        let row = rows.get(0).and_then(|r| r.as_map()).unwrap();
        assert_eq!(row.get("q"), Some(Item::String("say \"hi\"")));
    }

    #[test]
    fn short_records_pad_with_null() {
        let arena = Arena::new();
        let input = parse(&arena, "a,b,c\n1,2\n");
        let rows = input.root.as_list().unwrap();
        let row = rows.get(0).and_then(|r| r.as_map()).unwrap();
        assert_eq!(row.get("c"), Some(Item::Null));
    }

    #[test]
    fn empty_input_is_null() {
        let arena = Arena::new();
        assert!(parse(&arena, "\n").root.is_null());
    }
}
