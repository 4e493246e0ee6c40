//! RTF parser: a control-word scanner that recovers the plain text runs,
//! paragraph breaks, and bold/italic toggles, skipping header groups like
//! the font and color tables.

use super::element;
use crate::Input;
use vellum_tree::{Element, Item};

pub(crate) fn parse<'a>(input: &mut Input<'a>, source: &str) -> Item<'a> {
    if source.trim().is_empty() {
        return Item::Null;
    }
    let doc = element(input, "rtf");
    let mut chars = source.chars().peekable();
    let mut paragraph = element(input, "p");
    let mut run = String::new();
    let mut depth = 0usize;
    let mut skip_depth: Option<usize> = None;

    macro_rules! flush_run {
        () => {
            if !run.is_empty() {
                paragraph.add_child(Item::String(input.arena.alloc_str(&run)));
                run.clear();
            }
        };
    }

    while let Some(c) = chars.next() {
        if let Some(limit) = skip_depth {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth < limit {
                        skip_depth = None;
                    }
                }
                _ => {}
            }
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '\\' => match chars.peek() {
                Some('\\') | Some('{') | Some('}') => {
                    run.push(chars.next().unwrap_or('\\'));
                }
                Some('\'') => {
                    // \'hh hex-escaped byte
                    chars.next();
                    let hi = chars.next().and_then(|c| c.to_digit(16));
                    let lo = chars.next().and_then(|c| c.to_digit(16));
                    if let (Some(hi), Some(lo)) = (hi, lo) {
                        run.push((hi * 16 + lo) as u8 as char);
                    }
                }
                _ => {
                    let mut word = String::new();
                    while matches!(chars.peek(), Some(c) if c.is_ascii_alphabetic()) {
                        word.push(chars.next().unwrap_or('a'));
                    }
                    // optional numeric argument
                    let mut arg = String::new();
                    if chars.peek() == Some(&'-') {
                        arg.push(chars.next().unwrap_or('-'));
                    }
                    while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
                        arg.push(chars.next().unwrap_or('0'));
                    }
                    // a single space after a control word is part of it
                    if chars.peek() == Some(&' ') {
                        chars.next();
                    }
                    match word.as_str() {
                        "par" => {
                            flush_run!();
                            if paragraph.content_length() > 0 {
                                doc.add_child(Item::Element(paragraph));
                            }
                            paragraph = element(input, "p");
                        }
                        "tab" => run.push('\t'),
                        "line" => run.push('\n'),
                        "emdash" => run.push('\u{2014}'),
                        "endash" => run.push('\u{2013}'),
                        "b" | "i" => {
                            // toggles arrive as \b … \b0
                            flush_run!();
                            let toggle = element(input, if word == "b" { "bold" } else { "italic" });
                            if arg == "0" {
                                toggle.set_attr(input.names.intern("off"), Item::Bool(true));
                            }
                            paragraph.add_child(Item::Element(toggle));
                        }
                        "fonttbl" | "colortbl" | "stylesheet" | "info" | "pict" => {
                            skip_depth = Some(depth);
                        }
                        "u" => {
                            // \uN unicode escape with a fallback character
                            if let Ok(code) = arg.parse::<i32>() {
                                let code = if code < 0 { code + 65536 } else { code } as u32;
                                if let Some(ch) = char::from_u32(code) {
                                    run.push(ch);
                                }
                            }
                        }
                        _ => {} // formatting we do not model
                    }
                }
            },
            '\r' | '\n' => {}
            c => run.push(c),
        }
    }

    flush_para(input, doc, paragraph, &mut run);
    Item::Element(doc)
}

fn flush_para<'a>(
    input: &Input<'a>,
    doc: &'a Element<'a>,
    paragraph: &'a Element<'a>,
    run: &mut String,
) {
    if !run.is_empty() {
        paragraph.add_child(Item::String(input.arena.alloc_str(run)));
        run.clear();
    }
    if paragraph.content_length() > 0 {
        doc.add_child(Item::Element(paragraph));
    }
}

#[cfg(test)]
mod tests {
    use crate::{Format, Input};
    use pretty_assertions::assert_eq;
    use vellum_tree::Arena;

    #[test]
    fn paragraphs_and_text() {
        let arena = Arena::new();
        let source = r"{\rtf1\ansi{\fonttbl{\f0 Calibri;}}first\par second\par}";
        let input = Input::from_source_with_format(&arena, source, Format::Rtf);
        let doc = input.root.as_element().unwrap();
        let paras = doc.child_elements();
        assert_eq!(paras.len(), 2);
        assert_eq!(paras[0].text_content(), "first");
        assert_eq!(paras[1].text_content(), "second");
    }

    #[test]
    fn hex_and_unicode_escapes() {
        let arena = Arena::new();
        let source = r"{\rtf1 a\'e9b\emdash  c\par}";
        let input = Input::from_source_with_format(&arena, source, Format::Rtf);
        let doc = input.root.as_element().unwrap();
        assert_eq!(doc.child_elements()[0].text_content(), "a\u{e9}b\u{2014} c");
    }

    #[test]
    fn bold_toggles_are_marked() {
        let arena = Arena::new();
        let source = r"{\rtf1 x\b bold\b0 y\par}";
        let input = Input::from_source_with_format(&arena, source, Format::Rtf);
        let para = input.root.as_element().unwrap().child_elements()[0];
        let toggles = para.child_elements();
        assert_eq!(toggles.len(), 2);
        assert_eq!(toggles[0].tag(), "bold");
        assert!(!toggles[0].has_attr("off"));
        assert!(toggles[1].has_attr("off"));
    }
}
