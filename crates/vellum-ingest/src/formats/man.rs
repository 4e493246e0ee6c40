//! man-page (roff) parser: `.TH` names the page, `.SH`/`.SS` open sections,
//! `.PP` breaks paragraphs, `.TP` starts a tagged term, `.B`/`.I` mark their
//! arguments. Everything else accumulates as paragraph text.

use super::{element, set_attr};
use crate::Input;
use vellum_tree::{Element, Item};

pub(crate) fn parse<'a>(input: &mut Input<'a>, source: &str) -> Item<'a> {
    if source.trim().is_empty() {
        return Item::Null;
    }
    let doc = element(input, "man");
    let mut section: Option<&'a Element<'a>> = None;
    let mut top_section: Option<&'a Element<'a>> = None;
    let mut paragraph: Option<&'a Element<'a>> = None;
    let mut lines = source.lines().peekable();

    while let Some(line) = lines.next() {
        let line = line.trim_end();
        if let Some(request) = line.strip_prefix('.') {
            let (name, args) = split_request(request);
            match name {
                "TH" => {
                    let mut parts = split_args(args);
                    if let Some(title) = parts.next() {
                        set_attr(input, doc, "title", &title);
                    }
                    if let Some(section_no) = parts.next() {
                        set_attr(input, doc, "section", &section_no);
                    }
                }
                "SH" => {
                    paragraph = None;
                    let el = element(input, "section");
                    set_attr(input, el, "title", args.trim_matches('"'));
                    doc.add_child(Item::Element(el));
                    section = Some(el);
                    top_section = Some(el);
                }
                "SS" => {
                    paragraph = None;
                    let el = element(input, "subsection");
                    set_attr(input, el, "title", args.trim_matches('"'));
                    target_of(doc, top_section).add_child(Item::Element(el));
                    section = Some(el);
                }
                "PP" | "P" | "LP" => paragraph = None,
                "TP" => {
                    paragraph = None;
                    // next line is the term, following lines its description
                    if let Some(term_line) = lines.next() {
                        let item = element(input, "item");
                        let term = element(input, "term");
                        append_text(input, term, strip_font_request(term_line));
                        item.add_child(Item::Element(term));
                        target_of(doc, section).add_child(Item::Element(item));
                        paragraph = Some(item);
                    }
                }
                "B" | "I" => {
                    let span = element(input, if name == "B" { "bold" } else { "italic" });
                    append_text(input, span, args.trim_matches('"'));
                    ensure_paragraph(input, doc, section, &mut paragraph).add_child(Item::Element(span));
                }
                "BR" | "IR" | "RB" | "RI" => {
                    // alternating fonts collapse to plain text here
                    let text = args.replace('"', "");
                    append_text(
                        input,
                        ensure_paragraph(input, doc, section, &mut paragraph),
                        &text,
                    );
                }
                "br" => {}
                _ => {} // unhandled requests are dropped
            }
        } else if line.trim().is_empty() {
            paragraph = None;
        } else {
            let p = ensure_paragraph(input, doc, section, &mut paragraph);
            append_text(input, p, line.trim());
        }
    }
    Item::Element(doc)
}

fn split_request(request: &str) -> (&str, &str) {
    match request.find(char::is_whitespace) {
        Some(at) => (&request[..at], request[at..].trim_start()),
        None => (request, ""),
    }
}

/// Split request arguments, honoring double quotes.
fn split_args(args: &str) -> impl Iterator<Item = String> + '_ {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in args.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out.into_iter()
}

fn strip_font_request(line: &str) -> &str {
    line.strip_prefix(".B ")
        .or_else(|| line.strip_prefix(".I "))
        .unwrap_or(line)
        .trim()
}

fn target_of<'a>(doc: &'a Element<'a>, section: Option<&'a Element<'a>>) -> &'a Element<'a> {
    section.unwrap_or(doc)
}

fn ensure_paragraph<'a>(
    input: &Input<'a>,
    doc: &'a Element<'a>,
    section: Option<&'a Element<'a>>,
    paragraph: &mut Option<&'a Element<'a>>,
) -> &'a Element<'a> {
    if let Some(p) = *paragraph {
        return p;
    }
    let p = element(input, "p");
    target_of(doc, section).add_child(Item::Element(p));
    *paragraph = Some(p);
    p
}

fn append_text<'a>(input: &Input<'a>, parent: &'a Element<'a>, text: &str) {
    if text.is_empty() {
        return;
    }
    if parent.content_length() > 0 {
        parent.add_child(Item::String(input.arena.alloc_str(&format!(" {text}"))));
    } else {
        parent.add_child(Item::String(input.arena.alloc_str(text)));
    }
}

#[cfg(test)]
mod tests {
    use crate::{Format, Input};
    use pretty_assertions::assert_eq;
    use vellum_tree::{Arena, Item};

    #[test]
    fn title_sections_and_paragraphs() {
        let arena = Arena::new();
        let source = ".TH GREP 1\n.SH NAME\ngrep \\- print matching lines\n.SH DESCRIPTION\nSearches for\npatterns.\n.PP\nSecond paragraph.\n";
        let input = Input::from_source_with_format(&arena, source, Format::Man);
        let man = input.root.as_element().unwrap();
        assert_eq!(man.attr("title"), Some(Item::String("GREP")));
        assert_eq!(man.attr("section"), Some(Item::String("1")));

        let sections = man.child_elements();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].attr("title"), Some(Item::String("NAME")));
        let description = sections[1];
        assert_eq!(description.child_elements().len(), 2);
        assert_eq!(
            description.child_elements()[0].text_content(),
            "Searches for patterns."
        );
    }

    #[test]
    fn bold_request_wraps_argument() {
        let arena = Arena::new();
        let source = ".SH OPTIONS\n.B -v\nprint version\n";
        let input = Input::from_source_with_format(&arena, source, Format::Man);
        let section = input.root.as_element().unwrap().child_elements()[0];
        let p = section.child_elements()[0];
        assert_eq!(p.child_elements()[0].tag(), "bold");
        assert_eq!(p.child_elements()[0].text_content(), "-v");
        assert_eq!(p.text_content(), "-v print version");
    }
}
