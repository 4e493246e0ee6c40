//! LaTeX document parser: sectioning commands, text-formatting commands,
//! itemize/enumerate environments, and inline `$…$` math delegated to the
//! math parser. This covers prose documents; standalone formulas go through
//! the math format directly.

use super::{element, record, set_attr};
use crate::Input;
use vellum_math::MathFlavor;
use vellum_tree::{Element, ErrorCode, Item};

pub(crate) fn parse<'a>(input: &mut Input<'a>, source: &str) -> Item<'a> {
    if source.trim().is_empty() {
        return Item::Null;
    }
    let doc = element(input, "latex");
    let mut p = Tex {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
    };
    // preamble commands before \begin{document} are dropped; the body is
    // parsed either way
    parse_block(input, &mut p, doc, None);
    Item::Element(doc)
}

struct Tex {
    chars: Vec<char>,
    pos: usize,
    line: u32,
}

impl Tex {
    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn starts(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.starts(s) {
            for _ in s.chars() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    fn command_name(&mut self) -> String {
        let mut name = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            if let Some(c) = self.bump() {
                name.push(c);
            }
        }
        name
    }

    fn braced(&mut self) -> Option<String> {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
        if self.peek() != Some('{') {
            return None;
        }
        self.bump();
        let mut depth = 1;
        let mut out = String::new();
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(out);
                    }
                }
                _ => {}
            }
            out.push(c);
        }
        None
    }

    fn skip_comment(&mut self) {
        while !matches!(self.peek(), None | Some('\n')) {
            self.bump();
        }
    }
}

/// Parse until EOF or `\end{terminator}`.
fn parse_block<'a>(
    input: &mut Input<'a>,
    p: &mut Tex,
    parent: &'a Element<'a>,
    terminator: Option<&str>,
) {
    let mut text = String::new();

    macro_rules! flush_text {
        () => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                let para = element(input, "p");
                para.add_child(Item::String(input.arena.alloc_str(trimmed)));
                parent.add_child(Item::Element(para));
            }
            text.clear();
        };
    }

    loop {
        if p.at_end() {
            if let Some(name) = terminator {
                record(
                    input,
                    ErrorCode::MalformedEnvironment,
                    &format!("missing \\end{{{name}}}"),
                    p.line,
                    0,
                );
            }
            break;
        }
        if let Some(name) = terminator {
            if p.eat_str(&format!("\\end{{{name}}}")) {
                break;
            }
        }
        match p.peek() {
            Some('%') => p.skip_comment(),
            Some('$') => {
                p.bump();
                let display = p.peek() == Some('$');
                if display {
                    p.bump();
                }
                let close = if display { "$$" } else { "$" };
                let mut formula = String::new();
                while !p.at_end() && !p.starts(close) {
                    if let Some(c) = p.bump() {
                        formula.push(c);
                    }
                }
                p.eat_str(close);
                flush_text!();
                let math = element(input, "math");
                if display {
                    set_attr(input, math, "display", "block");
                }
                let parsed =
                    vellum_math::parse_math(input.arena, &input.names, &formula, MathFlavor::Latex);
                input.errors.extend(parsed.errors);
                math.add_child(parsed.root);
                parent.add_child(Item::Element(math));
            }
            Some('\\') => {
                p.bump();
                let name = p.command_name();
                match name.as_str() {
                    "section" | "subsection" | "subsubsection" | "title" | "chapter" => {
                        flush_text!();
                        let title = p.braced().unwrap_or_default();
                        let el = element(input, &name);
                        el.add_child(Item::String(input.arena.alloc_str(&title)));
                        parent.add_child(Item::Element(el));
                    }
                    "textbf" | "textit" | "emph" | "texttt" | "underline" => {
                        flush_text!();
                        let body = p.braced().unwrap_or_default();
                        let tag = match name.as_str() {
                            "textbf" => "bold",
                            "texttt" => "code",
                            "underline" => "underline",
                            _ => "emph",
                        };
                        let el = element(input, tag);
                        el.add_child(Item::String(input.arena.alloc_str(&body)));
                        parent.add_child(Item::Element(el));
                    }
                    "begin" => {
                        let env = p.braced().unwrap_or_default();
                        match env.as_str() {
                            "document" => {} // transparent
                            "itemize" | "enumerate" => {
                                flush_text!();
                                let list =
                                    element(input, if env == "itemize" { "ul" } else { "ol" });
                                parse_items(input, p, list, &env);
                                parent.add_child(Item::Element(list));
                            }
                            "verbatim" => {
                                flush_text!();
                                let mut body = String::new();
                                while !p.at_end() && !p.starts("\\end{verbatim}") {
                                    if let Some(c) = p.bump() {
                                        body.push(c);
                                    }
                                }
                                p.eat_str("\\end{verbatim}");
                                let pre = element(input, "pre");
                                pre.add_child(Item::String(input.arena.alloc_str(&body)));
                                parent.add_child(Item::Element(pre));
                            }
                            _ => {
                                flush_text!();
                                let el = element(input, "env");
                                set_attr(input, el, "name", &env);
                                parse_block(input, p, el, Some(&env));
                                parent.add_child(Item::Element(el));
                            }
                        }
                    }
                    "end" => {
                        // unmatched \end — record and drop its argument
                        let env = p.braced().unwrap_or_default();
                        record(
                            input,
                            ErrorCode::MalformedEnvironment,
                            &format!("unexpected \\end{{{env}}}"),
                            p.line,
                            0,
                        );
                    }
                    "item" => {
                        // stray \item outside a list behaves like text
                        text.push_str("\u{2022} ");
                    }
                    "newline" => text.push('\n'),
                    "" => {
                        // `\\` is a line break; `\%` `\$` `\&` escape literally
                        match p.bump() {
                            Some('\\') => text.push('\n'),
                            Some(c) => text.push(c),
                            None => {}
                        }
                    }
                    _ => {
                        // unknown command: keep its braced argument as text
                        if let Some(arg) = p.braced() {
                            text.push_str(&arg);
                        }
                    }
                }
            }
            Some('\n') => {
                p.bump();
                // a blank line ends the paragraph
                if p.peek() == Some('\n') {
                    flush_text!();
                } else if !text.is_empty() {
                    text.push(' ');
                }
            }
            Some(c) => {
                text.push(c);
                p.bump();
            }
            None => {}
        }
    }
    flush_text!();
}

fn parse_items<'a>(input: &mut Input<'a>, p: &mut Tex, list: &'a Element<'a>, env: &str) {
    let end = format!("\\end{{{env}}}");
    let mut current: Option<String> = None;
    loop {
        if p.at_end() {
            record(
                input,
                ErrorCode::MalformedEnvironment,
                &format!("missing {end}"),
                p.line,
                0,
            );
            break;
        }
        if p.eat_str(&end) {
            break;
        }
        if p.eat_str("\\item") {
            if let Some(done) = current.take() {
                push_item(input, list, &done);
            }
            current = Some(String::new());
            continue;
        }
        if p.peek() == Some('%') {
            p.skip_comment();
            continue;
        }
        let Some(c) = p.bump() else { break };
        if let Some(text) = &mut current {
            text.push(c);
        }
    }
    if let Some(done) = current.take() {
        push_item(input, list, &done);
    }
}

fn push_item<'a>(input: &Input<'a>, list: &'a Element<'a>, text: &str) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    let li = element(input, "li");
    li.add_child(Item::String(input.arena.alloc_str(trimmed)));
    list.add_child(Item::Element(li));
}

#[cfg(test)]
mod tests {
    use crate::{Format, Input};
    use pretty_assertions::assert_eq;
    use vellum_tree::{serialize_mark, Arena};

    fn parse_to_mark(source: &str) -> String {
        let arena = Arena::new();
        let input = Input::from_source_with_format(&arena, source, Format::Latex);
        serialize_mark(input.root)
    }

    #[test]
    fn sections_and_paragraphs() {
        assert_eq!(
            parse_to_mark("\\section{Intro}\nFirst line\ncontinues.\n\nNew paragraph.\n"),
            "<latex; <section; \"Intro\"> <p; \"First line continues.\"> <p; \"New paragraph.\">>"
        );
    }

    #[test]
    fn inline_math_is_delegated() {
        assert_eq!(
            parse_to_mark("Euler: $e^x$ done.\n"),
            "<latex; <p; \"Euler:\"> <math; <pow; 'e' 'x'>> <p; \"done.\">>"
        );
    }

    #[test]
    fn itemize_environment() {
        assert_eq!(
            parse_to_mark("\\begin{itemize}\\item one\\item two\\end{itemize}"),
            "<latex; <ul; <li; \"one\"> <li; \"two\">>>"
        );
    }

    #[test]
    fn verbatim_is_literal() {
        assert_eq!(
            parse_to_mark("\\begin{verbatim}x^2 $y$\\end{verbatim}"),
            "<latex; <pre; \"x^2 $y$\">>"
        );
    }

    #[test]
    fn unmatched_end_is_recorded() {
        let arena = Arena::new();
        let input = Input::from_source_with_format(&arena, "text \\end{quote}", Format::Latex);
        assert!(!input.errors.is_empty());
    }
}
