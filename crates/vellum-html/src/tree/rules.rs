//! Per-mode token handling. Each insertion mode is a method; "process using
//! the rules for X" in the WHATWG text becomes a direct call to that mode's
//! method.

use super::{InsertionMode, QuirksMode, Scope, TreeBuilder};
use crate::tokenizer::{State, Tag, Token};
use vellum_tree::Item;

fn is_ws(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\u{c}' | ' ')
}

fn synth_tag(name: &str) -> Tag {
    Tag {
        name: name.to_string(),
        attrs: Vec::new(),
        self_closing: false,
    }
}

impl<'a, 'n, 's> TreeBuilder<'a, 'n, 's> {
    pub(crate) fn process(&mut self, token: Token) {
        match self.mode {
            InsertionMode::Initial => self.initial(token),
            InsertionMode::BeforeHtml => self.before_html(token),
            InsertionMode::BeforeHead => self.before_head(token),
            InsertionMode::InHead => self.in_head(token),
            InsertionMode::InHeadNoscript => self.in_head_noscript(token),
            InsertionMode::AfterHead => self.after_head(token),
            InsertionMode::InBody => self.in_body(token),
            InsertionMode::Text => self.text(token),
            InsertionMode::InTable => self.in_table(token),
            InsertionMode::InTableText => self.in_table_text(token),
            InsertionMode::InCaption => self.in_caption(token),
            InsertionMode::InColumnGroup => self.in_column_group(token),
            InsertionMode::InTableBody => self.in_table_body(token),
            InsertionMode::InRow => self.in_row(token),
            InsertionMode::InCell => self.in_cell(token),
            InsertionMode::InSelect => self.in_select(token),
            InsertionMode::InSelectInTable => self.in_select_in_table(token),
            InsertionMode::InTemplate => self.in_template(token),
            InsertionMode::AfterBody => self.after_body(token),
            InsertionMode::InFrameset => self.in_frameset(token),
            InsertionMode::AfterFrameset => self.after_frameset(token),
            InsertionMode::AfterAfterBody => self.after_after_body(token),
            InsertionMode::AfterAfterFrameset => self.after_after_frameset(token),
        }
    }

    fn initial(&mut self, token: Token) {
        match token {
            Token::Character(c) if is_ws(c) => {}
            Token::Comment(data) => self.insert_comment_in(&data, self.document),
            Token::Doctype(doctype) => {
                self.quirks = self.quirks_from_doctype(&doctype);
                self.insert_doctype(&doctype);
                self.mode = InsertionMode::BeforeHtml;
            }
            other => {
                self.error("expected-doctype-but-got-something-else");
                self.quirks = QuirksMode::Quirks;
                self.mode = InsertionMode::BeforeHtml;
                self.process(other);
            }
        }
    }

    fn before_html(&mut self, token: Token) {
        match token {
            Token::Doctype(_) => self.error("unexpected-doctype"),
            Token::Comment(data) => self.insert_comment_in(&data, self.document),
            Token::Character(c) if is_ws(c) => {}
            Token::StartTag(tag) if tag.name == "html" => {
                let el = self.create_element(&tag.name, &tag.attrs);
                self.document.add_child(Item::Element(el));
                self.open.push(el);
                self.mode = InsertionMode::BeforeHead;
            }
            Token::EndTag(tag)
                if !matches!(tag.name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.error("unexpected-end-tag-before-html");
            }
            other => {
                let el = self.create_element("html", &[]);
                self.document.add_child(Item::Element(el));
                self.open.push(el);
                self.mode = InsertionMode::BeforeHead;
                self.process(other);
            }
        }
    }

    fn before_head(&mut self, token: Token) {
        match token {
            Token::Character(c) if is_ws(c) => {}
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.error("unexpected-doctype"),
            Token::StartTag(tag) if tag.name == "html" => self.in_body(Token::StartTag(tag)),
            Token::StartTag(tag) if tag.name == "head" => {
                let el = self.insert_element(&tag);
                self.head = Some(el);
                self.mode = InsertionMode::InHead;
            }
            Token::EndTag(tag)
                if !matches!(tag.name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.error("unexpected-end-tag-before-head");
            }
            other => {
                let el = self.insert_element(&synth_tag("head"));
                self.head = Some(el);
                self.mode = InsertionMode::InHead;
                self.process(other);
            }
        }
    }

    fn in_head(&mut self, token: Token) {
        match token {
            Token::Character(c) if is_ws(c) => self.append_char(c),
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.error("unexpected-doctype"),
            Token::StartTag(tag) => match tag.name.as_str() {
                "html" => self.in_body(Token::StartTag(tag)),
                "base" | "basefont" | "bgsound" | "link" | "meta" => {
                    self.insert_void_element(&tag);
                }
                "title" => self.parse_raw_text(&tag, State::Rcdata),
                "noframes" | "style" => self.parse_raw_text(&tag, State::Rawtext),
                "noscript" if !self.scripting => {
                    self.insert_element(&tag);
                    self.mode = InsertionMode::InHeadNoscript;
                }
                "noscript" => self.parse_raw_text(&tag, State::Rawtext),
                "script" => self.parse_raw_text(&tag, State::ScriptData),
                "template" => {
                    self.insert_element(&tag);
                    self.push_marker();
                    self.frameset_ok = false;
                    self.mode = InsertionMode::InTemplate;
                    self.template_modes.push(InsertionMode::InTemplate);
                }
                "head" => self.error("unexpected-head-in-head"),
                _ => {
                    self.pop_head_and_reprocess(Token::StartTag(tag));
                }
            },
            Token::EndTag(tag) => match tag.name.as_str() {
                "head" => {
                    self.open.pop();
                    self.mode = InsertionMode::AfterHead;
                }
                "template" => self.close_template(),
                "body" | "html" | "br" => self.pop_head_and_reprocess(Token::EndTag(tag)),
                _ => self.error("unexpected-end-tag-in-head"),
            },
            other => self.pop_head_and_reprocess(other),
        }
    }

    fn pop_head_and_reprocess(&mut self, token: Token) {
        self.flush_text();
        self.open.pop();
        self.mode = InsertionMode::AfterHead;
        self.process(token);
    }

    fn close_template(&mut self) {
        if !self.open.iter().any(|e| e.tag() == "template") {
            self.error("unexpected-end-tag-template");
            return;
        }
        self.flush_text();
        self.generate_implied_end_tags(None);
        if self.current().tag() != "template" {
            self.error("unexpected-open-elements-at-template-end");
        }
        self.pop_until("template");
        self.clear_formatting_to_marker();
        self.template_modes.pop();
        self.reset_insertion_mode();
    }

    fn in_head_noscript(&mut self, token: Token) {
        match token {
            Token::Doctype(_) => self.error("unexpected-doctype"),
            Token::StartTag(tag) if tag.name == "html" => self.in_body(Token::StartTag(tag)),
            Token::EndTag(tag) if tag.name == "noscript" => {
                self.open.pop();
                self.mode = InsertionMode::InHead;
            }
            Token::Character(c) if is_ws(c) => self.in_head(Token::Character(c)),
            Token::Comment(data) => self.in_head(Token::Comment(data)),
            Token::StartTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                ) =>
            {
                self.in_head(Token::StartTag(tag))
            }
            Token::StartTag(tag) if matches!(tag.name.as_str(), "head" | "noscript") => {
                self.error("unexpected-start-tag-in-noscript");
            }
            Token::EndTag(tag) if tag.name != "br" => {
                self.error("unexpected-end-tag-in-noscript");
            }
            other => {
                self.error("unexpected-content-in-noscript");
                self.flush_text();
                self.open.pop();
                self.mode = InsertionMode::InHead;
                self.process(other);
            }
        }
    }

    fn after_head(&mut self, token: Token) {
        match token {
            Token::Character(c) if is_ws(c) => self.append_char(c),
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.error("unexpected-doctype"),
            Token::StartTag(tag) => match tag.name.as_str() {
                "html" => self.in_body(Token::StartTag(tag)),
                "body" => {
                    self.insert_element(&tag);
                    self.frameset_ok = false;
                    self.mode = InsertionMode::InBody;
                }
                "frameset" => {
                    self.insert_element(&tag);
                    self.mode = InsertionMode::InFrameset;
                }
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                | "style" | "template" | "title" => {
                    self.error("unexpected-head-content-after-head");
                    if let Some(head) = self.head {
                        self.open.push(head);
                        self.in_head(Token::StartTag(tag));
                        if let Some(i) = self.open.iter().rposition(|e| {
                            self.head.map(|h| e.ptr_eq(h)).unwrap_or(false)
                        }) {
                            self.open.remove(i);
                        }
                    }
                }
                "head" => self.error("unexpected-head-after-head"),
                _ => self.synth_body_and_reprocess(Token::StartTag(tag)),
            },
            Token::EndTag(tag) => match tag.name.as_str() {
                "template" => self.close_template(),
                "body" | "html" | "br" => self.synth_body_and_reprocess(Token::EndTag(tag)),
                _ => self.error("unexpected-end-tag-after-head"),
            },
            other => self.synth_body_and_reprocess(other),
        }
    }

    fn synth_body_and_reprocess(&mut self, token: Token) {
        self.insert_element(&synth_tag("body"));
        self.mode = InsertionMode::InBody;
        self.process(token);
    }

    fn in_body(&mut self, token: Token) {
        match token {
            Token::Character('\0') => self.error("unexpected-null-character"),
            Token::Character(c) if is_ws(c) => {
                self.reconstruct_formatting();
                self.append_char(c);
            }
            Token::Character(c) => {
                self.reconstruct_formatting();
                self.append_char(c);
                self.frameset_ok = false;
            }
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.error("unexpected-doctype"),
            Token::Eof => {
                if !self.template_modes.is_empty() {
                    self.in_template(Token::Eof);
                    return;
                }
                self.flush_text();
                let unclosed = self.open.iter().any(|el| {
                    !matches!(
                        el.tag().as_str(),
                        "dd" | "dt"
                            | "li"
                            | "optgroup"
                            | "option"
                            | "p"
                            | "rb"
                            | "rp"
                            | "rt"
                            | "rtc"
                            | "tbody"
                            | "td"
                            | "tfoot"
                            | "th"
                            | "thead"
                            | "tr"
                            | "body"
                            | "html"
                    )
                });
                if unclosed {
                    self.error("eof-with-unclosed-elements");
                }
            }
            Token::StartTag(tag) => self.in_body_start_tag(tag),
            Token::EndTag(tag) => self.in_body_end_tag(tag),
        }
    }

    fn in_body_start_tag(&mut self, tag: Tag) {
        match tag.name.as_str() {
            "html" => {
                self.error("unexpected-html-start-tag");
                if self.open.iter().any(|e| e.tag() == "template") {
                    return;
                }
                if let Some(&html) = self.open.first() {
                    for attr in &tag.attrs {
                        html.set_attr_if_missing(
                            self.names.intern(&attr.name),
                            Item::String(self.arena.alloc_str(&attr.value)),
                        );
                    }
                }
            }
            "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
            | "style" | "template" | "title" => self.in_head(Token::StartTag(tag)),
            "body" => {
                self.error("unexpected-body-start-tag");
                if self.open.len() < 2 || self.open[1].tag() != "body" {
                    return;
                }
                self.frameset_ok = false;
                let body = self.open[1];
                for attr in &tag.attrs {
                    body.set_attr_if_missing(
                        self.names.intern(&attr.name),
                        Item::String(self.arena.alloc_str(&attr.value)),
                    );
                }
            }
            "frameset" => {
                self.error("unexpected-frameset-start-tag");
                if !self.frameset_ok || self.open.len() < 2 || self.open[1].tag() != "body" {
                    return;
                }
                self.flush_text();
                let body = self.open[1];
                self.detach(body);
                self.open.truncate(1);
                self.insert_element(&tag);
                self.mode = InsertionMode::InFrameset;
            }
            "address" | "article" | "aside" | "blockquote" | "center" | "details" | "dialog"
            | "dir" | "div" | "dl" | "fieldset" | "figcaption" | "figure" | "footer"
            | "header" | "hgroup" | "main" | "menu" | "nav" | "ol" | "p" | "section"
            | "summary" | "ul" => {
                if self.has_in_scope("p", Scope::Button) {
                    self.close_p_element();
                }
                self.insert_element(&tag);
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if self.has_in_scope("p", Scope::Button) {
                    self.close_p_element();
                }
                if matches!(
                    self.current().tag().as_str(),
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
                ) {
                    self.error("nested-heading");
                    self.open.pop();
                }
                self.insert_element(&tag);
            }
            "pre" | "listing" => {
                if self.has_in_scope("p", Scope::Button) {
                    self.close_p_element();
                }
                self.insert_element(&tag);
                self.ignore_lf = true;
                self.frameset_ok = false;
            }
            "form" => {
                if self.form.is_some() && !self.open.iter().any(|e| e.tag() == "template") {
                    self.error("form-inside-form");
                    return;
                }
                if self.has_in_scope("p", Scope::Button) {
                    self.close_p_element();
                }
                let el = self.insert_element(&tag);
                if !self.open.iter().any(|e| e.tag() == "template") {
                    self.form = Some(el);
                }
            }
            "li" => {
                self.frameset_ok = false;
                for i in (0..self.open.len()).rev() {
                    let node = self.open[i];
                    let name = node.tag();
                    if name == "li" {
                        self.generate_implied_end_tags(Some("li"));
                        if self.current().tag() != "li" {
                            self.error("unexpected-open-elements-closing-li");
                        }
                        self.pop_until("li");
                        break;
                    }
                    if super::tag_sets::is_special(name.as_str())
                        && !matches!(name.as_str(), "address" | "div" | "p")
                    {
                        break;
                    }
                }
                if self.has_in_scope("p", Scope::Button) {
                    self.close_p_element();
                }
                self.insert_element(&tag);
            }
            "dd" | "dt" => {
                self.frameset_ok = false;
                for i in (0..self.open.len()).rev() {
                    let node = self.open[i];
                    let name = node.tag();
                    if name == "dd" || name == "dt" {
                        let closing = name.as_str();
                        self.generate_implied_end_tags(Some(closing));
                        if self.current().tag() != *closing {
                            self.error("unexpected-open-elements-closing-dd-dt");
                        }
                        self.pop_until(closing);
                        break;
                    }
                    if super::tag_sets::is_special(name.as_str())
                        && !matches!(name.as_str(), "address" | "div" | "p")
                    {
                        break;
                    }
                }
                if self.has_in_scope("p", Scope::Button) {
                    self.close_p_element();
                }
                self.insert_element(&tag);
            }
            "plaintext" => {
                if self.has_in_scope("p", Scope::Button) {
                    self.close_p_element();
                }
                self.insert_element(&tag);
                self.tokenizer.set_state(State::Plaintext);
            }
            "button" => {
                if self.has_in_scope("button", Scope::Default) {
                    self.error("button-inside-button");
                    self.generate_implied_end_tags(None);
                    self.pop_until("button");
                }
                self.reconstruct_formatting();
                self.insert_element(&tag);
                self.frameset_ok = false;
            }
            "a" => {
                // one <a> at a time: close any open one first
                let open_a = self.formatting_after_last_marker("a");
                if open_a {
                    self.error("a-inside-a");
                    self.adoption_agency("a");
                    // the adoption agency usually removes it; make sure
                    if let Some(i) = self.formatting_name_index("a") {
                        let el = match &self.formatting[i] {
                            super::FormatEntry::Element(f) => f.el,
                            super::FormatEntry::Marker => unreachable!(),
                        };
                        self.formatting.remove(i);
                        if let Some(j) = self.open.iter().position(|e| e.ptr_eq(el)) {
                            self.open.remove(j);
                        }
                    }
                }
                self.reconstruct_formatting();
                let el = self.insert_element(&tag);
                self.push_formatting(el, &tag);
            }
            "b" | "big" | "code" | "em" | "font" | "i" | "s" | "small" | "strike" | "strong"
            | "tt" | "u" => {
                self.reconstruct_formatting();
                let el = self.insert_element(&tag);
                self.push_formatting(el, &tag);
            }
            "nobr" => {
                self.reconstruct_formatting();
                if self.has_in_scope("nobr", Scope::Default) {
                    self.error("nobr-inside-nobr");
                    self.adoption_agency("nobr");
                    self.reconstruct_formatting();
                }
                let el = self.insert_element(&tag);
                self.push_formatting(el, &tag);
            }
            "applet" | "marquee" | "object" => {
                self.reconstruct_formatting();
                self.insert_element(&tag);
                self.push_marker();
                self.frameset_ok = false;
            }
            "table" => {
                if self.quirks != QuirksMode::Quirks && self.has_in_scope("p", Scope::Button) {
                    self.close_p_element();
                }
                self.insert_element(&tag);
                self.frameset_ok = false;
                self.mode = InsertionMode::InTable;
            }
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.reconstruct_formatting();
                self.insert_void_element(&tag);
                self.frameset_ok = false;
            }
            "input" => {
                self.reconstruct_formatting();
                self.insert_void_element(&tag);
                let hidden = tag
                    .attr("type")
                    .map(|t| t.eq_ignore_ascii_case("hidden"))
                    .unwrap_or(false);
                if !hidden {
                    self.frameset_ok = false;
                }
            }
            "param" | "source" | "track" => {
                self.insert_void_element(&tag);
            }
            "hr" => {
                if self.has_in_scope("p", Scope::Button) {
                    self.close_p_element();
                }
                self.insert_void_element(&tag);
                self.frameset_ok = false;
            }
            "image" => {
                self.error("image-start-tag");
                let mut tag = tag;
                tag.name = "img".to_string();
                self.in_body_start_tag(tag);
            }
            "textarea" => {
                self.insert_element(&tag);
                self.ignore_lf = true;
                self.tokenizer.set_state(State::Rcdata);
                self.original_mode = Some(self.mode);
                self.frameset_ok = false;
                self.mode = InsertionMode::Text;
            }
            "xmp" => {
                if self.has_in_scope("p", Scope::Button) {
                    self.close_p_element();
                }
                self.reconstruct_formatting();
                self.frameset_ok = false;
                self.parse_raw_text(&tag, State::Rawtext);
            }
            "iframe" => {
                self.frameset_ok = false;
                self.parse_raw_text(&tag, State::Rawtext);
            }
            "noembed" => self.parse_raw_text(&tag, State::Rawtext),
            "select" => {
                self.reconstruct_formatting();
                self.insert_element(&tag);
                self.frameset_ok = false;
                self.mode = match self.mode {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                };
            }
            "optgroup" | "option" => {
                if self.current().tag() == "option" {
                    self.open.pop();
                }
                self.reconstruct_formatting();
                self.insert_element(&tag);
            }
            "rb" | "rtc" => {
                if self.has_in_scope("ruby", Scope::Default) {
                    self.generate_implied_end_tags(None);
                }
                self.insert_element(&tag);
            }
            "rp" | "rt" => {
                if self.has_in_scope("ruby", Scope::Default) {
                    self.generate_implied_end_tags(Some("rtc"));
                }
                self.insert_element(&tag);
            }
            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot"
            | "th" | "thead" | "tr" => {
                self.error("unexpected-table-content-start-tag");
            }
            _ => {
                // foreign content (math, svg) and unknown elements are
                // inserted as ordinary elements; a stray trailing solidus is
                // reported and otherwise treated as a plain start tag
                if tag.self_closing {
                    self.error("non-void-element-with-trailing-solidus");
                }
                self.reconstruct_formatting();
                self.insert_element(&tag);
            }
        }
    }

    fn in_body_end_tag(&mut self, tag: Tag) {
        let name = tag.name.as_str();
        match name {
            "template" => self.close_template(),
            "body" => {
                if !self.has_in_scope("body", Scope::Default) {
                    self.error("unexpected-body-end-tag");
                    return;
                }
                self.flush_text();
                self.mode = InsertionMode::AfterBody;
            }
            "html" => {
                if !self.has_in_scope("body", Scope::Default) {
                    self.error("unexpected-html-end-tag");
                    return;
                }
                self.flush_text();
                self.mode = InsertionMode::AfterBody;
                self.process(Token::EndTag(tag));
            }
            "address" | "article" | "aside" | "blockquote" | "button" | "center" | "details"
            | "dialog" | "dir" | "div" | "dl" | "fieldset" | "figcaption" | "figure"
            | "footer" | "header" | "hgroup" | "listing" | "main" | "menu" | "nav" | "ol"
            | "pre" | "section" | "summary" | "ul" => {
                if !self.has_in_scope(name, Scope::Default) {
                    self.error("unexpected-end-tag-no-open-element");
                    return;
                }
                self.flush_text();
                self.generate_implied_end_tags(None);
                if self.current().tag() != *name {
                    self.error("end-tag-with-open-elements");
                }
                self.pop_until(name);
            }
            "form" => {
                if !self.open.iter().any(|e| e.tag() == "template") {
                    let node = self.form.take();
                    let Some(node) = node else {
                        self.error("unexpected-form-end-tag");
                        return;
                    };
                    if !self.element_in_scope(node, Scope::Default) {
                        self.error("unexpected-form-end-tag");
                        return;
                    }
                    self.flush_text();
                    self.generate_implied_end_tags(None);
                    if !self.current().ptr_eq(node) {
                        self.error("end-tag-with-open-elements");
                    }
                    if let Some(i) = self.open.iter().position(|e| e.ptr_eq(node)) {
                        self.open.remove(i);
                    }
                } else {
                    if !self.has_in_scope("form", Scope::Default) {
                        self.error("unexpected-form-end-tag");
                        return;
                    }
                    self.flush_text();
                    self.generate_implied_end_tags(None);
                    if self.current().tag() != "form" {
                        self.error("end-tag-with-open-elements");
                    }
                    self.pop_until("form");
                }
            }
            "p" => {
                if !self.has_in_scope("p", Scope::Button) {
                    self.error("unexpected-p-end-tag");
                    self.insert_element(&synth_tag("p"));
                }
                self.flush_text();
                self.close_p_element();
            }
            "li" => {
                if !self.has_in_scope("li", Scope::ListItem) {
                    self.error("unexpected-li-end-tag");
                    return;
                }
                self.flush_text();
                self.generate_implied_end_tags(Some("li"));
                if self.current().tag() != "li" {
                    self.error("end-tag-with-open-elements");
                }
                self.pop_until("li");
            }
            "dd" | "dt" => {
                if !self.has_in_scope(name, Scope::Default) {
                    self.error("unexpected-end-tag-no-open-element");
                    return;
                }
                self.flush_text();
                self.generate_implied_end_tags(Some(name));
                if self.current().tag() != *name {
                    self.error("end-tag-with-open-elements");
                }
                self.pop_until(name);
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let headings = ["h1", "h2", "h3", "h4", "h5", "h6"];
                if !headings
                    .iter()
                    .any(|&h| self.has_in_scope(h, Scope::Default))
                {
                    self.error("unexpected-heading-end-tag");
                    return;
                }
                self.flush_text();
                self.generate_implied_end_tags(None);
                if self.current().tag() != *name {
                    self.error("end-tag-with-open-elements");
                }
                self.pop_until_one_of(&headings);
            }
            _ if super::tag_sets::is_formatting(name) => self.adoption_agency(name),
            "applet" | "marquee" | "object" => {
                if !self.has_in_scope(name, Scope::Default) {
                    self.error("unexpected-end-tag-no-open-element");
                    return;
                }
                self.flush_text();
                self.generate_implied_end_tags(None);
                if self.current().tag() != *name {
                    self.error("end-tag-with-open-elements");
                }
                self.pop_until(name);
                self.clear_formatting_to_marker();
            }
            "br" => {
                self.error("end-tag-br");
                self.reconstruct_formatting();
                self.insert_void_element(&synth_tag("br"));
                self.frameset_ok = false;
            }
            _ => {
                self.flush_text();
                self.any_other_end_tag(name);
            }
        }
    }

    fn text(&mut self, token: Token) {
        match token {
            Token::Character(c) => self.append_char(c),
            Token::Eof => {
                self.error("eof-in-text-content");
                self.flush_text();
                self.open.pop();
                self.mode = self.original_mode.take().unwrap_or(InsertionMode::InBody);
                self.process(Token::Eof);
            }
            Token::EndTag(_) => {
                self.flush_text();
                self.open.pop();
                self.mode = self.original_mode.take().unwrap_or(InsertionMode::InBody);
            }
            // start tags, comments and doctypes cannot reach Text mode
            _ => {}
        }
    }

    fn in_table(&mut self, token: Token) {
        match token {
            Token::Character(_)
                if matches!(
                    self.current().tag().as_str(),
                    "table" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                self.pending_table_text.clear();
                self.original_mode = Some(self.mode);
                self.mode = InsertionMode::InTableText;
                self.process(token);
            }
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.error("unexpected-doctype"),
            Token::StartTag(tag) => match tag.name.as_str() {
                "caption" => {
                    self.clear_stack_to_context(&["table", "template"]);
                    self.push_marker();
                    self.insert_element(&tag);
                    self.mode = InsertionMode::InCaption;
                }
                "colgroup" => {
                    self.clear_stack_to_context(&["table", "template"]);
                    self.insert_element(&tag);
                    self.mode = InsertionMode::InColumnGroup;
                }
                "col" => {
                    self.clear_stack_to_context(&["table", "template"]);
                    self.insert_element(&synth_tag("colgroup"));
                    self.mode = InsertionMode::InColumnGroup;
                    self.process(Token::StartTag(tag));
                }
                "tbody" | "tfoot" | "thead" => {
                    self.clear_stack_to_context(&["table", "template"]);
                    self.insert_element(&tag);
                    self.mode = InsertionMode::InTableBody;
                }
                "td" | "th" | "tr" => {
                    self.clear_stack_to_context(&["table", "template"]);
                    self.insert_element(&synth_tag("tbody"));
                    self.mode = InsertionMode::InTableBody;
                    self.process(Token::StartTag(tag));
                }
                "table" => {
                    self.error("table-inside-table");
                    if self.has_in_scope("table", Scope::Table) {
                        self.flush_text();
                        self.pop_until("table");
                        self.reset_insertion_mode();
                        self.process(Token::StartTag(tag));
                    }
                }
                "style" | "script" | "template" => self.in_head(Token::StartTag(tag)),
                "input" => {
                    let hidden = tag
                        .attr("type")
                        .map(|t| t.eq_ignore_ascii_case("hidden"))
                        .unwrap_or(false);
                    if hidden {
                        self.error("hidden-input-in-table");
                        self.insert_void_element(&tag);
                    } else {
                        self.foster_parent_in_body(Token::StartTag(tag));
                    }
                }
                "form" => {
                    self.error("form-in-table");
                    if self.form.is_none() && !self.open.iter().any(|e| e.tag() == "template") {
                        let el = self.insert_element(&tag);
                        self.form = Some(el);
                        self.open.pop();
                    }
                }
                _ => self.foster_parent_in_body(Token::StartTag(tag)),
            },
            Token::EndTag(tag) => match tag.name.as_str() {
                "table" => {
                    if !self.has_in_scope("table", Scope::Table) {
                        self.error("unexpected-table-end-tag");
                        return;
                    }
                    self.flush_text();
                    self.pop_until("table");
                    self.reset_insertion_mode();
                }
                "template" => self.close_template(),
                "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                | "th" | "thead" | "tr" => self.error("unexpected-end-tag-in-table"),
                _ => self.foster_parent_in_body(Token::EndTag(tag)),
            },
            Token::Eof => self.in_body(Token::Eof),
            other => self.foster_parent_in_body(other),
        }
    }

    /// The "anything else" table rule: process in body with foster parenting
    /// switched on.
    fn foster_parent_in_body(&mut self, token: Token) {
        self.error("unexpected-content-in-table");
        self.flush_text();
        self.foster_parenting = true;
        self.in_body(token);
        self.flush_text();
        self.foster_parenting = false;
    }

    fn in_table_text(&mut self, token: Token) {
        match token {
            Token::Character('\0') => self.error("unexpected-null-character"),
            Token::Character(c) => self.pending_table_text.push(c),
            other => {
                let chars = std::mem::take(&mut self.pending_table_text);
                if chars.iter().any(|c| !is_ws(*c)) {
                    self.error("non-whitespace-in-table-text");
                    self.foster_parenting = true;
                    for c in chars {
                        self.reconstruct_formatting();
                        self.append_char(c);
                        if !is_ws(c) {
                            self.frameset_ok = false;
                        }
                    }
                    self.flush_text();
                    self.foster_parenting = false;
                } else {
                    for c in chars {
                        self.append_char(c);
                    }
                }
                self.mode = self.original_mode.take().unwrap_or(InsertionMode::InTable);
                self.process(other);
            }
        }
    }

    fn in_caption(&mut self, token: Token) {
        match token {
            Token::EndTag(tag) if tag.name == "caption" => {
                self.close_caption();
            }
            Token::StartTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead"
                        | "tr"
                ) =>
            {
                self.error("unexpected-table-content-in-caption");
                if self.close_caption() {
                    self.process(Token::StartTag(tag));
                }
            }
            Token::EndTag(tag) if tag.name == "table" => {
                self.error("unexpected-table-end-tag-in-caption");
                if self.close_caption() {
                    self.process(Token::EndTag(tag));
                }
            }
            Token::EndTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th"
                        | "thead" | "tr"
                ) =>
            {
                self.error("unexpected-end-tag-in-caption");
            }
            other => self.in_body(other),
        }
    }

    fn close_caption(&mut self) -> bool {
        if !self.has_in_scope("caption", Scope::Table) {
            self.error("unexpected-caption-end-tag");
            return false;
        }
        self.flush_text();
        self.generate_implied_end_tags(None);
        if self.current().tag() != "caption" {
            self.error("end-tag-with-open-elements");
        }
        self.pop_until("caption");
        self.clear_formatting_to_marker();
        self.mode = InsertionMode::InTable;
        true
    }

    fn in_column_group(&mut self, token: Token) {
        match token {
            Token::Character(c) if is_ws(c) => self.append_char(c),
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.error("unexpected-doctype"),
            Token::StartTag(tag) if tag.name == "html" => self.in_body(Token::StartTag(tag)),
            Token::StartTag(tag) if tag.name == "col" => {
                self.insert_void_element(&tag);
            }
            Token::StartTag(tag) if tag.name == "template" => self.in_head(Token::StartTag(tag)),
            Token::EndTag(tag) if tag.name == "colgroup" => {
                if self.current().tag() != "colgroup" {
                    self.error("unexpected-colgroup-end-tag");
                    return;
                }
                self.flush_text();
                self.open.pop();
                self.mode = InsertionMode::InTable;
            }
            Token::EndTag(tag) if tag.name == "col" => self.error("unexpected-col-end-tag"),
            Token::EndTag(tag) if tag.name == "template" => self.close_template(),
            Token::Eof => self.in_body(Token::Eof),
            other => {
                if self.current().tag() != "colgroup" {
                    self.error("unexpected-content-in-colgroup");
                    return;
                }
                self.flush_text();
                self.open.pop();
                self.mode = InsertionMode::InTable;
                self.process(other);
            }
        }
    }

    fn in_table_body(&mut self, token: Token) {
        match token {
            Token::StartTag(tag) if tag.name == "tr" => {
                self.clear_stack_to_context(&["tbody", "tfoot", "thead", "template"]);
                self.insert_element(&tag);
                self.mode = InsertionMode::InRow;
            }
            Token::StartTag(tag) if matches!(tag.name.as_str(), "th" | "td") => {
                self.error("cell-outside-row");
                self.clear_stack_to_context(&["tbody", "tfoot", "thead", "template"]);
                self.insert_element(&synth_tag("tr"));
                self.mode = InsertionMode::InRow;
                self.process(Token::StartTag(tag));
            }
            Token::EndTag(tag) if matches!(tag.name.as_str(), "tbody" | "tfoot" | "thead") => {
                if !self.has_in_scope(&tag.name, Scope::Table) {
                    self.error("unexpected-table-section-end-tag");
                    return;
                }
                self.flush_text();
                self.clear_stack_to_context(&["tbody", "tfoot", "thead", "template"]);
                self.open.pop();
                self.mode = InsertionMode::InTable;
            }
            Token::StartTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead"
                ) =>
            {
                self.end_table_section(Token::StartTag(tag));
            }
            Token::EndTag(tag) if tag.name == "table" => {
                self.end_table_section(Token::EndTag(tag));
            }
            Token::EndTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr"
                ) =>
            {
                self.error("unexpected-end-tag-in-table-body");
            }
            other => self.in_table(other),
        }
    }

    fn end_table_section(&mut self, token: Token) {
        let any_section = ["tbody", "thead", "tfoot"]
            .iter()
            .any(|&s| self.has_in_scope(s, Scope::Table));
        if !any_section {
            self.error("no-table-section-in-scope");
            return;
        }
        self.flush_text();
        self.clear_stack_to_context(&["tbody", "tfoot", "thead", "template"]);
        self.open.pop();
        self.mode = InsertionMode::InTable;
        self.process(token);
    }

    fn in_row(&mut self, token: Token) {
        match token {
            Token::StartTag(tag) if matches!(tag.name.as_str(), "th" | "td") => {
                self.clear_stack_to_context(&["tr", "template"]);
                self.insert_element(&tag);
                self.mode = InsertionMode::InCell;
                self.push_marker();
            }
            Token::EndTag(tag) if tag.name == "tr" => {
                if !self.has_in_scope("tr", Scope::Table) {
                    self.error("unexpected-tr-end-tag");
                    return;
                }
                self.flush_text();
                self.clear_stack_to_context(&["tr", "template"]);
                self.open.pop();
                self.mode = InsertionMode::InTableBody;
            }
            Token::StartTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                self.end_row(Token::StartTag(tag));
            }
            Token::EndTag(tag) if tag.name == "table" => self.end_row(Token::EndTag(tag)),
            Token::EndTag(tag) if matches!(tag.name.as_str(), "tbody" | "tfoot" | "thead") => {
                if !self.has_in_scope(&tag.name, Scope::Table) {
                    self.error("unexpected-table-section-end-tag");
                    return;
                }
                self.end_row(Token::EndTag(tag));
            }
            Token::EndTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th"
                ) =>
            {
                self.error("unexpected-end-tag-in-row");
            }
            other => self.in_table(other),
        }
    }

    fn end_row(&mut self, token: Token) {
        if !self.has_in_scope("tr", Scope::Table) {
            self.error("no-tr-in-scope");
            return;
        }
        self.flush_text();
        self.clear_stack_to_context(&["tr", "template"]);
        self.open.pop();
        self.mode = InsertionMode::InTableBody;
        self.process(token);
    }

    fn in_cell(&mut self, token: Token) {
        match token {
            Token::EndTag(tag) if matches!(tag.name.as_str(), "td" | "th") => {
                if !self.has_in_scope(&tag.name, Scope::Table) {
                    self.error("unexpected-cell-end-tag");
                    return;
                }
                self.flush_text();
                self.generate_implied_end_tags(None);
                if self.current().tag() != *tag.name.as_str() {
                    self.error("end-tag-with-open-elements");
                }
                self.pop_until(&tag.name);
                self.clear_formatting_to_marker();
                self.mode = InsertionMode::InRow;
            }
            Token::StartTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead"
                        | "tr"
                ) =>
            {
                if !self.has_in_scope("td", Scope::Table)
                    && !self.has_in_scope("th", Scope::Table)
                {
                    self.error("no-cell-in-scope");
                    return;
                }
                self.close_cell();
                self.process(Token::StartTag(tag));
            }
            Token::EndTag(tag)
                if matches!(tag.name.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr") =>
            {
                if !self.has_in_scope(&tag.name, Scope::Table) {
                    self.error("unexpected-end-tag-in-cell");
                    return;
                }
                self.close_cell();
                self.process(Token::EndTag(tag));
            }
            Token::EndTag(tag)
                if matches!(tag.name.as_str(), "body" | "caption" | "col" | "colgroup" | "html") =>
            {
                self.error("unexpected-end-tag-in-cell");
            }
            other => self.in_body(other),
        }
    }

    fn close_cell(&mut self) {
        self.flush_text();
        self.generate_implied_end_tags(None);
        if !matches!(self.current().tag().as_str(), "td" | "th") {
            self.error("close-cell-with-open-elements");
        }
        self.pop_until_one_of(&["td", "th"]);
        self.clear_formatting_to_marker();
        self.mode = InsertionMode::InRow;
    }

    fn in_select(&mut self, token: Token) {
        match token {
            Token::Character('\0') => self.error("unexpected-null-character"),
            Token::Character(c) => self.append_char(c),
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.error("unexpected-doctype"),
            Token::StartTag(tag) => match tag.name.as_str() {
                "html" => self.in_body(Token::StartTag(tag)),
                "option" => {
                    if self.current().tag() == "option" {
                        self.flush_text();
                        self.open.pop();
                    }
                    self.insert_element(&tag);
                }
                "optgroup" => {
                    if self.current().tag() == "option" {
                        self.flush_text();
                        self.open.pop();
                    }
                    if self.current().tag() == "optgroup" {
                        self.flush_text();
                        self.open.pop();
                    }
                    self.insert_element(&tag);
                }
                "hr" => {
                    if self.current().tag() == "option" {
                        self.flush_text();
                        self.open.pop();
                    }
                    if self.current().tag() == "optgroup" {
                        self.flush_text();
                        self.open.pop();
                    }
                    self.insert_void_element(&tag);
                }
                "select" => {
                    self.error("select-inside-select");
                    if self.has_in_scope("select", Scope::Select) {
                        self.flush_text();
                        self.pop_until("select");
                        self.reset_insertion_mode();
                    }
                }
                "input" | "keygen" | "textarea" => {
                    self.error("unexpected-input-in-select");
                    if self.has_in_scope("select", Scope::Select) {
                        self.flush_text();
                        self.pop_until("select");
                        self.reset_insertion_mode();
                        self.process(Token::StartTag(tag));
                    }
                }
                "script" | "template" => self.in_head(Token::StartTag(tag)),
                _ => self.error("unexpected-start-tag-in-select"),
            },
            Token::EndTag(tag) => match tag.name.as_str() {
                "optgroup" => {
                    if self.current().tag() == "option"
                        && self.open.len() >= 2
                        && self.open[self.open.len() - 2].tag() == "optgroup"
                    {
                        self.flush_text();
                        self.open.pop();
                    }
                    if self.current().tag() == "optgroup" {
                        self.flush_text();
                        self.open.pop();
                    } else {
                        self.error("unexpected-optgroup-end-tag");
                    }
                }
                "option" => {
                    if self.current().tag() == "option" {
                        self.flush_text();
                        self.open.pop();
                    } else {
                        self.error("unexpected-option-end-tag");
                    }
                }
                "select" => {
                    if !self.has_in_scope("select", Scope::Select) {
                        self.error("unexpected-select-end-tag");
                        return;
                    }
                    self.flush_text();
                    self.pop_until("select");
                    self.reset_insertion_mode();
                }
                "template" => self.close_template(),
                _ => self.error("unexpected-end-tag-in-select"),
            },
            Token::Eof => self.in_body(Token::Eof),
        }
    }

    fn in_select_in_table(&mut self, token: Token) {
        const BREAKERS: &[&str] = &[
            "caption", "table", "tbody", "tfoot", "thead", "tr", "td", "th",
        ];
        match token {
            Token::StartTag(tag) if BREAKERS.contains(&tag.name.as_str()) => {
                self.error("table-content-in-select");
                self.flush_text();
                self.pop_until("select");
                self.reset_insertion_mode();
                self.process(Token::StartTag(tag));
            }
            Token::EndTag(tag) if BREAKERS.contains(&tag.name.as_str()) => {
                self.error("table-end-tag-in-select");
                if self.has_in_scope(&tag.name, Scope::Table) {
                    self.flush_text();
                    self.pop_until("select");
                    self.reset_insertion_mode();
                    self.process(Token::EndTag(tag));
                }
            }
            other => self.in_select(other),
        }
    }

    fn in_template(&mut self, token: Token) {
        match token {
            Token::Character(_) | Token::Comment(_) | Token::Doctype(_) => self.in_body(token),
            Token::StartTag(tag) => match tag.name.as_str() {
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                | "style" | "template" | "title" => self.in_head(Token::StartTag(tag)),
                "caption" | "colgroup" | "tbody" | "tfoot" | "thead" => {
                    self.retarget_template(InsertionMode::InTable, Token::StartTag(tag));
                }
                "col" => self.retarget_template(InsertionMode::InColumnGroup, Token::StartTag(tag)),
                "tr" => self.retarget_template(InsertionMode::InTableBody, Token::StartTag(tag)),
                "td" | "th" => self.retarget_template(InsertionMode::InRow, Token::StartTag(tag)),
                _ => self.retarget_template(InsertionMode::InBody, Token::StartTag(tag)),
            },
            Token::EndTag(tag) if tag.name == "template" => self.close_template(),
            Token::EndTag(_) => self.error("unexpected-end-tag-in-template"),
            Token::Eof => {
                if !self.open.iter().any(|e| e.tag() == "template") {
                    return;
                }
                self.error("eof-in-template");
                self.flush_text();
                self.pop_until("template");
                self.clear_formatting_to_marker();
                self.template_modes.pop();
                self.reset_insertion_mode();
                self.process(Token::Eof);
            }
        }
    }

    fn retarget_template(&mut self, mode: InsertionMode, token: Token) {
        self.template_modes.pop();
        self.template_modes.push(mode);
        self.mode = mode;
        self.process(token);
    }

    fn after_body(&mut self, token: Token) {
        match token {
            Token::Character(c) if is_ws(c) => self.in_body(Token::Character(c)),
            Token::Comment(data) => {
                // comment goes after the body, as a child of html
                if let Some(&html) = self.open.first() {
                    self.insert_comment_in(&data, html);
                }
            }
            Token::Doctype(_) => self.error("unexpected-doctype"),
            Token::StartTag(tag) if tag.name == "html" => self.in_body(Token::StartTag(tag)),
            Token::EndTag(tag) if tag.name == "html" => {
                self.mode = InsertionMode::AfterAfterBody;
            }
            Token::Eof => {}
            other => {
                self.error("unexpected-content-after-body");
                self.mode = InsertionMode::InBody;
                self.process(other);
            }
        }
    }

    fn in_frameset(&mut self, token: Token) {
        match token {
            Token::Character(c) if is_ws(c) => self.append_char(c),
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.error("unexpected-doctype"),
            Token::StartTag(tag) => match tag.name.as_str() {
                "html" => self.in_body(Token::StartTag(tag)),
                "frameset" => {
                    self.insert_element(&tag);
                }
                "frame" => {
                    self.insert_void_element(&tag);
                }
                "noframes" => self.in_head(Token::StartTag(tag)),
                _ => self.error("unexpected-start-tag-in-frameset"),
            },
            Token::EndTag(tag) if tag.name == "frameset" => {
                if self.current().tag() == "html" {
                    self.error("unexpected-frameset-end-tag");
                    return;
                }
                self.flush_text();
                self.open.pop();
                if self.current().tag() != "frameset" {
                    self.mode = InsertionMode::AfterFrameset;
                }
            }
            Token::EndTag(_) => self.error("unexpected-end-tag-in-frameset"),
            Token::Eof => {
                if self.current().tag() != "html" {
                    self.error("eof-in-frameset");
                }
                self.flush_text();
            }
            _ => self.error("unexpected-content-in-frameset"),
        }
    }

    fn after_frameset(&mut self, token: Token) {
        match token {
            Token::Character(c) if is_ws(c) => self.append_char(c),
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.error("unexpected-doctype"),
            Token::StartTag(tag) if tag.name == "html" => self.in_body(Token::StartTag(tag)),
            Token::StartTag(tag) if tag.name == "noframes" => {
                self.in_head(Token::StartTag(tag))
            }
            Token::EndTag(tag) if tag.name == "html" => {
                self.mode = InsertionMode::AfterAfterFrameset;
            }
            Token::Eof => {}
            _ => self.error("unexpected-content-after-frameset"),
        }
    }

    fn after_after_body(&mut self, token: Token) {
        match token {
            Token::Comment(data) => self.insert_comment_in(&data, self.document),
            Token::Doctype(_) => self.in_body(token),
            Token::Character(c) if is_ws(c) => self.in_body(Token::Character(c)),
            Token::StartTag(tag) if tag.name == "html" => self.in_body(Token::StartTag(tag)),
            Token::Eof => {}
            other => {
                self.error("unexpected-content-after-document");
                self.mode = InsertionMode::InBody;
                self.process(other);
            }
        }
    }

    fn after_after_frameset(&mut self, token: Token) {
        match token {
            Token::Comment(data) => self.insert_comment_in(&data, self.document),
            Token::Doctype(_) => self.in_body(token),
            Token::Character(c) if is_ws(c) => self.in_body(Token::Character(c)),
            Token::StartTag(tag) if tag.name == "html" => self.in_body(Token::StartTag(tag)),
            Token::StartTag(tag) if tag.name == "noframes" => {
                self.in_head(Token::StartTag(tag))
            }
            Token::Eof => {}
            _ => self.error("unexpected-content-after-frameset-document"),
        }
    }

    // shared machinery

    fn formatting_after_last_marker(&self, name: &str) -> bool {
        for entry in self.formatting.iter().rev() {
            match entry {
                super::FormatEntry::Marker => return false,
                super::FormatEntry::Element(f) if f.name == name => return true,
                super::FormatEntry::Element(_) => {}
            }
        }
        false
    }

    fn formatting_name_index(&self, name: &str) -> Option<usize> {
        self.formatting.iter().rposition(|e| match e {
            super::FormatEntry::Element(f) => f.name == name,
            super::FormatEntry::Marker => false,
        })
    }

    pub(crate) fn reset_insertion_mode(&mut self) {
        for (i, el) in self.open.iter().enumerate().rev() {
            let last = i == 0;
            match el.tag().as_str() {
                "select" => {
                    let mut mode = InsertionMode::InSelect;
                    if !last {
                        for ancestor in self.open[..i].iter().rev() {
                            if ancestor.tag() == "template" {
                                break;
                            }
                            if ancestor.tag() == "table" {
                                mode = InsertionMode::InSelectInTable;
                                break;
                            }
                        }
                    }
                    self.mode = mode;
                    return;
                }
                "td" | "th" if !last => {
                    self.mode = InsertionMode::InCell;
                    return;
                }
                "tr" => {
                    self.mode = InsertionMode::InRow;
                    return;
                }
                "tbody" | "thead" | "tfoot" => {
                    self.mode = InsertionMode::InTableBody;
                    return;
                }
                "caption" => {
                    self.mode = InsertionMode::InCaption;
                    return;
                }
                "colgroup" => {
                    self.mode = InsertionMode::InColumnGroup;
                    return;
                }
                "table" => {
                    self.mode = InsertionMode::InTable;
                    return;
                }
                "template" => {
                    self.mode = self
                        .template_modes
                        .last()
                        .copied()
                        .unwrap_or(InsertionMode::InBody);
                    return;
                }
                "head" if !last => {
                    self.mode = InsertionMode::InHead;
                    return;
                }
                "body" => {
                    self.mode = InsertionMode::InBody;
                    return;
                }
                "frameset" => {
                    self.mode = InsertionMode::InFrameset;
                    return;
                }
                "html" => {
                    self.mode = if self.head.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                    return;
                }
                _ if last => {
                    self.mode = InsertionMode::InBody;
                    return;
                }
                _ => {}
            }
        }
        self.mode = InsertionMode::InBody;
    }
}
