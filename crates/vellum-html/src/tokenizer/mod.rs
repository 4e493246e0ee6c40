//! The HTML5 tokenizer: a character-at-a-time state machine emitting
//! doctype, tag, comment, character, and EOF tokens.
//!
//! Parse errors never abort tokenization; they are recorded with their
//! source position and returned alongside the token stream.

mod entities;
mod state;
mod token;

pub use state::State;
pub use token::{Attribute, Doctype, Tag, Token};

use std::collections::VecDeque;
use vellum_tree::{ErrorCode, ParseError};

pub struct Tokenizer<'s> {
    input: &'s str,
    pos: usize,
    line: u32,
    column: u32,

    state: State,
    return_state: State,
    /// One-slot pushback implementing the WHATWG "reconsume" steps. The
    /// outer `Option` is slot occupancy; the inner is the character
    /// (`None` = EOF).
    pushback: Option<Option<char>>,

    pending: VecDeque<Token>,
    eof_emitted: bool,

    // current token under construction
    tag: Tag,
    tag_is_end: bool,
    attr_name: String,
    attr_value: String,
    attr_open: bool,
    comment: String,
    doctype: Doctype,

    temp: String,
    last_start_tag: String,
    char_ref_code: u32,

    /// CDATA sections are only legal in foreign content; the tree constructor
    /// flips this when the adjusted current node allows them.
    pub(crate) allow_cdata: bool,

    errors: Vec<ParseError>,
}

impl<'s> Tokenizer<'s> {
    pub fn new(input: &'s str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            state: State::Data,
            return_state: State::Data,
            pushback: None,
            pending: VecDeque::new(),
            eof_emitted: false,
            tag: Tag::default(),
            tag_is_end: false,
            attr_name: String::new(),
            attr_value: String::new(),
            attr_open: false,
            comment: String::new(),
            doctype: Doctype::default(),
            temp: String::new(),
            last_start_tag: String::new(),
            char_ref_code: 0,
            allow_cdata: false,
            errors: Vec::new(),
        }
    }

    /// Produce the next token. After the EOF token has been emitted, every
    /// further call returns EOF again.
    pub fn next_token(&mut self) -> Token {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return token;
            }
            if self.eof_emitted {
                return Token::Eof;
            }
            self.step();
        }
    }

    /// The tree constructor switches content models when it opens elements
    /// like `<textarea>`, `<style>`, `<script>`, or `<plaintext>`.
    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }

    /// Whether the end tag under construction matches the most recently
    /// emitted start tag.
    pub fn is_appropriate_end_tag(&self) -> bool {
        !self.last_start_tag.is_empty() && self.tag.name == self.last_start_tag
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    pub fn position(&self) -> (u32, u32) {
        (self.line, self.column)
    }

    // input primitives

    fn consume(&mut self) -> Option<char> {
        if let Some(slot) = self.pushback.take() {
            return slot;
        }
        let c = self.input[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn reconsume_in(&mut self, c: Option<char>, state: State) {
        self.pushback = Some(c);
        self.state = state;
    }

    /// Case-insensitive lookahead without consuming. Only valid when no
    /// pushback is pending.
    fn lookahead_ci(&self, expected: &str) -> bool {
        debug_assert!(self.pushback.is_none());
        let rest = &self.input[self.pos..];
        rest.len() >= expected.len()
            && rest[..expected.len()].eq_ignore_ascii_case(expected)
    }

    fn skip_ahead(&mut self, n_bytes: usize) {
        for _ in self.input[self.pos..self.pos + n_bytes].chars() {
            self.column += 1;
        }
        self.pos += n_bytes;
    }

    // error and emission helpers

    fn error(&mut self, message: &str) {
        self.error_coded(ErrorCode::UnexpectedToken, message);
    }

    fn error_coded(&mut self, code: ErrorCode, message: &str) {
        self.errors
            .push(ParseError::new(code, message, self.line, self.column));
    }

    fn eof_error(&mut self, message: &str) {
        self.error_coded(ErrorCode::UnexpectedEof, message);
    }

    fn emit_char(&mut self, c: char) {
        self.pending.push_back(Token::Character(c));
    }

    fn emit_str(&mut self, s: &str) {
        for c in s.chars() {
            self.emit_char(c);
        }
    }

    fn emit_eof(&mut self) {
        self.eof_emitted = true;
        self.pending.push_back(Token::Eof);
    }

    fn new_start_tag(&mut self) {
        self.tag = Tag::default();
        self.tag_is_end = false;
    }

    fn new_end_tag(&mut self) {
        self.tag = Tag::default();
        self.tag_is_end = true;
    }

    fn start_attr(&mut self) {
        self.finish_attr();
        self.attr_open = true;
    }

    fn finish_attr(&mut self) {
        if !self.attr_open {
            return;
        }
        self.attr_open = false;
        let name = std::mem::take(&mut self.attr_name);
        let value = std::mem::take(&mut self.attr_value);
        if self.tag.attrs.iter().any(|a| a.name == name) {
            self.error("duplicate-attribute");
        } else {
            self.tag.attrs.push(Attribute { name, value });
        }
    }

    fn emit_tag(&mut self) {
        self.finish_attr();
        let mut tag = std::mem::take(&mut self.tag);
        if self.tag_is_end {
            if !tag.attrs.is_empty() {
                self.error("end-tag-with-attributes");
                tag.attrs.clear();
            }
            if tag.self_closing {
                self.error("end-tag-with-trailing-solidus");
                tag.self_closing = false;
            }
            self.pending.push_back(Token::EndTag(tag));
        } else {
            self.last_start_tag = tag.name.clone();
            self.pending.push_back(Token::StartTag(tag));
        }
    }

    fn emit_comment(&mut self) {
        let data = std::mem::take(&mut self.comment);
        self.pending.push_back(Token::Comment(data));
    }

    fn emit_doctype(&mut self) {
        let doctype = std::mem::take(&mut self.doctype);
        self.pending.push_back(Token::Doctype(doctype));
    }

    // character-reference helpers

    fn charref_in_attribute(&self) -> bool {
        matches!(
            self.return_state,
            State::AttributeValueDoubleQuoted
                | State::AttributeValueSingleQuoted
                | State::AttributeValueUnquoted
        )
    }

    /// Flush the temporary buffer either into the attribute value under
    /// construction or as character tokens, per the return state.
    fn flush_char_ref(&mut self) {
        let temp = std::mem::take(&mut self.temp);
        if self.charref_in_attribute() {
            self.attr_value.push_str(&temp);
        } else {
            for c in temp.chars() {
                self.emit_char(c);
            }
        }
    }

    fn append_to_value_or_emit(&mut self, c: char) {
        if self.charref_in_attribute() {
            self.attr_value.push(c);
        } else {
            self.emit_char(c);
        }
    }

    // the state machine

    fn step(&mut self) {
        match self.state {
            State::Data => match self.consume() {
                Some('&') => {
                    self.return_state = State::Data;
                    self.state = State::CharacterReference;
                }
                Some('<') => self.state = State::TagOpen,
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.emit_char('\0');
                }
                Some(c) => self.emit_char(c),
                None => self.emit_eof(),
            },

            State::Rcdata => match self.consume() {
                Some('&') => {
                    self.return_state = State::Rcdata;
                    self.state = State::CharacterReference;
                }
                Some('<') => self.state = State::RcdataLessThanSign,
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.emit_char('\u{fffd}');
                }
                Some(c) => self.emit_char(c),
                None => self.emit_eof(),
            },

            State::Rawtext => match self.consume() {
                Some('<') => self.state = State::RawtextLessThanSign,
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.emit_char('\u{fffd}');
                }
                Some(c) => self.emit_char(c),
                None => self.emit_eof(),
            },

            State::ScriptData => match self.consume() {
                Some('<') => self.state = State::ScriptDataLessThanSign,
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.emit_char('\u{fffd}');
                }
                Some(c) => self.emit_char(c),
                None => self.emit_eof(),
            },

            State::Plaintext => match self.consume() {
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.emit_char('\u{fffd}');
                }
                Some(c) => self.emit_char(c),
                None => self.emit_eof(),
            },

            State::TagOpen => match self.consume() {
                Some('!') => self.state = State::MarkupDeclarationOpen,
                Some('/') => self.state = State::EndTagOpen,
                Some(c) if c.is_ascii_alphabetic() => {
                    self.new_start_tag();
                    self.reconsume_in(Some(c), State::TagName);
                }
                Some('?') => {
                    self.error("unexpected-question-mark-instead-of-tag-name");
                    self.comment.clear();
                    self.reconsume_in(Some('?'), State::BogusComment);
                }
                Some(c) => {
                    self.error("invalid-first-character-of-tag-name");
                    self.emit_char('<');
                    self.reconsume_in(Some(c), State::Data);
                }
                None => {
                    self.eof_error("eof-before-tag-name");
                    self.emit_char('<');
                    self.emit_eof();
                }
            },

            State::EndTagOpen => match self.consume() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.new_end_tag();
                    self.reconsume_in(Some(c), State::TagName);
                }
                Some('>') => {
                    self.error("missing-end-tag-name");
                    self.state = State::Data;
                }
                Some(c) => {
                    self.error("invalid-first-character-of-tag-name");
                    self.comment.clear();
                    self.reconsume_in(Some(c), State::BogusComment);
                }
                None => {
                    self.eof_error("eof-before-tag-name");
                    self.emit_str("</");
                    self.emit_eof();
                }
            },

            State::TagName => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => self.state = State::BeforeAttributeName,
                Some('/') => self.state = State::SelfClosingStartTag,
                Some('>') => {
                    self.state = State::Data;
                    self.emit_tag();
                }
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.tag.name.push('\u{fffd}');
                }
                Some(c) => self.tag.name.push(c.to_ascii_lowercase()),
                None => {
                    self.eof_error("eof-in-tag");
                    self.emit_eof();
                }
            },

            State::RcdataLessThanSign => match self.consume() {
                Some('/') => {
                    self.temp.clear();
                    self.state = State::RcdataEndTagOpen;
                }
                c => {
                    self.emit_char('<');
                    self.reconsume_in(c, State::Rcdata);
                }
            },

            State::RcdataEndTagOpen => match self.consume() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.new_end_tag();
                    self.reconsume_in(Some(c), State::RcdataEndTagName);
                }
                c => {
                    self.emit_str("</");
                    self.reconsume_in(c, State::Rcdata);
                }
            },

            State::RcdataEndTagName => self.raw_end_tag_name(State::Rcdata),

            State::RawtextLessThanSign => match self.consume() {
                Some('/') => {
                    self.temp.clear();
                    self.state = State::RawtextEndTagOpen;
                }
                c => {
                    self.emit_char('<');
                    self.reconsume_in(c, State::Rawtext);
                }
            },

            State::RawtextEndTagOpen => match self.consume() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.new_end_tag();
                    self.reconsume_in(Some(c), State::RawtextEndTagName);
                }
                c => {
                    self.emit_str("</");
                    self.reconsume_in(c, State::Rawtext);
                }
            },

            State::RawtextEndTagName => self.raw_end_tag_name(State::Rawtext),

            State::ScriptDataLessThanSign => match self.consume() {
                Some('/') => {
                    self.temp.clear();
                    self.state = State::ScriptDataEndTagOpen;
                }
                Some('!') => {
                    self.state = State::ScriptDataEscapeStart;
                    self.emit_str("<!");
                }
                c => {
                    self.emit_char('<');
                    self.reconsume_in(c, State::ScriptData);
                }
            },

            State::ScriptDataEndTagOpen => match self.consume() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.new_end_tag();
                    self.reconsume_in(Some(c), State::ScriptDataEndTagName);
                }
                c => {
                    self.emit_str("</");
                    self.reconsume_in(c, State::ScriptData);
                }
            },

            State::ScriptDataEndTagName => self.raw_end_tag_name(State::ScriptData),

            State::ScriptDataEscapeStart => match self.consume() {
                Some('-') => {
                    self.state = State::ScriptDataEscapeStartDash;
                    self.emit_char('-');
                }
                c => self.reconsume_in(c, State::ScriptData),
            },

            State::ScriptDataEscapeStartDash => match self.consume() {
                Some('-') => {
                    self.state = State::ScriptDataEscapedDashDash;
                    self.emit_char('-');
                }
                c => self.reconsume_in(c, State::ScriptData),
            },

            State::ScriptDataEscaped => match self.consume() {
                Some('-') => {
                    self.state = State::ScriptDataEscapedDash;
                    self.emit_char('-');
                }
                Some('<') => self.state = State::ScriptDataEscapedLessThanSign,
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.emit_char('\u{fffd}');
                }
                Some(c) => self.emit_char(c),
                None => {
                    self.eof_error("eof-in-script-html-comment-like-text");
                    self.emit_eof();
                }
            },

            State::ScriptDataEscapedDash => match self.consume() {
                Some('-') => {
                    self.state = State::ScriptDataEscapedDashDash;
                    self.emit_char('-');
                }
                Some('<') => self.state = State::ScriptDataEscapedLessThanSign,
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.state = State::ScriptDataEscaped;
                    self.emit_char('\u{fffd}');
                }
                Some(c) => {
                    self.state = State::ScriptDataEscaped;
                    self.emit_char(c);
                }
                None => {
                    self.eof_error("eof-in-script-html-comment-like-text");
                    self.emit_eof();
                }
            },

            State::ScriptDataEscapedDashDash => match self.consume() {
                Some('-') => self.emit_char('-'),
                Some('<') => self.state = State::ScriptDataEscapedLessThanSign,
                Some('>') => {
                    self.state = State::ScriptData;
                    self.emit_char('>');
                }
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.state = State::ScriptDataEscaped;
                    self.emit_char('\u{fffd}');
                }
                Some(c) => {
                    self.state = State::ScriptDataEscaped;
                    self.emit_char(c);
                }
                None => {
                    self.eof_error("eof-in-script-html-comment-like-text");
                    self.emit_eof();
                }
            },

            State::ScriptDataEscapedLessThanSign => match self.consume() {
                Some('/') => {
                    self.temp.clear();
                    self.state = State::ScriptDataEscapedEndTagOpen;
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    self.temp.clear();
                    self.emit_char('<');
                    self.reconsume_in(Some(c), State::ScriptDataDoubleEscapeStart);
                }
                c => {
                    self.emit_char('<');
                    self.reconsume_in(c, State::ScriptDataEscaped);
                }
            },

            State::ScriptDataEscapedEndTagOpen => match self.consume() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.new_end_tag();
                    self.reconsume_in(Some(c), State::ScriptDataEscapedEndTagName);
                }
                c => {
                    self.emit_str("</");
                    self.reconsume_in(c, State::ScriptDataEscaped);
                }
            },

            State::ScriptDataEscapedEndTagName => self.raw_end_tag_name(State::ScriptDataEscaped),

            State::ScriptDataDoubleEscapeStart => match self.consume() {
                Some(c @ ('\t' | '\n' | '\u{c}' | ' ' | '/' | '>')) => {
                    if self.temp == "script" {
                        self.state = State::ScriptDataDoubleEscaped;
                    } else {
                        self.state = State::ScriptDataEscaped;
                    }
                    self.emit_char(c);
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    self.temp.push(c.to_ascii_lowercase());
                    self.emit_char(c);
                }
                c => self.reconsume_in(c, State::ScriptDataEscaped),
            },

            State::ScriptDataDoubleEscaped => match self.consume() {
                Some('-') => {
                    self.state = State::ScriptDataDoubleEscapedDash;
                    self.emit_char('-');
                }
                Some('<') => {
                    self.state = State::ScriptDataDoubleEscapedLessThanSign;
                    self.emit_char('<');
                }
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.emit_char('\u{fffd}');
                }
                Some(c) => self.emit_char(c),
                None => {
                    self.eof_error("eof-in-script-html-comment-like-text");
                    self.emit_eof();
                }
            },

            State::ScriptDataDoubleEscapedDash => match self.consume() {
                Some('-') => {
                    self.state = State::ScriptDataDoubleEscapedDashDash;
                    self.emit_char('-');
                }
                Some('<') => {
                    self.state = State::ScriptDataDoubleEscapedLessThanSign;
                    self.emit_char('<');
                }
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.state = State::ScriptDataDoubleEscaped;
                    self.emit_char('\u{fffd}');
                }
                Some(c) => {
                    self.state = State::ScriptDataDoubleEscaped;
                    self.emit_char(c);
                }
                None => {
                    self.eof_error("eof-in-script-html-comment-like-text");
                    self.emit_eof();
                }
            },

            State::ScriptDataDoubleEscapedDashDash => match self.consume() {
                Some('-') => self.emit_char('-'),
                Some('<') => {
                    self.state = State::ScriptDataDoubleEscapedLessThanSign;
                    self.emit_char('<');
                }
                Some('>') => {
                    self.state = State::ScriptData;
                    self.emit_char('>');
                }
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.state = State::ScriptDataDoubleEscaped;
                    self.emit_char('\u{fffd}');
                }
                Some(c) => {
                    self.state = State::ScriptDataDoubleEscaped;
                    self.emit_char(c);
                }
                None => {
                    self.eof_error("eof-in-script-html-comment-like-text");
                    self.emit_eof();
                }
            },

            State::ScriptDataDoubleEscapedLessThanSign => match self.consume() {
                Some('/') => {
                    self.temp.clear();
                    self.state = State::ScriptDataDoubleEscapeEnd;
                    self.emit_char('/');
                }
                c => self.reconsume_in(c, State::ScriptDataDoubleEscaped),
            },

            State::ScriptDataDoubleEscapeEnd => match self.consume() {
                Some(c @ ('\t' | '\n' | '\u{c}' | ' ' | '/' | '>')) => {
                    if self.temp == "script" {
                        self.state = State::ScriptDataEscaped;
                    } else {
                        self.state = State::ScriptDataDoubleEscaped;
                    }
                    self.emit_char(c);
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    self.temp.push(c.to_ascii_lowercase());
                    self.emit_char(c);
                }
                c => self.reconsume_in(c, State::ScriptDataDoubleEscaped),
            },

            State::BeforeAttributeName => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => {}
                c @ (Some('/' | '>') | None) => self.reconsume_in(c, State::AfterAttributeName),
                Some('=') => {
                    self.error("unexpected-equals-sign-before-attribute-name");
                    self.start_attr();
                    self.attr_name.push('=');
                    self.state = State::AttributeName;
                }
                Some(c) => {
                    self.start_attr();
                    self.reconsume_in(Some(c), State::AttributeName);
                }
            },

            State::AttributeName => match self.consume() {
                c @ (Some('\t' | '\n' | '\u{c}' | ' ' | '/' | '>') | None) => {
                    self.reconsume_in(c, State::AfterAttributeName)
                }
                Some('=') => self.state = State::BeforeAttributeValue,
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.attr_name.push('\u{fffd}');
                }
                Some(c @ ('"' | '\'' | '<')) => {
                    self.error("unexpected-character-in-attribute-name");
                    self.attr_name.push(c);
                }
                Some(c) => self.attr_name.push(c.to_ascii_lowercase()),
            },

            State::AfterAttributeName => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => {}
                Some('/') => self.state = State::SelfClosingStartTag,
                Some('=') => self.state = State::BeforeAttributeValue,
                Some('>') => {
                    self.state = State::Data;
                    self.emit_tag();
                }
                Some(c) => {
                    self.start_attr();
                    self.reconsume_in(Some(c), State::AttributeName);
                }
                None => {
                    self.eof_error("eof-in-tag");
                    self.emit_eof();
                }
            },

            State::BeforeAttributeValue => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => {}
                Some('"') => self.state = State::AttributeValueDoubleQuoted,
                Some('\'') => self.state = State::AttributeValueSingleQuoted,
                Some('>') => {
                    self.error("missing-attribute-value");
                    self.state = State::Data;
                    self.emit_tag();
                }
                c => self.reconsume_in(c, State::AttributeValueUnquoted),
            },

            State::AttributeValueDoubleQuoted => match self.consume() {
                Some('"') => self.state = State::AfterAttributeValueQuoted,
                Some('&') => {
                    self.return_state = State::AttributeValueDoubleQuoted;
                    self.state = State::CharacterReference;
                }
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.attr_value.push('\u{fffd}');
                }
                Some(c) => self.attr_value.push(c),
                None => {
                    self.eof_error("eof-in-tag");
                    self.emit_eof();
                }
            },

            State::AttributeValueSingleQuoted => match self.consume() {
                Some('\'') => self.state = State::AfterAttributeValueQuoted,
                Some('&') => {
                    self.return_state = State::AttributeValueSingleQuoted;
                    self.state = State::CharacterReference;
                }
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.attr_value.push('\u{fffd}');
                }
                Some(c) => self.attr_value.push(c),
                None => {
                    self.eof_error("eof-in-tag");
                    self.emit_eof();
                }
            },

            State::AttributeValueUnquoted => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => self.state = State::BeforeAttributeName,
                Some('&') => {
                    self.return_state = State::AttributeValueUnquoted;
                    self.state = State::CharacterReference;
                }
                Some('>') => {
                    self.state = State::Data;
                    self.emit_tag();
                }
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.attr_value.push('\u{fffd}');
                }
                Some(c @ ('"' | '\'' | '<' | '=' | '`')) => {
                    self.error("unexpected-character-in-unquoted-attribute-value");
                    self.attr_value.push(c);
                }
                Some(c) => self.attr_value.push(c),
                None => {
                    self.eof_error("eof-in-tag");
                    self.emit_eof();
                }
            },

            State::AfterAttributeValueQuoted => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => self.state = State::BeforeAttributeName,
                Some('/') => self.state = State::SelfClosingStartTag,
                Some('>') => {
                    self.state = State::Data;
                    self.emit_tag();
                }
                Some(c) => {
                    self.error("missing-whitespace-between-attributes");
                    self.reconsume_in(Some(c), State::BeforeAttributeName);
                }
                None => {
                    self.eof_error("eof-in-tag");
                    self.emit_eof();
                }
            },

            State::SelfClosingStartTag => match self.consume() {
                Some('>') => {
                    self.tag.self_closing = true;
                    self.state = State::Data;
                    self.emit_tag();
                }
                Some(c) => {
                    self.error("unexpected-solidus-in-tag");
                    self.reconsume_in(Some(c), State::BeforeAttributeName);
                }
                None => {
                    self.eof_error("eof-in-tag");
                    self.emit_eof();
                }
            },

            State::BogusComment => match self.consume() {
                Some('>') => {
                    self.state = State::Data;
                    self.emit_comment();
                }
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.comment.push('\u{fffd}');
                }
                Some(c) => self.comment.push(c),
                None => {
                    self.emit_comment();
                    self.emit_eof();
                }
            },

            State::MarkupDeclarationOpen => {
                if self.lookahead_ci("--") {
                    self.skip_ahead(2);
                    self.comment.clear();
                    self.state = State::CommentStart;
                } else if self.lookahead_ci("DOCTYPE") {
                    self.skip_ahead(7);
                    self.state = State::Doctype;
                } else if self.lookahead_ci("[CDATA[") {
                    self.skip_ahead(7);
                    if self.allow_cdata {
                        self.state = State::CdataSection;
                    } else {
                        self.error("cdata-in-html-content");
                        self.comment = "[CDATA[".to_string();
                        self.state = State::BogusComment;
                    }
                } else {
                    self.error("incorrectly-opened-comment");
                    self.comment.clear();
                    self.state = State::BogusComment;
                }
            }

            State::CommentStart => match self.consume() {
                Some('-') => self.state = State::CommentStartDash,
                Some('>') => {
                    self.error("abrupt-closing-of-empty-comment");
                    self.state = State::Data;
                    self.emit_comment();
                }
                c => self.reconsume_in(c, State::Comment),
            },

            State::CommentStartDash => match self.consume() {
                Some('-') => self.state = State::CommentEnd,
                Some('>') => {
                    self.error("abrupt-closing-of-empty-comment");
                    self.state = State::Data;
                    self.emit_comment();
                }
                Some(c) => {
                    self.comment.push('-');
                    self.reconsume_in(Some(c), State::Comment);
                }
                None => {
                    self.eof_error("eof-in-comment");
                    self.emit_comment();
                    self.emit_eof();
                }
            },

            State::Comment => match self.consume() {
                Some('<') => {
                    self.comment.push('<');
                    self.state = State::CommentLessThanSign;
                }
                Some('-') => self.state = State::CommentEndDash,
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.comment.push('\u{fffd}');
                }
                Some(c) => self.comment.push(c),
                None => {
                    self.eof_error("eof-in-comment");
                    self.emit_comment();
                    self.emit_eof();
                }
            },

            State::CommentLessThanSign => match self.consume() {
                Some('!') => {
                    self.comment.push('!');
                    self.state = State::CommentLessThanSignBang;
                }
                Some('<') => self.comment.push('<'),
                c => self.reconsume_in(c, State::Comment),
            },

            State::CommentLessThanSignBang => match self.consume() {
                Some('-') => self.state = State::CommentLessThanSignBangDash,
                c => self.reconsume_in(c, State::Comment),
            },

            State::CommentLessThanSignBangDash => match self.consume() {
                Some('-') => self.state = State::CommentLessThanSignBangDashDash,
                c => self.reconsume_in(c, State::CommentEndDash),
            },

            State::CommentLessThanSignBangDashDash => match self.consume() {
                c @ (Some('>') | None) => self.reconsume_in(c, State::CommentEnd),
                c => {
                    self.error("nested-comment");
                    self.reconsume_in(c, State::CommentEnd);
                }
            },

            State::CommentEndDash => match self.consume() {
                Some('-') => self.state = State::CommentEnd,
                Some(c) => {
                    self.comment.push('-');
                    self.reconsume_in(Some(c), State::Comment);
                }
                None => {
                    self.eof_error("eof-in-comment");
                    self.emit_comment();
                    self.emit_eof();
                }
            },

            State::CommentEnd => match self.consume() {
                Some('>') => {
                    self.state = State::Data;
                    self.emit_comment();
                }
                Some('!') => self.state = State::CommentEndBang,
                Some('-') => self.comment.push('-'),
                Some(c) => {
                    self.comment.push_str("--");
                    self.reconsume_in(Some(c), State::Comment);
                }
                None => {
                    self.eof_error("eof-in-comment");
                    self.emit_comment();
                    self.emit_eof();
                }
            },

            State::CommentEndBang => match self.consume() {
                Some('-') => {
                    self.comment.push_str("--!");
                    self.state = State::CommentEndDash;
                }
                Some('>') => {
                    self.error("incorrectly-closed-comment");
                    self.state = State::Data;
                    self.emit_comment();
                }
                Some(c) => {
                    self.comment.push_str("--!");
                    self.reconsume_in(Some(c), State::Comment);
                }
                None => {
                    self.eof_error("eof-in-comment");
                    self.emit_comment();
                    self.emit_eof();
                }
            },

            State::Doctype => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => self.state = State::BeforeDoctypeName,
                Some('>') => self.reconsume_in(Some('>'), State::BeforeDoctypeName),
                Some(c) => {
                    self.error("missing-whitespace-before-doctype-name");
                    self.reconsume_in(Some(c), State::BeforeDoctypeName);
                }
                None => {
                    self.eof_error("eof-in-doctype");
                    self.doctype = Doctype {
                        force_quirks: true,
                        ..Doctype::default()
                    };
                    self.emit_doctype();
                    self.emit_eof();
                }
            },

            State::BeforeDoctypeName => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => {}
                Some('\0') => {
                    self.error("unexpected-null-character");
                    self.doctype = Doctype::default();
                    self.doctype.name = Some("\u{fffd}".to_string());
                    self.state = State::DoctypeName;
                }
                Some('>') => {
                    self.error("missing-doctype-name");
                    self.doctype = Doctype {
                        force_quirks: true,
                        ..Doctype::default()
                    };
                    self.state = State::Data;
                    self.emit_doctype();
                }
                Some(c) => {
                    self.doctype = Doctype::default();
                    self.doctype.name = Some(c.to_ascii_lowercase().to_string());
                    self.state = State::DoctypeName;
                }
                None => {
                    self.eof_error("eof-in-doctype");
                    self.doctype = Doctype {
                        force_quirks: true,
                        ..Doctype::default()
                    };
                    self.emit_doctype();
                    self.emit_eof();
                }
            },

            State::DoctypeName => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => self.state = State::AfterDoctypeName,
                Some('>') => {
                    self.state = State::Data;
                    self.emit_doctype();
                }
                Some('\0') => {
                    self.error("unexpected-null-character");
                    if let Some(name) = &mut self.doctype.name {
                        name.push('\u{fffd}');
                    }
                }
                Some(c) => {
                    if let Some(name) = &mut self.doctype.name {
                        name.push(c.to_ascii_lowercase());
                    }
                }
                None => {
                    self.eof_error("eof-in-doctype");
                    self.doctype.force_quirks = true;
                    self.emit_doctype();
                    self.emit_eof();
                }
            },

            State::AfterDoctypeName => {
                // PUBLIC / SYSTEM keywords need lookahead from a clean cursor.
                match self.consume() {
                    Some('\t' | '\n' | '\u{c}' | ' ') => {}
                    Some('>') => {
                        self.state = State::Data;
                        self.emit_doctype();
                    }
                    Some(c) => {
                        let keyword_started = c.to_ascii_uppercase();
                        if keyword_started == 'P' && self.lookahead_ci("UBLIC") {
                            self.skip_ahead(5);
                            self.state = State::AfterDoctypePublicKeyword;
                        } else if keyword_started == 'S' && self.lookahead_ci("YSTEM") {
                            self.skip_ahead(5);
                            self.state = State::AfterDoctypeSystemKeyword;
                        } else {
                            self.error("invalid-character-sequence-after-doctype-name");
                            self.doctype.force_quirks = true;
                            self.reconsume_in(Some(c), State::BogusDoctype);
                        }
                    }
                    None => {
                        self.eof_error("eof-in-doctype");
                        self.doctype.force_quirks = true;
                        self.emit_doctype();
                        self.emit_eof();
                    }
                }
            }

            State::AfterDoctypePublicKeyword => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => {
                    self.state = State::BeforeDoctypePublicIdentifier
                }
                Some('"') => {
                    self.error("missing-whitespace-after-doctype-public-keyword");
                    self.doctype.public_id = Some(String::new());
                    self.state = State::DoctypePublicIdentifierDoubleQuoted;
                }
                Some('\'') => {
                    self.error("missing-whitespace-after-doctype-public-keyword");
                    self.doctype.public_id = Some(String::new());
                    self.state = State::DoctypePublicIdentifierSingleQuoted;
                }
                Some('>') => {
                    self.error("missing-doctype-public-identifier");
                    self.doctype.force_quirks = true;
                    self.state = State::Data;
                    self.emit_doctype();
                }
                Some(c) => {
                    self.error("missing-quote-before-doctype-public-identifier");
                    self.doctype.force_quirks = true;
                    self.reconsume_in(Some(c), State::BogusDoctype);
                }
                None => {
                    self.eof_error("eof-in-doctype");
                    self.doctype.force_quirks = true;
                    self.emit_doctype();
                    self.emit_eof();
                }
            },

            State::BeforeDoctypePublicIdentifier => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => {}
                Some('"') => {
                    self.doctype.public_id = Some(String::new());
                    self.state = State::DoctypePublicIdentifierDoubleQuoted;
                }
                Some('\'') => {
                    self.doctype.public_id = Some(String::new());
                    self.state = State::DoctypePublicIdentifierSingleQuoted;
                }
                Some('>') => {
                    self.error("missing-doctype-public-identifier");
                    self.doctype.force_quirks = true;
                    self.state = State::Data;
                    self.emit_doctype();
                }
                Some(c) => {
                    self.error("missing-quote-before-doctype-public-identifier");
                    self.doctype.force_quirks = true;
                    self.reconsume_in(Some(c), State::BogusDoctype);
                }
                None => {
                    self.eof_error("eof-in-doctype");
                    self.doctype.force_quirks = true;
                    self.emit_doctype();
                    self.emit_eof();
                }
            },

            State::DoctypePublicIdentifierDoubleQuoted => {
                self.doctype_identifier('"', true, State::AfterDoctypePublicIdentifier)
            }
            State::DoctypePublicIdentifierSingleQuoted => {
                self.doctype_identifier('\'', true, State::AfterDoctypePublicIdentifier)
            }

            State::AfterDoctypePublicIdentifier => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => {
                    self.state = State::BetweenDoctypePublicAndSystemIdentifiers
                }
                Some('>') => {
                    self.state = State::Data;
                    self.emit_doctype();
                }
                Some('"') => {
                    self.error("missing-whitespace-between-doctype-public-and-system-identifiers");
                    self.doctype.system_id = Some(String::new());
                    self.state = State::DoctypeSystemIdentifierDoubleQuoted;
                }
                Some('\'') => {
                    self.error("missing-whitespace-between-doctype-public-and-system-identifiers");
                    self.doctype.system_id = Some(String::new());
                    self.state = State::DoctypeSystemIdentifierSingleQuoted;
                }
                Some(c) => {
                    self.error("missing-quote-before-doctype-system-identifier");
                    self.doctype.force_quirks = true;
                    self.reconsume_in(Some(c), State::BogusDoctype);
                }
                None => {
                    self.eof_error("eof-in-doctype");
                    self.doctype.force_quirks = true;
                    self.emit_doctype();
                    self.emit_eof();
                }
            },

            State::BetweenDoctypePublicAndSystemIdentifiers => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => {}
                Some('>') => {
                    self.state = State::Data;
                    self.emit_doctype();
                }
                Some('"') => {
                    self.doctype.system_id = Some(String::new());
                    self.state = State::DoctypeSystemIdentifierDoubleQuoted;
                }
                Some('\'') => {
                    self.doctype.system_id = Some(String::new());
                    self.state = State::DoctypeSystemIdentifierSingleQuoted;
                }
                Some(c) => {
                    self.error("missing-quote-before-doctype-system-identifier");
                    self.doctype.force_quirks = true;
                    self.reconsume_in(Some(c), State::BogusDoctype);
                }
                None => {
                    self.eof_error("eof-in-doctype");
                    self.doctype.force_quirks = true;
                    self.emit_doctype();
                    self.emit_eof();
                }
            },

            State::AfterDoctypeSystemKeyword => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => {
                    self.state = State::BeforeDoctypeSystemIdentifier
                }
                Some('"') => {
                    self.error("missing-whitespace-after-doctype-system-keyword");
                    self.doctype.system_id = Some(String::new());
                    self.state = State::DoctypeSystemIdentifierDoubleQuoted;
                }
                Some('\'') => {
                    self.error("missing-whitespace-after-doctype-system-keyword");
                    self.doctype.system_id = Some(String::new());
                    self.state = State::DoctypeSystemIdentifierSingleQuoted;
                }
                Some('>') => {
                    self.error("missing-doctype-system-identifier");
                    self.doctype.force_quirks = true;
                    self.state = State::Data;
                    self.emit_doctype();
                }
                Some(c) => {
                    self.error("missing-quote-before-doctype-system-identifier");
                    self.doctype.force_quirks = true;
                    self.reconsume_in(Some(c), State::BogusDoctype);
                }
                None => {
                    self.eof_error("eof-in-doctype");
                    self.doctype.force_quirks = true;
                    self.emit_doctype();
                    self.emit_eof();
                }
            },

            State::BeforeDoctypeSystemIdentifier => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => {}
                Some('"') => {
                    self.doctype.system_id = Some(String::new());
                    self.state = State::DoctypeSystemIdentifierDoubleQuoted;
                }
                Some('\'') => {
                    self.doctype.system_id = Some(String::new());
                    self.state = State::DoctypeSystemIdentifierSingleQuoted;
                }
                Some('>') => {
                    self.error("missing-doctype-system-identifier");
                    self.doctype.force_quirks = true;
                    self.state = State::Data;
                    self.emit_doctype();
                }
                Some(c) => {
                    self.error("missing-quote-before-doctype-system-identifier");
                    self.doctype.force_quirks = true;
                    self.reconsume_in(Some(c), State::BogusDoctype);
                }
                None => {
                    self.eof_error("eof-in-doctype");
                    self.doctype.force_quirks = true;
                    self.emit_doctype();
                    self.emit_eof();
                }
            },

            State::DoctypeSystemIdentifierDoubleQuoted => {
                self.doctype_identifier('"', false, State::AfterDoctypeSystemIdentifier)
            }
            State::DoctypeSystemIdentifierSingleQuoted => {
                self.doctype_identifier('\'', false, State::AfterDoctypeSystemIdentifier)
            }

            State::AfterDoctypeSystemIdentifier => match self.consume() {
                Some('\t' | '\n' | '\u{c}' | ' ') => {}
                Some('>') => {
                    self.state = State::Data;
                    self.emit_doctype();
                }
                Some(c) => {
                    self.error("unexpected-character-after-doctype-system-identifier");
                    self.reconsume_in(Some(c), State::BogusDoctype);
                }
                None => {
                    self.eof_error("eof-in-doctype");
                    self.doctype.force_quirks = true;
                    self.emit_doctype();
                    self.emit_eof();
                }
            },

            State::BogusDoctype => match self.consume() {
                Some('>') => {
                    self.state = State::Data;
                    self.emit_doctype();
                }
                Some('\0') => self.error("unexpected-null-character"),
                Some(_) => {}
                None => {
                    self.emit_doctype();
                    self.emit_eof();
                }
            },

            State::CdataSection => match self.consume() {
                Some(']') => self.state = State::CdataSectionBracket,
                Some(c) => self.emit_char(c),
                None => {
                    self.eof_error("eof-in-cdata");
                    self.emit_eof();
                }
            },

            State::CdataSectionBracket => match self.consume() {
                Some(']') => self.state = State::CdataSectionEnd,
                c => {
                    self.emit_char(']');
                    self.reconsume_in(c, State::CdataSection);
                }
            },

            State::CdataSectionEnd => match self.consume() {
                Some(']') => self.emit_char(']'),
                Some('>') => self.state = State::Data,
                c => {
                    self.emit_str("]]");
                    self.reconsume_in(c, State::CdataSection);
                }
            },

            State::CharacterReference => {
                self.temp.clear();
                self.temp.push('&');
                match self.consume() {
                    Some(c) if c.is_ascii_alphanumeric() => {
                        self.reconsume_in(Some(c), State::NamedCharacterReference);
                    }
                    Some('#') => {
                        self.temp.push('#');
                        self.state = State::NumericCharacterReference;
                    }
                    c => {
                        self.flush_char_ref();
                        self.reconsume_in(c, self.return_state);
                    }
                }
            }

            State::NamedCharacterReference => self.named_character_reference(),

            State::AmbiguousAmpersand => match self.consume() {
                Some(c) if c.is_ascii_alphanumeric() => self.append_to_value_or_emit(c),
                Some(';') => {
                    self.error_coded(
                        ErrorCode::InvalidCharacterReference,
                        "unknown-named-character-reference",
                    );
                    self.reconsume_in(Some(';'), self.return_state);
                }
                c => self.reconsume_in(c, self.return_state),
            },

            State::NumericCharacterReference => {
                self.char_ref_code = 0;
                match self.consume() {
                    Some(c @ ('x' | 'X')) => {
                        self.temp.push(c);
                        self.state = State::HexadecimalCharacterReferenceStart;
                    }
                    c => self.reconsume_in(c, State::DecimalCharacterReferenceStart),
                }
            }

            State::HexadecimalCharacterReferenceStart => match self.consume() {
                Some(c) if c.is_ascii_hexdigit() => {
                    self.reconsume_in(Some(c), State::HexadecimalCharacterReference)
                }
                c => {
                    self.error_coded(
                        ErrorCode::InvalidCharacterReference,
                        "absence-of-digits-in-numeric-character-reference",
                    );
                    self.flush_char_ref();
                    self.reconsume_in(c, self.return_state);
                }
            },

            State::DecimalCharacterReferenceStart => match self.consume() {
                Some(c) if c.is_ascii_digit() => {
                    self.reconsume_in(Some(c), State::DecimalCharacterReference)
                }
                c => {
                    self.error_coded(
                        ErrorCode::InvalidCharacterReference,
                        "absence-of-digits-in-numeric-character-reference",
                    );
                    self.flush_char_ref();
                    self.reconsume_in(c, self.return_state);
                }
            },

            State::HexadecimalCharacterReference => match self.consume() {
                Some(c) if c.is_ascii_hexdigit() => {
                    self.char_ref_code = self
                        .char_ref_code
                        .saturating_mul(16)
                        .saturating_add(c.to_digit(16).unwrap_or(0));
                }
                Some(';') => self.state = State::NumericCharacterReferenceEnd,
                c => {
                    self.error_coded(
                        ErrorCode::InvalidCharacterReference,
                        "missing-semicolon-after-character-reference",
                    );
                    self.reconsume_in(c, State::NumericCharacterReferenceEnd);
                }
            },

            State::DecimalCharacterReference => match self.consume() {
                Some(c) if c.is_ascii_digit() => {
                    self.char_ref_code = self
                        .char_ref_code
                        .saturating_mul(10)
                        .saturating_add(c.to_digit(10).unwrap_or(0));
                }
                Some(';') => self.state = State::NumericCharacterReferenceEnd,
                c => {
                    self.error_coded(
                        ErrorCode::InvalidCharacterReference,
                        "missing-semicolon-after-character-reference",
                    );
                    self.reconsume_in(c, State::NumericCharacterReferenceEnd);
                }
            },

            State::NumericCharacterReferenceEnd => {
                let (resolved, error) = entities::resolve_numeric(self.char_ref_code);
                if let Some(message) = error {
                    self.error_coded(ErrorCode::InvalidCharacterReference, message);
                }
                self.temp.clear();
                self.temp.push(resolved);
                self.flush_char_ref();
                self.state = self.return_state;
            }
        }
    }

    /// Shared RCDATA / RAWTEXT / script-data end-tag-name handling. `fallback`
    /// is the content state re-entered when the name is not appropriate.
    fn raw_end_tag_name(&mut self, fallback: State) {
        match self.consume() {
            Some('\t' | '\n' | '\u{c}' | ' ') if self.is_appropriate_end_tag() => {
                self.state = State::BeforeAttributeName;
            }
            Some('/') if self.is_appropriate_end_tag() => {
                self.state = State::SelfClosingStartTag;
            }
            Some('>') if self.is_appropriate_end_tag() => {
                self.state = State::Data;
                self.emit_tag();
            }
            Some(c) if c.is_ascii_alphabetic() => {
                self.tag.name.push(c.to_ascii_lowercase());
                self.temp.push(c);
            }
            c => {
                self.emit_str("</");
                let temp = std::mem::take(&mut self.temp);
                self.emit_str(&temp);
                self.reconsume_in(c, fallback);
            }
        }
    }

    /// Shared quoted public/system identifier accumulation.
    fn doctype_identifier(&mut self, quote: char, public: bool, next: State) {
        match self.consume() {
            Some(c) if c == quote => self.state = next,
            Some('\0') => {
                self.error("unexpected-null-character");
                self.push_doctype_identifier(public, '\u{fffd}');
            }
            Some('>') => {
                self.error(if public {
                    "abrupt-doctype-public-identifier"
                } else {
                    "abrupt-doctype-system-identifier"
                });
                self.doctype.force_quirks = true;
                self.state = State::Data;
                self.emit_doctype();
            }
            Some(c) => self.push_doctype_identifier(public, c),
            None => {
                self.eof_error("eof-in-doctype");
                self.doctype.force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
        }
    }

    fn push_doctype_identifier(&mut self, public: bool, c: char) {
        let id = if public {
            &mut self.doctype.public_id
        } else {
            &mut self.doctype.system_id
        };
        if let Some(id) = id {
            id.push(c);
        }
    }

    /// Longest-match resolution against the named entity table.
    fn named_character_reference(&mut self) {
        // Gather the maximal alphanumeric run. The first character arrives
        // through the pushback slot.
        let mut word = String::new();
        if let Some(Some(c)) = self.pushback.take() {
            word.push(c);
        }
        while word.len() < entities::MAX_NAME_LEN {
            match self.input[self.pos..].chars().next() {
                Some(c) if c.is_ascii_alphanumeric() => {
                    word.push(c);
                    self.pos += c.len_utf8();
                    self.column += 1;
                }
                _ => break,
            }
        }
        let has_semicolon = self.input[self.pos..].starts_with(';');

        if has_semicolon {
            if let Some(expansion) = entities::lookup(&word) {
                self.pos += 1;
                self.column += 1;
                self.temp.clear();
                self.temp.push_str(expansion);
                self.flush_char_ref();
                self.state = self.return_state;
                return;
            }
        }

        // Legacy entities resolve without their semicolon; in attributes a
        // following `=` or alphanumeric suppresses the match.
        let mut best: Option<(usize, &'static str)> = None;
        for len in (1..=word.len()).rev() {
            let prefix = &word[..len];
            if entities::matches_without_semicolon(prefix) {
                best = Some((len, entities::lookup(prefix).unwrap_or("")));
                break;
            }
        }
        if let Some((len, expansion)) = best {
            let next_after = word[len..].chars().next().or_else(|| {
                self.input[self.pos..].chars().next()
            });
            let suppressed = self.charref_in_attribute()
                && matches!(next_after, Some(c) if c == '=' || c.is_ascii_alphanumeric());
            if !suppressed {
                self.error_coded(
                    ErrorCode::InvalidCharacterReference,
                    "missing-semicolon-after-character-reference",
                );
                // Give back the unmatched tail.
                let tail = word[len..].to_string();
                self.unread(&tail);
                self.temp.clear();
                self.temp.push_str(expansion);
                self.flush_char_ref();
                self.state = self.return_state;
                return;
            }
        }

        // No match: flush `&` plus the word literally, then sort out any
        // trailing `;` in the ambiguous-ampersand state.
        self.temp.push_str(&word);
        self.flush_char_ref();
        self.state = State::AmbiguousAmpersand;
    }

    /// Push unconsumed characters back in front of the cursor by rewinding
    /// the byte position. Only called with text that was just consumed.
    fn unread(&mut self, tail: &str) {
        self.pos -= tail.len();
        self.column = self.column.saturating_sub(tail.chars().count() as u32);
    }
}

#[cfg(test)]
mod tests;
