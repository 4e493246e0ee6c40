use super::*;
use pretty_assertions::assert_eq;

fn lex(input: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        let done = token.is_eof();
        tokens.push(token);
        if done {
            break;
        }
    }
    tokens
}

fn text_of(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Character(c) => Some(*c),
            _ => None,
        })
        .collect()
}

#[test]
fn plain_text_emits_characters() {
    let tokens = lex("ab");
    assert_eq!(
        tokens,
        vec![Token::Character('a'), Token::Character('b'), Token::Eof]
    );
}

#[test]
fn simple_start_tag() {
    let tokens = lex("<div>");
    assert_eq!(
        tokens,
        vec![
            Token::StartTag(Tag {
                name: "div".into(),
                attrs: vec![],
                self_closing: false,
            }),
            Token::Eof
        ]
    );
}

#[test]
fn tag_names_are_lowercased() {
    let tokens = lex("<DiV></DIV>");
    assert_eq!(
        tokens,
        vec![
            Token::StartTag(Tag {
                name: "div".into(),
                attrs: vec![],
                self_closing: false,
            }),
            Token::EndTag(Tag {
                name: "div".into(),
                attrs: vec![],
                self_closing: false,
            }),
            Token::Eof
        ]
    );
}

#[test]
fn attributes_quoted_and_unquoted() {
    let tokens = lex(r#"<a href="x" id=y checked>"#);
    match &tokens[0] {
        Token::StartTag(tag) => {
            assert_eq!(tag.attr("href"), Some("x"));
            assert_eq!(tag.attr("id"), Some("y"));
            assert_eq!(tag.attr("checked"), Some(""));
        }
        other => panic!("expected start tag, got {other:?}"),
    }
}

#[test]
fn duplicate_attributes_are_dropped() {
    let mut tokenizer = Tokenizer::new(r#"<a id="1" id="2">"#);
    let token = tokenizer.next_token();
    match token {
        Token::StartTag(tag) => {
            assert_eq!(tag.attrs.len(), 1);
            assert_eq!(tag.attr("id"), Some("1"));
        }
        other => panic!("expected start tag, got {other:?}"),
    }
    assert_eq!(tokenizer.errors().len(), 1);
    assert_eq!(tokenizer.errors()[0].message, "duplicate-attribute");
}

#[test]
fn self_closing_flag() {
    let tokens = lex("<br/>");
    assert_eq!(
        tokens[0],
        Token::StartTag(Tag {
            name: "br".into(),
            attrs: vec![],
            self_closing: true,
        })
    );
}

#[test]
fn comment_token() {
    let tokens = lex("<!-- hi -->");
    assert_eq!(tokens, vec![Token::Comment(" hi ".into()), Token::Eof]);
}

#[test]
fn nested_comment_dashes_preserved() {
    let tokens = lex("<!-- a - b -- c -->");
    assert_eq!(tokens[0], Token::Comment(" a - b -- c ".into()));
}

#[test]
fn doctype_html() {
    let tokens = lex("<!DOCTYPE html>");
    assert_eq!(
        tokens[0],
        Token::Doctype(Doctype {
            name: Some("html".into()),
            public_id: None,
            system_id: None,
            force_quirks: false,
        })
    );
}

#[test]
fn doctype_with_public_and_system_ids() {
    let tokens =
        lex(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://w3.org/html4.dtd">"#);
    assert_eq!(
        tokens[0],
        Token::Doctype(Doctype {
            name: Some("html".into()),
            public_id: Some("-//W3C//DTD HTML 4.01//EN".into()),
            system_id: Some("http://w3.org/html4.dtd".into()),
            force_quirks: false,
        })
    );
}

#[test]
fn named_character_references() {
    assert_eq!(text_of(&lex("a &lt; b &amp; c")), "a < b & c");
    assert_eq!(text_of(&lex("&nbsp;")), "\u{a0}");
    assert_eq!(text_of(&lex("&mdash;")), "\u{2014}");
}

#[test]
fn legacy_reference_without_semicolon() {
    let mut tokenizer = Tokenizer::new("x &amp y");
    let mut out = String::new();
    loop {
        match tokenizer.next_token() {
            Token::Character(c) => out.push(c),
            Token::Eof => break,
            _ => {}
        }
    }
    assert_eq!(out, "x & y");
    assert!(!tokenizer.errors().is_empty());
}

#[test]
fn unknown_reference_is_literal() {
    assert_eq!(text_of(&lex("&nosuch;")), "&nosuch;");
    assert_eq!(text_of(&lex("&nosuch")), "&nosuch");
}

#[test]
fn numeric_references() {
    assert_eq!(text_of(&lex("&#65;&#x42;")), "AB");
    // out-of-range and surrogate collapse to U+FFFD
    assert_eq!(text_of(&lex("&#x110000;")), "\u{fffd}");
    assert_eq!(text_of(&lex("&#xD83F;")), "\u{fffd}");
    // C1 range is remapped per windows-1252
    assert_eq!(text_of(&lex("&#x80;")), "\u{20ac}");
}

#[test]
fn character_reference_in_attribute_value() {
    let tokens = lex(r#"<a href="?a=1&amp;b=2">"#);
    match &tokens[0] {
        Token::StartTag(tag) => assert_eq!(tag.attr("href"), Some("?a=1&b=2")),
        other => panic!("expected start tag, got {other:?}"),
    }
}

#[test]
fn legacy_reference_in_attribute_followed_by_alnum_is_literal() {
    let tokens = lex(r#"<a href="?a&ampb">"#);
    match &tokens[0] {
        Token::StartTag(tag) => assert_eq!(tag.attr("href"), Some("?a&ampb")),
        other => panic!("expected start tag, got {other:?}"),
    }
}

#[test]
fn rawtext_swallows_markup() {
    let mut tokenizer = Tokenizer::new("a<b>c</style>d");
    tokenizer.set_state(State::Rawtext);
    // pretend <style> was the last start tag
    tokenizer.last_start_tag = "style".into();
    let mut out = String::new();
    let mut end_tags = Vec::new();
    loop {
        match tokenizer.next_token() {
            Token::Character(c) => out.push(c),
            Token::EndTag(tag) => end_tags.push(tag.name),
            Token::Eof => break,
            other => panic!("unexpected token {other:?}"),
        }
    }
    assert_eq!(out, "a<b>cd");
    assert_eq!(end_tags, vec!["style".to_string()]);
}

#[test]
fn script_data_escaped_comment() {
    let mut tokenizer = Tokenizer::new("x<!--y--></script>");
    tokenizer.set_state(State::ScriptData);
    tokenizer.last_start_tag = "script".into();
    let mut out = String::new();
    let mut saw_end = false;
    loop {
        match tokenizer.next_token() {
            Token::Character(c) => out.push(c),
            Token::EndTag(tag) => {
                assert_eq!(tag.name, "script");
                saw_end = true;
            }
            Token::Eof => break,
            other => panic!("unexpected token {other:?}"),
        }
    }
    assert_eq!(out, "x<!--y-->");
    assert!(saw_end);
}

#[test]
fn plaintext_never_ends() {
    let mut tokenizer = Tokenizer::new("a</plaintext>b");
    tokenizer.set_state(State::Plaintext);
    let mut out = String::new();
    loop {
        match tokenizer.next_token() {
            Token::Character(c) => out.push(c),
            Token::Eof => break,
            other => panic!("unexpected token {other:?}"),
        }
    }
    assert_eq!(out, "a</plaintext>b");
}

#[test]
fn eof_token_repeats() {
    let mut tokenizer = Tokenizer::new("");
    assert_eq!(tokenizer.next_token(), Token::Eof);
    assert_eq!(tokenizer.next_token(), Token::Eof);
}

#[test]
fn eof_in_tag_records_position() {
    let mut tokenizer = Tokenizer::new("x\n<div");
    while !tokenizer.next_token().is_eof() {}
    let errors = tokenizer.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::UnexpectedEof);
    assert_eq!(errors[0].line, 2);
}

#[test]
fn cdata_outside_foreign_content_is_bogus_comment() {
    let tokens = lex("<![CDATA[x]]>");
    assert_eq!(tokens[0], Token::Comment("[CDATA[x]]".into()));
}

#[test]
fn cdata_when_allowed() {
    let mut tokenizer = Tokenizer::new("<![CDATA[a]]>b");
    tokenizer.allow_cdata = true;
    let mut out = String::new();
    loop {
        match tokenizer.next_token() {
            Token::Character(c) => out.push(c),
            Token::Eof => break,
            other => panic!("unexpected token {other:?}"),
        }
    }
    assert_eq!(out, "ab");
}
