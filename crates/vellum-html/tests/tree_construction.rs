use pretty_assertions::assert_eq;
use vellum_html::{parse_html, QuirksMode};
use vellum_tree::{Arena, Element, Item, NamePool};

/// Render the tree in the html5lib test format, one node per line.
fn dump(el: &Element<'_>, depth: usize, out: &mut String) {
    for child in el.children().iter() {
        match child {
            Item::Element(child_el) => {
                out.push_str(&"  ".repeat(depth));
                out.push('<');
                out.push_str(child_el.tag().as_str());
                out.push('>');
                out.push('\n');
                dump(child_el, depth + 1, out);
            }
            Item::String(s) => {
                out.push_str(&"  ".repeat(depth));
                out.push('"');
                out.push_str(s);
                out.push('"');
                out.push('\n');
            }
            _ => {}
        }
    }
}

fn parse_and_dump(source: &str) -> String {
    let arena = Arena::new();
    let names = NamePool::new(&arena);
    let doc = parse_html(&arena, &names, source);
    let mut out = String::new();
    dump(doc.document, 0, &mut out);
    out
}

#[test]
fn explicit_document_structure() {
    let out = parse_and_dump("<html><head></head><body></body></html>");
    assert_eq!(out, "<html>\n  <head>\n  <body>\n");
}

#[test]
fn implied_html_head_and_body() {
    let out = parse_and_dump("hello");
    assert_eq!(out, "<html>\n  <head>\n  <body>\n    \"hello\"\n");
}

#[test]
fn root_element_accessor() {
    let arena = Arena::new();
    let names = NamePool::new(&arena);
    let doc = parse_html(&arena, &names, "<html><head></head><body></body></html>");
    let html = doc.root().expect("html root");
    assert_eq!(html.tag(), "html");
    let children = html.child_elements();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].tag(), "head");
    assert_eq!(children[1].tag(), "body");
}

#[test]
fn text_and_nested_elements() {
    let out = parse_and_dump("<p>one <b>two</b> three</p>");
    assert_eq!(
        out,
        "<html>\n  <head>\n  <body>\n    <p>\n      \"one \"\n      <b>\n        \"two\"\n      \" three\"\n"
    );
}

#[test]
fn misnested_bold_paragraph_runs_adoption_agency() {
    // the canonical misnested-tags example: <b> spans a block boundary
    let out = parse_and_dump("<b>1<p>2</b>3</p>");
    assert_eq!(
        out,
        "<html>\n  <head>\n  <body>\n    <b>\n      \"1\"\n    <p>\n      <b>\n        \"2\"\n      \"3\"\n"
    );
}

#[test]
fn adoption_agency_clones_formatting_elements() {
    let out = parse_and_dump("<p>1<b>2<i>3</p>4</i>5</b>");
    assert_eq!(
        out,
        "<html>\n  <head>\n  <body>\n    <p>\n      \"1\"\n      <b>\n        \"2\"\n        <i>\n          \"3\"\n    <b>\n      <i>\n        \"4\"\n      \"5\"\n"
    );
}

#[test]
fn formatting_reconstruction_after_block() {
    let out = parse_and_dump("<p>1<b>2<i>3</b>4</i>5</p>");
    assert_eq!(
        out,
        "<html>\n  <head>\n  <body>\n    <p>\n      \"1\"\n      <b>\n        \"2\"\n        <i>\n          \"3\"\n      <i>\n        \"4\"\n      \"5\"\n"
    );
}

#[test]
fn void_elements_take_no_children() {
    let out = parse_and_dump("<p>a<br>b<img src=x>c</p>");
    assert_eq!(
        out,
        "<html>\n  <head>\n  <body>\n    <p>\n      \"a\"\n      <br>\n      \"b\"\n      <img>\n      \"c\"\n"
    );
}

#[test]
fn self_closing_non_void_is_tolerated() {
    let arena = Arena::new();
    let names = NamePool::new(&arena);
    let doc = parse_html(&arena, &names, "<div/>text");
    // processed as an ordinary start tag; text lands inside
    let out = {
        let mut s = String::new();
        dump(doc.document, 0, &mut s);
        s
    };
    assert_eq!(out, "<html>\n  <head>\n  <body>\n    <div>\n      \"text\"\n");
}

#[test]
fn table_with_implied_tbody() {
    let out = parse_and_dump("<table><tr><td>x</td></tr></table>");
    assert_eq!(
        out,
        "<html>\n  <head>\n  <body>\n    <table>\n      <tbody>\n        <tr>\n          <td>\n            \"x\"\n"
    );
}

#[test]
fn foster_parenting_moves_text_before_table() {
    let out = parse_and_dump("<table>abc<tr><td>x</td></tr></table>");
    assert_eq!(
        out,
        "<html>\n  <head>\n  <body>\n    \"abc\"\n    <table>\n      <tbody>\n        <tr>\n          <td>\n            \"x\"\n"
    );
}

#[test]
fn foster_parenting_moves_elements_before_table() {
    let out = parse_and_dump("<table><div>d</div><tr><td>x</td></tr></table>");
    assert_eq!(
        out,
        "<html>\n  <head>\n  <body>\n    <div>\n      \"d\"\n    <table>\n      <tbody>\n        <tr>\n          <td>\n            \"x\"\n"
    );
}

#[test]
fn rcdata_title_content_is_text() {
    let out = parse_and_dump("<title>a<b>c</title>");
    assert_eq!(out, "<html>\n  <head>\n    <title>\n      \"a<b>c\"\n  <body>\n");
}

#[test]
fn doctype_quirks_classification() {
    let arena = Arena::new();
    let names = NamePool::new(&arena);

    let doc = parse_html(&arena, &names, "<!DOCTYPE html><p>x</p>");
    assert_eq!(doc.quirks_mode, QuirksMode::NoQuirks);

    let doc = parse_html(&arena, &names, "<p>x</p>");
    assert_eq!(doc.quirks_mode, QuirksMode::Quirks);

    let doc = parse_html(
        &arena,
        &names,
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 3.2//EN"><p>x</p>"#,
    );
    assert_eq!(doc.quirks_mode, QuirksMode::Quirks);

    let doc = parse_html(
        &arena,
        &names,
        concat!(
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "#,
            r#""http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd"><p>x</p>"#,
        ),
    );
    assert_eq!(doc.quirks_mode, QuirksMode::LimitedQuirks);
}

#[test]
fn unmatched_end_tags_are_reported_not_fatal() {
    let arena = Arena::new();
    let names = NamePool::new(&arena);
    let doc = parse_html(&arena, &names, "<!DOCTYPE html><p>x</span></p>");
    assert!(doc.root().is_some());
    assert!(doc.errors.iter().any(|e| e.message.contains("end-tag")));
}

#[test]
fn unexpected_eof_closes_open_elements() {
    let out = parse_and_dump("<div><p>unclosed");
    assert_eq!(
        out,
        "<html>\n  <head>\n  <body>\n    <div>\n      <p>\n        \"unclosed\"\n"
    );
}

#[test]
fn character_references_in_body_text() {
    let out = parse_and_dump("<p>&lt;tag&gt; &amp; &#65;</p>");
    assert_eq!(
        out,
        "<html>\n  <head>\n  <body>\n    <p>\n      \"<tag> & A\"\n"
    );
}

#[test]
fn comments_become_comment_elements() {
    let out = parse_and_dump("<p>a</p><!-- note -->");
    assert_eq!(
        out,
        "<html>\n  <head>\n  <body>\n    <p>\n      \"a\"\n    <!comment>\n      \" note \"\n"
    );
}

#[test]
fn empty_input_yields_document_shell() {
    let out = parse_and_dump("");
    assert_eq!(out, "<html>\n  <head>\n  <body>\n");
}

#[test]
fn pre_swallows_leading_newline() {
    let out = parse_and_dump("<pre>\ncode</pre>");
    assert_eq!(out, "<html>\n  <head>\n  <body>\n    <pre>\n      \"code\"\n");
}

#[test]
fn select_nesting_rules() {
    let out = parse_and_dump("<select><option>a<option>b</select>");
    assert_eq!(
        out,
        "<html>\n  <head>\n  <body>\n    <select>\n      <option>\n        \"a\"\n      <option>\n        \"b\"\n"
    );
}

#[test]
fn frameset_document() {
    let out = parse_and_dump("<frameset><frame></frameset>");
    assert_eq!(out, "<html>\n  <head>\n  <frameset>\n    <frame>\n");
}
