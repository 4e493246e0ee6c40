//! End-to-end scenarios driving the whole pipeline: dispatch, parse, and
//! inspect the resulting value tree.

use pretty_assertions::assert_eq;
use vellum_ingest::{Document, Format, Input};
use vellum_tree::{serialize_json, serialize_mark, Arena, Item, TypeTag};

#[test]
fn html_basic_document_shape() {
    let arena = Arena::new();
    let input =
        Input::from_source(&arena, "<html><head></head><body></body></html>", "html").unwrap();

    // root is the synthetic #document; its html child carries head and body
    let document = input.root.as_element().unwrap();
    let html = document.child_elements()[0];
    assert_eq!(html.tag(), "html");
    let children = html.child_elements();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].tag(), "head");
    assert_eq!(children[1].tag(), "body");
}

#[test]
fn html_adoption_agency_scenario() {
    let arena = Arena::new();
    let input = Input::from_source(&arena, "<p>1<b>2<i>3</p>4</i>5</b>", "html").unwrap();
    let document = input.root.as_element().unwrap();
    let html = document.child_elements()[0];
    let body = html.child_elements()[1];

    let body_children = body.child_elements();
    assert_eq!(body_children.len(), 2);
    let p = body_children[0];
    assert_eq!(p.tag(), "p");
    // inside <p>: "1" then <b>2<i>3
    let b_in_p = p.child_elements()[0];
    assert_eq!(b_in_p.tag(), "b");
    let i_in_b = b_in_p.child_elements()[0];
    assert_eq!(i_in_b.tag(), "i");
    assert_eq!(i_in_b.text_content(), "3");
    // the cloned <b> after the paragraph holds <i>4</i> and "5"
    let b_clone = body_children[1];
    assert_eq!(b_clone.tag(), "b");
    let i_clone = b_clone.child_elements()[0];
    assert_eq!(i_clone.text_content(), "4");
    assert_eq!(b_clone.text_content(), "45");
}

#[test]
fn math_frac_scenario() {
    let arena = Arena::new();
    let input = Input::from_source(&arena, r"\frac{a+b}{c}", "math").unwrap();
    let frac = input.root.as_element().unwrap();
    assert_eq!(frac.tag(), "frac");
    assert_eq!(frac.content_length(), 2);
    let add = frac.child(0).unwrap().as_element().unwrap();
    assert_eq!(add.tag(), "add");
    assert_eq!(serialize_mark(input.root), "<frac; <add; 'a' 'b'> 'c'>");
}

#[test]
fn math_pmatrix_scenario() {
    let arena = Arena::new();
    let input =
        Input::from_source(&arena, r"\begin{pmatrix}1&2\\3&4\end{pmatrix}", "math").unwrap();
    let matrix = input.root.as_element().unwrap();
    assert_eq!(matrix.tag(), "pmatrix");
    assert_eq!(matrix.attr("rows"), Some(Item::Int(2)));
    assert_eq!(matrix.attr("cols"), Some(Item::Int(2)));
    let rows = matrix.child_elements();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].content_length(), 2);
    assert_eq!(rows[1].child(1), Some(Item::Int(4)));
}

#[test]
fn json_scenario() {
    let arena = Arena::new();
    let input = Input::from_source(&arena, "{\"a\":[1,true,null]}", "application/json").unwrap();
    let map = input.root.as_map().unwrap();
    let list = map.get("a").and_then(|v| v.as_list()).unwrap();
    let tags: Vec<TypeTag> = list.to_vec().iter().map(|i| i.tag()).collect();
    assert_eq!(tags, vec![TypeTag::Int, TypeTag::Bool, TypeTag::Null]);
}

#[test]
fn json_round_trip_law() {
    let arena = Arena::new();
    let source = "{\"k\":[1,2.5,\"s\",false,null]}";
    let input = Input::from_source(&arena, source, "json").unwrap();
    let serialized = serialize_json(input.root);
    assert_eq!(serialized, source);
    let reparsed = Input::from_source(&arena, &serialized, "json").unwrap();
    assert_eq!(reparsed.root, input.root);
}

#[test]
fn mark_round_trip_law() {
    let arena = Arena::new();
    for source in [
        "{config: {name: \"app\", tags: ['web', 'fast'], retries: 3}}",
        "<page title:\"Home\"; <h1; \"Welcome\"> <p; \"body\" 42 true>>",
        "[t'2024-01-01', b'\\x0102', null]",
    ] {
        let input = Input::from_source(&arena, source, "mark").unwrap();
        assert!(!input.root.is_error(), "{source}: {:?}", input.errors);
        assert_eq!(serialize_mark(input.root), source);
    }
}

#[test]
fn every_format_accepts_empty_input() {
    let arena = Arena::new();
    for hint in [
        "json", "xml", "html", "css", "csv", "eml", "vcf", "rtf", "latex", "math", "md", "wiki",
        "textile", "man", "mark",
    ] {
        let input = Input::from_source(&arena, "", hint).unwrap();
        // empty input is NULL or the format's natural empty shape, never an
        // error and never a crash
        assert!(!input.root.is_error(), "format {hint}");
    }
}

#[test]
fn every_format_survives_garbage() {
    let arena = Arena::new();
    let garbage = "\u{0}<<%%}}]]\\x&#;;'\"garbage\n\n@{{{";
    for hint in [
        "json", "xml", "html", "css", "csv", "eml", "vcf", "rtf", "latex", "math", "md", "wiki",
        "textile", "man", "mark",
    ] {
        let input = Input::from_source(&arena, garbage, hint).unwrap();
        // a parse always terminates with a root or an error item
        let _ = input.root.tag();
    }
}

#[test]
fn document_bundles_arena_and_root() {
    let doc = Document::parse("# Hi\n\ntext\n", Format::Markdown);
    let root = doc.root().as_element().unwrap();
    assert_eq!(root.tag(), "doc");
    assert!(doc.memory_size() > 0);
}

#[test]
fn dispatcher_rejects_unknown_hints() {
    let arena = Arena::new();
    assert!(Input::from_source(&arena, "x", "application/octet-stream").is_none());
}
