//! Adapter routing HTML sources through `vellum-html`.

use crate::Input;
use vellum_tree::Item;

pub(crate) fn parse<'a>(input: &mut Input<'a>, source: &str) -> Item<'a> {
    let doc = vellum_html::parse_html(input.arena, &input.names, source);
    input.errors.extend(doc.errors.iter().cloned());
    Item::Element(doc.document)
}
