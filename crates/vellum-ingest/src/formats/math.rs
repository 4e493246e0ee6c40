//! Adapter routing math sources through `vellum-math`.

use crate::Input;
use vellum_math::MathFlavor;
use vellum_tree::Item;

pub(crate) fn parse<'a>(input: &mut Input<'a>, source: &str, flavor: MathFlavor) -> Item<'a> {
    let parse = vellum_math::parse_math(input.arena, &input.names, source, flavor);
    input.errors.extend(parse.errors);
    parse.root
}
