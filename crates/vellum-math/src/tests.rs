use crate::{parse_math, MathFlavor};
use pretty_assertions::assert_eq;
use vellum_tree::{serialize_mark, Arena, Item, NamePool};

fn latex(source: &str) -> String {
    flavor(source, MathFlavor::Latex)
}

fn ascii(source: &str) -> String {
    flavor(source, MathFlavor::Ascii)
}

fn typst(source: &str) -> String {
    flavor(source, MathFlavor::Typst)
}

fn flavor(source: &str, flavor: MathFlavor) -> String {
    let arena = Arena::new();
    let names = NamePool::new(&arena);
    let parse = parse_math(&arena, &names, source, flavor);
    serialize_mark(parse.root)
}

#[test]
fn scalars_and_symbols() {
    assert_eq!(latex("42"), "42");
    assert_eq!(latex("3.5"), "3.5");
    assert_eq!(latex("-7"), "-7");
    assert_eq!(latex("x"), "'x'");
}

#[test]
fn additive_chain_is_left_associative() {
    assert_eq!(latex("a + b - c"), "<sub; <add; 'a' 'b'> 'c'>");
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(latex("a + b * c"), "<add; 'a' <mul; 'b' 'c'>>");
}

#[test]
fn implicit_multiplication() {
    assert_eq!(latex("2x"), "<mul; 2 'x'>");
    assert_eq!(ascii("2(a + 1)"), "<mul; 2 <add; 'a' 1>>");
    assert_eq!(latex(r"2\pi r"), "<mul; <mul; 2 <pi>> 'r'>");
}

#[test]
fn latex_superscript_and_subscript() {
    assert_eq!(latex("x^2"), "<pow; 'x' 2>");
    assert_eq!(latex("x^{n+1}"), "<pow; 'x' <add; 'n' 1>>");
    assert_eq!(latex("a_1"), "<sub; 'a' 1>");
    assert_eq!(latex("x_i^2"), "<pow; <sub; 'x' 'i'> 2>");
}

#[test]
fn ascii_power_is_right_associative() {
    assert_eq!(ascii("2**3**2"), "<pow; 2 <pow; 3 2>>");
    assert_eq!(ascii("2^3"), "<pow; 2 3>");
}

#[test]
fn typst_fraction_slash() {
    assert_eq!(typst("a/b"), "<frac; 'a' 'b'>");
}

#[test]
fn latex_frac() {
    assert_eq!(latex(r"\frac{a+b}{c}"), "<frac; <add; 'a' 'b'> 'c'>");
}

#[test]
fn latex_sqrt_and_binom() {
    assert_eq!(latex(r"\sqrt{x^2 + 1}"), "<sqrt; <add; <pow; 'x' 2> 1>>");
    assert_eq!(latex(r"\binom{n}{k}"), "<binom; 'n' 'k'>");
}

#[test]
fn sum_with_limits() {
    assert_eq!(
        latex(r"\sum_{i=1}^{n} i"),
        "<sum from:<eq; 'i' 1> to:'n'; 'i'>"
    );
}

#[test]
fn integral_and_limit() {
    assert_eq!(latex(r"\int_0^1 x"), "<int from:0 to:1; 'x'>");
    let rendered = latex(r"\lim_{h} f");
    assert_eq!(rendered, "<lim approach:'h'; 'f'>");
}

#[test]
fn pmatrix_rows_and_cols() {
    assert_eq!(
        latex(r"\begin{pmatrix}1&2\\3&4\end{pmatrix}"),
        "<pmatrix rows:2 cols:2; <row; 1 2> <row; 3 4>>"
    );
}

#[test]
fn matrix_shorthand() {
    assert_eq!(
        latex(r"\matrix{1 & 2 \\ 3 & 4}"),
        "<matrix rows:2 cols:2; <row; 1 2> <row; 3 4>>"
    );
}

#[test]
fn cases_environment() {
    assert_eq!(
        latex(r"\begin{cases}x & a\\y & b\end{cases}"),
        "<cases rows:2; <row; 'x' 'a'> <row; 'y' 'b'>>"
    );
}

#[test]
fn align_environment() {
    assert_eq!(
        latex(r"\begin{align}a &= b\\c &= d\end{align}"),
        "<align numbered:true alignment:'columns'; <row; 'a' <eq; 'b'>> <row; 'c' <eq; 'd'>>>"
    );
}

#[test]
fn greek_letters_and_operators() {
    assert_eq!(latex(r"\alpha"), "<alpha>");
    assert_eq!(latex(r"a \cdot b"), "<mul; <mul; 'a' <cdot>> 'b'>");
}

#[test]
fn arrows_carry_direction() {
    assert_eq!(latex(r"\to"), "<arrow direction:'right'>");
    assert_eq!(latex(r"\mapsto"), "<arrow direction:'maps-to'>");
}

#[test]
fn accents_and_vectors() {
    assert_eq!(latex(r"\vec{v}"), "<vec position:'over'; 'v'>");
    assert_eq!(latex(r"\underline{x}"), "<underline position:'under'; 'x'>");
}

#[test]
fn absolute_value_and_floors() {
    assert_eq!(latex(r"\left|x\right|"), "<abs; 'x'>");
    assert_eq!(latex(r"\abs{x}"), "<abs; 'x'>");
    assert_eq!(latex(r"\lceil x \rceil"), "<ceil; 'x'>");
    assert_eq!(latex(r"\lfloor x \rfloor"), "<floor; 'x'>");
}

#[test]
fn number_sets() {
    assert_eq!(latex(r"\mathbb{R}"), "<mathbb set:'R'>");
}

#[test]
fn prime_notation_counts() {
    assert_eq!(latex("f'"), "<prime count:1; 'f'>");
    assert_eq!(latex("f''"), "<prime count:2; 'f'>");
}

#[test]
fn function_calls() {
    assert_eq!(ascii("sin(x)"), "<sin; 'x'>");
    assert_eq!(ascii("sin x"), "<sin; 'x'>");
    assert_eq!(ascii("f(x, y)"), "<f; 'x' 'y'>");
    assert_eq!(latex(r"\sin x"), "<sin; 'x'>");
}

#[test]
fn text_command() {
    assert_eq!(latex(r"\text{iff }"), "\"iff \"");
}

#[test]
fn empty_input_is_null() {
    let arena = Arena::new();
    let names = NamePool::new(&arena);
    let parse = parse_math(&arena, &names, "   ", MathFlavor::Latex);
    assert_eq!(parse.root, Item::Null);
    assert!(parse.errors.is_empty());
}

#[test]
fn malformed_input_is_error_item() {
    let arena = Arena::new();
    let names = NamePool::new(&arena);

    let parse = parse_math(&arena, &names, r"\frac{a}", MathFlavor::Latex);
    assert!(parse.root.is_error());
    assert!(!parse.errors.is_empty());

    // the parser is restartable: a fresh invocation succeeds
    let parse = parse_math(&arena, &names, "1 + 2", MathFlavor::Latex);
    assert_eq!(serialize_mark(parse.root), "<add; 1 2>");
}

#[test]
fn unterminated_environment_is_error() {
    let arena = Arena::new();
    let names = NamePool::new(&arena);
    let parse = parse_math(&arena, &names, r"\begin{pmatrix}1&2", MathFlavor::Latex);
    assert!(parse.root.is_error());
}

#[test]
fn nesting_depth_is_bounded() {
    let arena = Arena::new();
    let names = NamePool::new(&arena);

    let deep = format!("{}x{}", "(".repeat(25), ")".repeat(25));
    let parse = parse_math(&arena, &names, &deep, MathFlavor::Ascii);
    assert!(parse.root.is_error());

    let shallow = format!("{}x{}", "(".repeat(10), ")".repeat(10));
    let parse = parse_math(&arena, &names, &shallow, MathFlavor::Ascii);
    assert_eq!(serialize_mark(parse.root), "'x'");
}
