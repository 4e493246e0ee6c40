//! LaTeX command dispatch: `\frac`, `\sqrt`, operators with limits,
//! environments, accents, and the symbol tables shared with the LaTeX
//! document parser.

use crate::environment;
use crate::parser::MathParser;
use vellum_tree::{ErrorCode, Item};

pub(crate) static GREEK_LETTERS: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta", "theta",
    "vartheta", "iota", "kappa", "lambda", "mu", "nu", "xi", "omicron", "pi", "varpi", "rho",
    "varrho", "sigma", "varsigma", "tau", "upsilon", "phi", "varphi", "chi", "psi", "omega",
    "Gamma", "Delta", "Theta", "Lambda", "Xi", "Pi", "Sigma", "Upsilon", "Phi", "Psi", "Omega",
];

pub(crate) static MATH_OPERATORS: &[&str] = &[
    "cdot", "times", "div", "pm", "mp", "ast", "star", "circ", "bullet", "oplus", "ominus",
    "otimes", "oslash", "leq", "geq", "neq", "approx", "equiv", "sim", "simeq", "propto", "ll",
    "gg", "prec", "succ", "infty", "partial", "nabla", "perp", "parallel", "angle", "triangle",
    "ldots", "cdots", "vdots", "ddots",
];

static SET_OPERATORS: &[&str] = &[
    "in", "notin", "ni", "subset", "supset", "subseteq", "supseteq", "cup", "cap", "setminus",
    "emptyset", "varnothing",
];

static LOGIC_OPERATORS: &[&str] = &[
    "land", "lor", "lnot", "neg", "forall", "exists", "nexists", "implies", "iff", "therefore",
    "because",
];

static TRIG_FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "cot", "sec", "csc", "sinh", "cosh", "tanh", "coth", "arcsin", "arccos",
    "arctan",
];

static LOG_FUNCTIONS: &[&str] = &["log", "ln", "lg", "exp"];

/// Arrow commands and the `direction` attribute they map to.
static ARROWS: &[(&str, &str)] = &[
    ("to", "right"),
    ("rightarrow", "right"),
    ("leftarrow", "left"),
    ("leftrightarrow", "both"),
    ("Rightarrow", "right-double"),
    ("Leftarrow", "left-double"),
    ("Leftrightarrow", "both-double"),
    ("mapsto", "maps-to"),
    ("uparrow", "up"),
    ("downarrow", "down"),
];

/// Accents taking one braced operand; bool marks under-positioned ones.
static ACCENTS: &[(&str, &str)] = &[
    ("vec", "over"),
    ("hat", "over"),
    ("dot", "over"),
    ("ddot", "over"),
    ("bar", "over"),
    ("tilde", "over"),
    ("overline", "over"),
    ("underline", "under"),
    ("overbrace", "over"),
    ("underbrace", "under"),
];

pub(crate) fn is_function_name(name: &str) -> bool {
    TRIG_FUNCTIONS.contains(&name) || LOG_FUNCTIONS.contains(&name)
}

/// Parse a `\command`, assuming the cursor sits on the backslash.
pub(crate) fn parse_command<'a>(p: &mut MathParser<'a, '_, '_>) -> Item<'a> {
    if p.cursor.starts_with("\\begin{") {
        return environment::parse_environment(p);
    }
    p.cursor.bump(); // backslash

    let mut name = String::new();
    p.cursor.take_while(|c| c.is_ascii_alphabetic(), &mut name);
    if name.is_empty() {
        p.error(ErrorCode::UnexpectedToken, "empty command name");
        return Item::Error;
    }

    match name.as_str() {
        "frac" | "dfrac" | "tfrac" => two_operand(p, "frac"),
        "binom" => two_operand(p, "binom"),
        "sqrt" => one_operand(p, "sqrt"),
        "sum" => with_limits(p, "sum"),
        "prod" => with_limits(p, "prod"),
        "int" | "iint" | "oint" => with_limits(p, "int"),
        "lim" => parse_limit(p),
        "matrix" | "pmatrix" | "bmatrix" | "vmatrix" | "Vmatrix" | "smallmatrix" => {
            environment::parse_braced_matrix(p, &name)
        }
        "cases" => environment::parse_braced_cases(p),
        "left" => parse_left_delimiter(p),
        "abs" => one_operand(p, "abs"),
        "lceil" => paired_delimiter(p, "\\rceil", "ceil"),
        "lfloor" => paired_delimiter(p, "\\rfloor", "floor"),
        "mathbb" => parse_number_set(p),
        "text" | "mathrm" | "operatorname" => parse_text(p),
        _ => {
            if let Some((_, direction)) = ARROWS.iter().copied().find(|(n, _)| *n == name) {
                let el = p.element("arrow");
                el.set_attr(p.intern("direction"), p.symbol(direction));
                return Item::Element(el);
            }
            if let Some((accent, position)) = ACCENTS.iter().copied().find(|(n, _)| *n == name) {
                let operand = braced_operand(p);
                if operand.is_error() {
                    return Item::Error;
                }
                let el = p.element(accent);
                el.set_attr(p.intern("position"), p.symbol(position));
                if !operand.is_null() {
                    el.add_child(operand);
                }
                return Item::Element(el);
            }
            if GREEK_LETTERS.contains(&name.as_str())
                || MATH_OPERATORS.contains(&name.as_str())
                || SET_OPERATORS.contains(&name.as_str())
                || LOGIC_OPERATORS.contains(&name.as_str())
            {
                return Item::Element(p.element(&name));
            }
            if is_function_name(&name) {
                p.cursor.skip_whitespace();
                let arg = p.parse_script_operand();
                let el = p.element(&name);
                if !arg.is_null() && !arg.is_error() {
                    el.add_child(arg);
                }
                return Item::Element(el);
            }
            tracing::warn!(command = %name, "unknown latex command, treating as symbol");
            p.symbol(&name)
        }
    }
}

/// `{operand}` — mandatory braces.
fn braced_operand<'a>(p: &mut MathParser<'a, '_, '_>) -> Item<'a> {
    p.cursor.skip_whitespace();
    if !p.cursor.eat('{') {
        p.error(ErrorCode::UnexpectedToken, "expected `{`");
        return Item::Error;
    }
    let inner = p.parse_expression();
    if inner.is_error() {
        return Item::Error;
    }
    if !p.cursor.eat('}') {
        p.error(ErrorCode::UnexpectedEof, "expected `}`");
        return Item::Error;
    }
    inner
}

fn one_operand<'a>(p: &mut MathParser<'a, '_, '_>, tag: &str) -> Item<'a> {
    let operand = braced_operand(p);
    if operand.is_error() {
        return Item::Error;
    }
    let el = p.element(tag);
    el.add_child(operand);
    Item::Element(el)
}

fn two_operand<'a>(p: &mut MathParser<'a, '_, '_>, tag: &str) -> Item<'a> {
    let first = braced_operand(p);
    if first.is_error() {
        return Item::Error;
    }
    let second = braced_operand(p);
    if second.is_error() {
        return Item::Error;
    }
    let el = p.element(tag);
    el.add_child(first);
    el.add_child(second);
    Item::Element(el)
}

/// `\sum`, `\prod`, `\int`: optional `_{lower}` / `^{upper}` in either
/// order, then the operand expression. Limits land in `from` / `to`
/// attributes; the operand is the only child.
fn with_limits<'a>(p: &mut MathParser<'a, '_, '_>, tag: &str) -> Item<'a> {
    let el = p.element(tag);
    loop {
        p.cursor.skip_whitespace();
        if p.cursor.eat('_') {
            let lower = p.parse_script_operand();
            if lower.is_error() {
                return Item::Error;
            }
            el.set_attr(p.intern("from"), lower);
        } else if p.cursor.eat('^') {
            let upper = p.parse_script_operand();
            if upper.is_error() {
                return Item::Error;
            }
            el.set_attr(p.intern("to"), upper);
        } else {
            break;
        }
    }
    p.cursor.skip_whitespace();
    let body = p.parse_postfix_level();
    if body.is_error() {
        return Item::Error;
    }
    if !body.is_null() {
        el.add_child(body);
    }
    Item::Element(el)
}

fn parse_limit<'a>(p: &mut MathParser<'a, '_, '_>) -> Item<'a> {
    let el = p.element("lim");
    p.cursor.skip_whitespace();
    if p.cursor.eat('_') {
        let approach = p.parse_script_operand();
        if approach.is_error() {
            return Item::Error;
        }
        el.set_attr(p.intern("approach"), approach);
    }
    p.cursor.skip_whitespace();
    let body = p.parse_postfix_level();
    if body.is_error() {
        return Item::Error;
    }
    if !body.is_null() {
        el.add_child(body);
    }
    Item::Element(el)
}

/// `\left| … \right|` absolute value; other `\left` delimiters are
/// transparent grouping.
fn parse_left_delimiter<'a>(p: &mut MathParser<'a, '_, '_>) -> Item<'a> {
    p.cursor.skip_whitespace();
    if p.cursor.eat('|') {
        let inner = p.parse_expression();
        if inner.is_error() {
            return Item::Error;
        }
        p.cursor.skip_whitespace();
        if !p.cursor.eat_str("\\right|") {
            p.error(ErrorCode::UnexpectedEof, "expected `\\right|`");
            return Item::Error;
        }
        let el = p.element("abs");
        el.add_child(inner);
        return Item::Element(el);
    }
    let close = if p.cursor.eat('(') {
        "\\right)"
    } else if p.cursor.eat('[') {
        "\\right]"
    } else if p.cursor.eat_str("\\{") {
        "\\right\\}"
    } else {
        p.error(ErrorCode::UnexpectedToken, "unsupported `\\left` delimiter");
        return Item::Error;
    };
    let inner = p.parse_expression();
    if inner.is_error() {
        return Item::Error;
    }
    p.cursor.skip_whitespace();
    if !p.cursor.eat_str(close) {
        p.error(ErrorCode::UnexpectedEof, "unbalanced `\\left` delimiter");
        return Item::Error;
    }
    inner
}

/// `\lceil x \rceil` / `\lfloor x \rfloor`.
fn paired_delimiter<'a>(p: &mut MathParser<'a, '_, '_>, close: &str, tag: &str) -> Item<'a> {
    let inner = p.parse_expression();
    if inner.is_error() {
        return Item::Error;
    }
    p.cursor.skip_whitespace();
    if !p.cursor.eat_str(close) {
        p.error(ErrorCode::UnexpectedEof, "unbalanced delimiter pair");
        return Item::Error;
    }
    let el = p.element(tag);
    el.add_child(inner);
    Item::Element(el)
}

/// `\mathbb{R}` and friends: a number-set element carrying the set letter.
fn parse_number_set<'a>(p: &mut MathParser<'a, '_, '_>) -> Item<'a> {
    p.cursor.skip_whitespace();
    if !p.cursor.eat('{') {
        p.error(ErrorCode::UnexpectedToken, "expected `{`");
        return Item::Error;
    }
    let mut letter = String::new();
    p.cursor.take_while(|c| c.is_ascii_alphabetic(), &mut letter);
    if !p.cursor.eat('}') {
        p.error(ErrorCode::UnexpectedEof, "expected `}`");
        return Item::Error;
    }
    let el = p.element("mathbb");
    el.set_attr(p.intern("set"), p.symbol(&letter));
    Item::Element(el)
}

/// `\text{…}`: literal text, no math interpretation.
fn parse_text<'a>(p: &mut MathParser<'a, '_, '_>) -> Item<'a> {
    p.cursor.skip_whitespace();
    if !p.cursor.eat('{') {
        p.error(ErrorCode::UnexpectedToken, "expected `{`");
        return Item::Error;
    }
    let mut text = String::new();
    p.cursor.take_while(|c| c != '}', &mut text);
    if !p.cursor.eat('}') {
        p.error(ErrorCode::UnexpectedEof, "expected `}`");
        return Item::Error;
    }
    Item::String(p.arena.alloc_str(&text))
}
