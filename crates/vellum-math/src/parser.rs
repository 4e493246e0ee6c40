use crate::commands;
use crate::cursor::Cursor;
use crate::MathFlavor;
use vellum_tree::{Arena, Depth, Element, ErrorCode, Item, Name, NamePool, ParseError};

/// Primary-expression recursion cap. Pathological nesting past this depth
/// returns an error item instead of blowing the stack.
const MAX_DEPTH: usize = 20;

pub(crate) struct MathParser<'a, 'n, 's> {
    pub(crate) arena: &'a Arena,
    pub(crate) names: &'n NamePool<'a>,
    pub(crate) cursor: Cursor<'s>,
    pub(crate) flavor: MathFlavor,
    pub(crate) depth: Depth,
    pub(crate) errors: Vec<ParseError>,
}

impl<'a, 'n, 's> MathParser<'a, 'n, 's> {
    pub(crate) fn new(
        arena: &'a Arena,
        names: &'n NamePool<'a>,
        source: &'s str,
        flavor: MathFlavor,
    ) -> Self {
        Self {
            arena,
            names,
            cursor: Cursor::new(source),
            flavor,
            depth: Depth::new(MAX_DEPTH),
            errors: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, code: ErrorCode, message: &str) {
        let (line, column) = self.cursor.position();
        self.errors
            .push(ParseError::new(code, message, line, column));
    }

    pub(crate) fn intern(&self, s: &str) -> Name<'a> {
        self.names.intern(s)
    }

    pub(crate) fn element(&self, tag: &str) -> &'a Element<'a> {
        Element::new_in(self.arena, self.names.intern(tag))
    }

    pub(crate) fn symbol(&self, s: &str) -> Item<'a> {
        Item::Symbol(self.names.intern(s))
    }

    pub(crate) fn binary(&self, op: &str, left: Item<'a>, right: Item<'a>) -> Item<'a> {
        let el = self.element(op);
        el.add_child(left);
        el.add_child(right);
        Item::Element(el)
    }

    // precedence ladder, lowest first

    pub(crate) fn parse_expression(&mut self) -> Item<'a> {
        self.parse_relation()
    }

    fn parse_relation(&mut self) -> Item<'a> {
        let mut left = self.parse_addition();
        if left.is_error() || left.is_null() {
            return left;
        }
        loop {
            self.cursor.skip_whitespace();
            let op = if self.cursor.eat_str("<=") {
                "leq"
            } else if self.cursor.eat_str(">=") {
                "geq"
            } else if self.cursor.eat_str("!=") {
                "neq"
            } else if self.cursor.eat('=') {
                "eq"
            } else if self.cursor.eat('<') {
                "lt"
            } else if self.cursor.eat('>') {
                "gt"
            } else {
                return left;
            };
            self.cursor.skip_whitespace();
            let right = self.parse_addition();
            if right.is_error() || right.is_null() {
                self.error(ErrorCode::UnexpectedEof, "missing right operand");
                return Item::Error;
            }
            left = self.binary(op, left, right);
        }
    }

    fn parse_addition(&mut self) -> Item<'a> {
        let mut left = self.parse_multiplication();
        if left.is_error() || left.is_null() {
            return left;
        }
        loop {
            self.cursor.skip_whitespace();
            let op = match self.cursor.peek() {
                Some('+') => "add",
                Some('-') => "sub",
                _ => return left,
            };
            self.cursor.bump();
            self.cursor.skip_whitespace();
            let right = self.parse_multiplication();
            if right.is_error() || right.is_null() {
                self.error(ErrorCode::UnexpectedEof, "missing right operand");
                return Item::Error;
            }
            left = self.binary(op, left, right);
        }
    }

    fn parse_multiplication(&mut self) -> Item<'a> {
        let mut left = self.parse_power();
        if left.is_error() || left.is_null() {
            return left;
        }
        loop {
            self.cursor.skip_whitespace();
            let explicit = match self.cursor.peek() {
                Some('*') if !(self.flavor == MathFlavor::Ascii && self.cursor.starts_with("**")) =>
                {
                    self.cursor.bump();
                    Some("mul")
                }
                Some('/') => {
                    self.cursor.bump();
                    // a/b is a stacked fraction in Typst
                    Some(if self.flavor == MathFlavor::Typst {
                        "frac"
                    } else {
                        "div"
                    })
                }
                _ => None,
            };

            let op = match explicit {
                Some(op) => op,
                // implicit multiplication between adjacent primaries
                None if self.starts_primary() => "mul",
                None => return left,
            };

            self.cursor.skip_whitespace();
            let right = self.parse_power();
            if right.is_error() || right.is_null() {
                if explicit.is_some() {
                    self.error(ErrorCode::UnexpectedEof, "missing right operand");
                    return Item::Error;
                }
                return left;
            }
            left = self.binary(op, left, right);
        }
    }

    /// Commands that close a surrounding construct; expressions stop in
    /// front of them.
    pub(crate) fn at_terminator(&self) -> bool {
        self.cursor.starts_with("\\\\")
            || self.cursor.starts_with("\\end")
            || self.cursor.starts_with("\\right")
            || self.cursor.starts_with("\\rceil")
            || self.cursor.starts_with("\\rfloor")
    }

    /// Whether the next character begins a primary expression, which makes
    /// the juxtaposition an implicit multiplication.
    fn starts_primary(&self) -> bool {
        if self.at_terminator() {
            return false;
        }
        match self.cursor.peek() {
            Some('\\') | Some('(') => true,
            Some(c) if c.is_ascii_digit() => true,
            Some(c) if c.is_alphabetic() => true,
            _ => false,
        }
    }

    fn parse_power(&mut self) -> Item<'a> {
        let base = self.parse_postfix();
        if base.is_error() || base.is_null() {
            return base;
        }
        if self.flavor == MathFlavor::Latex {
            // LaTeX exponents are handled as postfix `^`
            return base;
        }
        self.cursor.skip_whitespace();
        let has_power = match self.flavor {
            MathFlavor::Ascii => self.cursor.eat_str("**") || self.cursor.eat('^'),
            MathFlavor::Typst => self.cursor.eat('^'),
            MathFlavor::Latex => false,
        };
        if !has_power {
            return base;
        }
        self.cursor.skip_whitespace();
        // right-associative
        let exponent = self.parse_power();
        if exponent.is_error() || exponent.is_null() {
            self.error(ErrorCode::UnexpectedEof, "missing exponent");
            return Item::Error;
        }
        self.binary("pow", base, exponent)
    }

    /// Postfix-level entry for command parsers that take a tightly-bound
    /// operand (`\sum … body`, `\lim … f`).
    pub(crate) fn parse_postfix_level(&mut self) -> Item<'a> {
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Item<'a> {
        let mut base = self.parse_primary();
        if base.is_error() || base.is_null() {
            return base;
        }
        loop {
            // scripts tolerate whitespace before the operator; primes bind
            // tight to their base
            match self.cursor.peek_skipping_ws() {
                Some('^') if self.flavor == MathFlavor::Latex => {
                    self.cursor.skip_whitespace();
                    self.cursor.bump();
                    let exponent = self.parse_script_operand();
                    if exponent.is_error() {
                        return Item::Error;
                    }
                    base = self.binary("pow", base, exponent);
                }
                Some('_') => {
                    self.cursor.skip_whitespace();
                    self.cursor.bump();
                    let subscript = self.parse_script_operand();
                    if subscript.is_error() {
                        return Item::Error;
                    }
                    base = self.binary("sub", base, subscript);
                }
                Some('\'') if self.cursor.peek() == Some('\'') => {
                    let mut count = 0i64;
                    while self.cursor.eat('\'') {
                        count += 1;
                    }
                    let el = self.element("prime");
                    el.add_child(base);
                    el.set_attr(self.intern("count"), Item::Int(count));
                    base = Item::Element(el);
                }
                _ => return base,
            }
        }
    }

    /// A `^` or `_` operand: braced expression or a single primary.
    pub(crate) fn parse_script_operand(&mut self) -> Item<'a> {
        self.cursor.skip_whitespace();
        if self.cursor.eat('{') {
            let inner = self.parse_expression();
            if inner.is_error() {
                return Item::Error;
            }
            if !self.cursor.eat('}') {
                self.error(ErrorCode::UnexpectedEof, "expected `}`");
                return Item::Error;
            }
            return inner;
        }
        self.parse_primary()
    }

    pub(crate) fn parse_primary(&mut self) -> Item<'a> {
        if !self.depth.descend() {
            self.error(ErrorCode::UnexpectedToken, "expression nesting too deep");
            return Item::Error;
        }
        let item = self.parse_primary_inner();
        self.depth.ascend();
        item
    }

    fn parse_primary_inner(&mut self) -> Item<'a> {
        self.cursor.skip_whitespace();
        if self.at_terminator() {
            return Item::Null;
        }
        match self.cursor.peek() {
            None => Item::Null,
            Some(c) if c.is_ascii_digit() => self.parse_number(false),
            Some('-') if matches!(self.cursor.peek_second(), Some(d) if d.is_ascii_digit()) => {
                self.cursor.bump();
                self.parse_number(true)
            }
            Some('(') => {
                self.cursor.bump();
                let inner = self.parse_expression();
                if inner.is_error() {
                    return Item::Error;
                }
                if !self.cursor.eat(')') {
                    self.error(ErrorCode::UnexpectedEof, "expected `)`");
                    return Item::Error;
                }
                inner
            }
            Some('{') => {
                self.cursor.bump();
                let inner = self.parse_expression();
                if inner.is_error() {
                    return Item::Error;
                }
                if !self.cursor.eat('}') {
                    self.error(ErrorCode::UnexpectedEof, "expected `}`");
                    return Item::Error;
                }
                inner
            }
            Some('\\') => commands::parse_command(self),
            Some(c) if c.is_alphabetic() => self.parse_identifier(),
            _ => Item::Null,
        }
    }

    fn parse_number(&mut self, negative: bool) -> Item<'a> {
        let mut digits = String::new();
        self.cursor.take_while(|c| c.is_ascii_digit(), &mut digits);
        let mut is_float = false;
        if self.cursor.peek() == Some('.')
            && matches!(self.cursor.peek_second(), Some(d) if d.is_ascii_digit())
        {
            is_float = true;
            digits.push('.');
            self.cursor.bump();
            self.cursor.take_while(|c| c.is_ascii_digit(), &mut digits);
        }
        if digits.is_empty() {
            return Item::Error;
        }
        if is_float {
            match digits.parse::<f64>() {
                Ok(v) => Item::float(if negative { -v } else { v }),
                Err(_) => Item::Error,
            }
        } else {
            match digits.parse::<i64>() {
                Ok(v) => Item::Int(if negative { -v } else { v }),
                Err(_) => Item::Error,
            }
        }
    }

    fn parse_identifier(&mut self) -> Item<'a> {
        let mut name = String::new();
        self.cursor
            .take_while(|c| c.is_alphanumeric(), &mut name);
        if name.is_empty() {
            return Item::Error;
        }

        if self.cursor.peek() == Some('(') {
            return self.parse_function_call(&name);
        }
        if commands::is_function_name(&name) {
            // `sin x` style application without parentheses
            self.cursor.skip_whitespace();
            let arg = self.parse_postfix();
            let el = self.element(&name);
            if !arg.is_null() && !arg.is_error() {
                el.add_child(arg);
            }
            return Item::Element(el);
        }
        self.symbol(&name)
    }

    /// `name(arg, arg, …)` — a function-call element tagged with the
    /// function's name. Falls back to a plain symbol when the argument list
    /// fails to parse.
    fn parse_function_call(&mut self, name: &str) -> Item<'a> {
        debug_assert_eq!(self.cursor.peek(), Some('('));
        self.cursor.bump();
        let el = self.element(name);
        self.cursor.skip_whitespace();
        if self.cursor.eat(')') {
            return Item::Element(el);
        }
        loop {
            let arg = self.parse_expression();
            if arg.is_error() || arg.is_null() {
                return if commands::is_function_name(name) {
                    Item::Error
                } else {
                    // unknown identifier: not a call after all
                    self.symbol(name)
                };
            }
            el.add_child(arg);
            self.cursor.skip_whitespace();
            if self.cursor.eat(',') {
                self.cursor.skip_whitespace();
                continue;
            }
            if self.cursor.eat(')') {
                return Item::Element(el);
            }
            self.error(ErrorCode::UnexpectedEof, "expected `)` in argument list");
            return Item::Error;
        }
    }
}
