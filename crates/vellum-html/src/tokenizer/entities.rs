//! Named character references and the numeric-reference remappings.
//!
//! This is the commonly-used slice of the WHATWG table, not all ~2200 names.
//! Unknown references are flushed back to the output literally.

/// Longest name we will attempt to match (the full WHATWG table tops out at
/// `CounterClockwiseContourIntegral;` — ours is far shorter, but the bound
/// also caps lookahead on garbage input).
pub(crate) const MAX_NAME_LEN: usize = 32;

/// Entity names (without `&` or `;`) and their expansions, matched longest
/// first by the tokenizer.
pub(crate) static NAMED: &[(&str, &str)] = &[
    ("AMP", "&"),
    ("Alpha", "\u{391}"),
    ("Beta", "\u{392}"),
    ("Dagger", "\u{2021}"),
    ("Delta", "\u{394}"),
    ("GT", ">"),
    ("Gamma", "\u{393}"),
    ("LT", "<"),
    ("Lambda", "\u{39b}"),
    ("OElig", "\u{152}"),
    ("Omega", "\u{3a9}"),
    ("Phi", "\u{3a6}"),
    ("Pi", "\u{3a0}"),
    ("Prime", "\u{2033}"),
    ("Psi", "\u{3a8}"),
    ("QUOT", "\""),
    ("Scaron", "\u{160}"),
    ("Sigma", "\u{3a3}"),
    ("Theta", "\u{398}"),
    ("Xi", "\u{39e}"),
    ("Yuml", "\u{178}"),
    ("aacute", "\u{e1}"),
    ("acirc", "\u{e2}"),
    ("agrave", "\u{e0}"),
    ("alefsym", "\u{2135}"),
    ("alpha", "\u{3b1}"),
    ("amp", "&"),
    ("and", "\u{2227}"),
    ("ang", "\u{2220}"),
    ("apos", "'"),
    ("aring", "\u{e5}"),
    ("asymp", "\u{2248}"),
    ("atilde", "\u{e3}"),
    ("auml", "\u{e4}"),
    ("bdquo", "\u{201e}"),
    ("beta", "\u{3b2}"),
    ("bull", "\u{2022}"),
    ("cap", "\u{2229}"),
    ("ccedil", "\u{e7}"),
    ("cent", "\u{a2}"),
    ("chi", "\u{3c7}"),
    ("circ", "\u{2c6}"),
    ("clubs", "\u{2663}"),
    ("cong", "\u{2245}"),
    ("copy", "\u{a9}"),
    ("crarr", "\u{21b5}"),
    ("cup", "\u{222a}"),
    ("curren", "\u{a4}"),
    ("dArr", "\u{21d3}"),
    ("dagger", "\u{2020}"),
    ("darr", "\u{2193}"),
    ("deg", "\u{b0}"),
    ("delta", "\u{3b4}"),
    ("diams", "\u{2666}"),
    ("divide", "\u{f7}"),
    ("eacute", "\u{e9}"),
    ("ecirc", "\u{ea}"),
    ("egrave", "\u{e8}"),
    ("empty", "\u{2205}"),
    ("emsp", "\u{2003}"),
    ("ensp", "\u{2002}"),
    ("epsilon", "\u{3b5}"),
    ("equiv", "\u{2261}"),
    ("eta", "\u{3b7}"),
    ("euml", "\u{eb}"),
    ("euro", "\u{20ac}"),
    ("exist", "\u{2203}"),
    ("fnof", "\u{192}"),
    ("forall", "\u{2200}"),
    ("frac12", "\u{bd}"),
    ("frac14", "\u{bc}"),
    ("frac34", "\u{be}"),
    ("frasl", "\u{2044}"),
    ("gamma", "\u{3b3}"),
    ("ge", "\u{2265}"),
    ("gt", ">"),
    ("hArr", "\u{21d4}"),
    ("harr", "\u{2194}"),
    ("hearts", "\u{2665}"),
    ("hellip", "\u{2026}"),
    ("iacute", "\u{ed}"),
    ("icirc", "\u{ee}"),
    ("iexcl", "\u{a1}"),
    ("igrave", "\u{ec}"),
    ("infin", "\u{221e}"),
    ("int", "\u{222b}"),
    ("iota", "\u{3b9}"),
    ("iquest", "\u{bf}"),
    ("isin", "\u{2208}"),
    ("iuml", "\u{ef}"),
    ("kappa", "\u{3ba}"),
    ("lArr", "\u{21d0}"),
    ("lambda", "\u{3bb}"),
    ("lang", "\u{27e8}"),
    ("laquo", "\u{ab}"),
    ("larr", "\u{2190}"),
    ("lceil", "\u{2308}"),
    ("ldquo", "\u{201c}"),
    ("le", "\u{2264}"),
    ("lfloor", "\u{230a}"),
    ("loz", "\u{25ca}"),
    ("lrm", "\u{200e}"),
    ("lsaquo", "\u{2039}"),
    ("lsquo", "\u{2018}"),
    ("lt", "<"),
    ("mdash", "\u{2014}"),
    ("micro", "\u{b5}"),
    ("middot", "\u{b7}"),
    ("minus", "\u{2212}"),
    ("mu", "\u{3bc}"),
    ("nabla", "\u{2207}"),
    ("nbsp", "\u{a0}"),
    ("ndash", "\u{2013}"),
    ("ne", "\u{2260}"),
    ("ni", "\u{220b}"),
    ("not", "\u{ac}"),
    ("notin", "\u{2209}"),
    ("nsub", "\u{2284}"),
    ("ntilde", "\u{f1}"),
    ("nu", "\u{3bd}"),
    ("oacute", "\u{f3}"),
    ("ocirc", "\u{f4}"),
    ("oelig", "\u{153}"),
    ("ograve", "\u{f2}"),
    ("oline", "\u{203e}"),
    ("omega", "\u{3c9}"),
    ("omicron", "\u{3bf}"),
    ("oplus", "\u{2295}"),
    ("or", "\u{2228}"),
    ("otilde", "\u{f5}"),
    ("otimes", "\u{2297}"),
    ("ouml", "\u{f6}"),
    ("para", "\u{b6}"),
    ("part", "\u{2202}"),
    ("permil", "\u{2030}"),
    ("perp", "\u{22a5}"),
    ("phi", "\u{3c6}"),
    ("pi", "\u{3c0}"),
    ("piv", "\u{3d6}"),
    ("plusmn", "\u{b1}"),
    ("pound", "\u{a3}"),
    ("prime", "\u{2032}"),
    ("prod", "\u{220f}"),
    ("prop", "\u{221d}"),
    ("psi", "\u{3c8}"),
    ("quot", "\""),
    ("rArr", "\u{21d2}"),
    ("radic", "\u{221a}"),
    ("rang", "\u{27e9}"),
    ("raquo", "\u{bb}"),
    ("rarr", "\u{2192}"),
    ("rceil", "\u{2309}"),
    ("rdquo", "\u{201d}"),
    ("reg", "\u{ae}"),
    ("rfloor", "\u{230b}"),
    ("rho", "\u{3c1}"),
    ("rlm", "\u{200f}"),
    ("rsaquo", "\u{203a}"),
    ("rsquo", "\u{2019}"),
    ("scaron", "\u{161}"),
    ("sdot", "\u{22c5}"),
    ("sect", "\u{a7}"),
    ("shy", "\u{ad}"),
    ("sigma", "\u{3c3}"),
    ("sigmaf", "\u{3c2}"),
    ("sim", "\u{223c}"),
    ("spades", "\u{2660}"),
    ("sub", "\u{2282}"),
    ("sube", "\u{2286}"),
    ("sum", "\u{2211}"),
    ("sup", "\u{2283}"),
    ("sup1", "\u{b9}"),
    ("sup2", "\u{b2}"),
    ("sup3", "\u{b3}"),
    ("supe", "\u{2287}"),
    ("szlig", "\u{df}"),
    ("tau", "\u{3c4}"),
    ("there4", "\u{2234}"),
    ("theta", "\u{3b8}"),
    ("thinsp", "\u{2009}"),
    ("tilde", "\u{2dc}"),
    ("times", "\u{d7}"),
    ("trade", "\u{2122}"),
    ("uArr", "\u{21d1}"),
    ("uacute", "\u{fa}"),
    ("uarr", "\u{2191}"),
    ("ucirc", "\u{fb}"),
    ("ugrave", "\u{f9}"),
    ("upsilon", "\u{3c5}"),
    ("uuml", "\u{fc}"),
    ("weierp", "\u{2118}"),
    ("xi", "\u{3be}"),
    ("yacute", "\u{fd}"),
    ("yen", "\u{a5}"),
    ("yuml", "\u{ff}"),
    ("zeta", "\u{3b6}"),
    ("zwj", "\u{200d}"),
    ("zwnj", "\u{200c}"),
];

/// Names that historically resolve without a trailing semicolon.
pub(crate) static LEGACY_NO_SEMICOLON: &[&str] = &[
    "AMP", "COPY", "GT", "LT", "QUOT", "REG", "amp", "copy", "gt", "lt", "nbsp", "quot", "reg",
];

pub(crate) fn lookup(name: &str) -> Option<&'static str> {
    NAMED
        .binary_search_by(|(n, _)| n.cmp(&name))
        .ok()
        .map(|i| NAMED[i].1)
}

pub(crate) fn matches_without_semicolon(name: &str) -> bool {
    LEGACY_NO_SEMICOLON.contains(&name) && lookup(name).is_some()
}

/// Windows-1252 remappings for numeric references in the C1 control range.
static C1_REMAP: [u32; 32] = [
    0x20ac, 0x81, 0x201a, 0x192, 0x201e, 0x2026, 0x2020, 0x2021, 0x2c6, 0x2030, 0x160, 0x2039,
    0x152, 0x8d, 0x17d, 0x8f, 0x90, 0x2018, 0x2019, 0x201c, 0x201d, 0x2022, 0x2013, 0x2014,
    0x2dc, 0x2122, 0x161, 0x203a, 0x153, 0x9d, 0x17e, 0x178,
];

/// Resolve a numeric character reference code per the WHATWG error
/// remappings. Returns the character plus the parse-error name, if any.
pub(crate) fn resolve_numeric(code: u32) -> (char, Option<&'static str>) {
    match code {
        0 => ('\u{fffd}', Some("null-character-reference")),
        c if c > 0x10ffff => ('\u{fffd}', Some("character-reference-outside-unicode-range")),
        0xd800..=0xdfff => ('\u{fffd}', Some("surrogate-character-reference")),
        0x80..=0x9f => {
            let mapped = C1_REMAP[(code - 0x80) as usize];
            let c = char::from_u32(mapped).unwrap_or('\u{fffd}');
            (c, Some("control-character-reference"))
        }
        0xfdd0..=0xfdef => (
            char::from_u32(code).unwrap_or('\u{fffd}'),
            Some("noncharacter-character-reference"),
        ),
        c if (c & 0xfffe) == 0xfffe => (
            char::from_u32(code).unwrap_or('\u{fffd}'),
            Some("noncharacter-character-reference"),
        ),
        0x01..=0x08 | 0x0b | 0x0e..=0x1f | 0x7f => (
            char::from_u32(code).unwrap_or('\u{fffd}'),
            Some("control-character-reference"),
        ),
        c => (char::from_u32(c).unwrap_or('\u{fffd}'), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_for_binary_search() {
        for pair in NAMED.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn minimal_six_resolve() {
        for (name, expect) in [
            ("lt", "<"),
            ("gt", ">"),
            ("amp", "&"),
            ("quot", "\""),
            ("apos", "'"),
            ("nbsp", "\u{a0}"),
        ] {
            assert_eq!(lookup(name), Some(expect));
        }
    }

    #[test]
    fn numeric_remappings() {
        assert_eq!(resolve_numeric(0x41).0, 'A');
        assert_eq!(resolve_numeric(0).0, '\u{fffd}');
        assert_eq!(resolve_numeric(0xd800).0, '\u{fffd}');
        assert_eq!(resolve_numeric(0x110000).0, '\u{fffd}');
        assert_eq!(resolve_numeric(0x80).0, '\u{20ac}');
        assert_eq!(resolve_numeric(0x92).0, '\u{2019}');
    }
}
