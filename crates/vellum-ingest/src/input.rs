use crate::formats;
use vellum_math::MathFlavor;
use vellum_tree::{Arena, Item, NamePool, ParseError, StrBuf};

/// The formats the dispatcher can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
    Html,
    Css,
    Csv,
    Eml,
    Vcf,
    Rtf,
    Latex,
    Math(MathFlavor),
    Markdown,
    MediaWiki,
    Textile,
    Man,
    Mark,
}

impl Format {
    /// Resolve a MIME type or file extension hint.
    pub fn from_hint(hint: &str) -> Option<Format> {
        let hint = hint.trim().to_ascii_lowercase();
        // strip mime parameters: `text/html; charset=utf-8`
        let hint = hint.split(';').next().unwrap_or("").trim().to_string();
        let format = match hint.as_str() {
            "json" | "application/json" | "text/json" => Format::Json,
            "xml" | "application/xml" | "text/xml" | "svg" => Format::Xml,
            "html" | "htm" | "xhtml" | "text/html" | "application/xhtml+xml" => Format::Html,
            "css" | "text/css" => Format::Css,
            "csv" | "text/csv" => Format::Csv,
            "eml" | "message/rfc822" => Format::Eml,
            "vcf" | "vcard" | "text/vcard" | "text/x-vcard" => Format::Vcf,
            "rtf" | "application/rtf" | "text/rtf" => Format::Rtf,
            "tex" | "latex" | "application/x-latex" | "text/x-latex" => Format::Latex,
            "math" | "text/x-math" => Format::Math(MathFlavor::Latex),
            "typst" | "typ" => Format::Math(MathFlavor::Typst),
            "asciimath" | "ascii-math" => Format::Math(MathFlavor::Ascii),
            "md" | "markdown" | "text/markdown" => Format::Markdown,
            "wiki" | "mediawiki" | "text/x-wiki" => Format::MediaWiki,
            "textile" | "text/x-textile" => Format::Textile,
            "man" | "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "troff" => Format::Man,
            "mark" | "text/x-mark" => Format::Mark,
            _ => return None,
        };
        Some(format)
    }

    /// Resolve from a path's extension.
    pub fn from_path(path: &str) -> Option<Format> {
        let ext = path.rsplit('.').next()?;
        Self::from_hint(ext)
    }
}

/// The root parsing context: one arena, one name pool, one string buffer,
/// one parsed root.
///
/// Every parser writes its result into [`root`](Input::root) — a well-typed
/// value on success, [`Item::Error`] on failure — and appends recoverable
/// problems to [`errors`](Input::errors). The arena outlives the `Input`;
/// items reachable from the root stay valid as long as the arena does.
pub struct Input<'a> {
    pub arena: &'a Arena,
    pub names: NamePool<'a>,
    pub buf: StrBuf,
    pub root: Item<'a>,
    pub errors: Vec<ParseError>,
}

impl<'a> Input<'a> {
    pub fn new(arena: &'a Arena) -> Input<'a> {
        Input {
            arena,
            names: NamePool::new(arena),
            buf: StrBuf::new(),
            root: Item::Null,
            errors: Vec::new(),
        }
    }

    /// Dispatch `source` to the parser selected by `hint`. Returns `None`
    /// when the hint names no known format.
    pub fn from_source(arena: &'a Arena, source: &str, hint: &str) -> Option<Input<'a>> {
        let format = Format::from_hint(hint)?;
        Some(Self::from_source_with_format(arena, source, format))
    }

    pub fn from_source_with_format(arena: &'a Arena, source: &str, format: Format) -> Input<'a> {
        let mut input = Input::new(arena);
        input.parse(source, format);
        input
    }

    /// Run the parser for `format` over `source`, replacing the current
    /// root. The string buffer is reset between parses, never reallocated.
    pub fn parse(&mut self, source: &str, format: Format) {
        tracing::debug!(?format, bytes = source.len(), "dispatching input");
        self.buf.reset();
        self.root = match format {
            Format::Json => formats::json::parse(self, source),
            Format::Xml => formats::xml::parse(self, source),
            Format::Html => formats::html::parse(self, source),
            Format::Css => formats::css::parse(self, source),
            Format::Csv => formats::csv::parse(self, source),
            Format::Eml => formats::eml::parse(self, source),
            Format::Vcf => formats::vcf::parse(self, source),
            Format::Rtf => formats::rtf::parse(self, source),
            Format::Latex => formats::latex::parse(self, source),
            Format::Math(flavor) => formats::math::parse(self, source, flavor),
            Format::Markdown => formats::md::parse(self, source),
            Format::MediaWiki => formats::wiki::parse(self, source),
            Format::Textile => formats::textile::parse(self, source),
            Format::Man => formats::man::parse(self, source),
            Format::Mark => formats::mark::parse(self, source),
        };
    }

    /// Directory listing as an element tree (`file://` directory URLs and
    /// the CLI both use this).
    pub fn from_directory(
        arena: &'a Arena,
        path: &std::path::Path,
        recursive: bool,
        max_depth: usize,
    ) -> std::io::Result<Input<'a>> {
        let mut input = Input::new(arena);
        input.root = crate::dir::directory_tree(&input, path, recursive, max_depth)?;
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_cover_mime_and_extension() {
        assert_eq!(Format::from_hint("json"), Some(Format::Json));
        assert_eq!(Format::from_hint("application/json"), Some(Format::Json));
        assert_eq!(
            Format::from_hint("text/html; charset=utf-8"),
            Some(Format::Html)
        );
        assert_eq!(Format::from_hint("typ"), Some(Format::Math(MathFlavor::Typst)));
        assert_eq!(Format::from_hint("unknown/kind"), None);
        assert_eq!(Format::from_path("notes.md"), Some(Format::Markdown));
        assert_eq!(Format::from_path("a/b/data.csv"), Some(Format::Csv));
    }
}
