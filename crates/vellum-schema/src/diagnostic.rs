//! Pretty diagnostic reports for recorded parse errors, rendered with
//! labeled source snippets.

use ariadne::{Label, Report, ReportKind, Source};
use std::io;
use vellum_tree::ParseError;

/// Byte offset of a 1-based `(line, column)` position.
fn offset_of(source: &str, line: u32, column: u32) -> usize {
    let mut remaining_lines = line.saturating_sub(1);
    let mut offset = 0;
    for (i, c) in source.char_indices() {
        if remaining_lines == 0 {
            break;
        }
        if c == '\n' {
            remaining_lines -= 1;
            offset = i + 1;
        }
    }
    let col_offset: usize = source[offset..]
        .chars()
        .take(column.saturating_sub(1) as usize)
        .map(|c| c.len_utf8())
        .sum();
    (offset + col_offset).min(source.len())
}

/// Write one labeled report per recorded parse error.
///
/// `origin` is the display name of the input (a path or URL); it appears in
/// the report header the way a file name would.
pub fn write_parse_reports(
    origin: &str,
    source: &str,
    errors: &[ParseError],
    w: &mut impl io::Write,
) -> io::Result<()> {
    for error in errors {
        let offset = offset_of(source, error.line, error.column);
        let end = (offset + 1).min(source.len());
        Report::build(ReportKind::Error, origin, offset)
            .with_message(format!("{}: {}", error.code, error.message))
            .with_label(Label::new((origin, offset..end)).with_message(&error.message))
            .finish()
            .write((origin, Source::from(source)), &mut *w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_tree::ErrorCode;

    #[test]
    fn offsets_from_line_and_column() {
        let source = "ab\ncdef\ng";
        assert_eq!(offset_of(source, 1, 1), 0);
        assert_eq!(offset_of(source, 2, 1), 3);
        assert_eq!(offset_of(source, 2, 4), 6);
        assert_eq!(offset_of(source, 3, 1), 8);
        // out-of-range positions clamp to the end
        assert_eq!(offset_of(source, 9, 9), source.len());
    }

    #[test]
    fn report_writes_without_panicking() {
        let errors = vec![ParseError::new(
            ErrorCode::UnexpectedToken,
            "unexpected-end-tag",
            1,
            4,
        )];
        let mut out = Vec::new();
        write_parse_reports("input.html", "<p></q>", &errors, &mut out).unwrap();
        assert!(!out.is_empty());
    }
}
