//! Conversions between core types and LSP types

use std::path::PathBuf;

use tower_lsp::lsp_types::{CodeLens, Command, Position, Range, Url};
use vitest_lens_core::{Annotation, CancellationToken, Result, Span};

/// Line starts of a document, built once and shared by every conversion
/// for that document.
pub struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, starts }
    }

    /// Convert a byte offset to an LSP position (0-based line, UTF-16 column)
    pub fn position(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }

        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.starts[line];
        let character: usize = self.text[line_start..offset]
            .chars()
            .map(char::len_utf16)
            .sum();

        Position::new(line as u32, character as u32)
    }

    /// Convert a span to an LSP range
    pub fn range(&self, span: Span) -> Range {
        Range::new(self.position(span.start), self.position(span.end))
    }
}

/// Convert an annotation to a code lens carrying its declaration
pub fn annotation_to_code_lens(annotation: &Annotation, index: &LineIndex) -> Result<CodeLens> {
    Ok(CodeLens {
        range: index.range(annotation.span),
        command: Some(Command {
            title: annotation.action.title().to_string(),
            command: annotation.action.command_id().to_string(),
            arguments: Some(vec![annotation.declaration.to_json()?]),
        }),
        data: None,
    })
}

/// Code lenses for `annotations`, in order.
///
/// Stops early when `cancel` fires. Annotations whose declaration cannot be
/// encoded are skipped.
pub fn code_lenses(
    text: &str,
    annotations: &[Annotation],
    cancel: impl CancellationToken,
) -> Vec<CodeLens> {
    let index = LineIndex::new(text);
    let mut lenses = Vec::with_capacity(annotations.len());

    for annotation in annotations {
        if cancel.is_cancelled() {
            tracing::debug!(converted = lenses.len(), "lens conversion cancelled");
            break;
        }
        match annotation_to_code_lens(annotation, &index) {
            Ok(lens) => lenses.push(lens),
            Err(err) => {
                tracing::warn!(
                    test = %annotation.declaration.full_name(),
                    error = %err,
                    "skipping code lens"
                );
            }
        }
    }

    lenses
}

/// File system path for a document; untitled documents keep their URI path
pub fn document_path(uri: &Url) -> PathBuf {
    uri.to_file_path()
        .unwrap_or_else(|_| PathBuf::from(uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitest_lens_core::{
        annotations, CancelWhen, NeverCancelled, SourceFile, TestDeclaration, TestKind,
    };

    #[test]
    fn test_position() {
        let index = LineIndex::new("ab\ncd\n");
        assert_eq!(index.position(0), Position::new(0, 0));
        assert_eq!(index.position(2), Position::new(0, 2));
        assert_eq!(index.position(4), Position::new(1, 1));
        assert_eq!(index.position(100), Position::new(2, 0));
    }

    #[test]
    fn test_utf16_columns() {
        // 'é' is two bytes and one UTF-16 unit, '😀' is four bytes and two units.
        let text = "é😀it('x')";
        let offset = text.find("'x'").unwrap();
        assert_eq!(LineIndex::new(text).position(offset), Position::new(0, 6));
    }

    #[test]
    fn test_offset_inside_a_char() {
        let index = LineIndex::new("é");
        assert_eq!(index.position(1), Position::new(0, 0));
    }

    #[test]
    fn test_range() {
        let text = "describe('a', () => {\n  it('b', () => {})\n})";
        let start = text.find("'b'").unwrap();
        let range = LineIndex::new(text).range(Span::new(start, start + 3));
        assert_eq!(range.start, Position::new(1, 5));
        assert_eq!(range.end, Position::new(1, 8));
    }

    #[test]
    fn test_code_lenses_for_large_file() {
        let count = 8000;
        let text: String = (0..count)
            .map(|i| format!("it('case {}', () => {{ expect(é).toBe('😀') }})\n", i))
            .collect();
        let source = SourceFile::parse("/p/large.test.ts", text).unwrap();
        let declarations = vitest_lens_core::discover(&source, NeverCancelled).declarations;
        assert_eq!(declarations.len(), count);

        let lenses = code_lenses(source.text(), &annotations(&declarations), NeverCancelled);
        assert_eq!(lenses.len(), 2 * count);

        let last = lenses.last().unwrap();
        assert_eq!(last.range.start, Position::new(count as u32 - 1, 3));
        assert_eq!(last.range.end.line, count as u32 - 1);
    }

    #[test]
    fn test_code_lenses_stop_on_cancel() {
        let text = "it('a', () => {})\nit('b', () => {})\n";
        let source = SourceFile::parse("/p/a.test.ts", text).unwrap();
        let declarations = vitest_lens_core::discover(&source, NeverCancelled).declarations;
        let annotations = annotations(&declarations);

        let polls = std::cell::Cell::new(0);
        let lenses = code_lenses(
            text,
            &annotations,
            CancelWhen(|| {
                polls.set(polls.get() + 1);
                polls.get() > 3
            }),
        );
        assert_eq!(lenses.len(), 3);
        assert_eq!(lenses[0].range.start, Position::new(0, 3));
    }

    #[cfg(unix)]
    #[test]
    fn test_unencodable_declaration_is_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let good = TestDeclaration {
            kind: TestKind::Test,
            source_file: PathBuf::from("/p/a.test.ts"),
            span: Span::new(3, 6),
            name: "a".to_string(),
            ancestor_names: Vec::new(),
        };
        let bad = TestDeclaration {
            source_file: PathBuf::from(OsStr::from_bytes(b"/p/\xff.test.ts")),
            ..good.clone()
        };

        let lenses = code_lenses(
            "it('a', () => {})",
            &annotations(&[bad, good]),
            NeverCancelled,
        );
        assert_eq!(lenses.len(), 2);
        let argument = &lenses[0].command.as_ref().unwrap().arguments.as_ref().unwrap()[0];
        assert_eq!(argument["sourceFile"], "/p/a.test.ts");
    }
}
