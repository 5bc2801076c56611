//! Source map for translating byte offsets into line/column coordinates.

use std::sync::Arc;

use super::{FileId, Span};

/// A loaded source file with precomputed line-start offsets.
#[derive(Clone)]
pub struct SourceFile {
    id: FileId,
    name: String,
    content: Arc<str>,
    line_starts: Arc<[usize]>,
}

impl SourceFile {
    pub fn new(id: usize, name: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        let content = content.into();
        let line_starts = Self::compute_line_starts(&content);
        Self {
            id: FileId(id),
            name: name.into(),
            content,
            line_starts,
        }
    }

    fn compute_line_starts(content: &str) -> Arc<[usize]> {
        let mut line_starts = vec![0];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        line_starts.into()
    }

    #[inline]
    pub fn id(&self) -> FileId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    #[inline]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Convert a byte offset into 1-based (line, column).
    pub fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => (line + 1, 1),
            Err(insert_point) => {
                let line = insert_point - 1;
                let line_start = self.line_starts.get(line).copied().unwrap_or(0);
                (line + 1, offset - line_start + 1)
            }
        }
    }

    /// Get a specific source line (1-indexed), without its trailing newline.
    pub fn line_at(&self, line: usize) -> Option<&str> {
        let start = self.line_start(line.checked_sub(1)?)?;
        let end = self.line_start(line).unwrap_or(self.content.len());
        Some(self.content[start..end].trim_end_matches(['\n', '\r']))
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("line_count", &self.line_count())
            .finish()
    }
}

/// Owns every source file loaded during a compilation session.
#[derive(Default)]
pub struct SourceMap {
    files: Vec<Arc<SourceFile>>,
}

impl SourceMap {
    #[inline]
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<Arc<str>>) -> FileId {
        let id = self.files.len();
        let file = SourceFile::new(id, name, content);
        let file_id = file.id();
        self.files.push(Arc::new(file));
        file_id
    }

    #[inline]
    pub fn get(&self, id: FileId) -> Option<Arc<SourceFile>> {
        self.files.get(id.0).cloned()
    }

    /// Render a span as a `--> file:line:col` header plus the offending line
    /// with a caret underline, in the style of a human-facing diagnostic.
    ///
    /// `span.line`/`span.column` are 0-based (the lexer's convention);
    /// this renders them 1-based, the way a human reads a line number.
    pub fn format_span(&self, span: Span) -> Option<String> {
        let file = self.get(span.file_id)?;
        let human_line = span.line as usize + 1;
        let human_column = span.column + 1;
        let line = file.line_at(human_line)?;
        let width = file.line_count().to_string().len().max(3);

        let mut out = String::new();
        out.push_str(&format!(
            "--> {}:{}:{}\n",
            file.name(),
            human_line,
            human_column
        ));
        out.push_str(&format!("{:>width$} | {}\n", human_line, line, width = width));
        out.push_str(&format!("{:>width$} | ", "", width = width));

        let underline_start = human_column.saturating_sub(1) as usize;
        let underline_len = if span.start == span.end {
            1
        } else {
            (span.end - span.start).max(1)
        };
        out.push_str(&" ".repeat(underline_start));
        out.push_str(&"^".repeat(underline_len));
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_round_trips() {
        let file = SourceFile::new(0, "prog.pl0", "const a = 1;\nvar b;\n");
        assert_eq!(file.offset_to_line_col(0), (1, 1));
        assert_eq!(file.offset_to_line_col(13), (2, 1));
    }

    #[test]
    fn line_at_strips_newline() {
        let file = SourceFile::new(0, "prog.pl0", "one\ntwo\nthree");
        assert_eq!(file.line_at(2), Some("two"));
    }

    #[test]
    fn format_span_includes_caret() {
        let mut map = SourceMap::new();
        let id = map.add_file("prog.pl0", "var x;\n");
        // byte 4 ('x') on line 0, column 4 (0-based); rendered 1-based.
        let span = Span::with_file(4, 5, id, 0, 4);
        let rendered = map.format_span(span).unwrap();
        assert!(rendered.contains("prog.pl0:1:5"));
        assert!(rendered.contains('^'));
    }
}
