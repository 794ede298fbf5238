//! Source position tracking for parsed elements.

/// Where an element's start tag began, 1-indexed like XML parser diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps byte offsets of one document to line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset at which each line starts.
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(offset, _)| offset + 1),
        );
        Self { line_starts }
    }

    /// Position of a byte offset. Offsets past the end clamp to the last line.
    pub fn position(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Position::new(line + 1, offset - self.line_starts[line] + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_offset_is_line_one_column_one() {
        let index = LineIndex::new("<a/>");
        assert_eq!(index.position(0), Position::new(1, 1));
    }

    #[test]
    fn test_offsets_after_newlines() {
        let index = LineIndex::new("<a>\n  <b/>\n</a>");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.position(4), Position::new(2, 1));
        assert_eq!(index.position(6), Position::new(2, 3));
        assert_eq!(index.position(11), Position::new(3, 1));
    }
}
