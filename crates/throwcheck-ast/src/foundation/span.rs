//! Source location tracking for diagnostics and containment tests.
//!
//! # Design
//!
//! - `Span`: compact byte range into one source file
//! - `SourceMap`: all source files known to a check run
//! - `SourceFile`: single source file with line indexing
//!
//! Spans are also the basis of the structural containment test used by the
//! coverage checker: a call site lies inside a guarded body iff its span is
//! fully contained in the body's span.
//!
//! # Examples
//!
//! ```
//! # use throwcheck_ast::foundation::span::*;
//! # use std::path::PathBuf;
//! let mut map = SourceMap::new();
//! let file_id = map.add_file(PathBuf::from("lib/main.dart"), "f();\ng();".to_string());
//! let span = Span::new(file_id, 0, 3, 1);
//!
//! assert_eq!(map.snippet(&span), "f()");
//! assert_eq!(map.line_col(&span), (1, 1));
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Compact source location reference.
///
/// Points to a byte range in a source file with cached line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Index into SourceMap.files
    pub file_id: u16,
    /// Byte offset of start position
    pub start: u32,
    /// Byte offset of end position (exclusive)
    pub end: u32,
    /// Cached line number (1-based) for the start position
    pub start_line: u16,
}

/// Collection of all source files in a check run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

/// A single source file with line indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path as reported by the host front-end
    pub path: PathBuf,
    /// Original source text
    pub source: String,
    /// Byte offsets of each line start, plus an EOF sentinel
    pub line_starts: Vec<u32>,
}

impl Span {
    /// Create a new span.
    pub fn new(file_id: u16, start: u32, end: u32, start_line: u16) -> Self {
        Self {
            file_id,
            start,
            end,
            start_line,
        }
    }

    /// Create a zero-length span at the start of a file.
    pub fn zero(file_id: u16) -> Self {
        Self::new(file_id, 0, 0, 1)
    }

    /// Check if this span is zero-length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Length of this span in bytes. Inverted spans have length zero.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if `other` lies fully within this span (same file,
    /// `self.start <= other.start` and `other.end <= self.end`).
    pub fn contains(&self, other: &Span) -> bool {
        self.file_id == other.file_id && self.start <= other.start && other.end <= self.end
    }
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Add a source file and return its ID.
    pub fn add_file(&mut self, path: PathBuf, source: String) -> u16 {
        let file_id = self.files.len();
        assert!(file_id < u16::MAX as usize, "too many source files");

        self.files.push(SourceFile::new(path, source));
        file_id as u16
    }

    /// Get the source file for a span, if the span's file is registered.
    pub fn file(&self, span: &Span) -> Option<&SourceFile> {
        self.files.get(span.file_id as usize)
    }

    /// Get the file path for a span.
    pub fn file_path(&self, span: &Span) -> Option<&Path> {
        self.file(span).map(|f| f.path.as_path())
    }

    /// Get the source snippet for a span. Offsets past EOF are clamped.
    pub fn snippet(&self, span: &Span) -> &str {
        let Some(file) = self.file(span) else {
            return "";
        };
        let len = file.source.len();
        let start = (span.start as usize).min(len);
        let end = (span.end as usize).clamp(start, len);
        file.source.get(start..end).unwrap_or("")
    }

    /// Get the (line, column) position for a span's start.
    ///
    /// Both line and column are 1-based. Unknown files report the cached line.
    pub fn line_col(&self, span: &Span) -> (u32, u32) {
        match self.file(span) {
            Some(file) => file.line_col(span.start),
            None => (span.start_line as u32, 1),
        }
    }
}

impl SourceFile {
    /// Create a new source file with precomputed line starts.
    pub fn new(path: PathBuf, source: String) -> Self {
        let line_starts = compute_line_starts(&source);
        Self {
            path,
            source,
            line_starts,
        }
    }

    /// Get (line, column) for a byte offset. Both are 1-based.
    ///
    /// Offsets beyond EOF are clamped to EOF; host-supplied spans are not
    /// validated against the text.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.source.len() as u32);

        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx.min(self.line_starts.len().saturating_sub(2)),
            Err(idx) => idx.max(1) - 1,
        };

        let line = (line_idx + 1) as u32;
        let col = (offset - self.line_starts[line_idx]) + 1;

        (line, col)
    }

    /// Get the byte range for a given line number (1-based).
    pub fn line_range(&self, line: u32) -> Option<(u32, u32)> {
        if line == 0 || line as usize >= self.line_starts.len() {
            return None;
        }

        let line_idx = (line - 1) as usize;
        Some((self.line_starts[line_idx], self.line_starts[line_idx + 1]))
    }

    /// Get the text of a specific line (1-based), without its line terminator.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let (start, end) = self.line_range(line)?;
        let text = &self.source[start as usize..end as usize];
        Some(text.trim_end_matches(['\n', '\r']))
    }
}

/// Compute byte offsets of line starts in source text.
///
/// `line_starts[0]` is 0 and the last entry is always the EOF offset.
fn compute_line_starts(source: &str) -> Vec<u32> {
    let mut line_starts = vec![0];

    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            line_starts.push((idx + 1) as u32);
        }
    }

    if line_starts.last() != Some(&(source.len() as u32)) {
        line_starts.push(source.len() as u32);
    }

    line_starts
}
