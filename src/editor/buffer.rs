//! Markup document buffer using ropey
//!
//! Holds the raw markup text the editor works on. The rendering pipeline only
//! reads whole-text snapshots from it.

use ropey::Rope;

use crate::catalog::{QuickInsert, Snippet};

/// Line ending style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Unix-style line endings (LF: \n)
    #[default]
    Lf,
    /// Windows-style line endings (CRLF: \r\n)
    Crlf,
}

impl LineEnding {
    /// Get the string representation of the line ending
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            LineEnding::Lf => "LF",
            LineEnding::Crlf => "CRLF",
        }
    }

    /// Detect line ending from text
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        }
    }
}

/// Raw markup text backed by a rope
#[derive(Debug, Clone)]
pub struct MarkupDocument {
    rope: Rope,

    /// Line ending the text was loaded with
    line_ending: LineEnding,

    /// Incremented on each change
    version: u64,

    /// Version when last saved
    saved_version: u64,
}

impl MarkupDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            line_ending: LineEnding::default(),
            version: 0,
            saved_version: 0,
        }
    }

    /// Create a document from text. Stored internally with LF endings.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(&text.replace("\r\n", "\n")),
            line_ending: LineEnding::detect(text),
            version: 0,
            saved_version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Check if the text changed since the last save
    pub fn is_modified(&self) -> bool {
        self.version != self.saved_version
    }

    pub fn mark_saved(&mut self) {
        self.saved_version = self.version;
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Whole text with LF line endings, as the parser expects it
    pub fn snapshot(&self) -> String {
        self.rope.to_string()
    }

    /// Whole text with the original line endings restored
    pub fn text(&self) -> String {
        let content = self.rope.to_string();
        match self.line_ending {
            LineEnding::Lf => content,
            LineEnding::Crlf => content.replace('\n', "\r\n"),
        }
    }

    /// Replace the whole text
    pub fn set_text(&mut self, text: &str) {
        self.line_ending = LineEnding::detect(text);
        self.rope = Rope::from_str(&text.replace("\r\n", "\n"));
        self.version += 1;
    }

    /// Get a line without its trailing newline (0-indexed)
    pub fn line(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        Some(self.rope.line(line_idx).to_string().trim_end_matches('\n').to_string())
    }

    /// Insert text at a character offset, clamped to the end
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let idx = char_idx.min(self.rope.len_chars());
        self.rope.insert(idx, &text.replace("\r\n", "\n"));
        self.version += 1;
    }

    /// Append text at the end
    pub fn append(&mut self, text: &str) {
        self.insert(self.rope.len_chars(), text);
    }

    /// Append a snippet on a new line
    pub fn append_snippet(&mut self, snippet: &str) {
        self.append(&format!("\n{}", snippet));
    }

    /// Append a tutorial example
    pub fn insert_example(&mut self, snippet: &Snippet) {
        log::debug!("Inserting example '{}'", snippet.title);
        self.append_snippet(snippet.content);
    }

    /// Append a toolbar quick insert
    pub fn insert_quick(&mut self, quick: &QuickInsert) {
        self.append_snippet(quick.syntax);
    }

    /// Count words in the document
    pub fn word_count(&self) -> usize {
        self.rope
            .lines()
            .map(|line| line.to_string().split_whitespace().count())
            .sum()
    }
}

impl Default for MarkupDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for MarkupDocument {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl From<String> for MarkupDocument {
    fn from(text: String) -> Self {
        Self::from_text(&text)
    }
}
