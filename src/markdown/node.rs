//! Structural tree produced by the Markdown parser
//!
//! The tree is built once per parse and never mutated afterwards. Children are
//! owned by their parent; there are no back references.

/// Root of a parsed document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Block-level constructs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// ATX heading, level 1-6
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    List(List),
    Blockquote(Vec<Block>),
    /// Fenced code block with its (optional) language tag
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Table(Table),
    ThematicBreak,
    /// `[^label]: content`, resolved against references at render time
    FootnoteDefinition { label: String, content: Vec<Block> },
}

/// Bullet or numbered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub kind: ListKind,
    /// Tight lists render item paragraphs without `<p>` wrappers
    pub tight: bool,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered { start: u64 },
}

impl ListKind {
    pub fn is_ordered(&self) -> bool {
        matches!(self, ListKind::Ordered { .. })
    }
}

/// A list item; `checked` is set for task list items only
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListItem {
    pub checked: Option<bool>,
    pub content: Vec<Block>,
}

/// Table column alignment taken from the separator row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    /// CSS `text-align` value, if any
    pub fn css_value(&self) -> Option<&'static str> {
        match self {
            Alignment::None => None,
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
        }
    }
}

/// A table cell is a run of inline content
pub type Cell = Vec<Inline>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub alignments: Vec<Alignment>,
    pub header: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.alignments.len()
    }
}

/// Inline constructs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Emphasis {
        kind: EmphasisKind,
        children: Vec<Inline>,
    },
    Link {
        href: String,
        children: Vec<Inline>,
    },
    Image {
        src: String,
        alt: String,
    },
    /// Inline code span; never scanned for other markup
    Code(String),
    FootnoteReference(String),
    /// Line break inside a paragraph
    SoftBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmphasisKind {
    Strong,
    Italic,
    /// `***text***`, a single node carrying both styles
    StrongItalic,
    Strikethrough,
}

impl Inline {
    /// Concatenated plain text of this node and its children
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Emphasis { children, .. } | Inline::Link { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::FootnoteReference(label) => {
                out.push_str("[^");
                out.push_str(label);
                out.push(']');
            }
            Inline::SoftBreak => out.push(' '),
        }
    }
}

/// Plain text of an inline run
pub fn plain_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::plain_text).collect()
}
