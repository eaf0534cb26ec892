//! Snippet catalog
//!
//! Tutorial examples and toolbar quick inserts offered by the editor. Both are
//! inserted through [`crate::editor::MarkupDocument::append_snippet`].

/// A tutorial entry: an example with an explanation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snippet {
    pub title: &'static str,
    pub content: &'static str,
    pub description: &'static str,
    /// Suggested exercise, if any
    pub practice: Option<&'static str>,
}

/// A toolbar button and the markup it inserts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickInsert {
    pub label: &'static str,
    pub syntax: &'static str,
}

pub const SNIPPETS: &[Snippet] = &[
    Snippet {
        title: "Basics",
        content: "# Heading example\n\nThis is **bold** and *italic* text\n\n- List item 1\n- List item 2\n\n1. Ordered item 1\n2. Ordered item 2\n\n> This is a quote\n\n---\n\n`inline code` example\n\n```\ncode block example\n```",
        description: "The most common Markdown elements in one place, a good starting point",
        practice: Some("Write a short document with a heading, a list and a quote"),
    },
    Snippet {
        title: "Lists",
        content: "- Unordered item 1\n- Unordered item 2\n\n1. Ordered item 1\n2. Ordered item 2",
        description: "Use - for unordered lists and a number with a dot for ordered lists",
        practice: None,
    },
    Snippet {
        title: "Emphasis",
        content: "**Bold text**\n*Italic text*\n***Bold italic text***",
        description: "Wrap text in * or _: one for italic, two for bold, three for bold italic",
        practice: None,
    },
    Snippet {
        title: "Links and images",
        content: "[Link text](https://example.com)\n![Image description](https://example.com/image.jpg)",
        description: "Use [text](URL) for links and ![description](image URL) for images",
        practice: None,
    },
    Snippet {
        title: "Quotes and code",
        content: "> This is a quote\n\n`This is inline code`\n\n```\nThis is a code block\n```",
        description: "Use > for quotes, backticks for inline code and three backticks for code blocks",
        practice: None,
    },
    Snippet {
        title: "Tables",
        content: "| Header 1 | Header 2 |\n| --- | --- |\n| Cell 1 | Cell 2 |\n| Cell 3 | Cell 4 |",
        description: "Separate cells with | and the header from the body with a row of -",
        practice: None,
    },
    Snippet {
        title: "Task lists",
        content: "- [x] Completed task\n- [ ] Open task\n- [ ] To do",
        description: "Use - [ ] for open items and - [x] for completed ones",
        practice: None,
    },
    Snippet {
        title: "Footnotes",
        content: "This text has a footnote[^1]\n\n[^1]: This is the footnote content",
        description: "Reference a footnote with [^label] and define it with [^label]: at the bottom",
        practice: None,
    },
    Snippet {
        title: "Horizontal rules",
        content: "---\n***\n___",
        description: "Three or more -, * or _ make a horizontal rule",
        practice: None,
    },
    Snippet {
        title: "Advanced formatting",
        content: "~~Strikethrough text~~\n==Highlighted text==\nSuperscript^2^\nSubscript~2~",
        description: "~~ strikes text through; ==, ^ and ~ for highlight, superscript and subscript are only supported by some editors",
        practice: None,
    },
];

pub const QUICK_INSERTS: &[QuickInsert] = &[
    QuickInsert { label: "Heading", syntax: "# " },
    QuickInsert { label: "Subheading", syntax: "## " },
    QuickInsert { label: "Bold", syntax: "**bold**" },
    QuickInsert { label: "Italic", syntax: "*italic*" },
    QuickInsert { label: "Strikethrough", syntax: "~~strikethrough~~" },
    QuickInsert { label: "Unordered list", syntax: "- " },
    QuickInsert { label: "Ordered list", syntax: "1. " },
    QuickInsert { label: "Task list", syntax: "- [ ] " },
    QuickInsert { label: "Quote", syntax: "> " },
    QuickInsert { label: "Code block", syntax: "```\ncode\n```" },
    QuickInsert { label: "Link", syntax: "[link text](url)" },
    QuickInsert { label: "Image", syntax: "![image description](url)" },
    QuickInsert { label: "Table", syntax: "| Header 1 | Header 2 |\n| --- | --- |\n| Cell 1 | Cell 2 |" },
];

/// Look up a tutorial entry by title (case-insensitive)
pub fn find_snippet(title: &str) -> Option<&'static Snippet> {
    SNIPPETS.iter().find(|s| s.title.eq_ignore_ascii_case(title))
}
