//! Markdown parsing
//!
//! Walks pulldown-cmark events into a [`Document`] tree. The walk keeps a
//! stack of open frames: containers collect blocks, spans collect inlines,
//! and each `End` event folds the top frame into its parent.
//!
//! Tree-building rules on top of CommonMark:
//! - emphasis wrapping strong (or strong wrapping emphasis) with nothing else
//!   inside becomes a single [`EmphasisKind::StrongItalic`] span
//! - raw HTML is kept as text, so it is escaped on render
//! - links or images with an empty destination stay literal
//! - containers nested past [`MAX_BLOCK_DEPTH`] and spans nested past
//!   [`MAX_INLINE_DEPTH`] are dissolved into their parent

use pulldown_cmark::{
    Alignment as CmarkAlignment, CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag,
};

use super::node::{
    plain_text, Alignment, Block, Cell, Document, EmphasisKind, Inline, List, ListItem, ListKind,
    Table,
};

/// Quotes, lists and footnote bodies nested deeper than this are dissolved
pub const MAX_BLOCK_DEPTH: usize = 32;

/// Emphasis, links and images nested deeper than this are dissolved
pub const MAX_INLINE_DEPTH: usize = 16;

/// Extensions enabled on top of CommonMark
pub fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Parse Markdown text into a document tree. Never fails.
pub fn parse(text: &str) -> Document {
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(text, parser_options()) {
        builder.event(event);
    }
    builder.finish()
}

enum ContainerKind {
    Root,
    Quote,
    Item,
    Footnote(String),
}

enum SpanKind {
    /// Implicit paragraphs hold the bare text of tight list items and raw
    /// HTML blocks
    Paragraph { implicit: bool },
    Heading(u8),
    Emphasis,
    Strong,
    Strikethrough,
    Link(String),
    Image(String),
    Cell,
}

impl SpanKind {
    fn counts_toward_depth(&self) -> bool {
        matches!(
            self,
            SpanKind::Emphasis
                | SpanKind::Strong
                | SpanKind::Strikethrough
                | SpanKind::Link(_)
                | SpanKind::Image(_)
        )
    }
}

enum Frame {
    Container {
        kind: ContainerKind,
        checked: Option<bool>,
        blocks: Vec<Block>,
    },
    List {
        kind: ListKind,
        tight: bool,
        items: Vec<ListItem>,
    },
    Table {
        alignments: Vec<Alignment>,
        header: Vec<Cell>,
        rows: Vec<Vec<Cell>>,
        row: Vec<Cell>,
        in_head: bool,
    },
    Code {
        language: Option<String>,
        code: String,
    },
    Span {
        kind: SpanKind,
        children: Vec<Inline>,
    },
    /// Stands in for a tag whose content goes to the enclosing frame
    Transparent,
}

struct TreeBuilder {
    stack: Vec<Frame>,
    block_depth: usize,
    inline_depth: usize,
    /// Set after a task marker so the item text loses its leading space
    trim_next_text: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![container(ContainerKind::Root)],
            block_depth: 0,
            inline_depth: 0,
            trim_next_text: false,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_inline(Inline::Code(code.into_string())),
            Event::Html(html) => self.text(&html),
            Event::FootnoteReference(label) => {
                self.push_inline(Inline::FootnoteReference(label.into_string()))
            }
            Event::SoftBreak | Event::HardBreak => self.push_inline(Inline::SoftBreak),
            Event::Rule => {
                self.close_implicit_paragraph();
                self.push_block(Block::ThematicBreak);
            }
            Event::TaskListMarker(checked) => self.task_marker(checked),
        }
    }

    fn finish(mut self) -> Document {
        while self.stack.len() > 1 {
            if let Some(frame) = self.stack.pop() {
                self.finish_frame(frame);
            }
        }
        match self.stack.pop() {
            Some(Frame::Container { blocks, .. }) => Document::new(blocks),
            _ => Document::default(),
        }
    }

    /// Nearest frame that accepts content
    fn top_mut(&mut self) -> Option<&mut Frame> {
        self.stack
            .iter_mut()
            .rev()
            .find(|frame| !matches!(frame, Frame::Transparent))
    }

    fn start(&mut self, tag: Tag<'_>) {
        if is_block_tag(&tag) {
            self.close_implicit_paragraph();
        }

        let frame = match tag {
            Tag::Paragraph => {
                self.mark_list_loose();
                span(SpanKind::Paragraph { implicit: false })
            }
            Tag::Heading(level, _, _) => span(SpanKind::Heading(level as u8)),
            Tag::BlockQuote => self.nested_block(container(ContainerKind::Quote)),
            Tag::CodeBlock(kind) => Frame::Code {
                language: code_language(&kind),
                code: String::new(),
            },
            Tag::List(start) => {
                let kind = match start {
                    Some(start) => ListKind::Ordered { start },
                    None => ListKind::Unordered,
                };
                self.nested_block(Frame::List {
                    kind,
                    tight: true,
                    items: Vec::new(),
                })
            }
            Tag::Item => {
                // A dissolved list dissolves its items too
                if matches!(self.top_mut(), Some(Frame::List { .. })) {
                    container(ContainerKind::Item)
                } else {
                    Frame::Transparent
                }
            }
            Tag::FootnoteDefinition(label) => {
                self.nested_block(container(ContainerKind::Footnote(label.into_string())))
            }
            Tag::Table(alignments) => Frame::Table {
                alignments: alignments.into_iter().map(convert_alignment).collect(),
                header: Vec::new(),
                rows: Vec::new(),
                row: Vec::new(),
                in_head: false,
            },
            Tag::TableHead => {
                if let Some(Frame::Table { in_head, .. }) = self.top_mut() {
                    *in_head = true;
                }
                Frame::Transparent
            }
            Tag::TableRow => Frame::Transparent,
            Tag::TableCell => span(SpanKind::Cell),
            Tag::Emphasis => self.nested_span(SpanKind::Emphasis),
            Tag::Strong => self.nested_span(SpanKind::Strong),
            Tag::Strikethrough => self.nested_span(SpanKind::Strikethrough),
            Tag::Link(link_type, dest, _title) => {
                self.nested_span(SpanKind::Link(link_href(link_type, dest)))
            }
            Tag::Image(_, src, _title) => self.nested_span(SpanKind::Image(src.into_string())),
        };
        self.stack.push(frame);
    }

    fn end(&mut self, tag: Tag<'_>) {
        self.close_implicit_paragraph();
        if self.stack.len() <= 1 {
            return;
        }
        match self.stack.pop() {
            Some(Frame::Transparent) => match tag {
                Tag::TableHead => self.finish_row(true),
                Tag::TableRow => self.finish_row(false),
                _ => {}
            },
            Some(frame) => self.finish_frame(frame),
            None => {}
        }
    }

    fn nested_block(&mut self, frame: Frame) -> Frame {
        if self.block_depth >= MAX_BLOCK_DEPTH {
            return Frame::Transparent;
        }
        self.block_depth += 1;
        frame
    }

    fn nested_span(&mut self, kind: SpanKind) -> Frame {
        if self.inline_depth >= MAX_INLINE_DEPTH {
            return Frame::Transparent;
        }
        self.inline_depth += 1;
        span(kind)
    }

    fn finish_frame(&mut self, frame: Frame) {
        match frame {
            Frame::Container {
                kind,
                checked,
                blocks,
            } => match kind {
                ContainerKind::Root => {}
                ContainerKind::Quote => {
                    self.block_depth -= 1;
                    self.push_block(Block::Blockquote(blocks));
                }
                ContainerKind::Item => {
                    if let Some(Frame::List { items, .. }) = self.top_mut() {
                        items.push(ListItem {
                            checked,
                            content: blocks,
                        });
                    }
                }
                ContainerKind::Footnote(label) => {
                    self.block_depth -= 1;
                    self.push_block(Block::FootnoteDefinition {
                        label,
                        content: blocks,
                    });
                }
            },
            Frame::List { kind, tight, items } => {
                self.block_depth -= 1;
                self.push_block(Block::List(List { kind, tight, items }));
            }
            Frame::Table {
                alignments,
                mut header,
                mut rows,
                ..
            } => {
                let columns = alignments.len();
                header.resize_with(columns, Vec::new);
                for row in &mut rows {
                    row.resize_with(columns, Vec::new);
                }
                self.push_block(Block::Table(Table {
                    alignments,
                    header,
                    rows,
                }));
            }
            Frame::Code { language, mut code } => {
                if !code.is_empty() && !code.ends_with('\n') {
                    code.push('\n');
                }
                self.push_block(Block::CodeBlock { language, code });
            }
            Frame::Span { kind, children } => self.finish_span(kind, children),
            Frame::Transparent => {}
        }
    }

    fn finish_span(&mut self, kind: SpanKind, children: Vec<Inline>) {
        if kind.counts_toward_depth() {
            self.inline_depth -= 1;
        }

        match kind {
            SpanKind::Paragraph { implicit } => {
                let children = if implicit {
                    trim_trailing_whitespace(children)
                } else {
                    children
                };
                if !children.is_empty() {
                    self.push_block(Block::Paragraph(children));
                }
            }
            SpanKind::Heading(level) => self.push_block(Block::Heading {
                level,
                content: children,
            }),
            SpanKind::Emphasis => self.push_inline(emphasis(EmphasisKind::Italic, children)),
            SpanKind::Strong => self.push_inline(emphasis(EmphasisKind::Strong, children)),
            SpanKind::Strikethrough => self.push_inline(Inline::Emphasis {
                kind: EmphasisKind::Strikethrough,
                children,
            }),
            SpanKind::Link(href) if href.is_empty() => {
                self.push_inline(Inline::Text("[".to_string()));
                for child in children {
                    self.push_inline(child);
                }
                self.push_inline(Inline::Text("]()".to_string()));
            }
            SpanKind::Link(href) => self.push_inline(Inline::Link { href, children }),
            SpanKind::Image(src) => {
                let alt = plain_text(&children);
                if src.is_empty() {
                    self.push_inline(Inline::Text(format!("![{}]()", alt)));
                } else {
                    self.push_inline(Inline::Image { src, alt });
                }
            }
            SpanKind::Cell => {
                if let Some(Frame::Table { row, .. }) = self.top_mut() {
                    row.push(children);
                }
            }
        }
    }

    fn finish_row(&mut self, head_ended: bool) {
        if let Some(Frame::Table {
            header,
            rows,
            row,
            in_head,
            ..
        }) = self.top_mut()
        {
            let cells = std::mem::take(row);
            if *in_head {
                if !cells.is_empty() {
                    *header = cells;
                }
            } else {
                rows.push(cells);
            }
            if head_ended {
                *in_head = false;
            }
        }
    }

    fn text(&mut self, text: &str) {
        let text = if std::mem::take(&mut self.trim_next_text) {
            text.trim_start()
        } else {
            text
        };

        if let Some(Frame::Code { code, .. }) = self.top_mut() {
            code.push_str(text);
            return;
        }
        if !text.is_empty() {
            self.push_inline(Inline::Text(text.to_string()));
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        self.trim_next_text = false;

        if matches!(self.top_mut(), Some(Frame::Container { .. })) {
            self.stack.push(span(SpanKind::Paragraph { implicit: true }));
        }
        if let Some(Frame::Span { children, .. }) = self.top_mut() {
            push_merged(children, inline);
        }
    }

    fn push_block(&mut self, block: Block) {
        if let Some(Frame::Container { blocks, .. }) = self.top_mut() {
            blocks.push(block);
        }
    }

    fn close_implicit_paragraph(&mut self) {
        let open = matches!(
            self.stack.last(),
            Some(Frame::Span {
                kind: SpanKind::Paragraph { implicit: true },
                ..
            })
        );
        if !open {
            return;
        }
        if let Some(Frame::Span { kind, children }) = self.stack.pop() {
            self.finish_span(kind, children);
        }
    }

    /// Items of tight lists carry bare text; explicit paragraphs mean loose
    fn mark_list_loose(&mut self) {
        let mut frames = self
            .stack
            .iter_mut()
            .rev()
            .filter(|frame| !matches!(frame, Frame::Transparent));
        if let Some(Frame::Container {
            kind: ContainerKind::Item,
            ..
        }) = frames.next()
        {
            if let Some(Frame::List { tight, .. }) = frames.next() {
                *tight = false;
            }
        }
    }

    fn task_marker(&mut self, checked: bool) {
        let item = self
            .stack
            .iter_mut()
            .rev()
            .find(|frame| matches!(frame, Frame::Container { .. }));
        if let Some(Frame::Container {
            kind: ContainerKind::Item,
            checked: slot,
            ..
        }) = item
        {
            *slot = Some(checked);
        }
        self.trim_next_text = true;
    }
}

fn container(kind: ContainerKind) -> Frame {
    Frame::Container {
        kind,
        checked: None,
        blocks: Vec::new(),
    }
}

fn span(kind: SpanKind) -> Frame {
    Frame::Span {
        kind,
        children: Vec::new(),
    }
}

fn is_block_tag(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Paragraph
            | Tag::Heading(..)
            | Tag::BlockQuote
            | Tag::CodeBlock(_)
            | Tag::List(_)
            | Tag::Item
            | Tag::FootnoteDefinition(_)
            | Tag::Table(_)
    )
}

fn code_language(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
        CodeBlockKind::Indented => None,
    }
}

fn convert_alignment(alignment: CmarkAlignment) -> Alignment {
    match alignment {
        CmarkAlignment::None => Alignment::None,
        CmarkAlignment::Left => Alignment::Left,
        CmarkAlignment::Center => Alignment::Center,
        CmarkAlignment::Right => Alignment::Right,
    }
}

fn link_href(link_type: LinkType, dest: CowStr<'_>) -> String {
    match link_type {
        LinkType::Email => format!("mailto:{}", &*dest),
        _ => dest.into_string(),
    }
}

/// `***x***` and `___x___` arrive as emphasis wrapping strong
fn emphasis(kind: EmphasisKind, mut children: Vec<Inline>) -> Inline {
    let folds = matches!(
        (kind, children.as_slice()),
        (
            EmphasisKind::Italic,
            [Inline::Emphasis {
                kind: EmphasisKind::Strong,
                ..
            }]
        ) | (
            EmphasisKind::Strong,
            [Inline::Emphasis {
                kind: EmphasisKind::Italic,
                ..
            }]
        )
    );
    if folds {
        match children.pop() {
            Some(Inline::Emphasis {
                children: inner, ..
            }) => {
                return Inline::Emphasis {
                    kind: EmphasisKind::StrongItalic,
                    children: inner,
                };
            }
            other => children.extend(other),
        }
    }
    Inline::Emphasis { kind, children }
}

/// pulldown-cmark splits text at every delimiter candidate
fn push_merged(children: &mut Vec<Inline>, inline: Inline) {
    if let Inline::Text(text) = &inline {
        if let Some(Inline::Text(last)) = children.last_mut() {
            last.push_str(text);
            return;
        }
    }
    children.push(inline);
}

fn trim_trailing_whitespace(mut children: Vec<Inline>) -> Vec<Inline> {
    if let Some(Inline::Text(last)) = children.last_mut() {
        let trimmed = last.trim_end().len();
        last.truncate(trimmed);
        if last.is_empty() {
            children.pop();
        }
    }
    children
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn inlines(input: &str) -> Vec<Inline> {
        match parse(input).blocks.into_iter().next() {
            Some(Block::Paragraph(content)) => content,
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n   \n").is_empty());
    }

    #[test]
    fn test_headings() {
        let doc = parse("# Heading 1\n###### Six\n####### Seven");
        assert_eq!(
            doc.blocks[0],
            Block::Heading {
                level: 1,
                content: vec![text("Heading 1")]
            }
        );
        assert!(matches!(doc.blocks[1], Block::Heading { level: 6, .. }));
        assert!(matches!(doc.blocks[2], Block::Paragraph(_)));
    }

    #[test]
    fn test_heading_requires_space() {
        let doc = parse("#hashtag");
        assert_eq!(doc.blocks, vec![Block::Paragraph(vec![text("#hashtag")])]);
    }

    #[test]
    fn test_heading_closing_sequence() {
        let doc = parse("## Title ##");
        assert_eq!(
            doc.blocks[0],
            Block::Heading {
                level: 2,
                content: vec![text("Title")]
            }
        );
    }

    #[test]
    fn test_thematic_breaks() {
        let doc = parse("---\n\n***\n\n___\n\n- - -");
        assert_eq!(doc.blocks, vec![Block::ThematicBreak; 4]);
    }

    #[test]
    fn test_code_block() {
        let doc = parse("```rust\nlet x = 42;\n```\nafter");
        assert_eq!(
            doc.blocks[0],
            Block::CodeBlock {
                language: Some("rust".to_string()),
                code: "let x = 42;\n".to_string(),
            }
        );
        assert_eq!(doc.blocks[1], Block::Paragraph(vec![text("after")]));
    }

    #[test]
    fn test_unterminated_code_block() {
        let doc = parse("```\n# not a heading\n**still code**");
        assert_eq!(
            doc.blocks,
            vec![Block::CodeBlock {
                language: None,
                code: "# not a heading\n**still code**\n".to_string(),
            }]
        );
    }

    #[test]
    fn test_blockquote_is_recursive() {
        let doc = parse("> # Quoted\n> text\n>> nested");
        match &doc.blocks[0] {
            Block::Blockquote(inner) => {
                assert!(matches!(inner[0], Block::Heading { level: 1, .. }));
                assert!(matches!(inner[1], Block::Paragraph(_)));
                assert!(matches!(inner[2], Block::Blockquote(_)));
            }
            other => panic!("expected blockquote, got {:?}", other),
        }
    }

    #[test]
    fn test_unordered_list() {
        let doc = parse("- one\n- two\n\nafter");
        match &doc.blocks[0] {
            Block::List(list) => {
                assert_eq!(list.kind, ListKind::Unordered);
                assert!(list.tight);
                assert_eq!(list.items.len(), 2);
                assert_eq!(list.items[0].content, vec![Block::Paragraph(vec![text("one")])]);
            }
            other => panic!("expected list, got {:?}", other),
        }
        assert_eq!(doc.blocks[1], Block::Paragraph(vec![text("after")]));
    }

    #[test]
    fn test_ordered_list_start() {
        let doc = parse("3. three\n4. four");
        match &doc.blocks[0] {
            Block::List(list) => {
                assert_eq!(list.kind, ListKind::Ordered { start: 3 });
                assert_eq!(list.items.len(), 2);
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_only_first_ordinal_interrupts_paragraph() {
        let doc = parse("The year\n2024. was good");
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph(vec![
                text("The year"),
                Inline::SoftBreak,
                text("2024. was good"),
            ])]
        );

        let doc = parse("Steps\n1. first");
        assert!(matches!(doc.blocks[1], Block::List(_)));
    }

    #[test]
    fn test_task_list() {
        let doc = parse("- [x] done\n- [ ] todo\n- [X] also done");
        match &doc.blocks[0] {
            Block::List(list) => {
                let states: Vec<_> = list.items.iter().map(|i| i.checked).collect();
                assert_eq!(states, vec![Some(true), Some(false), Some(true)]);
                assert_eq!(list.items[0].content, vec![Block::Paragraph(vec![text("done")])]);
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_list() {
        let doc = parse("- outer\n  - inner\n- second");
        match &doc.blocks[0] {
            Block::List(list) => {
                assert!(list.tight);
                assert_eq!(list.items.len(), 2);
                assert_eq!(list.items[0].content[0], Block::Paragraph(vec![text("outer")]));
                assert!(matches!(list.items[0].content[1], Block::List(_)));
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_loose_list() {
        let doc = parse("- one\n\n- two");
        match &doc.blocks[0] {
            Block::List(list) => {
                assert!(!list.tight);
                assert_eq!(list.items.len(), 2);
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_table_alignment() {
        let doc = parse("| A | B |\n| :--- | ---: |\n| 1 | 2 |");
        match &doc.blocks[0] {
            Block::Table(table) => {
                assert_eq!(table.alignments, vec![Alignment::Left, Alignment::Right]);
                assert_eq!(table.header, vec![vec![text("A")], vec![text("B")]]);
                assert_eq!(table.rows, vec![vec![vec![text("1")], vec![text("2")]]]);
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_table_rows_are_padded() {
        let doc = parse("| A | B | C |\n|---|:-:|---|\n| 1 |");
        match &doc.blocks[0] {
            Block::Table(table) => {
                assert_eq!(table.alignments[1], Alignment::Center);
                assert_eq!(table.rows[0].len(), 3);
                assert!(table.rows[0][2].is_empty());
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_table_column_mismatch_is_paragraph() {
        let doc = parse("| A | B |\n| --- |");
        assert!(matches!(doc.blocks[0], Block::Paragraph(_)));
    }

    #[test]
    fn test_footnote_definition() {
        let doc = parse("Text[^1]\n\n[^1]: The note");
        assert_eq!(
            doc.blocks[0],
            Block::Paragraph(vec![text("Text"), Inline::FootnoteReference("1".to_string())])
        );
        assert_eq!(
            doc.blocks[1],
            Block::FootnoteDefinition {
                label: "1".to_string(),
                content: vec![Block::Paragraph(vec![text("The note")])],
            }
        );
    }

    #[test]
    fn test_footnote_label_with_punctuation() {
        let doc = parse("Text[^a.b]\n\n[^a.b]: the note");
        assert_eq!(
            doc.blocks[0],
            Block::Paragraph(vec![text("Text"), Inline::FootnoteReference("a.b".to_string())])
        );
        assert!(matches!(
            &doc.blocks[1],
            Block::FootnoteDefinition { label, .. } if label == "a.b"
        ));
    }

    #[test]
    fn test_paragraph_soft_breaks() {
        let doc = parse("line one\nline **two**");
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph(vec![
                text("line one"),
                Inline::SoftBreak,
                text("line "),
                Inline::Emphasis {
                    kind: EmphasisKind::Strong,
                    children: vec![text("two")],
                },
            ])]
        );
    }

    #[test]
    fn test_paragraph_interrupted_by_block() {
        let doc = parse("para\n# Heading\n- item");
        assert_eq!(doc.blocks.len(), 3);
    }

    #[test]
    fn test_crlf_input() {
        let doc = parse("# Title\r\n\r\nbody\r\n");
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[1], Block::Paragraph(vec![text("body")]));
    }

    #[test]
    fn test_raw_html_is_text() {
        let doc = parse("<div onclick=\"x()\">hi</div>\n\nsay <b>hi</b>");
        assert_eq!(
            doc.blocks[0],
            Block::Paragraph(vec![text("<div onclick=\"x()\">hi</div>")])
        );
        assert_eq!(doc.blocks[1], Block::Paragraph(vec![text("say <b>hi</b>")]));
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            inlines("**bold** and *italic*"),
            vec![
                Inline::Emphasis {
                    kind: EmphasisKind::Strong,
                    children: vec![text("bold")],
                },
                text(" and "),
                Inline::Emphasis {
                    kind: EmphasisKind::Italic,
                    children: vec![text("italic")],
                },
            ]
        );
    }

    #[test]
    fn test_triple_emphasis_is_single_node() {
        let strong_italic = vec![Inline::Emphasis {
            kind: EmphasisKind::StrongItalic,
            children: vec![text("x")],
        }];
        assert_eq!(inlines("***x***"), strong_italic);
        assert_eq!(inlines("___x___"), strong_italic);
    }

    #[test]
    fn test_nested_emphasis_keeps_structure() {
        assert_eq!(
            inlines("**bold *and italic***"),
            vec![Inline::Emphasis {
                kind: EmphasisKind::Strong,
                children: vec![
                    text("bold "),
                    Inline::Emphasis {
                        kind: EmphasisKind::Italic,
                        children: vec![text("and italic")],
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(
            inlines("~~gone~~"),
            vec![Inline::Emphasis {
                kind: EmphasisKind::Strikethrough,
                children: vec![text("gone")],
            }]
        );
    }

    #[test]
    fn test_unclosed_emphasis_is_literal() {
        assert_eq!(inlines("**open"), vec![text("**open")]);
        assert_eq!(inlines("snake_case_name"), vec![text("snake_case_name")]);
    }

    #[test]
    fn test_code_span_is_not_rescanned() {
        assert_eq!(
            inlines("`*not emphasis*`"),
            vec![Inline::Code("*not emphasis*".to_string())]
        );
    }

    #[test]
    fn test_link() {
        assert_eq!(
            inlines("[site](https://example.com \"Title\")"),
            vec![Inline::Link {
                href: "https://example.com".to_string(),
                children: vec![text("site")],
            }]
        );
    }

    #[test]
    fn test_malformed_links_stay_literal() {
        assert_eq!(inlines("[text](missing"), vec![text("[text](missing")]);
        assert_eq!(inlines("[text]()"), vec![text("[text]()")]);
        assert_eq!(inlines("![alt]("), vec![text("![alt](")]);
    }

    #[test]
    fn test_bare_urls_are_not_linked() {
        assert_eq!(
            inlines("[https://a.com](https://b.com)"),
            vec![Inline::Link {
                href: "https://b.com".to_string(),
                children: vec![text("https://a.com")],
            }]
        );
        assert_eq!(inlines("see https://a.com"), vec![text("see https://a.com")]);
    }

    #[test]
    fn test_image() {
        assert_eq!(
            inlines("![a *cat*](cat.png)"),
            vec![Inline::Image {
                src: "cat.png".to_string(),
                alt: "a cat".to_string(),
            }]
        );
    }

    #[test]
    fn test_escapes() {
        assert_eq!(inlines(r"\*not\*"), vec![text("*not*")]);
    }

    #[test]
    fn test_deeply_nested_quotes_terminate() {
        let input = ">".repeat(500) + " deep";
        let doc = parse(&input);
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn test_deep_inline_nesting_keeps_text() {
        let input = format!("{}x{}", "**".repeat(100), "**".repeat(100));
        assert_eq!(plain_text(&inlines(&input)), "x");
    }

    #[test]
    fn test_long_unmatched_emphasis_run() {
        let input = "*a ".repeat(20_000);
        assert_eq!(plain_text(&inlines(&input)), input.trim_end());
    }
}
