//! Document tree to sanitized HTML fragment
//!
//! Rendering is depth-first and pure. Footnotes are numbered in a pre-pass by
//! order of first reference, then collected into a trailing
//! `<section class="footnotes">`.

use std::collections::{HashMap, HashSet};

use super::highlight::{HighlightedCode, Highlighter};
use super::html::{Element, HtmlNode, RenderedFragment, SafeText};
use super::node::{
    Alignment, Block, Document, EmphasisKind, Inline, List, ListKind, ListItem, Table,
};

/// Renders parsed documents into [`RenderedFragment`]s
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    highlighter: Highlighter,
}

impl Renderer {
    pub fn new(highlighter: Highlighter) -> Self {
        Self { highlighter }
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Render a document. Never fails.
    pub fn render(&self, document: &Document) -> RenderedFragment {
        let footnotes = Footnotes::collect(document);
        let mut pass = RenderPass {
            highlighter: &self.highlighter,
            footnotes,
            emitted_refs: HashSet::new(),
        };

        let mut nodes: Vec<HtmlNode> = document
            .blocks
            .iter()
            .filter_map(|block| pass.block(block))
            .collect();

        if let Some(section) = pass.footnote_section() {
            nodes.push(section);
        }

        RenderedFragment::new(nodes)
    }
}

/// Footnote definitions and their numbering
#[derive(Default)]
struct Footnotes<'d> {
    definitions: HashMap<&'d str, &'d [Block]>,
    /// Labels in order of first reference; number is index + 1
    order: Vec<&'d str>,
    numbers: HashMap<&'d str, usize>,
}

impl<'d> Footnotes<'d> {
    fn collect(document: &'d Document) -> Self {
        let mut footnotes = Footnotes::default();
        footnotes.find_definitions(&document.blocks);
        footnotes.number_blocks(&document.blocks);

        // References inside footnote bodies extend the order
        let mut idx = 0;
        while idx < footnotes.order.len() {
            let label = footnotes.order[idx];
            if let Some(content) = footnotes.definitions.get(label).copied() {
                footnotes.number_blocks(content);
            }
            idx += 1;
        }

        footnotes
    }

    fn find_definitions(&mut self, blocks: &'d [Block]) {
        for block in blocks {
            match block {
                Block::FootnoteDefinition { label, content } => {
                    // First definition wins
                    self.definitions.entry(label.as_str()).or_insert(content.as_slice());
                }
                Block::Blockquote(children) => self.find_definitions(children),
                Block::List(list) => {
                    for item in &list.items {
                        self.find_definitions(&item.content);
                    }
                }
                _ => {}
            }
        }
    }

    fn number_blocks(&mut self, blocks: &'d [Block]) {
        for block in blocks {
            match block {
                Block::Heading { content, .. } | Block::Paragraph(content) => {
                    self.number_inlines(content)
                }
                Block::Blockquote(children) => self.number_blocks(children),
                Block::List(list) => {
                    for item in &list.items {
                        self.number_blocks(&item.content);
                    }
                }
                Block::Table(table) => {
                    for cell in table.header.iter().chain(table.rows.iter().flatten()) {
                        self.number_inlines(cell);
                    }
                }
                Block::CodeBlock { .. } | Block::ThematicBreak | Block::FootnoteDefinition { .. } => {}
            }
        }
    }

    fn number_inlines(&mut self, inlines: &'d [Inline]) {
        for inline in inlines {
            match inline {
                Inline::FootnoteReference(label) => {
                    let label = label.as_str();
                    if self.definitions.contains_key(label) && !self.numbers.contains_key(label) {
                        self.order.push(label);
                        self.numbers.insert(label, self.order.len());
                    }
                }
                Inline::Emphasis { children, .. } | Inline::Link { children, .. } => {
                    self.number_inlines(children)
                }
                _ => {}
            }
        }
    }
}

struct RenderPass<'r, 'd> {
    highlighter: &'r Highlighter,
    footnotes: Footnotes<'d>,
    /// Footnote numbers whose first reference already carries the `fnref` id
    emitted_refs: HashSet<usize>,
}

impl<'r, 'd> RenderPass<'r, 'd> {
    fn blocks(&mut self, blocks: &[Block]) -> Vec<HtmlNode> {
        blocks.iter().filter_map(|block| self.block(block)).collect()
    }

    fn block(&mut self, block: &Block) -> Option<HtmlNode> {
        let node = match block {
            Block::Heading { level, content } => {
                Element::new(heading_tag(*level)).with_children(self.inlines(content))
            }
            Block::Paragraph(content) => Element::new("p").with_children(self.inlines(content)),
            Block::List(list) => self.list(list),
            Block::Blockquote(children) => {
                let children = self.blocks(children);
                Element::new("blockquote").with_children(children)
            }
            Block::CodeBlock { language, code } => self.code_block(language.as_deref(), code),
            Block::Table(table) => self.table(table),
            Block::ThematicBreak => Element::new("hr"),
            // Emitted in the footnote section, if referenced
            Block::FootnoteDefinition { .. } => return None,
        };
        Some(node.into())
    }

    fn list(&mut self, list: &List) -> Element {
        let mut element = match list.kind {
            ListKind::Unordered => Element::new("ul"),
            ListKind::Ordered { start: 1 } => Element::new("ol"),
            ListKind::Ordered { start } => Element::new("ol").attr("start", &start.to_string()),
        };

        for item in &list.items {
            let li = self.list_item(item, list.tight);
            element = element.child(li);
        }
        element
    }

    fn list_item(&mut self, item: &ListItem, tight: bool) -> Element {
        let mut li = Element::new("li");

        if let Some(checked) = item.checked {
            let mut checkbox = Element::new("input")
                .attr("type", "checkbox")
                .attr("class", "task-list-item-checkbox")
                .flag("disabled");
            if checked {
                checkbox = checkbox.flag("checked");
            }
            li = li
                .attr("class", "task-list-item")
                .child(checkbox)
                .child(SafeText::trusted(" "));
        }

        if tight {
            for block in &item.content {
                match block {
                    Block::Paragraph(content) => {
                        let inlines = self.inlines(content);
                        li = li.with_children(inlines);
                    }
                    other => {
                        if let Some(node) = self.block(other) {
                            li = li.child(node);
                        }
                    }
                }
            }
            li
        } else {
            let children = self.blocks(&item.content);
            li.with_children(children)
        }
    }

    fn code_block(&self, language: Option<&str>, code: &str) -> Element {
        let mut code_el = Element::new("code");
        if let Some(language) = language {
            code_el = code_el.attr("class", &format!("language-{}", language));
        }

        match self.highlighter.highlight(code, language) {
            HighlightedCode::Highlighted(spans) => {
                let prefix = self.highlighter.class_prefix();
                for span in spans {
                    code_el = match span.class {
                        Some(class) => code_el.child(
                            Element::new("span")
                                .attr("class", &format!("{}{}", prefix, class))
                                .child(HtmlNode::text(&span.text)),
                        ),
                        None => code_el.child(HtmlNode::text(&span.text)),
                    };
                }
            }
            HighlightedCode::Plain(text) => {
                if !text.is_empty() {
                    code_el = code_el.child(HtmlNode::text(&text));
                }
            }
        }

        Element::new("pre").child(code_el)
    }

    fn table(&mut self, table: &Table) -> Element {
        let mut header_row = Element::new("tr");
        for (idx, cell) in table.header.iter().enumerate() {
            let th = self.table_cell("th", cell, table.alignments.get(idx).copied());
            header_row = header_row.child(th);
        }

        let mut element = Element::new("table").child(Element::new("thead").child(header_row));

        if !table.rows.is_empty() {
            let mut body = Element::new("tbody");
            for row in &table.rows {
                let mut tr = Element::new("tr");
                for (idx, cell) in row.iter().enumerate() {
                    let td = self.table_cell("td", cell, table.alignments.get(idx).copied());
                    tr = tr.child(td);
                }
                body = body.child(tr);
            }
            element = element.child(body);
        }

        element
    }

    fn table_cell(&mut self, tag: &'static str, cell: &[Inline], alignment: Option<Alignment>) -> Element {
        let mut element = Element::new(tag);
        if let Some(align) = alignment.and_then(|a| a.css_value()) {
            element = element.attr("style", &format!("text-align:{}", align));
        }
        element.with_children(self.inlines(cell))
    }

    fn inlines(&mut self, inlines: &[Inline]) -> Vec<HtmlNode> {
        inlines.iter().map(|inline| self.inline(inline)).collect()
    }

    fn inline(&mut self, inline: &Inline) -> HtmlNode {
        match inline {
            Inline::Text(text) => HtmlNode::text(text),
            Inline::SoftBreak => HtmlNode::Text(SafeText::trusted("\n")),
            Inline::Code(code) => Element::new("code").child(HtmlNode::text(code)).into(),
            Inline::Emphasis { kind, children } => {
                let children = self.inlines(children);
                let element = match kind {
                    EmphasisKind::Strong => Element::new("strong").with_children(children),
                    EmphasisKind::Italic => Element::new("em").with_children(children),
                    EmphasisKind::StrongItalic => {
                        Element::new("strong").child(Element::new("em").with_children(children))
                    }
                    EmphasisKind::Strikethrough => Element::new("del").with_children(children),
                };
                element.into()
            }
            Inline::Link { href, children } => {
                let children = self.inlines(children);
                Element::new("a").attr("href", href).with_children(children).into()
            }
            Inline::Image { src, alt } => Element::new("img").attr("src", src).attr("alt", alt).into(),
            Inline::FootnoteReference(label) => self.footnote_reference(label),
        }
    }

    fn footnote_reference(&mut self, label: &str) -> HtmlNode {
        let Some(number) = self.footnotes.numbers.get(label).copied() else {
            return HtmlNode::text(&format!("[^{}]", label));
        };

        let mut link = Element::new("a").attr("href", &format!("#fn{}", number));
        if self.emitted_refs.insert(number) {
            link = link.attr("id", &format!("fnref{}", number));
        }

        Element::new("sup")
            .attr("class", "footnote-ref")
            .child(link.child(HtmlNode::text(&format!("[{}]", number))))
            .into()
    }

    fn footnote_section(&mut self) -> Option<HtmlNode> {
        if self.footnotes.order.is_empty() {
            return None;
        }

        let entries: Vec<(usize, &'d [Block])> = self
            .footnotes
            .order
            .iter()
            .enumerate()
            .filter_map(|(idx, label)| {
                self.footnotes
                    .definitions
                    .get(label)
                    .map(|content| (idx + 1, *content))
            })
            .collect();

        let mut list = Element::new("ol");
        for (number, content) in entries {
            let mut children = self.blocks(content);
            let backref: HtmlNode = Element::new("a")
                .attr("href", &format!("#fnref{}", number))
                .attr("class", "footnote-backref")
                .child(SafeText::trusted("\u{21a9}"))
                .into();

            // The back-link joins a trailing paragraph, otherwise it stands alone
            match children.last_mut() {
                Some(HtmlNode::Element(last)) if last.tag == "p" => {
                    last.children.push(SafeText::trusted(" ").into());
                    last.children.push(backref);
                }
                Some(_) | None => children.push(backref),
            }

            list = list.child(
                Element::new("li")
                    .attr("id", &format!("fn{}", number))
                    .attr("class", "footnote-item")
                    .with_children(children),
            );
        }

        Some(
            Element::new("section")
                .attr("class", "footnotes")
                .child(list)
                .into(),
        )
    }
}

fn heading_tag(level: u8) -> &'static str {
    match level {
        1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parser::parse;

    fn render(text: &str) -> String {
        Renderer::new(Highlighter::empty()).render(&parse(text)).to_html()
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(render("# Hi"), "<h1>Hi</h1>\n");
        assert_eq!(render("hello *world*"), "<p>hello <em>world</em></p>\n");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn test_emphasis_variants() {
        assert_eq!(
            render("**b** ~~s~~ ***bi***"),
            "<p><strong>b</strong> <del>s</del> <strong><em>bi</em></strong></p>\n"
        );
    }

    #[test]
    fn test_soft_break_is_newline() {
        assert_eq!(render("a\nb"), "<p>a\nb</p>\n");
    }

    #[test]
    fn test_tight_list() {
        assert_eq!(render("- one\n- two"), "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n");
    }

    #[test]
    fn test_loose_list_keeps_paragraphs() {
        assert_eq!(
            render("- one\n\n- two"),
            "<ul>\n<li><p>one</p>\n</li>\n<li><p>two</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_ordered_list_start() {
        assert_eq!(render("1. a"), "<ol>\n<li>a</li>\n</ol>\n");
        assert_eq!(render("5. a"), "<ol start=\"5\">\n<li>a</li>\n</ol>\n");
    }

    #[test]
    fn test_task_list_items() {
        let html = render("- [x] done\n- [ ] todo");
        assert!(html.contains(
            "<li class=\"task-list-item\"><input type=\"checkbox\" class=\"task-list-item-checkbox\" disabled checked> done</li>"
        ));
        assert!(html.contains(
            "<li class=\"task-list-item\"><input type=\"checkbox\" class=\"task-list-item-checkbox\" disabled> todo</li>"
        ));
        assert!(!html.contains("[x]"));
        assert!(!html.contains("[ ]"));
    }

    #[test]
    fn test_table_alignment_styles() {
        let html = render("| A | B | C |\n| :--- | ---: | --- |\n| 1 | 2 | 3 |");
        assert!(html.contains("<th style=\"text-align:left\">A</th>"));
        assert!(html.contains("<th style=\"text-align:right\">B</th>"));
        assert!(html.contains("<th>C</th>"));
        assert!(html.contains("<td style=\"text-align:right\">2</td>"));
        assert!(html.contains("<tbody>"));
    }

    #[test]
    fn test_table_without_rows_has_no_body() {
        let html = render("| A |\n| --- |");
        assert!(!html.contains("tbody"));
    }

    #[test]
    fn test_code_block_unknown_language_is_escaped() {
        let html = render("```nosuchlang\n<b>&</b>\n```");
        assert_eq!(
            html,
            "<pre><code class=\"language-nosuchlang\">&lt;b&gt;&amp;&lt;/b&gt;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_code_block_without_language() {
        assert_eq!(render("```\nx\n```"), "<pre><code>x\n</code></pre>\n");
    }

    #[test]
    fn test_blockquote_and_rule() {
        assert_eq!(
            render("> quote\n\n---"),
            "<blockquote>\n<p>quote</p>\n</blockquote>\n<hr>\n"
        );
    }

    #[test]
    fn test_link_and_image() {
        assert_eq!(
            render("[a](http://x.y/?a=1&b=2) ![alt](img.png)"),
            "<p><a href=\"http://x.y/?a=1&amp;b=2\">a</a> <img src=\"img.png\" alt=\"alt\"></p>\n"
        );
    }

    #[test]
    fn test_raw_html_is_escaped() {
        assert_eq!(
            render("<script>alert(\"x\")</script>"),
            "<p>&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;</p>\n"
        );
    }

    #[test]
    fn test_footnotes() {
        let html = render(
            "One[^a] two[^b] again[^a]\n\n[^b]: Bee\n\n[^a]: Ay\n\n[^unused]: Never",
        );
        assert!(html.contains(
            "<sup class=\"footnote-ref\"><a href=\"#fn1\" id=\"fnref1\">[1]</a></sup>"
        ));
        assert!(html.contains(
            "<sup class=\"footnote-ref\"><a href=\"#fn2\" id=\"fnref2\">[2]</a></sup>"
        ));
        // Repeated reference reuses the number without a second id
        assert!(html.contains("again<sup class=\"footnote-ref\"><a href=\"#fn1\">[1]</a></sup>"));

        let section_start = html.find("<section class=\"footnotes\">").unwrap();
        let section = &html[section_start..];
        let first = section.find("Ay").unwrap();
        let second = section.find("Bee").unwrap();
        assert!(first < second);
        assert!(section.contains(
            "<p>Ay <a href=\"#fnref1\" class=\"footnote-backref\">\u{21a9}</a></p>"
        ));
        assert!(!html.contains("Never"));
    }

    #[test]
    fn test_undefined_footnote_is_literal() {
        assert_eq!(render("See[^missing]"), "<p>See[^missing]</p>\n");
    }

    #[test]
    fn test_footnote_references_in_lists_and_tables() {
        let html = render(
            "- item[^a]\n\n| H |\n| --- |\n| cell[^b] |\n\n[^a]: In list\n\n[^b]: In table",
        );
        assert!(html.contains(
            "<li>item<sup class=\"footnote-ref\"><a href=\"#fn1\" id=\"fnref1\">[1]</a></sup></li>"
        ));
        assert!(html.contains(
            "<td>cell<sup class=\"footnote-ref\"><a href=\"#fn2\" id=\"fnref2\">[2]</a></sup></td>"
        ));
        assert!(html.contains("<li id=\"fn1\" class=\"footnote-item\">"));
        assert!(html.contains("<li id=\"fn2\" class=\"footnote-item\">"));
    }

    #[test]
    fn test_footnote_label_with_punctuation() {
        let html = render("Text[^a.b]\n\n[^a.b]: the note");
        assert!(html.contains(
            "Text<sup class=\"footnote-ref\"><a href=\"#fn1\" id=\"fnref1\">[1]</a></sup>"
        ));
        assert!(html.contains("<p>the note <a href=\"#fnref1\" class=\"footnote-backref\">"));
    }

    #[test]
    fn test_link_text_is_never_linked_again() {
        assert_eq!(
            render("[https://a.com](https://b.com)"),
            "<p><a href=\"https://b.com\">https://a.com</a></p>\n"
        );
    }

    #[test]
    fn test_unclosed_image_is_literal() {
        assert_eq!(render("![alt]("), "<p>![alt](</p>\n");
    }

    #[test]
    fn test_nested_footnote_reference_is_numbered() {
        let html = render("Text[^1]\n\n[^1]: See also[^2]\n\n[^2]: Nested");
        assert!(html.contains("<li id=\"fn2\" class=\"footnote-item\">"));
    }
}
