//! Flattening a rendered fragment into measured lines
//!
//! Used by [`super::OffscreenSurface`]. Widths come from approximate
//! Helvetica/Courier metrics, which is close enough to keep wrapped lines
//! inside the page margins.

use super::surface::{FontFace, LaidOutView, LayoutLine, PageGeometry, TextRun};
use crate::markdown::html::{Element, HtmlNode, RenderedFragment};

/// Indentation added per list or blockquote level
const INDENT_STEP: f32 = 18.0;

/// Heading sizes relative to body text, h1 to h6
const HEADING_SCALE: [f32; 6] = [2.0, 1.6, 1.35, 1.2, 1.1, 1.0];

const CODE_SCALE: f32 = 0.9;

/// Narrowest column text is ever wrapped to
const MIN_WIDTH: f32 = 40.0;

const BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "ul", "ol", "li", "blockquote", "pre", "table", "hr",
    "section",
];

/// Lay out a fragment for the given page geometry
pub fn flatten(fragment: &RenderedFragment, geometry: &PageGeometry) -> LaidOutView {
    let mut flattener = Flattener {
        geometry: *geometry,
        lines: Vec::new(),
    };
    let ctx = Context {
        indent: 0.0,
        font: FontFace::Regular,
        size: geometry.font_size,
    };
    flattener.blocks(&fragment.nodes, ctx, Vec::new());
    LaidOutView {
        lines: flattener.lines,
    }
}

#[derive(Debug, Clone, Copy)]
struct Context {
    indent: f32,
    font: FontFace,
    size: f32,
}

/// Inline text with its style
#[derive(Debug, Clone)]
struct Piece {
    text: String,
    font: FontFace,
    size: f32,
}

/// A word; `space_before` is false when it continues the previous piece
#[derive(Debug)]
struct Token {
    text: String,
    font: FontFace,
    size: f32,
    space_before: bool,
}

struct Flattener {
    geometry: PageGeometry,
    lines: Vec<LayoutLine>,
}

impl Flattener {
    /// Lay out block children; `pending` holds inline content (such as a
    /// list marker) that joins the first run of text
    fn blocks(&mut self, nodes: &[HtmlNode], ctx: Context, mut pending: Vec<Piece>) {
        for node in nodes {
            match node {
                HtmlNode::Element(el) if el.tag == "p" => {
                    collect_children(el, ctx.font, ctx.size, &mut pending);
                    self.paragraph(&pending, ctx.indent);
                    pending.clear();
                    self.gap(ctx.size * 0.5);
                }
                HtmlNode::Element(el) if BLOCK_TAGS.contains(&el.tag) => {
                    self.flush(&mut pending, ctx);
                    self.block(el, ctx);
                }
                other => collect_inline(other, ctx.font, ctx.size, &mut pending),
            }
        }
        self.flush(&mut pending, ctx);
    }

    fn flush(&mut self, pending: &mut Vec<Piece>, ctx: Context) {
        if pending.iter().any(|p| !p.text.trim().is_empty()) {
            self.paragraph(pending, ctx.indent);
        }
        pending.clear();
    }

    fn block(&mut self, el: &Element, ctx: Context) {
        match el.tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = el.tag[1..].parse::<usize>().unwrap_or(6).clamp(1, 6);
                let size = ctx.size * HEADING_SCALE[level - 1];
                let mut pieces = Vec::new();
                collect_children(el, FontFace::Bold, size, &mut pieces);
                self.gap(ctx.size * 0.3);
                self.paragraph(&pieces, ctx.indent);
                self.gap(ctx.size * 0.5);
            }
            "ul" | "ol" => self.list(el, ctx),
            "blockquote" => {
                let inner = Context {
                    indent: ctx.indent + INDENT_STEP,
                    font: ctx.font.with(ctx.font.is_bold(), true),
                    ..ctx
                };
                self.blocks(&el.children, inner, Vec::new());
            }
            "pre" => self.code(el, ctx),
            "table" => self.table(el, ctx),
            "hr" => self.rule(ctx),
            "section" => {
                self.rule(ctx);
                self.blocks(&el.children, ctx, Vec::new());
            }
            _ => self.blocks(&el.children, ctx, Vec::new()),
        }
    }

    fn list(&mut self, el: &Element, ctx: Context) {
        let ordered = el.tag == "ol";
        let mut number: u64 = el
            .get_attr("start")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);
        let item_ctx = Context {
            indent: ctx.indent + INDENT_STEP,
            ..ctx
        };

        for item in el.children.iter().filter_map(HtmlNode::as_element) {
            let marker = if ordered {
                format!("{}. ", number)
            } else {
                "\u{2022} ".to_string()
            };
            number += 1;

            let prefix = vec![Piece {
                text: marker,
                font: ctx.font,
                size: ctx.size,
            }];
            self.blocks(&item.children, item_ctx, prefix);
        }
        self.gap(ctx.size * 0.5);
    }

    fn code(&mut self, el: &Element, ctx: Context) {
        let size = ctx.size * CODE_SCALE;
        let height = size * self.geometry.line_height;
        let width = self.available_width(ctx.indent);
        let per_line = ((width / (mono_width() * size)) as usize).max(1);

        let mut text = String::new();
        collect_raw_text(&el.children, &mut text);

        for line in text.trim_end_matches('\n').split('\n') {
            let chars: Vec<char> = line.chars().collect();
            if chars.is_empty() {
                self.lines.push(LayoutLine::Gap(height));
                continue;
            }
            for chunk in chars.chunks(per_line) {
                self.lines.push(LayoutLine::Text {
                    runs: vec![TextRun {
                        text: chunk.iter().collect(),
                        font: FontFace::Mono,
                        size,
                        x: ctx.indent,
                    }],
                    height,
                });
            }
        }
        self.gap(ctx.size * 0.5);
    }

    fn table(&mut self, el: &Element, ctx: Context) {
        for section in el.children.iter().filter_map(HtmlNode::as_element) {
            for row in section.children.iter().filter_map(HtmlNode::as_element) {
                let mut pieces = Vec::new();
                for (idx, cell) in row.children.iter().filter_map(HtmlNode::as_element).enumerate() {
                    if idx > 0 {
                        pieces.push(Piece {
                            text: "  |  ".to_string(),
                            font: FontFace::Regular,
                            size: ctx.size,
                        });
                    }
                    let font = if cell.tag == "th" { FontFace::Bold } else { ctx.font };
                    collect_children(cell, font, ctx.size, &mut pieces);
                }
                self.paragraph(&pieces, ctx.indent);
            }
        }
        self.gap(ctx.size * 0.5);
    }

    fn rule(&mut self, ctx: Context) {
        self.lines.push(LayoutLine::Rule {
            x: ctx.indent,
            height: ctx.size * self.geometry.line_height,
        });
    }

    fn gap(&mut self, height: f32) {
        self.lines.push(LayoutLine::Gap(height));
    }

    fn available_width(&self, indent: f32) -> f32 {
        (self.geometry.content_width() - indent).max(MIN_WIDTH)
    }

    fn push_line(&mut self, runs: Vec<TextRun>) {
        let size = runs.iter().map(|r| r.size).fold(0.0_f32, f32::max);
        self.lines.push(LayoutLine::Text {
            runs,
            height: size * self.geometry.line_height,
        });
    }

    /// Word-wrap styled pieces into lines
    fn paragraph(&mut self, pieces: &[Piece], indent: f32) {
        let width = self.available_width(indent);
        let mut runs: Vec<TextRun> = Vec::new();
        let mut x = 0.0;

        for token in tokenize(pieces) {
            let mut space = if token.space_before && !runs.is_empty() {
                text_width(" ", token.font, token.size)
            } else {
                0.0
            };
            let word_width = text_width(&token.text, token.font, token.size);

            if !runs.is_empty() && x + space + word_width > width {
                self.push_line(std::mem::take(&mut runs));
                x = 0.0;
                space = 0.0;
            }

            if word_width > width {
                // Overlong word: hard break into full lines, keep the tail
                let mut chunk = String::new();
                let mut chunk_width = 0.0;
                for c in token.text.chars() {
                    let w = char_width(c, token.font) * token.size;
                    if chunk_width + w > width && !chunk.is_empty() {
                        self.push_line(vec![TextRun {
                            text: std::mem::take(&mut chunk),
                            font: token.font,
                            size: token.size,
                            x: indent,
                        }]);
                        chunk_width = 0.0;
                    }
                    chunk.push(c);
                    chunk_width += w;
                }
                runs.push(TextRun {
                    text: chunk,
                    font: token.font,
                    size: token.size,
                    x: indent,
                });
                x = chunk_width;
                continue;
            }

            match runs.last_mut() {
                Some(last) if last.font == token.font && last.size == token.size => {
                    if space > 0.0 {
                        last.text.push(' ');
                    }
                    last.text.push_str(&token.text);
                }
                _ => runs.push(TextRun {
                    text: token.text,
                    font: token.font,
                    size: token.size,
                    x: indent + x + space,
                }),
            }
            x += space + word_width;
        }

        if !runs.is_empty() {
            self.push_line(runs);
        }
    }
}

fn collect_children(el: &Element, font: FontFace, size: f32, out: &mut Vec<Piece>) {
    for child in &el.children {
        collect_inline(child, font, size, out);
    }
}

fn collect_inline(node: &HtmlNode, font: FontFace, size: f32, out: &mut Vec<Piece>) {
    let el = match node {
        HtmlNode::Text(text) => {
            out.push(Piece {
                text: text.unescaped(),
                font,
                size,
            });
            return;
        }
        HtmlNode::Element(el) => el,
    };

    match el.tag {
        "strong" => collect_children(el, font.with(true, font.is_italic()), size, out),
        "em" => collect_children(el, font.with(font.is_bold(), true), size, out),
        "code" => collect_children(el, FontFace::Mono, size, out),
        "input" => out.push(Piece {
            text: if el.has_attr("checked") { "[x] " } else { "[ ] " }.to_string(),
            font: FontFace::Mono,
            size,
        }),
        "img" => {
            let alt = el
                .attrs
                .iter()
                .find(|a| a.name == "alt")
                .and_then(|a| a.value.as_ref())
                .map(|v| v.unescaped())
                .unwrap_or_default();
            out.push(Piece {
                text: format!("[image: {}]", alt),
                font: font.with(font.is_bold(), true),
                size,
            });
        }
        "br" => out.push(Piece {
            text: " ".to_string(),
            font,
            size,
        }),
        "a" if el.get_attr("class") == Some("footnote-backref") => {}
        _ => collect_children(el, font, size, out),
    }
}

fn collect_raw_text(nodes: &[HtmlNode], out: &mut String) {
    for node in nodes {
        match node {
            HtmlNode::Text(text) => out.push_str(&text.unescaped()),
            HtmlNode::Element(el) => collect_raw_text(&el.children, out),
        }
    }
}

fn tokenize(pieces: &[Piece]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pending_space = false;

    for piece in pieces {
        let mut current = String::new();
        let mut current_space = false;

        for c in piece.text.chars() {
            if c.is_whitespace() {
                if !current.is_empty() {
                    tokens.push(Token {
                        text: std::mem::take(&mut current),
                        font: piece.font,
                        size: piece.size,
                        space_before: current_space,
                    });
                }
                pending_space = true;
            } else {
                if current.is_empty() {
                    current_space = pending_space;
                    pending_space = false;
                }
                current.push(c);
            }
        }

        if !current.is_empty() {
            tokens.push(Token {
                text: current,
                font: piece.font,
                size: piece.size,
                space_before: current_space,
            });
        }
    }

    tokens
}

fn mono_width() -> f32 {
    0.6
}

/// Approximate advance width in em
fn char_width(c: char, font: FontFace) -> f32 {
    if font == FontFace::Mono {
        return mono_width();
    }

    let base = match c {
        'i' | 'j' | 'l' | '.' | ',' | '\'' | '!' | '|' | ':' | ';' => 0.28,
        ' ' => 0.278,
        'f' | 't' | 'r' | 'I' => 0.33,
        'm' | 'w' | 'M' | 'W' => 0.83,
        c if c.is_ascii_digit() => 0.556,
        c if c.is_uppercase() => 0.67,
        _ => 0.5,
    };

    if font.is_bold() {
        base * 1.05
    } else {
        base
    }
}

fn text_width(text: &str, font: FontFace, size: f32) -> f32 {
    text.chars().map(|c| char_width(c, font)).sum::<f32>() * size
}
