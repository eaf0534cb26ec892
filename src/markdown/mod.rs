//! Markdown module for Markdown Studio
//!
//! Handles the text-to-document pipeline:
//! - Block and inline parsing into a document tree
//! - Code block highlighting
//! - Rendering to a sanitized HTML fragment
//! - Standalone HTML document export

pub mod export;
pub mod highlight;
pub mod html;
pub mod node;
pub mod parser;
pub mod render;

pub use export::{
    ArtifactKind, DocumentExporter, ExportArtifact, ExportError, ExportResult, HtmlExportOptions,
};
pub use highlight::{
    HighlightError, HighlightSpan, HighlightedCode, Highlighter, LanguageHighlighter,
};
pub use html::{Attribute, Element, HtmlNode, RenderedFragment, SafeText};
pub use node::{
    Alignment, Block, Cell, Document, EmphasisKind, Inline, List, ListItem, ListKind, Table,
};
pub use parser::{parse, parser_options, MAX_BLOCK_DEPTH, MAX_INLINE_DEPTH};
pub use render::Renderer;

use crate::config::Config;

/// Main Markdown renderer combining parsing, rendering and HTML export
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    renderer: Renderer,
    exporter: DocumentExporter,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a renderer from configuration
    pub fn from_config(config: &Config) -> Self {
        let highlighter = if config.highlight.enabled {
            Highlighter::with_defaults()
        } else {
            Highlighter::empty()
        }
        .with_class_prefix(config.highlight.class_prefix.clone());

        Self {
            renderer: Renderer::new(highlighter),
            exporter: DocumentExporter::new(HtmlExportOptions::from(&config.export)),
        }
    }

    /// Replace the document exporter (for example to change the title)
    pub fn with_exporter(mut self, exporter: DocumentExporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// Get the renderer
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Get the document exporter
    pub fn exporter(&self) -> &DocumentExporter {
        &self.exporter
    }

    /// Parse markdown into a document tree
    pub fn parse(&self, markdown: &str) -> Document {
        parse(markdown)
    }

    /// Render markdown to a sanitized fragment
    pub fn render(&self, markdown: &str) -> RenderedFragment {
        self.renderer.render(&parse(markdown))
    }

    /// Render markdown to an HTML fragment string
    pub fn render_html(&self, markdown: &str) -> String {
        self.render(markdown).to_html()
    }

    /// Render markdown into a standalone HTML document artifact
    pub fn export_html(&self, markdown: &str) -> ExportArtifact {
        self.exporter.export_document(&self.render(markdown))
    }
}
