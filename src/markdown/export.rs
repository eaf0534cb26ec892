//! Export functionality for rendered Markdown
//!
//! This module provides the artifact types shared by both export paths and
//! the standalone HTML document exporter:
//! - `ExportArtifact`: bytes plus file name and kind
//! - `DocumentExporter`: wraps a rendered fragment in a styled HTML shell
//!
//! PDF artifacts are produced by [`crate::print::PrintExporter`].

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::html::{RenderedFragment, SafeText};
use crate::config::{ExportConfig, DEFAULT_HTML_FILE_NAME};
use crate::file_handler::write_bytes_atomic_sync;

/// Errors that can occur when writing artifacts
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    File(#[from] crate::error::FileError),

    #[error("Invalid export path: {0}")]
    InvalidPath(PathBuf),

    #[error("Export format not supported: {0}")]
    UnsupportedFormat(String),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Artifact kinds produced by the exporters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Html,
    Pdf,
}

impl ArtifactKind {
    /// MIME type of the artifact
    pub fn mime_type(&self) -> &'static str {
        match self {
            ArtifactKind::Html => "text/html",
            ArtifactKind::Pdf => "application/pdf",
        }
    }

    /// Get the file extension for the kind
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Html => "html",
            ArtifactKind::Pdf => "pdf",
        }
    }

    /// Get display name for the kind
    pub fn display_name(&self) -> &'static str {
        match self {
            ArtifactKind::Html => "HTML",
            ArtifactKind::Pdf => "PDF",
        }
    }

    /// Detect the kind from an output path's extension
    pub fn from_path(path: &Path) -> ExportResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "html" | "htm" => Ok(ArtifactKind::Html),
            "pdf" => Ok(ArtifactKind::Pdf),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A finished export: content bytes, suggested file name and kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub kind: ArtifactKind,
}

impl ExportArtifact {
    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content as text, for HTML artifacts
    pub fn as_text(&self) -> Option<&str> {
        match self.kind {
            ArtifactKind::Html => std::str::from_utf8(&self.bytes).ok(),
            ArtifactKind::Pdf => None,
        }
    }

    /// Write the artifact atomically to `path`
    pub fn write_to(&self, path: &Path) -> ExportResult<()> {
        if path.file_name().is_none() {
            return Err(ExportError::InvalidPath(path.to_path_buf()));
        }
        write_bytes_atomic_sync(path, &self.bytes)?;
        log::info!(
            "Wrote {} artifact ({} bytes) to {}",
            self.kind.display_name(),
            self.bytes.len(),
            path.display()
        );
        Ok(())
    }

    /// Write the artifact under its own file name inside `dir`
    pub fn write_into(&self, dir: &Path) -> ExportResult<PathBuf> {
        let path = dir.join(&self.file_name);
        self.write_to(&path)?;
        Ok(path)
    }
}

/// Options for the standalone HTML document
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlExportOptions {
    /// Document title
    pub title: String,
    /// CSS font-family of the body
    pub font_family: String,
    /// Maximum body width in pixels
    pub max_width_px: u32,
    /// Body padding in pixels
    pub padding_px: u32,
    /// Artifact file name
    pub file_name: String,
}

impl Default for HtmlExportOptions {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for HtmlExportOptions {
    fn from(config: &ExportConfig) -> Self {
        let file_name = if config.file_name.trim().is_empty() {
            DEFAULT_HTML_FILE_NAME.to_string()
        } else {
            config.file_name.clone()
        };

        Self {
            title: config.title.clone(),
            font_family: config.font_family.clone(),
            max_width_px: config.max_width_px,
            padding_px: config.padding_px,
            file_name,
        }
    }
}

/// Builds standalone HTML documents from rendered fragments
#[derive(Debug, Clone, Default)]
pub struct DocumentExporter {
    options: HtmlExportOptions,
}

impl DocumentExporter {
    pub fn new(options: HtmlExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HtmlExportOptions {
        &self.options
    }

    /// Wrap the fragment in a complete HTML document. Pure and deterministic.
    pub fn export_document(&self, fragment: &RenderedFragment) -> ExportArtifact {
        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{}</title>
{}
</head>
<body>
{}</body>
</html>
"#,
            SafeText::escape(&self.options.title),
            self.styles(),
            fragment.to_html()
        );

        log::debug!("Exported HTML document ({} bytes)", html.len());

        ExportArtifact {
            bytes: html.into_bytes(),
            file_name: self.options.file_name.clone(),
            kind: ArtifactKind::Html,
        }
    }

    fn styles(&self) -> String {
        // Font family is user configuration inside a <style> block
        let font_family = self.options.font_family.replace(['<', '>', '{', '}', ';'], "");

        format!(
            r#"<style>
body {{
    font-family: {font_family};
    line-height: 1.6;
    color: #24292e;
    max-width: {max_width}px;
    margin: 0 auto;
    padding: {padding}px;
}}
h1, h2 {{ border-bottom: 1px solid #e1e4e8; padding-bottom: .3em; }}
a {{ color: #0366d6; }}
code {{
    background-color: #f6f8fa;
    padding: .2em .4em;
    border-radius: 4px;
    font-family: "SFMono-Regular", Consolas, "Liberation Mono", Menlo, monospace;
}}
pre {{ background-color: #f6f8fa; padding: 16px; overflow: auto; border-radius: 6px; }}
pre code {{ padding: 0; background: transparent; }}
blockquote {{ margin: 16px 0; padding: 0 1em; color: #6a737d; border-left: .25em solid #dfe2e5; }}
table {{ border-collapse: collapse; margin: 16px 0; }}
th, td {{ padding: 6px 13px; border: 1px solid #dfe2e5; }}
tr:nth-child(even) {{ background-color: #f6f8fa; }}
img {{ max-width: 100%; }}
hr {{ border: 0; border-top: 1px solid #e1e4e8; margin: 24px 0; }}
.task-list-item {{ list-style-type: none; }}
.task-list-item-checkbox {{ margin-right: 6px; }}
.footnotes {{ margin-top: 32px; border-top: 1px solid #e1e4e8; font-size: .9em; }}
.footnote-backref {{ text-decoration: none; }}
@media print {{
    body {{ max-width: none; }}
    pre, blockquote {{ page-break-inside: avoid; }}
}}
</style>"#,
            font_family = font_family,
            max_width = self.options.max_width_px,
            padding = self.options.padding_px,
        )
    }

    /// Generate suggested output path from input path
    pub fn suggest_output_path(input_path: &Path, kind: ArtifactKind) -> PathBuf {
        let stem = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("markdown-content");

        let mut output = input_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();

        output.push(format!("{}.{}", stem, kind.extension()));
        output
    }
}
