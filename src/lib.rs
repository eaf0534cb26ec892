//! Markdown Studio
//!
//! Converts Markdown text into a sanitized HTML fragment, a standalone HTML
//! document and a printable PDF. The editor collaborators (document buffer,
//! snippet catalog and persisted session state) live alongside the pipeline.

pub mod catalog;
pub mod config;
pub mod editor;
pub mod error;
pub mod file_handler;
pub mod markdown;
pub mod print;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use markdown::{parse, Document, ExportArtifact, MarkdownRenderer, RenderedFragment};
pub use print::{DisplaySurface, OffscreenSurface, PrintError, PrintExporter};
