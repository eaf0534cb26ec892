//! Print export for Markdown Studio
//!
//! Produces a PDF from content already laid out on a live display surface:
//! - `surface`: the `DisplaySurface` trait, handles, geometry and measured lines
//! - `layout`: headless flattening used by `OffscreenSurface`
//! - `pdf`: pagination output encoded with builtin fonts

pub mod layout;
pub mod pdf;
pub mod surface;

pub use pdf::{Page, PlacedLine};
pub use surface::{
    DisplaySurface, FontFace, LaidOutView, LayoutLine, OffscreenSurface, PageGeometry,
    SurfaceError, SurfaceHandle, TextRun,
};

use thiserror::Error;

use crate::config::{PrintConfig, DEFAULT_PDF_FILE_NAME};
use crate::markdown::export::{ArtifactKind, ExportArtifact};

/// Errors that can occur during print export
#[derive(Debug, Error)]
pub enum PrintError {
    /// The surface is detached or the handle was never valid
    #[error("Display surface {handle} is not available for printing")]
    InvalidSurface { handle: SurfaceHandle },

    /// The surface could not measure its content
    #[error("Could not lay out content for printing")]
    Layout {
        #[source]
        source: SurfaceError,
    },

    /// The surface measured nothing visible
    #[error("Nothing to print")]
    EmptyLayout,

    /// The encoder produced no output
    #[error("Could not encode PDF: {0}")]
    Encoding(String),

    /// The blocking encode task failed
    #[error("Print task failed: {0}")]
    Task(String),
}

impl PrintError {
    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            PrintError::InvalidSurface { .. } => {
                "The document view is closed. Open it again and retry printing.".to_string()
            }
            PrintError::EmptyLayout => "The document is empty; there is nothing to print.".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for print operations
pub type PrintResult<T> = Result<T, PrintError>;

/// Turns a display surface into a PDF artifact
#[derive(Debug, Clone)]
pub struct PrintExporter {
    geometry: PageGeometry,
    title: String,
    file_name: String,
}

impl Default for PrintExporter {
    fn default() -> Self {
        Self::new(&PrintConfig::default())
    }
}

impl PrintExporter {
    pub fn new(config: &PrintConfig) -> Self {
        let file_name = if config.file_name.trim().is_empty() {
            DEFAULT_PDF_FILE_NAME.to_string()
        } else {
            config.file_name.clone()
        };

        Self {
            geometry: PageGeometry::from(config),
            title: "Markdown Content".to_string(),
            file_name,
        }
    }

    /// Set the PDF document title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Export the surface's laid-out content as a PDF.
    ///
    /// Fails without producing an artifact when the surface is detached,
    /// cannot be measured, or measures nothing.
    pub async fn export_printable<S: DisplaySurface>(&self, surface: &S) -> PrintResult<ExportArtifact> {
        let handle = surface.handle();
        if handle.is_nil() || !surface.is_attached() {
            log::warn!("Print requested for unavailable surface {}", handle);
            return Err(PrintError::InvalidSurface { handle });
        }

        let view = surface.measure(self.geometry).await.map_err(|e| match e {
            SurfaceError::Detached => PrintError::InvalidSurface { handle },
            other => {
                log::error!("Surface {} failed to measure: {}", handle, other);
                PrintError::Layout { source: other }
            }
        })?;

        if view.is_empty() {
            return Err(PrintError::EmptyLayout);
        }

        let pages = paginate(view, &self.geometry);
        let page_count = pages.len();
        let geometry = self.geometry;
        let title = self.title.clone();

        let bytes = tokio::task::spawn_blocking(move || pdf::encode(&pages, &geometry, &title))
            .await
            .map_err(|e| PrintError::Task(e.to_string()))?;

        if bytes.is_empty() {
            return Err(PrintError::Encoding("encoder returned no data".to_string()));
        }

        log::info!("Printed {} page(s), {} bytes", page_count, bytes.len());

        Ok(ExportArtifact {
            bytes,
            file_name: self.file_name.clone(),
            kind: ArtifactKind::Pdf,
        })
    }
}

/// Split measured lines into pages, top to bottom
pub fn paginate(view: LaidOutView, geometry: &PageGeometry) -> Vec<Page> {
    let top = geometry.height - geometry.margin;
    let bottom = geometry.margin;

    let mut pages = vec![Page::default()];
    let mut y = top;

    for line in view.lines {
        let height = line.height();

        let Some(current) = pages.last_mut() else {
            break;
        };

        // Whitespace never starts a page
        if !line.is_visible() && current.is_empty() {
            continue;
        }

        if y - height < bottom && !current.is_empty() {
            pages.push(Page::default());
            y = top;
            if !line.is_visible() {
                continue;
            }
        }

        if let Some(current) = pages.last_mut() {
            current.lines.push(PlacedLine { top: y, line });
        }
        y -= height;
    }

    pages.retain(|page| page.lines.iter().any(|placed| placed.line.is_visible()));
    pages
}
