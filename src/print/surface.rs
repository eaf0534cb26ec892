//! Display surfaces and their measured layout
//!
//! The print exporter never lays out content itself. It asks a
//! [`DisplaySurface`] for the boxes it has already measured at a given page
//! geometry and only paginates and encodes them.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::layout;
use crate::config::PrintConfig;
use crate::markdown::html::RenderedFragment;

/// Opaque identifier of a live display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceHandle(Uuid);

impl SurfaceHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The handle no surface ever owns
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for SurfaceHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Page size, margins and base typography, in PDF points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub font_size: f32,
    /// Multiple of the font size
    pub line_height: f32,
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        (self.width - 2.0 * self.margin).max(1.0)
    }

    pub fn content_height(&self) -> f32 {
        (self.height - 2.0 * self.margin).max(1.0)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::from(&PrintConfig::default())
    }
}

impl From<&PrintConfig> for PageGeometry {
    fn from(config: &PrintConfig) -> Self {
        Self {
            width: config.page_width,
            height: config.page_height,
            margin: config.margin,
            font_size: config.font_size,
            line_height: config.line_height,
        }
    }
}

/// Builtin PDF font faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
    BoldItalic,
    Mono,
}

impl FontFace {
    pub const ALL: [FontFace; 5] = [
        FontFace::Regular,
        FontFace::Bold,
        FontFace::Italic,
        FontFace::BoldItalic,
        FontFace::Mono,
    ];

    /// Face with bold and/or italic added
    pub fn with(self, bold: bool, italic: bool) -> Self {
        match self {
            FontFace::Mono => FontFace::Mono,
            _ => match (bold, italic) {
                (true, true) => FontFace::BoldItalic,
                (true, false) => FontFace::Bold,
                (false, true) => FontFace::Italic,
                (false, false) => FontFace::Regular,
            },
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontFace::Bold | FontFace::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontFace::Italic | FontFace::BoldItalic)
    }
}

/// A styled piece of text at a horizontal offset from the left margin
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font: FontFace,
    pub size: f32,
    pub x: f32,
}

/// One measured line of the view
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutLine {
    Text { runs: Vec<TextRun>, height: f32 },
    /// Horizontal rule starting at `x`
    Rule { x: f32, height: f32 },
    /// Vertical whitespace
    Gap(f32),
}

impl LayoutLine {
    pub fn height(&self) -> f32 {
        match self {
            LayoutLine::Text { height, .. } | LayoutLine::Rule { height, .. } => *height,
            LayoutLine::Gap(height) => *height,
        }
    }

    /// Does the line put ink on the page?
    pub fn is_visible(&self) -> bool {
        match self {
            LayoutLine::Text { runs, .. } => runs.iter().any(|r| !r.text.trim().is_empty()),
            LayoutLine::Rule { .. } => true,
            LayoutLine::Gap(_) => false,
        }
    }
}

/// Everything a surface measured, top to bottom
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaidOutView {
    pub lines: Vec<LayoutLine>,
}

impl LaidOutView {
    pub fn is_empty(&self) -> bool {
        !self.lines.iter().any(LayoutLine::is_visible)
    }
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Surface is no longer attached")]
    Detached,

    #[error("Measurement failed: {0}")]
    Measurement(String),
}

/// A live view whose laid-out content can be printed
pub trait DisplaySurface: Send + Sync {
    fn handle(&self) -> SurfaceHandle;

    fn is_attached(&self) -> bool;

    /// Measure the content for the given page geometry
    fn measure(
        &self,
        geometry: PageGeometry,
    ) -> impl Future<Output = Result<LaidOutView, SurfaceError>> + Send;
}

/// Headless surface holding a rendered fragment
#[derive(Debug)]
pub struct OffscreenSurface {
    handle: SurfaceHandle,
    attached: AtomicBool,
    fragment: RenderedFragment,
}

impl OffscreenSurface {
    pub fn new(fragment: RenderedFragment) -> Self {
        Self {
            handle: SurfaceHandle::new(),
            attached: AtomicBool::new(true),
            fragment,
        }
    }

    pub fn fragment(&self) -> &RenderedFragment {
        &self.fragment
    }

    /// Mark the surface closed; later measurements fail
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
        log::debug!("Surface {} detached", self.handle);
    }
}

impl DisplaySurface for OffscreenSurface {
    fn handle(&self) -> SurfaceHandle {
        self.handle
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    fn measure(
        &self,
        geometry: PageGeometry,
    ) -> impl Future<Output = Result<LaidOutView, SurfaceError>> + Send {
        async move {
            if !self.is_attached() {
                return Err(SurfaceError::Detached);
            }
            Ok(layout::flatten(&self.fragment, &geometry))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::html::{Element, HtmlNode};

    #[test]
    fn test_handles_are_unique() {
        assert_ne!(SurfaceHandle::new(), SurfaceHandle::new());
        assert!(SurfaceHandle::nil().is_nil());
    }

    #[test]
    fn test_geometry_from_config() {
        let geometry = PageGeometry::default();
        assert!((geometry.width - 595.28).abs() < 0.01);
        assert!((geometry.content_width() - (595.28 - 80.0)).abs() < 0.01);
    }

    #[test]
    fn test_font_face_styles() {
        assert_eq!(FontFace::Regular.with(true, true), FontFace::BoldItalic);
        assert_eq!(FontFace::Mono.with(true, false), FontFace::Mono);
        assert!(FontFace::BoldItalic.is_italic());
    }

    #[test]
    fn test_gap_only_view_is_empty() {
        let view = LaidOutView {
            lines: vec![LayoutLine::Gap(10.0)],
        };
        assert!(view.is_empty());
    }

    #[tokio::test]
    async fn test_offscreen_measure_and_detach() {
        let fragment =
            RenderedFragment::new(vec![Element::new("p").child(HtmlNode::text("Hello")).into()]);
        let surface = OffscreenSurface::new(fragment);

        let view = surface.measure(PageGeometry::default()).await.unwrap();
        assert!(!view.is_empty());

        surface.detach();
        assert!(!surface.is_attached());
        assert!(matches!(
            surface.measure(PageGeometry::default()).await,
            Err(SurfaceError::Detached)
        ));
    }
}
