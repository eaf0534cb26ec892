//! Editor module for Markdown Studio
//!
//! Holds the markup document buffer (using ropey) that the rendering pipeline
//! reads snapshots from.

pub mod buffer;

pub use buffer::{LineEnding, MarkupDocument};
