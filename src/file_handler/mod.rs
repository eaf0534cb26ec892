//! File handler module for Markdown Studio
//!
//! Handles file system operations for the pipeline:
//! - Reading markup files with encoding detection and size limits
//! - Atomic artifact writes

pub mod io;

pub use io::*;
