//! Error types for Markdown Studio
//!
//! Errors are grouped by concern. Rendering itself never fails; these cover
//! file access, configuration, persistence and the two export paths.

use std::path::PathBuf;
use thiserror::Error;

pub use crate::markdown::export::ExportError;
pub use crate::print::PrintError;

/// Main application error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// File I/O related errors
    #[error(transparent)]
    FileIO(#[from] FileError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Standalone HTML export errors
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Print export errors
    #[error(transparent)]
    Print(#[from] PrintError),

    /// Key-value persistence errors
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Generic unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// File I/O related errors
#[derive(Error, Debug)]
pub enum FileError {
    /// File not found at specified path
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when accessing file
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// File is too large to open
    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// File encoding error (non-UTF-8)
    #[error("Unable to read file as text. File may be binary or use unsupported encoding: {path}")]
    EncodingError { path: PathBuf },

    /// Error reading file
    #[error("Could not read file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during atomic write (temp file creation)
    #[error("Could not create temporary file for safe save: {path}")]
    AtomicWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error renaming temp file to target
    #[error("Could not complete file save (rename failed): {path}")]
    RenameError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path is not a file
    #[error("Path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Directory could not be created
    #[error("Directory error: {path}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error saving configuration
    #[error("Could not save configuration: {0}")]
    SaveError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Key-value store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Stored data could not be decoded
    #[error("Corrupt store data in {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Value could not be encoded
    #[error("Could not encode value for key '{key}': {reason}")]
    Encode { key: String, reason: String },

    /// Underlying file access failed
    #[error(transparent)]
    File(#[from] FileError),

    /// No data directory available on this platform
    #[error("Could not access data directory")]
    DirectoryError,
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for file operations
pub type FileResult<T> = Result<T, FileError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl FileError {
    /// Create a user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            FileError::NotFound(_) => {
                "The file could not be found. It may have been moved or deleted.".to_string()
            }
            FileError::PermissionDenied { .. } => {
                "You don't have permission to access this file. Check file permissions.".to_string()
            }
            FileError::FileTooLarge { max_size, .. } => {
                format!(
                    "This file is too large to open. Maximum file size is {} MB.",
                    max_size / (1024 * 1024)
                )
            }
            FileError::EncodingError { .. } => {
                "This file cannot be opened as text. It may be a binary file or use an unsupported encoding.".to_string()
            }
            FileError::AtomicWriteError { .. } | FileError::RenameError { .. } => {
                "Could not save the file. Check disk space and permissions.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl AppError {
    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AppError::FileIO(e) => e.user_message(),
            AppError::Print(e) => e.user_message(),
            _ => self.to_string(),
        }
    }
}
