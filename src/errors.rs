// ABOUTME: Error types for the slide-render library
// ABOUTME: Provides structured error handling for each stage of the render pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to parse slide data: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid color value: {0}")]
    InvalidColor(String),

    #[error("Font error: {message}")]
    FontError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Drawing surface unavailable: {width}x{height}")]
    SurfaceUnavailable { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error("Slide index {index} out of range (deck has {count} slides)")]
    SlideIndexOutOfRange { index: usize, count: usize },

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("No rendered slides found matching pattern: {0}")]
    NoSlidesFoundError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Watch error: {0}")]
    WatchError(String),

    #[error("Export job aborted before producing an image")]
    ExportAborted,

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl From<anyhow::Error> for RenderError {
    fn from(err: anyhow::Error) -> Self {
        RenderError::UnknownError(err.to_string())
    }
}

impl From<zip::result::ZipError> for RenderError {
    fn from(err: zip::result::ZipError) -> Self {
        RenderError::ArchiveError(format!("ZIP operation failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
