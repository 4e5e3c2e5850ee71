// ABOUTME: Utility functions for the slide-render library
// ABOUTME: Provides path validation helpers and slide selection parsing

use crate::errors::{RenderError, Result};
use log::warn;
use std::path::{Path, PathBuf};

/// Validate that a file exists
pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(RenderError::PathNotFoundError(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(RenderError::ValidationError(format!(
            "Path is not a file: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(RenderError::FileReadError)?;
    } else if !path.is_dir() {
        return Err(RenderError::ValidationError(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Validate write permissions for a directory
pub fn validate_directory_writable(path: &Path) -> Result<()> {
    ensure_directory_exists(path)?;

    let test_file = path.join(format!("test_write_{}.tmp", uuid::Uuid::new_v4()));
    match std::fs::File::create(&test_file) {
        Ok(_) => {
            if let Err(e) = std::fs::remove_file(&test_file) {
                warn!("Failed to clean up test file {:?}: {}", test_file, e);
            }
            Ok(())
        }
        Err(e) => Err(RenderError::ValidationError(format!(
            "Directory is not writable: {:?} - {}",
            path, e
        ))),
    }
}

/// Get the absolute path
pub fn get_absolute_path(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| {
        RenderError::ValidationError(format!("Failed to get absolute path for {:?}: {}", path, e))
    })
}

/// Parse a 1-based slide selection such as `"1,3,5-7"` into zero-based indices.
///
/// Order is preserved and duplicates are dropped.
pub fn parse_slide_selection(selection: &str) -> Result<Vec<usize>> {
    let invalid = |part: &str| {
        RenderError::ValidationError(format!("Invalid slide selection entry: {:?}", part))
    };
    let parse_number = |s: &str, part: &str| -> Result<usize> {
        match s.trim().parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(invalid(part)),
        }
    };

    let mut indices = Vec::new();
    for part in selection.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (parse_number(a, part)?, parse_number(b, part)?),
            None => {
                let n = parse_number(part, part)?;
                (n, n)
            }
        };
        if end < start {
            return Err(invalid(part));
        }
        for n in start..=end {
            if !indices.contains(&(n - 1)) {
                indices.push(n - 1);
            }
        }
    }
    Ok(indices)
}
