// ABOUTME: High-resolution export module for the slide-render library
// ABOUTME: Renders export PNGs, runs one-shot export jobs and packages ZIP archives

use crate::errors::{RenderError, Result};
use crate::render::{render_high_res, RenderConfig, EXPORT_HEIGHT, EXPORT_PIXEL_RATIO, EXPORT_WIDTH};
use crate::slide::{SlideData, SlideSource};
use crate::typeface::Typeface;
use chrono::{Datelike, Local, Timelike};
use log::{info, warn};
use rayon::prelude::*;
use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive entry name for a zero-based slide index.
pub fn slide_file_name(slide_index: usize) -> String {
    format!("slide_{}.png", slide_index + 1)
}

/// A PNG-encoded export of one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedSlide {
    pub slide_index: usize,
    pub name: String,
    pub png: Vec<u8>,
}

/// Render one slide on the 1280×720 export canvas at 2× density.
pub fn export_slide(slide: &SlideData, config: &RenderConfig, face: &dyn Typeface) -> Result<ExportedSlide> {
    let raster = render_high_res(
        slide,
        config,
        EXPORT_WIDTH,
        EXPORT_HEIGHT,
        EXPORT_PIXEL_RATIO,
        face,
    )?;
    Ok(ExportedSlide {
        slide_index: slide.slide_index,
        name: slide_file_name(slide.slide_index),
        png: raster.to_png()?,
    })
}

/// Export the selected zero-based slide indices in order.
///
/// Indices outside the deck are skipped with a warning. Any render or
/// encoding failure fails the whole export.
pub fn export_selected(
    source: &dyn SlideSource,
    indices: &[usize],
    config: &RenderConfig,
    face: &dyn Typeface,
) -> Result<Vec<ExportedSlide>> {
    let count = source.slide_count()?;
    let selected: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|&i| {
            let in_range = i < count;
            if !in_range {
                warn!("Skipping slide {}: deck has {} slides", i + 1, count);
            }
            in_range
        })
        .collect();

    info!("Exporting {} of {} slides", selected.len(), count);

    selected
        .par_iter()
        .map(|&i| {
            let slide = source.slide(i)?;
            info!("Rendering {}", slide_file_name(i));
            export_slide(&slide, config, face)
        })
        .collect()
}

/// Handle to an export running on its own thread.
///
/// Resolves exactly once, to one image or one error.
pub struct ExportJob {
    slide_index: usize,
    handle: JoinHandle<Result<ExportedSlide>>,
}

impl ExportJob {
    pub fn slide_index(&self) -> usize {
        self.slide_index
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the export finishes.
    pub fn wait(self) -> Result<ExportedSlide> {
        self.handle.join().map_err(|_| RenderError::ExportAborted)?
    }
}

/// Start a background export of `slide`.
pub fn spawn_export(slide: SlideData, config: RenderConfig, face: Arc<dyn Typeface>) -> ExportJob {
    let slide_index = slide.slide_index;
    let handle = thread::spawn(move || export_slide(&slide, &config, face.as_ref()));
    ExportJob { slide_index, handle }
}

/// Write exported slides into a deflate-compressed ZIP archive.
pub fn write_archive<W: Write + Seek>(writer: W, slides: &[ExportedSlide]) -> Result<W> {
    let now = Local::now();
    let mut options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    match zip::DateTime::from_date_and_time(
        now.year() as u16,
        now.month() as u8,
        now.day() as u8,
        now.hour() as u8,
        now.minute() as u8,
        now.second() as u8,
    ) {
        Ok(stamp) => options = options.last_modified_time(stamp),
        Err(_) => warn!("Archive timestamp out of range; using default entry time"),
    }

    let mut zip = ZipWriter::new(writer);
    for slide in slides {
        info!("Adding {} to archive", slide.name);
        zip.start_file(slide.name.as_str(), options)?;
        zip.write_all(&slide.png)?;
    }

    Ok(zip.finish()?)
}

/// Write exported slides into an archive file at `output`.
pub fn write_archive_file(output: &Path, slides: &[ExportedSlide]) -> Result<()> {
    info!("Writing archive {:?} with {} slides", output, slides.len());
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(RenderError::FileReadError)?;
        }
    }
    let file = fs::File::create(output).map_err(RenderError::FileReadError)?;
    write_archive(file, slides)?;
    Ok(())
}

/// Write each exported slide as its own PNG file in `dir`.
pub fn write_slide_files(dir: &Path, slides: &[ExportedSlide]) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(RenderError::FileReadError)?;
    }
    slides
        .iter()
        .map(|slide| {
            let path = dir.join(&slide.name);
            fs::write(&path, &slide.png).map_err(RenderError::FileReadError)?;
            Ok(path)
        })
        .collect()
}

/// Slide number encoded in a `slide_{n}.png` file name.
fn slide_number(path: &Path) -> Option<usize> {
    path.file_stem()?
        .to_str()?
        .strip_prefix("slide_")?
        .parse()
        .ok()
        .filter(|&n: &usize| n > 0)
}

/// Find rendered `slide_{n}.png` files in a directory, ordered by slide number.
pub fn find_rendered_slides(dir: &Path) -> Result<Vec<PathBuf>> {
    let glob_pattern = format!("{}/slide_*.png", dir.to_string_lossy());
    let mut paths: Vec<PathBuf> = glob::glob(&glob_pattern)
        .map_err(|e| RenderError::ValidationError(format!("Invalid glob pattern: {}", e)))?
        .flatten()
        .filter(|p| slide_number(p).is_some())
        .collect();

    paths.sort_by_key(|p| slide_number(p));

    if paths.is_empty() {
        return Err(RenderError::NoSlidesFoundError(glob_pattern));
    }
    Ok(paths)
}

/// Package already-rendered slide files from `dir` into an archive.
pub fn pack_directory(dir: &Path, output: &Path) -> Result<usize> {
    info!("Packing rendered slides in {:?}", dir);
    let mut slides = Vec::new();
    for path in find_rendered_slides(dir)? {
        let png = match fs::read(&path) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to read slide image {:?}: {}", path, e);
                continue;
            }
        };
        let Some(number) = slide_number(&path) else {
            continue;
        };
        slides.push(ExportedSlide {
            slide_index: number - 1,
            name: slide_file_name(number - 1),
            png,
        });
    }
    write_archive_file(output, &slides)?;
    Ok(slides.len())
}
