// ABOUTME: Watch module for monitoring deck changes and re-rendering previews
// ABOUTME: Provides file watching and auto-regeneration of preview images

use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecursiveMode, Watcher};
use notify_debouncer_full::new_debouncer;

use crate::config::Config as AppConfig;
use crate::errors::{RenderError, Result};
use crate::export::slide_file_name;
use crate::render::render_previews;
use crate::slide::JsonDeck;
use crate::typeface::Typeface;
use crate::utils;

/// Configuration for watch mode
pub struct WatchConfig {
    /// Path to the slide deck JSON file to watch
    pub deck_path: PathBuf,

    /// Optional render settings JSON file, also watched
    pub settings_path: Option<PathBuf>,

    /// Output directory for preview images
    pub output_dir: PathBuf,

    /// Preview size overriding the configured default
    pub width: Option<u32>,
    pub height: Option<u32>,

    /// Debounce time in milliseconds
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            deck_path: PathBuf::new(),
            settings_path: None,
            output_dir: PathBuf::from("previews"),
            width: None,
            height: None,
            debounce_ms: 500,
        }
    }
}

/// Starts watching a deck file and re-renders previews when it or its settings change
pub fn watch_deck(config: WatchConfig, app_config: &AppConfig) -> Result<()> {
    utils::validate_file_exists(&config.deck_path)?;
    if let Some(settings) = &config.settings_path {
        utils::validate_file_exists(settings)?;
    }
    utils::ensure_directory_exists(&config.output_dir)?;
    utils::validate_directory_writable(&config.output_dir)?;

    let face = app_config.load_typeface()?;

    // Initial generation
    regenerate_previews(&config, app_config, face.as_ref())?;

    let (tx, rx) = mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_millis(config.debounce_ms), None, tx)
        .map_err(|e| RenderError::WatchError(format!("Failed to create file watcher: {}", e)))?;

    let watch_path = match config.deck_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let abs_watch_path = if watch_path.is_absolute() {
        watch_path.to_path_buf()
    } else {
        utils::get_absolute_path(watch_path)?
    };

    debug!("Watching absolute path: {:?}", abs_watch_path);

    debouncer
        .watcher()
        .watch(&abs_watch_path, RecursiveMode::NonRecursive)
        .map_err(|e| {
            RenderError::WatchError(format!(
                "Failed to start watching directory {:?}: {}",
                abs_watch_path, e
            ))
        })?;

    if let Some(settings) = &config.settings_path {
        let abs_settings = utils::get_absolute_path(settings)?;
        if abs_settings.parent() != Some(abs_watch_path.as_path()) {
            debouncer
                .watcher()
                .watch(&abs_settings, RecursiveMode::NonRecursive)
                .map_err(|e| {
                    RenderError::WatchError(format!(
                        "Failed to start watching settings {:?}: {}",
                        abs_settings, e
                    ))
                })?;
        }
    }

    info!("Watching for changes in {:?}", watch_path);
    println!(
        "Watching for changes in {:?} (Press Ctrl+C to stop)",
        watch_path
    );

    let mut last_processed = Instant::now();

    for result in rx {
        match result {
            Ok(events) => {
                let relevant_changes = events.iter().any(|event| {
                    event.paths.iter().any(|path| {
                        let relevant = is_relevant_path(path, &config);
                        if relevant {
                            debug!("Detected relevant change in {:?}", path);
                        }
                        relevant
                    })
                });

                let now = Instant::now();
                if relevant_changes
                    && now.duration_since(last_processed) > Duration::from_millis(config.debounce_ms)
                {
                    match regenerate_previews(&config, app_config, face.as_ref()) {
                        Ok(count) => {
                            info!("Regenerated {} previews", count);
                            last_processed = now;
                        }
                        Err(e) => error!("Failed to regenerate previews: {}", e),
                    }
                }
            }
            Err(e) => error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

/// Checks if a path is the watched deck or settings file
pub(crate) fn is_relevant_path(path: &Path, config: &WatchConfig) -> bool {
    let path_abs = match utils::get_absolute_path(path) {
        Ok(p) => p,
        Err(_) => return false,
    };

    let watched = std::iter::once(&config.deck_path).chain(config.settings_path.iter());
    for candidate in watched {
        let candidate_abs =
            utils::get_absolute_path(candidate).unwrap_or_else(|_| candidate.clone());
        if path_abs == candidate_abs || path == candidate.as_path() {
            return true;
        }
    }
    false
}

/// Re-read the deck and settings and rewrite every preview image
pub(crate) fn regenerate_previews(config: &WatchConfig, app_config: &AppConfig, face: &dyn Typeface) -> Result<usize> {
    info!("Regenerating previews...");

    let deck = JsonDeck::open(&config.deck_path)?;
    let render_config = app_config.resolve_render_config(
        config.settings_path.as_deref(),
        config.width,
        config.height,
    )?;

    let mut written = 0;
    for (slide, result) in deck
        .slides()
        .iter()
        .zip(render_previews(deck.slides(), &render_config, face))
    {
        match result {
            Ok(raster) => {
                raster.save_png(&config.output_dir.join(slide_file_name(slide.slide_index)))?;
                written += 1;
            }
            Err(e) => error!("Failed to render slide {}: {}", slide.slide_index + 1, e),
        }
    }

    Ok(written)
}
