// ABOUTME: Configuration module for the slide-render library
// ABOUTME: Provides configuration settings, environment variables and typeface loading

use crate::color::Color;
use crate::errors::{RenderError, Result};
use crate::render::RenderConfig;
use crate::typeface::{BlockFace, FontFace, Typeface};
use log::{info, warn};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Font files tried, in order, when no font path is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/AppleGothic.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\malgun.ttf",
];

/// Global configuration for the application
pub struct Config {
    pub font_path: Option<PathBuf>,
    pub bold_font_path: Option<PathBuf>,
    pub preview_width: u32,
    pub preview_height: u32,
    pub background_color: Color,
    pub text_color: Color,
    pub verse_color: Color,
    pub verse_detection: bool,
}

impl Default for Config {
    fn default() -> Self {
        let render = RenderConfig::default();
        Self {
            font_path: None,
            bold_font_path: None,
            preview_width: render.width,
            preview_height: render.height,
            background_color: render.background_color,
            text_color: render.text_color,
            verse_color: render.verse_color,
            verse_detection: render.verse_detection_enabled,
        }
    }
}

fn env_color(name: &str, default: Color) -> Color {
    match env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|e| {
            warn!("Ignoring {}: {}", name, e);
            default
        }),
        Err(_) => default,
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(default)
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let verse_detection = env::var("SLIDE_VERSE_DETECTION")
            .ok()
            .map(|s| {
                let s = s.to_lowercase();
                s != "false" && s != "0" && s != "off"
            })
            .unwrap_or(defaults.verse_detection);

        Self {
            font_path: env::var("SLIDE_FONT_PATH").ok().map(PathBuf::from),
            bold_font_path: env::var("SLIDE_BOLD_FONT_PATH").ok().map(PathBuf::from),
            preview_width: env_u32("SLIDE_PREVIEW_WIDTH", defaults.preview_width),
            preview_height: env_u32("SLIDE_PREVIEW_HEIGHT", defaults.preview_height),
            background_color: env_color("SLIDE_BACKGROUND", defaults.background_color),
            text_color: env_color("SLIDE_TEXT_COLOR", defaults.text_color),
            verse_color: env_color("SLIDE_VERSE_COLOR", defaults.verse_color),
            verse_detection,
        }
    }

    /// Get a render configuration with defaults from this config
    pub fn get_render_config(
        &self,
        width: Option<u32>,
        height: Option<u32>,
        keywords: Option<Vec<String>>,
    ) -> RenderConfig {
        RenderConfig {
            background_color: self.background_color,
            text_color: self.text_color,
            highlight_keywords: keywords.unwrap_or_default(),
            verse_color: self.verse_color,
            verse_detection_enabled: self.verse_detection,
            width: width.unwrap_or(self.preview_width),
            height: height.unwrap_or(self.preview_height),
            ..RenderConfig::default()
        }
    }

    /// Layer a JSON settings file over this config's render defaults.
    ///
    /// Fields missing from the file keep the values from the environment.
    pub fn load_render_config(&self, settings_path: &Path) -> Result<RenderConfig> {
        info!("Loading render settings: {:?}", settings_path);
        if !settings_path.exists() {
            return Err(RenderError::PathNotFoundError(settings_path.to_path_buf()));
        }
        let content = fs::read_to_string(settings_path).map_err(RenderError::FileReadError)?;

        let base = serde_json::to_value(self.get_render_config(None, None, None))?;
        let overlay: serde_json::Value = serde_json::from_str(&content)?;
        let serde_json::Value::Object(overlay) = overlay else {
            return Err(RenderError::ConfigError(format!(
                "Render settings in {:?} must be a JSON object",
                settings_path
            )));
        };

        let mut merged = base;
        if let serde_json::Value::Object(fields) = &mut merged {
            fields.extend(overlay);
        }
        Ok(serde_json::from_value(merged)?)
    }

    /// Render config from an optional settings file plus an optional preview size.
    pub fn resolve_render_config(
        &self,
        settings_path: Option<&Path>,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<RenderConfig> {
        let mut render_config = match settings_path {
            Some(path) => self.load_render_config(path)?,
            None => self.get_render_config(None, None, None),
        };
        if let Some(width) = width {
            render_config.width = width;
        }
        if let Some(height) = height {
            render_config.height = height;
        }
        Ok(render_config)
    }

    /// Load the configured font, falling back to system fonts and finally to
    /// the font-free block face.
    pub fn load_typeface(&self) -> Result<Arc<dyn Typeface>> {
        if let Some(path) = &self.font_path {
            let mut face = FontFace::open(path)?;
            if let Some(bold) = &self.bold_font_path {
                face = face.with_bold(bold)?;
            }
            return Ok(Arc::new(face));
        }

        for candidate in FONT_CANDIDATES {
            let path = Path::new(candidate);
            if !path.exists() {
                continue;
            }
            match FontFace::open(path) {
                Ok(face) => {
                    info!("Using system font {:?}", path);
                    return Ok(Arc::new(face));
                }
                Err(e) => warn!("Skipping font {:?}: {}", path, e),
            }
        }

        warn!("No usable font found; rendering with block glyphs");
        Ok(Arc::new(BlockFace))
    }
}
