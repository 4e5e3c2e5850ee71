// ABOUTME: Slide data model for the slide-render library
// ABOUTME: Text blocks, slide data, manual color overrides and the JSON slide source

use crate::color::Color;
use crate::errors::{RenderError, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One paragraph-like unit of slide text as extracted upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub text: String,
    pub font_size: f32,
    #[serde(default)]
    pub bold: bool,
    /// Author-level color captured at extraction time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, font_size: f32, bold: bool) -> Self {
        Self {
            text: text.into(),
            font_size,
            bold,
            color: None,
        }
    }
}

/// Structured text of a single slide.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideData {
    #[serde(default)]
    pub slide_index: usize,
    #[serde(default)]
    pub text_blocks: Vec<TextBlock>,
    #[serde(default)]
    pub full_text: String,
}

impl SlideData {
    /// Build slide data from blocks, flattening them into `full_text`.
    pub fn from_blocks(slide_index: usize, text_blocks: Vec<TextBlock>) -> Self {
        let full_text = text_blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            slide_index,
            text_blocks,
            full_text,
        }
    }

    /// Slide data with no blocks, laid out through the full-text fallback.
    pub fn from_text(slide_index: usize, full_text: impl Into<String>) -> Self {
        Self {
            slide_index,
            text_blocks: Vec::new(),
            full_text: full_text.into(),
        }
    }
}

/// A caller-pinned color for one block of one slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualColorOverride {
    pub slide_index: usize,
    pub block_index: usize,
    pub color: Color,
}

/// Sparse override set keyed by `(slide_index, block_index)`.
///
/// Holds at most one color per key; inserting an existing key replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ManualColorOverride>", into = "Vec<ManualColorOverride>")]
pub struct ColorOverrides {
    entries: HashMap<(usize, usize), Color>,
}

impl ColorOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: ManualColorOverride) -> Option<Color> {
        self.entries
            .insert((entry.slide_index, entry.block_index), entry.color)
    }

    pub fn remove(&mut self, slide_index: usize, block_index: usize) -> Option<Color> {
        self.entries.remove(&(slide_index, block_index))
    }

    pub fn get(&self, slide_index: usize, block_index: usize) -> Option<Color> {
        self.entries.get(&(slide_index, block_index)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<ManualColorOverride>> for ColorOverrides {
    fn from(list: Vec<ManualColorOverride>) -> Self {
        let mut overrides = ColorOverrides::new();
        for entry in list {
            overrides.insert(entry);
        }
        overrides
    }
}

impl From<ColorOverrides> for Vec<ManualColorOverride> {
    fn from(overrides: ColorOverrides) -> Self {
        let mut list: Vec<ManualColorOverride> = overrides
            .entries
            .into_iter()
            .map(|((slide_index, block_index), color)| ManualColorOverride {
                slide_index,
                block_index,
                color,
            })
            .collect();
        list.sort_by_key(|o| (o.slide_index, o.block_index));
        list
    }
}

/// The slide-parsing collaborator: a slide count and slide lookup by index.
pub trait SlideSource: Sync {
    fn slide_count(&self) -> Result<usize>;
    fn slide(&self, index: usize) -> Result<SlideData>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DeckFile {
    Wrapped { slides: Vec<SlideData> },
    Bare(Vec<SlideData>),
}

/// A deck of already-extracted slides loaded from a JSON file.
///
/// Accepts either `{"slides": [...]}` or a bare array of slide objects.
#[derive(Debug, Clone, Default)]
pub struct JsonDeck {
    pub path: Option<PathBuf>,
    slides: Vec<SlideData>,
}

impl JsonDeck {
    pub fn open(path: &Path) -> Result<Self> {
        info!("Loading slide deck: {:?}", path);
        if !path.exists() {
            return Err(RenderError::PathNotFoundError(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(RenderError::FileReadError)?;
        let mut deck = Self::from_json(&content)?;
        deck.path = Some(path.to_path_buf());
        info!("Loaded {} slides", deck.slides.len());
        Ok(deck)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let slides = match serde_json::from_str::<DeckFile>(content)? {
            DeckFile::Wrapped { slides } | DeckFile::Bare(slides) => slides,
        };
        Ok(Self::from_slides(slides))
    }

    /// Slides are stored by position; each slide's `slide_index` is reset to
    /// match its position in the deck.
    pub fn from_slides(mut slides: Vec<SlideData>) -> Self {
        for (i, slide) in slides.iter_mut().enumerate() {
            slide.slide_index = i;
        }
        Self { path: None, slides }
    }

    pub fn slides(&self) -> &[SlideData] {
        &self.slides
    }
}

impl SlideSource for JsonDeck {
    fn slide_count(&self) -> Result<usize> {
        Ok(self.slides.len())
    }

    fn slide(&self, index: usize) -> Result<SlideData> {
        self.slides
            .get(index)
            .cloned()
            .ok_or(RenderError::SlideIndexOutOfRange {
                index,
                count: self.slides.len(),
            })
    }
}
