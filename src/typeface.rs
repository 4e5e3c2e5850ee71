// ABOUTME: Text measurement and glyph drawing for the slide-render library
// ABOUTME: Outline fonts via ab_glyph plus a deterministic metric face

use crate::color::Color;
use crate::errors::{RenderError, Result};
use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use image::RgbImage;
use log::info;
use std::fs;
use std::path::Path;
use unicode_width::UnicodeWidthChar;

/// Measures and paints text at a pixel size.
///
/// Implementations must be deterministic: the same text at the same size
/// always measures and paints identically.
pub trait Typeface: Send + Sync {
    fn name(&self) -> &str;

    /// Horizontal advance of `text` at `px` pixels.
    fn advance(&self, text: &str, px: f32, bold: bool) -> f32;

    /// Distance from the top of a line box to its baseline.
    fn ascent(&self, px: f32) -> f32;

    /// Paint `text` with its baseline starting at `(x, baseline)`.
    fn draw(
        &self,
        image: &mut RgbImage,
        text: &str,
        x: f32,
        baseline: f32,
        px: f32,
        bold: bool,
        color: Color,
    );
}

fn blend_pixel(image: &mut RgbImage, x: i64, y: i64, color: Color, coverage: f32) {
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 || coverage <= 0.0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    let background: Color = (*image.get_pixel(x, y)).into();
    image.put_pixel(x, y, color.blend_over(background, coverage).into());
}

/// A TrueType/OpenType face rasterized through `ab_glyph`.
///
/// Bold text uses the bold font when one is loaded; otherwise it is
/// emboldened by painting the regular outlines twice with a small offset.
pub struct FontFace {
    name: String,
    regular: FontVec,
    bold: Option<FontVec>,
}

impl FontFace {
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let regular = FontVec::try_from_vec(data).map_err(|e| RenderError::FontError {
            message: format!("Invalid font data for {}", name),
            source: Some(Box::new(e)),
        })?;
        Ok(Self {
            name,
            regular,
            bold: None,
        })
    }

    pub fn open(path: &Path) -> Result<Self> {
        info!("Loading font: {:?}", path);
        let data = fs::read(path).map_err(|e| RenderError::FontError {
            message: format!("Failed to read font file {:?}", path),
            source: Some(Box::new(e)),
        })?;
        Self::from_bytes(path.to_string_lossy(), data)
    }

    pub fn with_bold(mut self, path: &Path) -> Result<Self> {
        info!("Loading bold font: {:?}", path);
        let data = fs::read(path).map_err(|e| RenderError::FontError {
            message: format!("Failed to read font file {:?}", path),
            source: Some(Box::new(e)),
        })?;
        let bold = FontVec::try_from_vec(data).map_err(|e| RenderError::FontError {
            message: format!("Invalid font data for {:?}", path),
            source: Some(Box::new(e)),
        })?;
        self.bold = Some(bold);
        Ok(self)
    }

    /// The font used for a weight, and whether bold must be synthesized.
    fn font_for(&self, bold: bool) -> (&FontVec, bool) {
        match (&self.bold, bold) {
            (Some(font), true) => (font, false),
            (None, true) => (&self.regular, true),
            _ => (&self.regular, false),
        }
    }

    fn embolden_offset(px: f32) -> f32 {
        (px / 24.0).max(1.0)
    }
}

impl Typeface for FontFace {
    fn name(&self) -> &str {
        &self.name
    }

    fn advance(&self, text: &str, px: f32, bold: bool) -> f32 {
        let (font, synthetic) = self.font_for(bold);
        let scaled = font.as_scaled(PxScale::from(px));

        let mut width = 0.0;
        let mut previous: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }

        if synthetic && !text.is_empty() {
            width += Self::embolden_offset(px);
        }
        width
    }

    fn ascent(&self, px: f32) -> f32 {
        self.regular.as_scaled(PxScale::from(px)).ascent()
    }

    fn draw(
        &self,
        image: &mut RgbImage,
        text: &str,
        x: f32,
        baseline: f32,
        px: f32,
        bold: bool,
        color: Color,
    ) {
        let (font, synthetic) = self.font_for(bold);
        let scale = PxScale::from(px);
        let scaled = font.as_scaled(scale);
        let offsets = [0.0, Self::embolden_offset(px)];
        let passes = if synthetic { &offsets[..] } else { &offsets[..1] };

        let mut caret = x;
        let mut previous: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }

            for offset in passes {
                let glyph = id.with_scale_and_position(scale, point(caret + offset, baseline));
                if let Some(outlined) = font.outline_glyph(glyph) {
                    let bounds = outlined.px_bounds();
                    outlined.draw(|gx, gy, coverage| {
                        blend_pixel(
                            image,
                            bounds.min.x as i64 + gx as i64,
                            bounds.min.y as i64 + gy as i64,
                            color,
                            coverage,
                        );
                    });
                }
            }

            caret += scaled.h_advance(id);
            previous = Some(id);
        }
    }
}

/// A font-free face with fixed per-cell metrics.
///
/// Each character advances `0.6 × px` per terminal column and paints as a
/// solid box in the run color. Used when no font file can be loaded, and in
/// tests where exact pixel colors matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFace;

impl BlockFace {
    const CELL: f32 = 0.6;

    fn cell_width(c: char, px: f32) -> f32 {
        c.width().unwrap_or(0) as f32 * px * Self::CELL
    }
}

impl Typeface for BlockFace {
    fn name(&self) -> &str {
        "block"
    }

    fn advance(&self, text: &str, px: f32, _bold: bool) -> f32 {
        text.chars().map(|c| Self::cell_width(c, px)).sum()
    }

    fn ascent(&self, px: f32) -> f32 {
        px * 0.8
    }

    fn draw(
        &self,
        image: &mut RgbImage,
        text: &str,
        x: f32,
        baseline: f32,
        px: f32,
        bold: bool,
        color: Color,
    ) {
        let ink = if bold { 0.9 } else { 0.75 };
        let top = (baseline - px * 0.7).round() as i64;
        let bottom = (baseline.round() as i64).max(top + 1);

        let mut caret = x;
        for c in text.chars() {
            let w = Self::cell_width(c, px);
            if w > 0.0 && !c.is_whitespace() {
                let left = caret.round() as i64;
                let right = ((caret + w * ink).round() as i64).max(left + 1);
                for py in top..bottom {
                    for px_x in left..right {
                        blend_pixel(image, px_x, py, color, 1.0);
                    }
                }
            }
            caret += w;
        }
    }
}
