// ABOUTME: Rasterization module for the slide-render library
// ABOUTME: Lays out slide text and paints it at preview or export resolution

use crate::color::Color;
use crate::errors::{RenderError, Result};
use crate::highlight::highlight;
use crate::resolve::resolve_block_color;
use crate::slide::{ColorOverrides, SlideData};
use crate::typeface::Typeface;
use crate::wrap::{wrap, RenderedLine, Run};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbImage};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Logical canvas of the high-resolution export.
pub const EXPORT_WIDTH: u32 = 1280;
pub const EXPORT_HEIGHT: u32 = 720;
pub const EXPORT_PIXEL_RATIO: f32 = 2.0;
pub const EXPORT_FONT_SIZE: f32 = 48.0;
pub const EXPORT_PADDING: f32 = 50.0;

/// Line box height as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.2;
/// Space after each block as a multiple of its line height.
pub const BLOCK_GAP: f32 = 0.3;
/// Placeholder label size as a multiple of the base font size.
const PLACEHOLDER_SCALE: f32 = 1.5;
const MIN_FONT_SIZE: f32 = 1.0;

/// Colors, keywords and overrides for one render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub background_color: Color,
    pub text_color: Color,
    pub highlight_keywords: Vec<String>,
    pub verse_color: Color,
    pub verse_detection_enabled: bool,
    pub overrides: ColorOverrides,
    /// Preview width in logical pixels.
    pub width: u32,
    /// Preview height in logical pixels.
    pub height: u32,
    /// Use a block's extracted color instead of `text_color` as the fallback.
    pub honor_author_colors: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background_color: Color::WHITE,
            text_color: Color::BLACK,
            highlight_keywords: Vec::new(),
            verse_color: Color::rgb(0x8B, 0x00, 0x00),
            verse_detection_enabled: true,
            overrides: ColorOverrides::new(),
            width: 800,
            height: 600,
            honor_author_colors: false,
        }
    }
}

/// Size and typographic constants of one drawing surface.
///
/// Layout happens in logical units; painting multiplies by `pixel_ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTarget {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
    /// Font size for full-text fallback and the placeholder label.
    pub base_font_size: f32,
    pub padding: f32,
    /// Multiplier applied to each block's own font size.
    pub block_scale: f32,
}

impl RenderTarget {
    pub fn preview(width: u32, height: u32) -> Self {
        let w = width as f32;
        Self {
            width: w,
            height: height as f32,
            pixel_ratio: 1.0,
            base_font_size: (w / 25.0).min(20.0).max(12.0),
            padding: (w * 0.05).max(10.0),
            block_scale: w / EXPORT_WIDTH as f32,
        }
    }

    pub fn export(width: u32, height: u32, scale_factor: f32) -> Self {
        let w = width as f32;
        Self {
            width: w,
            height: height as f32,
            pixel_ratio: scale_factor,
            base_font_size: EXPORT_FONT_SIZE,
            padding: EXPORT_PADDING,
            block_scale: 1.0,
        }
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_ratio).round().max(0.0) as u32,
            (self.height * self.pixel_ratio).round().max(0.0) as u32,
        )
    }

    fn max_line_width(&self) -> f32 {
        (self.width - 2.0 * self.padding).max(0.0)
    }

    fn bottom(&self) -> f32 {
        self.height - self.padding
    }
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self::export(EXPORT_WIDTH, EXPORT_HEIGHT, EXPORT_PIXEL_RATIO)
    }
}

/// Which layout path produced a slide layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPass {
    Blocks,
    Fallback,
    Placeholder,
}

/// A wrapped line positioned on the logical canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x: f32,
    pub top: f32,
    pub font_size: f32,
    pub line: RenderedLine,
}

impl PlacedLine {
    pub fn line_height(&self) -> f32 {
        self.font_size * LINE_HEIGHT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideLayout {
    pub pass: LayoutPass,
    pub lines: Vec<PlacedLine>,
}

/// A finished slide raster.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub slide_index: usize,
    image: RgbImage,
}

impl RasterImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        (*self.image.get_pixel(x, y)).into()
    }

    /// Whether any pixel has exactly this color.
    pub fn contains_color(&self, color: Color) -> bool {
        let target: image::Rgb<u8> = color.into();
        self.image.pixels().any(|p| *p == target)
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer).write_image(
            self.image.as_raw(),
            self.image.width(),
            self.image.height(),
            ColorType::Rgb8,
        )?;
        Ok(buffer)
    }

    /// PNG bytes as a `data:image/png;base64,` URI.
    pub fn to_data_uri(&self) -> Result<String> {
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(self.to_png()?)))
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_png()?).map_err(RenderError::FileReadError)
    }
}

/// Lays out and paints slides with one typeface.
///
/// Preview and export both go through [`Rasterizer::rasterize`]; only the
/// [`RenderTarget`] differs between them.
pub struct Rasterizer<'a> {
    face: &'a dyn Typeface,
}

impl<'a> Rasterizer<'a> {
    pub fn new(face: &'a dyn Typeface) -> Self {
        Self { face }
    }

    fn measure(&self, font_size: f32) -> impl Fn(&str, bool) -> f32 + '_ {
        move |text: &str, bold: bool| self.face.advance(text, font_size, bold)
    }

    /// Position every visible line of `slide` on the target's logical canvas.
    pub fn layout(&self, slide: &SlideData, config: &RenderConfig, target: &RenderTarget) -> SlideLayout {
        if !slide.text_blocks.is_empty() {
            SlideLayout {
                pass: LayoutPass::Blocks,
                lines: self.layout_blocks(slide, config, target),
            }
        } else if !slide.full_text.trim().is_empty() {
            SlideLayout {
                pass: LayoutPass::Fallback,
                lines: self.layout_full_text(slide, config, target),
            }
        } else {
            SlideLayout {
                pass: LayoutPass::Placeholder,
                lines: vec![self.layout_placeholder(slide, config, target)],
            }
        }
    }

    fn layout_blocks(&self, slide: &SlideData, config: &RenderConfig, target: &RenderTarget) -> Vec<PlacedLine> {
        let max_width = target.max_line_width();
        let bottom = target.bottom();
        let mut placed = Vec::new();
        let mut y = target.padding;

        'blocks: for (block_index, block) in slide.text_blocks.iter().enumerate() {
            if y > bottom {
                break;
            }
            if block.text.trim().is_empty() {
                continue;
            }

            let color = resolve_block_color(block, block_index, slide.slide_index, config);
            let font_size = (block.font_size * target.block_scale).max(MIN_FONT_SIZE);
            let line_height = font_size * LINE_HEIGHT;
            let measure = self.measure(font_size);

            for paragraph in block.text.split('\n') {
                let paragraph = paragraph.trim_end_matches('\r');
                if paragraph.trim().is_empty() {
                    y += line_height;
                    continue;
                }

                let segments = highlight(paragraph, &config.highlight_keywords, color);
                for line in wrap(&segments, block.bold, max_width, &measure) {
                    if y > bottom - line_height {
                        debug!(
                            "Slide {}: truncating at block {}",
                            slide.slide_index, block_index
                        );
                        break 'blocks;
                    }
                    placed.push(PlacedLine {
                        x: target.padding,
                        top: y,
                        font_size,
                        line,
                    });
                    y += line_height;
                }
            }

            y += line_height * BLOCK_GAP;
        }

        placed
    }

    fn layout_full_text(&self, slide: &SlideData, config: &RenderConfig, target: &RenderTarget) -> Vec<PlacedLine> {
        let max_width = target.max_line_width();
        let bottom = target.bottom();
        let font_size = target.base_font_size;
        let line_height = font_size * LINE_HEIGHT;
        let measure = self.measure(font_size);
        let mut placed = Vec::new();
        let mut y = target.padding;

        'lines: for raw in slide.full_text.split('\n') {
            let raw = raw.trim_end_matches('\r');
            if raw.trim().is_empty() {
                y += line_height;
                continue;
            }

            let segments = highlight(raw, &config.highlight_keywords, config.text_color);
            for line in wrap(&segments, false, max_width, &measure) {
                if y > bottom - line_height {
                    debug!("Slide {}: truncating full text", slide.slide_index);
                    break 'lines;
                }
                placed.push(PlacedLine {
                    x: target.padding,
                    top: y,
                    font_size,
                    line,
                });
                y += line_height;
            }
        }

        placed
    }

    fn layout_placeholder(&self, slide: &SlideData, config: &RenderConfig, target: &RenderTarget) -> PlacedLine {
        let font_size = target.base_font_size * PLACEHOLDER_SCALE;
        let label = format!("Slide {}", slide.slide_index + 1);
        let width = self.face.advance(&label, font_size, false);
        let line = RenderedLine {
            runs: vec![Run {
                text: label,
                color: config.text_color,
                bold: false,
            }],
        };
        PlacedLine {
            x: ((target.width - width) / 2.0).max(0.0),
            top: ((target.height - font_size * LINE_HEIGHT) / 2.0).max(0.0),
            font_size,
            line,
        }
    }

    /// Render `slide` onto a fresh surface of `target`'s size.
    pub fn rasterize(&self, slide: &SlideData, config: &RenderConfig, target: &RenderTarget) -> Result<RasterImage> {
        let (width, height) = target.pixel_size();
        if width == 0 || height == 0 {
            return Err(RenderError::SurfaceUnavailable { width, height });
        }

        let mut image = RgbImage::from_pixel(width, height, config.background_color.into());
        let layout = self.layout(slide, config, target);
        debug!(
            "Slide {}: {:?} pass, {} lines on {}x{}",
            slide.slide_index,
            layout.pass,
            layout.lines.len(),
            width,
            height
        );

        let ratio = target.pixel_ratio;
        for placed in &layout.lines {
            let font_size = placed.font_size;
            let baseline =
                placed.top + (placed.line_height() - font_size) / 2.0 + self.face.ascent(font_size);
            let mut caret = placed.x;
            for run in &placed.line.runs {
                self.face.draw(
                    &mut image,
                    &run.text,
                    caret * ratio,
                    baseline * ratio,
                    font_size * ratio,
                    run.bold,
                    run.color,
                );
                caret += self.face.advance(&run.text, font_size, run.bold);
            }
        }

        Ok(RasterImage {
            slide_index: slide.slide_index,
            image,
        })
    }
}

/// Render a preview at `config.width` × `config.height`.
pub fn render(slide: &SlideData, config: &RenderConfig, face: &dyn Typeface) -> Result<RasterImage> {
    Rasterizer::new(face).rasterize(slide, config, &RenderTarget::preview(config.width, config.height))
}

/// Render at an explicit logical size and pixel density with export typography.
pub fn render_high_res(
    slide: &SlideData,
    config: &RenderConfig,
    target_width: u32,
    target_height: u32,
    scale_factor: f32,
    face: &dyn Typeface,
) -> Result<RasterImage> {
    Rasterizer::new(face).rasterize(
        slide,
        config,
        &RenderTarget::export(target_width, target_height, scale_factor),
    )
}

/// Preview as a data URI; nothing is rendered until slide data is present.
pub fn preview_data_uri(
    slide: Option<&SlideData>,
    config: &RenderConfig,
    face: &dyn Typeface,
) -> Result<Option<String>> {
    match slide {
        Some(slide) => Ok(Some(render(slide, config, face)?.to_data_uri()?)),
        None => Ok(None),
    }
}

/// Render previews of all slides in parallel, one result per slide.
pub fn render_previews(
    slides: &[SlideData],
    config: &RenderConfig,
    face: &dyn Typeface,
) -> Vec<Result<RasterImage>> {
    info!(
        "Rendering {} previews at {}x{}",
        slides.len(),
        config.width,
        config.height
    );
    slides
        .par_iter()
        .map(|slide| render(slide, config, face))
        .collect()
}
