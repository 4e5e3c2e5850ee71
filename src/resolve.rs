// ABOUTME: Block color resolution for the slide-render library
// ABOUTME: Single source of truth for a block's draw color across preview and export

use crate::color::Color;
use crate::render::RenderConfig;
use crate::slide::TextBlock;
use crate::verse::is_verse_like;

/// Final draw color of `block`.
///
/// First match wins: a manual override for `(slide_index, block_index)`, then
/// the verse color if detection is enabled and the block reads like a
/// reference, then the base text color. With `honor_author_colors` set, a
/// block's own extracted color stands in for the base text color.
pub fn resolve_block_color(
    block: &TextBlock,
    block_index: usize,
    slide_index: usize,
    config: &RenderConfig,
) -> Color {
    if let Some(color) = config.overrides.get(slide_index, block_index) {
        return color;
    }

    if config.verse_detection_enabled && is_verse_like(&block.text) {
        return config.verse_color;
    }

    match block.color {
        Some(color) if config.honor_author_colors => color,
        _ => config.text_color,
    }
}
