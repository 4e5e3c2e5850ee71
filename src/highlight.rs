// ABOUTME: Keyword highlighting for the slide-render library
// ABOUTME: Partitions text into colored segments from case-insensitive keyword matches

use crate::color::Color;
use log::{debug, warn};
use regex::RegexBuilder;

/// Highlight colors, assigned to keywords by position modulo the palette size.
pub const PALETTE: [Color; 8] = [
    Color::rgb(0xE5, 0x39, 0x35), // red
    Color::rgb(0x1E, 0x88, 0xE5), // blue
    Color::rgb(0x43, 0xA0, 0x47), // green
    Color::rgb(0xFB, 0x8C, 0x00), // orange
    Color::rgb(0x8E, 0x24, 0xAA), // purple
    Color::rgb(0x00, 0xAC, 0xC1), // cyan
    Color::rgb(0xD8, 0x1B, 0x60), // pink
    Color::rgb(0x6D, 0x4C, 0x41), // brown
];

/// Highlight color for the keyword at position `index`.
pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// A run of text sharing one highlight decision, before line wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub color: Color,
    pub is_highlighted: bool,
}

impl Segment {
    pub fn plain(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
            is_highlighted: false,
        }
    }
}

/// Split `text` into segments colored by keyword matches.
///
/// Matching is case-insensitive and unanchored. Blank keywords are ignored and
/// keywords that cannot be compiled are skipped. When matches of different
/// keywords overlap, the keyword later in the list owns the overlapping text.
pub fn highlight<S: AsRef<str>>(text: &str, keywords: &[S], base_color: Color) -> Vec<Segment> {
    if keywords.is_empty() || text.is_empty() {
        return vec![Segment::plain(text, base_color)];
    }

    // Keyword index owning each byte of `text`.
    let mut owner: Vec<Option<usize>> = vec![None; text.len()];
    let mut any_match = false;

    for (i, keyword) in keywords.iter().enumerate() {
        let keyword = keyword.as_ref();
        if keyword.trim().is_empty() {
            continue;
        }

        let matcher = match RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
        {
            Ok(re) => re,
            Err(e) => {
                warn!("Skipping keyword {:?}: {}", keyword, e);
                continue;
            }
        };

        for m in matcher.find_iter(text) {
            if m.start() == m.end() {
                continue;
            }
            owner[m.start()..m.end()].fill(Some(i));
            any_match = true;
        }
    }

    if !any_match {
        return vec![Segment::plain(text, base_color)];
    }

    let mut segments = Vec::new();
    let mut start = 0;
    for end in 1..=text.len() {
        let boundary = end == text.len() || owner[end] != owner[start];
        // Match spans always begin and end on char boundaries, so partition
        // points do too.
        if boundary && text.is_char_boundary(end) {
            let piece = &text[start..end];
            segments.push(match owner[start] {
                Some(i) => Segment {
                    text: piece.to_string(),
                    color: palette_color(i),
                    is_highlighted: true,
                },
                None => Segment::plain(piece, base_color),
            });
            start = end;
        }
    }

    debug!(
        "Highlighted {:?} into {} segments",
        text,
        segments.len()
    );
    segments
}
