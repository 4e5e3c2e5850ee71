// ABOUTME: Verse reference detection for the slide-render library
// ABOUTME: Structural pattern matching of chapter/verse style line prefixes

use once_cell::sync::Lazy;
use regex::Regex;

/// Reference-style prefixes, tried in order.
static VERSE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // "1장 1절", "3 Chapter", "12편"
        r"^\d+\s*(장|절|편|(?i:chapter|verse))",
        // "창세기 1장", "시편 23편"
        r"^[가-힣]+\s*\d+\s*(장|편|절)",
        // "창세기 1:1", "요한복음 3:16-18", "1 John 1:9"
        r"^(\d\s*)?[가-힣A-Za-z]+\.?\s*\d+\s*:\s*\d+(\s*-\s*\d+)?",
        // "Ioannes 3:16"
        r"^[A-Z][a-z]+\s+\d+:\d+",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Whether a line starts with a scripture-like reference.
///
/// Purely structural: `"John 3:16"` and `"Genesis 1:1"` match because of their
/// shape, not because the book name is recognized.
pub fn is_verse_like(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    VERSE_PATTERNS.iter().any(|re| re.is_match(trimmed))
}
