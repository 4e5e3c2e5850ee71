// ABOUTME: Greedy line wrapping for the slide-render library
// ABOUTME: Packs highlighted segments into measured lines of same-style runs

use crate::color::Color;
use crate::highlight::Segment;

/// Width of a piece of text in layout units.
pub trait TextMeasure {
    fn measure(&self, text: &str, bold: bool) -> f32;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, bool) -> f32,
{
    fn measure(&self, text: &str, bold: bool) -> f32 {
        self(text, bold)
    }
}

/// A contiguous span of a line sharing one draw color and weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub color: Color,
    pub bold: bool,
}

/// One wrapped line: runs sharing a common baseline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedLine {
    pub runs: Vec<Run>,
}

impl RenderedLine {
    /// Build a line, merging neighbouring runs with identical style.
    fn from_runs(runs: Vec<Run>) -> Self {
        let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
        for run in runs {
            push_run(&mut merged, &run.text, run.color, run.bold);
        }
        Self { runs: merged }
    }

    /// The line's text with run boundaries removed.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }
}

fn push_run(runs: &mut Vec<Run>, text: &str, color: Color, bold: bool) {
    if text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.color == color && last.bold == bold => last.text.push_str(text),
        _ => runs.push(Run {
            text: text.to_string(),
            color,
            bold,
        }),
    }
}

/// Greedily wrap `segments` into lines no wider than `max_width`.
///
/// Words are split on single spaces and keep their trailing space. A word is
/// moved to a new line when adding it would overflow a non-empty line, so a
/// word wider than `max_width` sits alone on its own line unbroken.
pub fn wrap<M>(segments: &[Segment], bold: bool, max_width: f32, measure: &M) -> Vec<RenderedLine>
where
    M: TextMeasure + ?Sized,
{
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut runs: Vec<Run> = Vec::new();

    for segment in segments {
        if segment.text.is_empty() {
            continue;
        }

        let parts: Vec<&str> = segment.text.split(' ').collect();
        let last = parts.len() - 1;

        for (i, part) in parts.iter().enumerate() {
            let word = if i < last {
                format!("{} ", part)
            } else {
                part.to_string()
            };
            if word.is_empty() {
                continue;
            }

            let candidate = format!("{}{}", current, word);
            if measure.measure(&candidate, bold) > max_width && !current.is_empty() {
                lines.push(RenderedLine::from_runs(std::mem::take(&mut runs)));
                current = word;
                push_run(&mut runs, &current, segment.color, bold);
            } else {
                current = candidate;
                push_run(&mut runs, &word, segment.color, bold);
            }
        }
    }

    if !current.is_empty() {
        lines.push(RenderedLine::from_runs(runs));
    }

    lines
}
