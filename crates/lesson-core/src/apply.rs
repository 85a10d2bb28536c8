//! Decoration layer: highlight wrappers and annotation indicators over the
//! lesson text stream. The rendered content is never mutated, so removing a
//! wrapper leaves the text exactly as it was rendered.

use thiserror::Error;

use crate::segments::SegmentModel;
use crate::types::TextRange;

pub use crate::color::contrast;
use crate::color::RgbColor;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("{start}..{end} already contains a highlight")]
    DoubleWrapRejected { start: usize, end: usize },
    #[error("{start}..{end} is outside the lesson text")]
    OutOfBounds { start: usize, end: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// User-initiated; refuses to wrap already highlighted text.
    Create,
    /// Re-materializing persisted records; tolerates overlapping records.
    Restore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedHighlight {
    pub id: String,
    pub range: TextRange,
    pub text: String,
    pub background: RgbColor,
    pub foreground: RgbColor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub annotation_id: String,
    /// Stream offset the marker sits after (the anchor text's end).
    pub offset: usize,
}

/// Style of one run produced by [`MarkLayer::decorations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkStyle {
    pub background: RgbColor,
    pub foreground: RgbColor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub range: TextRange,
    pub highlight: Option<MarkStyle>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkLayer {
    // sorted by range start, ties in insertion order
    wrappers: Vec<AppliedHighlight>,
    // sorted by offset, ties in insertion order
    indicators: Vec<Indicator>,
}

impl MarkLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.wrappers.clear();
        self.indicators.clear();
    }

    /// Returns `Ok(false)` when `id` is already applied.
    pub fn apply_highlight(
        &mut self,
        model: &SegmentModel,
        range: TextRange,
        id: &str,
        color: RgbColor,
        mode: ApplyMode,
    ) -> Result<bool, ApplyError> {
        if self.has_highlight(id) {
            return Ok(false);
        }
        let text = model
            .slice(range)
            .filter(|t| !t.is_empty())
            .ok_or(ApplyError::OutOfBounds {
                start: range.start,
                end: range.end,
            })?;
        if mode == ApplyMode::Create && self.wrappers.iter().any(|w| w.range.intersects(range)) {
            return Err(ApplyError::DoubleWrapRejected {
                start: range.start,
                end: range.end,
            });
        }
        let at = self
            .wrappers
            .partition_point(|w| w.range.start <= range.start);
        self.wrappers.insert(
            at,
            AppliedHighlight {
                id: id.to_string(),
                range,
                text: text.to_string(),
                background: color,
                foreground: contrast(color),
            },
        );
        Ok(true)
    }

    pub fn remove_highlight(&mut self, id: &str) -> Option<AppliedHighlight> {
        let idx = self.wrappers.iter().position(|w| w.id == id)?;
        Some(self.wrappers.remove(idx))
    }

    pub fn has_highlight(&self, id: &str) -> bool {
        self.wrappers.iter().any(|w| w.id == id)
    }

    pub fn highlight(&self, id: &str) -> Option<&AppliedHighlight> {
        self.wrappers.iter().find(|w| w.id == id)
    }

    /// Applied wrappers in document order.
    pub fn highlights(&self) -> &[AppliedHighlight] {
        &self.wrappers
    }

    pub fn highlight_at(&self, offset: usize) -> Option<&AppliedHighlight> {
        self.wrappers.iter().find(|w| w.range.contains(offset))
    }

    /// Returns `false` when a marker for `annotation_id` already exists.
    pub fn insert_indicator(&mut self, offset: usize, annotation_id: &str) -> bool {
        if self.has_indicator(annotation_id) {
            return false;
        }
        let at = self.indicators.partition_point(|i| i.offset <= offset);
        self.indicators.insert(
            at,
            Indicator {
                annotation_id: annotation_id.to_string(),
                offset,
            },
        );
        true
    }

    pub fn remove_indicator(&mut self, annotation_id: &str) -> Option<Indicator> {
        let idx = self
            .indicators
            .iter()
            .position(|i| i.annotation_id == annotation_id)?;
        Some(self.indicators.remove(idx))
    }

    pub fn has_indicator(&self, annotation_id: &str) -> bool {
        self.indicators
            .iter()
            .any(|i| i.annotation_id == annotation_id)
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    pub fn indicators_at(&self, offset: usize) -> impl Iterator<Item = &Indicator> {
        self.indicators.iter().filter(move |i| i.offset == offset)
    }

    /// Closest marker within `slack` bytes of `offset`, for hit testing.
    pub fn indicator_near(&self, offset: usize, slack: usize) -> Option<&Indicator> {
        self.indicators
            .iter()
            .filter(|i| i.offset.abs_diff(offset) <= slack)
            .min_by_key(|i| i.offset.abs_diff(offset))
    }

    /// Splits `range` into runs that share one highlight style (or none).
    /// Where restored wrappers overlap, the earliest-starting wrapper wins.
    pub fn decorations(&self, range: TextRange) -> Vec<Decoration> {
        if range.is_empty() {
            return Vec::new();
        }
        let covering: Vec<&AppliedHighlight> = self
            .wrappers
            .iter()
            .filter(|w| w.range.intersects(range))
            .collect();
        let mut cuts = vec![range.start, range.end];
        for w in &covering {
            cuts.extend(
                [w.range.start, w.range.end]
                    .into_iter()
                    .filter(|c| range.contains(*c)),
            );
        }
        cuts.sort_unstable();
        cuts.dedup();

        let mut runs: Vec<Decoration> = Vec::new();
        for pair in cuts.windows(2) {
            let run = TextRange::new(pair[0], pair[1]);
            let highlight = covering
                .iter()
                .find(|w| w.range.contains(run.start))
                .map(|w| MarkStyle {
                    background: w.background,
                    foreground: w.foreground,
                });
            match runs.last_mut() {
                Some(prev) if prev.highlight == highlight => prev.range.end = run.end,
                _ => runs.push(Decoration {
                    range: run,
                    highlight,
                }),
            }
        }
        runs
    }
}
