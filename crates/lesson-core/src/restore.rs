//! Re-materializes persisted marks onto a freshly rendered lesson.

use tracing::{debug, warn};

use crate::apply::{ApplyMode, MarkLayer};
use crate::locate::{relocate, LocateError};
use crate::segments::SegmentModel;
use crate::types::{Annotation, Highlight};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub highlights_applied: Vec<String>,
    pub indicators_inserted: Vec<String>,
    /// Records whose anchor text is missing from this render. They stay stored.
    pub orphaned: Vec<String>,
    /// Records skipped because they were already materialized.
    pub already_present: usize,
}

impl RestoreReport {
    pub fn changed(&self) -> bool {
        !self.highlights_applied.is_empty() || !self.indicators_inserted.is_empty()
    }
}

/// Applies this lesson's highlights not yet in `layer` (creation order), then
/// inserts indicators for its annotations. Safe to call repeatedly.
pub fn run(
    model: &SegmentModel,
    layer: &mut MarkLayer,
    highlights: &[Highlight],
    annotations: &[Annotation],
    lesson_id: &str,
) -> RestoreReport {
    let mut report = RestoreReport::default();

    let mut ordered: Vec<&Highlight> = highlights
        .iter()
        .filter(|h| h.lesson_id == lesson_id)
        .collect();
    ordered.sort_by_key(|h| h.timestamp);
    for highlight in ordered {
        if layer.has_highlight(&highlight.id) {
            report.already_present += 1;
            continue;
        }
        let range = match relocate(model, &highlight.text, highlight.occurrence) {
            Ok(range) => range,
            Err(LocateError::NotFound | LocateError::EmptySnippet) => {
                debug!(id = %highlight.id, "highlight anchor not found; skipping");
                report.orphaned.push(highlight.id.clone());
                continue;
            }
        };
        match layer.apply_highlight(model, range, &highlight.id, highlight.color, ApplyMode::Restore)
        {
            Ok(true) => report.highlights_applied.push(highlight.id.clone()),
            Ok(false) => report.already_present += 1,
            Err(e) => warn!(id = %highlight.id, "could not restore highlight: {e}"),
        }
    }

    for annotation in annotations.iter().filter(|a| a.lesson_id == lesson_id) {
        if layer.has_indicator(&annotation.id) {
            report.already_present += 1;
            continue;
        }
        match relocate(model, &annotation.text, annotation.occurrence) {
            Ok(range) => {
                layer.insert_indicator(range.end, &annotation.id);
                report.indicators_inserted.push(annotation.id.clone());
            }
            Err(_) => {
                debug!(id = %annotation.id, "annotation anchor not found; skipping");
                report.orphaned.push(annotation.id.clone());
            }
        }
    }

    debug!(
        applied = report.highlights_applied.len(),
        indicators = report.indicators_inserted.len(),
        orphaned = report.orphaned.len(),
        "restore pass finished"
    );
    report
}
