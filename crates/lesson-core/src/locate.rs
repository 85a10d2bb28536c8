use thiserror::Error;
use tracing::debug;

use crate::segments::SegmentModel;
use crate::types::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("snippet is empty")]
    EmptySnippet,
    #[error("snippet not found in lesson text")]
    NotFound,
}

/// Range of the `occurrence`-th match of `snippet`, counting every start
/// position (overlapping matches included).
pub fn locate(
    model: &SegmentModel,
    snippet: &str,
    occurrence: usize,
) -> Result<TextRange, LocateError> {
    if snippet.trim().is_empty() {
        return Err(LocateError::EmptySnippet);
    }
    match_starts(model.text(), snippet)
        .nth(occurrence)
        .map(|start| TextRange::new(start, start + snippet.len()))
        .ok_or(LocateError::NotFound)
}

/// [`locate`] for stored marks: when the lesson now holds fewer matches than
/// `occurrence` needs, the last remaining match stands in.
pub fn relocate(
    model: &SegmentModel,
    snippet: &str,
    occurrence: usize,
) -> Result<TextRange, LocateError> {
    match locate(model, snippet, occurrence) {
        Err(LocateError::NotFound) => {
            let last = count_matches(model, snippet)
                .checked_sub(1)
                .ok_or(LocateError::NotFound)?;
            debug!(snippet, occurrence, last, "occurrence gone, using last match");
            locate(model, snippet, last)
        }
        found => found,
    }
}

/// Inverse of [`locate`]: how many matches of the text under `range` start
/// before it.
pub fn occurrence_of(model: &SegmentModel, range: TextRange) -> Option<usize> {
    let snippet = model.slice(range).filter(|s| !s.is_empty())?;
    Some(
        match_starts(model.text(), snippet)
            .take_while(|&start| start < range.start)
            .count(),
    )
}

pub fn count_matches(model: &SegmentModel, snippet: &str) -> usize {
    if snippet.is_empty() {
        return 0;
    }
    match_starts(model.text(), snippet).count()
}

fn match_starts<'a>(haystack: &'a str, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
    let mut from = 0;
    std::iter::from_fn(move || {
        let found = from + haystack.get(from..)?.find(needle)?;
        let step = haystack[found..].chars().next().map_or(1, char::len_utf8);
        from = found + step;
        Some(found)
    })
}
