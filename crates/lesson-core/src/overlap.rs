use crate::apply::MarkLayer;
use crate::types::TextRange;

/// How a new selection relates to the highlights applied in the current render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The first intersecting wrapper covers exactly the selected text.
    ExactMatch(String),
    /// The first intersecting wrapper differs from the selection; `also` lists
    /// every further intersected wrapper in document order.
    Overlap { id: String, also: Vec<String> },
    None,
}

pub fn classify(selection_text: &str, selection: TextRange, layer: &MarkLayer) -> Classification {
    let mut hits = layer
        .highlights()
        .iter()
        .filter(|w| w.range.intersects(selection));
    let Some(first) = hits.next() else {
        return Classification::None;
    };
    if first.text == selection_text {
        return Classification::ExactMatch(first.id.clone());
    }
    Classification::Overlap {
        id: first.id.clone(),
        also: hits.map(|w| w.id.clone()).collect(),
    }
}
