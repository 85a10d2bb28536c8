use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::store::{MarkStore, StoreError};
use crate::types::{Annotation, Highlight, LessonKey, MarkKind};

/// Stored data that did not parse as marks. It is carried along so a save
/// never drops it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Unreadable {
    /// JSON records that are not valid marks; written back untouched.
    records: Vec<Value>,
    /// Payload that is not a JSON array; set aside before the first overwrite.
    payload: Option<String>,
}

/// Highlight and annotation collections of one lesson, in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonMarks {
    key: LessonKey,
    highlights: Vec<Highlight>,
    annotations: Vec<Annotation>,
    unreadable_highlights: Unreadable,
    unreadable_annotations: Unreadable,
}

impl LessonMarks {
    pub fn empty(key: LessonKey) -> Self {
        Self {
            key,
            highlights: Vec::new(),
            annotations: Vec::new(),
            unreadable_highlights: Unreadable::default(),
            unreadable_annotations: Unreadable::default(),
        }
    }

    /// Records that fail to parse are logged and skipped, and so is a payload
    /// that is not JSON at all. Both are kept for the next save. I/O failures
    /// propagate.
    pub fn load<S: MarkStore + ?Sized>(store: &S, key: LessonKey) -> Result<Self, StoreError> {
        let (highlights, unreadable_highlights) =
            read_collection(store, &key, MarkKind::Highlights)?;
        let (annotations, unreadable_annotations) =
            read_collection(store, &key, MarkKind::Annotations)?;
        Ok(Self {
            key,
            highlights,
            annotations,
            unreadable_highlights,
            unreadable_annotations,
        })
    }

    pub fn save_highlights<S: MarkStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<(), StoreError> {
        write_collection(
            store,
            &self.key,
            MarkKind::Highlights,
            &self.highlights,
            &mut self.unreadable_highlights,
        )
    }

    pub fn save_annotations<S: MarkStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<(), StoreError> {
        write_collection(
            store,
            &self.key,
            MarkKind::Annotations,
            &self.annotations,
            &mut self.unreadable_annotations,
        )
    }

    /// Number of stored records that could not be read, both kinds together.
    pub fn unreadable_count(&self) -> usize {
        self.unreadable_highlights.records.len() + self.unreadable_annotations.records.len()
    }

    pub fn key(&self) -> &LessonKey {
        &self.key
    }

    pub fn lesson_id(&self) -> &str {
        &self.key.lesson_id
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn highlight(&self, id: &str) -> Option<&Highlight> {
        self.highlights.iter().find(|h| h.id == id)
    }

    pub fn annotation(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn annotation_mut(&mut self, id: &str) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    /// Annotation of this lesson anchored on exactly `text`.
    pub fn annotation_by_text(&self, text: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.text == text && a.lesson_id == self.key.lesson_id)
    }

    pub fn push_highlight(&mut self, highlight: Highlight) {
        self.highlights.push(highlight);
    }

    pub fn push_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub fn remove_highlight(&mut self, id: &str) -> Option<Highlight> {
        let idx = self.highlights.iter().position(|h| h.id == id)?;
        Some(self.highlights.remove(idx))
    }

    pub fn remove_annotation(&mut self, id: &str) -> Option<Annotation> {
        let idx = self.annotations.iter().position(|a| a.id == id)?;
        Some(self.annotations.remove(idx))
    }
}

fn read_collection<S, T>(
    store: &S,
    key: &LessonKey,
    kind: MarkKind,
) -> Result<(Vec<T>, Unreadable), StoreError>
where
    S: MarkStore + ?Sized,
    T: DeserializeOwned,
{
    let mut unreadable = Unreadable::default();
    let Some(payload) = store.read(&key.collection(kind))? else {
        return Ok((Vec::new(), unreadable));
    };
    let values: Vec<Value> = match serde_json::from_str(&payload) {
        Ok(values) => values,
        Err(e) => {
            warn!(
                subject = %key.subject_id,
                lesson = %key.lesson_id,
                kind = kind.as_str(),
                "unreadable mark collection, set aside on next save: {e}"
            );
            unreadable.payload = Some(payload);
            return Ok((Vec::new(), unreadable));
        }
    };

    let mut records = Vec::with_capacity(values.len());
    for value in values {
        match T::deserialize(&value) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    subject = %key.subject_id,
                    lesson = %key.lesson_id,
                    kind = kind.as_str(),
                    id = value.get("id").and_then(serde_json::Value::as_str).unwrap_or("?"),
                    "skipping unreadable mark record: {e}"
                );
                unreadable.records.push(value);
            }
        }
    }
    Ok((records, unreadable))
}

fn write_collection<S, T>(
    store: &mut S,
    key: &LessonKey,
    kind: MarkKind,
    records: &[T],
    unreadable: &mut Unreadable,
) -> Result<(), StoreError>
where
    S: MarkStore + ?Sized,
    T: Serialize,
{
    let collection = key.collection(kind);
    if let Some(payload) = &unreadable.payload {
        store.set_aside(&collection, payload)?;
        unreadable.payload = None;
    }
    let mut values = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    values.extend(unreadable.records.iter().cloned());
    let payload = serde_json::to_string_pretty(&values)?;
    store.write(&collection, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::RgbColor;
    use crate::store::MemoryStore;
    use crate::types::TextRange;

    fn key() -> LessonKey {
        LessonKey::new("biology", "cells")
    }

    #[test]
    fn round_trips_through_store() {
        let mut store = MemoryStore::new();
        let mut marks = LessonMarks::empty(key());
        marks.push_highlight(Highlight::new("cells", "mitosis", RgbColor::new(1, 2, 3), 0));
        let mut note = Annotation::new("cells", "osmosis", TextRange::new(0, 7), 0);
        note.comment = "check".into();
        marks.push_annotation(note);
        marks.save_highlights(&mut store).unwrap();
        marks.save_annotations(&mut store).unwrap();

        let loaded = LessonMarks::load(&store, key()).unwrap();
        assert_eq!(loaded, marks);
    }

    #[test]
    fn corrupt_payload_reads_as_empty_and_is_set_aside_on_save() {
        let mut store = MemoryStore::new();
        let hkey = key().collection(MarkKind::Highlights);
        store.write(&hkey, "{not json").unwrap();
        let mut loaded = LessonMarks::load(&store, key()).unwrap();
        assert!(loaded.highlights().is_empty());
        assert!(store.set_aside_payloads(&hkey).is_empty());

        loaded.push_highlight(Highlight::new("cells", "mitosis", RgbColor::new(1, 2, 3), 0));
        loaded.save_highlights(&mut store).unwrap();
        loaded.save_highlights(&mut store).unwrap();
        assert_eq!(store.set_aside_payloads(&hkey), ["{not json".to_string()]);
        assert_eq!(LessonMarks::load(&store, key()).unwrap().highlights().len(), 1);
    }

    #[test]
    fn bad_record_is_skipped_and_written_back() {
        let mut store = MemoryStore::new();
        let hkey = key().collection(MarkKind::Highlights);
        let good = Highlight::new("cells", "mitosis", RgbColor::new(1, 2, 3), 0);
        let payload = format!(
            "[{}, {{\"id\":\"bad\",\"text\":\"x\",\"color\":\"not-a-color\"}}]",
            serde_json::to_string(&good).unwrap()
        );
        store.write(&hkey, &payload).unwrap();

        let mut loaded = LessonMarks::load(&store, key()).unwrap();
        assert_eq!(loaded.highlights(), [good.clone()]);
        assert_eq!(loaded.unreadable_count(), 1);

        loaded.remove_highlight(&good.id);
        loaded.save_highlights(&mut store).unwrap();
        let saved = store.get(&hkey).unwrap();
        assert!(saved.contains("\"bad\""));
        assert!(!saved.contains(&good.id));
    }

    #[test]
    fn annotation_lookup_is_scoped_to_the_lesson() {
        let mut marks = LessonMarks::empty(key());
        marks.push_annotation(Annotation::new("other", "osmosis", TextRange::new(0, 7), 0));
        assert!(marks.annotation_by_text("osmosis").is_none());
        marks.push_annotation(Annotation::new("cells", "osmosis", TextRange::new(0, 7), 0));
        assert!(marks.annotation_by_text("osmosis").is_some());
    }
}
