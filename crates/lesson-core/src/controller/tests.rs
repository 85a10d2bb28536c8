use super::*;
use crate::store::{MemoryStore, StoreError};
use crate::types::MarkKind;

const LESSON: &str = "<h2>Cells</h2>\
    <p>The cell <em>membrane</em> controls osmosis. Mitosis copies the cell.</p>\
    <p>Water moves in, water moves out.</p>";

fn controller() -> SelectionController<MemoryStore> {
    let key = LessonKey::new("biology", "cells");
    let mut c = SelectionController::new(MemoryStore::new(), key.clone(), Settings::default());
    c.open_lesson(key).unwrap();
    c.mount(&RenderedContent::from_html(LESSON));
    c
}

fn select(c: &mut SelectionController<MemoryStore>, text: &str, nth: usize) -> Outcome {
    let sel = Selection::find(c.model(), text, nth).unwrap();
    c.on_selection_event(sel).unwrap()
}

fn wrapper_texts(c: &SelectionController<MemoryStore>) -> Vec<&str> {
    c.layer().highlights().iter().map(|w| w.text.as_str()).collect()
}

#[test]
fn highlight_mode_creates_with_active_color() {
    let mut c = controller();
    c.set_mode(Mode::Highlight).unwrap();
    let color = c.set_active_color("green").unwrap();
    let outcome = select(&mut c, "Mitosis", 0);
    let Outcome::HighlightCreated(id) = outcome else {
        panic!("unexpected {outcome:?}");
    };
    assert_eq!(c.layer().highlight(&id).unwrap().background, color);
    assert_eq!(c.marks().highlight(&id).unwrap().text, "Mitosis");
    assert_eq!(c.store().writes(), 1);
}

#[test]
fn exact_match_toggles_off() {
    let mut c = controller();
    c.set_mode(Mode::Highlight).unwrap();
    select(&mut c, "osmosis", 0);
    assert_eq!(c.marks().highlights().len(), 1);
    let outcome = select(&mut c, "osmosis", 0);
    assert!(matches!(outcome, Outcome::HighlightRemoved(_)));
    assert!(c.marks().highlights().is_empty());
    assert!(c.layer().highlights().is_empty());
}

#[test]
fn overlap_extends_to_the_new_selection() {
    let mut c = controller();
    c.set_mode(Mode::Highlight).unwrap();
    c.set_active_color("pink").unwrap();
    select(&mut c, "membrane", 0);
    let pink = c.active_color();
    c.set_active_color("blue").unwrap();

    let outcome = select(&mut c, "cell membrane", 0);
    assert!(matches!(outcome, Outcome::HighlightReplaced { ref removed, .. } if removed.len() == 1));
    assert_eq!(c.marks().highlights().len(), 1);
    assert_eq!(wrapper_texts(&c), vec!["cell membrane"]);
    assert_eq!(c.marks().highlights()[0].color, pink);
}

#[test]
fn selection_spanning_two_highlights_merges_them() {
    let mut c = controller();
    c.set_mode(Mode::Highlight).unwrap();
    select(&mut c, "cell", 0);
    select(&mut c, "controls", 0);
    let outcome = select(&mut c, "cell membrane controls", 0);
    let Outcome::HighlightReplaced { removed, .. } = outcome else {
        panic!("unexpected {outcome:?}");
    };
    assert_eq!(removed.len(), 2);
    assert_eq!(wrapper_texts(&c), vec!["cell membrane controls"]);
    assert_eq!(c.marks().highlights().len(), 1);
}

#[test]
fn annotation_is_created_then_edited_in_place() {
    let mut c = controller();
    let outcome = select(&mut c, "osmosis", 0);
    assert_eq!(outcome, Outcome::ComposerOpened { existing: None });
    let Outcome::AnnotationSaved { id, created } =
        c.save_annotation(["exam", "important"], "water across membranes").unwrap()
    else {
        panic!("not saved");
    };
    assert!(created);
    assert!(c.layer().has_indicator(&id));

    let outcome = select(&mut c, "osmosis", 0);
    assert_eq!(
        outcome,
        Outcome::ComposerOpened {
            existing: Some(id.clone())
        }
    );
    let draft = c.draft().unwrap();
    assert!(draft.tags.contains("exam"));
    let tags = draft.tags.clone();
    c.save_annotation(tags, "passive transport").unwrap();

    let notes = c.annotations("cells").unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, id);
    assert_eq!(notes[0].comment, "passive transport");
    assert!(notes[0].tags.contains("important"));
    assert_eq!(c.layer().indicators().len(), 1);
}

#[test]
fn cancel_and_empty_save_store_nothing() {
    let mut c = controller();
    select(&mut c, "Mitosis", 0);
    assert_eq!(c.cancel_annotation().unwrap(), Outcome::AnnotationDiscarded);
    select(&mut c, "Mitosis", 0);
    assert_eq!(
        c.save_annotation(Vec::<String>::new(), "  ").unwrap(),
        Outcome::AnnotationDiscarded
    );
    assert_eq!(*c.state(), State::Idle);
    assert!(c.marks().annotations().is_empty());
    assert_eq!(c.store().writes(), 0);
}

#[test]
fn highlight_mode_suppresses_the_composer() {
    let mut c = controller();
    c.set_mode(Mode::Highlight).unwrap();
    select(&mut c, "osmosis", 0);
    assert!(c.draft().is_none());
    assert!(c.marks().annotations().is_empty());
}

#[test]
fn clicking_an_indicator_opens_the_annotation() {
    let mut c = controller();
    select(&mut c, "Mitosis", 0);
    let Outcome::AnnotationSaved { id, .. } = c.save_annotation(["exam"], "").unwrap() else {
        panic!("not saved");
    };
    let outcome = c.on_indicator_click(&id).unwrap();
    assert_eq!(
        outcome,
        Outcome::ComposerOpened {
            existing: Some(id.clone())
        }
    );
    assert_eq!(c.draft().unwrap().text, "Mitosis");
    c.remove_annotation(&id).unwrap();
    assert_eq!(*c.state(), State::Idle);
    assert!(!c.layer().has_indicator(&id));
}

#[test]
fn removing_unknown_mark_is_an_error() {
    let mut c = controller();
    assert!(matches!(
        c.remove_highlight("nope"),
        Err(MarkError::UnknownMark(id)) if id == "nope"
    ));
    assert!(matches!(
        c.remove_annotation("nope"),
        Err(MarkError::UnknownMark(_))
    ));
}

#[test]
fn blank_selection_is_ignored_everywhere() {
    let mut c = controller();
    let text = c.model().text().to_string();
    let space = text.find(' ').unwrap();
    let outcome = c
        .select_range(TextRange::new(space, space + 1), ScreenAnchor::default())
        .unwrap();
    assert_eq!(outcome, Outcome::Ignored);
    c.set_mode(Mode::Highlight).unwrap();
    let outcome = c
        .select_range(TextRange::new(space, space + 1), ScreenAnchor::default())
        .unwrap();
    assert_eq!(outcome, Outcome::Ignored);
    assert!(c.marks().highlights().is_empty());
}

#[test]
fn remount_restores_the_same_marks() {
    let mut c = controller();
    c.set_mode(Mode::Highlight).unwrap();
    select(&mut c, "moves", 1);
    c.set_mode(Mode::Idle).unwrap();
    select(&mut c, "Mitosis", 0);
    c.save_annotation(["exam"], "").unwrap();

    let before = (c.layer().highlights().to_vec(), c.layer().indicators().to_vec());
    c.mount(&RenderedContent::from_html(LESSON));
    let after = (c.layer().highlights().to_vec(), c.layer().indicators().to_vec());
    assert_eq!(before, after);
    let report = c.restore();
    assert!(!report.changed());
}

#[test]
fn marks_survive_reopening_the_lesson() {
    let mut c = controller();
    c.set_mode(Mode::Highlight).unwrap();
    select(&mut c, "moves", 1);
    let key = c.key().clone();

    let store = c.store().clone();
    let mut fresh = SelectionController::new(store, key.clone(), Settings::default());
    fresh.open_lesson(key).unwrap();
    fresh.mount(&RenderedContent::from_html(LESSON));
    let wrapper = &fresh.layer().highlights()[0];
    assert_eq!(wrapper.text, "moves");
    assert_eq!(
        Some(wrapper.range),
        crate::locate::locate(fresh.model(), "moves", 1).ok()
    );
}

#[test]
fn write_failure_keeps_in_memory_state() {
    let mut c = controller();
    c.store_mut().set_quota(Some(10));
    c.set_mode(Mode::Highlight).unwrap();
    let sel = Selection::find(c.model(), "Mitosis", 0).unwrap();
    let err = c.on_selection_event(sel).unwrap_err();
    assert!(matches!(
        err,
        MarkError::Persistence(StoreError::QuotaExceeded { .. })
    ));
    assert_eq!(c.marks().highlights().len(), 1);
    assert_eq!(c.layer().highlights().len(), 1);
    let key = c.key().collection(MarkKind::Highlights);
    assert!(c.store().get(&key).is_none());
}

#[test]
fn other_lessons_are_read_from_the_store() {
    let mut c = controller();
    c.set_mode(Mode::Highlight).unwrap();
    select(&mut c, "Mitosis", 0);
    let sibling = c.key().sibling("genetics");
    c.open_lesson(sibling).unwrap();
    assert_eq!(*c.state(), State::HighlightMode);
    assert!(c.highlights("genetics").unwrap().is_empty());
    assert_eq!(c.highlights("cells").unwrap().len(), 1);
}

#[test]
fn unknown_color_is_rejected() {
    let mut c = controller();
    let before = c.active_color();
    assert!(matches!(
        c.set_active_color("chartreuse-ish"),
        Err(MarkError::Color(_))
    ));
    assert_eq!(c.active_color(), before);
}
