use std::fs;

use lesson_core::{
    color::{contrast, Palette, RgbColor},
    config::Settings,
    controller::{Mode, Outcome, Selection, SelectionController},
    store::{JsonFileStore, MarkStore},
    types::{Highlight, LessonKey, MarkKind},
    RenderedContent,
};

const CHAPTER: &str = "<h1>Cell division</h1>\
    <p>During <b>mitosis</b> a cell splits in two.</p>\
    <p>Unlike mitosis, meiosis halves the chromosome count.</p>";

fn key() -> LessonKey {
    LessonKey::new("biology", "division")
}

fn open(store: JsonFileStore) -> SelectionController<JsonFileStore> {
    let mut c = SelectionController::new(store, key(), Settings::default());
    c.open_lesson(key()).unwrap();
    c.mount(&RenderedContent::from_html(CHAPTER));
    c
}

#[test]
fn persisted_highlight_is_restored_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let color = RgbColor::parse("#90caf9").unwrap();
    let mut store = JsonFileStore::new(dir.path());
    let payload = serde_json::to_string(&vec![Highlight::new("division", "mitosis", color, 0)])
        .unwrap();
    store
        .write(&key().collection(MarkKind::Highlights), &payload)
        .unwrap();

    let c = open(JsonFileStore::new(dir.path()));
    let wrappers = c.layer().highlights();
    assert_eq!(wrappers.len(), 1);
    assert_eq!(wrappers[0].text, "mitosis");
    assert_eq!(wrappers[0].background, color);
    assert_eq!(wrappers[0].foreground, contrast(color));
}

#[test]
fn duplicate_words_keep_their_own_occurrence_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = open(JsonFileStore::new(dir.path()));
    c.set_mode(Mode::Highlight).unwrap();
    for nth in [1, 0] {
        let sel = Selection::find(c.model(), "mitosis", nth).unwrap();
        assert!(matches!(
            c.on_selection_event(sel).unwrap(),
            Outcome::HighlightCreated(_)
        ));
    }
    let created: Vec<_> = c.layer().highlights().iter().map(|w| w.range).collect();

    let again = open(JsonFileStore::new(dir.path()));
    let restored: Vec<_> = again.layer().highlights().iter().map(|w| w.range).collect();
    assert_eq!(created, restored);
    assert_ne!(restored[0], restored[1]);
}

#[test]
fn orphaned_records_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = open(JsonFileStore::new(dir.path()));
    c.set_mode(Mode::Highlight).unwrap();
    let sel = Selection::find(c.model(), "meiosis", 0).unwrap();
    c.on_selection_event(sel).unwrap();

    let report = c.mount(&RenderedContent::from_html("<p>Only mitosis today.</p>"));
    assert_eq!(report.orphaned.len(), 1);
    assert!(c.layer().highlights().is_empty());
    assert_eq!(c.highlights("division").unwrap().len(), 1);

    let path = JsonFileStore::new(dir.path()).path_for(&key().collection(MarkKind::Highlights));
    let on_disk = fs::read_to_string(path).unwrap();
    assert!(on_disk.contains("\"meiosis\""));
}

#[test]
fn corrupt_collection_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let path = store.path_for(&key().collection(MarkKind::Annotations));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "[{\"id\":").unwrap();

    let c = open(store);
    assert!(c.annotations("division").unwrap().is_empty());
    assert!(c.layer().indicators().is_empty());
}

#[test]
fn one_bad_record_does_not_wipe_the_collection() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path());
    let good = serde_json::to_value(Highlight::new(
        "division",
        "mitosis",
        RgbColor::parse("#90caf9").unwrap(),
        0,
    ))
    .unwrap();
    let mut named = good.clone();
    named["id"] = "named".into();
    named["text"] = "cell".into();
    named["color"] = "red".into();
    let mut broken = good.clone();
    broken["id"] = "broken".into();
    broken["color"] = "not-a-color".into();
    let payload = serde_json::to_string(&vec![good, named, broken]).unwrap();
    let hkey = key().collection(MarkKind::Highlights);
    store.write(&hkey, &payload).unwrap();

    let mut c = open(JsonFileStore::new(dir.path()));
    let mut texts: Vec<_> = c.layer().highlights().iter().map(|w| w.text.as_str()).collect();
    texts.sort();
    assert_eq!(texts, ["cell", "mitosis"]);
    assert_eq!(c.marks().unreadable_count(), 1);

    c.set_mode(Mode::Highlight).unwrap();
    let sel = Selection::find(c.model(), "meiosis", 0).unwrap();
    c.on_selection_event(sel).unwrap();

    let on_disk = fs::read_to_string(JsonFileStore::new(dir.path()).path_for(&hkey)).unwrap();
    for text in ["\"mitosis\"", "\"cell\"", "\"meiosis\"", "\"broken\"", "not-a-color"] {
        assert!(on_disk.contains(text), "{text} missing from {on_disk}");
    }
}

#[test]
fn unreadable_file_is_set_aside_before_the_first_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let path = store.path_for(&key().collection(MarkKind::Highlights));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "[{\"id\":").unwrap();

    let mut c = open(store);
    c.set_mode(Mode::Highlight).unwrap();
    let sel = Selection::find(c.model(), "meiosis", 0).unwrap();
    c.on_selection_event(sel).unwrap();

    let kept = path.with_file_name("highlights.json.corrupt");
    assert_eq!(fs::read_to_string(kept).unwrap(), "[{\"id\":");
    assert!(fs::read_to_string(&path).unwrap().contains("\"meiosis\""));
}

#[test]
fn contrast_is_stable_for_every_preset() {
    for (name, color) in Palette::default().iter() {
        let fg = contrast(color);
        assert_ne!(fg, color, "{name}");
        assert_eq!(fg, contrast(color), "{name}");
    }
}
