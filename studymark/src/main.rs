mod logging;

use std::{env, path::Path, process::ExitCode};

use lesson_core::{
    config::{self, Settings},
    store::JsonFileStore,
    LessonKey, RenderedContent, SelectionController,
};
use tracing::{error, info};
use ui::app::{App, Lesson};

const USAGE: &str = "usage: studymark <lesson file>...\n\
    Lessons are HTML, Markdown or plain text files. The parent directory \
    names the subject, the file stem names the lesson.";

fn main() -> ExitCode {
    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() || paths.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!("{USAGE}");
        return if paths.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    let settings = match Settings::load_default() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Warning: ignoring config ({e}); using defaults");
            Settings::default()
        }
    };
    let log_root = settings.data_dir.clone().or_else(config::data_root);
    let _log_guard = logging::init(log_root.as_deref());

    let mut lessons = Vec::new();
    for path in &paths {
        let path = Path::new(path);
        match RenderedContent::open(path) {
            Ok(content) => lessons.push(Lesson::new(lesson_key(path), content)),
            Err(e) => {
                error!(path = %path.display(), "failed to open lesson: {e}");
                eprintln!("Failed to open {}: {}", path.display(), e);
            }
        }
    }
    let Some(first) = lessons.first() else {
        eprintln!("No lesson could be opened.");
        return ExitCode::FAILURE;
    };

    let store = match settings.marks_dir() {
        Some(dir) => JsonFileStore::new(dir),
        None => match JsonFileStore::open_default() {
            Ok(store) => store,
            Err(e) => {
                eprintln!("Failed to locate a data directory for marks: {e}");
                return ExitCode::FAILURE;
            }
        },
    };
    info!(root = %store.root().display(), lessons = lessons.len(), "starting");

    let controller = SelectionController::new(store, first.key.clone(), settings);
    match App::new(controller, lessons).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("terminal error: {e}");
            eprintln!("Terminal error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `biology/cells.html` is lesson `cells` of subject `biology`.
fn lesson_key(path: &Path) -> LessonKey {
    let lesson_id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "lesson".to_string());
    let subject_id = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "default".to_string());
    LessonKey::new(subject_id, lesson_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_key_from_path() {
        let key = lesson_key(Path::new("notes/biology/cells.html"));
        assert_eq!(key.subject_id, "biology");
        assert_eq!(key.lesson_id, "cells");
    }

    #[test]
    fn bare_file_gets_default_subject() {
        let key = lesson_key(Path::new("cells.md"));
        assert_eq!(key.subject_id, "default");
        assert_eq!(key.lesson_id, "cells");
    }
}
