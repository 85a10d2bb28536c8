use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tracing::warn;

use crate::config;
use crate::types::CollectionKey;

use super::{MarkStore, StoreError};

/// One JSON file per collection: `<root>/<subject>/<lesson>/<kind>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted in the platform data directory.
    pub fn open_default() -> Result<Self, StoreError> {
        config::data_root()
            .map(|dir| Self::new(dir.join("marks")))
            .ok_or(StoreError::NoDataDir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &CollectionKey) -> PathBuf {
        self.root
            .join(path_component(&key.subject_id))
            .join(path_component(&key.lesson_id))
            .join(format!("{}.json", key.kind.as_str()))
    }
}

/// Percent-encodes an id into one directory name. Distinct ids always give
/// distinct names; `.`, `..` and the empty id get names `encode` never emits.
fn path_component(id: &str) -> String {
    match id {
        "" => "%".to_string(),
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => urlencoding::encode(id).into_owned(),
    }
}

impl MarkStore for JsonFileStore {
    fn read(&self, key: &CollectionKey) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &CollectionKey, payload: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        // write beside the target, then rename, so a failed write keeps the old file
        let tmp = path.with_extension("json.tmp");
        let mut f = fs::File::create(&tmp)?;
        f.write_all(payload.as_bytes())?;
        f.sync_all()?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Writes `<kind>.json.corrupt`, or `<kind>.json.corrupt.N` when earlier
    /// copies exist.
    fn set_aside(&mut self, key: &CollectionKey, payload: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let base = path.with_extension("json.corrupt");
        for n in 0.. {
            let candidate = match n {
                0 => base.clone(),
                n => base.with_extension(format!("corrupt.{n}")),
            };
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(mut f) => {
                    f.write_all(payload.as_bytes())?;
                    f.sync_all()?;
                    warn!(path = %candidate.display(), "set aside unreadable mark collection");
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
