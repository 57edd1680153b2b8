//! JSON-file durable store with advisory file locking.
//!
//! The whole store is one JSON object (`key -> value`) on disk. Each `put`
//! is a locked read-modify-write of that file, so a single write is never
//! torn, but two writers doing their own read-merge-write cycles above this
//! layer still race with last-write-wins.

use std::{
    collections::BTreeMap,
    fs::{self, File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use {fd_lock::RwLock, tracing::debug};

use crate::{
    error::{Context, Error, Result},
    traits::KeyValueStore,
};

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

type Entries = BTreeMap<String, String>;

fn parse(raw: &str) -> Result<Entries> {
    if raw.trim().is_empty() {
        return Ok(Entries::new());
    }
    Ok(serde_json::from_str(raw)?)
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }
        let file = File::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let lock = RwLock::new(file);
        let guard = lock
            .read()
            .map_err(|e| Error::lock_failed(e.to_string()))?;
        let mut raw = String::new();
        (&*guard).read_to_string(&mut raw)?;
        parse(&raw)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let mut lock = RwLock::new(file);
        let mut guard = lock
            .write()
            .map_err(|e| Error::lock_failed(e.to_string()))?;

        let mut raw = String::new();
        guard.read_to_string(&mut raw)?;
        let mut entries = parse(&raw)?;
        entries.insert(key.to_string(), value.to_string());

        let out = serde_json::to_string(&entries)?;
        guard.set_len(0)?;
        guard.seek(SeekFrom::Start(0))?;
        guard.write_all(out.as_bytes())?;
        guard.flush()?;

        debug!(path = %self.path.display(), key, "file store updated");
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.read_all()?.len())
    }

    /// Usable when the path is a regular file, or does not exist yet and its
    /// nearest existing ancestor is a directory.
    fn probe(&self) -> bool {
        if self.path.exists() {
            return self.path.is_file();
        }
        self.path
            .ancestors()
            .skip(1)
            .find(|p| p.exists())
            .is_none_or(Path::is_dir)
    }
}
