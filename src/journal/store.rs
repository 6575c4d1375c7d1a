//! Durable journal store
//!
//! The journal history is one JSON array on disk, rewritten in full each
//! time an entry is added and read once at startup.
//!
//! The store has exactly one writer. Opening it takes an exclusive OS
//! advisory lock on `<history>.lock`; a second opener gets
//! [`PersistenceError::Locked`]. The lock is released when the store is
//! dropped or the process dies, so a leftover lock file from a killed
//! server does not block the next start. Rewrites go through a temporary
//! sibling file and a rename, so a crash mid-write leaves the previous
//! history in place.

use crate::journal::error::{PersistenceError, PersistenceResult};
use crate::journal::types::JournalEntry;
use std::ffi::OsString;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Single-writer JSON history file
#[derive(Debug)]
pub struct JournalStore {
    path: PathBuf,
    _lock: StoreLock,
}

impl JournalStore {
    /// Open the store at `path`, taking the writer lock.
    ///
    /// The history file itself need not exist yet.
    pub fn open(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let lock = StoreLock::acquire(sibling(&path, ".lock"))?;
        tracing::debug!(path = %path.display(), "Opened journal store");

        Ok(Self { path, _lock: lock })
    }

    /// Location of the history file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole history. A missing file is an empty history.
    pub fn load(&self) -> PersistenceResult<Vec<JournalEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No journal history yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<JournalEntry> = serde_json::from_str(&content)?;
        tracing::info!(entries = entries.len(), "Loaded journal history");
        Ok(entries)
    }

    /// Replace the history on disk with `entries`
    pub fn write_all(&self, entries: &[JournalEntry]) -> PersistenceResult<()> {
        let data = serde_json::to_vec_pretty(entries)?;
        let tmp_path = sibling(&self.path, ".tmp");

        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&data)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(entries = entries.len(), bytes = data.len(), "Rewrote journal history");
        Ok(())
    }
}

/// `path` with `suffix` appended to its file name
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Advisory lock held on the `.lock` sibling for the store's lifetime.
///
/// The file itself is left in place; only the kernel lock matters.
#[derive(Debug)]
struct StoreLock {
    path: PathBuf,
    file: File,
}

impl StoreLock {
    fn acquire(path: PathBuf) -> PersistenceResult<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
                || e.kind() == ErrorKind::WouldBlock
            {
                return Err(PersistenceError::Locked(path));
            }
            return Err(e.into());
        }

        let previous = fs::read_to_string(&path).unwrap_or_default();
        if !previous.trim().is_empty() {
            tracing::info!(
                path = %path.display(),
                previous_pid = %previous.trim(),
                "Reclaimed journal lock left by an earlier process"
            );
        }

        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        file.sync_all()?;

        Ok(Self { path, file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.set_len(0);
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release journal lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::types::Mood;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn entry(journal: &str) -> JournalEntry {
        JournalEntry {
            week_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            week_end: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            mood: Mood::Happy,
            journal: journal.to_string(),
            reflection: "Nice week.".to_string(),
            style_modifier: false,
        }
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = tempdir().unwrap();
        let store = JournalStore::open(dir.path().join("journal_history.json")).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempdir().unwrap();
        let store = JournalStore::open(dir.path().join("journal_history.json")).unwrap();

        let entries = vec![entry("one"), entry("two")];
        store.write_all(&entries).unwrap();

        assert_eq!(store.load().unwrap(), entries);
        assert!(!sibling(store.path(), ".tmp").exists());
    }

    #[test]
    fn test_history_is_a_json_array() {
        let dir = tempdir().unwrap();
        let store = JournalStore::open(dir.path().join("journal_history.json")).unwrap();
        store.write_all(&[entry("one")]).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["journal"], "one");
    }

    #[test]
    fn test_second_writer_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal_history.json");

        let first = JournalStore::open(&path).unwrap();
        let second = JournalStore::open(&path);
        assert!(matches!(second, Err(PersistenceError::Locked(_))));

        drop(first);
        assert!(JournalStore::open(&path).is_ok());
    }

    #[test]
    fn test_lock_left_by_dead_process_is_reclaimed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal_history.json");

        {
            let store = JournalStore::open(&path).unwrap();
            store.write_all(&[entry("before crash")]).unwrap();
        }
        // A killed process leaves its lock file behind with no holder
        fs::write(sibling(&path, ".lock"), "999999\n").unwrap();

        let store = JournalStore::open(&path).unwrap();
        assert_eq!(store.load().unwrap()[0].journal, "before crash");

        let pid = fs::read_to_string(sibling(&path, ".lock")).unwrap();
        assert_eq!(pid.trim(), std::process::id().to_string());
    }

    #[test]
    fn test_reopen_after_drop_many_times() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal_history.json");

        for _ in 0..3 {
            let store = JournalStore::open(&path).unwrap();
            assert!(matches!(
                JournalStore::open(&path),
                Err(PersistenceError::Locked(_))
            ));
            drop(store);
        }
    }

    #[test]
    fn test_corrupt_history_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal_history.json");
        fs::write(&path, "{not json").unwrap();

        let store = JournalStore::open(&path).unwrap();
        assert!(matches!(store.load(), Err(PersistenceError::Serialization(_))));
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("journal_history.json");

        let store = JournalStore::open(&path).unwrap();
        store.write_all(&[entry("one")]).unwrap();
        assert!(path.exists());
    }
}
