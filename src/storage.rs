//! Persistence backend for the vault record.
//!
//! Stands in for the browser's persistent key-value storage: a single file,
//! loaded whole and replaced whole. Writes are crash-safe — after a failure
//! mid-save either the old record or the new one is on disk, never a torn
//! mix, which is what the all-or-nothing requirement on credential updates
//! rests on.

use anyhow::{Context, Result};
use getrandom::fill;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns `true` if a vault record exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the entire record into memory.
    pub fn load(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }

    /// Replaces the record atomically.
    ///
    /// Writes to a randomly named temp file in the same directory, fsyncs it,
    /// renames it over the target, then fsyncs the directory so the rename
    /// itself is durable. Creates parent directories as needed.
    pub fn save(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.random_tmp_path()?;

        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .context("failed to create temporary file")?;

        tmp_file.write_all(data)?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        if let Err(e) = self.atomic_replace(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        if let Some(parent) = self.path.parent() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }

        Ok(())
    }

    /// Deletes the record. Succeeds if it was already absent.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("failed to remove vault file"),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Unique temp path next to the target: `name.tmp.<randomhex>`.
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let mut buf = [0u8; 8];
        fill(&mut buf)?;

        let rand_string = hex::encode(buf);
        let file_name = self.path.file_name().unwrap().to_string_lossy();

        Ok(self
            .path
            .with_file_name(format!("{file_name}.tmp.{rand_string}")))
    }

    /// Atomic replace via `ReplaceFileW` with write-through so the swap is
    /// both atomic and persisted.
    #[cfg(target_os = "windows")]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;
        use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

        fn to_wide(s: &OsStr) -> Vec<u16> {
            s.encode_wide().chain(std::iter::once(0)).collect()
        }

        // ReplaceFileW fails if the target does not exist yet
        if !self.path.exists() {
            fs::rename(tmp_path, &self.path)?;
            return Ok(());
        }

        let target_w = to_wide(self.path.as_os_str());
        let tmp_w = to_wide(tmp_path.as_os_str());

        // SAFETY:
        // - Strings are valid UTF-16 and null-terminated
        // - Pointers remain valid during the call
        // - Windows does not retain the pointers after return
        let result = unsafe {
            ReplaceFileW(
                target_w.as_ptr(),
                tmp_w.as_ptr(),
                std::ptr::null(),
                REPLACEFILE_WRITE_THROUGH,
                std::ptr::null(),
                std::ptr::null(),
            )
        };

        if result == 0 {
            let err = std::io::Error::last_os_error();
            return Err(err).context("atomic replace failed");
        }

        Ok(())
    }

    /// On Unix, `rename()` is atomic when both paths share a filesystem.
    #[cfg(not(target_os = "windows"))]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_returns_written_data() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("vault.json"));

        storage.save(b"hello world").unwrap();
        assert_eq!(storage.load().unwrap(), b"hello world");
    }

    #[test]
    fn load_fails_if_file_does_not_exist() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("missing.json"));

        assert!(storage.load().is_err());
    }

    #[test]
    fn exists_tracks_save_and_remove() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("vault.json"));

        assert!(!storage.exists());
        storage.save(b"data").unwrap();
        assert!(storage.exists());
        storage.remove().unwrap();
        assert!(!storage.exists());
    }

    #[test]
    fn remove_of_missing_file_succeeds() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("vault.json"));

        storage.remove().unwrap();
    }

    #[test]
    fn save_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let storage = Storage::new(path.clone());

        storage.save(b"first").unwrap();
        storage.save(b"second").unwrap();

        assert_eq!(fs::read(path).unwrap(), b"second");
    }

    #[test]
    fn tmp_file_is_removed_after_success() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("vault.json"));
        storage.save(b"data").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "vault.json");
    }

    #[test]
    fn tmp_names_are_unique_and_in_same_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let storage = Storage::new(path.clone());

        let a = storage.random_tmp_path().unwrap();
        let b = storage.random_tmp_path().unwrap();

        assert_ne!(a, b);
        assert_eq!(a.parent(), path.parent());
        assert_ne!(a, path);
    }

    #[test]
    fn parent_directory_is_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("vault.json");

        let storage = Storage::new(nested.clone());
        storage.save(b"data").unwrap();

        assert!(nested.exists());
    }
}
