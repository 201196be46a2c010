use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use dashmap::DashMap;

/// String key-value storage. A `set` replaces the whole value in one step;
/// readers never observe a partially written value.
pub trait KvBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Process-local backend. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryBackend {
    entries: DashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key under `dir`.
///
/// Writes go to `<key>.json.tmp`, are fsynced, then renamed over
/// `<key>.json`, so a crash leaves either the old or the new value.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open a backend rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map a key to its file, keeping only characters that are safe in a
    /// file name so a key cannot escape `dir`.
    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        let safe_name: String = key
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        if safe_name.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty storage key"));
        }
        Ok(self.dir.join(format!("{safe_name}.json")))
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path_for(key)?;
        let tmp_path = path.with_extension("json.tmp");
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(value.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(&tmp_path, &path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("playslot_test_backend").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn memory_get_set() {
        let kv = MemoryBackend::new();
        assert_eq!(kv.get("k").unwrap(), None);
        kv.set("k", "one").unwrap();
        kv.set("k", "two").unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn file_missing_key_is_none() {
        let kv = FileBackend::open(tmp_dir("missing")).unwrap();
        assert_eq!(kv.get("playslot_bookings").unwrap(), None);
    }

    #[test]
    fn file_set_replaces_and_survives_reopen() {
        let dir = tmp_dir("reopen");
        {
            let kv = FileBackend::open(&dir).unwrap();
            kv.set("playslot_bookings", "[1]").unwrap();
            kv.set("playslot_bookings", "[1,2]").unwrap();
        }
        let kv = FileBackend::open(&dir).unwrap();
        assert_eq!(kv.get("playslot_bookings").unwrap().as_deref(), Some("[1,2]"));
        assert!(!dir.join("playslot_bookings.json.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_key_cannot_escape_dir() {
        let dir = tmp_dir("escape");
        let kv = FileBackend::open(&dir).unwrap();
        kv.set("../../etc/evil", "x").unwrap();
        assert!(dir.join("etcevil.json").exists());
        assert!(kv.set("../..", "x").is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
