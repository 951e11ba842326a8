use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::backend::{Backend, DEFAULT_MAX_VALUE_SIZE, check_key, check_value_size};
use crate::error::{Result, TallyError};

/// One file per document under a root directory; `/`-separated key
/// segments map to subdirectories.
pub struct FsBackend {
    root: PathBuf,
    max_value_size: usize,
}

impl FsBackend {
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.root.join(key))
    }
}

impl Backend for FsBackend {
    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        check_value_size(key, value.len(), self.max_value_size)?;
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, value)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(|e| TallyError::Store(format!("store walk: {e}")))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| TallyError::Store(format!("store walk: {e}")))?;
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn ping(&self) -> Result<()> {
        let md = fs::metadata(&self.root)?;
        if !md.is_dir() {
            return Err(TallyError::Store(format!(
                "store root {} is not a directory",
                self.root.display()
            )));
        }
        Ok(())
    }

    fn max_value_size(&self) -> usize {
        self.max_value_size
    }
}
