use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::backend::{Backend, DEFAULT_MAX_VALUE_SIZE, check_key, check_value_size};
use crate::error::{Result, TallyError};

/// In-memory document store for tests and ephemeral runs.
pub struct MemBackend {
    map: Mutex<BTreeMap<String, Vec<u8>>>,
    max_value_size: usize,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::with_max_value_size(DEFAULT_MAX_VALUE_SIZE)
    }

    pub fn with_max_value_size(max_value_size: usize) -> Self {
        Self {
            map: Mutex::new(BTreeMap::new()),
            max_value_size,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.map
            .lock()
            .map_err(|_| TallyError::Store("mem backend lock poisoned".into()))
    }
}

impl Default for MemBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemBackend {
    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        check_key(key)?;
        check_value_size(key, value.len(), self.max_value_size)?;
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn list_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let map = self.lock()?;
        Ok(map
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    fn ping(&self) -> Result<()> {
        self.lock().map(|_| ())
    }

    fn max_value_size(&self) -> usize {
        self.max_value_size
    }
}
