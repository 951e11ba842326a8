use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::chunk::{self, Chunk};
use crate::error::{Result, TallyError};

/// Observed production ceiling for one chunk payload.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 800_000;

#[derive(Clone, Copy, Debug)]
pub struct SnapshotOptions {
    pub max_chunk_size: usize,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

/// Outcome figures for one `replace` pass.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub chunks_deleted: u64,
    pub chunks_written: u64,
    pub bytes_written: u64,
}

/// Persistence lifecycle of one named table snapshot: chunk documents live
/// under `{key}/{seq:08}` so a prefix listing returns them in order.
pub struct SnapshotStore {
    backend: Arc<dyn Backend>,
    opts: SnapshotOptions,
}

impl SnapshotStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_options(backend, SnapshotOptions::default())
    }

    pub fn with_options(backend: Arc<dyn Backend>, opts: SnapshotOptions) -> Self {
        Self { backend, opts }
    }

    fn chunk_key(key: &str, seq: u64) -> String {
        format!("{key}/{seq:08}")
    }

    /// Replace the whole snapshot: delete every existing chunk under the
    /// key, split the new table, write each chunk in ascending seq order.
    ///
    /// NOT atomic. There is no transactional boundary between the delete
    /// pass and the last write; a crash in between leaves a partial
    /// snapshot, and a concurrent `read` may observe zero, some, or all of
    /// either generation. Callers that need isolation must layer it on.
    pub fn replace(&self, key: &str, table: &[u8]) -> Result<SyncReport> {
        let old = self.backend.list_prefix(&format!("{key}/"))?;
        for k in &old {
            self.backend.delete(k)?;
        }

        let chunks = chunk::split(table, self.opts.max_chunk_size)?;
        let docs: Vec<(String, Vec<u8>)> = chunks
            .into_par_iter()
            .map(|c| (Self::chunk_key(key, c.seq), c.encode()))
            .collect();

        let mut bytes_written = 0u64;
        for (k, doc) in &docs {
            self.backend.put(k, doc)?;
            bytes_written += doc.len() as u64;
        }

        let report = SyncReport {
            chunks_deleted: old.len() as u64,
            chunks_written: docs.len() as u64,
            bytes_written,
        };
        tracing::info!(
            key,
            chunks_deleted = report.chunks_deleted,
            chunks_written = report.chunks_written,
            bytes_written = report.bytes_written,
            "snapshot replaced"
        );
        Ok(report)
    }

    /// Fetch every chunk under the key, verify and reassemble. Zero chunks
    /// is `EmptySnapshot`, the legitimate "nothing loaded yet" state,
    /// distinct from any backend fault.
    pub fn read(&self, key: &str) -> Result<Vec<u8>> {
        let keys = self.backend.list_prefix(&format!("{key}/"))?;
        if keys.is_empty() {
            return Err(TallyError::EmptySnapshot(key.to_string()));
        }
        let mut chunks = Vec::with_capacity(keys.len());
        for k in &keys {
            let doc = self
                .backend
                .get(k)?
                .ok_or_else(|| TallyError::Store(format!("chunk document vanished: {k}")))?;
            chunks.push(Chunk::decode(&doc)?);
        }
        tracing::debug!(key, chunks = chunks.len(), "snapshot read");
        chunk::reassemble(chunks)
    }

    /// Delete all chunks under the key; returns how many were removed.
    pub fn clear(&self, key: &str) -> Result<u64> {
        let keys = self.backend.list_prefix(&format!("{key}/"))?;
        for k in &keys {
            self.backend.delete(k)?;
        }
        tracing::info!(key, chunks_deleted = keys.len(), "snapshot cleared");
        Ok(keys.len() as u64)
    }
}
