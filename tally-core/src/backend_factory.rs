use std::path::Path;
use std::sync::Arc;

use crate::backend::Backend;
use crate::backend_fs::FsBackend;
use crate::backend_mem::MemBackend;
use crate::error::Result;

pub enum Kind {
    Mem,
    Fs,
}

pub fn open_backend(kind: Kind, root: &Path) -> Result<Arc<dyn Backend>> {
    match kind {
        Kind::Mem => Ok(Arc::new(MemBackend::new())),
        Kind::Fs => Ok(Arc::new(FsBackend::open(root)?)),
    }
}
