use std::sync::Arc;

use crate::backend::Backend;
use crate::domain::MovementEvent;
use crate::error::{Result, TallyError};

pub const MOVEMENTS_PREFIX: &str = "movements";

/// Append-only collection of movement documents under `movements/{id}`.
/// Each append is independent and immediately visible; there is no
/// ordering guarantee relative to concurrent appends from other callers.
pub struct MovementLedger {
    backend: Arc<dyn Backend>,
}

impl MovementLedger {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Append one immutable record; returns its generated id.
    pub fn record(&self, event: &MovementEvent) -> Result<String> {
        let id = new_movement_id()?;
        let mut doc = Vec::with_capacity(256);
        serde_cbor::to_writer(&mut doc, event)
            .map_err(|e| TallyError::Format(format!("movement encode: {e}")))?;
        self.backend.put(&format!("{MOVEMENTS_PREFIX}/{id}"), &doc)?;
        tracing::debug!(%id, kind = ?event.kind, "movement recorded");
        Ok(id)
    }

    /// Lazy, finite, restartable pass over every recorded movement. Keys
    /// are listed eagerly so one pass sees a stable id set even while
    /// collaborators append; documents are fetched and decoded lazily.
    pub fn all(&self) -> Result<impl Iterator<Item = Result<MovementEvent>> + '_> {
        let keys = self.backend.list_prefix(&format!("{MOVEMENTS_PREFIX}/"))?;
        Ok(keys.into_iter().map(move |k| {
            let doc = self
                .backend
                .get(&k)?
                .ok_or_else(|| TallyError::Store(format!("movement document vanished: {k}")))?;
            serde_cbor::from_slice(&doc)
                .map_err(|e| TallyError::Format(format!("movement decode: {e}")))
        }))
    }
}

/// `{unix-timestamp-hex}-{random-hex}`: sortable by rough arrival time,
/// random suffix because two identical movements in the same second are
/// distinct appends and must not collide.
fn new_movement_id() -> Result<String> {
    let ts = time::OffsetDateTime::now_utc().unix_timestamp();
    let mut rnd = [0u8; 8];
    getrandom::getrandom(&mut rnd).map_err(|e| TallyError::Store(format!("rng: {e}")))?;
    Ok(format!("{ts:012x}-{}", hex::encode(rnd)))
}
