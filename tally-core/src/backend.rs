use crate::error::{Result, TallyError};

/// Single-document ceiling for stores that do not advertise one.
pub const DEFAULT_MAX_VALUE_SIZE: usize = 1_000_000;

/// Size-constrained key-value document store. Keys are `/`-separated
/// segments of `[A-Za-z0-9._-]`; a single stored value must not exceed
/// `max_value_size()`. Implementations may be accessed concurrently by
/// independent operations and give no cross-call ordering or isolation
/// guarantees.
pub trait Backend: Send + Sync {
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// All keys starting with `prefix`, ascending lexicographic order.
    fn list_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Connectivity probe.
    fn ping(&self) -> Result<()>;

    fn max_value_size(&self) -> usize {
        DEFAULT_MAX_VALUE_SIZE
    }
}

pub(crate) fn check_key(key: &str) -> Result<()> {
    let ok = !key.is_empty()
        && key.split('/').all(|seg| {
            !seg.is_empty()
                && seg != "."
                && seg != ".."
                && seg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        });
    if ok {
        Ok(())
    } else {
        Err(TallyError::Store(format!("invalid backend key: {key:?}")))
    }
}

pub(crate) fn check_value_size(key: &str, len: usize, max: usize) -> Result<()> {
    if len > max {
        return Err(TallyError::Store(format!(
            "value for '{key}' is {len} bytes, store limit is {max}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_validation() {
        assert!(check_key("master_catalog/00000001").is_ok());
        assert!(check_key("movements/6898a1-ff00").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("a//b").is_err());
        assert!(check_key("../escape").is_err());
        assert!(check_key("a/./b").is_err());
        assert!(check_key("with space").is_err());
        assert!(check_key("with\\backslash").is_err());
    }

    #[test]
    fn value_size_gate() {
        assert!(check_value_size("k", 10, 10).is_ok());
        assert!(check_value_size("k", 11, 10).is_err());
    }
}
