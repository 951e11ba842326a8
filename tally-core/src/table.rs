use crate::domain::CatalogRow;
use crate::error::{Result, TallyError};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Meta {
    pub created: i64,
    pub tool: String,
}

/// The catalog table document. Serialized wholesale on every sync; never
/// partially mutated.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<CatalogRow>,
    pub meta: Meta,
}

impl Table {
    pub fn new(rows: Vec<CatalogRow>) -> Self {
        Self {
            rows,
            meta: Meta {
                created: OffsetDateTime::now_utc().unix_timestamp(),
                tool: format!("tally-core {}", env!("CARGO_PKG_VERSION")),
            },
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(64 * 1024);
        ciborium::ser::into_writer(self, &mut buf)
            .map_err(|e| TallyError::Format(format!("table encode: {e}")))?;
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::de::from_reader(bytes).map_err(|e| TallyError::Format(format!("table decode: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(item: &str, site: &str) -> CatalogRow {
        CatalogRow {
            item_code: item.into(),
            site_code: site.into(),
            cost_element_code: "PEP-1".into(),
            lot_code: "L1".into(),
            grade: "A36".into(),
            thickness: "12.7".into(),
            width: "1500".into(),
            length: "6000".into(),
            unit_weight: "1730,25".into(),
            description: "plate".into(),
            ..Default::default()
        }
    }

    #[test]
    fn round_trip() {
        let table = Table::new(vec![row("MAT-1", "SITE-A"), row("MAT-2", "SITE-B")]);
        let bytes = table.to_bytes().unwrap();
        let back = Table::from_bytes(&bytes).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Table::from_bytes(b"not cbor at all"),
            Err(TallyError::Format(_))
        ));
    }

    #[test]
    fn empty_table_still_encodes() {
        let table = Table::new(Vec::new());
        let bytes = table.to_bytes().unwrap();
        assert!(!bytes.is_empty());
        assert!(Table::from_bytes(&bytes).unwrap().rows.is_empty());
    }
}
