use crate::utils::{CatalogError, Result};
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// `shufersal_id → product ObjectId hex`, as last read from the database.
pub(crate) const PRODUCT_IDS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("product_ids");

pub struct MappingStore {
    db: Arc<Database>,
}

impl MappingStore {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db
            .begin_write()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        {
            let _ = write_txn
                .open_table(PRODUCT_IDS_TABLE)
                .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        Ok(Self { db })
    }

    pub fn save_many(&self, mapping: &HashMap<String, String>) -> Result<usize> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(PRODUCT_IDS_TABLE)
                .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
            for (shufersal_id, object_id) in mapping {
                table
                    .insert(shufersal_id.as_str(), object_id.as_str())
                    .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        tracing::debug!(entries = mapping.len(), "Product id mapping saved");
        Ok(mapping.len())
    }

    pub fn get(&self, shufersal_id: &str) -> Result<Option<String>> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        let table = read_txn
            .open_table(PRODUCT_IDS_TABLE)
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        match table.get(shufersal_id) {
            Ok(Some(value)) => Ok(Some(value.value().to_string())),
            Ok(None) => Ok(None),
            Err(e) => Err(CatalogError::DatabaseError(e.to_string())),
        }
    }

    pub fn load_all(&self) -> Result<HashMap<String, String>> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        let table = read_txn
            .open_table(PRODUCT_IDS_TABLE)
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        let mut mapping = HashMap::new();
        let iter = table
            .iter()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        for result in iter {
            let (key, value) = result.map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
            mapping.insert(key.value().to_string(), value.value().to_string());
        }
        Ok(mapping)
    }

    pub fn len(&self) -> Result<u64> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        let table = read_txn
            .open_table(PRODUCT_IDS_TABLE)
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        table
            .len()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))
    }

    pub fn clear(&self) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        {
            write_txn
                .delete_table(PRODUCT_IDS_TABLE)
                .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
            let _ = write_txn
                .open_table(PRODUCT_IDS_TABLE)
                .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::open_state;

    #[test]
    fn saves_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::new(open_state(&dir.path().join("state.redb")).unwrap()).unwrap();

        let mapping: HashMap<String, String> = [
            ("P_1".to_string(), "68bf0a207596a1f78d625214".to_string()),
            ("P_2".to_string(), "68bf0a207596a1f78d625215".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(store.save_many(&mapping).unwrap(), 2);
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(
            store.get("P_2").unwrap().as_deref(),
            Some("68bf0a207596a1f78d625215")
        );
        assert_eq!(store.get("P_9").unwrap(), None);
        assert_eq!(store.load_all().unwrap(), mapping);

        store.clear().unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }
}
