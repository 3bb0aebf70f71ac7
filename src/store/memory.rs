use crate::store::{CatalogStore, UpdateOutcome};
use crate::utils::{CatalogError, Result};
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// In-process stand-in for MongoDB used by `--dry-run` and tests.
///
/// Filters are equality matches on (dotted) field paths; updates support
/// `$set` only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    products: Mutex<Vec<Document>>,
    offers: Mutex<Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn products(&self) -> Vec<Document> {
        self.products.lock().await.clone()
    }

    pub async fn offers(&self) -> Vec<Document> {
        self.offers.lock().await.clone()
    }
}

fn with_id(mut doc: Document) -> Document {
    if !doc.contains_key("_id") {
        doc.insert("_id", ObjectId::new());
    }
    doc
}

fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_document()?.get(part)?;
    }
    Some(current)
}

fn filter_matches(doc: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(path, expected)| lookup(doc, path) == Some(expected))
}

/// Sets a dotted path, creating intermediate documents. Returns whether the
/// stored value changed.
fn set_path(doc: &mut Document, path: &str, value: Bson) -> bool {
    match path.split_once('.') {
        None => {
            let changed = doc.get(path) != Some(&value);
            doc.insert(path, value);
            changed
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }
            match doc.get_mut(head) {
                Some(Bson::Document(child)) => set_path(child, rest, value),
                _ => false,
            }
        }
    }
}

impl CatalogStore for MemoryStore {
    async fn clear_products(&self) -> Result<u64> {
        let mut products = self.products.lock().await;
        let deleted = products.len() as u64;
        products.clear();
        Ok(deleted)
    }

    async fn clear_offers(&self) -> Result<u64> {
        let mut offers = self.offers.lock().await;
        let deleted = offers.len() as u64;
        offers.clear();
        Ok(deleted)
    }

    async fn insert_products(&self, docs: Vec<Document>) -> Result<usize> {
        let count = docs.len();
        self.products
            .lock()
            .await
            .extend(docs.into_iter().map(with_id));
        Ok(count)
    }

    async fn insert_offers(&self, docs: Vec<Document>) -> Result<usize> {
        let count = docs.len();
        self.offers.lock().await.extend(docs.into_iter().map(with_id));
        Ok(count)
    }

    async fn update_products(&self, filter: Document, update: Document) -> Result<UpdateOutcome> {
        let set = match update.get("$set") {
            Some(Bson::Document(set)) => set.clone(),
            _ => {
                return Err(CatalogError::DatabaseError(
                    "only $set updates are supported".to_string(),
                ))
            }
        };

        let mut outcome = UpdateOutcome::default();
        let mut products = self.products.lock().await;
        for product in products.iter_mut().filter(|p| filter_matches(p, &filter)) {
            outcome.matched += 1;
            let mut changed = false;
            for (path, value) in &set {
                changed |= set_path(product, path, value.clone());
            }
            if changed {
                outcome.modified += 1;
            }
        }
        Ok(outcome)
    }

    async fn count_products(&self) -> Result<u64> {
        Ok(self.products.lock().await.len() as u64)
    }

    async fn count_offers(&self) -> Result<u64> {
        Ok(self.offers.lock().await.len() as u64)
    }

    async fn product_id_mapping(&self) -> Result<HashMap<String, String>> {
        let products = self.products.lock().await;
        Ok(products
            .iter()
            .filter_map(|p| {
                let id = p.get_object_id("_id").ok()?;
                let shufersal_id = lookup(p, "metadata.shufersal_id")?.as_str()?;
                Some((shufersal_id.to_string(), id.to_hex()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn product(id: &str) -> Document {
        doc! { "name": "חלב", "metadata": { "shufersal_id": id }, "aliases": { "he": ["חלב"] } }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_maps_them() {
        let store = MemoryStore::new();
        store
            .insert_products(vec![product("P_1"), product("P_2"), doc! { "name": "x" }])
            .await
            .unwrap();

        assert_eq!(store.count_products().await.unwrap(), 3);
        let mapping = store.product_id_mapping().await.unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping["P_1"].len(), 24);
    }

    #[tokio::test]
    async fn set_on_dotted_paths_reports_matched_and_modified() {
        let store = MemoryStore::new();
        store.insert_products(vec![product("P_1")]).await.unwrap();

        let filter = doc! { "metadata.shufersal_id": "P_1" };
        let update = doc! { "$set": { "name_en": "Milk", "aliases.en": ["Milk"] } };

        let first = store
            .update_products(filter.clone(), update.clone())
            .await
            .unwrap();
        assert_eq!(first, UpdateOutcome { matched: 1, modified: 1 });

        let again = store.update_products(filter, update).await.unwrap();
        assert_eq!(again, UpdateOutcome { matched: 1, modified: 0 });

        let stored = &store.products().await[0];
        assert_eq!(stored.get_str("name_en").unwrap(), "Milk");
        let aliases = stored.get_document("aliases").unwrap();
        assert_eq!(aliases.get_array("he").unwrap().len(), 1);
        assert_eq!(aliases.get_array("en").unwrap()[0].as_str(), Some("Milk"));

        let missing = store
            .update_products(
                doc! { "metadata.shufersal_id": "P_404" },
                doc! { "$set": { "name_en": "x" } },
            )
            .await
            .unwrap();
        assert_eq!(missing, UpdateOutcome::default());
    }

    #[tokio::test]
    async fn clear_removes_products_only() {
        let store = MemoryStore::new();
        store.insert_products(vec![product("P_1")]).await.unwrap();
        store.insert_offers(vec![doc! { "price": 5.9 }]).await.unwrap();

        assert_eq!(store.clear_products().await.unwrap(), 1);
        assert_eq!(store.count_products().await.unwrap(), 0);
        assert_eq!(store.count_offers().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn rejects_non_set_updates() {
        let store = MemoryStore::new();
        let result = store
            .update_products(doc! {}, doc! { "$unset": { "a": "" } })
            .await;
        assert!(result.is_err());
    }
}
