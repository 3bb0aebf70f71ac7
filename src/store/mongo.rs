use crate::store::{CatalogStore, UpdateOutcome};
use crate::utils::config::DatabaseConfig;
use crate::utils::Result;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection};
use std::collections::HashMap;

pub struct MongoStore {
    products: Collection<Document>,
    offers: Collection<Document>,
}

impl MongoStore {
    pub async fn connect(uri: &str, config: &DatabaseConfig) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(&config.database);
        tracing::info!(
            database = %config.database,
            products = %config.products_collection,
            offers = %config.offers_collection,
            "Connected to MongoDB"
        );

        Ok(Self {
            products: db.collection(&config.products_collection),
            offers: db.collection(&config.offers_collection),
        })
    }
}

impl CatalogStore for MongoStore {
    async fn clear_products(&self) -> Result<u64> {
        let result = self.products.delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn clear_offers(&self) -> Result<u64> {
        let result = self.offers.delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn insert_products(&self, docs: Vec<Document>) -> Result<usize> {
        if docs.is_empty() {
            return Ok(0);
        }
        let result = self.products.insert_many(docs).await?;
        Ok(result.inserted_ids.len())
    }

    async fn insert_offers(&self, docs: Vec<Document>) -> Result<usize> {
        if docs.is_empty() {
            return Ok(0);
        }
        let result = self.offers.insert_many(docs).await?;
        Ok(result.inserted_ids.len())
    }

    async fn update_products(&self, filter: Document, update: Document) -> Result<UpdateOutcome> {
        let result = self.products.update_many(filter, update).await?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn count_products(&self) -> Result<u64> {
        Ok(self.products.count_documents(doc! {}).await?)
    }

    async fn count_offers(&self) -> Result<u64> {
        Ok(self.offers.count_documents(doc! {}).await?)
    }

    async fn product_id_mapping(&self) -> Result<HashMap<String, String>> {
        let mut cursor = self
            .products
            .find(doc! { "metadata.shufersal_id": { "$ne": null } })
            .projection(doc! { "_id": 1, "metadata.shufersal_id": 1 })
            .await?;

        let mut mapping = HashMap::new();
        while cursor.advance().await? {
            let product = cursor.deserialize_current()?;
            let id = product.get_object_id("_id").ok();
            let shufersal_id = product
                .get_document("metadata")
                .ok()
                .and_then(|m| m.get_str("shufersal_id").ok());
            if let (Some(id), Some(shufersal_id)) = (id, shufersal_id) {
                mapping.insert(shufersal_id.to_string(), id.to_hex());
            }
        }

        tracing::debug!(products = mapping.len(), "Loaded product id mapping");
        Ok(mapping)
    }
}
