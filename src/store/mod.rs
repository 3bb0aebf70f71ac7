//! Document database behind the import and update pipelines.

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use crate::utils::Result;
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;

/// Result of one `update_many`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

pub trait CatalogStore: Send + Sync {
    /// Removes every product; returns how many were deleted.
    fn clear_products(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Removes every offer; returns how many were deleted.
    fn clear_offers(&self) -> impl Future<Output = Result<u64>> + Send;

    fn insert_products(&self, docs: Vec<Document>) -> impl Future<Output = Result<usize>> + Send;

    fn insert_offers(&self, docs: Vec<Document>) -> impl Future<Output = Result<usize>> + Send;

    fn update_products(
        &self,
        filter: Document,
        update: Document,
    ) -> impl Future<Output = Result<UpdateOutcome>> + Send;

    fn count_products(&self) -> impl Future<Output = Result<u64>> + Send;

    fn count_offers(&self) -> impl Future<Output = Result<u64>> + Send;

    /// `metadata.shufersal_id → _id` (hex) for every stored product that has one.
    fn product_id_mapping(&self) -> impl Future<Output = Result<HashMap<String, String>>> + Send;
}
