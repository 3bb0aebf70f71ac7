use crate::catalog::Batch;
use crate::documents::{to_bson_documents, ProductDocument};
use crate::pipeline::prepare::PRODUCT_BATCH_PREFIX;
use crate::pipeline::{load_batches, BatchResult, RunTracker};
use crate::state::{CheckpointManager, RunKind, RunStatus};
use crate::store::CatalogStore;
use crate::utils::{DataLayout, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: String,
    pub expected: usize,
    pub inserted: usize,
    /// Products removed before a fresh run.
    pub cleared: u64,
    pub batches: Vec<BatchResult>,
    pub failed_batches: usize,
    pub final_count: u64,
    pub status: RunStatus,
}

pub fn load_product_batches(layout: &DataLayout) -> Result<Vec<Batch<ProductDocument>>> {
    load_batches(layout, PRODUCT_BATCH_PREFIX)
}

/// Inserts product batches in order. A fresh run empties the collection first;
/// a resumed run skips the batches its checkpoint already holds.
pub async fn import_products<S: CatalogStore>(
    store: &S,
    batches: &[Batch<ProductDocument>],
    checkpoints: &CheckpointManager,
    resume: Option<&str>,
) -> Result<ImportReport> {
    let mut tracker = RunTracker::start(checkpoints, RunKind::ProductImport, batches.len(), resume)?;

    let cleared = if tracker.is_resumed() {
        0
    } else {
        let deleted = store.clear_products().await?;
        tracing::info!(deleted, "Cleared products collection");
        deleted
    };

    let expected: usize = batches.iter().map(|b| b.len()).sum();
    let mut inserted = 0;
    let mut results = Vec::with_capacity(batches.len());

    for batch in batches {
        if tracker.should_skip(batch.number) {
            tracing::debug!(batch = batch.number, "Batch already imported");
            results.push(BatchResult::skipped(batch.number));
            continue;
        }

        let outcome = match to_bson_documents(&batch.items) {
            Ok(docs) => store.insert_products(docs).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(count) => {
                inserted += count;
                tracker.completed(batch.number)?;
                tracing::info!(batch = batch.number, inserted = count, "Product batch imported");
                results.push(BatchResult::success(batch.number, count));
            }
            Err(e) => {
                tracing::error!(batch = batch.number, error = %e, "Product batch failed");
                tracker.failed(batch.number, &e)?;
                results.push(BatchResult::error(batch.number, &e));
            }
        }
    }

    let final_count = store.count_products().await?;
    if final_count != expected as u64 {
        tracing::warn!(expected, final_count, "Product count differs from expected");
    }

    let run_id = tracker.run_id().to_string();
    let checkpoint = tracker.finish()?;

    Ok(ImportReport {
        run_id,
        expected,
        inserted,
        cleared,
        failed_batches: checkpoint.failed_batches.len(),
        batches: results,
        final_count,
        status: checkpoint.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Batcher;
    use crate::documents::{Aliases, DateRef, ObjectIdRef, ProductMetadata};
    use crate::pipeline::BatchStatus;
    use crate::state::open_state;
    use crate::store::MemoryStore;
    use mongodb::bson::doc;

    fn products(n: usize) -> Vec<ProductDocument> {
        (0..n)
            .map(|i| ProductDocument {
                name: format!("מוצר {}", i),
                brand: None,
                size: None,
                description: format!("מוצר {}", i),
                category_id: ObjectIdRef::new("68bef17f5371c586220eb9ea"),
                image_urls: Vec::new(),
                aliases: Aliases::default(),
                metadata: ProductMetadata {
                    shufersal_id: Some(format!("P_{}", i)),
                    kosher: None,
                    health_labels: Vec::new(),
                    sales_method: None,
                    imported_at: DateRef::new("2025-09-08T12:00:00.000Z"),
                },
            })
            .collect()
    }

    #[tokio::test]
    async fn fresh_import_clears_then_inserts_all() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoints = CheckpointManager::new(open_state(&dir.path().join("s.redb")).unwrap()).unwrap();
        let store = MemoryStore::new();
        store.insert_products(vec![doc! { "stale": true }]).await.unwrap();

        let batches = Batcher::new(2).split(products(5));
        let report = import_products(&store, &batches, &checkpoints, None).await.unwrap();

        assert_eq!(report.cleared, 1);
        assert_eq!(report.expected, 5);
        assert_eq!(report.inserted, 5);
        assert_eq!(report.final_count, 5);
        assert_eq!(report.status, RunStatus::Completed);
        assert!(report.batches.iter().all(|b| b.status == BatchStatus::Success));

        let stored = store.products().await;
        assert!(stored[0].get_object_id("_id").is_ok());
        assert!(stored[0].get_object_id("category_id").is_ok());
        assert!(stored[0].get_document("metadata").unwrap().get_datetime("imported_at").is_ok());
    }

    #[tokio::test]
    async fn resumed_import_skips_completed_batches() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoints = CheckpointManager::new(open_state(&dir.path().join("s.redb")).unwrap()).unwrap();
        let store = MemoryStore::new();
        let batches = Batcher::new(2).split(products(5));

        let run = checkpoints.create_run(RunKind::ProductImport, 3).unwrap();
        checkpoints.mark_batch_completed(&run.run_id, 1).unwrap();

        let report = import_products(&store, &batches, &checkpoints, Some(&run.run_id))
            .await
            .unwrap();

        assert_eq!(report.run_id, run.run_id);
        assert_eq!(report.cleared, 0);
        assert_eq!(report.inserted, 3);
        assert_eq!(report.batches[0].status, BatchStatus::Skipped);
        assert_eq!(report.status, RunStatus::Completed);
    }
}
