use crate::catalog::{BatchWriter, Batcher};
use crate::documents::{to_bson_documents, OfferDocument};
use crate::pipeline::prepare::OFFER_BATCH_PREFIX;
use crate::pipeline::{load_batches, BatchResult, RunTracker};
use crate::state::{CheckpointManager, MappingStore, RunKind, RunStatus};
use crate::store::CatalogStore;
use crate::utils::{DataLayout, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const READY_BATCH_PREFIX: &str = "ready_for_import_batch";

#[derive(Debug, Clone, Default)]
pub struct LinkResult {
    pub linked: Vec<OfferDocument>,
    /// Product ids with no stored product, in offer order.
    pub missing: Vec<String>,
    pub without_id: usize,
}

/// Replaces each pending offer's `shufersal_id` with its product's `_id`.
pub fn link_offers(pending: Vec<OfferDocument>, mapping: &HashMap<String, String>) -> LinkResult {
    let mut result = LinkResult::default();

    for offer in pending {
        if offer.is_linked() {
            result.linked.push(offer);
            continue;
        }

        let Some(shufersal_id) = offer.shufersal_id.clone() else {
            result.without_id += 1;
            continue;
        };

        match mapping.get(&shufersal_id) {
            Some(product_id) => result.linked.push(offer.link(product_id.clone())),
            None => result.missing.push(shufersal_id),
        }
    }

    result
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferImportReport {
    pub run_id: String,
    pub pending: usize,
    pub linked: usize,
    pub missing_ids: Vec<String>,
    /// Offers removed before a fresh run.
    pub cleared: u64,
    pub inserted: usize,
    pub batches: Vec<BatchResult>,
    pub final_count: u64,
    pub status: RunStatus,
}

/// Links the pending offer batches against the products now in the store and
/// inserts them as `ready_for_import_batch_<n>` batches. A fresh run empties
/// the offers collection first.
pub async fn import_offers<S: CatalogStore>(
    store: &S,
    layout: &DataLayout,
    mappings: &MappingStore,
    checkpoints: &CheckpointManager,
    batch_size: usize,
    resume: Option<&str>,
) -> Result<OfferImportReport> {
    let pending: Vec<OfferDocument> = load_batches(layout, OFFER_BATCH_PREFIX)?
        .into_iter()
        .flat_map(|b| b.items)
        .collect();
    let pending_count = pending.len();

    let mut mapping = store.product_id_mapping().await?;
    if mapping.is_empty() {
        mapping = mappings.load_all()?;
        tracing::warn!(cached = mapping.len(), "No products in store; using cached id mapping");
    } else {
        mappings.clear()?;
        mappings.save_many(&mapping)?;
    }

    let linked = link_offers(pending, &mapping);
    if !linked.missing.is_empty() {
        tracing::warn!(missing = linked.missing.len(), "Offers without a stored product");
    }
    tracing::info!(pending = pending_count, linked = linked.linked.len(), "Offers linked");

    let batches = Batcher::new(batch_size).split(linked.linked);
    let writer = BatchWriter::new(layout, READY_BATCH_PREFIX);
    writer.remove_all()?;
    writer.write_all(&batches)?;

    let mut tracker = RunTracker::start(checkpoints, RunKind::OfferImport, batches.len(), resume)?;

    let cleared = if tracker.is_resumed() {
        0
    } else {
        let deleted = store.clear_offers().await?;
        tracing::info!(deleted, "Cleared offers collection");
        deleted
    };
    let mut inserted = 0;
    let mut results = Vec::with_capacity(batches.len());

    for batch in &batches {
        if tracker.should_skip(batch.number) {
            results.push(BatchResult::skipped(batch.number));
            continue;
        }

        let outcome = match to_bson_documents(&batch.items) {
            Ok(docs) => store.insert_offers(docs).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(count) => {
                inserted += count;
                tracker.completed(batch.number)?;
                tracing::info!(batch = batch.number, inserted = count, "Offer batch imported");
                results.push(BatchResult::success(batch.number, count));
            }
            Err(e) => {
                tracing::error!(batch = batch.number, error = %e, "Offer batch failed");
                tracker.failed(batch.number, &e)?;
                results.push(BatchResult::error(batch.number, &e));
            }
        }
    }

    let final_count = store.count_offers().await?;
    let run_id = tracker.run_id().to_string();
    let checkpoint = tracker.finish()?;

    Ok(OfferImportReport {
        run_id,
        pending: pending_count,
        linked: batches.iter().map(|b| b.len()).sum(),
        missing_ids: linked.missing,
        cleared,
        inserted,
        batches: results,
        final_count,
        status: checkpoint.status,
    })
}
