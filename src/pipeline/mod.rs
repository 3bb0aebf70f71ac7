//! Catalog ETL stages. Each stage reads what the previous one wrote under the
//! data layout, so they can run one at a time from the CLI or back to back.

pub mod import;
pub mod offers;
pub mod prepare;
pub mod reports;
pub mod translate;
pub mod updates;

pub use import::{import_products, load_product_batches, ImportReport};
pub use offers::{import_offers, link_offers, LinkResult, OfferImportReport};
pub use prepare::{
    build_documents, dedupe_by_index, prepare_catalog, product_id_mapping, PrepareReport,
    PreparedCatalog,
};
pub use reports::{BrandCount, OfferSummary, PriceStats, ProductSummary};
pub use translate::{build_update_commands, translate_catalog, TranslateReport};
pub use updates::{apply_updates, load_update_batches, UpdateReport, UpdateTally};

use crate::catalog::{Batch, BatchWriter};
use crate::state::{AppState, Checkpoint, CheckpointManager, RunKind, RunStatus};
use crate::store::CatalogStore;
use crate::translation::Language;
use crate::utils::{CatalogError, DataLayout, Result};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Success,
    Error,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchResult {
    pub number: usize,
    pub status: BatchStatus,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResult {
    pub fn success(number: usize, count: usize) -> Self {
        Self {
            number,
            status: BatchStatus::Success,
            count,
            error: None,
        }
    }

    pub fn error(number: usize, error: &CatalogError) -> Self {
        Self {
            number,
            status: BatchStatus::Error,
            count: 0,
            error: Some(error.to_string()),
        }
    }

    pub fn skipped(number: usize) -> Self {
        Self {
            number,
            status: BatchStatus::Skipped,
            count: 0,
            error: None,
        }
    }
}

/// Reads every `<prefix>_<n>.json` batch in number order.
pub fn load_batches<T: DeserializeOwned>(layout: &DataLayout, prefix: &str) -> Result<Vec<Batch<T>>> {
    let writer = BatchWriter::new(layout, prefix);
    let mut batches = Vec::new();
    let mut start = 0;
    for number in writer.list_batches()? {
        let items: Vec<T> = writer.read_batch(number)?;
        let end = start + items.len();
        batches.push(Batch {
            number,
            start,
            end,
            items,
        });
        start = end;
    }
    Ok(batches)
}

/// Checkpoint bookkeeping for one pass over a list of batches.
pub struct RunTracker<'a> {
    checkpoints: &'a CheckpointManager,
    checkpoint: Checkpoint,
    resumed: bool,
}

impl<'a> RunTracker<'a> {
    /// New run, or the run `resume` names when given. A resumed run must be of
    /// the same kind.
    pub fn start(
        checkpoints: &'a CheckpointManager,
        kind: RunKind,
        total_batches: usize,
        resume: Option<&str>,
    ) -> Result<Self> {
        let (checkpoint, resumed) = match resume {
            Some(run_id) => {
                let mut checkpoint = checkpoints.require_run(run_id)?;
                if checkpoint.kind != kind {
                    return Err(CatalogError::ConfigError(format!(
                        "run {} is a {} run, not {}",
                        run_id, checkpoint.kind, kind
                    )));
                }
                checkpoint.total_batches = total_batches;
                checkpoint.status = RunStatus::Running;
                checkpoints.save(&checkpoint)?;
                tracing::info!(
                    run_id = %checkpoint.run_id,
                    kind = %kind,
                    completed = checkpoint.batches_completed.len(),
                    total = total_batches,
                    "Resuming run"
                );
                (checkpoint, true)
            }
            None => {
                let checkpoint = checkpoints.create_run(kind, total_batches)?;
                tracing::info!(run_id = %checkpoint.run_id, kind = %kind, total = total_batches, "Starting run");
                (checkpoint, false)
            }
        };

        Ok(Self {
            checkpoints,
            checkpoint,
            resumed,
        })
    }

    pub fn run_id(&self) -> &str {
        &self.checkpoint.run_id
    }

    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    pub fn should_skip(&self, number: usize) -> bool {
        self.checkpoint.is_batch_completed(number)
    }

    pub fn completed(&mut self, number: usize) -> Result<()> {
        self.checkpoint = self
            .checkpoints
            .mark_batch_completed(&self.checkpoint.run_id, number)?;
        Ok(())
    }

    pub fn failed(&mut self, number: usize, error: &CatalogError) -> Result<()> {
        self.checkpoints
            .add_failed_batch(&self.checkpoint.run_id, number, &error.to_string())?;
        self.checkpoint = self.checkpoints.require_run(&self.checkpoint.run_id)?;
        Ok(())
    }

    /// Final status: failed if any batch is still failed, else completed.
    pub fn finish(self) -> Result<Checkpoint> {
        let status = if self.checkpoint.failed_batches.is_empty() {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };
        self.checkpoints.set_status(&self.checkpoint.run_id, status)?;
        self.checkpoints.require_run(&self.checkpoint.run_id)
    }
}

/// Every stage in order against one store: prepare, import products, link
/// and import offers, then English and Arabic updates.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub prepare: PrepareReport,
    pub translations: Vec<TranslateReport>,
    pub products: ImportReport,
    pub offers: OfferImportReport,
    pub updates: Vec<UpdateReport>,
}

pub async fn run_pipeline<S: CatalogStore>(
    store: &S,
    state: &AppState,
    now: DateTime<Utc>,
) -> Result<PipelineReport> {
    let config = &state.config;
    let layout = &state.layout;

    let prepare = prepare_catalog(config, layout, None, now)?;

    let mut translations = Vec::new();
    for language in Language::ALL {
        translations.push(translate_catalog(config, layout, language)?);
    }

    let batches = load_product_batches(layout)?;
    let products = import_products(store, &batches, &state.checkpoints, None).await?;

    let offers = import_offers(
        store,
        layout,
        &state.mappings,
        &state.checkpoints,
        config.batching.offer_batch_size,
        None,
    )
    .await?;

    let mut updates = Vec::new();
    for language in Language::ALL {
        let batches = load_update_batches(layout, language)?;
        updates.push(apply_updates(store, &batches, &state.checkpoints, language, None).await?);
    }

    Ok(PipelineReport {
        prepare,
        translations,
        products,
        offers,
        updates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Batcher;
    use crate::state::open_state;

    #[test]
    fn load_batches_rebuilds_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path().join("data"));
        let writer = BatchWriter::new(&layout, "mongo_batch");
        writer
            .write_all(&Batcher::new(2).split(vec![1, 2, 3, 4, 5]))
            .unwrap();

        let batches: Vec<Batch<i32>> = load_batches(&layout, "mongo_batch").unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!((batches[2].start, batches[2].end), (4, 5));
        assert_eq!(batches[1].items, vec![3, 4]);
    }

    #[test]
    fn tracker_resumes_only_matching_kind() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(open_state(&dir.path().join("s.redb")).unwrap()).unwrap();

        let mut tracker = RunTracker::start(&manager, RunKind::ProductImport, 2, None).unwrap();
        tracker.completed(1).unwrap();
        tracker
            .failed(2, &CatalogError::DatabaseError("down".to_string()))
            .unwrap();
        let run_id = tracker.run_id().to_string();
        let checkpoint = tracker.finish().unwrap();
        assert_eq!(checkpoint.status, RunStatus::Failed);

        let resumed = RunTracker::start(&manager, RunKind::ProductImport, 2, Some(&run_id)).unwrap();
        assert!(resumed.is_resumed());
        assert!(resumed.should_skip(1));
        assert!(!resumed.should_skip(2));

        assert!(RunTracker::start(&manager, RunKind::OfferImport, 2, Some(&run_id)).is_err());
    }
}
