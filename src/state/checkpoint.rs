use crate::utils::{CatalogError, Result};
use redb::{Database, ReadableTable, TableDefinition};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const RUNS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("runs");

/// Which batch files a run works through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    ProductImport,
    OfferImport,
    EnglishUpdates,
    ArabicUpdates,
}

impl std::fmt::Display for RunKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunKind::ProductImport => write!(f, "product_import"),
            RunKind::OfferImport => write!(f, "offer_import"),
            RunKind::EnglishUpdates => write!(f, "english_updates"),
            RunKind::ArabicUpdates => write!(f, "arabic_updates"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FailedBatch {
    pub number: usize,
    pub error: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Checkpoint {
    pub run_id: String,
    pub kind: RunKind,
    pub total_batches: usize,
    pub batches_completed: Vec<usize>,
    pub failed_batches: Vec<FailedBatch>,
    pub created_at: i64,
    pub updated_at: i64,
    pub status: RunStatus,
}

impl Checkpoint {
    pub fn is_batch_completed(&self, number: usize) -> bool {
        self.batches_completed.contains(&number)
    }

    pub fn progress(&self) -> f32 {
        if self.total_batches == 0 {
            return 1.0;
        }
        self.batches_completed.len() as f32 / self.total_batches as f32
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub struct CheckpointManager {
    db: Arc<Database>,
}

impl CheckpointManager {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db
            .begin_write()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        {
            let _ = write_txn
                .open_table(RUNS_TABLE)
                .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        Ok(Self { db })
    }

    pub fn create_run(&self, kind: RunKind, total_batches: usize) -> Result<Checkpoint> {
        let now = now();
        let checkpoint = Checkpoint {
            run_id: Uuid::new_v4().to_string(),
            kind,
            total_batches,
            batches_completed: Vec::new(),
            failed_batches: Vec::new(),
            created_at: now,
            updated_at: now,
            status: RunStatus::Running,
        };

        self.save(&checkpoint)?;
        Ok(checkpoint)
    }

    pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let data = serde_json::to_vec(checkpoint)
            .map_err(|e| CatalogError::SerializationError(e.to_string()))?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(RUNS_TABLE)
                .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
            table
                .insert(checkpoint.run_id.as_str(), data.as_slice())
                .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    pub fn load_run(&self, run_id: &str) -> Result<Option<Checkpoint>> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        let table = read_txn
            .open_table(RUNS_TABLE)
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        match table.get(run_id) {
            Ok(Some(data)) => {
                let checkpoint: Checkpoint = serde_json::from_slice(data.value())
                    .map_err(|e| CatalogError::SerializationError(e.to_string()))?;
                Ok(Some(checkpoint))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(CatalogError::DatabaseError(e.to_string())),
        }
    }

    pub fn require_run(&self, run_id: &str) -> Result<Checkpoint> {
        self.load_run(run_id)?
            .ok_or_else(|| CatalogError::RunNotFound(run_id.to_string()))
    }

    /// Records a finished batch. The run completes once every batch has.
    pub fn mark_batch_completed(&self, run_id: &str, number: usize) -> Result<Checkpoint> {
        let mut checkpoint = self.require_run(run_id)?;

        if !checkpoint.is_batch_completed(number) {
            checkpoint.batches_completed.push(number);
            checkpoint.batches_completed.sort_unstable();
        }
        checkpoint.failed_batches.retain(|f| f.number != number);
        checkpoint.updated_at = now();

        if checkpoint.batches_completed.len() >= checkpoint.total_batches {
            checkpoint.status = RunStatus::Completed;
        }

        self.save(&checkpoint)?;
        Ok(checkpoint)
    }

    pub fn add_failed_batch(&self, run_id: &str, number: usize, error: &str) -> Result<()> {
        let mut checkpoint = self.require_run(run_id)?;

        checkpoint.failed_batches.retain(|f| f.number != number);
        checkpoint.failed_batches.push(FailedBatch {
            number,
            error: error.to_string(),
            timestamp: now(),
        });
        checkpoint.updated_at = now();

        self.save(&checkpoint)
    }

    pub fn set_status(&self, run_id: &str, status: RunStatus) -> Result<()> {
        let mut checkpoint = self.require_run(run_id)?;

        checkpoint.status = status;
        checkpoint.updated_at = now();

        self.save(&checkpoint)
    }

    pub fn delete_run(&self, run_id: &str) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(RUNS_TABLE)
                .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
            table
                .remove(run_id)
                .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// All runs, newest first.
    pub fn list_runs(&self) -> Result<Vec<Checkpoint>> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        let table = read_txn
            .open_table(RUNS_TABLE)
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        let mut runs = Vec::new();
        let iter = table
            .iter()
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        for result in iter {
            let (_, data) = result.map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
            let checkpoint: Checkpoint = serde_json::from_slice(data.value())
                .map_err(|e| CatalogError::SerializationError(e.to_string()))?;
            runs.push(checkpoint);
        }

        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(runs)
    }
}
