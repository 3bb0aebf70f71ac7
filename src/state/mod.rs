pub mod checkpoint;
pub mod mapping;

pub use checkpoint::{Checkpoint, CheckpointManager, FailedBatch, RunKind, RunStatus};
pub use mapping::MappingStore;

use crate::utils::{AppConfig, CatalogError, DataLayout, Result};
use redb::Database;
use std::path::Path;
use std::sync::Arc;

/// Opens (or creates) the run-state database shared by the stores.
pub fn open_state(path: &Path) -> Result<Arc<Database>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::create(path).map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
    Ok(Arc::new(db))
}

/// Everything a command or the MCP server needs between calls.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub layout: DataLayout,
    pub checkpoints: Arc<CheckpointManager>,
    pub mappings: Arc<MappingStore>,
}

impl AppState {
    pub fn open(config: AppConfig) -> Result<Self> {
        let db = open_state(&config.data.state_db)?;
        Ok(Self {
            layout: DataLayout::new(&config.data.data_dir),
            checkpoints: Arc::new(CheckpointManager::new(db.clone())?),
            mappings: Arc::new(MappingStore::new(db)?),
            config,
        })
    }
}
