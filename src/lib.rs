pub mod catalog;
pub mod documents;
pub mod normalize;
pub mod pipeline;
pub mod server;
pub mod state;
pub mod store;
pub mod translation;
pub mod utils;

pub use catalog::{analyze_catalog, Batch, Batcher, CatalogReader, SheetTable};
pub use documents::{OfferDocument, ProductDocument, UpdateCommand};
pub use pipeline::{run_pipeline, PipelineReport};
pub use server::CatalogServer;
pub use state::{AppState, CheckpointManager, MappingStore, RunKind, RunStatus};
pub use store::{CatalogStore, MemoryStore, MongoStore};
pub use translation::{Dictionary, Language, Translator};
pub use utils::{AppConfig, CatalogError, DataLayout, Result};
