pub mod analyzer;
pub mod batcher;
pub mod reader;
pub mod row;
pub mod writer;

pub use analyzer::{analyze_catalog, CatalogAnalysis, ColumnGuess};
pub use batcher::{Batch, BatchRange, Batcher};
pub use reader::{clean_text, file_exists, CatalogReader, SheetTable};
pub use row::{iter_rows, CatalogRow, ColumnIndex};
pub use writer::{read_json, write_json, BatchWriter};
