use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("MongoDB error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    #[error("Extended JSON error: {0}")]
    ExtJsonError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Missing column in catalog: {0}")]
    MissingColumn(String),

    #[error("Invalid row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("Invalid ObjectId: {0}")]
    InvalidObjectId(String),

    #[error("Batch not found: {0}")]
    BatchNotFound(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// A catalog row that could not be turned into documents. Collected instead of
/// aborting the run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RowError {
    pub row_index: usize,
    pub shufersal_id: Option<String>,
    pub error: String,
}

impl RowError {
    pub fn new(row_index: usize, shufersal_id: Option<String>, error: &CatalogError) -> Self {
        Self {
            row_index,
            shufersal_id,
            error: error.to_string(),
        }
    }
}
