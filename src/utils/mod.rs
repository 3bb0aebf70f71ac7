pub mod config;
pub mod errors;
pub mod paths;

pub use config::{AppConfig, CatalogColumns, MerchantConfig};
pub use errors::{CatalogError, Result, RowError};
pub use paths::DataLayout;
