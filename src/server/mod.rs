pub mod tools;

pub use tools::CatalogServer;
