use crate::utils::errors::{CatalogError, Result};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const MONGODB_URI_ENV: &str = "MONGODB_URI";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub merchant: MerchantConfig,
    pub batching: BatchingConfig,
    pub translation: TranslationConfig,
    pub database: DatabaseConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub input_file: PathBuf,
    /// First sheet when unset.
    pub sheet: Option<String>,
    pub columns: CatalogColumns,
}

/// Header names of the source spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogColumns {
    pub name: String,
    pub brand: String,
    pub size: String,
    pub image_url: String,
    pub product_id: String,
    pub kosher: String,
    pub health_labels: String,
    pub sales_method: String,
    pub price: String,
    pub promotion: String,
    pub availability: String,
    pub unit_price: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantConfig {
    pub merchant_id: String,
    pub category_id: String,
    pub delivery_zones: Vec<String>,
    pub default_stock: u32,
    pub out_of_stock_marker: String,
    pub sale_marker: String,
    pub promotion_description: String,
    pub promotion_until: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchingConfig {
    pub product_batch_size: usize,
    pub offer_batch_size: usize,
    pub update_batch_size: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// JSON object of extra Hebrew terms per language: `{"en": {..}, "ar": {..}}`.
    pub extra_terms_file: Option<PathBuf>,
    /// English updates also reset `aliases.ar` (and Arabic updates `aliases.en`).
    pub clear_other_aliases: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub uri: Option<String>,
    pub database: String,
    pub products_collection: String,
    pub offers_collection: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub state_db: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "grocery-catalog-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("חלב_וביצים_shufersal_with_images.xlsx"),
            sheet: None,
            columns: CatalogColumns::default(),
        }
    }
}

impl Default for CatalogColumns {
    fn default() -> Self {
        Self {
            name: "שם המוצר".to_string(),
            brand: "מותג".to_string(),
            size: "גודל/כמות".to_string(),
            image_url: "קישור לתמונה".to_string(),
            product_id: "מזהה מוצר".to_string(),
            kosher: "כשר".to_string(),
            health_labels: "תוויות בריאות".to_string(),
            sales_method: "אופן מכירה".to_string(),
            price: "מחיר ₪".to_string(),
            promotion: "מבצע".to_string(),
            availability: "זמינות".to_string(),
            unit_price: "מחיר ליחידה".to_string(),
        }
    }
}

impl Default for MerchantConfig {
    fn default() -> Self {
        Self {
            merchant_id: "68bf06365371c586220eb9f7".to_string(),
            category_id: "68bef17f5371c586220eb9ea".to_string(),
            delivery_zones: ["Tel Aviv", "Jerusalem", "Haifa", "Center", "North", "South"]
                .iter()
                .map(|z| z.to_string())
                .collect(),
            default_stock: 100,
            out_of_stock_marker: "חסר במלאי".to_string(),
            sale_marker: "מבצע".to_string(),
            promotion_description: "מבצע שופרסל".to_string(),
            promotion_until: "2025-01-31T00:00:00Z".to_string(),
        }
    }
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            product_batch_size: 50,
            offer_batch_size: 100,
            update_batch_size: 50,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: None,
            database: "tikram_catalog".to_string(),
            products_collection: "products".to_string(),
            offers_collection: "offers".to_string(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            state_db: PathBuf::from("./data/state.redb"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::ConfigError(e.to_string()))?;
        toml::from_str(&content).map_err(|e| CatalogError::ConfigError(e.to_string()))
    }

    /// File settings with the environment applied; defaults when the file is
    /// missing or invalid. The load error is handed back so the caller can
    /// report it once logging is up.
    pub fn load_or_default(path: &str) -> (Self, Option<CatalogError>) {
        let (mut config, error) = match Self::load_from_file(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        };
        config.apply_env();
        (config, error)
    }

    /// `MONGODB_URI` wins over the file so credentials can stay out of it.
    pub fn apply_env(&mut self) {
        if let Ok(uri) = std::env::var(MONGODB_URI_ENV) {
            if !uri.trim().is_empty() {
                self.database.uri = Some(uri);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("merchant.merchant_id", &self.merchant.merchant_id),
            ("merchant.category_id", &self.merchant.category_id),
        ] {
            ObjectId::parse_str(value)
                .map_err(|_| CatalogError::InvalidObjectId(format!("{} = {:?}", field, value)))?;
        }

        chrono::DateTime::parse_from_rfc3339(&self.merchant.promotion_until).map_err(|e| {
            CatalogError::ConfigError(format!(
                "merchant.promotion_until = {:?} is not RFC3339: {}",
                self.merchant.promotion_until, e
            ))
        })?;

        for (field, size) in [
            ("batching.product_batch_size", self.batching.product_batch_size),
            ("batching.offer_batch_size", self.batching.offer_batch_size),
            ("batching.update_batch_size", self.batching.update_batch_size),
        ] {
            if size == 0 {
                return Err(CatalogError::ConfigError(format!("{} must be > 0", field)));
            }
        }

        Ok(())
    }

    pub fn mongodb_uri(&self) -> Result<&str> {
        self.database.uri.as_deref().ok_or_else(|| {
            CatalogError::ConfigError(format!(
                "database.uri is not set (set it in config.toml or {})",
                MONGODB_URI_ENV
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [batching]
            product_batch_size = 25

            [merchant]
            default_stock = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.batching.product_batch_size, 25);
        assert_eq!(config.batching.offer_batch_size, 100);
        assert_eq!(config.merchant.default_stock, 7);
        assert_eq!(config.merchant.sale_marker, "מבצע");
        assert_eq!(config.catalog.columns.price, "מחיר ₪");
    }

    #[test]
    fn rejects_bad_object_id() {
        let mut config = AppConfig::default();
        config.merchant.category_id = "not-an-id".to_string();
        assert!(matches!(
            config.validate(),
            Err(CatalogError::InvalidObjectId(_))
        ));
    }

    #[test]
    fn rejects_promotion_date_that_is_not_rfc3339() {
        let mut config = AppConfig::default();
        config.merchant.promotion_until = "31/01/2025".to_string();
        assert!(matches!(config.validate(), Err(CatalogError::ConfigError(_))));

        config.merchant.promotion_until = "2025-01-31T00:00:00.000Z".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_batch_size() {
        let mut config = AppConfig::default();
        config.batching.update_batch_size = 0;
        assert!(matches!(config.validate(), Err(CatalogError::ConfigError(_))));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let (config, error) = AppConfig::load_or_default("/no/such/config.toml");
        assert!(matches!(error, Some(CatalogError::ConfigError(_))));
        assert_eq!(config.batching.product_batch_size, 50);
    }

    #[test]
    fn missing_uri_is_a_config_error() {
        let config = AppConfig::default();
        assert!(config.mongodb_uri().is_err());
    }
}
