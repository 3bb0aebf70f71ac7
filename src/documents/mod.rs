pub mod extjson;
pub mod offer;
pub mod product;
pub mod update;

pub use extjson::{flatten_extjson, to_bson_document, to_bson_documents, DateRef, ObjectIdRef};
pub use offer::{OfferDocument, Promotion};
pub use product::{Aliases, ProductDocument, ProductMetadata};
pub use update::{UpdateCommand, UpdateOperation, SHUFERSAL_ID_PATH};

use crate::utils::MerchantConfig;
use chrono::{DateTime, Utc};

/// Everything a row needs besides its own cells to become documents.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    pub merchant_id: String,
    pub category_id: String,
    pub delivery_zones: Vec<String>,
    pub default_stock: u32,
    pub out_of_stock_marker: String,
    pub sale_marker: String,
    pub promotion_description: String,
    pub promotion_until: DateRef,
    pub now: DateRef,
}

impl DocumentContext {
    pub fn new(merchant: &MerchantConfig, now: DateTime<Utc>) -> Self {
        Self {
            merchant_id: merchant.merchant_id.clone(),
            category_id: merchant.category_id.clone(),
            delivery_zones: merchant.delivery_zones.clone(),
            default_stock: merchant.default_stock,
            out_of_stock_marker: merchant.out_of_stock_marker.clone(),
            sale_marker: merchant.sale_marker.clone(),
            promotion_description: merchant.promotion_description.clone(),
            promotion_until: DateRef::new(&merchant.promotion_until),
            now: DateRef::from_datetime(now),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn context() -> DocumentContext {
        let now = DateTime::parse_from_rfc3339("2025-09-08T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        DocumentContext::new(&MerchantConfig::default(), now)
    }
}
