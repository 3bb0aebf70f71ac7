use crate::catalog::CatalogRow;
use crate::documents::extjson::{DateRef, ObjectIdRef};
use crate::documents::DocumentContext;
use crate::normalize::{parse_unit_price, UnitPrice};
use crate::utils::Result;
use serde::{Deserialize, Serialize};

/// An offer starts pending (keyed by `shufersal_id`) and is linked to its
/// product once the product's database `_id` is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shufersal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ObjectIdRef>,
    pub merchant_id: ObjectIdRef,
    pub price: f64,
    pub stock: u32,
    pub delivery_zones: Vec<String>,
    #[serde(default)]
    pub promotions: Vec<Promotion>,
    pub unit_price_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<UnitPrice>,
    pub timestamp: DateRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub until: DateRef,
}

impl OfferDocument {
    /// Pending offer for a catalog row. Rows without a product id produce none.
    pub fn from_row(row: &CatalogRow<'_>, ctx: &DocumentContext) -> Result<Option<Self>> {
        let Some(shufersal_id) = row.shufersal_id() else {
            return Ok(None);
        };

        let price = row.price()?;

        let stock = if row.availability() == Some(ctx.out_of_stock_marker.as_str()) {
            0
        } else {
            ctx.default_stock
        };

        let mut promotions = Vec::new();
        if row.promotion() == Some(ctx.sale_marker.as_str()) {
            promotions.push(Promotion {
                kind: "sale".to_string(),
                description: ctx.promotion_description.clone(),
                until: ctx.promotion_until.clone(),
            });
        }

        let unit_price_info = row.unit_price().map(String::from);
        let unit_price = unit_price_info.as_deref().and_then(parse_unit_price);

        Ok(Some(Self {
            shufersal_id: Some(shufersal_id.to_string()),
            product_id: None,
            merchant_id: ObjectIdRef::new(&ctx.merchant_id),
            price,
            stock,
            delivery_zones: ctx.delivery_zones.clone(),
            promotions,
            unit_price_info,
            unit_price,
            timestamp: ctx.now.clone(),
        }))
    }

    pub fn is_linked(&self) -> bool {
        self.product_id.is_some()
    }

    pub fn on_sale(&self) -> bool {
        !self.promotions.is_empty()
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Swap the pending `shufersal_id` for the product's `_id`.
    pub fn link(mut self, product_id: impl Into<String>) -> Self {
        self.shufersal_id = None;
        self.product_id = Some(ObjectIdRef::new(product_id));
        self
    }
}
