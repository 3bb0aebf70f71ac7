use crate::documents::{OfferDocument, ProductDocument};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const TOP_BRANDS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BrandCount {
    pub brand: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PriceStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Written to `import_status.json`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProductSummary {
    pub total_products: usize,
    pub unique_products: usize,
    pub batch_size: usize,
    pub total_batches: usize,
    pub products_with_images: usize,
    pub top_brands: Vec<BrandCount>,
    pub generated_at: String,
}

/// Written to `offers_import_status.json`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OfferSummary {
    pub total_offers: usize,
    pub batch_size: usize,
    pub total_batches: usize,
    pub price: Option<PriceStats>,
    pub on_sale: usize,
    pub in_stock: usize,
    pub out_of_stock: usize,
    pub generated_at: String,
}

/// Most frequent brands, ties broken alphabetically.
pub fn top_brands(products: &[ProductDocument], limit: usize) -> Vec<BrandCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for brand in products.iter().filter_map(|p| p.brand.as_deref()) {
        *counts.entry(brand).or_default() += 1;
    }

    let mut brands: Vec<BrandCount> = counts
        .into_iter()
        .map(|(brand, count)| BrandCount {
            brand: brand.to_string(),
            count,
        })
        .collect();
    brands.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.brand.cmp(&b.brand)));
    brands.truncate(limit);
    brands
}

pub fn price_stats(prices: impl IntoIterator<Item = f64>) -> Option<PriceStats> {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for price in prices {
        count += 1;
        sum += price;
        min = min.min(price);
        max = max.max(price);
    }

    (count > 0).then(|| PriceStats {
        average: sum / count as f64,
        min,
        max,
    })
}

pub fn summarize_products(
    products: &[ProductDocument],
    unique_products: usize,
    batch_size: usize,
    total_batches: usize,
    generated_at: &str,
) -> ProductSummary {
    ProductSummary {
        total_products: products.len(),
        unique_products,
        batch_size,
        total_batches,
        products_with_images: products.iter().filter(|p| !p.image_urls.is_empty()).count(),
        top_brands: top_brands(products, TOP_BRANDS),
        generated_at: generated_at.to_string(),
    }
}

/// Offers without a price (stored as 0) stay out of the price stats.
pub fn summarize_offers(
    offers: &[OfferDocument],
    batch_size: usize,
    total_batches: usize,
    generated_at: &str,
) -> OfferSummary {
    let in_stock = offers.iter().filter(|o| o.in_stock()).count();
    OfferSummary {
        total_offers: offers.len(),
        batch_size,
        total_batches,
        price: price_stats(offers.iter().map(|o| o.price).filter(|p| *p > 0.0)),
        on_sale: offers.iter().filter(|o| o.on_sale()).count(),
        in_stock,
        out_of_stock: offers.len() - in_stock,
        generated_at: generated_at.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_stats_over_values() {
        let stats = price_stats([4.0, 6.0, 11.0]).unwrap();
        assert_eq!(stats.average, 7.0);
        assert_eq!(stats.min, 4.0);
        assert_eq!(stats.max, 11.0);
        assert!(price_stats(Vec::new()).is_none());
    }
}
