use crate::documents::ProductDocument;
use crate::translation::translator::{Language, Translator};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A product's Hebrew text next to its translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProductTranslation {
    pub shufersal_id: Option<String>,
    pub language: Language,
    pub name_he: String,
    pub name: String,
    pub brand_he: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
}

impl ProductTranslation {
    pub fn from_product(product: &ProductDocument, translator: &Translator) -> Self {
        Self {
            shufersal_id: product.metadata.shufersal_id.clone(),
            language: translator.language(),
            name_he: product.name.clone(),
            name: translator.translate_name(&product.name),
            brand_he: product.brand.clone(),
            brand: product.brand.as_deref().map(|b| translator.translate(b)),
            size: product.size.clone(),
        }
    }
}

pub fn translate_products(products: &[ProductDocument], translator: &Translator) -> Vec<ProductTranslation> {
    let mut records = Vec::with_capacity(products.len());
    for product in products {
        records.push(ProductTranslation::from_product(product, translator));
        if records.len() % 100 == 0 {
            tracing::info!(
                language = %translator.language(),
                processed = records.len(),
                "Translating products"
            );
        }
    }
    records
}
