use crate::catalog::CatalogRow;
use crate::documents::extjson::{DateRef, ObjectIdRef};
use crate::documents::DocumentContext;
use crate::normalize::{extract_size, normalize_brand, split_health_labels};
use crate::utils::{CatalogError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub description: String,
    pub category_id: ObjectIdRef,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub aliases: Aliases,
    pub metadata: ProductMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aliases {
    #[serde(default)]
    pub he: Vec<String>,
    #[serde(default)]
    pub en: Vec<String>,
    #[serde(default)]
    pub ar: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub shufersal_id: Option<String>,
    pub kosher: Option<String>,
    #[serde(default)]
    pub health_labels: Vec<String>,
    pub sales_method: Option<String>,
    pub imported_at: DateRef,
}

impl ProductDocument {
    pub fn from_row(row: &CatalogRow<'_>, ctx: &DocumentContext) -> Result<Self> {
        let name = row
            .name()
            .ok_or_else(|| CatalogError::InvalidRow {
                row: row.index,
                reason: "product name is empty".to_string(),
            })?
            .to_string();

        let brand = normalize_brand(row.brand());
        let size = extract_size(row.size());

        let mut he = vec![name.clone()];
        if let (Some(normalized), Some(raw)) = (&brand, row.brand()) {
            if !name.contains(normalized.as_str()) {
                he.push(format!("{} {}", name, raw));
            }
        }

        let description = match &brand {
            Some(b) => format!("{} - {}", name, b),
            None => name.clone(),
        };

        Ok(Self {
            name,
            brand,
            size,
            description,
            category_id: ObjectIdRef::new(&ctx.category_id),
            image_urls: row.image_url().map(|u| vec![u.to_string()]).unwrap_or_default(),
            aliases: Aliases {
                he,
                en: Vec::new(),
                ar: Vec::new(),
            },
            metadata: ProductMetadata {
                shufersal_id: row.shufersal_id().map(String::from),
                kosher: row.kosher().map(String::from),
                health_labels: split_health_labels(row.health_labels()),
                sales_method: row.sales_method().map(String::from),
                imported_at: ctx.now.clone(),
            },
        })
    }

    pub fn shufersal_id(&self) -> Option<&str> {
        self.metadata.shufersal_id.as_deref()
    }
}
