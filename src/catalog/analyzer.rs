use crate::catalog::reader::{CatalogReader, SheetTable};
use crate::utils::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CatalogAnalysis {
    pub file_path: String,
    pub total_rows: usize,
    pub total_columns: usize,
    pub column_names: Vec<String>,
    pub columns: Vec<ColumnSummary>,
    pub column_guess: ColumnGuess,
    pub sample_data: Vec<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnSummary {
    pub name: String,
    pub null_count: usize,
    pub unique_count: usize,
    /// Listed only for low-cardinality columns.
    pub values: Option<Vec<String>>,
}

/// Best-effort mapping of semantic fields to sheet headers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ColumnGuess {
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<String>,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<String>,
    pub quantity: Option<String>,
}

const LOW_CARDINALITY: usize = 5;

pub fn analyze_catalog(
    file_path: &str,
    sheet: Option<String>,
    sample_rows: usize,
) -> Result<CatalogAnalysis> {
    let table = CatalogReader::new(file_path).with_sheet(sheet).read()?;
    Ok(analyze_table(file_path, &table, sample_rows))
}

pub fn analyze_table(file_path: &str, table: &SheetTable, sample_rows: usize) -> CatalogAnalysis {
    let columns = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut null_count = 0;
            let mut unique = BTreeSet::new();
            for row in &table.rows {
                match row.get(i).and_then(|c| c.as_deref()) {
                    Some(value) => {
                        unique.insert(value);
                    }
                    None => null_count += 1,
                }
            }

            ColumnSummary {
                name: name.clone(),
                null_count,
                unique_count: unique.len(),
                values: (unique.len() <= LOW_CARDINALITY)
                    .then(|| unique.iter().map(|v| v.to_string()).collect()),
            }
        })
        .collect();

    let sample_data = table
        .rows
        .iter()
        .take(sample_rows)
        .map(|row| {
            let map: serde_json::Map<String, JsonValue> = table
                .headers
                .iter()
                .zip(row.iter())
                .map(|(header, cell)| {
                    let value = cell
                        .as_ref()
                        .map(|c| JsonValue::String(c.clone()))
                        .unwrap_or(JsonValue::Null);
                    (header.clone(), value)
                })
                .collect();
            JsonValue::Object(map)
        })
        .collect();

    CatalogAnalysis {
        file_path: file_path.to_string(),
        total_rows: table.row_count(),
        total_columns: table.headers.len(),
        column_names: table.headers.clone(),
        columns,
        column_guess: guess_columns(&table.headers),
        sample_data,
    }
}

/// First matching header wins each slot.
pub fn guess_columns(headers: &[String]) -> ColumnGuess {
    let mut guess = ColumnGuess::default();
    let has = |header: &str, keywords: &[&str]| keywords.iter().any(|k| header.contains(k));

    for header in headers {
        let lower = header.to_lowercase();
        let slot = if has(&lower, &["ליחידה"])
            || (lower.contains("unit") && has(&lower, &["price", "מחיר"]))
        {
            &mut guess.unit_price
        } else if has(&lower, &["name", "שם", "product"]) {
            &mut guess.product_name
        } else if has(&lower, &["brand", "מותג", "יצרן"]) {
            &mut guess.brand
        } else if has(&lower, &["price", "מחיר"]) {
            &mut guess.price
        } else if has(&lower, &["barcode", "ברקוד", "gtin", "upc", "ean"]) {
            &mut guess.barcode
        } else if has(&lower, &["image", "תמונה", "img"]) {
            &mut guess.image_url
        } else if has(&lower, &["description", "תיאור"]) {
            &mut guess.description
        } else if has(&lower, &["quantity", "כמות"]) {
            &mut guess.quantity
        } else {
            continue;
        };
        if slot.is_none() {
            *slot = Some(header.clone());
        }
    }

    guess
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SheetTable {
        SheetTable {
            headers: vec![
                "שם המוצר".to_string(),
                "מותג".to_string(),
                "מחיר ₪".to_string(),
                "מבצע".to_string(),
                "קישור לתמונה".to_string(),
            ],
            rows: (0..8)
                .map(|i| {
                    vec![
                        Some(format!("מוצר {}", i)),
                        Some(if i % 2 == 0 { "תנובה" } else { "טרה" }.to_string()),
                        Some(format!("{}.90", i)),
                        (i == 3).then(|| "מבצע".to_string()),
                        None,
                    ]
                })
                .collect(),
        }
    }

    #[test]
    fn summarises_columns() {
        let analysis = analyze_table("catalog.xlsx", &table(), 2);

        assert_eq!(analysis.total_rows, 8);
        assert_eq!(analysis.total_columns, 5);
        assert_eq!(analysis.sample_data.len(), 2);
        assert_eq!(analysis.sample_data[0]["מותג"], "תנובה");
        assert_eq!(analysis.sample_data[0]["קישור לתמונה"], JsonValue::Null);

        let brand = &analysis.columns[1];
        assert_eq!(brand.unique_count, 2);
        assert_eq!(brand.values.as_ref().unwrap().len(), 2);

        let promo = &analysis.columns[3];
        assert_eq!(promo.null_count, 7);

        let name = &analysis.columns[0];
        assert_eq!(name.unique_count, 8);
        assert!(name.values.is_none());
    }

    #[test]
    fn guesses_hebrew_headers() {
        let guess = guess_columns(&table().headers);
        assert_eq!(guess.product_name.as_deref(), Some("שם המוצר"));
        assert_eq!(guess.brand.as_deref(), Some("מותג"));
        assert_eq!(guess.price.as_deref(), Some("מחיר ₪"));
        assert_eq!(guess.image_url.as_deref(), Some("קישור לתמונה"));
        assert!(guess.barcode.is_none());
    }

    #[test]
    fn guesses_catalog_export_headers() {
        let headers: Vec<String> = [
            "שם המוצר",
            "מותג",
            "גודל/כמות",
            "קישור לתמונה",
            "מזהה מוצר",
            "כשר",
            "תוויות בריאות",
            "אופן מכירה",
            "מחיר ₪",
            "מבצע",
            "זמינות",
            "מחיר ליחידה",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect();

        let guess = guess_columns(&headers);
        assert_eq!(guess.product_name.as_deref(), Some("שם המוצר"));
        assert_eq!(guess.price.as_deref(), Some("מחיר ₪"));
        assert_eq!(guess.unit_price.as_deref(), Some("מחיר ליחידה"));
        assert_eq!(guess.quantity.as_deref(), Some("גודל/כמות"));
        assert_eq!(guess.image_url.as_deref(), Some("קישור לתמונה"));
    }

    #[test]
    fn first_header_keeps_the_slot() {
        let headers = vec!["Price".to_string(), "Sale Price".to_string()];
        assert_eq!(guess_columns(&headers).price.as_deref(), Some("Price"));
    }

    #[test]
    fn unit_price_header_is_not_the_price() {
        let headers = vec!["Unit Price".to_string(), "Price".to_string()];
        let guess = guess_columns(&headers);
        assert_eq!(guess.price.as_deref(), Some("Price"));
        assert_eq!(guess.unit_price.as_deref(), Some("Unit Price"));
    }
}
