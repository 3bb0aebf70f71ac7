use crate::catalog::{iter_rows, write_json, BatchWriter, Batcher, CatalogReader, ColumnIndex, SheetTable};
use crate::documents::{DateRef, DocumentContext, OfferDocument, ProductDocument};
use crate::pipeline::reports::{summarize_offers, summarize_products, OfferSummary, ProductSummary};
use crate::utils::{AppConfig, CatalogColumns, DataLayout, Result, RowError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const ALL_PRODUCTS_FILE: &str = "all_products_import.json";
pub const PRODUCT_ID_MAPPING_FILE: &str = "product_id_mapping.json";
pub const PRODUCT_STATUS_FILE: &str = "import_status.json";
pub const OFFER_STATUS_FILE: &str = "offers_import_status.json";
pub const PRODUCT_BATCH_PREFIX: &str = "mongo_batch";
pub const OFFER_BATCH_PREFIX: &str = "offers_batch";

const PROGRESS_EVERY: usize = 100;

/// Documents built from one sheet, in row order.
#[derive(Debug, Clone, Default)]
pub struct PreparedCatalog {
    pub total_rows: usize,
    pub products: Vec<ProductDocument>,
    pub offers: Vec<OfferDocument>,
    pub row_errors: Vec<RowError>,
}

impl PreparedCatalog {
    pub fn mapping(&self) -> BTreeMap<String, usize> {
        product_id_mapping(&self.products)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareReport {
    pub input_file: String,
    pub total_rows: usize,
    pub products: ProductSummary,
    pub offers: OfferSummary,
    pub row_errors: Vec<RowError>,
}

/// A row that fails becomes a [`RowError`] and contributes neither a product
/// nor an offer.
pub fn build_documents(
    table: &SheetTable,
    columns: &CatalogColumns,
    ctx: &DocumentContext,
) -> Result<PreparedCatalog> {
    let index = ColumnIndex::resolve(table, columns)?;
    let mut prepared = PreparedCatalog {
        total_rows: table.row_count(),
        ..Default::default()
    };

    for row in iter_rows(table, &index) {
        let built = ProductDocument::from_row(&row, ctx)
            .and_then(|product| Ok((product, OfferDocument::from_row(&row, ctx)?)));

        match built {
            Ok((product, offer)) => {
                prepared.products.push(product);
                prepared.offers.extend(offer);
            }
            Err(e) => {
                tracing::warn!(row = row.index, error = %e, "Skipping catalog row");
                prepared
                    .row_errors
                    .push(RowError::new(row.index, row.shufersal_id().map(String::from), &e));
            }
        }

        if (row.index + 1) % PROGRESS_EVERY == 0 {
            tracing::info!(processed = row.index + 1, total = prepared.total_rows, "Building documents");
        }
    }

    Ok(prepared)
}

/// `shufersal_id → position`. A repeated id maps to its last occurrence.
pub fn product_id_mapping(products: &[ProductDocument]) -> BTreeMap<String, usize> {
    products
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.shufersal_id().map(|id| (id.to_string(), i)))
        .collect()
}

/// Keeps, per shufersal id, only the product at the mapped position.
/// Products without an id are all kept.
pub fn dedupe_by_index(
    products: Vec<ProductDocument>,
    mapping: &BTreeMap<String, usize>,
) -> Vec<ProductDocument> {
    products
        .into_iter()
        .enumerate()
        .filter(|(i, p)| match p.shufersal_id() {
            Some(id) => mapping.get(id) == Some(i),
            None => true,
        })
        .map(|(_, p)| p)
        .collect()
}

/// Spreadsheet → product and pending offer batches plus status files.
pub fn prepare_catalog(
    config: &AppConfig,
    layout: &DataLayout,
    input: Option<&Path>,
    now: DateTime<Utc>,
) -> Result<PrepareReport> {
    let input = layout.resolve(input.unwrap_or(config.catalog.input_file.as_path()));
    let input_file = input.display().to_string();
    tracing::info!(input = %input_file, "Preparing catalog");

    let table = CatalogReader::new(input_file.clone())
        .with_sheet(config.catalog.sheet.clone())
        .read()?;

    let ctx = DocumentContext::new(&config.merchant, now);
    let prepared = build_documents(&table, &config.catalog.columns, &ctx)?;
    let mapping = prepared.mapping();

    write_json(layout, ALL_PRODUCTS_FILE, &prepared.products)?;
    write_json(layout, PRODUCT_ID_MAPPING_FILE, &mapping)?;

    let unique = dedupe_by_index(prepared.products.clone(), &mapping);
    let duplicates = prepared.products.len() - unique.len();
    if duplicates > 0 {
        tracing::warn!(duplicates, "Repeated product ids; keeping the last occurrence");
    }

    let product_batcher = Batcher::new(config.batching.product_batch_size);
    let product_batches = product_batcher.split(unique);
    let product_writer = BatchWriter::new(layout, PRODUCT_BATCH_PREFIX);
    product_writer.remove_all()?;
    product_writer.write_all(&product_batches)?;

    let offer_batcher = Batcher::new(config.batching.offer_batch_size);
    let offer_batches = offer_batcher.split(prepared.offers.clone());
    let offer_writer = BatchWriter::new(layout, OFFER_BATCH_PREFIX);
    offer_writer.remove_all()?;
    offer_writer.write_all(&offer_batches)?;

    let generated_at = DateRef::from_datetime(now).date;
    let products = summarize_products(
        &prepared.products,
        prepared.products.len() - duplicates,
        product_batcher.batch_size(),
        product_batches.len(),
        &generated_at,
    );
    let offers = summarize_offers(
        &prepared.offers,
        offer_batcher.batch_size(),
        offer_batches.len(),
        &generated_at,
    );
    write_json(layout, PRODUCT_STATUS_FILE, &products)?;
    write_json(layout, OFFER_STATUS_FILE, &offers)?;

    tracing::info!(
        rows = prepared.total_rows,
        products = products.total_products,
        offers = offers.total_offers,
        product_batches = products.total_batches,
        offer_batches = offers.total_batches,
        errors = prepared.row_errors.len(),
        "Catalog prepared"
    );

    Ok(PrepareReport {
        input_file,
        total_rows: prepared.total_rows,
        products,
        offers,
        row_errors: prepared.row_errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::read_json;
    use crate::documents::tests::context;

    fn row(name: &str, id: Option<&str>, price: &str, brand: &str) -> Vec<Option<String>> {
        vec![
            Some(name.to_string()),
            id.map(String::from),
            Some(price.to_string()),
            Some(brand.to_string()),
        ]
    }

    fn table() -> SheetTable {
        let c = CatalogColumns::default();
        SheetTable {
            headers: vec![c.name, c.product_id, c.price, c.brand],
            rows: vec![
                row("חלב 3%", Some("P_1"), "5.9", "תנובה"),
                row("גבינה", Some("P_2"), "not a price", "טרה"),
                row("ביצים", None, "12", "תנובה"),
                row("חלב 1%", Some("P_1"), "6.1", "יטבתה"),
            ],
        }
    }

    #[test]
    fn bad_rows_are_reported_not_fatal() {
        let prepared = build_documents(&table(), &CatalogColumns::default(), &context()).unwrap();

        assert_eq!(prepared.total_rows, 4);
        assert_eq!(prepared.products.len(), 3);
        assert_eq!(prepared.offers.len(), 2);
        assert_eq!(prepared.row_errors.len(), 1);
        assert_eq!(prepared.row_errors[0].row_index, 1);
        assert_eq!(prepared.row_errors[0].shufersal_id.as_deref(), Some("P_2"));
    }

    #[test]
    fn non_finite_price_is_a_row_error() {
        let c = CatalogColumns::default();
        let table = SheetTable {
            headers: vec![c.name, c.product_id, c.price, c.brand],
            rows: vec![
                row("חלב", Some("P_1"), "nan", "תנובה"),
                row("גבינה", Some("P_2"), "inf", "טרה"),
                row("ביצים", Some("P_3"), "12", "תנובה"),
            ],
        };
        let prepared = build_documents(&table, &CatalogColumns::default(), &context()).unwrap();

        assert_eq!(prepared.row_errors.len(), 2);
        assert_eq!(prepared.offers.len(), 1);
        let stats = summarize_offers(&prepared.offers, 100, 1, "now").price.unwrap();
        assert_eq!(stats.average, 12.0);
    }

    #[test]
    fn offers_without_price_stay_out_of_price_stats() {
        let c = CatalogColumns::default();
        let mut empty_price = row("גבינה", Some("P_2"), "", "טרה");
        empty_price[2] = None;
        let table = SheetTable {
            headers: vec![c.name, c.product_id, c.price, c.brand],
            rows: vec![
                row("חלב", Some("P_1"), "6.5", "תנובה"),
                empty_price,
                row("ביצים", Some("P_3"), "12", "תנובה"),
            ],
        };
        let prepared = build_documents(&table, &CatalogColumns::default(), &context()).unwrap();
        assert_eq!(prepared.offers.len(), 3);

        let stats = summarize_offers(&prepared.offers, 100, 1, "now").price.unwrap();
        assert_eq!(stats.average, 9.25);
        assert_eq!(stats.min, 6.5);
        assert_eq!(stats.max, 12.0);
    }

    #[test]
    fn last_occurrence_wins_and_dedupe_keeps_it() {
        let prepared = build_documents(&table(), &CatalogColumns::default(), &context()).unwrap();
        let mapping = prepared.mapping();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["P_1"], 2);

        let unique = dedupe_by_index(prepared.products, &mapping);
        let names: Vec<_> = unique.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["ביצים", "חלב 1%"]);
    }

    #[test]
    fn writes_batches_and_status_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("catalog.csv");
        let c = CatalogColumns::default();
        let mut csv = format!("{},{},{},{},{}\n", c.name, c.product_id, c.price, c.brand, c.image_url);
        for i in 0..7 {
            csv.push_str(&format!("מוצר {},P_{},{}.5,תנובה,https://img/{}.jpg\n", i, i, i, i));
        }
        csv.push_str("יוגורט,P_7,3,דנונה,\n");
        std::fs::write(&input, csv).unwrap();

        let mut config = AppConfig::default();
        config.batching.product_batch_size = 3;
        config.batching.offer_batch_size = 5;
        let layout = DataLayout::new(dir.path().join("data"));

        let report = prepare_catalog(&config, &layout, Some(&input), context_time()).unwrap();

        assert_eq!(report.total_rows, 8);
        assert_eq!(report.products.total_batches, 3);
        assert_eq!(report.offers.total_batches, 2);
        assert_eq!(report.products.products_with_images, 7);
        assert_eq!(report.products.top_brands[0].brand, "Tnuva");
        assert_eq!(report.products.top_brands[0].count, 7);
        assert_eq!(report.products.top_brands[1].brand, "דנונה");
        assert_eq!(report.offers.in_stock, 8);
        let price = report.offers.price.as_ref().unwrap();
        assert_eq!(price.min, 0.5);
        assert_eq!(price.max, 6.5);

        let all: Vec<ProductDocument> = read_json(&layout, ALL_PRODUCTS_FILE).unwrap();
        assert_eq!(all.len(), 8);
        let mapping: BTreeMap<String, usize> = read_json(&layout, PRODUCT_ID_MAPPING_FILE).unwrap();
        assert_eq!(mapping["P_7"], 7);
        assert!(layout.resolve("mongo_batch_3.json").exists());
        assert!(layout.resolve("offers_batch_2.json").exists());
        assert!(layout.data_dir().join("status/import_status.json").exists());

        // a smaller rerun removes the stale tail
        config.batching.product_batch_size = 8;
        prepare_catalog(&config, &layout, Some(&input), context_time()).unwrap();
        assert!(!layout.resolve("mongo_batch_2.json").exists());
    }

    fn context_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-09-08T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }
}
